//! Transport channel to the switch driver.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::genl::resolve_family_id;
use crate::netlink::message::{MessageIter, NLMSG_HDRLEN, NlMsgError};
use crate::netlink::socket::NetlinkSocket;

use super::NETDEV_GENL_NAME;

/// A single request/reply round trip to the driver.
///
/// Implementors perform exactly one blocking transaction: no
/// pipelining, no retry, no timeout. Retry and timeout policy, where
/// wanted, belongs to the caller. The seam exists so the provider can
/// be exercised against a mock in tests.
pub trait Transport {
    /// The resolved protocol-family id this transport talks to. The
    /// codec stamps it into requests and checks it in replies.
    fn family_id(&self) -> u16;

    /// Send `request` and return the single reply message, netlink
    /// header included. A kernel error reply surfaces as
    /// [`Error::Kernel`].
    fn transact(&self, request: MessageBuilder) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Channel to the switch driver's netdev family.
///
/// Owns the Generic Netlink socket and the resolved family id. An
/// owned channel (from [`connect`](Self::connect)) closes its socket
/// when dropped; [`shared`](Self::shared) hands out a process-wide
/// handle initialized exactly once.
#[derive(Debug)]
pub struct NetdevChannel {
    socket: NetlinkSocket,
    family_id: u16,
}

/// Process-wide shared channel. Initialization runs at most once; the
/// outcome, success or failure, is what every caller observes.
static SHARED: OnceCell<std::result::Result<Arc<NetdevChannel>, String>> = OnceCell::const_new();

impl NetdevChannel {
    /// Open a channel: create the socket and resolve the netdev family.
    ///
    /// Fails fast with [`Error::FamilyNotFound`] when the kernel switch
    /// driver has not registered the family.
    pub async fn connect() -> Result<Self> {
        Self::connect_family(NETDEV_GENL_NAME).await
    }

    async fn connect_family(name: &str) -> Result<Self> {
        let socket = NetlinkSocket::new()?;
        let family_id = match resolve_family_id(&socket, name).await {
            Ok(id) => id,
            Err(err) => {
                if err.is_not_found() {
                    tracing::error!(
                        family = name,
                        "generic netlink family does not exist; \
                         the switch kernel module is probably not loaded"
                    );
                } else if err.is_permission_denied() {
                    tracing::error!(
                        family = name,
                        "permission denied resolving the netdev family; \
                         the process lacks the privileges to query it"
                    );
                }
                return Err(err);
            }
        };
        Ok(Self { socket, family_id })
    }

    /// Get the process-wide shared channel, initializing it on first
    /// use.
    ///
    /// Exactly one socket creation and family resolution happens no
    /// matter how many tasks call this concurrently; all of them
    /// observe the same outcome. A failed initialization is memoized
    /// and reported as [`Error::Unavailable`] from then on.
    pub async fn shared() -> Result<Arc<NetdevChannel>> {
        Self::init_shared(&SHARED, NetdevChannel::connect).await
    }

    /// Once-guarded initialization against `cell`.
    ///
    /// `connect` runs at most once per cell; every caller, concurrent
    /// or later, gets the memoized outcome.
    async fn init_shared<F, Fut>(
        cell: &OnceCell<std::result::Result<Arc<NetdevChannel>, String>>,
        connect: F,
    ) -> Result<Arc<NetdevChannel>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NetdevChannel>>,
    {
        let outcome = cell
            .get_or_init(|| async {
                connect().await.map(Arc::new).map_err(|err| err.to_string())
            })
            .await;

        match outcome {
            Ok(channel) => Ok(Arc::clone(channel)),
            Err(reason) => Err(Error::Unavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// The resolved id of the netdev family.
    pub fn family_id(&self) -> u16 {
        self.family_id
    }
}

impl Transport for NetdevChannel {
    fn family_id(&self) -> u16 {
        self.family_id
    }

    fn transact(
        &self,
        mut request: MessageBuilder,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send {
        async move {
            let seq = self.socket.next_seq();
            request.set_seq(seq);
            request.set_pid(self.socket.pid());

            self.socket.send(&request.finish()).await?;
            let response = self.socket.recv_msg().await?;

            for result in MessageIter::new(&response) {
                let (header, payload) = result?;

                if header.nlmsg_seq != seq {
                    continue;
                }

                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.error));
                    }
                    continue;
                }

                if header.is_done() {
                    continue;
                }

                // Hand back the reply as one contiguous message.
                let mut msg = Vec::with_capacity(NLMSG_HDRLEN + payload.len());
                msg.extend_from_slice(header.as_bytes());
                msg.extend_from_slice(payload);
                return Ok(msg);
            }

            Err(Error::InvalidMessage(
                "no reply matching the request sequence".into(),
            ))
        }
    }
}
