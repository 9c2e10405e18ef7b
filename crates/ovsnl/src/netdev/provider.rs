//! Device provider: lifecycle and cached-attribute accessors.

use std::sync::Arc;

use crate::netlink::error::{Error, Result};

use super::cache::DeviceRecord;
use super::channel::{NetdevChannel, Transport};
use super::codec::{DeviceInfo, DeviceQuery};
use super::{DeviceKind, ETH_ADDR_LEN};

/// One logical network device living in the switch driver.
///
/// A `Netdev` starts out unconstructed: it knows its name and kind but
/// has queried nothing. [`construct`](Self::construct) performs the
/// query and populates the attribute cache; until it succeeds, every
/// attribute accessor reports [`Error::NotCached`]. A failed construct
/// leaves the device unconstructed with no partial cache.
///
/// A `Netdev` is single-writer by construction (`construct` takes
/// `&mut self`); put each logical device behind its own instance.
pub struct Netdev<T: Transport = NetdevChannel> {
    name: String,
    kind: DeviceKind,
    channel: Arc<T>,
    record: Option<DeviceRecord>,
}

impl Netdev<NetdevChannel> {
    /// Open and construct a system-class device on the shared channel.
    pub async fn system(name: impl Into<String>) -> Result<Self> {
        Self::open(name.into(), DeviceKind::System).await
    }

    /// Open and construct an internal-class device on the shared
    /// channel.
    ///
    /// Internal devices take the identical query path as system ones;
    /// the kind is an identity tag only.
    pub async fn internal(name: impl Into<String>) -> Result<Self> {
        Self::open(name.into(), DeviceKind::Internal).await
    }

    async fn open(name: String, kind: DeviceKind) -> Result<Self> {
        let channel = NetdevChannel::shared().await?;
        let mut dev = Netdev::new(name, kind, channel);
        dev.construct().await?;
        Ok(dev)
    }
}

impl<T: Transport> Netdev<T> {
    /// Allocate an unconstructed device on `channel`.
    pub fn new(name: impl Into<String>, kind: DeviceKind, channel: Arc<T>) -> Self {
        Self {
            name: name.into(),
            kind,
            channel,
            record: None,
        }
    }

    /// Query the driver and populate the attribute cache.
    ///
    /// Encodes a GET for this device, performs one transaction, decodes
    /// the reply and stores the result. Every step propagates its error
    /// and leaves the device unconstructed. Constructing an already
    /// constructed device is a no-op.
    pub async fn construct(&mut self) -> Result<()> {
        if self.record.is_some() {
            return Ok(());
        }

        let info = self.query().await?;
        tracing::debug!(
            device = %self.name,
            kind = %self.kind,
            device_type = info.device_type,
            "constructed netdev"
        );
        self.record = Some(DeviceRecord::populate(&info));
        Ok(())
    }

    /// Run one query round trip without touching the cache.
    async fn query(&self) -> Result<DeviceInfo> {
        let family_id = self.channel.family_id();
        let query = DeviceQuery::new(self.name.clone());
        let request = query.encode(family_id)?;
        let reply = self.channel.transact(request).await?;
        DeviceInfo::decode(&reply, family_id)
    }

    /// Release the device.
    ///
    /// The queried device is owned by the driver, not by this record,
    /// so there is nothing to release; this always succeeds, cached or
    /// not. Dropping the `Netdev` afterwards frees the record.
    pub fn destruct(&mut self) {}

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device-class tag.
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Whether a construct has succeeded.
    pub fn is_constructed(&self) -> bool {
        self.record.is_some()
    }

    /// Cached Ethernet address.
    pub fn mac(&self) -> Result<[u8; ETH_ADDR_LEN]> {
        self.record()?.mac()
    }

    /// Cached MTU.
    pub fn mtu(&self) -> Result<u32> {
        self.record()?.mtu()
    }

    /// Cached interface flags.
    pub fn if_flags(&self) -> Result<u32> {
        self.record()?.if_flags()
    }

    /// Datapath port number.
    pub fn port_no(&self) -> Result<u32> {
        Ok(self.record()?.port_no())
    }

    /// Device-type code reported by the driver.
    pub fn device_type(&self) -> Result<u32> {
        Ok(self.record()?.device_type())
    }

    /// OS-level interface index (an unsupported sentinel on this
    /// channel).
    pub fn ifindex(&self) -> Result<i32> {
        Ok(self.record()?.ifindex())
    }

    /// Change sequence counter.
    pub fn change_seq(&self) -> Result<u32> {
        Ok(self.record()?.change_seq())
    }

    fn record(&self) -> Result<&DeviceRecord> {
        self.record.as_ref().ok_or(Error::NotCached {
            attribute: "device record",
        })
    }
}
