//! Async Generic Netlink plumbing.
//!
//! This module carries the wire-level pieces the netdev layer is built
//! on: message and attribute framing, a message builder, the async
//! NETLINK_GENERIC socket, and control-family id resolution. Nothing
//! here knows about the switch driver; the netdev semantics live in
//! [`crate::netdev`].

pub mod attr;
pub(crate) mod builder;
pub(crate) mod error;
pub mod genl;
pub mod message;
pub(crate) mod socket;

pub use attr::{AttrIter, NlAttr};
pub use builder::MessageBuilder;
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::NetlinkSocket;
