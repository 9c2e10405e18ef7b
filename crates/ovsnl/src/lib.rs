//! Async Generic Netlink client for virtual-switch netdev queries.
//!
//! The kernel switch driver owns its devices; this crate asks it for a
//! device's attributes (MAC address, MTU, interface flags, datapath
//! port number, device type) over the driver's Generic Netlink family
//! and caches the answer per device. Only synchronous single-device
//! GET is supported: no dumps, no configuration, no hot-plug events.
//!
//! # Example
//!
//! ```ignore
//! use ovsnl::netdev::Netdev;
//!
//! #[tokio::main]
//! async fn main() -> ovsnl::Result<()> {
//!     let dev = Netdev::system("vport1").await?;
//!
//!     let mac = dev.mac()?;
//!     println!("mac {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
//!              mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]);
//!     println!("mtu {}", dev.mtu()?);
//!
//!     Ok(())
//! }
//! ```

pub mod netdev;
pub mod netlink;

// Re-export common types at crate root for convenience
pub use netdev::{DeviceKind, Netdev, NetdevChannel};
pub use netlink::{Error, Result};
