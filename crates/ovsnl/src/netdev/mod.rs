//! Virtual-switch netdev queries.
//!
//! The kernel switch driver keeps the real device state; this module
//! asks it for a device's attributes (MAC, MTU, interface flags, port
//! number, device type) over the driver's Generic Netlink family and
//! caches the answer per device.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Netdev (per-device lifecycle + cache)   │
//! └────────────────┬────────────────────────┘
//!                  │ encode / decode via codec
//! ┌────────────────▼────────────────────────┐
//! │ Transport (NetdevChannel or a test mock)│
//! └────────────────┬────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────┐
//! │ NetlinkSocket (NETLINK_GENERIC)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ovsnl::netdev::Netdev;
//!
//! # async fn example() -> ovsnl::Result<()> {
//! let dev = Netdev::system("vport1").await?;
//! println!("mac:   {:02x?}", dev.mac()?);
//! println!("mtu:   {}", dev.mtu()?);
//! println!("flags: {:#x}", dev.if_flags()?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod channel;
pub mod codec;
pub mod provider;
pub mod schema;

pub use cache::{DeviceRecord, IFINDEX_UNSUPPORTED};
pub use channel::{NetdevChannel, Transport};
pub use codec::{DeviceInfo, DeviceQuery};
pub use provider::Netdev;

/// Generic Netlink family name registered by the switch driver.
pub const NETDEV_GENL_NAME: &str = "ovs_win_netdev";

/// Netdev family protocol version.
pub const NETDEV_GENL_VERSION: u8 = 1;

/// Length of an Ethernet address.
pub const ETH_ADDR_LEN: usize = 6;

/// Maximum interface name length, including the NUL terminator.
pub const IFNAMSIZ: usize = 16;

/// Netdev family commands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetdevCmd {
    Unspec = 0,
    Get = 1,
}

/// Netdev family attributes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetdevAttr {
    Unspec = 0,
    PortNo = 1,
    Type = 2,
    Name = 3,
    MacAddr = 4,
    Mtu = 5,
    IfFlags = 6,
}

/// Family-specific header following the genlmsghdr: identifies which
/// datapath (virtual switch instance) the device belongs to.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OvsHeader {
    /// Datapath interface index.
    pub dp_ifindex: u32,
}

/// Size of the family-specific header in bytes.
pub const OVS_HDRLEN: usize = std::mem::size_of::<OvsHeader>();

/// Device-class tag.
///
/// Both kinds go through the identical query path; the tag only records
/// whether the device is backed by a real resource or purely virtual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Device backed by a real resource.
    System,
    /// Purely virtual device.
    Internal,
}

impl DeviceKind {
    /// Class name as exposed to the device-registration framework.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::System => "system",
            DeviceKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
