//! Per-device attribute cache.

use crate::netlink::error::{Error, Result};

use super::ETH_ADDR_LEN;
use super::codec::DeviceInfo;

/// Sentinel ifindex for devices whose OS-level interface index this
/// channel cannot report.
pub const IFINDEX_UNSUPPORTED: i32 = -libc::EOPNOTSUPP;

/// Cached attributes of one device.
///
/// Owned by the [`Netdev`](super::Netdev) representing the device:
/// created by a successful construct, mutated only by a future refresh,
/// dropped with the device. Attributes that have not been populated are
/// `None` and read as [`Error::NotCached`] rather than aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    device_type: u32,
    port_no: u32,
    ifindex: i32,
    mac: Option<[u8; ETH_ADDR_LEN]>,
    mtu: Option<u32>,
    if_flags: Option<u32>,
    change_seq: u32,
}

impl DeviceRecord {
    /// Populate a fresh record from a decoded reply.
    ///
    /// All attribute groups become valid at once; the change sequence
    /// starts at 1. A refresh operation would repopulate and bump the
    /// sequence, but no invalidation path exists at this layer.
    pub fn populate(info: &DeviceInfo) -> Self {
        Self {
            device_type: info.device_type,
            port_no: info.port_no,
            ifindex: IFINDEX_UNSUPPORTED,
            mac: Some(info.mac),
            mtu: Some(info.mtu),
            if_flags: Some(info.if_flags),
            change_seq: 1,
        }
    }

    /// Device-type code reported by the driver.
    pub fn device_type(&self) -> u32 {
        self.device_type
    }

    /// Datapath port number.
    pub fn port_no(&self) -> u32 {
        self.port_no
    }

    /// OS-level interface index ([`IFINDEX_UNSUPPORTED`] on this
    /// channel).
    pub fn ifindex(&self) -> i32 {
        self.ifindex
    }

    /// Cached Ethernet address.
    pub fn mac(&self) -> Result<[u8; ETH_ADDR_LEN]> {
        self.mac.ok_or(Error::NotCached {
            attribute: "ethernet address",
        })
    }

    /// Cached MTU.
    pub fn mtu(&self) -> Result<u32> {
        self.mtu.ok_or(Error::NotCached { attribute: "mtu" })
    }

    /// Cached interface flags.
    pub fn if_flags(&self) -> Result<u32> {
        self.if_flags.ok_or(Error::NotCached {
            attribute: "interface flags",
        })
    }

    /// Change sequence counter (1 after first population).
    pub fn change_seq(&self) -> u32 {
        self.change_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> DeviceInfo {
        DeviceInfo {
            cmd: 1,
            dp_ifindex: 0,
            port_no: 7,
            device_type: 2,
            name: "vport1".into(),
            mac: [0x02, 0, 0, 0, 0, 0x01],
            mtu: 1500,
            if_flags: 0x1,
        }
    }

    #[test]
    fn test_populate_sets_everything() {
        let record = DeviceRecord::populate(&sample_info());
        assert_eq!(record.mac().unwrap(), [0x02, 0, 0, 0, 0, 0x01]);
        assert_eq!(record.mtu().unwrap(), 1500);
        assert_eq!(record.if_flags().unwrap(), 0x1);
        assert_eq!(record.port_no(), 7);
        assert_eq!(record.device_type(), 2);
        assert_eq!(record.change_seq(), 1);
    }

    #[test]
    fn test_ifindex_is_unsupported_sentinel() {
        let record = DeviceRecord::populate(&sample_info());
        assert_eq!(record.ifindex(), IFINDEX_UNSUPPORTED);
        assert_eq!(record.ifindex(), -libc::EOPNOTSUPP);
    }
}
