//! Encoding netdev queries and decoding netdev replies.

use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::genl::{GENL_HDRLEN, GenlMsgHdr};
use crate::netlink::message::{NLM_F_ECHO, NLM_F_REQUEST, NLMSG_HDRLEN, NlMsgHdr};

use super::schema::{AttrKind, AttrSpec, Schema};
use super::{
    ETH_ADDR_LEN, IFNAMSIZ, NETDEV_GENL_VERSION, NetdevAttr, NetdevCmd, OVS_HDRLEN, OvsHeader,
};

/// Attribute schema for a netdev GET reply.
///
/// A reply must carry every attribute; a device the driver knows about
/// always has all of them.
const NETDEV_SCHEMA: Schema<6> = Schema::new([
    AttrSpec {
        attr: NetdevAttr::PortNo,
        kind: AttrKind::U32,
        required: true,
    },
    AttrSpec {
        attr: NetdevAttr::Type,
        kind: AttrKind::U32,
        required: true,
    },
    AttrSpec {
        attr: NetdevAttr::Name,
        kind: AttrKind::NulString { max_len: IFNAMSIZ },
        required: true,
    },
    AttrSpec {
        attr: NetdevAttr::MacAddr,
        kind: AttrKind::Bytes { len: ETH_ADDR_LEN },
        required: true,
    },
    AttrSpec {
        attr: NetdevAttr::Mtu,
        kind: AttrKind::U32,
        required: true,
    },
    AttrSpec {
        attr: NetdevAttr::IfFlags,
        kind: AttrKind::U32,
        required: true,
    },
]);

/// A query for one device's attributes.
#[derive(Debug, Clone)]
pub struct DeviceQuery {
    /// Datapath the device belongs to (0 = unspecified).
    pub dp_ifindex: u32,
    /// Target device name.
    pub name: String,
}

impl DeviceQuery {
    /// Create a query for `name` on the default datapath.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            dp_ifindex: 0,
            name: name.into(),
        }
    }

    /// Encode the query into a netlink message.
    ///
    /// `family_id` is the resolved id of the netdev family; it becomes
    /// the message type. The reply is requested with NLM_F_ECHO so the
    /// driver answers with a full device record rather than a bare ACK.
    ///
    /// Fails with [`Error::InvalidRequest`] when the name is empty (a
    /// query with no name identifies nothing) or does not fit an
    /// interface name.
    pub fn encode(&self, family_id: u16) -> Result<MessageBuilder> {
        if self.name.is_empty() {
            return Err(Error::InvalidRequest("query has no device name".into()));
        }
        if self.name.len() >= IFNAMSIZ {
            return Err(Error::InvalidRequest(format!(
                "device name '{}' exceeds {} bytes",
                self.name,
                IFNAMSIZ - 1
            )));
        }

        let mut builder = MessageBuilder::new(family_id, NLM_F_REQUEST | NLM_F_ECHO);
        builder.append(&GenlMsgHdr::new(NetdevCmd::Get as u8, NETDEV_GENL_VERSION));
        builder.append(&OvsHeader {
            dp_ifindex: self.dp_ifindex,
        });
        builder.append_attr_str(NetdevAttr::Name as u16, &self.name);
        Ok(builder)
    }
}

/// Decoded attributes of one device, as reported by the driver.
///
/// Consumed once to populate a [`DeviceRecord`](super::DeviceRecord)
/// and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Command code echoed by the driver.
    pub cmd: u8,
    /// Datapath the device belongs to.
    pub dp_ifindex: u32,
    /// Datapath port number.
    pub port_no: u32,
    /// Device-type code.
    pub device_type: u32,
    /// Device name.
    pub name: String,
    /// Ethernet address.
    pub mac: [u8; ETH_ADDR_LEN],
    /// Maximum transmission unit.
    pub mtu: u32,
    /// Interface flags bitfield.
    pub if_flags: u32,
}

impl DeviceInfo {
    /// Decode a reply message into a `DeviceInfo`.
    ///
    /// `buf` is one complete netlink message (header included). The
    /// message type must match `family_id`; header, genl sub-header and
    /// datapath envelope are stripped, and the remaining attributes are
    /// validated against the family schema. Any violation fails the
    /// decode as a whole; no partial result is produced.
    pub fn decode(buf: &[u8], family_id: u16) -> Result<Self> {
        let header = NlMsgHdr::from_bytes(buf)?;
        if header.nlmsg_type != family_id {
            return Err(Error::InvalidMessage(format!(
                "unexpected message type {} (netdev family is {})",
                header.nlmsg_type, family_id
            )));
        }

        let msg_len = header.nlmsg_len as usize;
        if msg_len > buf.len() {
            return Err(Error::Truncated {
                expected: msg_len,
                actual: buf.len(),
            });
        }
        if msg_len < NLMSG_HDRLEN + GENL_HDRLEN + OVS_HDRLEN {
            return Err(Error::InvalidMessage(
                "reply too short for genl and datapath headers".into(),
            ));
        }

        let payload = &buf[NLMSG_HDRLEN..msg_len];
        let genl = GenlMsgHdr::from_bytes(payload)
            .ok_or_else(|| Error::InvalidMessage("GENL header too short".into()))?;
        let envelope = &payload[GENL_HDRLEN..GENL_HDRLEN + OVS_HDRLEN];
        let dp_ifindex = u32::from_ne_bytes([envelope[0], envelope[1], envelope[2], envelope[3]]);

        let attrs = NETDEV_SCHEMA.parse(&payload[GENL_HDRLEN + OVS_HDRLEN..])?;

        // The MAC comes from its own attribute slot. (The reference
        // implementation copied NAME bytes here instead; that was a
        // defect, not a contract.)
        let mut mac = [0u8; ETH_ADDR_LEN];
        mac.copy_from_slice(attrs.require(NetdevAttr::MacAddr));

        Ok(Self {
            cmd: genl.cmd,
            dp_ifindex,
            port_no: read_u32(attrs.require(NetdevAttr::PortNo)),
            device_type: read_u32(attrs.require(NetdevAttr::Type)),
            name: read_string(attrs.require(NetdevAttr::Name))?,
            mac,
            mtu: read_u32(attrs.require(NetdevAttr::Mtu)),
            if_flags: read_u32(attrs.require(NetdevAttr::IfFlags)),
        })
    }
}

/// Read a schema-validated u32 payload.
fn read_u32(payload: &[u8]) -> u32 {
    // Length was checked by the schema.
    u32::from_ne_bytes([payload[0], payload[1], payload[2], payload[3]])
}

/// Read a schema-validated NUL-terminated string payload.
fn read_string(payload: &[u8]) -> Result<String> {
    Ok(crate::netlink::attr::get::string(payload)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::AttrIter;

    const FAMILY_ID: u16 = 27;

    /// Build a synthetic reply the way the driver would.
    fn reply(configure: impl FnOnce(&mut MessageBuilder)) -> Vec<u8> {
        let mut builder = MessageBuilder::new(FAMILY_ID, 0);
        builder.append(&GenlMsgHdr::new(NetdevCmd::Get as u8, NETDEV_GENL_VERSION));
        builder.append(&OvsHeader { dp_ifindex: 3 });
        configure(&mut builder);
        builder.finish()
    }

    fn full_reply(skip: Option<NetdevAttr>) -> Vec<u8> {
        reply(|b| {
            if skip != Some(NetdevAttr::PortNo) {
                b.append_attr_u32(NetdevAttr::PortNo as u16, 7);
            }
            if skip != Some(NetdevAttr::Type) {
                b.append_attr_u32(NetdevAttr::Type as u16, 2);
            }
            if skip != Some(NetdevAttr::Name) {
                b.append_attr_str(NetdevAttr::Name as u16, "vport1");
            }
            if skip != Some(NetdevAttr::MacAddr) {
                b.append_attr(NetdevAttr::MacAddr as u16, &[0x02, 0, 0, 0, 0, 0x01]);
            }
            if skip != Some(NetdevAttr::Mtu) {
                b.append_attr_u32(NetdevAttr::Mtu as u16, 1500);
            }
            if skip != Some(NetdevAttr::IfFlags) {
                b.append_attr_u32(NetdevAttr::IfFlags as u16, 0x1);
            }
        })
    }

    #[test]
    fn test_encode_layout() {
        let query = DeviceQuery::new("vport1");
        let msg = query.encode(FAMILY_ID).unwrap().finish();

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_type, FAMILY_ID);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_ECHO);
        assert_eq!(header.nlmsg_len as usize, msg.len());

        let payload = &msg[NLMSG_HDRLEN..];
        let genl = GenlMsgHdr::from_bytes(payload).unwrap();
        assert_eq!(genl.cmd, NetdevCmd::Get as u8);
        assert_eq!(genl.version, NETDEV_GENL_VERSION);

        let (attr_type, name) = AttrIter::new(&payload[GENL_HDRLEN + OVS_HDRLEN..])
            .next()
            .unwrap();
        assert_eq!(attr_type, NetdevAttr::Name as u16);
        assert_eq!(name, b"vport1\0");
    }

    #[test]
    fn test_encode_empty_name_rejected() {
        let query = DeviceQuery::new("");
        let err = query.encode(FAMILY_ID).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_encode_over_long_name_rejected() {
        let query = DeviceQuery::new("an_interface_name_too_long");
        let err = query.encode(FAMILY_ID).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_decode_echoed_name_roundtrip() {
        let info = DeviceInfo::decode(&full_reply(None), FAMILY_ID).unwrap();
        assert_eq!(info.name, "vport1");
        assert_eq!(info.cmd, NetdevCmd::Get as u8);
        assert_eq!(info.dp_ifindex, 3);
        assert_eq!(info.port_no, 7);
        assert_eq!(info.device_type, 2);
        assert_eq!(info.mac, [0x02, 0, 0, 0, 0, 0x01]);
        assert_eq!(info.mtu, 1500);
        assert_eq!(info.if_flags, 0x1);
    }

    #[test]
    fn test_decode_wrong_family_rejected() {
        let err = DeviceInfo::decode(&full_reply(None), FAMILY_ID + 1).unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
    }

    #[test]
    fn test_decode_missing_any_mandatory_attr_fails() {
        for attr in [
            NetdevAttr::PortNo,
            NetdevAttr::Type,
            NetdevAttr::Name,
            NetdevAttr::MacAddr,
            NetdevAttr::Mtu,
            NetdevAttr::IfFlags,
        ] {
            let buf = full_reply(Some(attr));
            assert!(
                DeviceInfo::decode(&buf, FAMILY_ID).is_err(),
                "decode should fail without {:?}",
                attr
            );
        }
    }

    #[test]
    fn test_decode_reads_mac_from_mac_attr() {
        // NAME bytes deliberately differ from the MAC attribute; the
        // decoded MAC must come from the MAC attribute alone.
        let info = DeviceInfo::decode(&full_reply(None), FAMILY_ID).unwrap();
        assert_ne!(&info.mac[..], &info.name.as_bytes()[..ETH_ADDR_LEN]);
        assert_eq!(info.mac, [0x02, 0, 0, 0, 0, 0x01]);
    }

    #[test]
    fn test_decode_wrong_sized_mac_fails() {
        let buf = reply(|b| {
            b.append_attr_u32(NetdevAttr::PortNo as u16, 7);
            b.append_attr_u32(NetdevAttr::Type as u16, 2);
            b.append_attr_str(NetdevAttr::Name as u16, "vport1");
            b.append_attr(NetdevAttr::MacAddr as u16, &[0x02, 0, 0, 0, 0x01]);
            b.append_attr_u32(NetdevAttr::Mtu as u16, 1500);
            b.append_attr_u32(NetdevAttr::IfFlags as u16, 0x1);
        });
        assert!(DeviceInfo::decode(&buf, FAMILY_ID).is_err());
    }

    #[test]
    fn test_decode_truncated_reply_fails() {
        let buf = full_reply(None);
        assert!(DeviceInfo::decode(&buf[..buf.len() - 8], FAMILY_ID).is_err());
        assert!(DeviceInfo::decode(&buf[..NLMSG_HDRLEN + 2], FAMILY_ID).is_err());
    }
}
