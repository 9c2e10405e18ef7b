//! Family id resolution via the GENL control family.

use super::header::{GENL_HDRLEN, GenlMsgHdr};
use super::{CtrlAttr, CtrlCmd, GENL_ID_CTRL};
use crate::netlink::attr::{AttrIter, get};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::message::{MessageIter, NLM_F_ACK, NLM_F_REQUEST, NlMsgError};
use crate::netlink::socket::NetlinkSocket;

/// Resolve a Generic Netlink family name to its numeric id.
///
/// Issues a CTRL_CMD_GETFAMILY request for `name`. If the kernel does
/// not have the family registered (the driver is not loaded), this
/// fails with [`Error::FamilyNotFound`].
pub async fn resolve_family_id(socket: &NetlinkSocket, name: &str) -> Result<u16> {
    // Build CTRL_CMD_GETFAMILY request
    let mut builder = MessageBuilder::new(GENL_ID_CTRL, NLM_F_REQUEST | NLM_F_ACK);
    builder.append(&GenlMsgHdr::new(CtrlCmd::GetFamily as u8, 1));
    builder.append_attr_str(CtrlAttr::FamilyName as u16, name);

    let seq = socket.next_seq();
    builder.set_seq(seq);
    builder.set_pid(socket.pid());

    socket.send(&builder.finish()).await?;

    let response = socket.recv_msg().await?;
    parse_family_response(&response, seq, name)
}

/// Parse a CTRL_CMD_GETFAMILY response into the family id.
fn parse_family_response(data: &[u8], seq: u32, name: &str) -> Result<u16> {
    for result in MessageIter::new(data) {
        let (header, payload) = result?;

        if header.nlmsg_seq != seq {
            continue;
        }

        if header.is_error() {
            let err = NlMsgError::from_bytes(payload)?;
            if !err.is_ack() {
                // ENOENT means the family is not registered
                if err.error == -libc::ENOENT {
                    return Err(Error::FamilyNotFound {
                        name: name.to_string(),
                    });
                }
                return Err(Error::from_errno(err.error));
            }
            continue;
        }

        if header.is_done() {
            continue;
        }

        if payload.len() < GENL_HDRLEN {
            return Err(Error::InvalidMessage("GENL header too short".into()));
        }

        for (attr_type, attr_payload) in AttrIter::new(&payload[GENL_HDRLEN..]) {
            if attr_type == CtrlAttr::FamilyId as u16 {
                return Ok(get::u16_ne(attr_payload)?);
            }
        }

        return Err(Error::InvalidMessage("missing family ID".into()));
    }

    Err(Error::FamilyNotFound {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::message::NLMSG_HDRLEN;

    fn family_reply(seq: u32, family_id: Option<u16>) -> Vec<u8> {
        let mut builder = MessageBuilder::new(GENL_ID_CTRL, 0);
        builder.append(&GenlMsgHdr::new(CtrlCmd::NewFamily as u8, 1));
        builder.append_attr_str(CtrlAttr::FamilyName as u16, "ovs_win_netdev");
        if let Some(id) = family_id {
            builder.append_attr(CtrlAttr::FamilyId as u16, &id.to_ne_bytes());
        }
        builder.set_seq(seq);
        builder.finish()
    }

    #[test]
    fn test_parse_family_id() {
        let reply = family_reply(5, Some(27));
        assert_eq!(parse_family_response(&reply, 5, "ovs_win_netdev").unwrap(), 27);
    }

    #[test]
    fn test_parse_missing_family_id() {
        let reply = family_reply(5, None);
        assert!(parse_family_response(&reply, 5, "ovs_win_netdev").is_err());
    }

    #[test]
    fn test_parse_skips_other_sequences() {
        let reply = family_reply(9, Some(27));
        // Wrong sequence number: nothing usable in the buffer.
        let err = parse_family_response(&reply, 5, "ovs_win_netdev").unwrap_err();
        assert!(matches!(err, Error::FamilyNotFound { .. }));
    }

    #[test]
    fn test_parse_enoent_maps_to_family_not_found() {
        // Hand-built error message: nlmsghdr(type=ERROR) + i32 errno + echoed header
        let mut builder = MessageBuilder::new(crate::netlink::message::NlMsgType::ERROR, 0);
        let mut payload = (-libc::ENOENT).to_ne_bytes().to_vec();
        payload.extend_from_slice(&[0u8; NLMSG_HDRLEN]);
        builder.append_bytes(&payload);
        builder.set_seq(5);
        let reply = builder.finish();

        let err = parse_family_response(&reply, 5, "ovs_win_netdev").unwrap_err();
        assert!(matches!(err, Error::FamilyNotFound { ref name } if name == "ovs_win_netdev"));
    }
}
