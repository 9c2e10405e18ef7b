//! Declarative attribute schema for netdev replies.
//!
//! Each wire attribute the family can carry is described once: its
//! expected type/size and whether a reply is allowed to omit it. The
//! decoder runs a reply's attribute list through the schema in one pass
//! and only ever sees payloads that already satisfy the declared
//! constraints.

use crate::netlink::attr::AttrIter;
use crate::netlink::error::{Error, Result};

use super::NetdevAttr;

/// Expected wire type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Fixed 32-bit integer, native byte order.
    U32,
    /// NUL-terminated string of at most `max_len` bytes including the
    /// terminator.
    NulString {
        /// Maximum payload length including the terminator.
        max_len: usize,
    },
    /// Fixed-length byte array.
    Bytes {
        /// Exact payload length.
        len: usize,
    },
}

impl AttrKind {
    /// Check a payload against this kind.
    fn check(self, attr: NetdevAttr, payload: &[u8]) -> Result<()> {
        let ok = match self {
            AttrKind::U32 => payload.len() == 4,
            AttrKind::NulString { max_len } => {
                !payload.is_empty() && payload.len() <= max_len && payload.contains(&0)
            }
            AttrKind::Bytes { len } => payload.len() == len,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidAttribute(format!(
                "attribute {:?}: payload of {} bytes does not match {:?}",
                attr,
                payload.len(),
                self
            )))
        }
    }
}

/// One entry of a schema: attribute, expected kind, mandatoriness.
#[derive(Debug, Clone, Copy)]
pub struct AttrSpec {
    /// The attribute this entry describes.
    pub attr: NetdevAttr,
    /// Expected wire type.
    pub kind: AttrKind,
    /// Whether a reply must carry this attribute.
    pub required: bool,
}

/// A validating view over a reply's attribute list.
///
/// `N` is the number of declared attributes; parsed payloads are
/// returned slot-indexed in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct Schema<const N: usize> {
    specs: [AttrSpec; N],
}

/// Parsed attribute payloads, slot-indexed like the schema.
pub struct Parsed<'a, const N: usize> {
    slots: [Option<&'a [u8]>; N],
    specs: &'a [AttrSpec; N],
}

impl<const N: usize> Schema<N> {
    /// Create a schema from its entries.
    pub const fn new(specs: [AttrSpec; N]) -> Self {
        Self { specs }
    }

    /// Validate `data` (a raw attribute list) against the schema.
    ///
    /// Every declared attribute that appears must match its declared
    /// kind; every `required` attribute must appear. Attributes the
    /// schema does not declare are skipped, so a newer driver can add
    /// fields without breaking older userspace. Fails as a whole: on
    /// error no payloads are handed out.
    pub fn parse<'a>(&'a self, data: &'a [u8]) -> Result<Parsed<'a, N>> {
        let mut slots: [Option<&[u8]>; N] = [None; N];

        for (attr_type, payload) in AttrIter::new(data) {
            let Some(slot) = self
                .specs
                .iter()
                .position(|spec| spec.attr as u16 == attr_type)
            else {
                continue;
            };
            let spec = &self.specs[slot];
            spec.kind.check(spec.attr, payload)?;
            slots[slot] = Some(payload);
        }

        for (slot, spec) in self.specs.iter().enumerate() {
            if spec.required && slots[slot].is_none() {
                return Err(Error::InvalidAttribute(format!(
                    "mandatory attribute {:?} missing",
                    spec.attr
                )));
            }
        }

        Ok(Parsed {
            slots,
            specs: &self.specs,
        })
    }
}

impl<'a, const N: usize> Parsed<'a, N> {
    /// Get the validated payload for `attr`.
    ///
    /// Returns `None` for an absent optional attribute. Asking for an
    /// attribute the schema does not declare is a programming error and
    /// panics.
    pub fn get(&self, attr: NetdevAttr) -> Option<&'a [u8]> {
        let slot = self
            .specs
            .iter()
            .position(|spec| spec.attr == attr)
            .unwrap_or_else(|| panic!("attribute {:?} not declared in schema", attr));
        self.slots[slot]
    }

    /// Get the payload of a required attribute.
    ///
    /// Presence was already checked by [`Schema::parse`], so this never
    /// fails for attributes declared `required`.
    pub fn require(&self, attr: NetdevAttr) -> &'a [u8] {
        self.get(attr)
            .unwrap_or_else(|| panic!("required attribute {:?} was not populated", attr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{NlAttr, nla_align};

    const TEST_SCHEMA: Schema<3> = Schema::new([
        AttrSpec {
            attr: NetdevAttr::Mtu,
            kind: AttrKind::U32,
            required: true,
        },
        AttrSpec {
            attr: NetdevAttr::Name,
            kind: AttrKind::NulString { max_len: 16 },
            required: true,
        },
        AttrSpec {
            attr: NetdevAttr::MacAddr,
            kind: AttrKind::Bytes { len: 6 },
            required: false,
        },
    ]);

    fn push_attr(buf: &mut Vec<u8>, attr: NetdevAttr, payload: &[u8]) {
        buf.extend_from_slice(NlAttr::new(attr as u16, payload.len()).as_bytes());
        buf.extend_from_slice(payload);
        buf.resize(nla_align(buf.len()), 0);
    }

    #[test]
    fn test_parse_complete() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Mtu, &1500u32.to_ne_bytes());
        push_attr(&mut buf, NetdevAttr::Name, b"vport1\0");
        push_attr(&mut buf, NetdevAttr::MacAddr, &[2, 0, 0, 0, 0, 1]);

        let parsed = TEST_SCHEMA.parse(&buf).unwrap();
        assert_eq!(parsed.require(NetdevAttr::Mtu), &1500u32.to_ne_bytes()[..]);
        assert_eq!(parsed.require(NetdevAttr::Name), b"vport1\0");
        assert_eq!(parsed.get(NetdevAttr::MacAddr), Some(&[2, 0, 0, 0, 0, 1][..]));
    }

    #[test]
    fn test_missing_optional_is_none() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Mtu, &1500u32.to_ne_bytes());
        push_attr(&mut buf, NetdevAttr::Name, b"vport1\0");

        let parsed = TEST_SCHEMA.parse(&buf).unwrap();
        assert_eq!(parsed.get(NetdevAttr::MacAddr), None);
    }

    #[test]
    fn test_missing_required_fails() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Name, b"vport1\0");

        assert!(TEST_SCHEMA.parse(&buf).is_err());
    }

    #[test]
    fn test_wrong_size_u32_fails() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Mtu, &[0u8; 2]);
        push_attr(&mut buf, NetdevAttr::Name, b"vport1\0");

        assert!(TEST_SCHEMA.parse(&buf).is_err());
    }

    #[test]
    fn test_wrong_size_mac_fails() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Mtu, &1500u32.to_ne_bytes());
        push_attr(&mut buf, NetdevAttr::Name, b"vport1\0");
        push_attr(&mut buf, NetdevAttr::MacAddr, &[2, 0, 0, 0, 1]);

        assert!(TEST_SCHEMA.parse(&buf).is_err());
    }

    #[test]
    fn test_over_long_string_fails() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Mtu, &1500u32.to_ne_bytes());
        push_attr(&mut buf, NetdevAttr::Name, b"a_very_long_interface_name\0");

        assert!(TEST_SCHEMA.parse(&buf).is_err());
    }

    #[test]
    fn test_unterminated_string_fails() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Mtu, &1500u32.to_ne_bytes());
        push_attr(&mut buf, NetdevAttr::Name, b"vport1");

        assert!(TEST_SCHEMA.parse(&buf).is_err());
    }

    #[test]
    fn test_unknown_attribute_ignored() {
        let mut buf = Vec::new();
        push_attr(&mut buf, NetdevAttr::Mtu, &1500u32.to_ne_bytes());
        push_attr(&mut buf, NetdevAttr::Name, b"vport1\0");
        // Type 99 is not in the schema; a newer driver might send it.
        buf.extend_from_slice(NlAttr::new(99, 4).as_bytes());
        buf.extend_from_slice(&[0xaa; 4]);

        assert!(TEST_SCHEMA.parse(&buf).is_ok());
    }
}
