//! Generic Netlink (GENL) support.
//!
//! Generic Netlink extends netlink with dynamically registered message
//! families: a kernel subsystem registers a family by name and the
//! kernel assigns it a numeric id, which userspace resolves at runtime
//! through the fixed control family. The switch driver's netdev family
//! is one such registration.
//!
//! Layout of a GENL message:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ nlmsghdr (16 bytes)                     │
//! │   nlmsg_type carries the family id      │
//! ├─────────────────────────────────────────┤
//! │ genlmsghdr (4 bytes)                    │
//! │   cmd (u8), version (u8), reserved (u16)│
//! ├─────────────────────────────────────────┤
//! │ family header + attributes (TLV format) │
//! └─────────────────────────────────────────┘
//! ```

mod family;
mod header;

pub use family::resolve_family_id;
pub use header::{GENL_HDRLEN, GenlMsgHdr};

/// Control family id (fixed, not dynamically assigned).
pub const GENL_ID_CTRL: u16 = 0x10;

/// Control family commands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    Unspec = 0,
    NewFamily = 1,
    DelFamily = 2,
    GetFamily = 3,
}

/// Control family attributes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    Unspec = 0,
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
}
