//! Error types for netlink and netdev operations.

use std::io;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying the switch driver.
///
/// The variants group into a small taxonomy: the driver being absent
/// ([`FamilyNotFound`](Error::FamilyNotFound), [`Unavailable`](Error::Unavailable)),
/// a malformed request caught before transmission
/// ([`InvalidRequest`](Error::InvalidRequest)), transport failures
/// ([`Io`](Error::Io), [`Kernel`](Error::Kernel)), malformed replies
/// ([`InvalidMessage`](Error::InvalidMessage),
/// [`InvalidAttribute`](Error::InvalidAttribute),
/// [`Truncated`](Error::Truncated)), and reads of attributes that were
/// never populated ([`NotCached`](Error::NotCached)).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Generic Netlink family is not registered.
    ///
    /// The kernel switch driver is probably not loaded.
    #[error("generic netlink family not found: {name}")]
    FamilyNotFound {
        /// The family name that could not be resolved.
        name: String,
    },

    /// The shared channel failed to initialize.
    ///
    /// Carries the failure observed by the one initialization attempt;
    /// every later caller sees the same reason.
    #[error("netdev channel unavailable: {reason}")]
    Unavailable {
        /// Why initialization failed.
        reason: String,
    },

    /// Request rejected before transmission.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Attribute requested before any successful query.
    ///
    /// A normal outcome for a device that has not been constructed yet,
    /// not a defect.
    #[error("attribute not cached: {attribute}")]
    NotCached {
        /// The attribute that has not been populated.
        attribute: &'static str,
    },
}

impl Error {
    /// Create a kernel error from a (negative) errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, or a
    /// missing genl family).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, libc::ENOENT | libc::ENODEV),
            Self::FamilyNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, libc::EPERM | libc::EACCES),
            _ => false,
        }
    }

    /// Check if the attribute was simply not populated yet.
    pub fn is_not_cached(&self) -> bool {
        matches!(self, Self::NotCached { .. })
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}
