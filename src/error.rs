//! Error type for the handful of interfaces that have a recoverable failure
//! mode. Per the error-handling design (§7), configuration, storage, and
//! protocol violations are bugs, not recoverable conditions, and are raised
//! as panics with a formatted message at the point of failure rather than
//! through this type — see `abort!` below.
use core::fmt;

/// Recoverable failures surfaced through `Result`. Kept intentionally small:
/// most of this crate's failure modes are fatal by design (§7) and panic
/// instead of returning an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RicError {
    /// A configuration value was out of its documented range.
    InvalidConfig(&'static str),
    /// An external identity does not match the `NodeKind` it was registered
    /// against (e.g. an `ExternalId::Wired` handed to `register_lte_ue`).
    KindMismatch,
}

impl fmt::Display for RicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(s) => write!(f, "invalid configuration: {}", s),
            Self::KindMismatch => write!(f, "external identity kind does not match node kind"),
        }
    }
}

impl std::error::Error for RicError {}

/// Raises a fatal, unrecoverable condition the spec defines as a bug rather
/// than a `Result`-worthy error (configuration/storage/protocol errors in
/// §7) — mirrors the source's `NS_ABORT_MSG_IF`.
macro_rules! abort {
    ($($arg:tt)*) => {
        panic!($($arg)*)
    };
}
pub(crate) use abort;
