//! Centralized error handling for loupe.
//!
//! Rendering a value never fails as a whole: quota exhaustion is a designed
//! truncation, and failures inside one part of a value are recovered where
//! they happen. [`InspectError`] is the currency for those local failures.
//!
//! ## Error Categories
//!
//! - **Unsupported Platform** ([`InspectError::UnsupportedPlatform`]): the value
//!   cannot be observed on the current target.
//! - **Unsupported** ([`InspectError::Unsupported`]): a shape with no safe textual
//!   form, such as multi-level raw pointer indirection.
//! - **Invalid Operation** ([`InspectError::InvalidOperation`]): the value is in a
//!   state that forbids reading it right now (already mutably borrowed, locked,
//!   poisoned, dropped).
//! - **Failed** ([`InspectError::Failed`]): any other failure reported by a
//!   member getter or an enumeration hook.
//!
//! ## Recovery
//!
//! | Where it happens | What the caller sees |
//! |---|---|
//! | enumeration hook (`entries`, `elements`, ...) | the next capability is tried |
//! | member getter, graph walk | the error itself is rendered as the member value |
//! | member getter, type formatter | a short marker such as `<invalid operation>` |
//! | root scalar classification | `Inspector::try_format` returns the error |
//!
//! ```rust
//! use loupe::InspectError;
//!
//! let err = InspectError::invalid_operation("already mutably borrowed");
//! assert_eq!(err.marker(), "<invalid operation>");
//! assert_eq!(err.to_string(), "Invalid Operation: already mutably borrowed");
//! ```

use std::cell::BorrowError;
use std::fmt;
use std::sync::TryLockError;

/// A specialized `Result` type for loupe hooks.
pub type Result<T> = std::result::Result<T, InspectError>;

/// The error enum covering every local failure while inspecting a value.
///
/// This type is `Clone` so a failure can be rendered, stored in a graph node
/// and reported again on a later pass without re-running the failing code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// The value cannot be observed on this platform.
    UnsupportedPlatform(String),

    /// The value has no safe textual form.
    ///
    /// Raised explicitly rather than silently degrading, e.g. for a raw pointer
    /// that points to another raw pointer.
    Unsupported(String),

    /// The value is in a state that forbids reading it.
    ///
    /// ## Common Causes
    ///
    /// - `RefCell` already mutably borrowed
    /// - `Mutex`/`RwLock` held elsewhere or poisoned
    /// - `Weak` handle whose target was dropped
    InvalidOperation(String),

    /// Any other failure raised by a getter or an enumeration hook.
    Failed(String),
}

impl InspectError {
    /// Builds an [`InspectError::UnsupportedPlatform`].
    pub fn unsupported_platform(msg: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }

    /// Builds an [`InspectError::Unsupported`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Builds an [`InspectError::InvalidOperation`].
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Builds an [`InspectError::Failed`].
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// The variant name, used when an error is decomposed as a value.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform(_) => "UnsupportedPlatform",
            Self::Unsupported(_) => "Unsupported",
            Self::InvalidOperation(_) => "InvalidOperation",
            Self::Failed(_) => "Failed",
        }
    }

    /// The message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            Self::UnsupportedPlatform(s)
            | Self::Unsupported(s)
            | Self::InvalidOperation(s)
            | Self::Failed(s) => s,
        }
    }

    /// Short inline marker that replaces a member which failed to format.
    pub fn marker(&self) -> String {
        match self {
            Self::UnsupportedPlatform(_) => "<unsupported platform>".to_string(),
            Self::Unsupported(_) => "<unsupported>".to_string(),
            Self::InvalidOperation(_) => "<invalid operation>".to_string(),
            Self::Failed(s) => format!("<error: {s}>"),
        }
    }
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedPlatform(s) => write!(f, "Unsupported Platform: {s}"),
            Self::Unsupported(s) => write!(f, "Unsupported: {s}"),
            Self::InvalidOperation(s) => write!(f, "Invalid Operation: {s}"),
            Self::Failed(s) => write!(f, "Failed: {s}"),
        }
    }
}

impl std::error::Error for InspectError {}

impl From<BorrowError> for InspectError {
    fn from(err: BorrowError) -> Self {
        Self::InvalidOperation(err.to_string())
    }
}

impl<G> From<TryLockError<G>> for InspectError {
    fn from(err: TryLockError<G>) -> Self {
        match err {
            TryLockError::Poisoned(_) => Self::InvalidOperation("lock poisoned".into()),
            TryLockError::WouldBlock => Self::InvalidOperation("lock held elsewhere".into()),
        }
    }
}
