//! Error types for token allocation and the record store.
//!
//! [`StoreError`] is what a [`RecordStore`] adapter reports when the shared
//! store cannot serve a call. [`AllocError`] is the terminal outcome of a
//! failed allocation; every failed allocation yields exactly one variant.
//!
//! [`RecordStore`]: crate::RecordStore

use crate::Token;

/// A result type defaulting to [`AllocError`].
pub type Result<T, E = AllocError> = core::result::Result<T, E>;

/// Failures reported by a [`RecordStore`] adapter.
///
/// A conditional create that finds the field already present is **not** an
/// error; it is reported as `Ok(false)`.
///
/// [`RecordStore`]: crate::RecordStore
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached or rejected the call at the transport
    /// level.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The call did not complete before the request deadline.
    #[error("store call timed out")]
    Timeout,

    /// A field holds a value that cannot be interpreted as an integer.
    #[error("field `{field}` of `{key}` is not an integer")]
    NotAnInteger { key: String, field: String },

    /// Incrementing the field would overflow an `i64`.
    #[error("incrementing field `{field}` of `{key}` would overflow")]
    Overflow { key: String, field: String },

    /// A record exists but one of its fields is malformed.
    #[error("record `{key}` has a malformed `{field}` field")]
    Corrupt { key: String, field: String },
}

impl StoreError {
    /// Convenience constructor for [`StoreError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// An [`AllocatorConfig`] value outside its supported range.
///
/// [`AllocatorConfig`]: crate::AllocatorConfig
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("token length {token_length} is outside 1..={max}")]
    TokenLength { token_length: usize, max: usize },

    #[error("max_retries must be greater than 0")]
    ZeroRetries,
}

/// Terminal outcome of a failed allocation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AllocError {
    /// The hint is not `^[0-9a-zA-Z]{0,L}$`. A client input error.
    #[error("invalid hint `{hint}`: expected at most {token_length} alphanumeric characters")]
    InvalidHint { hint: String, token_length: usize },

    /// The allocator's configuration is out of range. No store call is made.
    #[error("invalid allocator configuration")]
    InvalidConfig(#[source] ConfigError),

    /// Every candidate collided with an existing record.
    #[error("token space exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// The store failed while claiming a candidate. Nothing was claimed.
    #[error("store unavailable during claim")]
    StoreUnavailable(#[source] StoreError),

    /// The token was claimed but writing its metadata or expiry failed. The
    /// record remains claimed under `token`.
    #[error("token `{token}` claimed but finalizing it failed")]
    PartialWriteFailure {
        token: Token,
        #[source]
        source: StoreError,
    },

    /// The enclosing request was cancelled. `claimed` holds the token when the
    /// cancellation arrived after a successful claim; that record is kept.
    #[error("allocation cancelled")]
    Cancelled { claimed: Option<Token> },
}

impl AllocError {
    /// Returns `true` when the failure was caused by the caller's input rather
    /// than by the server or the store.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidHint { .. })
    }

    /// Returns the token left claimed in the store by this failed allocation,
    /// if any.
    pub const fn claimed_token(&self) -> Option<&Token> {
        match self {
            Self::PartialWriteFailure { token, .. } => Some(token),
            Self::Cancelled { claimed } => claimed.as_ref(),
            _ => None,
        }
    }
}
