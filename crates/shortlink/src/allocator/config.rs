use crate::{ConfigError, DEFAULT_TOKEN_LENGTH, RAISE_INTERVAL};
use core::time::Duration;

/// Number of candidates tried before an allocation gives up with
/// [`AllocError::Exhausted`].
///
/// [`AllocError::Exhausted`]: crate::AllocError::Exhausted
pub const MAX_RETRIES: u32 = 20;

/// Longest supported token.
pub const MAX_TOKEN_LENGTH: usize = 64;

/// Default lifetime of a record: 180 days.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(180 * 24 * 60 * 60);

/// Process-wide allocation settings.
///
/// Every allocator sharing a store should use the same `token_length`;
/// tokens of different lengths never collide, so mixing lengths silently
/// splits the token space.
///
/// Fields are public; [`Self::validate`] checks them, and every allocation
/// runs it before touching the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Number of characters in every token, `1..=MAX_TOKEN_LENGTH`.
    pub token_length: usize,
    /// Candidates tried per allocation before giving up. At least one.
    pub max_retries: u32,
    /// Collisions between two widenings of the random suffix. Zero reads
    /// as one.
    pub raise_interval: u32,
    /// How long a record lives before the store deletes it.
    pub retention: Duration,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            token_length: DEFAULT_TOKEN_LENGTH,
            max_retries: MAX_RETRIES,
            raise_interval: RAISE_INTERVAL,
            retention: DEFAULT_RETENTION,
        }
    }
}

impl AllocatorConfig {
    /// Default settings with a custom token length.
    pub fn with_token_length(token_length: usize) -> Self {
        Self {
            token_length,
            ..Self::default()
        }
    }

    /// Checks that every field is within its supported range.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TokenLength`] if `token_length` is zero or above
    ///   [`MAX_TOKEN_LENGTH`].
    /// - [`ConfigError::ZeroRetries`] if `max_retries` is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.token_length == 0 || self.token_length > MAX_TOKEN_LENGTH {
            return Err(ConfigError::TokenLength {
                token_length: self.token_length,
                max: MAX_TOKEN_LENGTH,
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        Ok(())
    }
}
