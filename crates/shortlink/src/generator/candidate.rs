#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{ALPHABET, RandSource, Token};

/// Number of collisions after which one more trailing character of the hint
/// is given up to randomness.
pub const RAISE_INTERVAL: u32 = 3;

/// Generator state for one allocation: the hint, how many trailing characters
/// are randomized (`offset`) and how many candidates were already rejected.
///
/// The state is a plain value owned by the allocation loop. Producing a
/// candidate never mutates it; only [`Self::record_collision`] does, which
/// keeps `offset` non-decreasing and bounded by the token length.
///
/// ## Escalation
/// - `offset` starts at `token_length - len(hint)` (zero for a full-length
///   hint, so it is tried verbatim exactly once).
/// - After the candidate at attempt `i` collides, `offset` grows by one when
///   `i == 0` or `i % raise_interval == 0`, capped at `token_length`.
///
/// # Example
/// ```
/// use shortlink::{CandidateState, RandSource, RAISE_INTERVAL};
///
/// struct Zeros;
/// impl RandSource<u64> for Zeros {
///     fn rand(&self) -> u64 {
///         0
///     }
/// }
///
/// let mut state = CandidateState::new("token1", 6, RAISE_INTERVAL);
/// assert_eq!(state.candidate(&Zeros), "token1");
///
/// state.record_collision();
/// assert_eq!(state.offset(), 1);
/// assert_eq!(state.candidate(&Zeros), "token0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateState {
    hint: String,
    token_length: usize,
    raise_interval: u32,
    offset: usize,
    attempt: u32,
}

impl CandidateState {
    /// Creates the state for a fresh allocation.
    ///
    /// A hint longer than `token_length` is truncated. A `raise_interval` of
    /// zero is treated as one.
    pub fn new(hint: &str, token_length: usize, raise_interval: u32) -> Self {
        let hint: String = hint.chars().take(token_length).collect();
        let offset = token_length.saturating_sub(hint.chars().count());
        Self {
            hint,
            token_length,
            raise_interval: raise_interval.max(1),
            offset,
            attempt: 0,
        }
    }

    /// The (possibly truncated) hint.
    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub const fn token_length(&self) -> usize {
        self.token_length
    }

    /// Number of trailing characters that are randomized.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of leading characters taken from the hint.
    pub const fn prefix_len(&self) -> usize {
        self.token_length - self.offset
    }

    /// Zero-based index of the next candidate.
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Produces the candidate for the current attempt: the first
    /// [`Self::prefix_len`] characters of the hint followed by
    /// [`Self::offset`] random characters.
    pub fn candidate<R>(&self, rng: &R) -> Token
    where
        R: RandSource<u64> + ?Sized,
    {
        let mut token = String::with_capacity(self.token_length);
        token.extend(self.hint.chars().take(self.prefix_len()));
        token.extend((0..self.offset).map(|_| random_char(rng)));
        Token::from_candidate(token)
    }

    /// Records that the current candidate collided and advances to the next
    /// attempt, widening the random suffix when the escalation rule fires.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all, fields(attempt = self.attempt, offset = self.offset)))]
    pub fn record_collision(&mut self) {
        let raise = self.attempt == 0 || self.attempt % self.raise_interval == 0;
        if raise && self.offset < self.token_length {
            self.offset += 1;
        }
        self.attempt = self.attempt.saturating_add(1);
    }
}

/// Draws one character uniformly from [`ALPHABET`].
///
/// Maps the full `u64` range onto the alphabet by multiply-and-shift, so every
/// random value is usable and no rejection loop is needed.
pub fn random_char<R>(rng: &R) -> char
where
    R: RandSource<u64> + ?Sized,
{
    let index = (u128::from(rng.rand()) * ALPHABET.len() as u128) >> 64;
    ALPHABET[index as usize] as char
}
