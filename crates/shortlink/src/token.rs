use core::fmt;

/// Default number of characters in a token.
pub const DEFAULT_TOKEN_LENGTH: usize = 6;

/// The 62 characters a token may contain, in index order.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A fixed-length alphanumeric key identifying a short link.
///
/// Tokens produced by the [`Allocator`] are always exactly `token_length`
/// characters drawn from [`ALPHABET`]. Tokens arriving from the outside (for
/// example a request path) should go through [`Token::parse`].
///
/// # Example
/// ```
/// use shortlink::Token;
///
/// let token = Token::parse("abc123", 6).unwrap();
/// assert_eq!(token.as_str(), "abc123");
/// assert!(Token::parse("abc12", 6).is_none());
/// assert!(Token::parse("abc-12", 6).is_none());
/// ```
///
/// [`Allocator`]: crate::Allocator
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Token(String);

impl Token {
    /// Parses `s` as a token of exactly `token_length` alphanumeric
    /// characters.
    pub fn parse(s: &str, token_length: usize) -> Option<Self> {
        (s.len() == token_length && is_alphanumeric(s)).then(|| Self(s.to_owned()))
    }

    /// Wraps an already generated candidate.
    pub(crate) const fn from_candidate(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Returns `true` if `hint` matches `^[0-9a-zA-Z]{0,token_length}$`.
///
/// This is a pure function of its arguments.
///
/// # Example
/// ```
/// use shortlink::validate_hint;
///
/// assert!(validate_hint("", 6));
/// assert!(validate_hint("token0", 6));
/// assert!(!validate_hint("token00", 6));
/// assert!(!validate_hint("tok_n", 6));
/// ```
pub fn validate_hint(hint: &str, token_length: usize) -> bool {
    hint.len() <= token_length && is_alphanumeric(hint)
}

fn is_alphanumeric(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphanumeric())
}
