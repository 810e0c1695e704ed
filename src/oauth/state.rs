//! CSRF state tokens for a single authorization attempt.

use std::fmt;

use rand::Rng;

/// Characters used for generated state tokens.
const STATE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated state tokens.
const STATE_LENGTH: usize = 32;

/// Opaque correlation value round-tripped through the consent redirect.
///
/// Lives only in memory for the duration of one attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    /// Generate a fresh random state.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let token = (0..STATE_LENGTH)
            .map(|_| STATE_CHARS[rng.random_range(0..STATE_CHARS.len())] as char)
            .collect();
        Self(token)
    }

    /// Wrap a caller-supplied state.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a value echoed back by the provider belongs to this attempt.
    pub fn matches(&self, echoed: &str) -> bool {
        // Length is not secret; contents are compared without early exit.
        let a = self.0.as_bytes();
        let b = echoed.as_bytes();
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateToken").field(&self.0).finish()
    }
}
