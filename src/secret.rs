//! A sensitive-buffer type used for every password, refresh token, and client secret held on an
//! [`Account`](crate::account::Account). The wrapped bytes are overwritten with a fixed pattern
//! before the backing memory is released, and `Debug`/`Display` never leak the value.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A `String` that zeroizes its contents on drop and never prints itself.
///
/// `Secret` intentionally does not implement `Copy`, and `Clone` allocates a fresh buffer rather
/// than aliasing the original -- there is exactly one owner of the plaintext at a time plus
/// however many clones the caller explicitly asked for.
#[derive(Clone, Serialize, Deserialize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a plaintext value.
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// An empty secret, equivalent to "no value stored".
    pub fn empty() -> Self {
        Secret(String::new())
    }

    /// True if the underlying value has zero length.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the plaintext value. Callers must not log or otherwise persist the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Overwrite the buffer with fixed bytes and clear it, without waiting for drop.
    pub fn wipe(&mut self) {
        self.0.zeroize();
        self.0.clear();
    }
}

impl Default for Secret {
    fn default() -> Self {
        Secret::empty()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Secret(<empty>)")
        } else {
            write!(f, "Secret(<redacted>)")
        }
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret(value.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_debug_never_leaks() {
        let s = Secret::new("super-secret-password");
        let rendered = format!("{:?}", s);
        assert!(!rendered.contains("super-secret-password"));
    }

    #[test]
    fn test_empty_debug() {
        let s = Secret::empty();
        assert_eq!(format!("{:?}", s), "Secret(<empty>)");
    }

    #[test]
    fn test_wipe_clears_value() {
        let mut s = Secret::new("hunter2");
        s.wipe();
        assert!(s.is_empty());
        assert_eq!(s.expose(), "");
    }
}
