//! Session-related types.
//!
//! The remote API hands out an opaque bearer token on sign-in. It is the only
//! piece of visitor state persisted by the storefront.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Authentication token issued by the remote API.
///
/// Never empty. `Debug` output is redacted. Persisted as a plain string under
/// [`keys::USER_TOKEN`] and re-validated through [`SessionToken::new`] on load.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a token, rejecting empty or all-whitespace input.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(SecretString::from(token)))
        }
    }

    /// The raw token, for the outgoing `token` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Stable, non-reversible identifier for keying per-visitor caches.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.expose().as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

/// Session keys.
pub mod keys {
    /// Key for the remote API token.
    pub const USER_TOKEN: &str = "user_token";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(SessionToken::new("").is_none());
        assert!(SessionToken::new("   ").is_none());
        assert!(SessionToken::new("T1").is_some());
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = SessionToken::new("super-secret").unwrap();
        assert!(!format!("{token:?}").contains("super-secret"));
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = SessionToken::new("T1").unwrap();
        let b = SessionToken::new("T1").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_ne!(a.fingerprint(), SessionToken::new("T2").unwrap().fingerprint());
    }
}
