//! Common types used throughout credseal.

use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Error, Result};

/// Minimum length of the master password, in characters.
pub const MIN_MASTER_PASSWORD_CHARS: usize = 32;

/// The long-lived secret every credential key is derived from.
///
/// Zeroized on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterPassword(String);

impl MasterPassword {
    /// Create a master password.
    ///
    /// # Errors
    /// - `Error::Configuration` if the password has fewer than
    ///   `MIN_MASTER_PASSWORD_CHARS` characters
    pub fn new(password: impl Into<String>) -> Result<Self> {
        let password = password.into();
        let chars = password.chars().count();
        if chars < MIN_MASTER_PASSWORD_CHARS {
            // Wrap first so the rejected value is still zeroized.
            drop(Self(password));
            return Err(Error::Configuration(format!(
                "Master password must be at least {} characters, got {}",
                MIN_MASTER_PASSWORD_CHARS, chars
            )));
        }
        Ok(Self(password))
    }

    /// Get the password bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Constant-time equality against a candidate password.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterPassword([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        let err = MasterPassword::new("k".repeat(31)).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_exact_minimum_accepted() {
        assert!(MasterPassword::new("k".repeat(32)).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 16 two-byte characters: 32 bytes but only 16 characters.
        assert!(MasterPassword::new("é".repeat(16)).is_err());
        assert!(MasterPassword::new("é".repeat(32)).is_ok());
    }

    #[test]
    fn test_error_does_not_echo_password() {
        let err = MasterPassword::new("hunter2").unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = MasterPassword::new("s".repeat(40)).unwrap();
        assert_eq!(format!("{:?}", password), "MasterPassword([REDACTED])");
    }

    #[test]
    fn test_matches() {
        let password = MasterPassword::new("a".repeat(40)).unwrap();
        assert!(password.matches(&"a".repeat(40)));
        assert!(!password.matches(&"a".repeat(39)));
        assert!(!password.matches(&"b".repeat(40)));
    }
}
