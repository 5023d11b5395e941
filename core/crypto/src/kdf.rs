//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every credential key comes from the master password and a 32-byte salt,
//! iterated `PBKDF2_ITERATIONS` times to make password guessing expensive.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::keys::{DerivedKey, Salt, KEY_LENGTH};

/// Number of PBKDF2 rounds. Fixed for every envelope version.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive a 256-bit key from a password and salt.
///
/// # Postconditions
/// - The derived key is deterministic given the same inputs
///
/// Password length is validated when the master password is constructed,
/// not here; an empty password derives a key like any other.
pub fn derive_key(password: &[u8], salt: &Salt) -> DerivedKey {
    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password, salt.as_bytes(), PBKDF2_ITERATIONS, &mut key_bytes);
    DerivedKey::from_bytes(key_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let password = b"test-password-123";
        let salt = Salt::from_bytes([42u8; 32]);

        let key1 = derive_key(password, &salt);
        let key2 = derive_key(password, &salt);

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salt() {
        let password = b"test-password-123";
        let salt1 = Salt::from_bytes([1u8; 32]);
        let salt2 = Salt::from_bytes([2u8; 32]);

        let key1 = derive_key(password, &salt1);
        let key2 = derive_key(password, &salt2);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_password() {
        let salt = Salt::from_bytes([42u8; 32]);

        let key1 = derive_key(b"password1", &salt);
        let key2 = derive_key(b"password2", &salt);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_matches_pbkdf2_reference() {
        let salt = Salt::from_bytes([9u8; 32]);
        let mut expected = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha256>(b"reference", &[9u8; 32], 100_000, &mut expected);

        assert_eq!(derive_key(b"reference", &salt).as_bytes(), &expected);
    }

    #[test]
    fn test_empty_password_still_derives() {
        let salt = Salt::from_bytes([0u8; 32]);
        let key = derive_key(b"", &salt);
        assert_ne!(key.as_bytes(), &[0u8; KEY_LENGTH]);
    }
}
