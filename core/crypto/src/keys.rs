//! Key and salt types with secure memory handling.
//!
//! Derived keys zeroize their memory on drop so key material does not
//! outlive the operation that needed it.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use credseal_common::{Error, Result};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of key-derivation salts in bytes.
pub const SALT_LENGTH: usize = 32;

/// Symmetric key derived from the master password and a salt.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a derived key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Lowercase hex encoding of the key, used as the keyed-hash suffix.
    pub(crate) fn to_hex(&self) -> zeroize::Zeroizing<String> {
        zeroize::Zeroizing::new(hex::encode(self.key))
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED])")
    }
}

/// Salt for key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a random salt from the operating system RNG.
    ///
    /// # Errors
    /// - `Error::Encryption` if the RNG is unavailable
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|_| Error::Encryption)?;
        Ok(Self(salt))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a salt from a slice of exactly `SALT_LENGTH` bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Parse a salt from 64 hex characters.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if the string is not valid hex or does not
    ///   decode to exactly `SALT_LENGTH` bytes
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|_| Error::InvalidInput("Salt is not valid hex".to_string()))?;
        Self::from_slice(&bytes).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Salt must be {} bytes, got {}",
                SALT_LENGTH,
                bytes.len()
            ))
        })
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

/// Fill `buf` from the operating system RNG, mapping failure to
/// `Error::Encryption`.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|_| Error::Encryption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_generate() {
        let salt1 = Salt::generate().unwrap();
        let salt2 = Salt::generate().unwrap();

        // Random salts should be different
        assert_ne!(salt1.as_bytes(), salt2.as_bytes());
    }

    #[test]
    fn test_salt_hex() {
        let salt = Salt::from_bytes([0xABu8; SALT_LENGTH]);
        let hex = salt.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, "ab".repeat(32));
        assert_eq!(Salt::from_hex(&hex).unwrap(), salt);
        assert_eq!(Salt::from_hex(&hex.to_uppercase()).unwrap(), salt);
    }

    #[test]
    fn test_salt_from_hex_rejects_bad_input() {
        assert!(Salt::from_hex("not hex").is_err());
        assert!(Salt::from_hex("abcd").is_err());
        assert!(Salt::from_hex(&"ab".repeat(33)).is_err());
        assert!(Salt::from_hex("").is_err());
    }

    #[test]
    fn test_derived_key_debug_is_redacted() {
        let key = DerivedKey::from_bytes([7u8; KEY_LENGTH]);
        assert_eq!(format!("{:?}", key), "DerivedKey([REDACTED])");
    }
}
