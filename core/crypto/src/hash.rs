//! Keyed SHA-256 digests and constant-time digest comparison.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::keys::DerivedKey;

/// Compute `hex(SHA256(value || hex(key)))`.
///
/// Deterministic for a fixed key; the digest cannot be reversed to recover
/// `value` without the key.
pub fn keyed_hash(value: &str, key: &DerivedKey) -> String {
    let key_hex = key.to_hex();

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.update(key_hex.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two digests in constant time.
///
/// Runs in time independent of where the first differing byte is. Inputs of
/// different length compare unequal without examining content.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Recompute the keyed hash of `value` and compare it to `digest_hex`.
pub fn verify_keyed_hash(value: &str, digest_hex: &str, key: &DerivedKey) -> bool {
    let computed = keyed_hash(value, key);
    constant_time_eq(computed.as_bytes(), digest_hex.as_bytes())
}
