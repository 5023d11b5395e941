//! Cryptographic primitives for credseal.
//!
//! This module provides:
//! - Key derivation using PBKDF2-HMAC-SHA256
//! - Authenticated encryption using AES-256-GCM with detached tags
//! - The v1 and legacy ciphertext envelope codec
//! - Keyed hashing with constant-time comparison
//! - Random password generation
//!
//! # Security Guarantees
//! - Derived keys are zeroized on drop
//! - No plaintext or key material is ever logged
//! - Constant-time operations for sensitive comparisons

pub mod aead;
pub mod envelope;
pub mod hash;
pub mod kdf;
pub mod keys;
pub mod password;

pub use aead::{open, seal, Sealed, IV_SIZE, TAG_SIZE};
pub use envelope::{Envelope, EnvelopeFormat, EnvelopeInfo, V1_PREFIX};
pub use hash::{constant_time_eq, keyed_hash, verify_keyed_hash};
pub use kdf::{derive_key, PBKDF2_ITERATIONS};
pub use keys::{DerivedKey, Salt, KEY_LENGTH, SALT_LENGTH};
pub use password::{generate_password, DEFAULT_PASSWORD_LENGTH, PASSWORD_CHARSET};
