//! Authenticated encryption using AES-256-GCM.
//!
//! Envelopes carry a 16-byte IV and keep the 16-byte tag separate from the
//! ciphertext, so this module works with detached tags rather than the
//! `ciphertext || tag` layout the `Aead` trait produces.

use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm,
};
use zeroize::Zeroize;

use crate::keys::{fill_random, DerivedKey};
use credseal_common::{Error, Result};

/// IV size (16 bytes). GCM accepts non-96-bit nonces by hashing them.
pub const IV_SIZE: usize = 16;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// AES-256-GCM with a 128-bit IV.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Output of a single AEAD encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; IV_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Encrypt plaintext under a fresh random IV.
///
/// # Postconditions
/// - `ciphertext.len() == plaintext.len()`
/// - The IV is drawn from the operating system RNG
///
/// # Errors
/// - `Error::Encryption` if the RNG or the cipher fails
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<Sealed> {
    let mut iv = [0u8; IV_SIZE];
    fill_random(&mut iv)?;
    seal_with_iv(key, &iv, plaintext)
}

/// Encrypt plaintext with a caller-chosen IV.
///
/// # Warning
/// Reusing an IV with the same key breaks GCM completely. Only use this
/// when the IV was freshly generated.
pub fn seal_with_iv(key: &DerivedKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(key.as_bytes()));

    let mut buffer = plaintext.to_vec();
    let tag = match cipher.encrypt_in_place_detached(GenericArray::from_slice(iv), b"", &mut buffer)
    {
        Ok(tag) => tag,
        Err(_) => {
            buffer.zeroize();
            return Err(Error::Encryption);
        }
    };

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(Sealed {
        iv: *iv,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypt and authenticate.
///
/// # Postconditions
/// - Returns plaintext only if the tag verifies
///
/// # Errors
/// - `Error::Decryption` on any authentication failure (wrong key, tampered
///   IV, tag, or ciphertext)
pub fn open(
    key: &DerivedKey,
    iv: &[u8; IV_SIZE],
    tag: &[u8; TAG_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(key.as_bytes()));

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| Error::Decryption)?;

    Ok(buffer)
}
