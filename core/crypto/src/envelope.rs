//! Ciphertext envelope codec.
//!
//! Two layouts are understood:
//!
//! ```text
//! v1:      "v1:" + base64(salt[32] || iv[16] || tag[16] || ciphertext)
//! legacy:         base64(iv[16] || tag[16] || ciphertext)
//! ```
//!
//! The format is decided by the `"v1:"` prefix alone. New writes are always
//! v1; legacy envelopes are only ever read.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;

use crate::aead::{Sealed, IV_SIZE, TAG_SIZE};
use crate::keys::{Salt, SALT_LENGTH};
use credseal_common::{Error, Result};

/// Prefix marking a v1 envelope.
pub const V1_PREFIX: &str = "v1:";

/// Which layout an envelope string uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeFormat {
    V1,
    Legacy,
}

impl EnvelopeFormat {
    /// Classify an envelope string by its prefix. Never fails.
    pub fn detect(envelope: &str) -> Self {
        if envelope.starts_with(V1_PREFIX) {
            EnvelopeFormat::V1
        } else {
            EnvelopeFormat::Legacy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeFormat::V1 => "v1",
            EnvelopeFormat::Legacy => "legacy",
        }
    }
}

/// A parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Per-record salt embedded in the payload.
    V1 {
        salt: Salt,
        iv: [u8; IV_SIZE],
        tag: [u8; TAG_SIZE],
        ciphertext: Vec<u8>,
    },
    /// No salt; decrypted with the key derived from the global salt.
    Legacy {
        iv: [u8; IV_SIZE],
        tag: [u8; TAG_SIZE],
        ciphertext: Vec<u8>,
    },
}

/// Non-secret summary of an envelope, for operator tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeInfo {
    pub format: EnvelopeFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    pub ciphertext_len: usize,
}

impl Envelope {
    /// Build a v1 envelope from a salt and AEAD output.
    pub fn v1(salt: Salt, sealed: Sealed) -> Self {
        Envelope::V1 {
            salt,
            iv: sealed.iv,
            tag: sealed.tag,
            ciphertext: sealed.ciphertext,
        }
    }

    /// Build a legacy envelope from AEAD output.
    pub fn legacy(sealed: Sealed) -> Self {
        Envelope::Legacy {
            iv: sealed.iv,
            tag: sealed.tag,
            ciphertext: sealed.ciphertext,
        }
    }

    /// Parse an envelope string.
    ///
    /// # Errors
    /// - `Error::Decryption` for invalid base64 or a payload too short for
    ///   its format. The error does not say which.
    pub fn parse(envelope: &str) -> Result<Self> {
        match EnvelopeFormat::detect(envelope) {
            EnvelopeFormat::V1 => {
                let payload = decode_payload(&envelope[V1_PREFIX.len()..])?;
                if payload.len() < SALT_LENGTH + IV_SIZE + TAG_SIZE {
                    return Err(Error::Decryption);
                }
                let (salt, rest) = payload.split_at(SALT_LENGTH);
                let salt = Salt::from_slice(salt).ok_or(Error::Decryption)?;
                let (iv, tag, ciphertext) = split_sealed(rest)?;
                Ok(Envelope::V1 {
                    salt,
                    iv,
                    tag,
                    ciphertext,
                })
            }
            EnvelopeFormat::Legacy => {
                let payload = decode_payload(envelope)?;
                let (iv, tag, ciphertext) = split_sealed(&payload)?;
                Ok(Envelope::Legacy {
                    iv,
                    tag,
                    ciphertext,
                })
            }
        }
    }

    /// Serialize to the envelope string.
    pub fn encode(&self) -> String {
        match self {
            Envelope::V1 {
                salt,
                iv,
                tag,
                ciphertext,
            } => {
                let mut blob =
                    Vec::with_capacity(SALT_LENGTH + IV_SIZE + TAG_SIZE + ciphertext.len());
                blob.extend_from_slice(salt.as_bytes());
                blob.extend_from_slice(iv);
                blob.extend_from_slice(tag);
                blob.extend_from_slice(ciphertext);
                format!("{}{}", V1_PREFIX, BASE64.encode(&blob))
            }
            Envelope::Legacy {
                iv,
                tag,
                ciphertext,
            } => {
                let mut blob = Vec::with_capacity(IV_SIZE + TAG_SIZE + ciphertext.len());
                blob.extend_from_slice(iv);
                blob.extend_from_slice(tag);
                blob.extend_from_slice(ciphertext);
                BASE64.encode(&blob)
            }
        }
    }

    pub fn format(&self) -> EnvelopeFormat {
        match self {
            Envelope::V1 { .. } => EnvelopeFormat::V1,
            Envelope::Legacy { .. } => EnvelopeFormat::Legacy,
        }
    }

    /// The embedded salt, if this is a v1 envelope.
    pub fn salt(&self) -> Option<&Salt> {
        match self {
            Envelope::V1 { salt, .. } => Some(salt),
            Envelope::Legacy { .. } => None,
        }
    }

    /// IV, tag and ciphertext, common to both formats.
    pub fn sealed_parts(&self) -> (&[u8; IV_SIZE], &[u8; TAG_SIZE], &[u8]) {
        match self {
            Envelope::V1 {
                iv, tag, ciphertext, ..
            }
            | Envelope::Legacy {
                iv, tag, ciphertext, ..
            } => (iv, tag, ciphertext.as_slice()),
        }
    }

    pub fn info(&self) -> EnvelopeInfo {
        let (_, _, ciphertext) = self.sealed_parts();
        EnvelopeInfo {
            format: self.format(),
            salt: self.salt().map(Salt::to_hex),
            ciphertext_len: ciphertext.len(),
        }
    }
}

fn decode_payload(body: &str) -> Result<Vec<u8>> {
    BASE64.decode(body).map_err(|_| Error::Decryption)
}

fn split_sealed(bytes: &[u8]) -> Result<([u8; IV_SIZE], [u8; TAG_SIZE], Vec<u8>)> {
    if bytes.len() < IV_SIZE + TAG_SIZE {
        return Err(Error::Decryption);
    }
    let (iv, rest) = bytes.split_at(IV_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let mut iv_bytes = [0u8; IV_SIZE];
    iv_bytes.copy_from_slice(iv);
    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag);

    Ok((iv_bytes, tag_bytes, ciphertext.to_vec()))
}
