//! The credential cipher.
//!
//! One `CredentialCipher` is constructed at startup and shared by reference
//! (or `Arc`) with every component that stores credentials. It holds no
//! mutable state, so all methods take `&self` and are safe to call from
//! many threads at once.

use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::config::{CipherConfig, ENV_ENCRYPTION_SALT};
use credseal_common::{Error, MasterPassword, Result};
use credseal_crypto::{
    aead, derive_key, generate_password, keyed_hash, verify_keyed_hash, DerivedKey, Envelope,
    EnvelopeFormat, Salt,
};

/// Encrypts plaintext secrets into v1 envelopes and decrypts both envelope
/// formats.
pub struct CredentialCipher {
    master_password: MasterPassword,
    global_salt: Salt,
    global_salt_generated: bool,
    /// Derived once from the master password and global salt. Only ever
    /// used for legacy envelopes and the keyed hash.
    legacy_key: DerivedKey,
}

impl CredentialCipher {
    /// Construct the cipher.
    ///
    /// If the configuration has no global salt a random one is generated and
    /// logged once at WARN so the operator can persist it. A salt that
    /// changes across restarts makes every legacy envelope undecryptable.
    ///
    /// # Errors
    /// - `Error::Configuration` if a global salt is needed and the RNG fails
    pub fn new(config: CipherConfig) -> Result<Self> {
        let CipherConfig {
            master_password,
            global_salt,
        } = config;

        let (global_salt, global_salt_generated) = match global_salt {
            Some(salt) => (salt, false),
            None => {
                let salt = Salt::generate().map_err(|_| {
                    Error::Configuration("Failed to generate global salt".to_string())
                })?;
                warn!(
                    salt = %salt.to_hex(),
                    env = ENV_ENCRYPTION_SALT,
                    "Generated a new global salt; persist it or legacy credentials will not decrypt after restart"
                );
                (salt, true)
            }
        };

        let legacy_key = derive_key(master_password.as_bytes(), &global_salt);

        info!(
            global_salt_generated,
            "Credential cipher initialized"
        );

        Ok(Self {
            master_password,
            global_salt,
            global_salt_generated,
            legacy_key,
        })
    }

    /// Construct from `CREDENTIAL_ENCRYPTION_KEY` and
    /// `CREDENTIAL_ENCRYPTION_SALT`.
    pub fn from_env() -> Result<Self> {
        Self::new(CipherConfig::from_env()?)
    }

    /// Encrypt a plaintext into a new v1 envelope.
    ///
    /// A fresh salt and IV are drawn for every call, so encrypting the same
    /// plaintext twice yields different envelopes.
    ///
    /// # Errors
    /// - `Error::Encryption` on any RNG or cipher failure
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let salt = Salt::generate()?;
        let key = derive_key(self.master_password.as_bytes(), &salt);
        let sealed = aead::seal(&key, plaintext.as_bytes())?;

        debug!(len = plaintext.len(), "Credential encrypted");
        Ok(Envelope::v1(salt, sealed).encode())
    }

    /// Decrypt a v1 or legacy envelope.
    ///
    /// # Errors
    /// - `Error::Decryption` for malformed input, truncated payloads, tag
    ///   mismatches, or non UTF-8 plaintext
    pub fn decrypt(&self, envelope: &str) -> Result<String> {
        match Envelope::parse(envelope)? {
            parsed @ Envelope::V1 { .. } => {
                let key = self.key_for(&parsed, self.master_password.as_bytes());
                open_envelope(&key, &parsed)
            }
            parsed @ Envelope::Legacy { .. } => {
                debug!("Decrypting legacy credential; eligible for migration");
                open_envelope(&self.legacy_key, &parsed)
            }
        }
    }

    /// Decrypt with a key derived from `password` instead of the master
    /// password. v1 envelopes use their embedded salt; legacy envelopes use
    /// this instance's global salt.
    pub fn decrypt_with_password(&self, password: &str, envelope: &str) -> Result<String> {
        let parsed = Envelope::parse(envelope)?;
        let key = self.key_for(&parsed, password.as_bytes());
        open_envelope(&key, &parsed)
    }

    /// Hex salt embedded in a v1 envelope. `None` for legacy envelopes or
    /// anything that does not parse.
    pub fn extract_salt(&self, envelope: &str) -> Option<String> {
        Envelope::parse(envelope)
            .ok()
            .and_then(|parsed| parsed.salt().map(Salt::to_hex))
    }

    /// Decrypt a legacy envelope using an explicitly supplied salt rather
    /// than the global one. v1 envelopes ignore `salt_hex` and decrypt as
    /// usual.
    ///
    /// # Errors
    /// - `Error::Decryption` if `salt_hex` is malformed or decryption fails
    pub fn decrypt_with_salt(&self, envelope: &str, salt_hex: &str) -> Result<String> {
        if EnvelopeFormat::detect(envelope) == EnvelopeFormat::V1 {
            return self.decrypt(envelope);
        }

        let salt = Salt::from_hex(salt_hex).map_err(|_| Error::Decryption)?;
        let parsed = Envelope::parse(envelope)?;
        let key = derive_key(self.master_password.as_bytes(), &salt);
        open_envelope(&key, &parsed)
    }

    /// Re-encrypt an envelope written under `old_password` so it decrypts
    /// under this instance's master password.
    ///
    /// `new_password` must be the password this instance was built with.
    ///
    /// # Errors
    /// - `Error::Configuration` if `new_password` is not the active master
    ///   password
    /// - `Error::Decryption` if the envelope does not decrypt under
    ///   `old_password`
    pub fn rotate_key(
        &self,
        old_password: &str,
        new_password: &str,
        envelope: &str,
    ) -> Result<String> {
        if !self.master_password.matches(new_password) {
            return Err(Error::Configuration(
                "New password does not match the active master password".to_string(),
            ));
        }

        let mut plaintext = self.decrypt_with_password(old_password, envelope)?;
        let rotated = self.encrypt(&plaintext);
        plaintext.zeroize();
        rotated
    }

    /// Whether an envelope uses the legacy layout.
    pub fn needs_migration(&self, envelope: &str) -> bool {
        EnvelopeFormat::detect(envelope) == EnvelopeFormat::Legacy
    }

    /// Rewrite a legacy envelope as v1 under the same master password.
    /// v1 envelopes are returned unchanged once they are known to decrypt.
    pub fn migrate(&self, envelope: &str) -> Result<String> {
        let mut plaintext = self.decrypt(envelope)?;
        let migrated = if self.needs_migration(envelope) {
            self.encrypt(&plaintext)
        } else {
            Ok(envelope.to_string())
        };
        plaintext.zeroize();
        migrated
    }

    /// Generate a random password of `length` characters.
    pub fn generate_secure_password(&self, length: usize) -> Result<String> {
        generate_password(length)
    }

    /// Keyed, non-reversible digest of `value` for later comparison.
    pub fn hash(&self, value: &str) -> String {
        keyed_hash(value, &self.legacy_key)
    }

    /// Compare `plaintext` against a digest from [`hash`](Self::hash) in
    /// constant time.
    pub fn compare_hash(&self, plaintext: &str, digest_hex: &str) -> bool {
        verify_keyed_hash(plaintext, digest_hex, &self.legacy_key)
    }

    /// Hex encoding of the global salt, for the operator to persist.
    pub fn global_salt_hex(&self) -> String {
        self.global_salt.to_hex()
    }

    /// Whether the global salt was generated at construction rather than
    /// configured.
    pub fn global_salt_generated(&self) -> bool {
        self.global_salt_generated
    }

    fn key_for(&self, envelope: &Envelope, password: &[u8]) -> DerivedKey {
        let salt = envelope.salt().unwrap_or(&self.global_salt);
        derive_key(password, salt)
    }
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("global_salt_generated", &self.global_salt_generated)
            .finish_non_exhaustive()
    }
}

fn open_envelope(key: &DerivedKey, envelope: &Envelope) -> Result<String> {
    let (iv, tag, ciphertext) = envelope.sealed_parts();
    let plaintext = aead::open(key, iv, tag, ciphertext)?;

    String::from_utf8(plaintext).map_err(|e| {
        e.into_bytes().zeroize();
        Error::Decryption
    })
}
