//! Credential encryption service.
//!
//! Turns plaintext secrets (service-account passwords, OAuth client secrets)
//! into tamper-evident envelopes for storage, and back. Construct a single
//! [`CredentialCipher`] at startup and pass it to collaborators by reference.
//!
//! ```no_run
//! use credseal_service::CredentialCipher;
//!
//! let cipher = CredentialCipher::from_env()?;
//! let envelope = cipher.encrypt("hunter2")?;
//! assert_eq!(cipher.decrypt(&envelope)?, "hunter2");
//! # Ok::<(), credseal_common::Error>(())
//! ```

pub mod cipher;
pub mod config;

pub use cipher::CredentialCipher;
pub use config::{CipherConfig, ENV_ENCRYPTION_KEY, ENV_ENCRYPTION_SALT};
pub use credseal_common::{Error, Result};
pub use credseal_crypto::{EnvelopeFormat, Salt, DEFAULT_PASSWORD_LENGTH};
