//! Service configuration from the environment.

use credseal_common::{Error, MasterPassword, Result};
use credseal_crypto::Salt;

/// Environment variable holding the master secret.
pub const ENV_ENCRYPTION_KEY: &str = "CREDENTIAL_ENCRYPTION_KEY";

/// Environment variable holding the hex-encoded global salt.
pub const ENV_ENCRYPTION_SALT: &str = "CREDENTIAL_ENCRYPTION_SALT";

/// Inputs needed to construct a `CredentialCipher`.
#[derive(Debug, Clone)]
pub struct CipherConfig {
    /// Master secret all keys are derived from.
    pub master_password: MasterPassword,
    /// Global salt for legacy envelopes. Generated at construction if absent.
    pub global_salt: Option<Salt>,
}

impl CipherConfig {
    /// Create a configuration from explicit values.
    ///
    /// # Errors
    /// - `Error::Configuration` if the master password is too short
    pub fn new(master_password: impl Into<String>, global_salt: Option<Salt>) -> Result<Self> {
        Ok(Self {
            master_password: MasterPassword::new(master_password)?,
            global_salt,
        })
    }

    /// Read `CREDENTIAL_ENCRYPTION_KEY` and `CREDENTIAL_ENCRYPTION_SALT`
    /// from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// - `Error::Configuration` if the key is missing or shorter than 32
    ///   characters, or the salt is present but not 64 hex characters
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup(ENV_ENCRYPTION_KEY).ok_or_else(|| {
            Error::Configuration(format!("{} is not set", ENV_ENCRYPTION_KEY))
        })?;
        let master_password = MasterPassword::new(key).map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("{}: {}", ENV_ENCRYPTION_KEY, msg))
            }
            other => other,
        })?;

        let global_salt = match lookup(ENV_ENCRYPTION_SALT) {
            Some(value) if !value.trim().is_empty() => Some(Salt::from_hex(&value).map_err(
                |_| {
                    Error::Configuration(format!(
                        "Invalid {}: must be 64 hex characters (32 bytes)",
                        ENV_ENCRYPTION_SALT
                    ))
                },
            )?),
            _ => None,
        };

        Ok(Self {
            master_password,
            global_salt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key() {
        let err = CipherConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(ENV_ENCRYPTION_KEY));
    }

    #[test]
    fn test_short_key() {
        let key = "k".repeat(31);
        let err = CipherConfig::from_lookup(lookup(&[(ENV_ENCRYPTION_KEY, &key)])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!err.to_string().contains(&key));
    }

    #[test]
    fn test_key_without_salt() {
        let key = "k".repeat(32);
        let config = CipherConfig::from_lookup(lookup(&[(ENV_ENCRYPTION_KEY, &key)])).unwrap();
        assert!(config.global_salt.is_none());
    }

    #[test]
    fn test_empty_salt_is_absent() {
        let key = "k".repeat(40);
        let config = CipherConfig::from_lookup(lookup(&[
            (ENV_ENCRYPTION_KEY, &key),
            (ENV_ENCRYPTION_SALT, "  "),
        ]))
        .unwrap();
        assert!(config.global_salt.is_none());
    }

    #[test]
    fn test_key_with_salt() {
        let key = "k".repeat(40);
        let salt = "0f".repeat(32);
        let config = CipherConfig::from_lookup(lookup(&[
            (ENV_ENCRYPTION_KEY, &key),
            (ENV_ENCRYPTION_SALT, &salt),
        ]))
        .unwrap();
        assert_eq!(config.global_salt, Some(Salt::from_bytes([0x0f; 32])));
    }

    #[test]
    fn test_invalid_salt() {
        let key = "k".repeat(40);
        for salt in ["xyz", "abcd"] {
            let err = CipherConfig::from_lookup(lookup(&[
                (ENV_ENCRYPTION_KEY, &key),
                (ENV_ENCRYPTION_SALT, salt),
            ]))
            .unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
        }
    }
}
