//! Random password generation.

use crate::keys::fill_random;
use credseal_common::Result;

/// Characters a generated password draws from.
pub const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Default generated password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 32;

/// Generate a password of `length` characters from `PASSWORD_CHARSET`.
///
/// Each character is one OS-random byte reduced modulo the charset size.
/// The resulting bias toward the first characters of the set is accepted.
///
/// # Errors
/// - `Error::Encryption` if the RNG is unavailable
pub fn generate_password(length: usize) -> Result<String> {
    if length == 0 {
        return Ok(String::new());
    }

    let mut bytes = vec![0u8; length];
    fill_random(&mut bytes)?;

    let password = bytes
        .iter()
        .map(|b| PASSWORD_CHARSET[*b as usize % PASSWORD_CHARSET.len()] as char)
        .collect();
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(generate_password(DEFAULT_PASSWORD_LENGTH).unwrap().len(), 32);
        assert_eq!(generate_password(1).unwrap().len(), 1);
        assert_eq!(generate_password(500).unwrap().len(), 500);
    }

    #[test]
    fn test_zero_length_is_empty() {
        assert_eq!(generate_password(0).unwrap(), "");
    }

    #[test]
    fn test_only_charset_characters() {
        let password = generate_password(1000).unwrap();
        assert!(password.bytes().all(|b| PASSWORD_CHARSET.contains(&b)));
    }

    #[test]
    fn test_passwords_differ() {
        let p1 = generate_password(32).unwrap();
        let p2 = generate_password(32).unwrap();
        assert_ne!(p1, p2);
    }
}
