//! credseal CLI - operator tooling for credential envelopes.
//!
//! Encryption commands read the master secret from `CREDENTIAL_ENCRYPTION_KEY`
//! and the global salt from `CREDENTIAL_ENCRYPTION_SALT`. Secrets are never
//! accepted on the command line except through `--value`, which exists for
//! scripting; prefer the prompt.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use credseal_crypto::{Envelope, Salt};
use credseal_service::{
    CredentialCipher, DEFAULT_PASSWORD_LENGTH, ENV_ENCRYPTION_KEY, ENV_ENCRYPTION_SALT,
};

#[derive(Parser)]
#[command(name = "credseal")]
#[command(about = "credseal - Credential envelope encryption")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a secret into a v1 envelope.
    Encrypt {
        /// Plaintext to encrypt (prompted if omitted).
        #[arg(long)]
        value: Option<String>,
    },

    /// Decrypt an envelope and print the plaintext.
    Decrypt {
        /// Envelope string.
        envelope: String,
    },

    /// Show format and salt of an envelope as JSON.
    Inspect {
        /// Envelope string.
        envelope: String,
    },

    /// Print the salt embedded in a v1 envelope.
    ExtractSalt {
        /// Envelope string.
        envelope: String,
    },

    /// Decrypt a legacy envelope with an explicit per-record salt.
    DecryptWithSalt {
        /// Envelope string.
        envelope: String,

        /// Hex-encoded 32-byte salt.
        #[arg(short, long)]
        salt: String,
    },

    /// Rewrite a legacy envelope as v1.
    Migrate {
        /// Envelope string.
        envelope: String,
    },

    /// Re-encrypt an envelope written under a previous master secret.
    Rotate {
        /// Envelope string.
        envelope: String,
    },

    /// Print the keyed hash of a value.
    Hash {
        /// Value to hash (prompted if omitted).
        #[arg(long)]
        value: Option<String>,
    },

    /// Check a value against a keyed hash.
    VerifyHash {
        /// Hex digest produced by `hash`.
        #[arg(short, long)]
        digest: String,

        /// Value to check (prompted if omitted).
        #[arg(long)]
        value: Option<String>,
    },

    /// Generate a random password.
    GenPassword {
        /// Number of characters.
        #[arg(short, long, default_value_t = DEFAULT_PASSWORD_LENGTH)]
        length: usize,
    },

    /// Generate a global salt for CREDENTIAL_ENCRYPTION_SALT.
    GenSalt,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Encrypt { value } => cmd_encrypt(value),
        Commands::Decrypt { envelope } => cmd_decrypt(&envelope),
        Commands::Inspect { envelope } => cmd_inspect(&envelope),
        Commands::ExtractSalt { envelope } => cmd_extract_salt(&envelope),
        Commands::DecryptWithSalt { envelope, salt } => cmd_decrypt_with_salt(&envelope, &salt),
        Commands::Migrate { envelope } => cmd_migrate(&envelope),
        Commands::Rotate { envelope } => cmd_rotate(&envelope),
        Commands::Hash { value } => cmd_hash(value),
        Commands::VerifyHash { digest, value } => cmd_verify_hash(&digest, value),
        Commands::GenPassword { length } => cmd_gen_password(length),
        Commands::GenSalt => cmd_gen_salt(),
    }
}

/// Load the cipher from the environment.
fn load_cipher() -> Result<CredentialCipher> {
    let cipher = CredentialCipher::from_env().context("Failed to initialize credential cipher")?;
    if cipher.global_salt_generated() {
        eprintln!(
            "warning: {} is not set; legacy envelopes cannot be decrypted",
            ENV_ENCRYPTION_SALT
        );
    }
    Ok(cipher)
}

/// Use `value` if given, otherwise prompt without echo.
fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<Zeroizing<String>> {
    match value {
        Some(v) => Ok(Zeroizing::new(v)),
        None => Ok(Zeroizing::new(
            rpassword::prompt_password(prompt).context("Failed to read secret")?,
        )),
    }
}

fn cmd_encrypt(value: Option<String>) -> Result<()> {
    let cipher = load_cipher()?;
    let plaintext = value_or_prompt(value, "Secret to encrypt: ")?;

    let envelope = cipher.encrypt(&plaintext).context("Failed to encrypt")?;
    println!("{}", envelope);
    Ok(())
}

fn cmd_decrypt(envelope: &str) -> Result<()> {
    let cipher = load_cipher()?;
    let plaintext = Zeroizing::new(cipher.decrypt(envelope).context("Failed to decrypt")?);
    println!("{}", plaintext.as_str());
    Ok(())
}

fn cmd_inspect(envelope: &str) -> Result<()> {
    let parsed = Envelope::parse(envelope).context("Not a valid envelope")?;
    println!("{}", serde_json::to_string_pretty(&parsed.info())?);
    Ok(())
}

fn cmd_extract_salt(envelope: &str) -> Result<()> {
    let cipher = load_cipher()?;
    match cipher.extract_salt(envelope) {
        Some(salt) => println!("{}", salt),
        None => anyhow::bail!("Envelope has no embedded salt (legacy format or malformed)"),
    }
    Ok(())
}

fn cmd_decrypt_with_salt(envelope: &str, salt: &str) -> Result<()> {
    let cipher = load_cipher()?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt_with_salt(envelope, salt)
            .context("Failed to decrypt")?,
    );
    println!("{}", plaintext.as_str());
    Ok(())
}

fn cmd_migrate(envelope: &str) -> Result<()> {
    let cipher = load_cipher()?;
    if !cipher.needs_migration(envelope) {
        info!("Envelope is already v1");
    }
    let migrated = cipher.migrate(envelope).context("Failed to migrate")?;
    println!("{}", migrated);
    Ok(())
}

fn cmd_rotate(envelope: &str) -> Result<()> {
    let cipher = load_cipher()?;

    let old_password = Zeroizing::new(
        rpassword::prompt_password("Previous master secret: ")
            .context("Failed to read previous master secret")?,
    );
    let new_password = Zeroizing::new(
        std::env::var(ENV_ENCRYPTION_KEY)
            .context("Current master secret is not set")?,
    );

    let rotated = cipher
        .rotate_key(&old_password, &new_password, envelope)
        .context("Failed to rotate envelope")?;
    println!("{}", rotated);
    Ok(())
}

fn cmd_hash(value: Option<String>) -> Result<()> {
    let cipher = load_cipher()?;
    let value = value_or_prompt(value, "Value to hash: ")?;
    println!("{}", cipher.hash(&value));
    Ok(())
}

fn cmd_verify_hash(digest: &str, value: Option<String>) -> Result<()> {
    let cipher = load_cipher()?;
    let value = value_or_prompt(value, "Value to check: ")?;

    if cipher.compare_hash(&value, digest) {
        println!("match");
        Ok(())
    } else {
        anyhow::bail!("Value does not match digest")
    }
}

fn cmd_gen_password(length: usize) -> Result<()> {
    let password = Zeroizing::new(credseal_crypto::generate_password(length)?);
    println!("{}", password.as_str());
    Ok(())
}

fn cmd_gen_salt() -> Result<()> {
    let salt = Salt::generate()?;
    println!("{}={}", ENV_ENCRYPTION_SALT, salt.to_hex());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_gen_password_default() {
        let cli = Cli::try_parse_from(["credseal", "gen-password"]).unwrap();
        match cli.command {
            Commands::GenPassword { length } => assert_eq!(length, DEFAULT_PASSWORD_LENGTH),
            _ => panic!("expected gen-password"),
        }
    }

    #[test]
    fn test_parse_decrypt_with_salt() {
        let cli = Cli::try_parse_from([
            "credseal",
            "decrypt-with-salt",
            "AAAA",
            "--salt",
            "abcd",
        ])
        .unwrap();
        match cli.command {
            Commands::DecryptWithSalt { envelope, salt } => {
                assert_eq!(envelope, "AAAA");
                assert_eq!(salt, "abcd");
            }
            _ => panic!("expected decrypt-with-salt"),
        }
    }
}
