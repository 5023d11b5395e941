//! Common utilities and types shared across credseal crates.
//!
//! This module provides the error taxonomy used at every component boundary
//! and the zeroizing wrapper for the master password.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{MasterPassword, MIN_MASTER_PASSWORD_CHARS};
