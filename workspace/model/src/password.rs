//! Password encoding for stored users.
//!
//! Usable passwords are stored as PHC strings produced by Argon2id. A user created
//! without a password gets an *unusable* encoding instead: a `!` followed by random
//! characters, which never verifies against any input.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{Rng, RngCore, distributions::Alphanumeric};
use thiserror::Error;
use tracing::{instrument, trace, warn};

/// Prefix marking an encoded password that can never be used to log in.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// Number of random characters following the unusable prefix.
const UNUSABLE_PASSWORD_SUFFIX_LENGTH: usize = 40;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Malformed password hash: {0}")]
    Malformed(String),
}

/// Encodes a raw password for storage.
///
/// `None` produces an unusable password.
#[instrument(skip_all)]
pub fn make_password(password: Option<&str>) -> Result<String, PasswordError> {
    let Some(password) = password else {
        trace!("No password given, generating unusable password");
        return Ok(unusable_password());
    };

    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);

    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verifies a raw password against an encoded one.
///
/// Unusable encodings always yield `Ok(false)`. Anything else that is not a PHC
/// string is an error.
#[instrument(skip_all)]
pub fn check_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    if !is_password_usable(encoded) {
        return Ok(false);
    }

    let parsed = PasswordHash::new(encoded).map_err(|e| {
        warn!("Stored password hash could not be parsed: {}", e);
        PasswordError::Malformed(e.to_string())
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn is_password_usable(encoded: &str) -> bool {
    !encoded.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

fn unusable_password() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UNUSABLE_PASSWORD_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, suffix)
}
