use argon2::{Argon2, PasswordHasher};
use password_hash::{PasswordHash, PasswordVerifier, SaltString};
use rand_core::OsRng;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const POLICY_MESSAGE: &str = "Password must be at least 8 characters";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password too weak")]
    Weak,
    #[error(transparent)]
    Hash(#[from] password_hash::Error),
}

pub fn validate_policy(pw: &str) -> Result<(), PasswordError> {
    if pw.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::Weak);
    }
    Ok(())
}

pub fn hash_password(pw: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2.hash_password(pw.as_bytes(), &salt)?.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a PHC string.
pub fn verify_password(pw: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(pw.as_bytes(), &parsed)
        .is_ok())
}

/// Whether `hash` parses as a PHC string at all.
pub fn is_phc_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}
