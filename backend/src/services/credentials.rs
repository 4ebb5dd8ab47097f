//! Password hashing and verification with Argon2 (PHC string format, random
//! salt per hash).

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, error};

use crate::error::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Argon2 password hashing failed");
            AppError::Internal(anyhow!("password hashing failed: {e}"))
        })
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unusable
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| {
        error!(error = %e, "Stored password hash could not be parsed");
        AppError::Internal(anyhow!("invalid stored password hash: {e}"))
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => {
            debug!("Password mismatch");
            Ok(false)
        }
        Err(e) => {
            error!(error = %e, "Argon2 password verification failed");
            Err(AppError::Internal(anyhow!("password verification failed: {e}")))
        }
    }
}
