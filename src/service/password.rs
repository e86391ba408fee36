use crate::error::app_error::AppError;
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};

/// Salted one-way digest of a plaintext password (Argon2id).
pub fn hash(password: &str) -> Result<String, AppError> {
    let salt_string = SaltString::generate(&mut OsRng);
    let salt = Salt::from(&salt_string);
    let password_hash = Argon2::default().hash_password(password.as_bytes(), salt)?;
    Ok(password_hash.to_string())
}

/// Checks a plaintext candidate against a stored digest. A malformed stored
/// hash is an error; a mismatching password is just `false`.
pub fn verify(stored_hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
