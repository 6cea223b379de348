//! Password hashing for email accounts
//!
//! Argon2id with a random salt per hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use link_core::DomainError;

use crate::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Verify a password against a stored hash
///
/// # Errors
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Check length bounds on a new password
///
/// # Errors
/// Returns [`DomainError::WeakPassword`] when the password is out of bounds
pub fn validate_password_strength(password: &str) -> Result<(), DomainError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(DomainError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(DomainError::WeakPassword(format!(
            "must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }

    if password.trim().is_empty() {
        return Err(DomainError::WeakPassword(
            "must not be only whitespace".to_string(),
        ));
    }

    Ok(())
}

/// Password hashing behind a cloneable handle for the service layer
#[derive(Debug, Clone, Default)]
pub struct PasswordService;

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate strength, then hash
    ///
    /// # Errors
    /// Returns a domain error for weak passwords and an internal error if
    /// hashing fails
    pub fn hash_new(&self, password: &str) -> Result<String, AppError> {
        validate_password_strength(password)?;
        hash_password(password)
    }

    /// Verify a login attempt; a mismatch is `InvalidCredentials`
    ///
    /// # Errors
    /// Returns `AppError::InvalidCredentials` if the password doesn't match
    pub fn verify_or_error(&self, password: &str, hash: &str) -> Result<(), AppError> {
        if verify_password(password, hash)? {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id"));
        assert_ne!(hash, hash_password(password).unwrap());
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword123!", &hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        let result = verify_password("whatever", "not-a-phc-string");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_verify_or_error() {
        let service = PasswordService::new();
        let hash = service.hash_new("correct horse").unwrap();

        assert!(service.verify_or_error("correct horse", &hash).is_ok());
        assert!(matches!(
            service.verify_or_error("battery staple", &hash),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_strength_bounds() {
        assert!(validate_password_strength("abcdefgh").is_ok());
        assert!(matches!(
            validate_password_strength("short"),
            Err(DomainError::WeakPassword(_))
        ));
        assert!(validate_password_strength(&"x".repeat(129)).is_err());
        assert!(validate_password_strength("         ").is_err());
    }

    #[test]
    fn test_hash_new_rejects_weak() {
        let service = PasswordService::new();
        let err = service.hash_new("1234").unwrap_err();
        assert_eq!(err.status_code(), 422);
    }
}
