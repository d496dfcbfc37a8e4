//! Argon2 password hashing shared by registration, update, and login.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use roster_core::DomainError;

/// Hashes a cleartext password with a fresh random salt.
///
/// # Errors
///
/// Returns [`DomainError::Internal`]; hashing only fails on parameter or
/// RNG problems, which the caller cannot act on.
pub fn hash(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| DomainError::Internal)
}

/// Verifies a cleartext password against a stored hash.
///
/// # Errors
///
/// Returns [`DomainError::InvalidCredentials`] on mismatch and on
/// unparsable stored hashes; a corrupt hash must not authenticate anyone.
pub fn verify(password: &str, stored_hash: &str) -> Result<(), DomainError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| DomainError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| DomainError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_accepts_the_password() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hashed).is_ok());
    }

    #[test]
    fn verify_rejects_a_different_password() {
        let hashed = hash("secret").unwrap();
        assert_eq!(
            verify("Secret", &hashed).unwrap_err(),
            DomainError::InvalidCredentials
        );
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert_eq!(
            verify("secret", "not-a-phc-string").unwrap_err(),
            DomainError::InvalidCredentials
        );
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash("secret").unwrap(), hash("secret").unwrap());
    }
}
