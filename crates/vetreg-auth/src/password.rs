//! Credential hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::AuthError;

/// Argon2id credential hasher.
///
/// Produces PHC-format hash strings; verification is constant-time inside
/// the argon2 crate.
#[derive(Default)]
pub struct CredentialHasher {
    argon: Argon2<'static>,
}

impl CredentialHasher {
    /// Create a hasher with the default argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify a password against a stored hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(self
            .argon
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = CredentialHasher::new();
        let hash = hasher.hash("Str0ng!Pass12.").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(hasher.verify("Str0ng!Pass12.", &hash).unwrap());
        assert!(!hasher.verify("WrongPassword1!", &hash).unwrap());
    }

    #[test]
    fn test_same_password_salts_differently() {
        let hasher = CredentialHasher::new();
        let a = hasher.hash("Str0ng!Pass12.").unwrap();
        let b = hasher.hash("Str0ng!Pass12.").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("Str0ng!Pass12.", &a).unwrap());
        assert!(hasher.verify("Str0ng!Pass12.", &b).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let hasher = CredentialHasher::new();
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }
}
