//! Authentication errors.

use thiserror::Error;

use crate::store::KvError;
use crate::validation::FieldError;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for this email.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// No authenticated session.
    #[error("no authenticated session")]
    NotAuthenticated,

    /// Token invalid or tampered.
    #[error("token invalid")]
    InvalidToken,

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// Form validation failed.
    #[error("validation failed")]
    Invalid(Vec<FieldError>),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] KvError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Check if this is an authentication failure (as opposed to an
    /// input or infrastructure problem).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::NotAuthenticated
                | AuthError::InvalidToken
                | AuthError::TokenExpired
        )
    }
}
