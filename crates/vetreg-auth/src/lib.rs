//! Mock authentication for VetReg.
//!
//! There is no server: credentials live in a local key-value store and the
//! session token is signed locally. Route guards and the profile page consume
//! the verified token; nothing here talks to a network.

mod error;
mod password;
mod service;
mod store;
mod token;
mod user;
mod validation;

pub use error::AuthError;
pub use password::CredentialHasher;
pub use service::AuthService;
pub use store::{KeyValueStore, KvError, MemoryKeyValueStore};
pub use token::TokenService;
pub use user::UserProfile;
pub use validation::{
    validate_email, FieldError, PasswordRules, PasswordStrength, SignupForm, StrengthLabel,
    ValidationResult,
};
