//! User profile.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The profile carried in the signed token and shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user id.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Marketing updates opt-in.
    #[serde(rename = "receiveUpdates")]
    pub receive_updates: bool,
    /// ISO-8601 timestamp of the last profile change.
    pub timestamp: String,
}

impl UserProfile {
    /// Create a fresh profile for a new signup.
    pub fn new(email: impl Into<String>, receive_updates: bool) -> Self {
        Self {
            id: generate_user_id(),
            email: email.into(),
            receive_updates,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Update the opt-in flag and refresh the timestamp.
    pub fn with_preferences(mut self, receive_updates: bool) -> Self {
        self.receive_updates = receive_updates;
        self.timestamp = Utc::now().to_rfc3339();
        self
    }
}

/// Generate an opaque random user id.
fn generate_user_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    format!("user_{}", URL_SAFE_NO_PAD.encode(bytes))
}
