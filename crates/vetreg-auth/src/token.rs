//! Locally signed session tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::user::UserProfile;
use crate::AuthError;

/// Development-only signing secret; there is no server to share one with.
const DEV_SECRET: &[u8] = b"your-256-bit-secret-key-here-for-development-only";

/// Default token lifetime.
const TOKEN_EXPIRY_HOURS: i64 = 24;

/// Tokens within this window of expiry are refreshed.
const EXPIRING_SOON_SECS: i64 = 60 * 60;

/// Claims carried by the session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    email: String,
    #[serde(rename = "receiveUpdates")]
    receive_updates: bool,
    timestamp: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: i64,
}

impl TokenService {
    /// Create a service signing with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiry_hours: TOKEN_EXPIRY_HOURS,
        }
    }

    /// Create a service with the development secret.
    pub fn dev() -> Self {
        Self::new(DEV_SECRET)
    }

    /// Set the token lifetime in hours.
    pub fn with_expiry_hours(mut self, hours: i64) -> Self {
        self.expiry_hours = hours;
        self
    }

    /// Issue a token carrying the profile claims.
    pub fn issue(&self, profile: &UserProfile) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: profile.id.clone(),
            email: profile.email.clone(),
            receive_updates: profile.receive_updates,
            timestamp: profile.timestamp.clone(),
            iat: now,
            exp: now + self.expiry_hours * 3600,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify a token and return the profile it carries.
    pub fn verify(&self, token: &str) -> Result<UserProfile, AuthError> {
        let claims = self.decode_claims(token)?;
        Ok(UserProfile {
            id: claims.id,
            email: claims.email,
            receive_updates: claims.receive_updates,
            timestamp: claims.timestamp,
        })
    }

    /// Whether a token is within one hour of expiry.
    ///
    /// Unparseable tokens count as expiring so callers rotate them.
    pub fn is_expiring_soon(&self, token: &str) -> bool {
        match self.decode_claims(token) {
            Ok(claims) => claims.exp - Utc::now().timestamp() < EXPIRING_SOON_SECS,
            Err(_) => true,
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let tokens = TokenService::dev();
        let profile = UserProfile::new("a@b.com", true);

        let token = tokens.issue(&profile).unwrap();
        let verified = tokens.verify(&token).unwrap();
        assert_eq!(verified, profile);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = TokenService::dev();
        let token = tokens.issue(&UserProfile::new("a@b.com", false)).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(matches!(
            tokens.verify(&tampered),
            Err(AuthError::InvalidToken)
        ));

        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new(b"secret-one-which-is-long-enough");
        let verifier = TokenService::new(b"secret-two-which-is-long-enough");
        let token = issuer.issue(&UserProfile::new("a@b.com", false)).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_fresh_token_is_not_expiring_soon() {
        let tokens = TokenService::dev();
        let token = tokens.issue(&UserProfile::new("a@b.com", false)).unwrap();
        assert!(!tokens.is_expiring_soon(&token));
    }

    #[test]
    fn test_short_lived_token_is_expiring_soon() {
        // Zero lifetime sits inside the one-hour refresh window (decode
        // still succeeds within the validator's leeway).
        let tokens = TokenService::dev().with_expiry_hours(0);
        let token = tokens.issue(&UserProfile::new("a@b.com", false)).unwrap();
        assert!(tokens.is_expiring_soon(&token));

        assert!(tokens.is_expiring_soon("garbage"));
    }
}
