//! The auth flow: signup, login, session restore, preference updates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::password::CredentialHasher;
use crate::store::KeyValueStore;
use crate::token::TokenService;
use crate::user::UserProfile;
use crate::validation::{PasswordRules, SignupForm};
use crate::AuthError;

/// Storage key for the session token.
const TOKEN_KEY: &str = "vet_auth_token";

/// Stored account record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAccount {
    password_hash: String,
    profile: UserProfile,
}

/// Client-local authentication over a key-value store.
///
/// Signup validates the form, hashes the password, persists the account, and
/// signs the session in. There is no server round trip anywhere.
pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
    tokens: TokenService,
    hasher: CredentialHasher,
    rules: PasswordRules,
}

impl AuthService {
    /// Create a service over a store, using the development signing secret.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            tokens: TokenService::dev(),
            hasher: CredentialHasher::new(),
            rules: PasswordRules::default(),
        }
    }

    /// Replace the token service.
    pub fn with_tokens(mut self, tokens: TokenService) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replace the password rules.
    pub fn with_rules(mut self, rules: PasswordRules) -> Self {
        self.rules = rules;
        self
    }

    /// The password rules in effect (the strength meter reads these).
    pub fn rules(&self) -> &PasswordRules {
        &self.rules
    }

    /// Register a new account and sign it in.
    pub fn sign_up(&self, form: &SignupForm) -> Result<UserProfile, AuthError> {
        let validation = self.rules.validate_form(form);
        if !validation.success {
            return Err(AuthError::Invalid(validation.errors));
        }
        if self.store.get(&account_key(&form.email))?.is_some() {
            return Err(AuthError::AccountExists(form.email.clone()));
        }

        let profile = UserProfile::new(&form.email, form.receive_updates);
        let account = StoredAccount {
            password_hash: self.hasher.hash(&form.password)?,
            profile: profile.clone(),
        };
        self.put_account(&account)?;
        self.put_token(&profile)?;
        Ok(profile)
    }

    /// Sign in with stored credentials.
    pub fn log_in(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let account = self
            .get_account(email)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.hasher.verify(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        self.put_token(&account.profile)?;
        Ok(account.profile)
    }

    /// Sign out, clearing the stored token.
    pub fn log_out(&self) -> Result<(), AuthError> {
        self.store.remove(TOKEN_KEY)?;
        Ok(())
    }

    /// Restore the session from the stored token, if any.
    ///
    /// An invalid or expired token is cleared and treated as signed out,
    /// never surfaced as an error.
    pub fn current_user(&self) -> Result<Option<UserProfile>, AuthError> {
        let Some(token) = self.store.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        match self.tokens.verify(&token) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) if err.is_auth_failure() => {
                self.store.remove(TOKEN_KEY)?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Whether a verified session exists.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.current_user(), Ok(Some(_)))
    }

    /// Route-guard check: the verified profile, or `NotAuthenticated`.
    pub fn require_authenticated(&self) -> Result<UserProfile, AuthError> {
        self.current_user()?.ok_or(AuthError::NotAuthenticated)
    }

    /// Update the marketing opt-in for the signed-in user.
    pub fn update_preferences(&self, receive_updates: bool) -> Result<UserProfile, AuthError> {
        let profile = self.require_authenticated()?;
        let updated = profile.with_preferences(receive_updates);

        if let Some(mut account) = self.get_account(&updated.email)? {
            account.profile = updated.clone();
            self.put_account(&account)?;
        }
        self.put_token(&updated)?;
        Ok(updated)
    }

    /// Reissue the token when it is close to expiry.
    ///
    /// Returns whether a refresh happened. A token that no longer verifies
    /// signs the session out.
    pub fn refresh_token_if_needed(&self) -> Result<bool, AuthError> {
        let Some(token) = self.store.get(TOKEN_KEY)? else {
            return Ok(false);
        };
        if !self.tokens.is_expiring_soon(&token) {
            return Ok(false);
        }
        match self.tokens.verify(&token) {
            Ok(profile) => {
                self.put_token(&profile)?;
                Ok(true)
            }
            Err(err) if err.is_auth_failure() => {
                self.log_out()?;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn get_account(&self, email: &str) -> Result<Option<StoredAccount>, AuthError> {
        match self.store.get(&account_key(email))? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AuthError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn put_account(&self, account: &StoredAccount) -> Result<(), AuthError> {
        let raw = serde_json::to_string(account)
            .map_err(|e| AuthError::Serialization(e.to_string()))?;
        self.store.set(&account_key(&account.profile.email), &raw)?;
        Ok(())
    }

    fn put_token(&self, profile: &UserProfile) -> Result<(), AuthError> {
        let token = self.tokens.issue(profile)?;
        self.store.set(TOKEN_KEY, &token)?;
        Ok(())
    }
}

fn account_key(email: &str) -> String {
    format!("vet_account:{}", email.to_lowercase())
}
