//! Signup form validation and password strength rules.

use serde::{Deserialize, Serialize};

/// Characters counted as special for password strength.
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// The signup form as submitted by the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupForm {
    /// Email address.
    pub email: String,
    /// Plaintext password (hashed before storage).
    pub password: String,
    /// Marketing updates opt-in.
    #[serde(rename = "receiveUpdates")]
    pub receive_updates: bool,
}

/// A single field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// Whole-form validation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the form passed.
    pub success: bool,
    /// Field errors, empty on success.
    pub errors: Vec<FieldError>,
}

/// Validate an email address; returns error messages, empty when valid.
pub fn validate_email(email: &str) -> Vec<String> {
    if email.is_empty() {
        return vec!["Email is required".to_string()];
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Vec::new()
    } else {
        vec!["Please enter a valid email address".to_string()]
    }
}

/// Password strength requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRules {
    /// Minimum length.
    pub min_length: usize,
    /// Require at least one uppercase letter.
    pub require_uppercase: bool,
    /// Require at least one lowercase letter.
    pub require_lowercase: bool,
    /// Require at least one digit.
    pub require_digit: bool,
    /// Minimum number of special characters.
    pub min_special: usize,
}

impl Default for PasswordRules {
    fn default() -> Self {
        Self {
            min_length: 12,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            min_special: 2,
        }
    }
}

impl PasswordRules {
    /// Validate a password; returns error messages, empty when valid.
    pub fn validate(&self, password: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if password.chars().count() < self.min_length {
            errors.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one number".to_string());
        }
        if special_count(password) < self.min_special {
            errors.push(format!(
                "Password must contain at least {} special characters",
                self.min_special
            ));
        }

        errors
    }

    /// Score a password against these rules.
    pub fn strength(&self, password: &str) -> PasswordStrength {
        let checks = [
            password.chars().count() >= self.min_length,
            password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_lowercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            special_count(password) >= self.min_special,
        ];
        let score = checks.iter().filter(|&&c| c).count();
        let max_score = checks.len();

        PasswordStrength {
            score,
            max_score,
            percentage: (score * 100 / max_score) as u8,
            label: StrengthLabel::from_score(score, max_score),
        }
    }

    /// Validate the whole signup form.
    pub fn validate_form(&self, form: &SignupForm) -> ValidationResult {
        let mut errors = Vec::new();

        for message in validate_email(&form.email) {
            errors.push(FieldError {
                field: "email".to_string(),
                message,
            });
        }
        for message in self.validate(&form.password) {
            errors.push(FieldError {
                field: "password".to_string(),
                message,
            });
        }

        ValidationResult {
            success: errors.is_empty(),
            errors,
        }
    }
}

/// Password strength score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordStrength {
    /// Checks passed.
    pub score: usize,
    /// Total checks.
    pub max_score: usize,
    /// Score as a percentage.
    pub percentage: u8,
    /// Coarse label for the strength meter.
    pub label: StrengthLabel,
}

/// Strength meter label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLabel {
    Weak,
    Medium,
    Good,
    Strong,
}

impl StrengthLabel {
    fn from_score(score: usize, max_score: usize) -> Self {
        if score < 2 {
            StrengthLabel::Weak
        } else if score < 4 {
            StrengthLabel::Medium
        } else if score == max_score {
            StrengthLabel::Strong
        } else {
            StrengthLabel::Good
        }
    }
}

fn special_count(password: &str) -> usize {
    password.chars().filter(|c| SPECIAL_CHARS.contains(*c)).count()
}
