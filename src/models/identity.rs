//! Canonical identity model for storage and API.

use super::WebAppUser;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// One identity per external user ID, stored in the `user_profiles` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalIdentity {
    /// External (platform) user ID, also used as document ID
    pub telegram_id: i64,
    pub first_name: String,
    /// Empty when the platform does not send one
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Set only by an explicit profile update, never by login
    #[serde(default)]
    pub profile_completed: bool,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl CanonicalIdentity {
    /// A new, incomplete identity built from a verified login.
    pub fn from_verified(user: &VerifiedUser, now: &str) -> Self {
        Self {
            telegram_id: user.external_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
            username: user.username.clone(),
            profile_completed: false,
            birth_date: None,
            gender: None,
            height: None,
            weight: None,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Refresh the display fields that the platform owns.
    pub fn apply_login(&mut self, user: &VerifiedUser, now: &str) {
        self.first_name = user.first_name.clone();
        self.last_name = user.last_name.clone().unwrap_or_default();
        self.username = user.username.clone();
        self.updated_at = now.to_string();
    }

    /// Apply an explicit profile update and mark the profile complete.
    pub fn apply_profile(&mut self, update: &ProfileUpdate, now: &str) {
        self.first_name = update.first_name.clone();
        self.last_name = update.last_name.clone();
        self.birth_date = update.birth_date.clone();
        self.gender = update.gender.clone();
        self.height = update.height;
        self.weight = update.weight;
        self.profile_completed = true;
        self.updated_at = now.to_string();
    }

    /// Identity used in fixture mode unless overridden by config.
    pub fn fixture() -> Self {
        Self {
            telegram_id: 123456789,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            username: Some("testuser".to_string()),
            profile_completed: false,
            birth_date: None,
            gender: None,
            height: None,
            weight: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// The part of a verified assertion the identity upsert consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub external_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl From<&WebAppUser> for VerifiedUser {
    fn from(user: &WebAppUser) -> Self {
        Self {
            external_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

impl From<&CanonicalIdentity> for VerifiedUser {
    fn from(identity: &CanonicalIdentity) -> Self {
        Self {
            external_id: identity.telegram_id,
            first_name: identity.first_name.clone(),
            last_name: Some(identity.last_name.clone()).filter(|s| !s.is_empty()),
            username: identity.username.clone(),
        }
    }
}

/// Profile form submitted by the user after first login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 64))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub last_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_birth_date"))]
    pub birth_date: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_gender"))]
    pub gender: Option<String>,
    #[serde(default)]
    #[validate(range(min = 50.0, max = 300.0))]
    pub height: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight: Option<f64>,
}

fn validate_birth_date(value: &str) -> Result<(), ValidationError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::new("birth_date_format"))
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    match value {
        "male" | "female" => Ok(()),
        _ => Err(ValidationError::new("gender")),
    }
}
