//! User object embedded (as JSON) in the platform's init data.

use serde::{Deserialize, Serialize};

/// Platform user as sent in the `user` field of init data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAppUser {
    /// External (platform) user ID
    pub id: i64,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allows_write_to_pm: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_user() {
        let user: WebAppUser = serde_json::from_str(r#"{"id":42,"first_name":"A"}"#).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.first_name, "A");
        assert_eq!(user.last_name, None);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let user: WebAppUser = serde_json::from_str(
            r#"{"id":7,"first_name":"B","is_bot":false,"added_to_attachment_menu":true}"#,
        )
        .unwrap();
        assert_eq!(user.id, 7);
    }

    #[test]
    fn test_missing_id_rejected() {
        assert!(serde_json::from_str::<WebAppUser>(r#"{"first_name":"A"}"#).is_err());
    }
}
