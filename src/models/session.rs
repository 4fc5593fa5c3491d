use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity binding carried inside the encrypted session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub user_id: i64,
    pub username: String,
    /// Unix seconds of the last authenticated request.
    pub last_activity: i64,
}

impl SessionState {
    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.last_activity, 0)
    }

    pub fn to_cookie_value(&self) -> String {
        // Serializing a struct of plain fields cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_cookie_value(value: &str) -> Option<Self> {
        serde_json::from_str(value).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}
