use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local projection of the external user directory, used for display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub full_name: String,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), full_name: full_name.into(), updated_at: Utc::now() }
    }
}
