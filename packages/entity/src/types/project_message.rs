use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chat message. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMessage {
    pub message_id: String,
    pub project_id: String,
    pub sender_id: String,
    pub message_text: String,
    /// Position inside the project's history, starting at 1
    pub seq: i64,
    /// Non-decreasing per project
    pub sent_at: DateTime<Utc>,
}
