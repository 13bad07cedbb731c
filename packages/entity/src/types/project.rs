use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of project metadata the membership ledger depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub leader_id: String,
    /// Capacity: maximum number of accepted records, leader included
    pub max_members: u32,
    /// Mean of the members' ratings, absent until the first one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        project_id: impl Into<String>,
        title: impl Into<String>,
        leader_id: impl Into<String>,
        max_members: u32,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            title: title.into(),
            description: None,
            leader_id: leader_id.into(),
            max_members,
            rating: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
