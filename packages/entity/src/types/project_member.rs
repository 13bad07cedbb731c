use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MembershipStatus, ProjectRole};

/// One (project, member) pairing in the membership ledger.
///
/// At most one record exists per pair. Records are deleted on rejection or
/// removal, never soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: String,
    pub member_id: String,
    pub role: ProjectRole,
    pub status: MembershipStatus,
    /// Set once the member has rated the project. Not used for authorization.
    #[serde(default)]
    pub has_rated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectMember {
    pub fn new(
        project_id: impl Into<String>,
        member_id: impl Into<String>,
        role: ProjectRole,
        status: MembershipStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id: project_id.into(),
            member_id: member_id.into(),
            role,
            status,
            has_rated: false,
            rating: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Leader record written together with its project
    pub fn leader(project_id: impl Into<String>, leader_id: impl Into<String>) -> Self {
        Self::new(project_id, leader_id, ProjectRole::Leader, MembershipStatus::Accepted)
    }

    /// Record created when a user applies to a project
    pub fn application(project_id: impl Into<String>, member_id: impl Into<String>) -> Self {
        Self::new(project_id, member_id, ProjectRole::Member, MembershipStatus::Pending)
    }

    /// Record created when the leader invites a user
    pub fn invitation(project_id: impl Into<String>, member_id: impl Into<String>) -> Self {
        Self::new(project_id, member_id, ProjectRole::Member, MembershipStatus::Invited)
    }

    /// Storage key of the pair. The pair is unique, so the key is too.
    pub fn record_key(project_id: &str, member_id: &str) -> String {
        format!("{}:{}", project_id, member_id)
    }

    pub fn key(&self) -> String {
        Self::record_key(&self.project_id, &self.member_id)
    }

    pub fn is_accepted(&self) -> bool {
        self.status == MembershipStatus::Accepted
    }

    pub fn is_leader(&self) -> bool {
        self.role == ProjectRole::Leader
    }
}

/// The caller's own records grouped by approval stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipOverview {
    pub accepted: Vec<ProjectMember>,
    pub pending: Vec<ProjectMember>,
    pub invited: Vec<ProjectMember>,
}

impl MembershipOverview {
    pub fn from_records(records: Vec<ProjectMember>) -> Self {
        let mut overview = Self::default();
        for record in records {
            match record.status {
                MembershipStatus::Accepted => overview.accepted.push(record),
                MembershipStatus::Pending => overview.pending.push(record),
                MembershipStatus::Invited => overview.invited.push(record),
            }
        }
        overview
    }
}
