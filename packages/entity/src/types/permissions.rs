use serde::{Deserialize, Serialize};

use crate::types::{MembershipStatus, ProjectMember, ProjectRole};

/// Effective permission set of one user inside one project.
///
/// Derived from the ledger record for the pair and nothing else. There is no
/// other place that compares roles or statuses to decide access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPermissions {
    pub exists: bool,
    pub role: Option<ProjectRole>,
    pub status: Option<MembershipStatus>,
    pub can_message: bool,
    pub can_manage_members: bool,
    pub can_assign_tasks: bool,
}

impl ProjectPermissions {
    /// Permissions of a user without any record for the project
    pub fn none() -> Self {
        Self {
            exists: false,
            role: None,
            status: None,
            can_message: false,
            can_manage_members: false,
            can_assign_tasks: false,
        }
    }

    pub fn derive(record: Option<&ProjectMember>) -> Self {
        match record {
            None => Self::none(),
            Some(record) => {
                let accepted = record.status == MembershipStatus::Accepted;
                Self {
                    exists: true,
                    role: Some(record.role),
                    status: Some(record.status),
                    // leader records are accepted by construction
                    can_message: accepted,
                    can_manage_members: record.role == ProjectRole::Leader,
                    can_assign_tasks: accepted && record.role.can_assign_tasks(),
                }
            },
        }
    }

    pub fn is_leader(&self) -> bool {
        self.role == Some(ProjectRole::Leader)
    }
}
