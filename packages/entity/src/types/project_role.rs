use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Role a member holds inside one project.
///
/// `Leader` is unique per project and created together with it. `Mentor` is only
/// ever reached from `Member` through an explicit promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Leader,
    Mentor,
    Member,
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Leader => "leader",
            ProjectRole::Mentor => "mentor",
            ProjectRole::Member => "member",
        }
    }

    /// Whether this role may hand out tasks (once accepted).
    pub fn can_assign_tasks(&self) -> bool {
        matches!(self, ProjectRole::Leader | ProjectRole::Mentor)
    }
}

impl std::fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown project role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for ProjectRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leader" => Ok(ProjectRole::Leader),
            "mentor" => Ok(ProjectRole::Mentor),
            "member" => Ok(ProjectRole::Member),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_is_rejected_instead_of_defaulted() {
        assert_eq!("mentor".parse::<ProjectRole>(), Ok(ProjectRole::Mentor));
        assert!("admin".parse::<ProjectRole>().is_err());
        assert!("Leader".parse::<ProjectRole>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ProjectRole::Leader).unwrap();
        assert_eq!(json, "\"leader\"");
    }
}
