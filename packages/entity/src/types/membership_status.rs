use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Approval stage of a project membership record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    /// The user applied and waits for the leader
    Pending,
    /// The leader invited the user, who has not answered yet
    Invited,
    /// Terminal state; grants access to the project room
    Accepted,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Invited => "invited",
            MembershipStatus::Accepted => "accepted",
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown membership status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for MembershipStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MembershipStatus::Pending),
            "invited" => Ok(MembershipStatus::Invited),
            "accepted" => Ok(MembershipStatus::Accepted),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
