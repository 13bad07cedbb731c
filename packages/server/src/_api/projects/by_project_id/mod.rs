pub mod apply;
pub mod invitations;
pub mod members;
pub mod mentors;
pub mod messages;
pub mod rate;
pub mod requests;
pub mod tasks;

use serde::Deserialize;

/// Body naming the member a leader acts on
#[derive(Deserialize)]
pub struct MemberTarget {
    pub member_id: String,
}
