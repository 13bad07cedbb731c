pub mod membership_status;
pub mod permissions;
pub mod project;
pub mod project_member;
pub mod project_message;
pub mod project_role;
pub mod project_task;
pub mod realtime;
pub mod user_profile;

pub use membership_status::*;
pub use permissions::*;
pub use project::*;
pub use project_member::*;
pub use project_message::*;
pub use project_role::*;
pub use project_task::*;
pub use realtime::*;
pub use user_profile::*;
