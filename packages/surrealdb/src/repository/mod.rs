pub mod error;
pub mod locks;
pub mod membership;
pub mod message;
pub mod project;
pub mod task;
pub mod user_profile;


pub use error::RepositoryError;
pub use locks::{ProjectLockGuard, ProjectLocks};
pub use membership::{LedgerTransition, ProjectMemberRepository};
pub use message::MessageRepository;
pub use project::ProjectRepository;
pub use task::TaskRepository;
pub use user_profile::UserProfileRepository;
