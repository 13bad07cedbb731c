pub mod workflow;

pub use workflow::{CreateProject, MembershipWorkflow, ProjectRating, WorkflowLimits};
