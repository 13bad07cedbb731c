pub mod authenticated_user;
pub mod errors;
pub mod session_service;

pub use authenticated_user::AuthenticatedUser;
pub use errors::AuthError;
pub use session_service::{SessionClaims, SessionService};
