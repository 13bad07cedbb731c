use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session expired")]
    SessionExpired,

    #[error("Token issue failed: {0}")]
    TokenIssue(String),
}
