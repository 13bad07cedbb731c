use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use teamroom_entity::types::{ClientAction, Rejection};
use teamroom_surrealdb::repository::RepositoryError;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// Error taxonomy shared by the HTTP API and the real-time channel
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Capacity(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        ApiError::Forbidden(reason.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        ApiError::BadRequest(reason.into())
    }

    pub fn errcode(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Capacity(_) => "CAPACITY_REACHED",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal => "UNKNOWN",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Capacity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The same error as a real-time `rejected` payload
    pub fn to_rejection(&self, action: Option<ClientAction>, project_id: Option<String>) -> Rejection {
        Rejection {
            action,
            project_id,
            errcode: self.errcode().to_string(),
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "errcode": self.errcode(),
            "error": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{} {} not found", entity_type, id))
            },
            RepositoryError::Conflict { message } => ApiError::Conflict(message),
            RepositoryError::Capacity { message } => ApiError::Capacity(message),
            RepositoryError::Forbidden { reason } => ApiError::Forbidden(reason),
            RepositoryError::Validation { field, message } => {
                ApiError::BadRequest(format!("{}: {}", field, message))
            },
            RepositoryError::Database(e) => {
                error!("Database error: {}", e);
                ApiError::Internal
            },
            RepositoryError::WriteFailed { operation } => {
                error!("Database write returned no record: {}", operation);
                ApiError::Internal
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenIssue(reason) => {
                error!("Failed to issue session token: {}", reason);
                ApiError::Internal
            },
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(ApiError::Forbidden("no".into()), StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[case(ApiError::NotFound("no".into()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(ApiError::Conflict("no".into()), StatusCode::CONFLICT, "CONFLICT")]
    #[case(ApiError::Capacity("no".into()), StatusCode::UNPROCESSABLE_ENTITY, "CAPACITY_REACHED")]
    #[case(ApiError::BadRequest("no".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST")]
    #[case(ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR, "UNKNOWN")]
    fn each_kind_has_one_status(
        #[case] err: ApiError,
        #[case] status: StatusCode,
        #[case] errcode: &str,
    ) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.errcode(), errcode);
    }

    #[test]
    fn repository_capacity_maps_to_capacity() {
        let err: ApiError = RepositoryError::capacity("full").into();
        assert!(matches!(err, ApiError::Capacity(_)));
    }

    #[test]
    fn rejection_carries_errcode() {
        let rejection = ApiError::forbidden("not a member")
            .to_rejection(Some(ClientAction::JoinProject), Some("p1".to_string()));
        assert_eq!(rejection.errcode, "FORBIDDEN");
        assert_eq!(rejection.error, "not a member");
    }
}
