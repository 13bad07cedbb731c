use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Capacity reached: {message}")]
    Capacity { message: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// The database accepted the statement but returned no record
    #[error("Write failed: {operation}")]
    WriteFailed { operation: String },
}

impl RepositoryError {
    pub fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        RepositoryError::NotFound { entity_type: entity_type.to_string(), id: id.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RepositoryError::Conflict { message: message.into() }
    }

    pub fn capacity(message: impl Into<String>) -> Self {
        RepositoryError::Capacity { message: message.into() }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        RepositoryError::Forbidden { reason: reason.into() }
    }

    pub fn write_failed(operation: impl Into<String>) -> Self {
        RepositoryError::WriteFailed { operation: operation.into() }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        RepositoryError::Validation { field: field.to_string(), message: message.into() }
    }
}
