//! API error types for handler and service operations
//!
//! Structured errors for the REST surface, with HTTP status code mapping via
//! `IntoResponse`. Store error text never reaches a client; it is logged.
//!
//! # Example
//!
//! ```rust
//! use chat_service::handlers::{ApiError, ApiErrorKind};
//!
//! let error = ApiError::not_found("User", "0191c1f4-6c44-7b1a-9d1e-2f3a4b5c6d7e");
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::ValidationError;
use crate::error::{Error, ErrorResponse};
use crate::query::ColumnError;
use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing entities
    List,
    /// Getting a single entity
    Get,
    /// Running a filter request
    Filter,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Soft deleting an entity
    Delete,
    /// Exchanging credentials for a token
    Login,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Filter => write!(f, "filter"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Login => write!(f, "login"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Entity was not found
    NotFound,
    /// Request validation failed
    ValidationFailed,
    /// Authentication required or credentials rejected
    Unauthorized,
    /// Invalid request format or parameters
    BadRequest,
    /// Entity already exists or a constraint was violated
    Conflict,
    /// Internal server error
    InternalError,
    /// Service temporarily unavailable
    ServiceUnavailable,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ValidationFailed | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest => "INVALID_REQUEST",
            Self::Conflict => "CONFLICT",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Client-facing message
    pub message: String,
    /// The type of entity involved
    pub entity_type: Option<String>,
    /// The ID or key of the entity involved
    pub entity_id: Option<String>,
    /// Offending fields of a validation failure
    pub fields: Vec<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            fields: Vec::new(),
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        Self::new(
            ApiOperation::Get,
            ApiErrorKind::NotFound,
            format!("{} not found", entity_type),
        )
        .with_entity(entity_type, entity_id)
    }

    /// Create a conflict error
    pub fn conflict(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::Conflict, message)
    }

    /// Create a validation failed error listing every offending field
    pub fn validation_failed(operation: ApiOperation, fields: Vec<String>) -> Self {
        let mut err = Self::new(operation, ApiErrorKind::ValidationFailed, "Validation failed");
        err.fields = fields;
        err
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::BadRequest, message)
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Login, ApiErrorKind::Unauthorized, message)
    }

    /// Create an internal error; `detail` is logged, never returned
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(detail = %detail, "internal error");
        Self::new(
            ApiOperation::Get,
            ApiErrorKind::InternalError,
            "An internal error occurred",
        )
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::ServiceUnavailable)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        if !self.fields.is_empty() {
            write!(f, " ({})", self.fields.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if status.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                retriable = self.is_retriable(),
                "API error: {}", self.message
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                "API error: {}", self.message
            );
        }

        let body = ErrorResponse::with_code(status, self.kind.error_code(), self.message)
            .with_fields(self.fields);
        (status, Json(body)).into_response()
    }
}

fn repository_operation_to_api_operation(op: RepositoryOperation) -> ApiOperation {
    match op {
        RepositoryOperation::FindById
        | RepositoryOperation::FindBySecondaryKey
        | RepositoryOperation::LoadAssociation => ApiOperation::Get,
        RepositoryOperation::FindAll => ApiOperation::List,
        RepositoryOperation::Filter => ApiOperation::Filter,
        RepositoryOperation::Create
        | RepositoryOperation::Begin
        | RepositoryOperation::Commit
        | RepositoryOperation::Rollback => ApiOperation::Create,
        RepositoryOperation::Update => ApiOperation::Update,
        RepositoryOperation::SoftDelete => ApiOperation::Delete,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let operation = repository_operation_to_api_operation(err.operation);

        let kind = match err.kind {
            RepositoryErrorKind::NotFound => ApiErrorKind::NotFound,
            RepositoryErrorKind::AlreadyExists | RepositoryErrorKind::ConstraintViolation => {
                ApiErrorKind::Conflict
            }
            RepositoryErrorKind::ValidationFailed => ApiErrorKind::ValidationFailed,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => {
                ApiErrorKind::ServiceUnavailable
            }
            RepositoryErrorKind::TransactionState
            | RepositoryErrorKind::DatabaseError
            | RepositoryErrorKind::SerializationError
            | RepositoryErrorKind::Other => ApiErrorKind::InternalError,
        };

        if matches!(
            kind,
            ApiErrorKind::InternalError | ApiErrorKind::ServiceUnavailable
        ) {
            tracing::error!(
                operation = %err.operation,
                kind = %err.kind,
                entity_type = ?err.entity_type,
                entity_id = ?err.entity_id,
                retriable = err.is_retriable(),
                "Repository error: {}", err.message
            );
        }

        // User-facing message (don't expose internal details for internal errors)
        let entity = err.entity_type.clone().unwrap_or_else(|| "Entity".to_string());
        let (message, fields) = match kind {
            ApiErrorKind::NotFound => (format!("{} not found", entity), Vec::new()),
            ApiErrorKind::Conflict => (format!("{} already exists", entity), Vec::new()),
            ApiErrorKind::ValidationFailed => ("Validation failed".to_string(), vec![err.message]),
            ApiErrorKind::ServiceUnavailable => {
                ("Service temporarily unavailable".to_string(), Vec::new())
            }
            _ => ("An internal error occurred".to_string(), Vec::new()),
        };

        Self {
            operation,
            kind,
            message,
            entity_type: err.entity_type,
            entity_id: err.entity_id,
            fields,
        }
    }
}

impl From<ColumnError> for ApiError {
    fn from(err: ColumnError) -> Self {
        Self::validation_failed(ApiOperation::Filter, err.fields)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::validation_failed(ApiOperation::Create, err.fields)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthorized(msg) => Self::unauthorized(msg),
            Error::Jwt(e) => Self::unauthorized(e.to_string()),
            Error::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                Self::new(
                    ApiOperation::Get,
                    ApiErrorKind::ServiceUnavailable,
                    "Service temporarily unavailable",
                )
            }
            other => Self::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_kind_status_codes() {
        assert_eq!(ApiErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiErrorKind::ValidationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiErrorKind::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiErrorKind::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_api_error_kind_error_codes() {
        assert_eq!(ApiErrorKind::NotFound.error_code(), "NOT_FOUND");
        assert_eq!(ApiErrorKind::ValidationFailed.error_code(), "VALIDATION_ERROR");
        assert_eq!(ApiErrorKind::BadRequest.error_code(), "INVALID_REQUEST");
        assert_eq!(ApiErrorKind::Conflict.error_code(), "CONFLICT");
        assert_eq!(ApiErrorKind::InternalError.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_not_found_convenience() {
        let error = ApiError::not_found("User", "usr_123");
        assert_eq!(error.kind, ApiErrorKind::NotFound);
        assert_eq!(error.message, "User not found");
        assert_eq!(error.entity_id, Some("usr_123".to_string()));
    }

    #[test]
    fn test_display_with_entity_and_fields() {
        let error = ApiError::not_found("User", "usr_123");
        assert!(error.to_string().contains("[User: usr_123]"));

        let error = ApiError::validation_failed(
            ApiOperation::Filter,
            vec!["password is not a filterable field".to_string()],
        );
        assert!(error.to_string().contains("password is not a filterable field"));
    }

    #[test]
    fn test_from_repository_error_not_found() {
        let api_err: ApiError = RepositoryError::not_found("Message", "m1").into();
        assert_eq!(api_err.kind, ApiErrorKind::NotFound);
        assert_eq!(api_err.operation, ApiOperation::Get);
        assert_eq!(api_err.message, "Message not found");
    }

    #[test]
    fn test_from_repository_error_already_exists() {
        let api_err: ApiError = RepositoryError::already_exists("User", "+919984778491").into();
        assert_eq!(api_err.kind, ApiErrorKind::Conflict);
        assert_eq!(api_err.kind.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_from_repository_error_hides_internal_detail() {
        let api_err: ApiError = RepositoryError::new(
            RepositoryOperation::Filter,
            RepositoryErrorKind::DatabaseError,
            "syntax error at or near \"DROP\"",
        )
        .into();
        assert_eq!(api_err.kind, ApiErrorKind::InternalError);
        assert_eq!(api_err.message, "An internal error occurred");
        assert!(api_err.fields.is_empty());
    }

    #[test]
    fn test_from_repository_error_transaction_state() {
        let api_err: ApiError =
            RepositoryError::transaction_state(RepositoryOperation::Commit, "already committed")
                .into();
        assert_eq!(api_err.kind, ApiErrorKind::InternalError);
    }

    #[test]
    fn test_from_repository_error_timeout() {
        let api_err: ApiError = RepositoryError::new(
            RepositoryOperation::FindAll,
            RepositoryErrorKind::Timeout,
            "pool timed out",
        )
        .into();
        assert_eq!(api_err.kind, ApiErrorKind::ServiceUnavailable);
        assert!(api_err.is_retriable());
    }

    #[test]
    fn test_from_column_error() {
        let api_err: ApiError = ColumnError {
            fields: vec!["nope is not a sortable field".to_string()],
        }
        .into();
        assert_eq!(api_err.kind, ApiErrorKind::ValidationFailed);
        assert_eq!(api_err.fields, vec!["nope is not a sortable field"]);
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let response = ApiError::validation_failed(
            ApiOperation::Create,
            vec!["first_name is required".to_string()],
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"][0], "first_name is required");
        assert_eq!(body["status"], 400);
    }
}
