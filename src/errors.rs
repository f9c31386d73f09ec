use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::jwt::TokenError;
use crate::repository::RepoError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("employee_id '{0}' already exists")]
    DuplicateEmployee(String),

    #[error("employee not found")]
    EmployeeNotFound,

    #[error("incorrect username or password")]
    InvalidCredentials,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateIdentifier(id) => AppError::DuplicateEmployee(id),
            RepoError::InvalidDate(e) => AppError::Validation(e.to_string()),
            // Create lost its read-back to a concurrent delete: a server-side race.
            err @ RepoError::Vanished(_) => AppError::Internal(err.into()),
            RepoError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken(reason) => AppError::Unauthorized(reason),
            TokenError::Signing(reason) => AppError::Internal(anyhow::anyhow!(reason)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::Validation(detail) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_failed",
                detail.clone(),
            ),
            AppError::DuplicateEmployee(id) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "duplicate_employee_id",
                format!("employee_id '{}' already exists", id),
            ),
            AppError::EmployeeNotFound => (
                StatusCode::NOT_FOUND,
                "not_found_error",
                "employee_not_found",
                "Employee not found".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_credentials",
                "Incorrect username or password".to_string(),
            ),
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_token",
                "Could not validate credentials".to_string(),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        let mut response = (status, body).into_response();

        if matches!(self, AppError::InvalidCredentials | AppError::Unauthorized(_)) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
