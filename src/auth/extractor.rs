//! Bearer-token extractor for protected handlers.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::auth::jwt::TokenService;
use crate::errors::AppError;
use crate::AppState;

/// The authenticated caller. Taking this as a handler argument makes the
/// route require `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub subject: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match header.and_then(TokenService::extract_from_header) {
            Some(token) => token,
            None => {
                tracing::warn!(uri = %parts.uri, "auth: missing bearer token");
                return Err(AppError::Unauthorized("missing bearer token".into()));
            }
        };

        match state.tokens.verify(token) {
            Ok(subject) => Ok(AuthUser { subject }),
            Err(e) => {
                // Never log the token itself.
                tracing::warn!(uri = %parts.uri, error = %e, "auth: token rejected");
                Err(e.into())
            }
        }
    }
}
