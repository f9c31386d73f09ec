use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::AppState;

/// OAuth2 password-grant form. Only `username` and `password` are read.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until `exp`.
    pub expires_in: i64,
}

/// POST /token
pub async fn login_for_access_token(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Form(login) = form.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    if !state
        .credentials
        .authenticate(&login.username, &login.password)
        .await
    {
        tracing::warn!(username = %login.username, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.tokens.issue(&login.username)?;
    tracing::info!(username = %login.username, "access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
        expires_in: state.tokens.default_ttl().num_seconds(),
    }))
}
