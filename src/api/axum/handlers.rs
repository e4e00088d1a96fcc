//! HTTP handlers for the login endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::error::AppError;
use super::routes::AppState;
use crate::actions::LoginGate;
use crate::api::{LoginRequest, TokenResponse};
use crate::{AttemptStore, AuthError, CredentialVerifier, TokenRepository};

/// Authenticate a user and return a bearer token.
///
/// POST /login
pub async fn login<V, T, S>(
    State(state): State<AppState<V, T, S>>,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse
where
    V: CredentialVerifier + Clone + Send + Sync + 'static,
    T: TokenRepository + Clone + Send + Sync + 'static,
    S: AttemptStore + Clone + 'static,
{
    if body.email.trim().is_empty() || body.password.is_empty() {
        return AppError(AuthError::Validation(
            "email and password are required".to_owned(),
        ))
        .into_response();
    }

    let gate = LoginGate::with_config(
        state.verifier,
        state.token_repo,
        state.attempt_store,
        state.config,
    );

    match gate.execute(&body.email, &body.password).await {
        Ok(response) => (StatusCode::OK, Json(TokenResponse::from(response))).into_response(),
        Err(err) => {
            if matches!(err, AuthError::DatabaseError(_) | AuthError::PasswordHashError) {
                log::error!(target: "portcullis", "msg=\"login failed\", error=\"{err}\"");
            }
            AppError(err).into_response()
        }
    }
}
