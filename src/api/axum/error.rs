use axum::http::header::RETRY_AFTER;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::{ErrorResponse, MessageResponse};
use crate::AuthError;

/// converts `AuthError` into appropriate HTTP responses
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AuthError::TooManyAttempts {
                retry_after,
                message,
            } => {
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(RETRY_AFTER, retry_after.max(0).to_string())],
                    Json(MessageResponse { message }),
                )
                    .into_response();
            }
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::TokenInvalid | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::DatabaseError(_)
            | AuthError::ConfigurationError(_)
            | AuthError::PasswordHashError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
