use axum::extract::rejection::StringRejection;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

const SECURE_MESSAGE: &str = "Password meets security requirements";
const INSECURE_MESSAGE: &str =
    "Password must be at least 8 characters with uppercase, lowercase, digit, and special character";

/// Checks the raw request body against the password policy.
///
/// A body that is a JSON string literal is unquoted first, so both
/// `text/plain` and `application/json` clients get the same answer.
pub async fn validate_password(
    State(state): State<AppState>,
    payload: Result<String, StringRejection>,
) -> Result<ApiSuccess<bool>, ApiError> {
    let body = payload?;
    let password = serde_json::from_str::<String>(&body).unwrap_or(body);
    let is_secure = state.user_service.is_password_secure(&password);

    let message = if is_secure {
        SECURE_MESSAGE
    } else {
        INSECURE_MESSAGE
    };

    Ok(ApiSuccess::new(StatusCode::OK, message, is_secure))
}
