use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::StringRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::user::errors::UserError;

pub mod admin_info;
pub mod change_password;
pub mod get_profile;
pub mod get_stats;
pub mod health;
pub mod login;
pub mod not_found;
pub mod register;
pub mod validate_password;

const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<ApiResponseBody<T>>);

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::success(message, Some(data))))
    }

    pub fn status(&self) -> StatusCode {
        self.0
    }

    pub fn body(&self) -> &ApiResponseBody<T> {
        &self.1 .0
    }
}

impl ApiSuccess<()> {
    /// Success envelope without a `data` member.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::success(message, None)))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    ValidationFailed(String, BTreeMap<String, String>),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl ApiError {
    /// Field-level validation failure under the generic "Validation failed" message.
    pub fn validation(errors: BTreeMap<String, String>) -> Self {
        ApiError::ValidationFailed("Validation failed".to_string(), errors)
    }

    fn field(message: String, field: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.clone());
        ApiError::ValidationFailed(message, errors)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<StringRejection> for ApiError {
    fn from(rejection: StringRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponseBody::error(INTERNAL_ERROR_MESSAGE, None),
                )
            }
            ApiError::ValidationFailed(message, errors) => {
                tracing::warn!(?errors, "Validation failed");
                (
                    StatusCode::BAD_REQUEST,
                    ApiResponseBody::error(message, Some(errors)),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiResponseBody::error(msg, None)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiResponseBody::error(msg, None)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ApiResponseBody::error(msg, None)),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiResponseBody::error(msg, None))
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiResponseBody::error(msg, None)),
        };

        (status, Json(body)).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFoundByUsername(_) => ApiError::NotFound(err.to_string()),
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                ApiError::Conflict(err.to_string())
            }
            UserError::InvalidCredentials | UserError::AccountDisabled => {
                ApiError::Unauthorized(err.to_string())
            }
            UserError::InvalidUsername(ref e) => ApiError::field(e.to_string(), "username"),
            UserError::InvalidEmail(ref e) => ApiError::field(e.to_string(), "email"),
            UserError::InsecurePassword => ApiError::field(err.to_string(), "password"),
            UserError::PasswordMismatch => ApiError::field(err.to_string(), "confirmPassword"),
            UserError::InvalidRole(_)
            | UserError::Password(_)
            | UserError::Token(_)
            | UserError::StorageUnavailable(_)
            | UserError::Unknown(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

/// Envelope shared by every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponseBody<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
            timestamp: Utc::now(),
        }
    }
}
