use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|session| {
            ApiSuccess::new(
                StatusCode::CREATED,
                "User registered successfully",
                session.into(),
            )
        })
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        let mut errors = BTreeMap::new();

        let username = match self.username.map(Username::new) {
            Some(Ok(username)) => Some(username),
            Some(Err(e)) => {
                errors.insert("username".to_string(), e.to_string());
                None
            }
            None => {
                errors.insert("username".to_string(), "Username is required".to_string());
                None
            }
        };

        let email = match self.email.map(EmailAddress::new) {
            Some(Ok(email)) => Some(email),
            Some(Err(e)) => {
                errors.insert("email".to_string(), e.to_string());
                None
            }
            None => {
                errors.insert("email".to_string(), "Email is required".to_string());
                None
            }
        };

        let password = required(self.password, "password", "Password is required", &mut errors);
        let confirm_password = required(
            self.confirm_password,
            "confirmPassword",
            "Password confirmation is required",
            &mut errors,
        );

        match (username, email, password, confirm_password) {
            (Some(username), Some(email), Some(password), Some(confirm_password)) => Ok(
                RegisterCommand::new(username, email, password, confirm_password),
            ),
            _ => Err(ApiError::validation(errors)),
        }
    }
}

/// Keep a non-blank field, otherwise record `message` against `field`.
pub(super) fn required(
    value: Option<String>,
    field: &str,
    message: &str,
    errors: &mut BTreeMap<String, String>,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            errors.insert(field.to_string(), message.to_string());
            None
        }
    }
}

/// Token plus public account view returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponseData {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: UserInfoData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfoData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserInfoData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role.to_string(),
        }
    }
}

impl From<AuthSession> for AuthResponseData {
    fn from(session: AuthSession) -> Self {
        Self {
            user: (&session.user).into(),
            token: session.token,
            token_type: "Bearer".to_string(),
        }
    }
}
