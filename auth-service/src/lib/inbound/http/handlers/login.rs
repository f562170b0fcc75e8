use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::register::required;
use super::register::AuthResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::LoginCommand;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .user_service
        .login(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, "Login successful", session.into()))
}

/// Login body. `username` accepts either the username or the email address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        let mut errors = BTreeMap::new();

        let identifier = required(
            self.username,
            "username",
            "Username or email is required",
            &mut errors,
        );
        let password = required(self.password, "password", "Password is required", &mut errors);

        match (identifier, password) {
            (Some(identifier), Some(password)) => Ok(LoginCommand {
                identifier,
                password,
            }),
            _ => Err(ApiError::validation(errors)),
        }
    }
}
