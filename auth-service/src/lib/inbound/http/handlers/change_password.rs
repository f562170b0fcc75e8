use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::Role;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    caller.authorize(&[Role::User, Role::Admin])?;

    let Json(body) = payload?;

    state
        .user_service
        .change_password(&caller.username, body.try_into_command()?)
        .await
        .map_err(|e| match e {
            UserError::InsecurePassword => ApiError::BadRequest(
                "New password must be at least 8 characters long and contain uppercase, lowercase, digit, and special character"
                    .to_string(),
            ),
            UserError::InvalidCredentials => {
                ApiError::Unauthorized("Current password is incorrect".to_string())
            }
            _ => ApiError::from(e),
        })
        .map(|_| ApiSuccess::message(StatusCode::OK, "Password changed successfully"))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    old_password: Option<String>,
    new_password: Option<String>,
}

impl ChangePasswordRequest {
    fn try_into_command(self) -> Result<ChangePasswordCommand, ApiError> {
        match (self.old_password, self.new_password) {
            (Some(old_password), Some(new_password)) => Ok(ChangePasswordCommand {
                old_password,
                new_password,
            }),
            _ => Err(ApiError::BadRequest(
                "Both oldPassword and newPassword are required".to_string(),
            )),
        }
    }
}
