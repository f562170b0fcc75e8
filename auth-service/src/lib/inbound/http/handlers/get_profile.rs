use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    caller.authorize(&[Role::User, Role::Admin])?;

    state
        .user_service
        .get_user_by_username(&caller.username)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::new(StatusCode::OK, "Profile retrieved successfully", user.into())
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub enabled: bool,
}

impl From<&User> for ProfileResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            enabled: user.enabled,
        }
    }
}
