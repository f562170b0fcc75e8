use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Role;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_stats(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<ApiSuccess<StatsResponseData>, ApiError> {
    caller.authorize(&[Role::User, Role::Admin])?;

    let user = state
        .user_service
        .get_user_by_username(&caller.username)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        "User statistics retrieved successfully",
        StatsResponseData {
            user_id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            role: user.role.to_string(),
            account_age_days: user.account_age_days(Utc::now()),
            enabled: user.enabled,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponseData {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub account_age_days: i64,
    pub enabled: bool,
}
