use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Role;
use crate::inbound::http::middleware::AuthenticatedUser;

pub async fn admin_info(caller: AuthenticatedUser) -> Result<ApiSuccess<&'static str>, ApiError> {
    caller.authorize(&[Role::Admin])?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        format!(
            "Welcome Admin {}! You have access to administrative functions.",
            caller.username
        ),
        "ADMIN_ACCESS_GRANTED",
    ))
}
