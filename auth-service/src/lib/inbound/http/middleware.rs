use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

const PUBLIC_PATHS: [&str; 5] = [
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/health",
    "/api/auth/validate-password",
    "/favicon.ico",
];
const PUBLIC_PREFIXES: [&str; 2] = ["/api/public/", "/actuator/"];

/// Identity attached to request extensions by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: Username,
    pub roles: Vec<Role>,
}

/// Marker left in request extensions when the account behind a bearer
/// token could not be looked up.
#[derive(Debug, Clone)]
pub struct IdentityUnavailable(pub String);

impl AuthenticatedUser {
    /// Reject with 403 unless one of the caller's roles is in `allowed`.
    pub fn authorize(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.roles.iter().any(|role| role.is_any_of(allowed)) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                roles = ?self.roles,
                "Access denied"
            );
            Err(ApiError::Forbidden(
                "Access denied: insufficient privileges".to_string(),
            ))
        }
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            roles: vec![user.role],
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(IdentityUnavailable(detail)) = parts.extensions.get::<IdentityUnavailable>() {
            return Err(ApiError::InternalServerError(format!(
                "Identity lookup failed: {}",
                detail
            )));
        }

        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// Middleware that resolves a bearer token to an account and attaches it to the request.
///
/// Never rejects: requests without a usable token continue unauthenticated
/// and are turned away by the [`AuthenticatedUser`] extractor where needed.
/// A failed account lookup is recorded as [`IdentityUnavailable`] so that
/// protected handlers answer with a server error instead of 401.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    let token = bearer_token(req.headers()).map(str::to_string);
    let Some(token) = token else {
        return next.run(req).await;
    };

    match state.user_service.resolve_token(&token).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = %user.id, "Request authenticated");
            req.extensions_mut().insert(AuthenticatedUser::from(&user));
        }
        Ok(None) => {
            tracing::debug!(path = %req.uri().path(), "Bearer token not accepted");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve bearer token");
            req.extensions_mut().insert(IdentityUnavailable(e.to_string()));
        }
    }

    next.run(req).await
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
