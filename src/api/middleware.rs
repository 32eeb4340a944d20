use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::db::{SessionRepository, User};
use crate::error::AppError;

/// The authenticated caller, placed in request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// The token the request was made with
    pub token: String,
}

/// Pull the session token out of `Authorization`. Both `Bearer <token>` and a
/// bare token are accepted.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication middleware - resolves the bearer token to a user
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers())
        .ok_or_else(AppError::unauthorized)?
        .to_string();

    let user = SessionRepository::resolve(&state.db, &token).ok_or_else(|| {
        tracing::debug!("Rejected unknown session token");
        AppError::unauthorized()
    })?;

    request.extensions_mut().insert(CurrentUser { user, token });

    Ok(next.run(request).await)
}
