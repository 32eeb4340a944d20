use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::extract::ApiJson;
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::db::{SessionRepository, User, UserRepository};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: u64,
    pub username: String,
    pub token: String,
}

impl From<User> for SessionResponse {
    fn from(user: User) -> Self {
        SessionResponse {
            id: user.id,
            username: user.username,
            token: user.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let user = UserRepository::register(&state.db, &req.username, &req.password)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = UserRepository::authenticate(&state.db, &req.username, &req.password)?;
    tracing::debug!(user_id = user.id, "User logged in");
    Ok(Json(user.into()))
}

/// POST /logout (requires auth)
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MessageResponse>, AppError> {
    SessionRepository::revoke(&state.db, &current.token)?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// GET /me (requires auth)
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserInfoResponse> {
    Json(UserInfoResponse {
        id: current.user.id,
        username: current.user.username,
    })
}
