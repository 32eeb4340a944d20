use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::api::extract::{ApiJson, JsonOrEmpty};
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::db::{Todo, TodoChanges, TodoRepository};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for TodoChanges {
    fn from(req: UpdateTodoRequest) -> Self {
        TodoChanges {
            title: req.title,
            description: req.description,
            completed: req.completed,
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /todos (requires auth)
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(req): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let (Some(title), Some(description)) = (required(req.title), required(req.description)) else {
        return Err(AppError::Validation(
            "Title and description are required".to_string(),
        ));
    };

    let todo = TodoRepository::create(
        &state.db,
        &current.token,
        title,
        description,
        req.completed.unwrap_or(false),
    )?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /todos (requires auth)
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(TodoRepository::list(&state.db, &current.token)?))
}

/// PUT /todos/:id (requires auth)
///
/// A missing body is an empty update: only `editedAt` moves.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonOrEmpty(req): JsonOrEmpty<UpdateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    let todo = TodoRepository::update(&state.db, &id, &current.token, req.into())?;
    Ok(Json(todo))
}

/// DELETE /todos/:id (requires auth)
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    TodoRepository::delete(&state.db, &id, &current.token)?;
    Ok(StatusCode::NO_CONTENT)
}
