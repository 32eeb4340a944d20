use chrono::Utc;

use crate::crypto::generate_todo_id;
use crate::db::models::{Todo, TodoChanges};
use crate::db::sessions::session_key;
use crate::db::Database;
use crate::error::AppError;

/// CRUD over a single user's todo list.
///
/// Every call takes the caller's session token and resolves it against the
/// snapshot under the same lock as the read or write. A token that no longer
/// belongs to anyone is `Unauthorized`; ids belonging to other users are
/// simply not found.
pub struct TodoRepository;

impl TodoRepository {
    pub fn create(
        db: &Database,
        token: &str,
        title: String,
        description: String,
        completed: bool,
    ) -> Result<Todo, AppError> {
        let now = Utc::now();
        let todo = Todo {
            id: generate_todo_id(),
            title,
            description,
            completed,
            created_at: now,
            edited_at: None,
            completed_at: completed.then_some(now),
        };

        let owner = db.transact(|snapshot| {
            let key = session_key(snapshot, token)?;
            snapshot.todos_mut(&key).push(todo.clone());
            Ok(key)
        })?;

        tracing::debug!(owner = %owner, todo_id = %todo.id, "Created todo");
        Ok(todo)
    }

    /// Todos in insertion order.
    pub fn list(db: &Database, token: &str) -> Result<Vec<Todo>, AppError> {
        db.read(|snapshot| {
            let key = session_key(snapshot, token)?;
            Ok(snapshot.todos.get(&key).cloned().unwrap_or_default())
        })
    }

    /// Apply a partial update.
    ///
    /// Empty `title` or `description` values count as absent and keep the
    /// current text. `completed`, when present, drives `completed_at`:
    /// set on the transition into completed, cleared on the way out, left alone
    /// otherwise. `edited_at` is refreshed on every successful call.
    pub fn update(
        db: &Database,
        todo_id: &str,
        token: &str,
        changes: TodoChanges,
    ) -> Result<Todo, AppError> {
        db.transact(|snapshot| {
            let key = session_key(snapshot, token)?;
            let todo = snapshot
                .todos_mut(&key)
                .iter_mut()
                .find(|todo| todo.id == todo_id)
                .ok_or_else(AppError::todo_not_found)?;

            let now = Utc::now();

            if let Some(title) = changes.title.filter(|t| !t.is_empty()) {
                todo.title = title;
            }
            if let Some(description) = changes.description.filter(|d| !d.is_empty()) {
                todo.description = description;
            }
            if let Some(completed) = changes.completed {
                match (todo.completed, completed) {
                    (false, true) => todo.completed_at = Some(now),
                    (true, false) => todo.completed_at = None,
                    _ => {}
                }
                todo.completed = completed;
            }
            todo.edited_at = Some(now);

            Ok(todo.clone())
        })
    }

    pub fn delete(db: &Database, todo_id: &str, token: &str) -> Result<(), AppError> {
        let owner = db.transact(|snapshot| {
            let key = session_key(snapshot, token)?;
            let list = snapshot.todos_mut(&key);
            let index = list
                .iter()
                .position(|todo| todo.id == todo_id)
                .ok_or_else(AppError::todo_not_found)?;
            list.remove(index);
            Ok(key)
        })?;

        tracing::debug!(owner = %owner, todo_id, "Deleted todo");
        Ok(())
    }
}
