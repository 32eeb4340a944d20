//! Snapshot parsing and legacy-key migration.
//!
//! Older data files keyed users by whatever the client sent, so the same
//! person may appear under `"Alice"`, `"alice "` and `"alice"`, with todo lists
//! filed under any of those keys. Loading folds all of them onto the canonical
//! key. The pass is idempotent: migrating an already-canonical snapshot yields
//! the same snapshot.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::db::models::{null_as_default, Snapshot, Todo, User};
use crate::identity::normalize;

/// On-disk document as written by any historical version. Map order follows
/// the file, which decides which duplicate user survives.
#[derive(Debug, Default, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    users: Option<Map<String, Value>>,
    #[serde(default)]
    todos: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyUser {
    #[serde(deserialize_with = "null_as_default")]
    id: u64,
    username: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    password: String,
    #[serde(deserialize_with = "null_as_default")]
    token: String,
}

/// Parse a snapshot document and migrate it to canonical keys.
pub fn parse_snapshot(raw: &str) -> Result<Snapshot, serde_json::Error> {
    let raw: RawSnapshot = serde_json::from_str(raw)?;
    Ok(migrate(
        raw.users.unwrap_or_default(),
        raw.todos.unwrap_or_default(),
    ))
}

fn migrate(users: Map<String, Value>, todos: Map<String, Value>) -> Snapshot {
    let mut migrated_users: BTreeMap<String, User> = BTreeMap::new();
    let mut migrated_todos: BTreeMap<String, Vec<Todo>> = BTreeMap::new();

    for (storage_key, value) in users {
        let legacy: LegacyUser = match serde_json::from_value(value) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Skipping unreadable user entry {:?}: {}", storage_key, e);
                continue;
            }
        };

        let display = match legacy.username {
            Some(name) if !name.is_empty() => name,
            _ => storage_key.trim().to_string(),
        };
        let key = normalize(&display);
        if key.is_empty() {
            tracing::warn!("Skipping user entry {:?} with empty username", storage_key);
            continue;
        }

        if migrated_users.contains_key(&key) {
            tracing::warn!(
                "Dropping duplicate user entry {:?} (already have {:?})",
                storage_key,
                key
            );
        } else {
            migrated_users.insert(
                key.clone(),
                User {
                    id: legacy.id,
                    username: display,
                    username_key: key.clone(),
                    password: legacy.password,
                    token: legacy.token,
                },
            );
        }

        let incoming: &[Value] = match todos.get(&storage_key) {
            Some(Value::Array(items)) => items,
            _ => match todos.get(&key) {
                Some(Value::Array(items)) => items,
                _ => &[],
            },
        };

        let merged = migrated_todos.entry(key).or_default();
        for item in incoming {
            let todo: Todo = match serde_json::from_value(item.clone()) {
                Ok(todo) => todo,
                Err(e) => {
                    tracing::warn!("Skipping unreadable todo under {:?}: {}", storage_key, e);
                    continue;
                }
            };
            if !merged.iter().any(|existing| existing.id == todo.id) {
                merged.push(todo);
            }
        }
    }

    Snapshot {
        users: migrated_users,
        todos: migrated_todos,
    }
}
