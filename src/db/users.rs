use crate::db::models::{Snapshot, User};
use crate::db::sessions::SessionRepository;
use crate::db::Database;
use crate::error::AppError;
use crate::identity::{normalize, resolve_existing_key};

pub struct UserRepository;

impl UserRepository {
    /// Register a new user under the canonical form of `username`.
    pub fn register(db: &Database, username: &str, password: &str) -> Result<User, AppError> {
        let display = username.trim().to_string();

        db.transact(|snapshot| {
            let key = resolve_existing_key(&display, snapshot.users.keys())
                .unwrap_or_else(|| normalize(&display));

            if key.is_empty() {
                return Err(AppError::Validation("Username is required".to_string()));
            }
            if snapshot.users.contains_key(&key) {
                return Err(AppError::Validation("Username already exists".to_string()));
            }

            let user = User {
                id: next_user_id(snapshot),
                username: display,
                username_key: key.clone(),
                password: password.to_string(),
                token: SessionRepository::issue_token(),
            };

            snapshot.users.insert(key.clone(), user.clone());
            snapshot.todos.insert(key, Vec::new());

            tracing::info!(user_id = user.id, "Registered user");
            Ok(user)
        })
    }

    /// Check credentials and return the user with their current token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<User, AppError> {
        let key = Self::find_key(db, username).ok_or_else(AppError::invalid_credentials)?;

        let user = db
            .read(|snapshot| snapshot.users.get(&key).cloned())
            .ok_or_else(AppError::invalid_credentials)?;
        if user.password != password {
            return Err(AppError::invalid_credentials());
        }
        if !user.token.is_empty() {
            return Ok(user);
        }

        // Migrated records may have no token yet; hand out one and keep it.
        db.transact(|snapshot| {
            let user = snapshot
                .users
                .get_mut(&key)
                .ok_or_else(AppError::invalid_credentials)?;
            if user.token.is_empty() {
                SessionRepository::rotate(user);
            }
            Ok(user.clone())
        })
    }

    pub fn get_by_key(db: &Database, key: &str) -> Option<User> {
        db.read(|snapshot| snapshot.users.get(key).cloned())
    }

    /// Stored key for a raw username, if any user matches it.
    pub fn find_key(db: &Database, username: &str) -> Option<String> {
        db.read(|snapshot| resolve_existing_key(username, snapshot.users.keys()))
    }
}

fn next_user_id(snapshot: &Snapshot) -> u64 {
    snapshot.users.values().map(|u| u.id).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use std::sync::Arc;

    fn db() -> Database {
        Database::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let db = db();
        let alice = UserRepository::register(&db, "  Alice ", "pw").unwrap();
        let bob = UserRepository::register(&db, "Bob", "pw").unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(alice.username, "Alice");
        assert_eq!(alice.username_key, "alice");
        assert_eq!(alice.token.len(), 64);
        assert!(db.read(|s| s.todos["alice"].is_empty()));
    }

    #[test]
    fn test_register_rejects_case_insensitive_duplicate() {
        let db = db();
        UserRepository::register(&db, "Alice", "pw").unwrap();
        let err = UserRepository::register(&db, "  alice ", "other").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Username already exists"));
    }

    #[test]
    fn test_register_rejects_blank_username() {
        let err = UserRepository::register(&db(), "   ", "pw").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Username is required"));
    }

    #[test]
    fn test_register_sees_legacy_key() {
        let db = db();
        db.transact(|s| {
            s.users.insert(
                "Zed".to_string(),
                User {
                    id: 7,
                    username: "Zed".to_string(),
                    username_key: "Zed".to_string(),
                    password: "pw".to_string(),
                    token: "t".to_string(),
                },
            );
            Ok(())
        })
        .unwrap();

        assert!(UserRepository::register(&db, "zed", "pw").is_err());
        assert_eq!(UserRepository::register(&db, "amy", "pw").unwrap().id, 8);
    }

    #[test]
    fn test_authenticate() {
        let db = db();
        let registered = UserRepository::register(&db, "Carol", "secret").unwrap();

        let user = UserRepository::authenticate(&db, " CAROL ", "secret").unwrap();
        assert_eq!(user.token, registered.token);

        assert!(matches!(
            UserRepository::authenticate(&db, "carol", "wrong"),
            Err(AppError::Auth(msg)) if msg == "Invalid credentials"
        ));
        assert!(matches!(
            UserRepository::authenticate(&db, "nobody", "secret"),
            Err(AppError::Auth(msg)) if msg == "Invalid credentials"
        ));
    }

    #[test]
    fn test_authenticate_issues_missing_token() {
        let db = db();
        UserRepository::register(&db, "dan", "pw").unwrap();
        db.transact(|s| {
            s.users.get_mut("dan").unwrap().token.clear();
            Ok(())
        })
        .unwrap();

        let user = UserRepository::authenticate(&db, "dan", "pw").unwrap();
        assert!(!user.token.is_empty());
        assert_eq!(UserRepository::get_by_key(&db, "dan").unwrap().token, user.token);
    }
}
