use crate::crypto::generate_token;
use crate::db::models::{Snapshot, User};
use crate::db::Database;
use crate::error::AppError;

pub struct SessionRepository;

impl SessionRepository {
    pub fn issue_token() -> String {
        generate_token()
    }

    /// Find the user currently holding `token`. Tokens never expire on their
    /// own; only rotation invalidates them.
    pub fn resolve(db: &Database, token: &str) -> Option<User> {
        db.read(|snapshot| find_by_token(snapshot, token).cloned())
    }

    /// Give the user a fresh token, returning it. Every holder of the old
    /// token is signed out.
    pub fn rotate(user: &mut User) -> String {
        user.token = Self::issue_token();
        user.token.clone()
    }

    /// Sign out the holder of `token` by rotating it away.
    pub fn revoke(db: &Database, token: &str) -> Result<User, AppError> {
        db.transact(|snapshot| {
            let key = session_key(snapshot, token)?;
            let user = snapshot
                .users
                .get_mut(&key)
                .ok_or_else(AppError::unauthorized)?;
            Self::rotate(user);
            tracing::debug!(user_id = user.id, "Session token rotated");
            Ok(user.clone())
        })
    }
}

/// Linear scan; the empty token never matches, even against a user stored
/// without one.
pub(crate) fn find_by_token<'a>(snapshot: &'a Snapshot, token: &str) -> Option<&'a User> {
    if token.is_empty() {
        return None;
    }
    snapshot.users.values().find(|user| user.token == token)
}

/// Canonical key of the user holding `token` in this snapshot.
///
/// Callers that mutate per-user data check the session here, inside the same
/// critical section as the write, so a token rotated by a concurrent logout
/// cannot slip through.
pub(crate) fn session_key(snapshot: &Snapshot, token: &str) -> Result<String, AppError> {
    find_by_token(snapshot, token)
        .map(|user| user.username_key.clone())
        .ok_or_else(AppError::unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, UserRepository};
    use std::sync::Arc;

    fn db() -> Database {
        Database::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_resolve_registered_token() {
        let db = db();
        let user = UserRepository::register(&db, "Alice", "pw").unwrap();
        let resolved = SessionRepository::resolve(&db, &user.token).unwrap();
        assert_eq!(resolved.username_key, "alice");
        assert!(SessionRepository::resolve(&db, "not-a-token").is_none());
    }

    #[test]
    fn test_revoke_invalidates_old_token() {
        let db = db();
        let user = UserRepository::register(&db, "bob", "pw").unwrap();
        let rotated = SessionRepository::revoke(&db, &user.token).unwrap();

        assert_ne!(rotated.token, user.token);
        assert!(SessionRepository::resolve(&db, &user.token).is_none());
        assert!(SessionRepository::resolve(&db, &rotated.token).is_some());
        assert!(matches!(
            SessionRepository::revoke(&db, &user.token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_empty_token_never_resolves() {
        let db = db();
        db.transact(|s| {
            s.users.insert(
                "legacy".to_string(),
                User {
                    id: 1,
                    username: "legacy".to_string(),
                    username_key: "legacy".to_string(),
                    password: "pw".to_string(),
                    token: String::new(),
                },
            );
            Ok(())
        })
        .unwrap();

        assert!(SessionRepository::resolve(&db, "").is_none());
    }
}
