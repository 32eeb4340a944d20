pub mod file;
pub mod memory;
pub mod migrate;
pub mod models;
pub mod sessions;
pub mod todos;
pub mod users;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use models::{Snapshot, Todo, TodoChanges, User};
pub use sessions::SessionRepository;
pub use todos::TodoRepository;
pub use users::UserRepository;

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable home of the snapshot: a file, a database, or a test double.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` means there is nothing stored yet.
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Shared handle to the in-memory snapshot and its backend.
///
/// Cheap to clone. All reads and writes of users and todos go through here;
/// one lock covers locate, mutate and flush so concurrent handlers never
/// interleave a half-applied change with a full-snapshot write.
#[derive(Clone)]
pub struct Database {
    state: Arc<Mutex<Snapshot>>,
    backend: Arc<dyn SnapshotStore>,
}

impl Database {
    pub fn new(backend: Arc<dyn SnapshotStore>) -> Self {
        Self {
            state: Arc::new(Mutex::new(Snapshot::default())),
            backend,
        }
    }

    /// Create a handle and load whatever the backend holds.
    pub fn open(backend: Arc<dyn SnapshotStore>) -> Self {
        let db = Self::new(backend);
        db.load();
        db
    }

    /// Replace in-memory state with the stored snapshot.
    ///
    /// Returns `true` if state was replaced. A missing or empty store, or one
    /// that fails to read or parse, leaves the current state untouched.
    pub fn load(&self) -> bool {
        match self.backend.load() {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    users = snapshot.users.len(),
                    lists = snapshot.todos.len(),
                    "Loaded data store"
                );
                *self.state.lock() = snapshot;
                true
            }
            Ok(None) => {
                tracing::debug!("No stored snapshot, starting empty");
                false
            }
            Err(e) => {
                tracing::error!("Failed to load data store: {}", e);
                false
            }
        }
    }

    /// Flush the current snapshot. Failures are logged, not returned.
    pub fn save(&self) {
        let state = self.state.lock();
        self.flush(&state);
    }

    /// Run a read-only closure against the snapshot.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Snapshot) -> R,
    {
        let state = self.state.lock();
        f(&*state)
    }

    /// Run a mutation and flush the result while still holding the lock.
    ///
    /// The snapshot is only written when `f` succeeds. A failed write does not
    /// fail the operation: callers see the in-memory result.
    pub fn transact<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Snapshot) -> Result<T, AppError>,
    {
        let mut state = self.state.lock();
        let value = f(&mut *state)?;
        self.flush(&state);
        Ok(value)
    }

    /// Copy of the full in-memory state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().clone()
    }

    fn flush(&self, snapshot: &Snapshot) {
        if let Err(e) = self.backend.save(snapshot) {
            tracing::error!("Failed to save data store: {}", e);
        }
    }
}
