use parking_lot::Mutex;

use crate::db::migrate::parse_snapshot;
use crate::db::models::Snapshot;
use crate::db::{SnapshotStore, StoreError};

/// In-memory snapshot backend for tests.
///
/// Holds the serialized document rather than the struct so loads go through
/// the same parse and migration path as the file backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(raw.into())),
            fail_writes: false,
        }
    }

    /// A backend whose every save fails, as a full disk would.
    pub fn failing() -> Self {
        Self {
            contents: Mutex::new(None),
            fail_writes: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }

    pub fn set_contents(&self, raw: impl Into<String>) {
        *self.contents.lock() = Some(raw.into());
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        match self.contents.lock().as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => Ok(Some(parse_snapshot(raw)?)),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        *self.contents.lock() = Some(serde_json::to_string_pretty(snapshot)?);
        Ok(())
    }
}
