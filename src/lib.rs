//! Per-user todo tracking service.
//!
//! Users register and log in with a username and password, then manage their
//! own todo list over a small JSON HTTP API. All state lives in one snapshot
//! that is rewritten to disk after every change.

pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod identity;

pub use api::{create_router, AppState};
pub use config::Config;
pub use db::{Database, JsonFileStore, MemoryStore, SnapshotStore};
pub use error::AppError;
