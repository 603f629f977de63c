//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (wall clock in epoch milliseconds)
//! - Storage (LocalStorage on web, a directory of JSON files on native)

pub mod storage;
pub mod time;

pub use storage::{KeyValueStore, MemoryStore, StorageError, UnavailableStore};
pub use time::now_millis;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
