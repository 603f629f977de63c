//! Typed JSON persistence on top of a [`KeyValueStore`]
//!
//! Storage is never fatal: every failure is logged and reads degrade to
//! "absent", so callers fall back to empty collections or defaults.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::platform::{KeyValueStore, StorageError};

/// Read and decode `key`, propagating storage and decode errors
pub fn try_load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Read and decode `key`; any failure reads as `None`
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match try_load(store, key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring unreadable record {key}: {e}");
            None
        }
    }
}

/// Encode and write `value` under `key`; returns whether it was persisted
pub fn save<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> bool {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not persist {key}: {e}");
            false
        }
    }
}

/// Delete `key`; returns whether the delete went through
pub fn remove(store: &mut dyn KeyValueStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not remove {key}: {e}");
            false
        }
    }
}
