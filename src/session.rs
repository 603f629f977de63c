//! Remembered player session ("returning user" shortcut)
//!
//! Persisted to the key-value store, valid for a fixed window after login.

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, IdentityError};
use crate::persistence;
use crate::platform::KeyValueStore;
use crate::platform::time::DAY_MS;

/// Storage key for the session record
pub const SESSION_KEY: &str = "seamless_dash_session";

/// Default session lifetime (90 days)
pub const DEFAULT_SESSION_MS: u64 = 90 * DAY_MS;

/// A persisted identity with its expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub name: String,
    pub id: String,
    /// Epoch milliseconds after which the record is stale
    pub expiry: u64,
}

impl SessionRecord {
    /// Valid iff `now < expiry`
    pub fn is_valid(&self, now: u64) -> bool {
        now < self.expiry
    }

    /// The stored identity, re-checked against the form rules
    pub fn identity(&self) -> Result<Identity, IdentityError> {
        Identity::parse(&self.name, &self.id)
    }
}

/// Session persistence
#[derive(Debug, Clone, Copy)]
pub struct SessionStore {
    duration_ms: u64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_MS)
    }
}

impl SessionStore {
    pub fn new(duration_ms: u64) -> Self {
        Self { duration_ms }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Remember `identity` until `now + duration`
    pub fn save(&self, store: &mut dyn KeyValueStore, identity: &Identity, now: u64) -> SessionRecord {
        let record = SessionRecord {
            name: identity.name.clone(),
            id: identity.id.clone(),
            expiry: now.saturating_add(self.duration_ms),
        };
        if persistence::save(store, SESSION_KEY, &record) {
            log::info!("Session saved for {} (expires {})", record.id, record.expiry);
        }
        record
    }

    /// The remembered identity, or `None` (clearing a stale record)
    pub fn load(&self, store: &mut dyn KeyValueStore, now: u64) -> Option<Identity> {
        let record: SessionRecord = persistence::load(store, SESSION_KEY)?;
        if !record.is_valid(now) {
            log::info!("Session for {} expired, clearing", record.id);
            persistence::remove(store, SESSION_KEY);
            return None;
        }
        match record.identity() {
            Ok(identity) => Some(identity),
            Err(e) => {
                log::warn!("Stored session rejected ({e}), clearing");
                persistence::remove(store, SESSION_KEY);
                None
            }
        }
    }

    /// Forget the remembered identity ("change user")
    pub fn clear(&self, store: &mut dyn KeyValueStore) {
        if persistence::remove(store, SESSION_KEY) {
            log::info!("Session cleared");
        }
    }
}
