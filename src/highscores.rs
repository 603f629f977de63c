//! High score boards
//!
//! Persisted through the key-value store. A board keeps the top N scores
//! (sorted descending) either per employee ID or shared by the device, and a
//! short first-in-first-out history of recent runs per ID.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::persistence;
use crate::platform::KeyValueStore;
use crate::platform::time::DAY_MS;
use crate::tuning::{ScoreScope, Tuning};

/// Storage key (global board) or key prefix (per-identity boards)
pub const SCORES_KEY: &str = "seamless_dash_scores";
/// Key prefix of the per-identity recent history
pub const RECENT_KEY: &str = "seamless_dash_recent";
/// Runs kept in the recent history
pub const RECENT_LEN: usize = 3;
/// Default board size
pub const DEFAULT_BOUND: usize = 3;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub id: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
    /// Unix timestamp (ms) after which the entry no longer counts
    #[serde(default)]
    pub expires_at: Option<u64>,
}

impl ScoreRecord {
    pub fn is_live(&self, now: u64) -> bool {
        self.expires_at.is_none_or(|t| now < t)
    }
}

/// One bounded, descending-sorted board
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScores {
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert keeping descending order, then trim to `bound`.
    /// Returns the rank achieved (1-indexed) or None if it fell off the board.
    pub fn insert(&mut self, entry: ScoreRecord, bound: usize) -> Option<usize> {
        // Equal scores keep the older entry first
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let index = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };

        self.entries.truncate(bound);

        (index < bound).then_some(index + 1)
    }

    /// Drop entries past their expiry
    pub fn prune_expired(&mut self, now: u64) {
        self.entries.retain(|e| e.is_live(now));
    }

    /// Re-establish the board invariants after loading untrusted data
    fn normalize(&mut self, bound: usize) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(bound);
    }

    /// Best retained score for one employee ID
    pub fn best_for(&self, id: &str) -> Option<u64> {
        self.entries
            .iter()
            .filter(|e| e.id == id)
            .map(|e| e.score)
            .max()
    }
}

/// Score persistence for one tuning configuration
#[derive(Debug, Clone, Copy)]
pub struct ScoreStore {
    bound: usize,
    scope: ScoreScope,
    ttl_ms: Option<u64>,
}

impl Default for ScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_BOUND, ScoreScope::PerIdentity)
    }
}

impl ScoreStore {
    pub fn new(bound: usize, scope: ScoreScope) -> Self {
        Self {
            bound: bound.max(1),
            scope,
            ttl_ms: None,
        }
    }

    /// Records expire `ttl_ms` after they are made
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        let store = Self::new(tuning.score_bound, tuning.score_scope);
        match tuning.score_ttl_days {
            Some(days) => store.with_ttl(days * DAY_MS),
            None => store,
        }
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    fn board_key(&self, identity: &Identity) -> String {
        match self.scope {
            ScoreScope::PerIdentity => format!("{SCORES_KEY}_{}", identity.id),
            ScoreScope::Global => SCORES_KEY.to_string(),
        }
    }

    fn recent_key(identity: &Identity) -> String {
        format!("{RECENT_KEY}_{}", identity.id)
    }

    /// Load the board `identity` plays on (empty if storage fails)
    pub fn board(&self, store: &dyn KeyValueStore, identity: &Identity, now: u64) -> HighScores {
        let mut board: HighScores =
            persistence::load(store, &self.board_key(identity)).unwrap_or_default();
        board.prune_expired(now);
        board.normalize(self.bound);
        board
    }

    /// Append a finished run, keep the board sorted and bounded, persist.
    /// Returns the rank achieved on the board, if retained.
    pub fn record(
        &self,
        store: &mut dyn KeyValueStore,
        identity: &Identity,
        score: u64,
        now: u64,
    ) -> Option<usize> {
        let mut board = self.board(store, identity, now);
        let entry = ScoreRecord {
            name: identity.name.clone(),
            id: identity.id.clone(),
            score,
            timestamp: now,
            expires_at: self.ttl_ms.map(|ttl| now.saturating_add(ttl)),
        };
        let rank = board.insert(entry, self.bound);
        if persistence::save(store, &self.board_key(identity), &board) {
            log::info!(
                "High scores saved ({} entries, new rank {:?})",
                board.entries.len(),
                rank
            );
        }

        let mut recent = self.recent(store, identity);
        recent.insert(0, score);
        recent.truncate(RECENT_LEN);
        persistence::save(store, &Self::recent_key(identity), &recent);

        rank
    }

    /// Highest retained score for `identity`, `None` if it has none
    pub fn best_for(&self, store: &dyn KeyValueStore, identity: &Identity, now: u64) -> Option<u64> {
        self.board(store, identity, now).best_for(&identity.id)
    }

    /// Board entries in rank order
    pub fn top(&self, store: &dyn KeyValueStore, identity: &Identity, now: u64) -> Vec<ScoreRecord> {
        self.board(store, identity, now).entries
    }

    /// Most recent runs for `identity`, newest first
    pub fn recent(&self, store: &dyn KeyValueStore, identity: &Identity) -> Vec<u64> {
        persistence::load(store, &Self::recent_key(identity)).unwrap_or_default()
    }
}

/// Format a timestamp as a relative date string
pub fn format_age(timestamp: u64, now: u64) -> String {
    let diff_mins = now.saturating_sub(timestamp) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days >= 1 {
        if diff_days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", diff_days)
        }
    } else if diff_hours >= 1 {
        if diff_hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", diff_hours)
        }
    } else if diff_mins >= 1 {
        if diff_mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", diff_mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryStore, UnavailableStore};
    use proptest::prelude::*;

    fn jane() -> Identity {
        Identity::parse("Jane Doe", "4821").unwrap()
    }

    fn john() -> Identity {
        Identity::parse("John Roe", "1377").unwrap()
    }

    #[test]
    fn test_record_keeps_best_sorted() {
        let scores = ScoreStore::default();
        let mut store = MemoryStore::new();
        for (i, s) in [40u64, 237, 12, 99, 180].into_iter().enumerate() {
            scores.record(&mut store, &jane(), s, i as u64);
        }
        let top: Vec<u64> = scores.top(&store, &jane(), 10).iter().map(|e| e.score).collect();
        assert_eq!(top, vec![237, 180, 99]);
        assert_eq!(scores.best_for(&store, &jane(), 10), Some(237));
    }

    #[test]
    fn test_best_for_empty_is_none() {
        let scores = ScoreStore::default();
        let store = MemoryStore::new();
        assert_eq!(scores.best_for(&store, &jane(), 0), None);
    }

    #[test]
    fn test_rank_reporting() {
        let scores = ScoreStore::new(3, ScoreScope::PerIdentity);
        let mut store = MemoryStore::new();
        assert_eq!(scores.record(&mut store, &jane(), 50, 0), Some(1));
        assert_eq!(scores.record(&mut store, &jane(), 70, 0), Some(1));
        assert_eq!(scores.record(&mut store, &jane(), 60, 0), Some(2));
        assert_eq!(scores.record(&mut store, &jane(), 10, 0), None);
        // Ties go below the existing entry
        assert_eq!(scores.record(&mut store, &jane(), 60, 0), Some(3));
    }

    #[test]
    fn test_per_identity_partition() {
        let scores = ScoreStore::default();
        let mut store = MemoryStore::new();
        scores.record(&mut store, &jane(), 237, 0);
        scores.record(&mut store, &john(), 500, 0);
        assert_eq!(scores.best_for(&store, &jane(), 0), Some(237));
        assert_eq!(scores.best_for(&store, &john(), 0), Some(500));
        assert!(store.get("seamless_dash_scores_4821").unwrap().is_some());
    }

    #[test]
    fn test_global_board_is_shared() {
        let scores = ScoreStore::new(3, ScoreScope::Global);
        let mut store = MemoryStore::new();
        scores.record(&mut store, &jane(), 237, 0);
        scores.record(&mut store, &john(), 500, 0);
        let top = scores.top(&store, &jane(), 0);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "John Roe");
        assert_eq!(scores.best_for(&store, &jane(), 0), Some(237));

        // Jane falls off the shared board entirely
        for s in [600, 700, 800] {
            scores.record(&mut store, &john(), s, 0);
        }
        assert_eq!(scores.best_for(&store, &jane(), 0), None);
    }

    #[test]
    fn test_recent_history_is_fifo() {
        let scores = ScoreStore::default();
        let mut store = MemoryStore::new();
        for s in [1, 2, 3, 4] {
            scores.record(&mut store, &jane(), s, 0);
        }
        assert_eq!(scores.recent(&store, &jane()), vec![4, 3, 2]);
    }

    #[test]
    fn test_expired_records_drop_out() {
        let scores = ScoreStore::default().with_ttl(1_000);
        let mut store = MemoryStore::new();
        scores.record(&mut store, &jane(), 300, 0);
        assert_eq!(scores.best_for(&store, &jane(), 500), Some(300));
        assert_eq!(scores.best_for(&store, &jane(), 1_000), None);

        scores.record(&mut store, &jane(), 100, 5_000);
        assert_eq!(scores.top(&store, &jane(), 5_500).len(), 1);
        assert_eq!(scores.best_for(&store, &jane(), 5_500), Some(100));
    }

    #[test]
    fn test_storage_failure_degrades_to_empty() {
        let scores = ScoreStore::default();
        let mut store = UnavailableStore;
        assert_eq!(scores.record(&mut store, &jane(), 237, 0), Some(1));
        assert_eq!(scores.best_for(&store, &jane(), 0), None);
        assert!(scores.recent(&store, &jane()).is_empty());
    }

    #[test]
    fn test_corrupt_board_is_normalized() {
        let scores = ScoreStore::default();
        let mut store = MemoryStore::new();
        let unsorted = HighScores {
            entries: [5u64, 50, 500, 1]
                .into_iter()
                .map(|score| ScoreRecord {
                    name: "Jane Doe".into(),
                    id: "4821".into(),
                    score,
                    timestamp: 0,
                    expires_at: None,
                })
                .collect(),
        };
        persistence::save(&mut store, "seamless_dash_scores_4821", &unsorted);
        let top: Vec<u64> = scores.top(&store, &jane(), 0).iter().map(|e| e.score).collect();
        assert_eq!(top, vec![500, 50, 5]);
    }

    #[test]
    fn test_format_age() {
        let now = 10 * DAY_MS;
        assert_eq!(format_age(now, now), "Just now");
        assert_eq!(format_age(now - 60_000, now), "1 min ago");
        assert_eq!(format_age(now - 5 * 60_000, now), "5 mins ago");
        assert_eq!(format_age(now - 3_600_000, now), "1 hour ago");
        assert_eq!(format_age(now - DAY_MS, now), "Yesterday");
        assert_eq!(format_age(now - 3 * DAY_MS, now), "3 days ago");
        // Clock skew never panics
        assert_eq!(format_age(now + 1, now), "Just now");
    }

    proptest! {
        #[test]
        fn prop_retains_largest_sorted(
            values in proptest::collection::vec(0u64..10_000, 0..40),
            bound in 3usize..=5,
        ) {
            let scores = ScoreStore::new(bound, ScoreScope::PerIdentity);
            let mut store = MemoryStore::new();
            for &v in &values {
                scores.record(&mut store, &jane(), v, 0);
            }

            let kept: Vec<u64> = scores.top(&store, &jane(), 0).iter().map(|e| e.score).collect();
            let mut expected = values.clone();
            expected.sort_unstable_by(|a, b| b.cmp(a));
            expected.truncate(bound);

            prop_assert_eq!(kept.len(), values.len().min(bound));
            prop_assert_eq!(kept, expected);
        }
    }
}
