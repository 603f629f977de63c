//! Data-driven game balance
//!
//! Everything that differed between the historical builds of the game (level
//! thresholds, hit geometry, spawn rates) is a knob here rather than a
//! hard-coded constant. Loaded from JSON, any missing field takes its default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence;
use crate::platform::KeyValueStore;

/// Which game the session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameVariant {
    /// Falling obstacles, avatar follows the pointer along the bottom
    #[default]
    Dodge,
    /// Bounce upward on one-way platforms, press left/right to steer
    Jump,
}

/// How the score needed for the next level grows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThresholdPolicy {
    /// `threshold(L) = step * L`
    Additive { step: f64 },
    /// `threshold(L) = base * factor^(L - 1)`
    Multiplicative { base: f64, factor: f64 },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Additive { step: 100.0 }
    }
}

impl ThresholdPolicy {
    /// Score at which level `level` ends (level-up to `level + 1`)
    pub fn threshold(&self, level: u32) -> f64 {
        let level = level.max(1);
        match *self {
            ThresholdPolicy::Additive { step } => step * level as f64,
            ThresholdPolicy::Multiplicative { base, factor } => {
                base * factor.powi(level as i32 - 1)
            }
        }
    }
}

/// Geometry used for obstacle and power-up hit tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitShape {
    /// Entity is its bounding square
    #[default]
    Rect,
    /// Entity is the circle inscribed in its bounding square
    Circle,
}

/// Where high scores are partitioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoreScope {
    /// One bounded board per employee ID
    #[default]
    PerIdentity,
    /// One bounded board shared by everyone on this device
    Global,
}

/// Spawn policy rates. Chances are per 60 Hz reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub obstacle_base_chance: f32,
    pub obstacle_chance_per_level: f32,
    pub obstacle_max_chance: f32,
    pub obstacle_min_size: f32,
    pub obstacle_max_size: f32,
    /// Fall speed range in px/s before the level multiplier
    pub obstacle_min_speed: f32,
    pub obstacle_max_speed: f32,
    pub power_up_chance: f32,
    pub power_up_size: f32,
    pub power_up_speed: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            obstacle_base_chance: 0.04,
            obstacle_chance_per_level: 0.005,
            obstacle_max_chance: 0.12,
            obstacle_min_size: 30.0,
            obstacle_max_size: 50.0,
            obstacle_min_speed: 210.0,
            obstacle_max_speed: 330.0,
            power_up_chance: 0.004,
            power_up_size: 30.0,
            power_up_speed: 150.0,
        }
    }
}

/// Rejected tuning values
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning file could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Complete balance sheet for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub variant: GameVariant,
    pub threshold: ThresholdPolicy,
    /// Added to the speed multiplier on every level-up
    pub speed_step: f32,
    pub hit_shape: HitShape,
    /// Inward margin on each side of the player's hit box (px)
    pub hit_padding: f32,
    /// Dodge variant score accrual
    pub score_per_second: f64,
    /// Jump variant score accrual while the view scrolls
    pub scroll_score_per_second: f64,
    pub spawn: SpawnTuning,
    pub shield_seconds: f32,
    pub slow_time_seconds: f32,
    /// Obstacle speed factor while slow-time is active
    pub slow_time_factor: f32,
    /// Retained high scores per board (3 to 5)
    pub score_bound: usize,
    pub score_scope: ScoreScope,
    /// Optional lifetime of a high score record
    pub score_ttl_days: Option<u64>,
    pub session_days: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            variant: GameVariant::Dodge,
            threshold: ThresholdPolicy::default(),
            speed_step: 0.1,
            hit_shape: HitShape::Rect,
            hit_padding: 20.0,
            score_per_second: 9.0,
            scroll_score_per_second: 60.0,
            spawn: SpawnTuning::default(),
            shield_seconds: 5.0,
            slow_time_seconds: 5.0,
            slow_time_factor: 0.5,
            score_bound: 3,
            score_scope: ScoreScope::PerIdentity,
            score_ttl_days: None,
            session_days: 90,
        }
    }
}

impl Tuning {
    /// Storage key used by [`Tuning::load`]
    pub const STORAGE_KEY: &'static str = "seamless_dash_tuning";

    /// Smallest and largest accepted `score_bound`
    pub const SCORE_BOUND_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

    /// Convenience for the jump game with default balance
    pub fn jump() -> Self {
        Self {
            variant: GameVariant::Jump,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read a JSON tuning file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load stored tuning, falling back to defaults when absent or invalid
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load::<Tuning>(store, Self::STORAGE_KEY) {
            Some(tuning) => match tuning.validate() {
                Ok(()) => {
                    log::info!("Loaded tuning ({:?})", tuning.variant);
                    tuning
                }
                Err(e) => {
                    log::warn!("Stored tuning rejected, using defaults: {e}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if persistence::save(store, Self::STORAGE_KEY, self) {
            log::info!("Tuning saved");
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: &str| Err(TuningError::Invalid(msg.to_string()));

        match self.threshold {
            ThresholdPolicy::Additive { step } if !(step > 0.0) => {
                return invalid("additive threshold step must be positive");
            }
            ThresholdPolicy::Multiplicative { base, factor } if !(base > 0.0 && factor > 1.0) => {
                return invalid("multiplicative threshold needs base > 0 and factor > 1");
            }
            _ => {}
        }
        if !Self::SCORE_BOUND_RANGE.contains(&self.score_bound) {
            return invalid("score_bound must be between 3 and 5");
        }
        if self.hit_padding < 0.0 {
            return invalid("hit_padding must not be negative");
        }
        if self.speed_step < 0.0 || self.score_per_second < 0.0 || self.scroll_score_per_second < 0.0 {
            return invalid("progression rates must not be negative");
        }
        let s = &self.spawn;
        let chances = [
            s.obstacle_base_chance,
            s.obstacle_chance_per_level,
            s.obstacle_max_chance,
            s.power_up_chance,
        ];
        if chances.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return invalid("spawn chances must be within [0, 1]");
        }
        if s.obstacle_min_size <= 0.0 || s.obstacle_min_size > s.obstacle_max_size {
            return invalid("obstacle size range is empty");
        }
        if s.obstacle_min_speed < 0.0 || s.obstacle_min_speed > s.obstacle_max_speed {
            return invalid("obstacle speed range is empty");
        }
        if !(0.0..=1.0).contains(&self.slow_time_factor) {
            return invalid("slow_time_factor must be within [0, 1]");
        }
        if self.session_days == 0 {
            return invalid("session_days must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_additive_thresholds() {
        let policy = ThresholdPolicy::Additive { step: 100.0 };
        assert_eq!(policy.threshold(1), 100.0);
        assert_eq!(policy.threshold(2), 200.0);
        assert_eq!(policy.threshold(5), 500.0);
    }

    #[test]
    fn test_multiplicative_thresholds() {
        let policy = ThresholdPolicy::Multiplicative {
            base: 100.0,
            factor: 1.5,
        };
        assert_eq!(policy.threshold(1), 100.0);
        assert_eq!(policy.threshold(2), 150.0);
        assert_eq!(policy.threshold(3), 225.0);
    }

    #[test]
    fn test_defaults_are_valid() {
        Tuning::default().validate().unwrap();
        Tuning::jump().validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning = Tuning::from_json(
            r#"{ "variant": "Jump", "threshold": { "Additive": { "step": 150.0 } } }"#,
        )
        .unwrap();
        assert_eq!(tuning.variant, GameVariant::Jump);
        assert_eq!(tuning.threshold.threshold(2), 300.0);
        assert_eq!(tuning.score_bound, 3);
        assert_eq!(tuning.spawn, SpawnTuning::default());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            Tuning::from_json(r#"{ "score_bound": 10 }"#),
            Err(TuningError::Invalid(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "hit_padding": -1.0 }"#),
            Err(TuningError::Invalid(_))
        ));
        assert!(matches!(Tuning::from_json("{"), Err(TuningError::Parse(_))));
    }

    #[test]
    fn test_store_roundtrip_and_fallback() {
        let mut store = MemoryStore::new();
        assert_eq!(Tuning::load(&store), Tuning::default());

        let mut tuning = Tuning::jump();
        tuning.score_bound = 5;
        tuning.save(&mut store);
        assert_eq!(Tuning::load(&store), tuning);

        store
            .set(Tuning::STORAGE_KEY, r#"{ "score_bound": 99 }"#)
            .unwrap();
        assert_eq!(Tuning::load(&store), Tuning::default());
    }
}
