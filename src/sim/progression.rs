//! Score, level and phase bookkeeping

use serde::{Deserialize, Serialize};

use crate::tuning::ThresholdPolicy;

/// Facts shown on the level-up interstitial, picked by `level % len`
pub const TRIVIA: [&str; 7] = [
    "Seamex was established in 2017 to provide a seamless HR experience.",
    "Seamex is powered by 'Poornata', the Group's HRMS software.",
    "Seamex acts as a single point of contact for the entire employee lifecycle.",
    "Seamex handles everything from Onboarding to Exit Management.",
    "Core Value: 'Respect for all' is a key work ethic at Seamex.",
    "Seamex uses 'Cornerstone on Demand' for employee learning.",
    "Seamex is located in Airoli, Navi Mumbai.",
];

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the identity form
    #[default]
    Start,
    Playing,
    /// Interstitial between levels; only the pointer and confetti move
    LevelUp,
    Paused,
    GameOver,
}

/// Score and level state for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Fractional while playing; floored when stored
    pub score: f64,
    pub level: u32,
    /// Scales obstacle and power-up fall speed
    pub speed_multiplier: f32,
    /// Score at which the current level ends
    pub next_level_score: f64,
    pub phase: Phase,
    /// Index into [`TRIVIA`] of the fact for the latest level-up
    pub trivia_index: Option<usize>,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

impl Progression {
    pub fn new() -> Self {
        Self {
            score: 0.0,
            level: 1,
            speed_multiplier: 1.0,
            next_level_score: ThresholdPolicy::default().threshold(1),
            phase: Phase::Start,
            trivia_index: None,
        }
    }

    /// Reset to level 1 and enter `Playing`
    pub fn begin(&mut self, policy: &ThresholdPolicy) {
        *self = Self {
            next_level_score: policy.threshold(1),
            phase: Phase::Playing,
            ..Self::new()
        };
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Add points while playing. Negative or non-finite amounts are ignored.
    pub fn accrue(&mut self, points: f64) {
        if self.is_playing() && points.is_finite() && points > 0.0 {
            self.score += points;
        }
    }

    /// Enter `LevelUp` if the score has reached the current threshold.
    ///
    /// Returns the new level. At most one level is gained per call.
    pub fn check_level_up(&mut self, policy: &ThresholdPolicy, speed_step: f32) -> Option<u32> {
        if !self.is_playing() || self.score < self.next_level_score {
            return None;
        }

        self.level += 1;
        self.speed_multiplier = 1.0 + speed_step * (self.level - 1) as f32;
        self.next_level_score = policy.threshold(self.level);
        self.trivia_index = Some(self.level as usize % TRIVIA.len());
        self.phase = Phase::LevelUp;
        log::info!(
            "Level up: {} (score {:.0}, next at {:.0})",
            self.level,
            self.score,
            self.next_level_score
        );
        Some(self.level)
    }

    /// `LevelUp -> Playing`. Score and level are kept.
    pub fn acknowledge_level_up(&mut self) -> bool {
        if self.phase != Phase::LevelUp {
            return false;
        }
        self.phase = Phase::Playing;
        true
    }

    /// `Playing <-> Paused`. Returns the new phase, or `None` if ignored.
    pub fn toggle_pause(&mut self) -> Option<Phase> {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            _ => return None,
        };
        Some(self.phase)
    }

    /// Enter `GameOver` and return the stored score
    pub fn end(&mut self) -> u64 {
        self.phase = Phase::GameOver;
        let score = self.final_score();
        log::info!("Game over at level {} with {}", self.level, score);
        score
    }

    pub fn final_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    pub fn trivia(&self) -> Option<&'static str> {
        self.trivia_index.map(|i| TRIVIA[i % TRIVIA.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing() -> Progression {
        let mut p = Progression::new();
        p.begin(&ThresholdPolicy::default());
        p
    }

    #[test]
    fn test_begin_resets() {
        let mut p = playing();
        p.score = 420.0;
        p.level = 5;
        p.speed_multiplier = 1.4;
        p.begin(&ThresholdPolicy::Additive { step: 150.0 });
        assert_eq!(p.score, 0.0);
        assert_eq!(p.level, 1);
        assert_eq!(p.speed_multiplier, 1.0);
        assert_eq!(p.next_level_score, 150.0);
        assert_eq!(p.phase, Phase::Playing);
    }

    #[test]
    fn test_level_up_and_continue() {
        let policy = ThresholdPolicy::default();
        let mut p = playing();
        p.accrue(99.5);
        assert_eq!(p.check_level_up(&policy, 0.1), None);
        p.accrue(0.5);
        assert_eq!(p.check_level_up(&policy, 0.1), Some(2));
        assert_eq!(p.phase, Phase::LevelUp);
        assert!((p.speed_multiplier - 1.1).abs() < 1e-6);
        assert_eq!(p.next_level_score, 200.0);
        assert_eq!(p.trivia(), Some(TRIVIA[2]));

        // No accrual during the interstitial
        p.accrue(50.0);
        assert!((p.score - 100.0).abs() < 1e-9);

        assert!(p.acknowledge_level_up());
        assert_eq!(p.phase, Phase::Playing);
        assert!((p.score - 100.0).abs() < 1e-9);
        assert!(!p.acknowledge_level_up());
    }

    #[test]
    fn test_trivia_wraps() {
        let policy = ThresholdPolicy::Additive { step: 1.0 };
        let mut p = Progression::new();
        p.begin(&policy);
        for _ in 0..10 {
            p.accrue(1.0);
            p.check_level_up(&policy, 0.1);
            p.acknowledge_level_up();
        }
        assert_eq!(p.level, 11);
        assert_eq!(p.trivia_index, Some(11 % TRIVIA.len()));
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut p = Progression::new();
        assert_eq!(p.toggle_pause(), None);
        p.begin(&ThresholdPolicy::default());
        assert_eq!(p.toggle_pause(), Some(Phase::Paused));
        p.accrue(10.0);
        assert_eq!(p.score, 0.0);
        assert_eq!(p.toggle_pause(), Some(Phase::Playing));
        p.end();
        assert_eq!(p.toggle_pause(), None);
        assert_eq!(p.phase, Phase::GameOver);
    }

    #[test]
    fn test_final_score_floors() {
        let mut p = playing();
        p.accrue(237.96);
        assert_eq!(p.end(), 237);
        assert_eq!(p.phase, Phase::GameOver);
    }

    proptest! {
        #[test]
        fn prop_level_up_fires_once_per_threshold(
            steps in proptest::collection::vec(0.01f64..5.0, 1..400),
        ) {
            let policy = ThresholdPolicy::default();
            let mut p = playing();
            let mut fired = 0;
            let mut last = p.score;
            for step in steps {
                p.accrue(step);
                prop_assert!(p.score >= last);
                last = p.score;
                if let Some(level) = p.check_level_up(&policy, 0.1) {
                    fired += 1;
                    prop_assert_eq!(level, fired + 1);
                    prop_assert!(p.score >= policy.threshold(level - 1));
                    p.acknowledge_level_up();
                }
            }
            prop_assert_eq!(p.level, fired + 1);
            prop_assert!(p.score < p.next_level_score);
        }
    }
}
