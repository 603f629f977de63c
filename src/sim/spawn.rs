//! Spawn policy for falling obstacles and power-ups
//!
//! Chances are tuned per 60 Hz reference frame. A tick of length `dt` uses
//! `1 - (1 - p)^(dt * 60)` so the spawn rate per second does not depend on
//! the tick length.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::state::PowerUpKind;
use crate::consts::REFERENCE_FPS;
use crate::tuning::SpawnTuning;

/// A new obstacle: left edge, side length and fall speed (px/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpawn {
    pub x: f32,
    pub size: f32,
    pub speed: f32,
}

/// A new power-up: left edge, kind and fall speed (px/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpawn {
    pub x: f32,
    pub kind: PowerUpKind,
    pub speed: f32,
}

/// Outcome of one spawn roll. The two draws are independent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnDecision {
    pub obstacle: Option<ObstacleSpawn>,
    pub power_up: Option<PowerUpSpawn>,
}

impl SpawnDecision {
    pub fn is_empty(&self) -> bool {
        self.obstacle.is_none() && self.power_up.is_none()
    }
}

/// Scale a per-reference-frame probability to a tick of `dt` seconds
pub fn frame_chance(p: f32, dt: f32) -> f32 {
    if p <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - p).powf(dt * REFERENCE_FPS)
}

/// Pure spawn rules
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnPolicy {
    pub tuning: SpawnTuning,
}

impl SpawnPolicy {
    pub fn new(tuning: SpawnTuning) -> Self {
        Self { tuning }
    }

    /// Per-reference-frame obstacle probability at `level` (non-decreasing, capped)
    pub fn obstacle_chance(&self, level: u32) -> f32 {
        let t = &self.tuning;
        let extra = t.obstacle_chance_per_level * level.saturating_sub(1) as f32;
        (t.obstacle_base_chance + extra).min(t.obstacle_max_chance)
    }

    /// Roll for this tick
    pub fn decide(
        &self,
        level: u32,
        speed_multiplier: f32,
        width: f32,
        dt: f32,
        rng: &mut dyn RandomSource,
    ) -> SpawnDecision {
        let t = &self.tuning;
        let mut decision = SpawnDecision::default();

        if rng.chance(frame_chance(self.obstacle_chance(level), dt)) {
            let size = rng.range(t.obstacle_min_size, t.obstacle_max_size);
            let x = rng.range(0.0, (width - size).max(0.0));
            let speed = rng.range(t.obstacle_min_speed, t.obstacle_max_speed) * speed_multiplier;
            decision.obstacle = Some(ObstacleSpawn { x, size, speed });
        }

        if rng.chance(frame_chance(t.power_up_chance, dt)) {
            let x = rng.range(0.0, (width - t.power_up_size).max(0.0));
            let kind = PowerUpKind::ALL[rng.index(PowerUpKind::ALL.len())];
            decision.power_up = Some(PowerUpSpawn {
                x,
                kind,
                speed: t.power_up_speed * speed_multiplier,
            });
        }

        decision
    }

    /// Endless stream of decisions for fixed conditions
    pub fn sequence<R: RandomSource + Clone>(
        self,
        level: u32,
        speed_multiplier: f32,
        width: f32,
        dt: f32,
        rng: R,
    ) -> SpawnSequence<R> {
        SpawnSequence {
            policy: self,
            level,
            speed_multiplier,
            width,
            dt,
            initial: rng.clone(),
            rng,
        }
    }
}

/// Lazy, infinite iterator of [`SpawnDecision`]s.
///
/// [`restart`](SpawnSequence::restart) rewinds to the random source it was
/// created with, so the same decisions are produced again.
#[derive(Debug, Clone)]
pub struct SpawnSequence<R> {
    policy: SpawnPolicy,
    level: u32,
    speed_multiplier: f32,
    width: f32,
    dt: f32,
    initial: R,
    rng: R,
}

impl<R: RandomSource + Clone> SpawnSequence<R> {
    pub fn restart(&mut self) {
        self.rng = self.initial.clone();
    }
}

impl<R: RandomSource + Clone> Iterator for SpawnSequence<R> {
    type Item = SpawnDecision;

    fn next(&mut self) -> Option<SpawnDecision> {
        Some(self.policy.decide(
            self.level,
            self.speed_multiplier,
            self.width,
            self.dt,
            &mut self.rng,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::rng::SequenceRandom;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_obstacle_chance_grows_and_caps() {
        let policy = SpawnPolicy::default();
        assert!((policy.obstacle_chance(1) - 0.04).abs() < 1e-6);
        assert!((policy.obstacle_chance(2) - 0.045).abs() < 1e-6);
        let mut last = 0.0;
        for level in 1..100 {
            let p = policy.obstacle_chance(level);
            assert!(p >= last);
            assert!(p <= 0.12 + 1e-6);
            last = p;
        }
        assert!((policy.obstacle_chance(50) - 0.12).abs() < 1e-6);
    }

    #[test]
    fn test_frame_chance_budget() {
        assert!((frame_chance(0.04, SIM_DT) - 0.04).abs() < 1e-5);
        // Two reference frames in one tick
        let two = frame_chance(0.04, 2.0 * SIM_DT);
        assert!((two - (1.0 - 0.96f32 * 0.96)).abs() < 1e-5);
        assert_eq!(frame_chance(0.04, 0.0), 0.0);
        assert_eq!(frame_chance(1.0, SIM_DT), 1.0);
    }

    #[test]
    fn test_scripted_decision() {
        // obstacle roll, size, x, speed, power-up roll, x, kind
        let mut rng = SequenceRandom::new(vec![0.0, 0.5, 0.5, 0.5, 0.0, 0.25, 0.9]);
        let d = SpawnPolicy::default().decide(1, 1.5, 400.0, SIM_DT, &mut rng);
        let o = d.obstacle.unwrap();
        assert_eq!(o.size, 40.0);
        assert_eq!(o.x, 180.0);
        assert_eq!(o.speed, 270.0 * 1.5);
        let p = d.power_up.unwrap();
        assert_eq!(p.x, 92.5);
        assert_eq!(p.kind, PowerUpKind::SlowTime);
        assert_eq!(p.speed, 225.0);
    }

    #[test]
    fn test_nothing_spawns_on_high_rolls() {
        let mut rng = SequenceRandom::constant(0.99);
        let d = SpawnPolicy::default().decide(10, 2.0, 400.0, SIM_DT, &mut rng);
        assert!(d.is_empty());
    }

    #[test]
    fn test_spawns_stay_in_bounds() {
        let policy = SpawnPolicy::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..5000 {
            let d = policy.decide(3, 1.2, 320.0, SIM_DT, &mut rng);
            if let Some(o) = d.obstacle {
                assert!((30.0..50.0).contains(&o.size));
                assert!(o.x >= 0.0 && o.x + o.size <= 320.0);
                assert!(o.speed >= 210.0 * 1.2 && o.speed < 330.0 * 1.2);
            }
            if let Some(p) = d.power_up {
                assert!(p.x >= 0.0 && p.x + 30.0 <= 320.0);
            }
        }
    }

    #[test]
    fn test_sequence_restarts() {
        let seq = SpawnPolicy::default().sequence(5, 1.4, 400.0, SIM_DT, Pcg32::seed_from_u64(11));
        let mut seq = seq;
        let first: Vec<_> = seq.by_ref().take(500).collect();
        seq.restart();
        let again: Vec<_> = seq.by_ref().take(500).collect();
        assert_eq!(first, again);
        assert!(first.iter().any(|d| d.obstacle.is_some()));
    }
}
