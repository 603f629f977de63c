//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Randomness only through an injected [`RandomSource`]
//! - Stable iteration order (entities kept in spawn order)
//! - No rendering, storage or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod progression;
pub mod rng;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Circle, Rect, circle_overlaps_rect, land_on_platform, player_hits};
pub use progression::{Phase, Progression, TRIVIA};
pub use rng::{RandomSource, SequenceRandom};
pub use spawn::{SpawnDecision, SpawnPolicy, SpawnSequence};
pub use state::{Entity, EntityKind, GameEvent, GameSession, Player, PowerUpKind, Viewport};
pub use tick::{TickInput, tick};
