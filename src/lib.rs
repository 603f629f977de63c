//! Seamless Dash - a dodge/jump arcade mini-game core
//!
//! Core modules:
//! - `sim`: Simulation (entities, spawn policy, collisions, progression, tick)
//! - `renderer`: Render step producing backend-agnostic draw commands
//! - `app`: Headless driver gluing the simulation to the stores
//! - `highscores` / `session`: Local persistence of scores and the remembered player
//! - `platform`: Browser/native storage and clock
//! - `tuning`: Data-driven game balance

pub mod app;
pub mod highscores;
pub mod identity;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use app::{Frame, Game, RunResult};
pub use highscores::{HighScores, ScoreRecord, ScoreStore};
pub use identity::{Identity, IdentityError};
pub use session::{SessionRecord, SessionStore};
pub use settings::{QualityPreset, Settings};
pub use tuning::{GameVariant, HitShape, ScoreScope, ThresholdPolicy, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (the 60 Hz reference frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Reference frame rate that per-frame rates are expressed against
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta a single tick will integrate
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default logical surface size
    pub const DEFAULT_WIDTH: f32 = 400.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;

    /// Dodge avatar (square) and its distance from the bottom edge
    pub const DODGE_PLAYER_SIZE: f32 = 80.0;
    pub const DODGE_PLAYER_BOTTOM_OFFSET: f32 = 130.0;
    /// Obstacles and power-ups appear this far above the top edge
    pub const SPAWN_Y: f32 = -50.0;

    /// Jump avatar (square) and its start distance from the bottom edge
    pub const JUMP_PLAYER_SIZE: f32 = 50.0;
    pub const JUMP_PLAYER_BOTTOM_OFFSET: f32 = 150.0;
    /// Downward acceleration (px/s²)
    pub const GRAVITY: f32 = 1440.0;
    /// Vertical velocity after landing on a platform (px/s, negative is up)
    pub const JUMP_IMPULSE: f32 = -720.0;
    /// Horizontal speed while a side of the screen is pressed (px/s)
    pub const STEER_SPEED: f32 = 420.0;
    pub const PLATFORM_WIDTH: f32 = 80.0;
    pub const PLATFORM_HEIGHT: f32 = 30.0;
    pub const PLATFORM_SPACING: f32 = 120.0;
    /// Platforms generated above the starter platform
    pub const PLATFORM_COUNT: usize = 6;

    /// Particles in a shield-break spark burst
    pub const SPARK_COUNT: usize = 12;
    /// Alpha lost per second by sparks
    pub const SPARK_FADE: f32 = 1.5;
    /// Particles in the level-up confetti burst
    pub const CONFETTI_COUNT: usize = 80;
}
