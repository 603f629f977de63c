//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameSession`]; the driver owns it and
//! lends it to [`tick`](super::tick::tick) once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Circle, Rect};
use super::progression::{Phase, Progression};
use super::rng::RandomSource;
use crate::consts::*;
use crate::identity::Identity;
use crate::settings::Settings;
use crate::tuning::{GameVariant, Tuning};

/// Drawing surface size in pixels. Re-sent by the host on every resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

/// The player's avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Only the jump game integrates velocity
    pub vel: Vec2,
    /// Seconds of shield left (0 = no shield)
    pub shield_remaining: f32,
    /// Seconds of slow-time left (0 = inactive)
    pub slow_time_remaining: f32,
}

/// Timers at or below this count as expired
const TIMER_EPSILON: f32 = 1e-4;

impl Player {
    /// Dodge avatar at bottom-center
    pub fn dodge(viewport: &Viewport) -> Self {
        Self {
            pos: Vec2::new(
                viewport.width / 2.0 - DODGE_PLAYER_SIZE / 2.0,
                viewport.height - DODGE_PLAYER_BOTTOM_OFFSET,
            ),
            size: Vec2::splat(DODGE_PLAYER_SIZE),
            vel: Vec2::ZERO,
            shield_remaining: 0.0,
            slow_time_remaining: 0.0,
        }
    }

    /// Jump avatar above the starter platform
    pub fn jump(viewport: &Viewport) -> Self {
        Self {
            pos: Vec2::new(
                viewport.width / 2.0 - JUMP_PLAYER_SIZE / 2.0,
                viewport.height - JUMP_PLAYER_BOTTOM_OFFSET,
            ),
            size: Vec2::splat(JUMP_PLAYER_SIZE),
            ..Self::dodge(viewport)
        }
    }

    pub fn for_variant(variant: GameVariant, viewport: &Viewport) -> Self {
        match variant {
            GameVariant::Dodge => Self::dodge(viewport),
            GameVariant::Jump => Self::jump(viewport),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn shield_active(&self) -> bool {
        self.shield_remaining > 0.0
    }

    pub fn slow_time_active(&self) -> bool {
        self.slow_time_remaining > 0.0
    }

    /// Center the avatar on pointer `x`, clamped to the playable width
    pub fn move_to(&mut self, x: f32, viewport: &Viewport) {
        self.pos.x = x - self.size.x / 2.0;
        self.clamp_to(viewport);
    }

    /// Keep x within `[0, width - player_width]`
    pub fn clamp_to(&mut self, viewport: &Viewport) {
        let max_x = (viewport.width - self.size.x).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    /// Leaving one side re-enters from the other
    pub fn wrap_horizontally(&mut self, viewport: &Viewport) {
        if self.pos.x + self.size.x < 0.0 {
            self.pos.x = viewport.width;
        } else if self.pos.x > viewport.width {
            self.pos.x = -self.size.x;
        }
    }

    /// Count down buff timers. Returns `(shield_expired, slow_time_expired)`.
    pub fn tick_effects(&mut self, dt: f32) -> (bool, bool) {
        fn countdown(timer: &mut f32, dt: f32) -> bool {
            if *timer <= 0.0 {
                return false;
            }
            *timer -= dt;
            if *timer <= TIMER_EPSILON {
                *timer = 0.0;
                return true;
            }
            false
        }

        (
            countdown(&mut self.shield_remaining, dt),
            countdown(&mut self.slow_time_remaining, dt),
        )
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Obstacle hits shatter the obstacle instead of ending the run
    Shield,
    /// Obstacles fall slower
    SlowTime,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::Shield, PowerUpKind::SlowTime];

    /// Glyph drawn on the pickup
    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "S",
            PowerUpKind::SlowTime => "T",
        }
    }
}

/// What an [`Entity`] is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    PowerUp(PowerUpKind),
    /// Cosmetic only; `looping` particles (confetti) wrap instead of fading
    Particle {
        color: u32,
        alpha: f32,
        fade: f32,
        looping: bool,
    },
    /// Jump game landing surface; `variant` picks the sprite
    Platform { variant: u8 },
}

/// Anything that moves on the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// px/s
    pub vel: Vec2,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, size: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            size,
            vel,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Circle inscribed in the bounding box
    pub fn circle(&self) -> Circle {
        Circle {
            center: self.center(),
            radius: self.size.min_element() / 2.0,
        }
    }

    /// Integrate position, with velocity scaled by `speed_scale`
    pub fn advance(&mut self, dt: f32, speed_scale: f32) {
        self.pos += self.vel * speed_scale * dt;
    }

    /// Entirely below the bottom edge
    pub fn is_below(&self, viewport: &Viewport) -> bool {
        self.pos.y > viewport.height
    }
}

/// Things that happened during a tick, for HUD/audio/persistence hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started { variant: GameVariant },
    LevelUp { level: u32, trivia: usize },
    LevelContinued { level: u32 },
    Paused,
    Resumed,
    PowerUpCollected(PowerUpKind),
    ShieldExpired,
    SlowTimeExpired,
    ObstacleShattered { id: u32 },
    Landed { platform: u32 },
    GameOver { score: u64 },
    Resized(Viewport),
}

/// Palette used for level-up confetti
const CONFETTI_COLORS: [u32; 4] = [0xFFC107, 0xD32F2F, 0xA01018, 0x00C853];
/// Palette used for shield-break sparks
const SPARK_COLORS: [u32; 2] = [0xD32F2F, 0xFFC107];

/// Complete state of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub tuning: Tuning,
    pub settings: Settings,
    pub viewport: Viewport,
    /// Who is playing (None before the first submission)
    pub identity: Option<Identity>,
    pub progression: Progression,
    pub player: Player,
    /// Entity collections, each kept in spawn order
    pub obstacles: Vec<Entity>,
    pub power_ups: Vec<Entity>,
    pub particles: Vec<Entity>,
    pub platforms: Vec<Entity>,
    /// Seconds spent in the Playing phase this run
    pub elapsed: f64,
    /// Next entity ID
    next_id: u32,
}

impl GameSession {
    /// A session waiting on the identity form
    pub fn new(tuning: Tuning, settings: Settings, viewport: Viewport) -> Self {
        let player = Player::for_variant(tuning.variant, &viewport);
        Self {
            tuning,
            settings,
            viewport,
            identity: None,
            progression: Progression::new(),
            player,
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            platforms: Vec::new(),
            elapsed: 0.0,
            next_id: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.progression.phase
    }

    pub fn variant(&self) -> GameVariant {
        self.tuning.variant
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Begin a run for a validated player (`Start -> Playing`)
    pub fn start(&mut self, identity: Identity, rng: &mut dyn RandomSource) -> GameEvent {
        log::info!("Starting {:?} run for {}", self.tuning.variant, identity.id);
        self.identity = Some(identity);
        self.reset_world(rng);
        self.progression.begin(&self.tuning.threshold);
        GameEvent::Started {
            variant: self.tuning.variant,
        }
    }

    /// Play again as the same player. `None` if nobody has logged in.
    pub fn restart(&mut self, rng: &mut dyn RandomSource) -> Option<GameEvent> {
        let identity = self.identity.clone()?;
        Some(self.start(identity, rng))
    }

    /// Forget the player and go back to the identity form
    pub fn return_to_start(&mut self) {
        self.identity = None;
        self.progression = Progression::new();
        self.clear_entities();
        self.player = Player::for_variant(self.tuning.variant, &self.viewport);
    }

    fn clear_entities(&mut self) {
        self.obstacles.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.platforms.clear();
    }

    fn reset_world(&mut self, rng: &mut dyn RandomSource) {
        self.clear_entities();
        self.elapsed = 0.0;
        self.player = Player::for_variant(self.tuning.variant, &self.viewport);

        if self.tuning.variant == GameVariant::Jump {
            let w = self.viewport.width;
            let h = self.viewport.height;
            let id = self.next_entity_id();
            self.platforms.push(Entity::new(
                id,
                EntityKind::Platform { variant: 1 },
                Vec2::new(w / 2.0 - PLATFORM_WIDTH / 2.0, h - 50.0),
                Vec2::new(PLATFORM_WIDTH, PLATFORM_HEIGHT),
                Vec2::ZERO,
            ));
            for i in 0..PLATFORM_COUNT {
                let y = h - JUMP_PLAYER_BOTTOM_OFFSET - i as f32 * PLATFORM_SPACING;
                self.spawn_platform(y, rng);
            }
        }
    }

    /// Add a platform at height `y` with a random x and sprite
    pub fn spawn_platform(&mut self, y: f32, rng: &mut dyn RandomSource) {
        let x = rng.range(0.0, (self.viewport.width - PLATFORM_WIDTH).max(0.0));
        let variant = if rng.chance(0.5) { 1 } else { 2 };
        let id = self.next_entity_id();
        self.platforms.push(Entity::new(
            id,
            EntityKind::Platform { variant },
            Vec2::new(x, y),
            Vec2::new(PLATFORM_WIDTH, PLATFORM_HEIGHT),
            Vec2::ZERO,
        ));
    }

    /// Adopt new surface dimensions and re-clamp the avatar
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        match self.tuning.variant {
            GameVariant::Dodge => {
                self.player.pos.y = viewport.height - DODGE_PLAYER_BOTTOM_OFFSET;
                self.player.clamp_to(&viewport);
            }
            GameVariant::Jump => self.player.wrap_horizontally(&viewport),
        }
    }

    /// `Playing <-> Paused`; other phases ignore the toggle
    pub fn toggle_pause(&mut self) -> Option<GameEvent> {
        match self.progression.toggle_pause()? {
            Phase::Paused => Some(GameEvent::Paused),
            _ => Some(GameEvent::Resumed),
        }
    }

    /// Dismiss the level-up interstitial (`LevelUp -> Playing`)
    pub fn continue_after_level_up(&mut self) -> Option<GameEvent> {
        if !self.progression.acknowledge_level_up() {
            return None;
        }
        self.particles.retain(|p| {
            !matches!(p.kind, EntityKind::Particle { looping: true, .. })
        });
        Some(GameEvent::LevelContinued {
            level: self.progression.level,
        })
    }

    /// Add a particle, evicting the oldest once the settings cap is reached
    pub fn push_particle(&mut self, particle: Entity) {
        let cap = self.settings.max_particles();
        if cap == 0 {
            return;
        }
        while self.particles.len() >= cap {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Burst of fading sparks from `center`
    pub fn spawn_sparks(&mut self, center: Vec2, rng: &mut dyn RandomSource) {
        if self.settings.max_particles() == 0 {
            return;
        }
        for _ in 0..SPARK_COUNT {
            let angle = rng.range(0.0, std::f32::consts::TAU);
            let speed = rng.range(60.0, 180.0);
            let size = rng.range(3.0, 7.0);
            let color = SPARK_COLORS[rng.index(SPARK_COLORS.len())];
            let id = self.next_entity_id();
            self.push_particle(Entity::new(
                id,
                EntityKind::Particle {
                    color,
                    alpha: 1.0,
                    fade: SPARK_FADE,
                    looping: false,
                },
                center - Vec2::splat(size / 2.0),
                Vec2::splat(size),
                Vec2::new(angle.cos(), angle.sin()) * speed,
            ));
        }
    }

    /// Looping confetti that rains over the level-up interstitial
    pub fn spawn_confetti(&mut self, rng: &mut dyn RandomSource) {
        if !self.settings.confetti_enabled() {
            return;
        }
        let count = CONFETTI_COUNT.min(self.settings.max_particles());
        for _ in 0..count {
            let x = rng.range(0.0, self.viewport.width);
            let y = rng.range(-self.viewport.height, 0.0);
            let size = rng.range(4.0, 10.0);
            let speed = rng.range(120.0, 360.0);
            let color = CONFETTI_COLORS[rng.index(CONFETTI_COLORS.len())];
            let id = self.next_entity_id();
            self.push_particle(Entity::new(
                id,
                EntityKind::Particle {
                    color,
                    alpha: 1.0,
                    fade: 0.0,
                    looping: true,
                },
                Vec2::new(x, y),
                Vec2::splat(size),
                Vec2::new(0.0, speed),
            ));
        }
    }
}
