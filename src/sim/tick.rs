//! Simulation tick
//!
//! Advances a [`GameSession`] by one frame. The order inside a tick is fixed:
//! viewport, pause/continue, score and timers, level-up, player, spawn,
//! obstacles and power-ups (platforms in the jump game), particles.

use glam::Vec2;

use super::autopilot;
use super::collision::{land_on_platform, player_hits};
use super::progression::Phase;
use super::rng::RandomSource;
use super::spawn::{SpawnDecision, SpawnPolicy};
use super::state::{Entity, EntityKind, GameEvent, GameSession, PowerUpKind, Viewport};
use crate::consts::*;
use crate::tuning::GameVariant;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Pointer x in surface pixels; the dodge avatar centers on it
    pub pointer_x: Option<f32>,
    /// Press at x; the jump avatar steers toward that half of the screen
    pub press_x: Option<f32>,
    /// Press released; the jump avatar stops steering
    pub release: bool,
    /// Pause toggle
    pub pause: bool,
    /// Dismiss the level-up interstitial
    pub continue_level: bool,
    /// New surface size after a host resize
    pub viewport: Option<Viewport>,
    /// Demo mode, the avatar steers itself
    pub autopilot: bool,
}

/// Advance the session by `dt` seconds (clamped to [`MAX_FRAME_DT`])
pub fn tick(
    session: &mut GameSession,
    input: &TickInput,
    dt: f32,
    rng: &mut dyn RandomSource,
) -> Vec<GameEvent> {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    let mut events = Vec::new();

    if let Some(viewport) = input.viewport {
        if viewport != session.viewport {
            session.set_viewport(viewport);
            events.push(GameEvent::Resized(viewport));
        }
    }

    if input.pause {
        events.extend(session.toggle_pause());
    }
    if input.continue_level {
        events.extend(session.continue_after_level_up());
    }

    // Nothing moves outside Playing/LevelUp
    match session.phase() {
        Phase::Start | Phase::Paused | Phase::GameOver => return events,
        Phase::Playing | Phase::LevelUp => {}
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot::steer(session, &mut input);
    }
    let input = &input;

    if session.phase() == Phase::LevelUp {
        if session.variant() == GameVariant::Dodge {
            apply_pointer(session, input);
        }
        update_particles(session, dt);
        return events;
    }

    session.elapsed += dt as f64;
    if session.variant() == GameVariant::Dodge {
        let points = session.tuning.score_per_second * dt as f64;
        session.progression.accrue(points);
    }

    let (shield_expired, slow_expired) = session.player.tick_effects(dt);
    if shield_expired {
        log::debug!("Shield expired");
        events.push(GameEvent::ShieldExpired);
    }
    if slow_expired {
        events.push(GameEvent::SlowTimeExpired);
    }

    let tuning = &session.tuning;
    if let Some(level) = session
        .progression
        .check_level_up(&tuning.threshold, tuning.speed_step)
    {
        session.spawn_confetti(rng);
        events.push(GameEvent::LevelUp {
            level,
            trivia: session.progression.trivia_index.unwrap_or(0),
        });
        return events;
    }

    match session.variant() {
        GameVariant::Dodge => tick_dodge(session, input, dt, rng, &mut events),
        GameVariant::Jump => tick_jump(session, input, dt, rng, &mut events),
    }

    update_particles(session, dt);
    events
}

fn apply_pointer(session: &mut GameSession, input: &TickInput) {
    if let Some(x) = input.pointer_x {
        let viewport = session.viewport;
        session.player.move_to(x, &viewport);
    }
}

fn tick_dodge(
    session: &mut GameSession,
    input: &TickInput,
    dt: f32,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) {
    apply_pointer(session, input);

    let policy = SpawnPolicy::new(session.tuning.spawn);
    let decision = policy.decide(
        session.progression.level,
        session.progression.speed_multiplier,
        session.viewport.width,
        dt,
        rng,
    );
    spawn_falling(session, decision);

    let fall_scale = if session.player.slow_time_active() {
        session.tuning.slow_time_factor
    } else {
        1.0
    };
    let shape = session.tuning.hit_shape;
    let padding = session.tuning.hit_padding;
    let viewport = session.viewport;

    // Obstacles
    let mut shattered = Vec::new();
    let mut hit = false;
    for obstacle in &mut session.obstacles {
        obstacle.advance(dt, fall_scale);
    }
    for obstacle in &session.obstacles {
        if !player_hits(&session.player, obstacle, shape, padding) {
            continue;
        }
        if session.player.shield_active() {
            shattered.push((obstacle.id, obstacle.center()));
        } else {
            hit = true;
            break;
        }
    }

    if hit {
        let score = session.progression.end();
        events.push(GameEvent::GameOver { score });
        return;
    }

    for (id, center) in shattered {
        session.obstacles.retain(|o| o.id != id);
        session.spawn_sparks(center, rng);
        log::debug!("Shield shattered obstacle {id}");
        events.push(GameEvent::ObstacleShattered { id });
    }
    session.obstacles.retain(|o| !o.is_below(&viewport));

    // Power-ups
    for power_up in &mut session.power_ups {
        power_up.advance(dt, 1.0);
    }
    let mut collected = Vec::new();
    session.power_ups.retain(|p| {
        if player_hits(&session.player, p, shape, padding) {
            if let EntityKind::PowerUp(kind) = p.kind {
                collected.push(kind);
            }
            return false;
        }
        !p.is_below(&viewport)
    });
    for kind in collected {
        match kind {
            PowerUpKind::Shield => {
                session.player.shield_remaining = session.tuning.shield_seconds;
            }
            PowerUpKind::SlowTime => {
                session.player.slow_time_remaining = session.tuning.slow_time_seconds;
            }
        }
        log::debug!("Collected {kind:?}");
        events.push(GameEvent::PowerUpCollected(kind));
    }
}

fn spawn_falling(session: &mut GameSession, decision: SpawnDecision) {
    if let Some(o) = decision.obstacle {
        let id = session.next_entity_id();
        log::debug!("Spawn obstacle {id} at x={:.0} size={:.0}", o.x, o.size);
        session.obstacles.push(Entity::new(
            id,
            EntityKind::Obstacle,
            Vec2::new(o.x, SPAWN_Y),
            Vec2::splat(o.size),
            Vec2::new(0.0, o.speed),
        ));
    }
    if let Some(p) = decision.power_up {
        let id = session.next_entity_id();
        log::debug!("Spawn {:?} power-up {id}", p.kind);
        session.power_ups.push(Entity::new(
            id,
            EntityKind::PowerUp(p.kind),
            Vec2::new(p.x, SPAWN_Y),
            Vec2::splat(session.tuning.spawn.power_up_size),
            Vec2::new(0.0, p.speed),
        ));
    }
}

fn tick_jump(
    session: &mut GameSession,
    input: &TickInput,
    dt: f32,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) {
    let viewport = session.viewport;
    let player = &mut session.player;

    if let Some(x) = input.press_x {
        player.vel.x = if x < viewport.width / 2.0 {
            -STEER_SPEED
        } else {
            STEER_SPEED
        };
    }
    if input.release {
        player.vel.x = 0.0;
    }

    player.vel.y += GRAVITY * dt;
    player.pos += player.vel * dt;
    player.wrap_horizontally(&viewport);

    for platform in &session.platforms {
        if land_on_platform(&mut session.player, platform, JUMP_IMPULSE) {
            events.push(GameEvent::Landed {
                platform: platform.id,
            });
            break;
        }
    }

    // Scroll the world down while the player is in the upper half
    let midline = viewport.height / 2.0;
    if session.player.pos.y < midline {
        let shift = midline - session.player.pos.y;
        session.player.pos.y = midline;
        let points = session.tuning.scroll_score_per_second * dt as f64;
        session.progression.accrue(points);

        let max_x = (viewport.width - PLATFORM_WIDTH).max(0.0);
        for platform in &mut session.platforms {
            platform.pos.y += shift;
            if platform.pos.y > viewport.height {
                platform.pos.y = 0.0;
                platform.pos.x = rng.range(0.0, max_x);
            }
        }
    }

    if session.player.pos.y > viewport.height {
        let score = session.progression.end();
        events.push(GameEvent::GameOver { score });
    }
}

/// Move particles. Sparks fade out; confetti loops back to the top.
fn update_particles(session: &mut GameSession, dt: f32) {
    let height = session.viewport.height;
    for particle in &mut session.particles {
        particle.advance(dt, 1.0);
        if let EntityKind::Particle {
            alpha,
            fade,
            looping,
            ..
        } = &mut particle.kind
        {
            if *looping {
                if particle.pos.y > height {
                    particle.pos.y = -particle.size.y;
                }
            } else {
                *alpha -= *fade * dt;
            }
        }
    }
    session.particles.retain(|p| match p.kind {
        EntityKind::Particle { alpha, .. } => alpha > 0.0,
        _ => true,
    });
}
