//! Demo mode AI
//!
//! Fills in pointer/press input so the game plays itself. Used by the native
//! binary and by the attract screen.

use super::state::{Entity, GameSession};
use super::tick::TickInput;
use crate::tuning::GameVariant;

/// Candidate positions sampled across the screen
const LANES: usize = 24;
/// Obstacles further than this above the player are ignored (px)
const HORIZON: f32 = 320.0;
/// Extra clearance kept around obstacles (px)
const MARGIN: f32 = 12.0;
/// Jump steering dead zone (px)
const DEAD_ZONE: f32 = 8.0;

/// Overwrite `input` with the autopilot's choice for this tick
pub fn steer(session: &GameSession, input: &mut TickInput) {
    match session.variant() {
        GameVariant::Dodge => {
            input.pointer_x = Some(dodge_target(session));
        }
        GameVariant::Jump => {
            input.press_x = None;
            input.release = false;
            match jump_target(session) {
                Some(x) => {
                    let center = session.player.center().x;
                    if (x - center).abs() <= DEAD_ZONE {
                        input.release = true;
                    } else if x < center {
                        input.press_x = Some(0.0);
                    } else {
                        input.press_x = Some(session.viewport.width);
                    }
                }
                None => input.release = true,
            }
        }
    }
}

/// Danger of standing with the player's center at `x`
fn lane_danger(session: &GameSession, x: f32) -> f32 {
    let player = &session.player;
    let half = player.size.x / 2.0 - session.tuning.hit_padding + MARGIN;
    let (left, right) = (x - half, x + half);
    let top = player.pos.y;

    session
        .obstacles
        .iter()
        .filter(|o| {
            let b = o.bounds();
            b.max.y > top - HORIZON && b.min.y < player.pos.y + player.size.y
        })
        .filter(|o| {
            let b = o.bounds();
            b.min.x < right && left < b.max.x
        })
        .map(|o| {
            // Closer obstacles weigh more
            let gap = (top - o.bounds().max.y).max(0.0);
            1.0 + (HORIZON - gap.min(HORIZON)) / HORIZON * 10.0
        })
        .sum()
}

fn dodge_target(session: &GameSession) -> f32 {
    let width = session.viewport.width;
    let current = session.player.center().x;
    let half = session.player.size.x / 2.0;
    let usable = (width - 2.0 * half).max(0.0);

    let pickup = if session.player.shield_active() {
        None
    } else {
        nearest(&session.power_ups, current).map(|p| p.center().x)
    };

    let mut best = (f32::INFINITY, current);
    for i in 0..=LANES {
        let x = half + usable * i as f32 / LANES as f32;
        let mut cost = lane_danger(session, x) * 1000.0 + (x - current).abs();
        if let Some(px) = pickup {
            cost += (x - px).abs() * 0.5;
        }
        if cost < best.0 {
            best = (cost, x);
        }
    }
    best.1
}

fn nearest(entities: &[Entity], x: f32) -> Option<&Entity> {
    entities.iter().min_by(|a, b| {
        let da = (a.center().x - x).abs();
        let db = (b.center().x - x).abs();
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Center x of the platform to aim for: the highest one below the feet
fn jump_target(session: &GameSession) -> Option<f32> {
    let feet = session.player.pos.y + session.player.size.y;
    session
        .platforms
        .iter()
        .filter(|p| p.pos.y >= feet - 1.0)
        .min_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
        .map(|p| p.center().x)
}
