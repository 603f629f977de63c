//! Collision detection
//!
//! Every test is strict: shapes that merely touch along an edge do not
//! collide. The player's hit box can be shrunk by a forgiveness padding so an
//! obstacle has to visibly bite into the sprite before it counts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Entity, Player};
use crate::tuning::HitShape;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Rectangle with top-left corner `pos` and extent `size`
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink every side by `padding`. Over-padding collapses to the center.
    pub fn inset(&self, padding: f32) -> Self {
        let center = self.center();
        let half = ((self.max - self.min) * 0.5 - Vec2::splat(padding)).max(Vec2::ZERO);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap on both axes
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Closest point inside the rectangle to `p`
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

/// Strict circle/rectangle overlap (tangent contact is a miss)
pub fn circle_overlaps_rect(circle: &Circle, rect: &Rect) -> bool {
    let closest = rect.clamp_point(circle.center);
    circle.center.distance_squared(closest) < circle.radius * circle.radius
}

/// Whether `entity` touches the player's (padded) hit box
pub fn player_hits(player: &Player, entity: &Entity, shape: HitShape, padding: f32) -> bool {
    let hit_box = player.bounds().inset(padding);
    match shape {
        HitShape::Rect => hit_box.overlaps(&entity.bounds()),
        HitShape::Circle => circle_overlaps_rect(&entity.circle(), &hit_box),
    }
}

/// One-way platform landing for the jump game.
///
/// Registers only while the player is falling, the horizontal spans overlap
/// and the player's feet are inside the platform's top band. On success the
/// player is snapped onto the platform and bounced with `impulse`.
pub fn land_on_platform(player: &mut Player, platform: &Entity, impulse: f32) -> bool {
    if player.vel.y <= 0.0 {
        return false;
    }

    let p = player.bounds();
    let top = platform.bounds();
    let feet = p.max.y;
    let landed = p.min.x < top.max.x && top.min.x < p.max.x && feet > top.min.y && feet < top.max.y;

    if landed {
        player.pos.y = top.min.y - player.size.y;
        player.vel.y = impulse;
    }
    landed
}
