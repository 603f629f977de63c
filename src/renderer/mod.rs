//! Render step
//!
//! Turns a [`GameSession`] into a flat list of [`RenderCommand`]s for the
//! host to draw (canvas 2D in the browser, nothing in headless runs). Pure:
//! the same session always produces the same commands.

pub mod commands;
pub mod palette;

pub use commands::{AllAssets, AssetCatalog, AssetId, Color, NoAssets, RenderCommand, TextAlign};
pub use palette::{Palette, hex};

use glam::Vec2;

use crate::sim::{Entity, EntityKind, GameSession, Phase, PowerUpKind, Rect};
use crate::tuning::HitShape;

const HUD_SIZE: f32 = 20.0;
const TITLE_SIZE: f32 = 36.0;
const BODY_SIZE: f32 = 16.0;
const HUD_MARGIN: f32 = 12.0;

/// Draw one frame. `best` is the player's stored best score, if known.
pub fn render(
    session: &GameSession,
    assets: &dyn AssetCatalog,
    best: Option<u64>,
) -> Vec<RenderCommand> {
    let palette = Palette::for_settings(&session.settings);
    let mut out = Vec::with_capacity(
        8 + session.obstacles.len()
            + session.power_ups.len()
            + session.platforms.len()
            + session.particles.len(),
    );

    out.push(RenderCommand::Clear(palette.background));
    if session.player.slow_time_active() {
        out.push(RenderCommand::FillRect {
            rect: session.viewport.bounds(),
            color: palette.slow_time_tint,
        });
    }

    if session.phase() == Phase::Start {
        draw_title(session, palette, &mut out);
        return out;
    }

    for platform in &session.platforms {
        if let EntityKind::Platform { variant } = platform.kind {
            sprite_or_fallback(
                AssetId::platform(variant),
                platform.bounds(),
                palette.platform_fallback,
                assets,
                &mut out,
            );
        }
    }

    for obstacle in &session.obstacles {
        draw_obstacle(obstacle, session.tuning.hit_shape, palette, &mut out);
    }

    for power_up in &session.power_ups {
        if let EntityKind::PowerUp(kind) = power_up.kind {
            let circle = power_up.circle();
            let color = match kind {
                PowerUpKind::Shield => palette.shield_pickup,
                PowerUpKind::SlowTime => palette.slow_time_pickup,
            };
            out.push(RenderCommand::FillCircle {
                center: circle.center,
                radius: circle.radius,
                color,
            });
            out.push(RenderCommand::Text {
                text: kind.label().to_string(),
                pos: circle.center,
                size: circle.radius,
                color: palette.background,
                align: TextAlign::Center,
            });
        }
    }

    let player = &session.player;
    sprite_or_fallback(
        AssetId::Player,
        player.bounds(),
        palette.player_fallback,
        assets,
        &mut out,
    );
    if player.shield_active() {
        out.push(RenderCommand::StrokeCircle {
            center: player.center(),
            radius: player.size.max_element() * 0.6,
            width: 4.0,
            color: palette.shield,
        });
    }

    for particle in &session.particles {
        if let EntityKind::Particle { color, alpha, .. } = particle.kind {
            out.push(RenderCommand::FillRect {
                rect: particle.bounds(),
                color: hex(color, alpha.clamp(0.0, 1.0)),
            });
        }
    }

    draw_hud(session, palette, &mut out);

    match session.phase() {
        Phase::LevelUp => draw_level_up(session, palette, &mut out),
        Phase::Paused => draw_banner(session, palette, "Paused", None, &mut out),
        Phase::GameOver => {
            let score = format!("Score: {}", session.progression.final_score());
            let detail = match best {
                Some(best) => format!("{score}  Best: {best}"),
                None => score,
            };
            draw_banner(session, palette, "Game Over", Some(detail), &mut out);
        }
        Phase::Start | Phase::Playing => {}
    }

    out
}

/// Sprite if loaded, otherwise a solid block with the same bounds
fn sprite_or_fallback(
    asset: AssetId,
    rect: Rect,
    fallback: Color,
    assets: &dyn AssetCatalog,
    out: &mut Vec<RenderCommand>,
) {
    if assets.is_ready(asset) {
        out.push(RenderCommand::Sprite { asset, rect });
    } else {
        out.push(RenderCommand::FillRect {
            rect,
            color: fallback,
        });
    }
}

fn draw_obstacle(obstacle: &Entity, shape: HitShape, palette: &Palette, out: &mut Vec<RenderCommand>) {
    match shape {
        HitShape::Rect => out.push(RenderCommand::FillRect {
            rect: obstacle.bounds(),
            color: palette.obstacle,
        }),
        HitShape::Circle => {
            let circle = obstacle.circle();
            out.push(RenderCommand::FillCircle {
                center: circle.center,
                radius: circle.radius,
                color: palette.obstacle,
            });
        }
    }
}

fn text(text: impl Into<String>, pos: Vec2, size: f32, color: Color, align: TextAlign) -> RenderCommand {
    RenderCommand::Text {
        text: text.into(),
        pos,
        size,
        color,
        align,
    }
}

fn draw_hud(session: &GameSession, palette: &Palette, out: &mut Vec<RenderCommand>) {
    let width = session.viewport.width;
    let y = HUD_MARGIN + HUD_SIZE;
    out.push(text(
        format!("Score: {}", session.progression.final_score()),
        Vec2::new(HUD_MARGIN, y),
        HUD_SIZE,
        palette.text,
        TextAlign::Left,
    ));
    out.push(text(
        format!("Level {}", session.progression.level),
        Vec2::new(width - HUD_MARGIN, y),
        HUD_SIZE,
        palette.text,
        TextAlign::Right,
    ));

    let player = &session.player;
    let mut line = y + HUD_SIZE + 4.0;
    if player.shield_active() {
        out.push(text(
            format!("Shield {:.1}s", player.shield_remaining),
            Vec2::new(HUD_MARGIN, line),
            BODY_SIZE,
            palette.shield,
            TextAlign::Left,
        ));
        line += BODY_SIZE + 4.0;
    }
    if player.slow_time_active() {
        out.push(text(
            format!("Slow {:.1}s", player.slow_time_remaining),
            Vec2::new(HUD_MARGIN, line),
            BODY_SIZE,
            palette.slow_time_pickup,
            TextAlign::Left,
        ));
    }
}

fn draw_title(session: &GameSession, palette: &Palette, out: &mut Vec<RenderCommand>) {
    let center = Vec2::new(session.viewport.width / 2.0, session.viewport.height / 2.0);
    out.push(text(
        "Seamless Dash",
        center,
        TITLE_SIZE,
        palette.text,
        TextAlign::Center,
    ));
    out.push(text(
        "Enter your name and employee ID to play",
        center + Vec2::new(0.0, TITLE_SIZE),
        BODY_SIZE,
        palette.text,
        TextAlign::Center,
    ));
}

fn draw_banner(
    session: &GameSession,
    palette: &Palette,
    title: &str,
    detail: Option<String>,
    out: &mut Vec<RenderCommand>,
) {
    let center = Vec2::new(session.viewport.width / 2.0, session.viewport.height / 2.0);
    out.push(RenderCommand::FillRect {
        rect: session.viewport.bounds(),
        color: palette.overlay,
    });
    let fg = hex(0xFFFFFF, 1.0);
    out.push(text(title, center, TITLE_SIZE, fg, TextAlign::Center));
    if let Some(detail) = detail {
        out.push(text(
            detail,
            center + Vec2::new(0.0, TITLE_SIZE),
            BODY_SIZE,
            fg,
            TextAlign::Center,
        ));
    }
}

fn draw_level_up(session: &GameSession, palette: &Palette, out: &mut Vec<RenderCommand>) {
    let title = format!("Level {}!", session.progression.level);
    draw_banner(
        session,
        palette,
        &title,
        session.progression.trivia().map(str::to_string),
        out,
    );
}
