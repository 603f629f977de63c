//! Colors

use super::commands::Color;
use crate::settings::Settings;

/// `0xRRGGBB` plus alpha to a color
pub const fn hex(rgb: u32, alpha: f32) -> Color {
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
        alpha,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    /// Drawn instead of the player sprite until it loads
    pub player_fallback: Color,
    pub platform_fallback: Color,
    pub obstacle: Color,
    pub shield: Color,
    pub shield_pickup: Color,
    pub slow_time_pickup: Color,
    /// Full-screen tint while slow-time runs
    pub slow_time_tint: Color,
    pub text: Color,
    pub overlay: Color,
}

impl Palette {
    pub const STANDARD: Palette = Palette {
        background: hex(0xFFF8E7, 1.0),
        player_fallback: hex(0xFFC107, 1.0),
        platform_fallback: hex(0x2E7D32, 1.0),
        obstacle: hex(0xD32F2F, 1.0),
        shield: hex(0x29B6F6, 0.8),
        shield_pickup: hex(0x29B6F6, 1.0),
        slow_time_pickup: hex(0x7E57C2, 1.0),
        slow_time_tint: hex(0x7E57C2, 0.12),
        text: hex(0xA01018, 1.0),
        overlay: hex(0x000000, 0.6),
    };

    pub const HIGH_CONTRAST: Palette = Palette {
        background: hex(0x000000, 1.0),
        player_fallback: hex(0xFFFF00, 1.0),
        platform_fallback: hex(0x00FF00, 1.0),
        obstacle: hex(0xFF0000, 1.0),
        shield: hex(0x00FFFF, 1.0),
        shield_pickup: hex(0x00FFFF, 1.0),
        slow_time_pickup: hex(0xFF00FF, 1.0),
        slow_time_tint: hex(0xFF00FF, 0.2),
        text: hex(0xFFFFFF, 1.0),
        overlay: hex(0x000000, 0.8),
    };

    pub fn for_settings(settings: &Settings) -> &'static Palette {
        if settings.high_contrast {
            &Self::HIGH_CONTRAST
        } else {
            &Self::STANDARD
        }
    }
}
