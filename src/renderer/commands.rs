//! Backend-agnostic draw commands

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::Rect;

/// Linear RGBA
pub type Color = [f32; 4];

/// Images the host loads asynchronously
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetId {
    Player,
    Platform1,
    Platform2,
}

impl AssetId {
    pub const ALL: [AssetId; 3] = [AssetId::Player, AssetId::Platform1, AssetId::Platform2];

    /// Platform sprite for a platform variant
    pub fn platform(variant: u8) -> Self {
        if variant == 2 {
            AssetId::Platform2
        } else {
            AssetId::Platform1
        }
    }

    /// File name the host is expected to load
    pub fn file_name(&self) -> &'static str {
        match self {
            AssetId::Player => "player.png",
            AssetId::Platform1 => "block1.png",
            AssetId::Platform2 => "block2.png",
        }
    }
}

/// Which assets have finished loading
pub trait AssetCatalog {
    fn is_ready(&self, asset: AssetId) -> bool;
}

impl AssetCatalog for HashSet<AssetId> {
    fn is_ready(&self, asset: AssetId) -> bool {
        self.contains(&asset)
    }
}

/// Nothing loaded (headless runs, slow networks)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetCatalog for NoAssets {
    fn is_ready(&self, _asset: AssetId) -> bool {
        false
    }
}

/// Everything loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct AllAssets;

impl AssetCatalog for AllAssets {
    fn is_ready(&self, _asset: AssetId) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing operation, executed in list order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    Clear(Color),
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    Sprite {
        asset: AssetId,
        rect: Rect,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
        align: TextAlign,
    },
}
