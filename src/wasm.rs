//! Browser binding
//!
//! The page owns the canvas, the DOM forms and `requestAnimationFrame`; it
//! forwards input here and draws the JSON frames that come back.

use wasm_bindgen::prelude::*;

use crate::app::Game;
use crate::platform::{LocalStore, now_millis};
use crate::renderer::AssetId;
use crate::settings::{QualityPreset, Settings};
use crate::sim::Phase;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Seamless Dash (web) starting...");
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Frame serialisation failed: {e}");
        "null".to_string()
    })
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Start => "start",
        Phase::Playing => "playing",
        Phase::LevelUp => "level_up",
        Phase::Paused => "paused",
        Phase::GameOver => "game_over",
    }
}

/// Game instance exposed to JavaScript
#[wasm_bindgen]
pub struct WebGame {
    game: Game<LocalStore>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(LocalStore, seed);
        game.resize(width, height);
        log::info!("Game initialized with seed: {seed}");
        WebGame { game }
    }

    /// Name of the remembered player, for the "Continue as ..." button
    #[wasm_bindgen(js_name = returningName)]
    pub fn returning_name(&mut self) -> Option<String> {
        self.game.returning_identity(now_millis()).map(|i| i.name)
    }

    #[wasm_bindgen(js_name = resumeSession)]
    pub fn resume_session(&mut self) -> bool {
        self.game.resume_session(now_millis()).is_some()
    }

    /// Start a run. Rejects with `{ field, message }` on invalid input.
    #[wasm_bindgen(js_name = submitIdentity)]
    pub fn submit_identity(&mut self, name: &str, id: &str) -> Result<(), JsValue> {
        match self.game.submit_identity(name, id, now_millis()) {
            Ok(_) => Ok(()),
            Err(e) => {
                let field = match e.field() {
                    crate::identity::IdentityField::Name => "name",
                    crate::identity::IdentityField::Id => "id",
                };
                let body = serde_json::json!({ "field": field, "message": e.to_string() });
                Err(JsValue::from_str(&body.to_string()))
            }
        }
    }

    #[wasm_bindgen(js_name = changeUser)]
    pub fn change_user(&mut self) {
        self.game.change_user();
    }

    pub fn restart(&mut self) -> bool {
        self.game.restart(now_millis()).is_some()
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32) {
        self.game.pointer_move(x);
    }

    pub fn press(&mut self, x: f32) {
        self.game.press(x);
    }

    pub fn release(&mut self) {
        self.game.release();
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) {
        self.game.toggle_pause();
    }

    /// Tab hidden or window blurred
    pub fn suspend(&mut self) {
        self.game.suspend();
    }

    #[wasm_bindgen(js_name = continueLevel)]
    pub fn continue_level(&mut self) {
        self.game.continue_level();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.resize(width, height);
    }

    /// Mark an image as loaded (`player.png`, `block1.png`, `block2.png`)
    #[wasm_bindgen(js_name = assetLoaded)]
    pub fn asset_loaded(&mut self, file_name: &str) {
        match AssetId::ALL.iter().find(|a| a.file_name() == file_name) {
            Some(asset) => self.game.asset_loaded(*asset),
            None => log::warn!("Unknown asset: {file_name}"),
        }
    }

    /// Apply the settings panel. Unknown quality names keep the current preset.
    #[wasm_bindgen(js_name = applySettings)]
    pub fn apply_settings(&mut self, quality: &str, particles: bool, reduced_motion: bool, high_contrast: bool) {
        let current = self.game.session().settings.clone();
        let settings = Settings {
            quality: QualityPreset::parse(quality).unwrap_or(current.quality),
            particles,
            reduced_motion,
            high_contrast,
        };
        log::info!("Settings: {} quality", settings.quality.as_str());
        self.game.update_settings(settings);
    }

    pub fn phase(&self) -> String {
        phase_name(self.game.phase()).to_string()
    }

    /// Advance to `time` (ms, from `requestAnimationFrame`) and return the
    /// frame as JSON `{ events, commands }`
    pub fn frame(&mut self, time: f64) -> String {
        let frame = self.game.frame_at(time, now_millis());
        to_json(&frame)
    }

    /// Current board as JSON
    pub fn leaderboard(&self) -> String {
        to_json(&self.game.leaderboard(now_millis()))
    }

    /// Last three runs as JSON, newest first
    pub fn recent(&self) -> String {
        to_json(&self.game.recent())
    }

    #[wasm_bindgen(js_name = bestScore)]
    pub fn best_score(&self) -> Option<f64> {
        self.game.best_score().map(|s| s as f64)
    }
}
