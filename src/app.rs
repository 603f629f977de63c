//! Headless game driver
//!
//! Owns the session, the stores and the fixed-timestep accumulator. Hosts
//! (the wasm binding, the native binary) queue input on a [`Game`] and call
//! [`Game::advance`] once per displayed frame.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::*;
use crate::highscores::{ScoreRecord, ScoreStore};
use crate::identity::{Identity, IdentityError};
use crate::platform::KeyValueStore;
use crate::platform::time::DAY_MS;
use crate::renderer::{self, AssetId, RenderCommand};
use crate::session::SessionStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameSession, Phase, TickInput, Viewport, tick};
use crate::tuning::Tuning;

/// Output of one displayed frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub events: Vec<GameEvent>,
    pub commands: Vec<RenderCommand>,
}

/// What happened to a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub score: u64,
    /// Position on the board (1 = top), if the score was retained
    pub rank: Option<usize>,
    /// Best retained score after recording this one
    pub best: Option<u64>,
}

/// A game bound to a key-value store
pub struct Game<S: KeyValueStore> {
    store: S,
    session: GameSession,
    scores: ScoreStore,
    sessions: SessionStore,
    rng: Pcg32,
    accumulator: f32,
    /// Host timestamp (ms) of the last frame that ran the simulation
    last_frame_ms: Option<f64>,
    /// Input queued since the last tick
    input: TickInput,
    assets: HashSet<AssetId>,
    best: Option<u64>,
    last_result: Option<RunResult>,
}

impl<S: KeyValueStore> Game<S> {
    /// Load tuning and settings from `store` and wait for a player
    pub fn new(store: S, seed: u64) -> Self {
        let tuning = Tuning::load(&store);
        let settings = Settings::load(&store);
        Self::with_config(store, tuning, settings, Viewport::default(), seed)
    }

    pub fn with_config(
        store: S,
        tuning: Tuning,
        settings: Settings,
        viewport: Viewport,
        seed: u64,
    ) -> Self {
        let scores = ScoreStore::from_tuning(&tuning);
        let sessions = SessionStore::new(tuning.session_days * DAY_MS);
        log::info!(
            "Game ready ({:?}, board of {}, seed {})",
            tuning.variant,
            scores.bound(),
            seed
        );
        Self {
            store,
            session: GameSession::new(tuning, settings, viewport),
            scores,
            sessions,
            rng: Pcg32::seed_from_u64(seed),
            accumulator: 0.0,
            last_frame_ms: None,
            input: TickInput::default(),
            assets: HashSet::new(),
            best: None,
            last_result: None,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn last_result(&self) -> Option<RunResult> {
        self.last_result
    }

    /// Player remembered from an earlier visit, if the session is still valid
    pub fn returning_identity(&mut self, now: u64) -> Option<Identity> {
        self.sessions.load(&mut self.store, now)
    }

    /// "Continue as ..." shortcut: start straight away as the remembered player
    pub fn resume_session(&mut self, now: u64) -> Option<GameEvent> {
        let identity = self.returning_identity(now)?;
        log::info!("Welcome back, {}", identity.name);
        Some(self.begin(identity, now))
    }

    /// Validate the identity form, remember the player and start a run.
    /// Invalid input leaves everything untouched.
    pub fn submit_identity(&mut self, name: &str, id: &str, now: u64) -> Result<GameEvent, IdentityError> {
        let identity = Identity::parse(name, id)?;
        self.sessions.save(&mut self.store, &identity, now);
        Ok(self.begin(identity, now))
    }

    fn begin(&mut self, identity: Identity, now: u64) -> GameEvent {
        self.best = self.scores.best_for(&self.store, &identity, now);
        self.reset_clock();
        self.last_result = None;
        self.session.start(identity, &mut self.rng)
    }

    /// Play again as the same player
    pub fn restart(&mut self, now: u64) -> Option<GameEvent> {
        let identity = self.session.identity.clone()?;
        Some(self.begin(identity, now))
    }

    /// Forget the remembered player and return to the identity form
    pub fn change_user(&mut self) {
        self.sessions.clear(&mut self.store);
        self.session.return_to_start();
        self.reset_clock();
        self.best = None;
        self.last_result = None;
    }

    fn reset_clock(&mut self) {
        self.accumulator = 0.0;
        self.last_frame_ms = None;
        self.input = TickInput {
            pointer_x: self.input.pointer_x,
            autopilot: self.input.autopilot,
            ..Default::default()
        };
    }

    pub fn pointer_move(&mut self, x: f32) {
        self.input.pointer_x = Some(x);
    }

    pub fn press(&mut self, x: f32) {
        self.input.press_x = Some(x);
        self.input.release = false;
    }

    pub fn release(&mut self) {
        self.input.press_x = None;
        self.input.release = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = !self.input.pause;
    }

    /// Pause if a run is in progress (tab hidden, window blurred)
    pub fn suspend(&mut self) {
        if self.phase() == Phase::Playing && !self.input.pause {
            self.input.pause = true;
            log::info!("Auto-paused");
        }
    }

    pub fn continue_level(&mut self) {
        self.input.continue_level = true;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.input.viewport = Some(Viewport::new(width, height));
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    pub fn asset_loaded(&mut self, asset: AssetId) {
        log::debug!("Asset ready: {}", asset.file_name());
        self.assets.insert(asset);
    }

    pub fn update_settings(&mut self, settings: Settings) {
        settings.save(&mut self.store);
        self.session.settings = settings;
    }

    /// One simulation tick with the queued input, rendered
    pub fn tick(&mut self, dt: f32, now: u64) -> Frame {
        let events = self.step(dt, now);
        Frame {
            events,
            commands: self.render(),
        }
    }

    /// Simulate without drawing: consume the one-shot input and record a
    /// finished run
    fn step(&mut self, dt: f32, now: u64) -> Vec<GameEvent> {
        let events = tick(&mut self.session, &self.input, dt, &mut self.rng);

        // One-shot inputs are consumed by the tick
        self.input.press_x = None;
        self.input.release = false;
        self.input.pause = false;
        self.input.continue_level = false;
        self.input.viewport = None;

        for event in &events {
            if let GameEvent::GameOver { score } = *event {
                self.finish_run(score, now);
            }
        }
        events
    }

    fn render(&self) -> Vec<RenderCommand> {
        renderer::render(&self.session, &self.assets, self.best)
    }

    fn finish_run(&mut self, score: u64, now: u64) {
        let Some(identity) = self.session.identity.clone() else {
            return;
        };
        let rank = self.scores.record(&mut self.store, &identity, score, now);
        self.best = self.scores.best_for(&self.store, &identity, now);
        log::info!(
            "Run over for {}: {} (rank {:?}, best {:?})",
            identity.id,
            score,
            rank,
            self.best
        );
        self.last_result = Some(RunResult {
            score,
            rank,
            best: self.best,
        });
    }

    /// Advance by a displayed frame of `frame_dt` seconds using fixed steps
    pub fn advance(&mut self, frame_dt: f32, now: u64) -> Frame {
        if !matches!(self.phase(), Phase::Playing | Phase::LevelUp) {
            // Still deliver pause/resize input, without simulated time
            self.accumulator = 0.0;
            return self.tick(0.0, now);
        }

        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.step(SIM_DT, now));
            self.accumulator -= SIM_DT;
            substeps += 1;
            if !matches!(self.phase(), Phase::Playing | Phase::LevelUp) {
                self.accumulator = 0.0;
                break;
            }
        }

        Frame {
            events,
            commands: self.render(),
        }
    }

    /// Advance to host time `time_ms` (e.g. a `requestAnimationFrame`
    /// timestamp). Gaps spent outside a running phase are not simulated.
    pub fn frame_at(&mut self, time_ms: f64, now: u64) -> Frame {
        let dt = match self.last_frame_ms {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        let frame = self.advance(dt, now);
        self.last_frame_ms = matches!(self.phase(), Phase::Playing | Phase::LevelUp).then_some(time_ms);
        frame
    }

    /// Stored best for the current player
    pub fn best_score(&self) -> Option<u64> {
        self.best
    }

    /// Board the current player plays on, in rank order
    pub fn leaderboard(&self, now: u64) -> Vec<ScoreRecord> {
        match &self.session.identity {
            Some(identity) => self.scores.top(&self.store, identity, now),
            None => Vec::new(),
        }
    }

    /// The current player's most recent runs, newest first
    pub fn recent(&self) -> Vec<u64> {
        match &self.session.identity {
            Some(identity) => self.scores.recent(&self.store, identity),
            None => Vec::new(),
        }
    }
}
