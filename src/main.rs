//! Seamless Dash entry point
//!
//! Native builds play a headless autopilot run against a file-backed store
//! and print the result. The browser build enters through the wasm binding
//! in the library.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use thiserror::Error;

    use seamless_dash::consts::SIM_DT;
    use seamless_dash::highscores::format_age;
    use seamless_dash::platform::{FileStore, StorageError, now_millis};
    use seamless_dash::sim::{GameEvent, Phase, Viewport};
    use seamless_dash::tuning::TuningError;
    use seamless_dash::{Game, GameVariant, IdentityError, Settings, Tuning};

    /// Data directory override
    const DATA_ENV: &str = "SEAMLESS_DASH_DATA";
    const DEFAULT_DATA_DIR: &str = "seamless_dash_data";

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error("{0}")]
        Usage(String),
        #[error("invalid player: {0}")]
        Identity(#[from] IdentityError),
        #[error(transparent)]
        Tuning(#[from] TuningError),
        #[error("storage: {0}")]
        Storage(#[from] StorageError),
    }

    /// Play one autopilot run and print the high scores
    #[derive(Debug, Parser)]
    #[command(name = "seamless-dash", version)]
    pub struct Args {
        /// Play the platform-jumping variant instead of dodging
        #[arg(long)]
        jump: bool,
        /// Tuning JSON file, instead of the tuning saved in the data directory
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
        /// Stop after this many simulated seconds
        #[arg(
            long,
            value_name = "SECONDS",
            default_value_t = 120,
            value_parser = clap::value_parser!(u32).range(1..=3600)
        )]
        seconds: u32,
        /// RNG seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Player name; omit both NAME and ID to continue as the remembered player
        #[arg(value_name = "NAME", requires = "id")]
        name: Option<String>,
        /// Employee ID
        #[arg(value_name = "ID")]
        id: Option<String>,
    }

    impl Args {
        fn player(&self) -> Option<(&str, &str)> {
            self.name.as_deref().zip(self.id.as_deref())
        }
    }

    pub fn run(args: Args) -> Result<(), CliError> {
        let dir = std::env::var_os(DATA_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let store = FileStore::open(dir)?;

        let mut tuning = match &args.tuning {
            Some(path) => Tuning::from_file(path)?,
            None => Tuning::load(&store),
        };
        if args.jump {
            tuning.variant = GameVariant::Jump;
        }
        let settings = Settings::load(&store);

        let start = now_millis();
        let seed = args.seed.unwrap_or(start);
        let mut game = Game::with_config(store, tuning, settings, Viewport::default(), seed);
        game.set_autopilot(true);

        match args.player() {
            Some((name, id)) => {
                game.submit_identity(name, id, start)?;
            }
            None => {
                if game.resume_session(start).is_none() {
                    return Err(CliError::Usage("no remembered player, pass NAME and ID".into()));
                }
            }
        }

        let player = game.session().identity.clone();
        if let Some(player) = &player {
            println!("Playing as {} ({})", player.name, player.id);
        }

        let max_ticks = u64::from(args.seconds) * 60;
        let mut now = start;
        for ticks in 0..max_ticks {
            now = start + ticks * 1000 / 60;
            let frame = game.advance(SIM_DT, now);
            for event in &frame.events {
                match event {
                    GameEvent::LevelUp { level, .. } => {
                        let fact = game.session().progression.trivia().unwrap_or_default();
                        println!("Level {level}! {fact}");
                        game.continue_level();
                    }
                    GameEvent::PowerUpCollected(kind) => println!("Picked up {kind:?}"),
                    _ => {}
                }
            }
            if game.phase() == Phase::GameOver {
                break;
            }
        }

        let progression = &game.session().progression;
        match game.last_result() {
            Some(result) => {
                println!("Game over: {} points at level {}", result.score, progression.level);
                match result.rank {
                    Some(rank) => println!("New high score, rank #{rank}"),
                    None => println!("Best so far: {}", result.best.unwrap_or(0)),
                }
            }
            None => println!(
                "Still going after {} s: {} points at level {}",
                max_ticks / 60,
                progression.final_score(),
                progression.level
            ),
        }

        println!("\nHigh scores:");
        for (i, record) in game.leaderboard(now).iter().enumerate() {
            println!(
                "  {}. {:<20} {:>6}  {}",
                i + 1,
                record.name,
                record.score,
                format_age(record.timestamp, now)
            );
        }
        let recent = game.recent();
        if !recent.is_empty() {
            let list: Vec<String> = recent.iter().map(u64::to_string).collect();
            println!("Recent: {}", list.join(", "));
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::{CommandFactory, Parser};

    env_logger::init();
    log::info!("Seamless Dash (native) starting...");

    let args = native::Args::parse();
    if let Err(e) = native::run(args) {
        log::error!("{e}");
        eprintln!("{e}");
        if matches!(e, native::CliError::Usage(_)) {
            eprintln!("{}", native::Args::command().render_usage());
        }
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm entry point is `wasm_start` in the library
}
