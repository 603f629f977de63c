//! End-to-end runs through the public `Game` driver

use glam::Vec2;

use seamless_dash::consts::SIM_DT;
use seamless_dash::platform::{KeyValueStore, MemoryStore};
use seamless_dash::sim::{Entity, EntityKind, GameEvent, Phase, Viewport};
use seamless_dash::{Game, HighScores, Settings, Tuning};

const T0: u64 = 1_700_000_000_000;

fn quiet_spawner<S: KeyValueStore>(game: &mut Game<S>) {
    let spawn = &mut game.session_mut().tuning.spawn;
    spawn.obstacle_base_chance = 0.0;
    spawn.power_up_chance = 0.0;
}

/// Drop an obstacle on top of the player
fn crash<S: KeyValueStore>(game: &mut Game<S>) {
    let session = game.session_mut();
    let id = session.next_entity_id();
    let center = session.player.center();
    session.obstacles.push(Entity::new(
        id,
        EntityKind::Obstacle,
        center - Vec2::splat(20.0),
        Vec2::splat(40.0),
        Vec2::ZERO,
    ));
}

#[test]
fn jane_doe_levels_up_then_crashes() {
    let mut game = Game::new(MemoryStore::new(), 42);
    game.submit_identity("Jane Doe", "4821", T0).unwrap();
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.session().progression.score, 0.0);
    assert_eq!(game.session().progression.level, 1);
    quiet_spawner(&mut game);

    let mut level_ups = Vec::new();
    let mut ticks = 0;
    while game.phase() == Phase::Playing {
        let frame = game.advance(SIM_DT, T0);
        level_ups.extend(frame.events.into_iter().filter_map(|e| match e {
            GameEvent::LevelUp { level, trivia } => Some((level, trivia)),
            _ => None,
        }));
        ticks += 1;
        assert!(ticks < 1000, "never reached 100 points");
    }
    assert_eq!(game.phase(), Phase::LevelUp);
    assert_eq!(level_ups, vec![(2, 2)]);
    let banked = game.session().progression.score;
    assert!(banked >= 100.0);

    // Nothing accrues behind the interstitial
    for _ in 0..30 {
        game.advance(SIM_DT, T0);
    }
    assert_eq!(game.session().progression.score, banked);

    game.continue_level();
    let frame = game.advance(SIM_DT, T0);
    assert!(frame.events.contains(&GameEvent::LevelContinued { level: 2 }));
    assert_eq!(game.phase(), Phase::Playing);

    game.session_mut().progression.score = 237.0;
    game.session_mut().progression.next_level_score = 300.0;
    crash(&mut game);
    let frame = game.advance(SIM_DT, T0 + 60_000);
    assert!(frame.events.contains(&GameEvent::GameOver { score: 237 }));
    assert_eq!(game.phase(), Phase::GameOver);

    let stored = game.store().get("seamless_dash_scores_4821").unwrap().unwrap();
    let board: HighScores = serde_json::from_str(&stored).unwrap();
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].score, 237);
    assert_eq!(board.entries[0].name, "Jane Doe");
    assert_eq!(game.recent(), vec![237]);
}

#[test]
fn boards_stay_bounded_and_sorted() {
    let mut game = Game::new(MemoryStore::new(), 5);
    game.submit_identity("Jane Doe", "4821", T0).unwrap();
    for (i, score) in [120.0, 40.0, 300.0, 80.0, 210.0].into_iter().enumerate() {
        let now = T0 + i as u64 * 1000;
        if i > 0 {
            game.restart(now).unwrap();
        }
        game.session_mut().progression.score = score;
        game.session_mut().progression.next_level_score = 10_000.0;
        crash(&mut game);
        game.advance(SIM_DT, now);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    let scores: Vec<u64> = game.leaderboard(T0 + 10_000).iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![300, 210, 120]);
    // Ranks count from 1
    assert_eq!(game.last_result().unwrap().rank, Some(2));
    assert_eq!(game.best_score(), Some(300));
    assert_eq!(game.recent(), vec![210, 80, 300]);
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn file_store_survives_a_restart_of_the_program() {
    use seamless_dash::platform::FileStore;

    let dir = std::env::temp_dir().join(format!("seamless_dash_driver_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    {
        let mut game = Game::new(FileStore::open(&dir).unwrap(), 1);
        game.submit_identity("Jane Doe", "4821", T0).unwrap();
        game.session_mut().progression.score = 150.0;
        game.session_mut().progression.next_level_score = 10_000.0;
        crash(&mut game);
        game.advance(SIM_DT, T0 + 5000);
        assert_eq!(game.best_score(), Some(150));
    }

    let mut game = Game::new(FileStore::open(&dir).unwrap(), 2);
    let returning = game.returning_identity(T0 + 60_000).unwrap();
    assert_eq!(returning.name, "Jane Doe");
    assert!(game.resume_session(T0 + 60_000).is_some());
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.best_score(), Some(150));

    game.change_user();
    let mut fresh = Game::new(FileStore::open(&dir).unwrap(), 3);
    assert!(fresh.returning_identity(T0 + 60_000).is_none());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn jump_variant_runs_under_autopilot() {
    let mut game = Game::with_config(
        MemoryStore::new(),
        Tuning::jump(),
        Settings::default(),
        Viewport::default(),
        3,
    );
    game.set_autopilot(true);
    game.submit_identity("Demo Player", "000", T0).unwrap();
    assert!(game.session().platforms.len() > 1);

    for _ in 0..600 {
        game.advance(SIM_DT, T0);
        match game.phase() {
            Phase::LevelUp => game.continue_level(),
            Phase::GameOver => break,
            _ => {}
        }
    }
    match game.phase() {
        Phase::GameOver => assert_eq!(game.recent().len(), 1),
        phase => assert!(matches!(phase, Phase::Playing | Phase::LevelUp)),
    }
    let width = game.session().viewport.width;
    let player = &game.session().player;
    assert!(player.pos.x >= -player.size.x && player.pos.x <= width);
}

#[test]
fn resize_mid_run_keeps_player_on_screen() {
    let mut game = Game::new(MemoryStore::new(), 9);
    game.submit_identity("Jane Doe", "4821", T0).unwrap();
    quiet_spawner(&mut game);
    game.pointer_move(390.0);
    game.advance(SIM_DT, T0);

    game.resize(200.0, 300.0);
    let frame = game.advance(SIM_DT, T0);
    assert!(frame.events.contains(&GameEvent::Resized(Viewport::new(200.0, 300.0))));
    let player = game.session().player.bounds();
    assert!(player.min.x >= 0.0 && player.max.x <= 200.0);
    assert!(player.max.y <= 300.0);
}
