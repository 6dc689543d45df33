use std::{cell::RefCell, rc::Rc, time::Duration};

use cube_push_core::{Direction, Event, GameStatus, OccupantKind};
use cube_push_persistence::{MapSize, SaveSnapshot, SavedPresence, SnapshotError};
use cube_push_session::{GameSession, SessionConfig, SessionObserver, StartKind};
use cube_push_system_spawning::Config as SpawningConfig;
use cube_push_world::{query, GameConfig, RestoreError};

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    label: &'static str,
    log: Log,
}

impl SessionObserver for Recorder {
    fn on_score_changed(&mut self, score: u32, level: u32) {
        self.push(format!("score {score} level {level}"));
    }

    fn on_push_count_changed(&mut self, count: u32) {
        self.push(format!("pushes {count}"));
    }

    fn on_elapsed_time_changed(&mut self, seconds: f32) {
        self.push(format!("elapsed {seconds:.2}"));
    }

    fn on_game_complete(&mut self, success: bool, _elapsed_seconds: f32) {
        self.push(format!("complete {success}"));
    }

    fn on_game_loaded(&mut self) {
        self.push("loaded".to_string());
    }

    fn on_board_changed(&mut self, event: &Event) {
        let entry = match event {
            Event::OccupantSpawned { kind, .. } => format!("spawned {kind:?}"),
            Event::OccupantMoved { .. } => "moved".to_string(),
            Event::OccupantDespawned { .. } => "despawned".to_string(),
            _ => return,
        };
        self.push(entry);
    }
}

impl Recorder {
    fn push(&self, entry: String) {
        self.log.borrow_mut().push(format!("{}: {entry}", self.label));
    }
}

fn recorder(label: &'static str, log: &Log) -> Box<Recorder> {
    Box::new(Recorder {
        label,
        log: Rc::clone(log),
    })
}

fn config(spawn_every: Duration) -> SessionConfig {
    SessionConfig {
        game: GameConfig {
            width: 6,
            height: 6,
            ..GameConfig::default()
        },
        spawning: SpawningConfig::new(spawn_every, spawn_every, 99),
    }
}

fn entries(log: &Log, label: &str) -> Vec<String> {
    let prefix = format!("{label}: ");
    log.borrow()
        .iter()
        .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

fn saved_game() -> SaveSnapshot {
    SaveSnapshot {
        total_time: 42.5,
        push_count: 6,
        point_count: 130,
        map_size: MapSize { x: 4, y: 4 },
        saved_map: vec![
            SavedPresence {
                pos: cube_push_core::CellCoord::new(1, 1),
                type_code: 0,
                has_player_on: true,
            },
            SavedPresence {
                pos: cube_push_core::CellCoord::new(3, 3),
                type_code: 2,
                has_player_on: false,
            },
        ],
    }
}

#[test]
fn fresh_start_announces_counters_then_loaded_once() {
    let log = Log::default();
    let mut session = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let _ = session.subscribe(recorder("a", &log));

    let kind = session.start_game(None).expect("fresh start");

    assert_eq!(kind, StartKind::Fresh);
    assert_eq!(session.status(), GameStatus::Running);
    let seen = entries(&log, "a");
    let tail: Vec<&str> = seen.iter().rev().take(4).rev().map(String::as_str).collect();
    assert_eq!(
        tail,
        vec!["score 0 level 0", "pushes 0", "elapsed 0.00", "loaded"]
    );
    assert_eq!(seen.iter().filter(|entry| *entry == "loaded").count(), 1);
    assert_eq!(
        seen.iter()
            .filter(|entry| entry.starts_with("spawned"))
            .count(),
        3,
        "two catalog objects and the player"
    );
}

#[test]
fn observers_are_notified_in_registration_order() {
    let log = Log::default();
    let mut session = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let _ = session.subscribe(recorder("first", &log));
    let _ = session.subscribe(recorder("second", &log));

    session.tick(Duration::from_millis(10));
    assert!(log.borrow().is_empty(), "idle sessions do not tick");

    let _ = session.start_game(None).expect("fresh start");

    let log = log.borrow();
    assert!(!log.is_empty());
    for pair in log.chunks(2) {
        assert!(pair[0].starts_with("first: "), "{pair:?}");
        assert!(pair[1].starts_with("second: "), "{pair:?}");
        assert_eq!(pair[0]["first: ".len()..], pair[1]["second: ".len()..]);
    }
}

#[test]
fn unsubscribed_observers_stop_receiving() {
    let log = Log::default();
    let mut session = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let kept = session.subscribe(recorder("kept", &log));
    let dropped = session.subscribe(recorder("dropped", &log));

    assert!(session.unsubscribe(dropped));
    assert!(!session.unsubscribe(dropped));
    let _ = session.start_game(None).expect("fresh start");

    assert!(!entries(&log, "kept").is_empty());
    assert!(entries(&log, "dropped").is_empty());

    session.clear_observers();
    log.borrow_mut().clear();
    session.tick(Duration::from_millis(100));
    assert!(log.borrow().is_empty());
    assert!(!session.unsubscribe(kept));
}

#[test]
fn restored_start_replays_layout_and_counters() {
    let log = Log::default();
    let mut session = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let _ = session.subscribe(recorder("a", &log));

    let kind = session.start_game(Some(&saved_game())).expect("restores");

    assert_eq!(kind, StartKind::Restored);
    assert_eq!(
        entries(&log, "a"),
        vec![
            "spawned Cube",
            "spawned Scored(ObjectKind(2))",
            "spawned Player",
            "score 130 level 1",
            "pushes 6",
            "elapsed 42.50",
            "loaded",
        ]
    );
    assert_eq!(session.snapshot().normalized(), saved_game().normalized());
}

#[test]
fn failed_load_leaves_session_untouched() {
    let mut session = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let _ = session.start_game(None).expect("fresh start");
    let before = session.snapshot();

    let mut broken = saved_game();
    broken.saved_map[0].has_player_on = false;
    assert!(session.start_game(Some(&broken)).is_err());

    assert_eq!(session.snapshot(), before);
}

#[test]
fn start_or_fresh_falls_back_on_bad_save() {
    let log = Log::default();
    let mut session = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let _ = session.subscribe(recorder("a", &log));

    let mut broken = saved_game();
    broken.map_size = MapSize { x: 0, y: 0 };

    assert_eq!(session.start_or_fresh(Some(&broken)), StartKind::Fresh);
    assert_eq!(session.status(), GameStatus::Running);
    assert_eq!(
        entries(&log, "a")
            .iter()
            .filter(|entry| *entry == "loaded")
            .count(),
        1
    );
    assert_eq!(session.start_or_fresh(Some(&saved_game())), StartKind::Restored);
}

#[test]
fn moves_require_the_player_cell() {
    let mut session = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let _ = session.start_game(Some(&saved_game())).expect("restores");

    assert!(!session.try_move_player(cube_push_core::CellCoord::new(0, 0), Direction::North));
    assert!(session.try_move_player(cube_push_core::CellCoord::new(1, 1), Direction::North));
    assert_eq!(
        query::player_cell(session.world()),
        Some(cube_push_core::CellCoord::new(1, 2))
    );
}

#[test]
fn spawn_timer_drops_cubes_while_running() {
    let log = Log::default();
    let mut session = GameSession::new(config(Duration::from_secs(1))).expect("valid config");
    let _ = session.subscribe(recorder("a", &log));
    let _ = session.start_game(None).expect("fresh start");
    log.borrow_mut().clear();

    session.tick(Duration::from_millis(500));
    assert!(!entries(&log, "a").iter().any(|entry| entry == "spawned Cube"));

    session.tick(Duration::from_millis(500));
    assert!(entries(&log, "a").iter().any(|entry| entry == "spawned Cube"));

    let cubes = query::occupants(session.world())
        .into_iter()
        .filter(|snapshot| snapshot.kind == OccupantKind::Cube)
        .count();
    assert_eq!(cubes, 1);
}

#[test]
fn saved_session_resumes_in_a_new_session() {
    let mut first = GameSession::new(config(Duration::from_millis(300))).expect("valid config");
    let _ = first.start_game(None).expect("fresh start");
    for _ in 0..4 {
        first.tick(Duration::from_millis(300));
    }
    let saved = first.snapshot();

    let mut second = GameSession::new(config(Duration::from_millis(300))).expect("valid config");
    assert_eq!(second.start_game(Some(&saved)).expect("restores"), StartKind::Restored);

    assert_eq!(second.snapshot().normalized(), saved.normalized());
    assert_eq!(
        query::player_cell(second.world()),
        query::player_cell(first.world())
    );
}

#[test]
fn finished_game_cannot_be_resumed() {
    let almost_won = SaveSnapshot {
        total_time: 10.0,
        push_count: 20,
        point_count: 399,
        map_size: MapSize { x: 5, y: 3 },
        saved_map: vec![
            SavedPresence {
                pos: cube_push_core::CellCoord::new(0, 1),
                type_code: 1,
                has_player_on: false,
            },
            SavedPresence {
                pos: cube_push_core::CellCoord::new(1, 1),
                type_code: 2,
                has_player_on: false,
            },
        ],
    };
    let mut first = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    let _ = first.start_game(Some(&almost_won)).expect("restores");

    assert!(first.try_move_player(cube_push_core::CellCoord::new(0, 1), Direction::East));
    assert_eq!(first.status(), GameStatus::Complete { success: true });
    let finished = first.snapshot();
    assert!(finished.point_count >= 400);

    let mut second = GameSession::new(config(Duration::from_secs(5))).expect("valid config");
    assert!(matches!(
        second.start_game(Some(&finished)),
        Err(SnapshotError::Layout(RestoreError::AlreadyComplete { .. }))
    ));
    assert_eq!(second.status(), GameStatus::Idle);
    assert_eq!(second.start_or_fresh(Some(&finished)), StartKind::Fresh);
    assert_eq!(query::score(second.world()), 0);
}
