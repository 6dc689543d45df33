#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session facade that owns a Cube Push world and its systems.
//!
//! A [`GameSession`] routes every world event to the spawning system and to
//! registered [`SessionObserver`]s, then applies whatever commands the
//! spawning system requests until the world settles.

use std::time::Duration;

use cube_push_core::{CellCoord, Command, Direction, Event, GameStatus, MoveOutcome};
use cube_push_persistence::{from_snapshot, to_snapshot, SaveSnapshot, SnapshotError};
use cube_push_system_spawning::{Config as SpawningConfig, Spawning};
use cube_push_world::{self as world, ConfigError, GameConfig, World};
use log::{debug, info, warn};

/// Settings for the world and the systems a session drives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Board and scoring configuration.
    pub game: GameConfig,
    /// Cube spawn timer configuration.
    pub spawning: SpawningConfig,
}

/// How a session was started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartKind {
    /// A new board was generated.
    Fresh,
    /// The board was rebuilt from a snapshot.
    Restored,
}

/// Handle returned by [`GameSession::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Receives session notifications. Every method defaults to doing nothing.
pub trait SessionObserver {
    /// Score or level changed.
    fn on_score_changed(&mut self, _score: u32, _level: u32) {}

    /// Push counter changed.
    fn on_push_count_changed(&mut self, _count: u32) {}

    /// Accumulated play time changed.
    fn on_elapsed_time_changed(&mut self, _seconds: f32) {}

    /// The session ended.
    fn on_game_complete(&mut self, _success: bool, _elapsed_seconds: f32) {}

    /// A fresh or restored board is ready.
    fn on_game_loaded(&mut self) {}

    /// An occupant spawned, moved, or despawned.
    fn on_board_changed(&mut self, _event: &Event) {}

    /// Routes a raw event to the matching notification.
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::ScoreChanged { score, level } => self.on_score_changed(*score, *level),
            Event::PushCountChanged { count } => self.on_push_count_changed(*count),
            Event::ElapsedTimeChanged { seconds } => self.on_elapsed_time_changed(*seconds),
            Event::GameComplete {
                success,
                elapsed_seconds,
            } => self.on_game_complete(*success, *elapsed_seconds),
            Event::GameLoaded => self.on_game_loaded(),
            Event::OccupantSpawned { .. }
            | Event::OccupantMoved { .. }
            | Event::OccupantDespawned { .. } => self.on_board_changed(event),
            Event::TimeAdvanced { .. } => {}
        }
    }
}

/// Owns the world, the spawn timer, and the observer registry.
pub struct GameSession {
    config: SessionConfig,
    world: World,
    spawning: Spawning,
    observers: Vec<(SubscriptionId, Box<dyn SessionObserver>)>,
    next_subscription: u64,
}

impl GameSession {
    /// Creates an idle session. Call [`GameSession::start_game`] to begin play.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let world = World::new(config.game.clone())?;
        Ok(Self {
            spawning: Spawning::new(config.spawning),
            world,
            config,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Starts a game, restoring `saved` when provided.
    ///
    /// A snapshot that fails to load leaves the session untouched and the
    /// error is returned.
    pub fn start_game(&mut self, saved: Option<&SaveSnapshot>) -> Result<StartKind, SnapshotError> {
        let mut events = Vec::new();
        let kind = match saved {
            Some(snapshot) => {
                self.world = from_snapshot(snapshot, &self.config.game)?;
                world::announce_layout(&self.world, &mut events);
                world::announce_loaded(&self.world, &mut events);
                StartKind::Restored
            }
            None => {
                world::apply(&mut self.world, Command::StartFresh, &mut events);
                StartKind::Fresh
            }
        };
        info!("session started: {kind:?}");
        self.process(events);
        Ok(kind)
    }

    /// Starts from `saved`, falling back to a fresh board when it cannot be loaded.
    pub fn start_or_fresh(&mut self, saved: Option<&SaveSnapshot>) -> StartKind {
        if let Some(snapshot) = saved {
            match self.start_game(Some(snapshot)) {
                Ok(kind) => return kind,
                Err(error) => warn!("discarding saved game: {error}"),
            }
        }
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::StartFresh, &mut events);
        info!("session started after discarding save: {:?}", StartKind::Fresh);
        self.process(events);
        StartKind::Fresh
    }

    /// Attempts to move the player standing on `from`.
    pub fn try_move_player(&mut self, from: CellCoord, direction: Direction) -> bool {
        let mut events = Vec::new();
        let outcome = world::move_player(&mut self.world, from, direction, &mut events);
        match outcome {
            MoveOutcome::Rejected(reason) => {
                debug!("move {direction:?} from {from} rejected: {reason:?}");
            }
            accepted => debug!("move {direction:?} from {from}: {accepted:?}"),
        }
        self.process(events);
        outcome.is_accepted()
    }

    /// Advances play time and runs the spawn timer.
    pub fn tick(&mut self, dt: Duration) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.process(events);
    }

    /// Captures the current board for persistence.
    #[must_use]
    pub fn snapshot(&self) -> SaveSnapshot {
        to_snapshot(&self.world)
    }

    /// Read-only access to the world, for use with [`cube_push_world::query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Lifecycle state of the current game.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        world::query::status(&self.world)
    }

    /// Registers an observer; it is notified after every observer registered before it.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes an observer, reporting whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    /// Removes every observer.
    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    fn process(&mut self, pending_events: Vec<Event>) {
        let mut events = pending_events;
        while !events.is_empty() {
            self.notify(&events);

            let mut commands = Vec::new();
            self.spawning.handle(&events, &mut commands);

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn notify(&mut self, events: &[Event]) {
        for event in events {
            for (_, observer) in &mut self.observers {
                observer.on_event(event);
            }
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("world", &self.world)
            .field("spawning", &self.spawning)
            .field("observers", &self.observers.len())
            .finish()
    }
}
