#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Cube Push.
//!
//! The [`World`] owns the occupancy grid, every occupant record, and the
//! session counters. Hosts mutate it exclusively through [`apply`] and read it
//! through the [`query`] module.

mod board;
mod catalog;
mod occupants;
mod push;
mod scoring;
mod spawn;

use cube_push_core::{
    level_for_score, CellCoord, Command, Direction, Event, GameStatus, MoveOutcome, OccupantId,
    OccupantKind, DEFAULT_POINTS_PER_LEVEL, DEFAULT_WINNING_SCORE, PLAYER_TYPE_CODE,
};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use catalog::{Catalog, ObjectType};

use board::Board;
use occupants::OccupantRegistry;

const DEFAULT_BOARD_WIDTH: u32 = 10;
const DEFAULT_BOARD_HEIGHT: u32 = 10;
const DEFAULT_RNG_SEED: u64 = 0x5eed_c0be_7a11_0001;
const MIN_POINTS_COLUMNS: usize = 3;

/// Tunable parameters describing a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of board columns.
    pub width: u32,
    /// Number of board rows.
    pub height: u32,
    /// Score that ends the session successfully.
    pub winning_score: u32,
    /// Points required to advance one level.
    pub points_per_level: u32,
    /// Scored object kinds and their point tables.
    pub catalog: Catalog,
    /// Seed for every random board decision.
    pub rng_seed: u64,
}

impl GameConfig {
    /// Checks that the configuration describes a playable board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(ConfigError::OversizedBoard {
                width: self.width,
                height: self.height,
            });
        }
        for entry in self.catalog.entries() {
            if entry.kind.get() <= PLAYER_TYPE_CODE {
                return Err(ConfigError::ReservedKind(entry.kind.get()));
            }
            if entry.points_by_level.len() < MIN_POINTS_COLUMNS {
                return Err(ConfigError::ShortPointsTable {
                    kind: entry.kind.get(),
                    len: entry.points_by_level.len(),
                });
            }
        }
        if self.catalog.has_duplicates() {
            return Err(ConfigError::DuplicateKind);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            winning_score: DEFAULT_WINNING_SCORE,
            points_per_level: DEFAULT_POINTS_PER_LEVEL,
            catalog: Catalog::default(),
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

/// Reasons a [`GameConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The board has no cells.
    #[error("board must have at least one cell, got {width}x{height}")]
    EmptyBoard {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The board cannot be addressed with signed coordinates.
    #[error("board of {width}x{height} exceeds the addressable range")]
    OversizedBoard {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// A catalog entry uses a code reserved for cubes or the player.
    #[error("catalog type code {0} is reserved")]
    ReservedKind(u32),
    /// A catalog entry lacks one of the three level columns.
    #[error("catalog type {kind} has {len} point columns, expected at least 3")]
    ShortPointsTable {
        /// Type code of the offending entry.
        kind: u32,
        /// Number of columns provided.
        len: usize,
    },
    /// Two catalog entries share a type code.
    #[error("catalog lists the same type code more than once")]
    DuplicateKind,
}

/// Occupant placement used to rebuild a world from persisted state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestoredOccupant {
    /// Cell the occupant sits on.
    pub cell: CellCoord,
    /// Kind of occupant; must not be [`OccupantKind::Player`].
    pub kind: OccupantKind,
}

/// Complete description of a world to rebuild.
#[derive(Clone, Debug, PartialEq)]
pub struct RestoredLayout {
    /// Points accumulated before the save.
    pub score: u32,
    /// Pushes performed before the save.
    pub push_count: u32,
    /// Seconds of play before the save.
    pub elapsed_seconds: f32,
    /// Every non-player occupant on the board.
    pub occupants: Vec<RestoredOccupant>,
    /// Cell of the player.
    pub player: CellCoord,
    /// Whether the player stands on the occupant listed at its cell.
    ///
    /// When false, the player cell must be empty.
    pub player_on_tile: bool,
}

/// Reasons a [`RestoredLayout`] cannot be rebuilt.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// The configuration itself is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A placement lies outside the board.
    #[error("cell {0} lies outside the board")]
    OutOfBounds(CellCoord),
    /// Two placements share a cell.
    #[error("cell {0} is listed more than once")]
    DuplicateCell(CellCoord),
    /// A scored placement names a kind missing from the catalog.
    #[error("type code {0} is not in the catalog")]
    UnknownKind(u32),
    /// The player was listed among the regular occupants.
    #[error("player at {0} must be supplied as the player cell")]
    PlayerInOccupants(CellCoord),
    /// The score already reaches the winning score, so the game is over.
    #[error("score {score} already reaches the winning score {winning_score}")]
    AlreadyComplete {
        /// Restored score.
        score: u32,
        /// Configured winning score.
        winning_score: u32,
    },
}

/// Represents the authoritative Cube Push board and session counters.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    board: Board,
    occupants: OccupantRegistry,
    player: Option<OccupantId>,
    status: GameStatus,
    score: u32,
    level: u32,
    push_count: u32,
    elapsed_seconds: f32,
    last_pushed: Option<OccupantId>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an idle world with an empty board sized by `config`.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            board: Board::new(config.width, config.height),
            occupants: OccupantRegistry::new(),
            player: None,
            status: GameStatus::Idle,
            score: 0,
            level: 0,
            push_count: 0,
            elapsed_seconds: 0.0,
            last_pushed: None,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
        })
    }

    /// Rebuilds a running world from a persisted layout.
    ///
    /// The board dimensions come from `config`. Level is derived from the
    /// restored score.
    pub fn restore(config: GameConfig, layout: RestoredLayout) -> Result<Self, RestoreError> {
        let mut world = Self::new(config)?;
        if layout.score >= world.config.winning_score {
            return Err(RestoreError::AlreadyComplete {
                score: layout.score,
                winning_score: world.config.winning_score,
            });
        }

        for placement in &layout.occupants {
            let cell = placement.cell;
            if !world.board.is_in_range(cell) {
                return Err(RestoreError::OutOfBounds(cell));
            }
            if !world.board.is_empty_at(cell) {
                return Err(RestoreError::DuplicateCell(cell));
            }
            match placement.kind {
                OccupantKind::Player => return Err(RestoreError::PlayerInOccupants(cell)),
                OccupantKind::Scored(kind) if world.config.catalog.lookup(kind).is_none() => {
                    return Err(RestoreError::UnknownKind(kind.get()));
                }
                _ => {}
            }
            let id = world.occupants.spawn(placement.kind, cell);
            world.board.place(cell, id);
        }

        if !world.board.is_in_range(layout.player) {
            return Err(RestoreError::OutOfBounds(layout.player));
        }
        let player = world.occupants.spawn(OccupantKind::Player, layout.player);
        match world.board.at(layout.player) {
            Some(tile) if layout.player_on_tile => world.occupants.set_harbouring(tile, Some(player)),
            Some(_) => return Err(RestoreError::DuplicateCell(layout.player)),
            None => world.board.place(layout.player, player),
        }

        world.player = Some(player);
        world.score = layout.score;
        world.level = level_for_score(layout.score, world.config.points_per_level);
        world.push_count = layout.push_count;
        world.elapsed_seconds = layout.elapsed_seconds;
        world.status = GameStatus::Running;
        info!(
            "restored {}x{} board with {} occupants, score {}",
            world.config.width,
            world.config.height,
            world.occupants.len(),
            world.score
        );
        Ok(world)
    }

    fn start_fresh(&mut self, out_events: &mut Vec<Event>) {
        self.board = Board::new(self.config.width, self.config.height);
        self.occupants = OccupantRegistry::new();
        self.player = None;
        self.score = 0;
        self.level = 0;
        self.push_count = 0;
        self.elapsed_seconds = 0.0;
        self.last_pushed = None;
        self.status = GameStatus::Running;
        info!(
            "starting fresh {}x{} board",
            self.config.width, self.config.height
        );

        spawn::spawn_scored_objects(self, &[], out_events);

        if self.status == GameStatus::Running {
            match self.board.random_empty_cell(&mut self.rng, &[], false) {
                Some(cell) => {
                    let player = spawn::spawn_at(self, OccupantKind::Player, cell, out_events);
                    self.player = Some(player);
                }
                None => self.end_game(false, out_events),
            }
        }

        announce_loaded(self, out_events);
    }

    fn advance_time(&mut self, dt: std::time::Duration, out_events: &mut Vec<Event>) {
        self.elapsed_seconds += dt.as_secs_f32();
        out_events.push(Event::TimeAdvanced { dt });
        out_events.push(Event::ElapsedTimeChanged {
            seconds: self.elapsed_seconds,
        });
    }

    /// Ends the session once; later calls are ignored.
    pub(crate) fn end_game(&mut self, success: bool, out_events: &mut Vec<Event>) {
        if self.status != GameStatus::Running {
            return;
        }
        self.status = GameStatus::Complete { success };
        info!(
            "game complete: success={success} score={} elapsed={:.2}s",
            self.score, self.elapsed_seconds
        );
        out_events.push(Event::GameComplete {
            success,
            elapsed_seconds: self.elapsed_seconds,
        });
    }

    fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Everything except [`Command::StartFresh`] is ignored unless the session is
/// running.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartFresh => world.start_fresh(out_events),
        Command::MovePlayer { from, direction } => {
            let _ = move_player(world, from, direction, out_events);
        }
        Command::Tick { dt } => {
            if world.is_running() {
                world.advance_time(dt, out_events);
            }
        }
        Command::SpawnCube => {
            if world.is_running() {
                spawn::spawn_cube(world, out_events);
            }
        }
        Command::SpawnScoredObjects { exclude } => {
            if world.is_running() {
                spawn::spawn_scored_objects(world, &exclude, out_events);
            }
        }
        Command::CheckForLoss => {
            if world.is_running() {
                spawn::check_for_loss(world, out_events);
            }
        }
    }
}

/// Attempts to move the player from `from`, reporting how the move resolved.
pub fn move_player(
    world: &mut World,
    from: CellCoord,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> MoveOutcome {
    push::resolve_move(world, from, direction, out_events)
}

/// Emits the counter snapshot followed by [`Event::GameLoaded`].
pub fn announce_loaded(world: &World, out_events: &mut Vec<Event>) {
    out_events.push(Event::ScoreChanged {
        score: world.score,
        level: world.level,
    });
    out_events.push(Event::PushCountChanged {
        count: world.push_count,
    });
    out_events.push(Event::ElapsedTimeChanged {
        seconds: world.elapsed_seconds,
    });
    out_events.push(Event::GameLoaded);
}

/// Emits an [`Event::OccupantSpawned`] for everything currently on the board.
///
/// Used after [`World::restore`] so presentation layers can build their view
/// the same way they do for live spawns.
pub fn announce_layout(world: &World, out_events: &mut Vec<Event>) {
    for snapshot in query::occupants(world) {
        out_events.push(Event::OccupantSpawned {
            id: snapshot.id,
            kind: snapshot.kind,
            cell: snapshot.cell,
        });
    }
    if let Some(player) = world.player {
        let harboured = world
            .occupants
            .get(player)
            .filter(|record| world.board.at(record.cell) != Some(player));
        if let Some(record) = harboured {
            out_events.push(Event::OccupantSpawned {
                id: record.id,
                kind: record.kind,
                cell: record.cell,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cube_push_core::{CellCoord, GameStatus, OccupantId, OccupantKind};

    use super::{Catalog, GameConfig, World};

    /// Immutable view of a single board cell's occupant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OccupantSnapshot {
        /// Identifier allocated to the occupant.
        pub id: OccupantId,
        /// Kind of the occupant.
        pub kind: OccupantKind,
        /// Cell the occupant sits on.
        pub cell: CellCoord,
        /// Whether the player currently stands on this tile.
        pub has_player_on: bool,
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Scored object catalog in use.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.config.catalog
    }

    /// Board dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.board.dimensions()
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn is_in_range(world: &World, cell: CellCoord) -> bool {
        world.board.is_in_range(cell)
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Total points accumulated.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Highest level reached.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Number of successful pushes.
    #[must_use]
    pub fn push_count(world: &World) -> u32 {
        world.push_count
    }

    /// Seconds of play accumulated.
    #[must_use]
    pub fn elapsed_seconds(world: &World) -> f32 {
        world.elapsed_seconds
    }

    /// Occupant pushed most recently, which may no longer exist.
    #[must_use]
    pub fn last_pushed(world: &World) -> Option<OccupantId> {
        world.last_pushed
    }

    /// Cell the player occupies or harbours on.
    #[must_use]
    pub fn player_cell(world: &World) -> Option<CellCoord> {
        world
            .player
            .and_then(|player| world.occupants.get(player))
            .map(|record| record.cell)
    }

    /// Number of live occupants, including the player.
    #[must_use]
    pub fn occupant_count(world: &World) -> usize {
        world.occupants.len()
    }

    /// Describes the occupant referenced by the cell, if any.
    #[must_use]
    pub fn occupant_at(world: &World, cell: CellCoord) -> Option<OccupantSnapshot> {
        let id = world.board.at(cell)?;
        let record = world.occupants.get(id)?;
        Some(OccupantSnapshot {
            id,
            kind: record.kind,
            cell,
            has_player_on: record.harbouring.is_some(),
        })
    }

    /// Describes every occupied cell in row-major order.
    ///
    /// A harboured player is reported through `has_player_on` on its tile
    /// rather than as a separate entry.
    #[must_use]
    pub fn occupants(world: &World) -> Vec<OccupantSnapshot> {
        world
            .board
            .cells()
            .filter_map(|(cell, slot)| slot.map(|_| cell))
            .filter_map(|cell| occupant_at(world, cell))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_push_core::ObjectKind;

    fn small_config() -> GameConfig {
        GameConfig {
            width: 5,
            height: 5,
            ..GameConfig::default()
        }
    }

    #[test]
    fn config_rejects_empty_board() {
        let config = GameConfig {
            width: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyBoard {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn config_rejects_short_points_table() {
        let config = GameConfig {
            catalog: Catalog::new(vec![ObjectType::new(ObjectKind::new(2), "short", vec![1, 2])]),
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ShortPointsTable { kind: 2, len: 2 })
        );
    }

    #[test]
    fn config_rejects_reserved_codes() {
        let config = GameConfig {
            catalog: Catalog::new(vec![ObjectType::new(ObjectKind::new(1), "p", vec![1, 2, 3])]),
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ReservedKind(1)));
    }

    #[test]
    fn start_fresh_places_catalog_and_player() {
        let mut world = World::new(small_config()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::StartFresh, &mut events);

        assert_eq!(query::status(&world), GameStatus::Running);
        assert_eq!(query::occupant_count(&world), 3);
        assert!(query::player_cell(&world).is_some());
        assert_eq!(events.last(), Some(&Event::GameLoaded));
        let spawned = events
            .iter()
            .filter(|event| matches!(event, Event::OccupantSpawned { .. }))
            .count();
        assert_eq!(spawned, 3);
    }

    #[test]
    fn ticks_are_ignored_until_started() {
        let mut world = World::new(small_config()).expect("valid config");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: std::time::Duration::from_millis(500),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::elapsed_seconds(&world), 0.0);
    }

    #[test]
    fn restore_harbours_player_on_existing_tile() {
        let layout = RestoredLayout {
            score: 120,
            push_count: 4,
            elapsed_seconds: 3.5,
            occupants: vec![RestoredOccupant {
                cell: CellCoord::new(2, 2),
                kind: OccupantKind::Cube,
            }],
            player: CellCoord::new(2, 2),
            player_on_tile: true,
        };
        let world = World::restore(small_config(), layout).expect("restores");

        let tile = query::occupant_at(&world, CellCoord::new(2, 2)).expect("cube present");
        assert_eq!(tile.kind, OccupantKind::Cube);
        assert!(tile.has_player_on);
        assert_eq!(query::player_cell(&world), Some(CellCoord::new(2, 2)));
        assert_eq!(query::level(&world), 1);
        assert_eq!(query::occupants(&world).len(), 1);
    }

    #[test]
    fn restore_rejects_player_sharing_an_unflagged_tile() {
        let cell = CellCoord::new(3, 3);
        let layout = RestoredLayout {
            score: 0,
            push_count: 0,
            elapsed_seconds: 0.0,
            occupants: vec![RestoredOccupant {
                cell,
                kind: OccupantKind::Scored(ObjectKind::new(2)),
            }],
            player: cell,
            player_on_tile: false,
        };
        assert_eq!(
            World::restore(small_config(), layout).map(|_| ()),
            Err(RestoreError::DuplicateCell(cell))
        );
    }

    #[test]
    fn restore_rejects_finished_games() {
        let layout = RestoredLayout {
            score: DEFAULT_WINNING_SCORE,
            push_count: 12,
            elapsed_seconds: 30.0,
            occupants: Vec::new(),
            player: CellCoord::new(0, 0),
            player_on_tile: false,
        };
        assert_eq!(
            World::restore(small_config(), layout).map(|_| ()),
            Err(RestoreError::AlreadyComplete {
                score: DEFAULT_WINNING_SCORE,
                winning_score: DEFAULT_WINNING_SCORE,
            })
        );
    }

    #[test]
    fn restore_rejects_duplicate_cells() {
        let cell = CellCoord::new(1, 1);
        let layout = RestoredLayout {
            score: 0,
            push_count: 0,
            elapsed_seconds: 0.0,
            occupants: vec![
                RestoredOccupant {
                    cell,
                    kind: OccupantKind::Cube,
                },
                RestoredOccupant {
                    cell,
                    kind: OccupantKind::Cube,
                },
            ],
            player: CellCoord::new(0, 0),
            player_on_tile: false,
        };
        assert_eq!(
            World::restore(small_config(), layout).map(|_| ()),
            Err(RestoreError::DuplicateCell(cell))
        );
    }
}
