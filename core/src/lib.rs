#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cube Push engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems and
//! observers react to deterministically.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Cube Push.";

/// Score at which a session completes successfully.
pub const DEFAULT_WINNING_SCORE: u32 = 400;

/// Number of points that separate consecutive levels.
pub const DEFAULT_POINTS_PER_LEVEL: u32 = 100;

/// Highest column consulted in a points-by-level table.
pub const MAX_POINTS_COLUMN: u32 = 2;

/// Type code reserved for cubes in persisted layouts.
pub const CUBE_TYPE_CODE: u32 = 0;

/// Type code reserved for the player in persisted layouts.
pub const PLAYER_TYPE_CODE: u32 = 1;

/// Derives the level reached for the provided score.
///
/// A `points_per_level` of zero pins every score to level zero.
#[must_use]
pub const fn level_for_score(score: u32, points_per_level: u32) -> u32 {
    if points_per_level == 0 {
        return 0;
    }
    score / points_per_level
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the world and populates a fresh board.
    StartFresh,
    /// Requests that the player step or push in the provided direction.
    MovePlayer {
        /// Cell the host believes the player currently occupies.
        from: CellCoord,
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a cube appear in a random interior cell.
    SpawnCube,
    /// Requests one fresh scored object per catalog entry.
    SpawnScoredObjects {
        /// Cells that must stay empty during this spawn pass.
        exclude: Vec<CellCoord>,
    },
    /// Requests a scan for occupants that can no longer escape.
    CheckForLoss,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Reports the running score together with the level it unlocked.
    ScoreChanged {
        /// Total points accumulated in the session.
        score: u32,
        /// Highest level reached in the session.
        level: u32,
    },
    /// Reports the number of successful pushes.
    PushCountChanged {
        /// Total pushes performed in the session.
        count: u32,
    },
    /// Reports the total simulated play time.
    ElapsedTimeChanged {
        /// Seconds of play accumulated in the session.
        seconds: f32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the session ended.
    GameComplete {
        /// Whether the winning score was reached.
        success: bool,
        /// Seconds of play accumulated when the session ended.
        elapsed_seconds: f32,
    },
    /// Announces that a session finished setting up and is ready for ticks.
    GameLoaded,
    /// Confirms that an occupant was placed on the board.
    OccupantSpawned {
        /// Identifier allocated to the occupant.
        id: OccupantId,
        /// Kind of occupant that was placed.
        kind: OccupantKind,
        /// Cell the occupant occupies after spawning.
        cell: CellCoord,
    },
    /// Confirms that an occupant moved between two cells.
    OccupantMoved {
        /// Identifier of the occupant that moved.
        id: OccupantId,
        /// Cell the occupant occupied before moving.
        from: CellCoord,
        /// Cell the occupant occupies after moving.
        to: CellCoord,
    },
    /// Confirms that an occupant was removed from the board.
    OccupantDespawned {
        /// Identifier of the removed occupant.
        id: OccupantId,
        /// Cell the occupant occupied before removal.
        cell: CellCoord,
    },
}

/// Location of a single board cell.
///
/// Coordinates are signed so that stepping off the board produces a value
/// that range checks can reject instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring cell one step in the provided direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.translated(dx, dy)
    }

    /// Returns the cell displaced by the provided column and row deltas.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit column and row step associated with the direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Parses a compass letter (`N`, `E`, `S`, `W`, case-insensitive).
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'N' => Some(Self::North),
            'E' => Some(Self::East),
            'S' => Some(Self::South),
            'W' => Some(Self::West),
            _ => None,
        }
    }
}

/// Catalog type code identifying a scored object kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKind(u32);

impl ObjectKind {
    /// Creates a new object kind wrapper around a catalog type code.
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Retrieves the persisted type code.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tagged variant over everything that can sit on a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantKind {
    /// Obstacle spawned on a timer; blocks pushes and movement.
    Cube,
    /// The single player-controlled occupant.
    Player,
    /// Pushable object that awards points when pushed.
    Scored(ObjectKind),
}

impl OccupantKind {
    /// Reports whether a player push can displace the occupant.
    #[must_use]
    pub const fn is_pushable(self) -> bool {
        matches!(self, Self::Scored(_))
    }

    /// Persisted type code for the kind.
    #[must_use]
    pub const fn type_code(self) -> u32 {
        match self {
            Self::Cube => CUBE_TYPE_CODE,
            Self::Player => PLAYER_TYPE_CODE,
            Self::Scored(kind) => kind.get(),
        }
    }

    /// Restores a kind from its persisted type code.
    #[must_use]
    pub const fn from_type_code(code: u32) -> Self {
        match code {
            CUBE_TYPE_CODE => Self::Cube,
            PLAYER_TYPE_CODE => Self::Player,
            other => Self::Scored(ObjectKind::new(other)),
        }
    }
}

/// Stable handle allocated by the world for each occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccupantId(u32);

impl OccupantId {
    /// Creates a new occupant identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Result of a single player move attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The player stepped into an empty cell.
    Stepped,
    /// The player pushed a scored object into a free cell.
    Pushed,
    /// The push collided two different kinds, which were destroyed and respawned.
    Merged,
    /// The move was refused and the board is unchanged.
    Rejected(MoveRejection),
}

impl MoveOutcome {
    /// Reports whether the player relocated as a result of the move.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Reasons a move attempt may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveRejection {
    /// No session is running.
    NotRunning,
    /// The provided origin is not the cell the player occupies.
    NotPlayerCell,
    /// The move or push would leave the board.
    OutOfRange,
    /// A cube, the player, or an object pushed into a cube blocks the move.
    Blocked,
}

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// No board has been populated yet.
    Idle,
    /// Moves and ticks are accepted.
    Running,
    /// The session ended; further moves and ticks are ignored.
    Complete {
        /// Whether the winning score was reached.
        success: bool,
    },
}
