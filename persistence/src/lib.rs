#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Save/resume codec for Cube Push boards.
//!
//! [`to_snapshot`] flattens a live world into a [`SaveSnapshot`] and
//! [`from_snapshot`] rebuilds a running world from one. The JSON layout is
//! fixed by the field names on [`SaveSnapshot`]; entry order carries no
//! meaning.

use cube_push_core::{CellCoord, OccupantKind};
use cube_push_world::{
    query, GameConfig, RestoreError, RestoredLayout, RestoredOccupant, World,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat, serializable description of a board and its session counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    /// Seconds of play accumulated before saving.
    pub total_time: f32,
    /// Pushes performed before saving.
    pub push_count: u32,
    /// Score accumulated before saving.
    pub point_count: u32,
    /// Board dimensions.
    pub map_size: MapSize,
    /// One entry per occupied cell.
    pub saved_map: Vec<SavedPresence>,
}

impl SaveSnapshot {
    /// Returns a copy with entries sorted by cell, for order-insensitive comparison.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized
            .saved_map
            .sort_by_key(|entry| (entry.pos.y(), entry.pos.x()));
        normalized
    }
}

/// Board width (`x`) and height (`y`) in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSize {
    /// Number of columns.
    pub x: i32,
    /// Number of rows.
    pub y: i32,
}

/// A single occupied cell in a [`SaveSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPresence {
    /// Cell the occupant sits on.
    pub pos: CellCoord,
    /// Persisted type code: cube `0`, player `1`, catalog kinds `2` and up.
    #[serde(rename = "type")]
    pub type_code: u32,
    /// Whether the player stands on this tile.
    pub has_player_on: bool,
}

/// Reasons a snapshot cannot be decoded or rebuilt.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The map size has no cells.
    #[error("map size {x}x{y} is not a valid board")]
    InvalidMapSize {
        /// Recorded width.
        x: i32,
        /// Recorded height.
        y: i32,
    },
    /// No entry places the player.
    #[error("snapshot does not place the player")]
    MissingPlayer,
    /// More than one entry places the player.
    #[error("player placed a second time at {0}")]
    MultiplePlayers(CellCoord),
    /// A player entry claims to harbour a player.
    #[error("player entry at {0} cannot carry the player flag")]
    PlayerFlagOnPlayer(CellCoord),
    /// The entries do not describe a consistent board.
    #[error("inconsistent layout: {0}")]
    Layout(#[from] RestoreError),
    /// The JSON text could not be read or written.
    #[error("malformed snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flattens the world into a snapshot, scanning cells in row-major order.
#[must_use]
pub fn to_snapshot(world: &World) -> SaveSnapshot {
    let (width, height) = query::dimensions(world);
    let saved_map = query::occupants(world)
        .into_iter()
        .map(|snapshot| SavedPresence {
            pos: snapshot.cell,
            type_code: snapshot.kind.type_code(),
            has_player_on: snapshot.has_player_on,
        })
        .collect();

    SaveSnapshot {
        total_time: query::elapsed_seconds(world),
        push_count: query::push_count(world),
        point_count: query::score(world),
        map_size: MapSize {
            x: i32::try_from(width).unwrap_or(i32::MAX),
            y: i32::try_from(height).unwrap_or(i32::MAX),
        },
        saved_map,
    }
}

/// Rebuilds a running world from a snapshot.
///
/// Board dimensions come from the snapshot; every other setting comes from
/// `base`. A player entry places the player on an otherwise empty cell, while
/// a non-player entry flagged with `hasPlayerOn` places the player on top of
/// it. Snapshots of finished games are rejected.
pub fn from_snapshot(snapshot: &SaveSnapshot, base: &GameConfig) -> Result<World, SnapshotError> {
    let MapSize { x, y } = snapshot.map_size;
    let (width, height) = match (u32::try_from(x), u32::try_from(y)) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => (width, height),
        _ => return Err(SnapshotError::InvalidMapSize { x, y }),
    };

    let mut player: Option<(CellCoord, bool)> = None;
    let mut occupants = Vec::with_capacity(snapshot.saved_map.len());
    for entry in &snapshot.saved_map {
        let kind = OccupantKind::from_type_code(entry.type_code);
        let places_player = match kind {
            OccupantKind::Player if entry.has_player_on => {
                return Err(SnapshotError::PlayerFlagOnPlayer(entry.pos));
            }
            OccupantKind::Player => true,
            _ => {
                occupants.push(RestoredOccupant {
                    cell: entry.pos,
                    kind,
                });
                entry.has_player_on
            }
        };
        if places_player {
            if player.is_some() {
                return Err(SnapshotError::MultiplePlayers(entry.pos));
            }
            player = Some((entry.pos, kind != OccupantKind::Player));
        }
    }
    let (player, player_on_tile) = player.ok_or(SnapshotError::MissingPlayer)?;

    let config = GameConfig {
        width,
        height,
        ..base.clone()
    };
    let layout = RestoredLayout {
        score: snapshot.point_count,
        push_count: snapshot.push_count,
        elapsed_seconds: snapshot.total_time,
        occupants,
        player,
        player_on_tile,
    };
    let world = World::restore(config, layout)?;
    info!(
        "loaded {}x{} snapshot with {} entries",
        width,
        height,
        snapshot.saved_map.len()
    );
    Ok(world)
}

/// Serializes the snapshot as pretty-printed JSON.
pub fn encode_json(snapshot: &SaveSnapshot) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parses a snapshot from JSON text.
pub fn decode_json(text: &str) -> Result<SaveSnapshot, SnapshotError> {
    serde_json::from_str(text).map_err(|error| {
        warn!("rejecting snapshot json: {error}");
        SnapshotError::Json(error)
    })
}
