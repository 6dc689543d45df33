//! ASCII rendering of a Cube Push board.

use cube_push_core::{CellCoord, OccupantKind};
use cube_push_world::{query, World};

const EMPTY: char = '.';
const CUBE: char = '#';
const PLAYER: char = '@';
const PLAYER_ON_TILE: char = '&';
const UNKNOWN_OBJECT: char = '?';

/// Renders the board with north at the top, one line per row.
pub(crate) fn render(world: &World) -> String {
    let (width, height) = query::dimensions(world);
    let mut out = String::new();

    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let height = i32::try_from(height).unwrap_or(i32::MAX);

    for y in (0..height).rev() {
        for x in 0..width {
            out.push(glyph(world, CellCoord::new(x, y)));
        }
        out.push('\n');
    }
    out
}

fn glyph(world: &World, cell: CellCoord) -> char {
    let Some(occupant) = query::occupant_at(world, cell) else {
        return EMPTY;
    };
    if occupant.has_player_on {
        return PLAYER_ON_TILE;
    }
    match occupant.kind {
        OccupantKind::Player => PLAYER,
        OccupantKind::Cube => CUBE,
        OccupantKind::Scored(kind) => query::catalog(world)
            .lookup(kind)
            .and_then(|entry| entry.name.chars().next())
            .map_or(UNKNOWN_OBJECT, |letter| letter.to_ascii_uppercase()),
    }
}

/// Legend matching the glyphs produced by [`render`].
pub(crate) fn legend(world: &World) -> String {
    let mut legend = format!("{PLAYER} player  {PLAYER_ON_TILE} player on tile  {CUBE} cube");
    for entry in query::catalog(world).entries() {
        if let Some(letter) = entry.name.chars().next() {
            legend.push_str(&format!("  {} {}", letter.to_ascii_uppercase(), entry.name));
        }
    }
    legend
}
