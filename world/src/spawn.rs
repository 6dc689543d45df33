//! Cube and scored object spawning plus the stuck-occupant loss scan.

use cube_push_core::{CellCoord, Event, ObjectKind, OccupantId, OccupantKind};
use log::{debug, info};

use crate::World;

/// Places a cube on a random interior cell, ending the game when none is free.
pub(crate) fn spawn_cube(world: &mut World, out_events: &mut Vec<Event>) {
    match world.board.random_empty_cell(&mut world.rng, &[], true) {
        Some(cell) => {
            let _ = spawn_at(world, OccupantKind::Cube, cell, out_events);
        }
        None => {
            info!("no interior cell left for a cube");
            world.end_game(false, out_events);
        }
    }
}

/// Places one object per catalog entry, stopping at the first saturation.
pub(crate) fn spawn_scored_objects(
    world: &mut World,
    exclude: &[CellCoord],
    out_events: &mut Vec<Event>,
) {
    let kinds: Vec<ObjectKind> = world
        .config
        .catalog
        .entries()
        .iter()
        .map(|entry| entry.kind)
        .collect();

    for kind in kinds {
        match world.board.random_empty_cell(&mut world.rng, exclude, false) {
            Some(cell) => {
                let _ = spawn_at(world, OccupantKind::Scored(kind), cell, out_events);
            }
            None => {
                info!("no free cell left for type {}", kind.get());
                world.end_game(false, out_events);
                return;
            }
        }
    }
}

pub(crate) fn spawn_at(
    world: &mut World,
    kind: OccupantKind,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> OccupantId {
    let id = world.occupants.spawn(kind, cell);
    world.board.place(cell, id);
    debug!("spawned {kind:?} at {cell}");
    out_events.push(Event::OccupantSpawned { id, kind, cell });
    id
}

/// Removes the occupant and clears its cell if the cell still references it.
pub(crate) fn despawn(world: &mut World, id: OccupantId, out_events: &mut Vec<Event>) {
    let Some(record) = world.occupants.despawn(id) else {
        return;
    };
    if world.board.at(record.cell) == Some(id) {
        let _ = world.board.clear(record.cell);
    }
    out_events.push(Event::OccupantDespawned {
        id,
        cell: record.cell,
    });
}

/// Ends the game as lost when some tracked occupant has no free neighbour.
pub(crate) fn check_for_loss(world: &mut World, out_events: &mut Vec<Event>) {
    let stuck = world
        .board
        .cells()
        .filter_map(|(cell, slot)| slot.map(|id| (cell, id)))
        .find(|(cell, id)| is_stuck(world, *cell, *id));

    if let Some((cell, _)) = stuck {
        info!("occupant at {cell} is boxed in");
        world.end_game(false, out_events);
    }
}

fn is_stuck(world: &World, cell: CellCoord, id: OccupantId) -> bool {
    let Some(record) = world.occupants.get(id) else {
        return false;
    };
    if record.kind == OccupantKind::Cube && record.harbouring.is_none() {
        return false;
    }

    let mut blocked = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let neighbour = cell.translated(dx, dy);
            if !world.board.is_in_range(neighbour) {
                blocked += 1;
                continue;
            }
            let blocking = world
                .board
                .at(neighbour)
                .and_then(|other| world.occupants.kind_of(other))
                .is_some_and(|kind| !kind.is_pushable());
            if blocking {
                blocked += 1;
            }
        }
    }
    blocked == 8
}
