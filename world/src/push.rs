//! Player move and push resolution.

use cube_push_core::{
    CellCoord, Direction, Event, GameStatus, MoveOutcome, MoveRejection, OccupantId, OccupantKind,
};
use log::debug;

use crate::{scoring, spawn, World};

/// Resolves a single move attempt and relocates the player when it succeeds.
///
/// Walking onto a cube is refused; the player may only stand on a cube it was
/// restored onto.
pub(crate) fn resolve_move(
    world: &mut World,
    from: CellCoord,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> MoveOutcome {
    if world.status != GameStatus::Running {
        return MoveOutcome::Rejected(MoveRejection::NotRunning);
    }
    let Some(player) = world.player else {
        return MoveOutcome::Rejected(MoveRejection::NotRunning);
    };
    if world.occupants.get(player).map(|record| record.cell) != Some(from) {
        debug!("move from {from} ignored, player is elsewhere");
        return MoveOutcome::Rejected(MoveRejection::NotPlayerCell);
    }

    let to = from.offset(direction);
    if !world.board.is_in_range(to) {
        return MoveOutcome::Rejected(MoveRejection::OutOfRange);
    }

    let outcome = match world.board.at(to) {
        None => MoveOutcome::Stepped,
        Some(target) => {
            let Some(kind) = world.occupants.kind_of(target) else {
                return MoveOutcome::Rejected(MoveRejection::Blocked);
            };
            if !kind.is_pushable() {
                return MoveOutcome::Rejected(MoveRejection::Blocked);
            }
            match push(world, target, kind, to, direction, out_events) {
                Ok(outcome) => outcome,
                Err(rejection) => return MoveOutcome::Rejected(rejection),
            }
        }
    };

    relocate_player(world, player, from, to, out_events);
    debug!("player moved {from} -> {to}: {outcome:?}");
    outcome
}

fn push(
    world: &mut World,
    pushed: OccupantId,
    kind: OccupantKind,
    to: CellCoord,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> Result<MoveOutcome, MoveRejection> {
    let push_to = to.offset(direction);
    if !world.board.is_in_range(push_to) {
        return Err(MoveRejection::OutOfRange);
    }

    let mut collided = None;
    let mut displaced = None;
    if let Some(other) = world.board.at(push_to) {
        let other_kind = world
            .occupants
            .kind_of(other)
            .ok_or(MoveRejection::Blocked)?;
        if !other_kind.is_pushable() {
            return Err(MoveRejection::Blocked);
        }
        if other_kind == kind {
            displaced = Some(other);
        } else {
            collided = Some(other);
        }
        let _ = world.board.clear(push_to);
    }

    world.board.swap(to, push_to);
    if let Some(record) = world.occupants.get_mut(pushed) {
        record.cell = push_to;
    }
    out_events.push(Event::OccupantMoved {
        id: pushed,
        from: to,
        to: push_to,
    });
    // A matching object is overwritten in place and not replaced.
    if let Some(other) = displaced {
        debug!("object at {push_to} overwritten by a matching push");
        spawn::despawn(world, other, out_events);
    }

    scoring::award(world, pushed, out_events);

    world.push_count = world.push_count.saturating_add(1);
    out_events.push(Event::PushCountChanged {
        count: world.push_count,
    });

    let Some(other) = collided else {
        return Ok(MoveOutcome::Pushed);
    };

    debug!("merge at {push_to}, respawning catalog");
    spawn::despawn(world, pushed, out_events);
    spawn::despawn(world, other, out_events);
    // `to` is about to hold the player, so it must stay free.
    spawn::spawn_scored_objects(world, &[to], out_events);
    Ok(MoveOutcome::Merged)
}

fn relocate_player(
    world: &mut World,
    player: OccupantId,
    from: CellCoord,
    to: CellCoord,
    out_events: &mut Vec<Event>,
) {
    match world.board.at(from) {
        Some(tile) if tile != player => world.occupants.set_harbouring(tile, None),
        _ => {
            let _ = world.board.clear(from);
        }
    }

    let destination = world
        .board
        .at(to)
        .filter(|tile| *tile != player)
        .and_then(|tile| world.occupants.kind_of(tile).map(|kind| (tile, kind)));
    match destination {
        Some((tile, kind)) if !kind.is_pushable() => {
            world.occupants.set_harbouring(tile, Some(player));
        }
        _ => world.board.place(to, player),
    }

    if let Some(record) = world.occupants.get_mut(player) {
        record.cell = to;
    }
    out_events.push(Event::OccupantMoved {
        id: player,
        from,
        to,
    });
}
