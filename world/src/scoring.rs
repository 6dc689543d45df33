//! Push scoring and level progression.

use cube_push_core::{level_for_score, Event, OccupantId, OccupantKind};
use log::warn;

use crate::World;

/// Points deducted when the same occupant is pushed twice in a row.
const REPEAT_PUSH_PENALTY: i32 = 1;

/// Awards points for pushing `pushed` and ends the session on a win.
///
/// The points column is chosen from the level held before the push. Kinds
/// without a catalog entry award nothing.
pub(crate) fn award(world: &mut World, pushed: OccupantId, out_events: &mut Vec<Event>) {
    let mut delta = base_points(world, pushed);
    if world.last_pushed == Some(pushed) {
        delta -= REPEAT_PUSH_PENALTY;
    }
    world.last_pushed = Some(pushed);

    world.score = world.score.saturating_add_signed(delta);
    world.level = world
        .level
        .max(level_for_score(world.score, world.config.points_per_level));
    out_events.push(Event::ScoreChanged {
        score: world.score,
        level: world.level,
    });

    if world.score >= world.config.winning_score {
        world.end_game(true, out_events);
    }
}

fn base_points(world: &World, pushed: OccupantId) -> i32 {
    match world.occupants.kind_of(pushed) {
        Some(OccupantKind::Scored(kind)) => match world.config.catalog.lookup(kind) {
            Some(entry) => entry.points_at(world.level),
            None => {
                warn!("no catalog entry for type {}, awarding nothing", kind.get());
                0
            }
        },
        other => {
            warn!("pushed occupant {pushed:?} has no points table ({other:?})");
            0
        }
    }
}
