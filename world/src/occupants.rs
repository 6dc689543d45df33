//! Authoritative occupant state and identifier allocation.

use std::collections::BTreeMap;

use cube_push_core::{CellCoord, OccupantId, OccupantKind};

/// Record of a single occupant stored inside the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Occupant {
    pub(crate) id: OccupantId,
    pub(crate) kind: OccupantKind,
    /// Mirrors the board cell that references this occupant.
    pub(crate) cell: CellCoord,
    /// Player standing on this tile without displacing it.
    pub(crate) harbouring: Option<OccupantId>,
}

/// Registry that stores occupants and manages identifier allocation.
///
/// Identifiers are never reused, so a handle to a despawned occupant can be
/// compared safely but never resolves again.
#[derive(Clone, Debug)]
pub(crate) struct OccupantRegistry {
    entries: BTreeMap<OccupantId, Occupant>,
    next_id: OccupantId,
}

impl OccupantRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: OccupantId::new(0),
        }
    }

    /// Allocates a fresh identifier and records the occupant at `cell`.
    pub(crate) fn spawn(&mut self, kind: OccupantKind, cell: CellCoord) -> OccupantId {
        let id = self.next_id;
        self.next_id = OccupantId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Occupant {
                id,
                kind,
                cell,
                harbouring: None,
            },
        );
        id
    }

    pub(crate) fn despawn(&mut self, id: OccupantId) -> Option<Occupant> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: OccupantId) -> Option<&Occupant> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: OccupantId) -> Option<&mut Occupant> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn kind_of(&self, id: OccupantId) -> Option<OccupantKind> {
        self.get(id).map(|occupant| occupant.kind)
    }

    pub(crate) fn set_harbouring(&mut self, id: OccupantId, player: Option<OccupantId>) {
        if let Some(occupant) = self.get_mut(id) {
            occupant.harbouring = player;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
