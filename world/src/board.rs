//! Dense occupancy grid backing the authoritative board.

use cube_push_core::{CellCoord, OccupantId};
use rand::Rng;

/// Row-major grid of occupant handles.
///
/// Every cell stores at most one handle. Out-of-range reads return `None` and
/// out-of-range writes are ignored so that internal neighbourhood scans can
/// read past the edges without pre-checking.
#[derive(Clone, Debug)]
pub(crate) struct Board {
    width: u32,
    height: u32,
    cells: Vec<Option<OccupantId>>,
}

impl Board {
    /// Creates an empty board with the provided dimensions.
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![None; capacity],
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reports whether the cell lies within `[0, width) x [0, height)`.
    pub(crate) fn is_in_range(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Returns the handle stored in the cell, if any.
    pub(crate) fn at(&self, cell: CellCoord) -> Option<OccupantId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn is_empty_at(&self, cell: CellCoord) -> bool {
        self.is_in_range(cell) && self.at(cell).is_none()
    }

    pub(crate) fn place(&mut self, cell: CellCoord, id: OccupantId) {
        if let Some(slot) = self.slot_mut(cell) {
            *slot = Some(id);
        }
    }

    /// Empties the cell, returning the handle it held.
    pub(crate) fn clear(&mut self, cell: CellCoord) -> Option<OccupantId> {
        self.slot_mut(cell).and_then(Option::take)
    }

    /// Exchanges the contents of two cells. Ignored unless both are in range.
    pub(crate) fn swap(&mut self, a: CellCoord, b: CellCoord) {
        if let (Some(first), Some(second)) = (self.index(a), self.index(b)) {
            self.cells.swap(first, second);
        }
    }

    /// Samples a uniformly random empty cell.
    ///
    /// Candidates are collected in row-major order before sampling so the
    /// choice only depends on board contents and the RNG state. Cells listed
    /// in `exclude` are never returned, and `skip_edges` removes the outer
    /// ring from consideration. Returns `None` once no candidate remains.
    pub(crate) fn random_empty_cell<R>(
        &self,
        rng: &mut R,
        exclude: &[CellCoord],
        skip_edges: bool,
    ) -> Option<CellCoord>
    where
        R: Rng,
    {
        let margin = i32::from(skip_edges);
        let width = i32::try_from(self.width).ok()?;
        let height = i32::try_from(self.height).ok()?;

        let mut candidates = Vec::new();
        for y in margin..height - margin {
            for x in margin..width - margin {
                let cell = CellCoord::new(x, y);
                if exclude.contains(&cell) {
                    continue;
                }
                if self.at(cell).is_none() {
                    candidates.push(cell);
                }
            }
        }

        if candidates.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..candidates.len());
        candidates.get(pick).copied()
    }

    /// Iterates every cell with its handle in row-major order.
    pub(crate) fn cells(&self) -> impl Iterator<Item = (CellCoord, Option<OccupantId>)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(index, slot)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let x = i32::try_from(index % width).unwrap_or(i32::MAX);
            let y = i32::try_from(index / width).unwrap_or(i32::MAX);
            (CellCoord::new(x, y), *slot)
        })
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut Option<OccupantId>> {
        let index = self.index(cell)?;
        self.cells.get_mut(index)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column < self.width && row < self.height {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
