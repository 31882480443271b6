//! Dense per-team cell storage.

use grid_battle_core::{CellCoord, CellSnapshot, ShipId, Timestamp};

/// Mutable state of a single cell inside the world.
///
/// Occupancy is derived from `ship`, so a free cell can never carry a ship
/// reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CellState {
    pub(crate) ship: Option<ShipId>,
    pub(crate) hit: bool,
    pub(crate) cooldown_until: Option<Timestamp>,
}

impl CellState {
    pub(crate) fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            ship: self.ship,
            hit: self.hit,
            cooldown_until: self.cooldown_until,
        }
    }

    /// Extends the placement lockout. Earlier deadlines never replace later ones.
    pub(crate) fn extend_cooldown(&mut self, until: Timestamp) {
        self.cooldown_until = Some(self.cooldown_until.map_or(until, |current| current.max(until)));
    }
}

/// Square, row-major grid of cells owned by one team.
#[derive(Clone, Debug)]
pub(crate) struct CellGrid {
    side: u32,
    cells: Vec<CellState>,
}

impl CellGrid {
    pub(crate) fn new(side: u32) -> Self {
        let capacity_u64 = u64::from(side) * u64::from(side);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            side,
            cells: vec![CellState::default(); capacity],
        }
    }

    pub(crate) fn side(&self) -> u32 {
        self.side
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.side && cell.row() < self.side
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&CellState> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut CellState> {
        self.index(cell).and_then(|index| self.cells.get_mut(index))
    }

    /// Overwrites a cell. Callers validate bounds before mutating.
    pub(crate) fn set(&mut self, cell: CellCoord, state: CellState) {
        debug_assert!(self.contains(cell), "cell {cell:?} outside grid");
        if let Some(slot) = self.get_mut(cell) {
            *slot = state;
        }
    }

    pub(crate) fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.side).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn coord_of(&self, index: usize) -> CellCoord {
        let width = self.side.max(1) as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut grid = CellGrid::new(4);
        assert!(grid.get(CellCoord::new(4, 0)).is_none());
        assert!(grid.get(CellCoord::new(0, 4)).is_none());

        let cell = CellCoord::new(3, 2);
        grid.set(
            cell,
            CellState {
                ship: Some(ShipId::new(1)),
                ..CellState::default()
            },
        );
        assert_eq!(grid.get(cell).and_then(|state| state.ship), Some(ShipId::new(1)));
        assert_eq!(grid.index(cell), Some(11));
        assert_eq!(grid.coord_of(11), cell);
    }

    #[test]
    fn cooldown_only_moves_forward() {
        let mut cell = CellState::default();
        cell.extend_cooldown(Timestamp::from_millis(20_000));
        cell.extend_cooldown(Timestamp::from_millis(15_000));
        assert_eq!(cell.cooldown_until, Some(Timestamp::from_millis(20_000)));
        cell.extend_cooldown(Timestamp::from_millis(25_000));
        assert_eq!(cell.cooldown_until, Some(Timestamp::from_millis(25_000)));
    }
}
