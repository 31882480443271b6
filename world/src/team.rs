//! Per-team aggregate of grid, ships, chunks, and counters.

use grid_battle_core::{GridDimensions, TeamStats};

use crate::{chunks::ChunkMap, grid::CellGrid, ships::ShipRegistry};

/// Everything one team owns. The two teams never share state.
#[derive(Debug)]
pub(crate) struct TeamGridState {
    pub(crate) grid: CellGrid,
    pub(crate) ships: ShipRegistry,
    pub(crate) chunks: ChunkMap,
    pub(crate) total_hits: u32,
}

impl TeamGridState {
    pub(crate) fn new(dimensions: GridDimensions) -> Self {
        Self {
            grid: CellGrid::new(dimensions.side()),
            ships: ShipRegistry::new(),
            chunks: ChunkMap::new(dimensions),
            total_hits: 0,
        }
    }

    /// Derives the published statistics from the registry and the hit counter.
    pub(crate) fn stats(&self) -> TeamStats {
        let total = self.ships.len();
        let destroyed = self.ships.destroyed_count();
        let active = total.saturating_sub(destroyed);
        TeamStats::new(
            u32::try_from(total).unwrap_or(u32::MAX),
            self.total_hits,
            u32::try_from(destroyed).unwrap_or(u32::MAX),
            u32::try_from(active).unwrap_or(u32::MAX),
        )
    }
}
