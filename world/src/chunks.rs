//! Chunk partitioning and relative heat ranking.
//!
//! Every team grid is covered by a row-major array of square chunks. Shots
//! bump the activity counter of the chunk they land in, and the heat level of
//! each chunk is re-ranked against the activity of all chunks of the same grid
//! after every change.

use grid_battle_core::{
    CellCoord, CellRect, ChunkActivityUpdate, ChunkCoord, ChunkSnapshot, GridDimensions,
    HeatLevel, Timestamp,
};

/// Share of active chunks ranked hot, in percent.
const HOT_PERCENT: usize = 20;
/// Share of active chunks ranked warm below the hot band, in percent.
const WARM_PERCENT: usize = 30;
/// Minimum size of the warm band.
const MIN_WARM_COUNT: usize = 2;
/// Fraction of the busiest chunk's activity below which a chunk stays cold.
const ACTIVE_FLOOR: f32 = 0.03;

/// Mutable state of a single chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ChunkState {
    pub(crate) activity: f32,
    pub(crate) last_activity: Timestamp,
    pub(crate) heat: HeatLevel,
}

/// Heat-map chunks covering one team grid without gaps or overlaps.
#[derive(Clone, Debug)]
pub(crate) struct ChunkMap {
    dimensions: GridDimensions,
    chunks: Vec<ChunkState>,
}

impl ChunkMap {
    pub(crate) fn new(dimensions: GridDimensions) -> Self {
        Self {
            dimensions,
            chunks: vec![ChunkState::default(); dimensions.chunk_count()],
        }
    }

    /// Chunk covering the provided cell.
    pub(crate) fn chunk_for(&self, cell: CellCoord) -> ChunkCoord {
        ChunkCoord::containing(cell, self.dimensions.chunk_side())
    }

    /// Counts one shot against the chunk covering `cell` and re-ranks heat.
    pub(crate) fn record_activity(&mut self, cell: CellCoord, now: Timestamp) -> ChunkCoord {
        let chunk = self.chunk_for(cell);
        if let Some(state) = self.get_mut(chunk) {
            state.activity += 1.0;
            state.last_activity = now;
        }
        self.recompute_heat();
        chunk
    }

    /// Lowers activity to the decayed values and re-ranks heat.
    ///
    /// Updates that would raise activity are ignored. Returns the number of
    /// chunks whose activity changed.
    pub(crate) fn apply_decay(&mut self, updates: &[ChunkActivityUpdate]) -> usize {
        let mut changed = 0;
        for update in updates {
            let Some(state) = self.get_mut(update.chunk) else {
                continue;
            };
            let activity = update.activity.max(0.0);
            if activity >= state.activity {
                continue;
            }

            state.activity = activity;
            if activity == 0.0 {
                state.heat = HeatLevel::Cold;
            }
            changed += 1;
        }

        if changed > 0 {
            self.recompute_heat();
        }
        changed
    }

    pub(crate) fn recompute_heat(&mut self) {
        recompute_heat_levels(&mut self.chunks);
    }

    pub(crate) fn snapshots(&self) -> Vec<ChunkSnapshot> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(index, state)| self.snapshot_at(index, state))
            .collect()
    }

    /// Snapshots only the chunks intersecting the viewport rectangle.
    pub(crate) fn snapshots_in(&self, viewport: CellRect) -> Vec<ChunkSnapshot> {
        let per_side = self.dimensions.chunks_per_side();
        if per_side == 0 || viewport.size().width() == 0 || viewport.size().height() == 0 {
            return Vec::new();
        }

        let chunk_side = self.dimensions.chunk_side();
        let first_column = viewport.origin().column() / chunk_side;
        let first_row = viewport.origin().row() / chunk_side;
        let last_column = ((viewport.column_end() - 1) / chunk_side).min(per_side - 1);
        let last_row = ((viewport.row_end() - 1) / chunk_side).min(per_side - 1);

        let mut snapshots = Vec::new();
        for row in first_row..=last_row {
            for column in first_column..=last_column {
                let chunk = ChunkCoord::new(column, row);
                if let Some(index) = self.index(chunk) {
                    snapshots.push(self.snapshot_at(index, &self.chunks[index]));
                }
            }
        }
        snapshots
    }

    fn snapshot_at(&self, index: usize, state: &ChunkState) -> ChunkSnapshot {
        let per_side = self.dimensions.chunks_per_side().max(1) as usize;
        ChunkSnapshot {
            chunk: ChunkCoord::new((index % per_side) as u32, (index / per_side) as u32),
            activity: state.activity,
            last_activity: state.last_activity,
            heat: state.heat,
        }
    }

    fn get_mut(&mut self, chunk: ChunkCoord) -> Option<&mut ChunkState> {
        self.index(chunk).and_then(|index| self.chunks.get_mut(index))
    }

    fn index(&self, chunk: ChunkCoord) -> Option<usize> {
        let per_side = self.dimensions.chunks_per_side();
        if chunk.column() < per_side && chunk.row() < per_side {
            let row = usize::try_from(chunk.row()).ok()?;
            let column = usize::try_from(chunk.column()).ok()?;
            let width = usize::try_from(per_side).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Re-ranks every chunk against the current activity distribution.
///
/// The top fifth of active chunks is hot, the next band (at least two chunks)
/// is warm, and anything above three percent of the busiest chunk is active.
/// Thresholds are read from the descending activity ranking, clamped to the
/// least active chunk.
pub(crate) fn recompute_heat_levels(chunks: &mut [ChunkState]) {
    let mut ranking: Vec<f32> = chunks
        .iter()
        .map(|chunk| chunk.activity)
        .filter(|activity| *activity > 0.0)
        .collect();

    if ranking.is_empty() {
        for chunk in chunks.iter_mut() {
            chunk.heat = HeatLevel::Cold;
        }
        return;
    }

    ranking.sort_by(|a, b| b.total_cmp(a));
    let active_count = ranking.len();
    let last = active_count - 1;
    let hot_count = (active_count * HOT_PERCENT / 100).max(1);
    let warm_count = (active_count * WARM_PERCENT / 100).max(MIN_WARM_COUNT);

    let hot_threshold = ranking[(hot_count - 1).min(last)];
    let warm_threshold = ranking[(hot_count + warm_count - 1).min(last)];
    let active_threshold = ACTIVE_FLOOR * ranking[0];

    for chunk in chunks.iter_mut() {
        let activity = chunk.activity;
        chunk.heat = if activity > 0.0 && activity >= hot_threshold {
            HeatLevel::Hot
        } else if activity > 0.0 && activity >= warm_threshold {
            HeatLevel::Warm
        } else if activity > 0.0 && activity >= active_threshold {
            HeatLevel::Active
        } else {
            HeatLevel::Cold
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks_with(activities: &[f32]) -> Vec<ChunkState> {
        activities
            .iter()
            .map(|activity| ChunkState {
                activity: *activity,
                ..ChunkState::default()
            })
            .collect()
    }

    fn levels(chunks: &[ChunkState]) -> Vec<u8> {
        chunks.iter().map(|chunk| chunk.heat.level()).collect()
    }

    #[test]
    fn idle_grid_stays_cold() {
        let mut chunks = chunks_with(&[0.0; 100]);
        recompute_heat_levels(&mut chunks);
        assert!(chunks.iter().all(|chunk| chunk.heat == HeatLevel::Cold));
    }

    #[test]
    fn single_active_chunk_is_hot() {
        let mut chunks = chunks_with(&[0.0, 4.0, 0.0]);
        recompute_heat_levels(&mut chunks);
        assert_eq!(levels(&chunks), vec![0, 3, 0]);
    }

    #[test]
    fn ten_active_chunks_split_into_bands() {
        // hot = 2, warm = 3: thresholds at ranks 1 and 4.
        let mut chunks = chunks_with(&[
            100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 2.0, 1.0, 0.0,
        ]);
        recompute_heat_levels(&mut chunks);
        assert_eq!(levels(&chunks), vec![3, 3, 2, 2, 2, 1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn ties_at_threshold_share_the_higher_band() {
        let mut chunks = chunks_with(&[5.0, 5.0, 5.0, 5.0, 5.0]);
        recompute_heat_levels(&mut chunks);
        assert!(chunks.iter().all(|chunk| chunk.heat == HeatLevel::Hot));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut chunks = chunks_with(&[12.0, 3.0, 0.5, 0.0, 7.0, 1.0, 30.0]);
        recompute_heat_levels(&mut chunks);
        let first = levels(&chunks);
        recompute_heat_levels(&mut chunks);
        assert_eq!(levels(&chunks), first);
    }

    #[test]
    fn record_activity_targets_containing_chunk() {
        let mut map = ChunkMap::new(GridDimensions::new(1_000, 100));
        let chunk = map.record_activity(CellCoord::new(250, 910), Timestamp::from_millis(42));
        assert_eq!(chunk, ChunkCoord::new(2, 9));

        let snapshots = map.snapshots();
        assert_eq!(snapshots.len(), 100);
        let touched = snapshots
            .iter()
            .find(|snapshot| snapshot.chunk == chunk)
            .expect("chunk present");
        assert_eq!(touched.activity, 1.0);
        assert_eq!(touched.last_activity, Timestamp::from_millis(42));
        assert_eq!(touched.heat, HeatLevel::Hot);
    }

    #[test]
    fn decay_to_zero_forces_cold() {
        let mut map = ChunkMap::new(GridDimensions::new(200, 100));
        let chunk = map.record_activity(CellCoord::new(0, 0), Timestamp::ZERO);
        let changed = map.apply_decay(&[ChunkActivityUpdate {
            chunk,
            activity: 0.0,
        }]);
        assert_eq!(changed, 1);
        let snapshot = map.snapshots()[0];
        assert_eq!(snapshot.activity, 0.0);
        assert_eq!(snapshot.heat, HeatLevel::Cold);
    }

    #[test]
    fn decay_never_raises_activity() {
        let mut map = ChunkMap::new(GridDimensions::new(200, 100));
        let chunk = map.record_activity(CellCoord::new(0, 0), Timestamp::ZERO);
        let changed = map.apply_decay(&[ChunkActivityUpdate {
            chunk,
            activity: 5.0,
        }]);
        assert_eq!(changed, 0);
        assert_eq!(map.snapshots()[0].activity, 1.0);
    }

    #[test]
    fn viewport_selects_intersecting_chunks() {
        let map = ChunkMap::new(GridDimensions::new(1_000, 100));
        let viewport = CellRect::from_origin_and_size(
            CellCoord::new(150, 250),
            grid_battle_core::CellRectSize::new(100, 60),
        );
        let chunks: Vec<ChunkCoord> = map
            .snapshots_in(viewport)
            .iter()
            .map(|snapshot| snapshot.chunk)
            .collect();
        assert_eq!(
            chunks,
            vec![
                ChunkCoord::new(1, 2),
                ChunkCoord::new(2, 2),
                ChunkCoord::new(1, 3),
                ChunkCoord::new(2, 3),
            ]
        );
    }
}
