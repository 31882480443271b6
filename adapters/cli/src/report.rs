//! Plain-text rendering of team statistics and chunk heat maps.

use std::fmt::Write as _;

use grid_battle_core::{ChunkView, HeatLevel, Team, TeamStats};
use grid_battle_engine::{SimulationSummary, TickReport};

/// Glyph drawn for each heat level, coldest first.
const HEAT_GLYPHS: [char; 4] = ['.', '-', '+', '#'];

pub(crate) fn heat_glyph(heat: HeatLevel) -> char {
    HEAT_GLYPHS[usize::from(heat.level())]
}

/// Renders a chunk view as one text row per chunk row.
pub(crate) fn heat_map(chunks: &ChunkView, chunks_per_side: u32) -> String {
    let width = chunks_per_side as usize;
    let mut rows = vec![vec![HEAT_GLYPHS[0]; width]; width];
    for chunk in chunks.iter() {
        let (column, row) = (chunk.chunk.column() as usize, chunk.chunk.row() as usize);
        if let Some(slot) = rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            *slot = heat_glyph(chunk.heat);
        }
    }

    let mut rendered = String::with_capacity(width * (width + 1));
    for row in rows {
        rendered.extend(row);
        rendered.push('\n');
    }
    rendered
}

pub(crate) fn stats_line(team: Team, stats: &TeamStats) -> String {
    format!(
        "{team:<5} ships {total:>6} active {active:>6} destroyed {destroyed:>6} hits {hits:>7} ratio {ratio:>3}",
        team = team.label(),
        total = stats.total_ships,
        active = stats.active_ships,
        destroyed = stats.destroyed_ships,
        hits = stats.total_hits,
        ratio = stats.hit_ratio,
    )
}

pub(crate) fn summary_line(label: &str, summary: &SimulationSummary) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "{label}: {actions} actions, {placements} placed, {shots} shots, {hits} hits, {sunk} sunk, {rejected} rejected",
        actions = summary.actions,
        placements = summary.placements,
        shots = summary.shots,
        hits = summary.hits,
        sunk = summary.ships_destroyed,
        rejected = summary.rejected,
    );
    line
}

/// Folds one tick report into a running total.
pub(crate) fn accumulate(total: &mut TickReport, report: &TickReport) {
    total.decayed_chunks += report.decayed_chunks;
    let (sum, add) = (&mut total.simulation, &report.simulation);
    sum.actions += add.actions;
    sum.placements += add.placements;
    sum.shots += add.shots;
    sum.hits += add.hits;
    sum.ships_destroyed += add.ships_destroyed;
    sum.rejected += add.rejected;
}
