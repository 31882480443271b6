#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for the two team grids.
//!
//! All mutations flow through [`apply`], which validates a [`Command`],
//! updates the affected team atomically, and reports the outcome as
//! [`Event`] values. Read access goes through the [`query`] module.

mod chunks;
mod grid;
mod ships;
mod team;

use std::{collections::BTreeSet, time::Duration};

use grid_battle_core::{
    CellCoord, ChunkActivityUpdate, Command, Event, FireError, GridDimensions, Orientation,
    PlacementError, PlayerId, ShipSize, ShotOutcome, Team, Timestamp, COOLDOWN_DURATION,
};
use tracing::{debug, trace};

use crate::{
    grid::{CellGrid, CellState},
    team::TeamGridState,
};

/// Parameters fixed at world creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Grid and chunk edge lengths shared by both teams.
    pub dimensions: GridDimensions,
    /// Placement lockout applied around a destroyed ship.
    pub cooldown: Duration,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dimensions: GridDimensions::default(),
            cooldown: COOLDOWN_DURATION,
        }
    }
}

/// Represents the authoritative battle state of both teams.
#[derive(Debug)]
pub struct World {
    dimensions: GridDimensions,
    cooldown: Duration,
    now: Timestamp,
    teams: [TeamGridState; 2],
}

impl World {
    /// Creates a world with two empty full-size team grids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world with the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            dimensions: config.dimensions,
            cooldown: config.cooldown,
            now: Timestamp::ZERO,
            teams: [
                TeamGridState::new(config.dimensions),
                TeamGridState::new(config.dimensions),
            ],
        }
    }

    fn team(&self, team: Team) -> &TeamGridState {
        &self.teams[team.index()]
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamGridState {
        &mut self.teams[team.index()]
    }

    fn place_ship(
        &mut self,
        team: Team,
        owner: PlayerId,
        origin: CellCoord,
        size: ShipSize,
        orientation: Orientation,
        out_events: &mut Vec<Event>,
    ) {
        let now = self.now;
        let state = self.team_mut(team);
        let cells = match validate_footprint(&state.grid, origin, size, orientation, now) {
            Ok(cells) => cells,
            Err(reason) => {
                trace!(%team, ?origin, ?reason, "ship placement rejected");
                out_events.push(Event::ShipPlacementRejected {
                    team,
                    origin,
                    reason,
                });
                return;
            }
        };

        let ship = state.ships.create(owner, cells.clone());
        // Fresh ships start unhit even on cells struck by earlier misses.
        for cell in &cells {
            let previous = state.grid.get(*cell).copied().unwrap_or_default();
            state.grid.set(
                *cell,
                CellState {
                    ship: Some(ship),
                    hit: false,
                    ..previous
                },
            );
        }

        out_events.push(Event::ShipPlaced { team, ship, cells });
    }

    fn fire_shot(&mut self, team: Team, target: CellCoord, out_events: &mut Vec<Event>) {
        let target_team = team.opponent();
        let now = self.now;
        let cooldown_until = now.saturating_add(self.cooldown);
        let state = self.team_mut(target_team);

        let Some(cell) = state.grid.get(target).copied() else {
            trace!(%team, ?target, "shot outside grid rejected");
            out_events.push(Event::ShotRejected {
                team,
                cell: target,
                reason: FireError::OutOfBounds,
            });
            return;
        };

        // Attack traffic counts even when the shot turns out to be a repeat.
        let chunk = state.chunks.record_activity(target, now);
        out_events.push(Event::ChunkActivityRecorded {
            team: target_team,
            chunk,
        });

        if cell.hit {
            out_events.push(Event::ShotRejected {
                team,
                cell: target,
                reason: FireError::AlreadyHit,
            });
            return;
        }

        state.grid.set(target, CellState { hit: true, ..cell });
        state.total_hits = state.total_hits.saturating_add(1);

        let outcome = match cell.ship {
            None => ShotOutcome::Miss,
            Some(ship) => match state.ships.record_hit(ship) {
                Some(record) if record.sunk => {
                    if let Some(wreck) = state.ships.get(ship) {
                        release_wreck(&mut state.grid, &wreck.cells);
                        apply_cooldown(&mut state.grid, &wreck.cells, cooldown_until);
                    }
                    debug!(
                        team = %target_team,
                        ship = ship.get(),
                        hits = record.hits,
                        "ship destroyed"
                    );
                    out_events.push(Event::ShipDestroyed {
                        team: target_team,
                        ship,
                        cooldown_until,
                    });
                    ShotOutcome::Destroyed { ship }
                }
                Some(record) => {
                    trace!(
                        team = %target_team,
                        ship = ship.get(),
                        hits = record.hits,
                        destroyed = record.destroyed,
                        "ship hit"
                    );
                    ShotOutcome::Hit { ship }
                }
                None => ShotOutcome::Miss,
            },
        };

        out_events.push(Event::ShotResolved {
            team,
            target_team,
            cell: target,
            outcome,
        });
    }

    fn decay_chunks(
        &mut self,
        team: Team,
        updates: &[ChunkActivityUpdate],
        out_events: &mut Vec<Event>,
    ) {
        let changed = self.team_mut(team).chunks.apply_decay(updates);
        if changed > 0 {
            debug!(%team, chunks = changed, "chunk activity decayed");
        }
        out_events.push(Event::HeatDecayed {
            team,
            chunks: changed,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.now = world.now.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt, now: world.now });
        }
        Command::PlaceShip {
            team,
            owner,
            origin,
            size,
            orientation,
        } => world.place_ship(team, owner, origin, size, orientation, out_events),
        Command::FireShot { team, target } => world.fire_shot(team, target, out_events),
        Command::DecayChunkActivity { team, updates } => {
            world.decay_chunks(team, &updates, out_events);
        }
    }
}

fn validate_footprint(
    grid: &CellGrid,
    origin: CellCoord,
    size: ShipSize,
    orientation: Orientation,
    now: Timestamp,
) -> Result<Vec<CellCoord>, PlacementError> {
    let cells = orientation
        .footprint(origin, size)
        .ok_or(PlacementError::OutOfBounds)?;

    for cell in &cells {
        let state = grid.get(*cell).ok_or(PlacementError::OutOfBounds)?;
        if state.ship.is_some() {
            return Err(PlacementError::Occupied);
        }
        if !state.snapshot().accepts_ship_at(now) {
            return Err(PlacementError::CoolingDown);
        }
    }

    Ok(cells)
}

/// Frees the cells of a sunk ship. The registry keeps the ship for statistics.
fn release_wreck(grid: &mut CellGrid, wreck: &[CellCoord]) {
    for cell in wreck {
        if let Some(state) = grid.get_mut(*cell) {
            state.ship = None;
        }
    }
}

/// Locks the wreck and its Moore neighbourhood, clipped to the grid.
fn apply_cooldown(grid: &mut CellGrid, wreck: &[CellCoord], until: Timestamp) {
    let zone: BTreeSet<CellCoord> = wreck
        .iter()
        .flat_map(|cell| cell.moore_neighbourhood())
        .filter(|cell| grid.contains(*cell))
        .collect();

    for cell in zone {
        if let Some(state) = grid.get_mut(cell) {
            state.extend_cooldown(until);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use grid_battle_core::{
        CellCoord, CellRect, CellSnapshot, ChunkSnapshot, ChunkView, GridDimensions, PlayerId,
        ShipId, ShipSnapshot, ShipView, Team, TeamStats, Timestamp,
    };

    use super::{ships::ShipRegistry, CellGrid, World};

    /// Current world time.
    #[must_use]
    pub fn now(world: &World) -> Timestamp {
        world.now
    }

    /// Grid and chunk edge lengths shared by both teams.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.dimensions
    }

    /// Exposes a read-only view of a team's dense cell grid.
    #[must_use]
    pub fn grid_view(world: &World, team: Team) -> GridView<'_> {
        let state = world.team(team);
        GridView {
            grid: &state.grid,
            ships: &state.ships,
        }
    }

    /// Snapshot of a single cell, or `None` outside the grid.
    #[must_use]
    pub fn cell(world: &World, team: Team, cell: CellCoord) -> Option<CellSnapshot> {
        world.team(team).grid.get(cell).map(|state| state.snapshot())
    }

    /// Captures every chunk of a team grid in row-major order.
    #[must_use]
    pub fn chunk_view(world: &World, team: Team) -> ChunkView {
        ChunkView::from_snapshots(world.team(team).chunks.snapshots())
    }

    /// Captures only the chunks intersecting the viewport, in row-major order.
    #[must_use]
    pub fn chunks_in(world: &World, team: Team, viewport: CellRect) -> Vec<ChunkSnapshot> {
        world.team(team).chunks.snapshots_in(viewport)
    }

    /// Captures every ship ever placed by a team, destroyed ones included.
    #[must_use]
    pub fn ship_view(world: &World, team: Team) -> ShipView {
        ShipView::from_snapshots(world.team(team).ships.iter().map(|ship| ship.snapshot()).collect())
    }

    /// Snapshot of a single ship.
    #[must_use]
    pub fn ship(world: &World, team: Team, ship: ShipId) -> Option<ShipSnapshot> {
        world.team(team).ships.get(ship).map(|state| state.snapshot())
    }

    /// Derives the cumulative statistics of a team.
    #[must_use]
    pub fn team_stats(world: &World, team: Team) -> TeamStats {
        world.team(team).stats()
    }

    /// Read-only view into a team's dense cell grid.
    #[derive(Clone, Copy, Debug)]
    pub struct GridView<'a> {
        grid: &'a CellGrid,
        ships: &'a ShipRegistry,
    }

    impl<'a> GridView<'a> {
        /// Number of cells along each grid edge.
        #[must_use]
        pub fn side(&self) -> u32 {
            self.grid.side()
        }

        /// Returns the snapshot of the provided cell, if it lies inside the grid.
        #[must_use]
        pub fn cell(&self, cell: CellCoord) -> Option<CellSnapshot> {
            self.grid.get(cell).map(|state| state.snapshot())
        }

        /// Player that owns the ship covering `cell`, if any.
        #[must_use]
        pub fn owner_at(&self, cell: CellCoord) -> Option<&'a PlayerId> {
            let ship = self.grid.get(cell)?.ship?;
            self.ships.get(ship).map(|state| &state.owner)
        }

        /// Returns an iterator over all cells in row-major order.
        pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellSnapshot)> + 'a {
            let grid = self.grid;
            grid.cells()
                .iter()
                .enumerate()
                .map(move |(index, state)| (grid.coord_of(index), state.snapshot()))
        }

        /// Returns the cells inside the viewport, clipped to the grid, row by row.
        pub fn cells_in(&self, viewport: CellRect) -> impl Iterator<Item = (CellCoord, CellSnapshot)> + 'a {
            let grid = self.grid;
            let side = grid.side();
            let column_start = viewport.origin().column().min(side);
            let column_end = viewport.column_end().min(side);
            let row_start = viewport.origin().row().min(side);
            let row_end = viewport.row_end().min(side);

            (row_start..row_end).flat_map(move |row| {
                (column_start..column_end).filter_map(move |column| {
                    let cell = CellCoord::new(column, row);
                    grid.get(cell).map(|state| (cell, state.snapshot()))
                })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_battle_core::{CellRect, CellRectSize, HeatLevel, ShipId};

    fn small_world() -> World {
        World::with_config(WorldConfig {
            dimensions: GridDimensions::new(200, 100),
            cooldown: COOLDOWN_DURATION,
        })
    }

    fn place(
        world: &mut World,
        team: Team,
        column: u32,
        row: u32,
        size: u32,
        orientation: Orientation,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceShip {
                team,
                owner: PlayerId::new("tester"),
                origin: CellCoord::new(column, row),
                size: ShipSize::new(size).expect("valid size"),
                orientation,
            },
            &mut events,
        );
        events
    }

    fn fire(world: &mut World, team: Team, column: u32, row: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::FireShot {
                team,
                target: CellCoord::new(column, row),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn tick_advances_clock() {
        let mut world = small_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1_500),
            },
            &mut events,
        );
        assert_eq!(query::now(&world), Timestamp::from_millis(1_500));
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(1_500),
                now: Timestamp::from_millis(1_500),
            }]
        );
    }

    #[test]
    fn vertical_placement_occupies_column() {
        let mut world = small_world();
        let events = place(&mut world, Team::Red, 7, 3, 4, Orientation::Vertical);
        assert_eq!(
            events,
            vec![Event::ShipPlaced {
                team: Team::Red,
                ship: ShipId::new(0),
                cells: (3..7).map(|row| CellCoord::new(7, row)).collect(),
            }]
        );

        let view = query::grid_view(&world, Team::Red);
        for row in 3..7 {
            let cell = view.cell(CellCoord::new(7, row)).expect("inside grid");
            assert!(cell.occupied());
        }
        assert!(!view.cell(CellCoord::new(7, 7)).expect("inside grid").occupied());
        assert_eq!(
            view.owner_at(CellCoord::new(7, 5)).map(PlayerId::as_str),
            Some("tester")
        );
        assert!(!query::grid_view(&world, Team::Blue)
            .cell(CellCoord::new(7, 3))
            .expect("inside grid")
            .occupied());
    }

    #[test]
    fn placement_past_edge_is_rejected_without_changes() {
        let mut world = small_world();
        let events = place(&mut world, Team::Blue, 198, 0, 3, Orientation::Horizontal);
        assert_eq!(
            events,
            vec![Event::ShipPlacementRejected {
                team: Team::Blue,
                origin: CellCoord::new(198, 0),
                reason: PlacementError::OutOfBounds,
            }]
        );
        assert!(query::grid_view(&world, Team::Blue)
            .iter()
            .all(|(_, cell)| !cell.occupied()));
        assert_eq!(query::team_stats(&world, Team::Blue).total_ships, 0);
    }

    #[test]
    fn overlapping_placement_is_rejected() {
        let mut world = small_world();
        let _ = place(&mut world, Team::Blue, 10, 10, 3, Orientation::Horizontal);
        let events = place(&mut world, Team::Blue, 11, 8, 5, Orientation::Vertical);
        assert!(matches!(
            events.as_slice(),
            [Event::ShipPlacementRejected {
                reason: PlacementError::Occupied,
                ..
            }]
        ));
        assert_eq!(query::ship_view(&world, Team::Blue).into_vec().len(), 1);
    }

    #[test]
    fn shot_lands_on_opponent_grid() {
        let mut world = small_world();
        let _ = place(&mut world, Team::Blue, 0, 0, 2, Orientation::Horizontal);
        let _ = place(&mut world, Team::Red, 0, 0, 2, Orientation::Horizontal);

        let events = fire(&mut world, Team::Red, 0, 0);
        assert_eq!(
            events,
            vec![
                Event::ChunkActivityRecorded {
                    team: Team::Blue,
                    chunk: grid_battle_core::ChunkCoord::new(0, 0),
                },
                Event::ShotResolved {
                    team: Team::Red,
                    target_team: Team::Blue,
                    cell: CellCoord::new(0, 0),
                    outcome: ShotOutcome::Hit { ship: ShipId::new(0) },
                },
            ]
        );

        assert!(query::cell(&world, Team::Blue, CellCoord::new(0, 0)).expect("cell").hit);
        assert!(!query::cell(&world, Team::Red, CellCoord::new(0, 0)).expect("cell").hit);
        assert_eq!(query::team_stats(&world, Team::Blue).total_hits, 1);
        assert_eq!(query::team_stats(&world, Team::Red).total_hits, 0);
    }

    #[test]
    fn repeated_shot_only_records_activity() {
        let mut world = small_world();
        let _ = fire(&mut world, Team::Blue, 50, 50);
        let grid_before: Vec<_> = query::grid_view(&world, Team::Red).iter().collect();
        let stats_before = query::team_stats(&world, Team::Red);

        let events = fire(&mut world, Team::Blue, 50, 50);
        assert_eq!(
            events.last(),
            Some(&Event::ShotRejected {
                team: Team::Blue,
                cell: CellCoord::new(50, 50),
                reason: FireError::AlreadyHit,
            })
        );

        let grid_after: Vec<_> = query::grid_view(&world, Team::Red).iter().collect();
        assert_eq!(grid_before, grid_after);
        assert_eq!(stats_before, query::team_stats(&world, Team::Red));

        let chunks = query::chunk_view(&world, Team::Red);
        let chunk = chunks
            .get(grid_battle_core::ChunkCoord::new(0, 0))
            .expect("chunk exists");
        assert_eq!(chunk.activity, 2.0);
    }

    #[test]
    fn shot_outside_grid_changes_nothing() {
        let mut world = small_world();
        let events = fire(&mut world, Team::Blue, 200, 3);
        assert_eq!(
            events,
            vec![Event::ShotRejected {
                team: Team::Blue,
                cell: CellCoord::new(200, 3),
                reason: FireError::OutOfBounds,
            }]
        );
        assert!(query::chunk_view(&world, Team::Red)
            .iter()
            .all(|chunk| chunk.activity == 0.0));
    }

    #[test]
    fn destruction_locks_wreck_and_neighbourhood() {
        let mut world = small_world();
        let _ = place(&mut world, Team::Blue, 0, 5, 2, Orientation::Horizontal);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut events,
        );

        let _ = fire(&mut world, Team::Red, 0, 5);
        let events = fire(&mut world, Team::Red, 1, 5);
        let expected_until = Timestamp::from_millis(13_000);
        assert!(events.contains(&Event::ShipDestroyed {
            team: Team::Blue,
            ship: ShipId::new(0),
            cooldown_until: expected_until,
        }));

        let view = query::grid_view(&world, Team::Blue);
        let locked: Vec<CellCoord> = view
            .iter()
            .filter(|(_, cell)| cell.cooldown_until.is_some())
            .map(|(coord, _)| coord)
            .collect();
        let mut expected = Vec::new();
        for row in 4..=6 {
            for column in 0..=2 {
                expected.push(CellCoord::new(column, row));
            }
        }
        assert_eq!(locked, expected);
        assert!(view
            .iter()
            .filter_map(|(_, cell)| cell.cooldown_until)
            .all(|until| until == expected_until));

        let stats = query::team_stats(&world, Team::Blue);
        assert_eq!(stats.destroyed_ships, 1);
        assert_eq!(stats.active_ships, 0);
        assert_eq!(stats.hit_ratio, 50);
    }

    #[test]
    fn sunk_ship_frees_its_cells_but_stays_registered() {
        let mut world = small_world();
        let _ = place(&mut world, Team::Red, 40, 40, 2, Orientation::Vertical);
        let _ = fire(&mut world, Team::Blue, 40, 40);
        let _ = fire(&mut world, Team::Blue, 40, 41);

        for row in 40..=41 {
            let cell = query::cell(&world, Team::Red, CellCoord::new(40, row)).expect("cell");
            assert!(!cell.occupied());
            assert!(cell.hit);
        }
        let wreck = query::ship(&world, Team::Red, ShipId::new(0)).expect("ship kept");
        assert!(wreck.destroyed);
        assert_eq!(wreck.hits, 2);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: COOLDOWN_DURATION + Duration::from_millis(1),
            },
            &mut events,
        );
        let events = place(&mut world, Team::Red, 40, 40, 2, Orientation::Vertical);
        assert!(matches!(
            events.as_slice(),
            [Event::ShipPlaced { ship, .. }] if *ship == ShipId::new(1)
        ));
        let cell = query::cell(&world, Team::Red, CellCoord::new(40, 40)).expect("cell");
        assert!(cell.occupied());
        assert!(!cell.hit, "replacement ship starts unhit");
    }

    #[test]
    fn cooldown_blocks_placement_until_it_expires() {
        let mut world = small_world();
        let _ = place(&mut world, Team::Blue, 20, 20, 2, Orientation::Vertical);
        let _ = fire(&mut world, Team::Red, 20, 20);
        let _ = fire(&mut world, Team::Red, 20, 21);

        let events = place(&mut world, Team::Blue, 21, 22, 2, Orientation::Horizontal);
        assert!(matches!(
            events.as_slice(),
            [Event::ShipPlacementRejected {
                reason: PlacementError::CoolingDown,
                ..
            }]
        ));

        let mut tick_events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: COOLDOWN_DURATION,
            },
            &mut tick_events,
        );
        let events = place(&mut world, Team::Blue, 21, 22, 2, Orientation::Horizontal);
        assert!(matches!(
            events.as_slice(),
            [Event::ShipPlacementRejected {
                reason: PlacementError::CoolingDown,
                ..
            }]
        ));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1),
            },
            &mut tick_events,
        );
        let events = place(&mut world, Team::Blue, 21, 22, 2, Orientation::Horizontal);
        assert!(matches!(events.as_slice(), [Event::ShipPlaced { .. }]));
    }

    #[test]
    fn placement_leaves_chunk_activity_untouched() {
        let mut world = small_world();
        let _ = place(&mut world, Team::Blue, 5, 5, 5, Orientation::Horizontal);
        assert!(query::chunk_view(&world, Team::Blue)
            .iter()
            .all(|chunk| chunk.activity == 0.0 && chunk.heat == HeatLevel::Cold));
    }

    #[test]
    fn grid_view_viewport_is_clipped() {
        let world = small_world();
        let viewport =
            CellRect::from_origin_and_size(CellCoord::new(195, 198), CellRectSize::new(10, 10));
        let cells: Vec<CellCoord> = query::grid_view(&world, Team::Red)
            .cells_in(viewport)
            .map(|(coord, _)| coord)
            .collect();
        assert_eq!(cells.len(), 5 * 2);
        assert_eq!(cells.first(), Some(&CellCoord::new(195, 198)));
        assert_eq!(cells.last(), Some(&CellCoord::new(199, 199)));
    }

    #[test]
    fn decay_command_reports_changed_chunks() {
        let mut world = small_world();
        let _ = fire(&mut world, Team::Blue, 150, 150);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DecayChunkActivity {
                team: Team::Red,
                updates: vec![ChunkActivityUpdate {
                    chunk: grid_battle_core::ChunkCoord::new(1, 1),
                    activity: 0.0,
                }],
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::HeatDecayed {
                team: Team::Red,
                chunks: 1,
            }]
        );
        assert!(query::chunk_view(&world, Team::Red)
            .iter()
            .all(|chunk| chunk.heat == HeatLevel::Cold));
    }
}
