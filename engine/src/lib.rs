#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battle engine that wires the world to the heat decay and simulator systems.
//!
//! [`BattleEngine`] owns the authoritative [`World`] plus both pure systems
//! and exposes the boolean command surface used by interactive front ends.
//! Time only moves through [`BattleEngine::advance`], so callers decide
//! whether the clock follows the wall clock or a scripted schedule.

pub mod preferences;

use std::time::Duration;

use grid_battle_core::{
    CellCoord, CellRect, CellSnapshot, ChunkCoord, ChunkSnapshot, ChunkView, Command, Event,
    GridDimensions, Orientation, PlayerId, ShipSize, ShipView, ShotOutcome, Team, TeamStats,
    Timestamp, DECAY_INTERVAL,
};
use grid_battle_system_heat_decay::{self as heat_decay, HeatDecay};
use grid_battle_system_simulator::{self as simulator, BattleSimulator, Intensity};
use grid_battle_world::{self as world, query, World, WorldConfig};
use tracing::{debug, info};

pub use grid_battle_system_simulator::SimulationOptions;
pub use grid_battle_world::query::GridView;

/// Owner recorded for ships placed through the engine without a session.
pub const DEFAULT_PLAYER: &str = "player";

/// Parameters required to construct a [`BattleEngine`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Grid layout and cooldown applied by the world.
    pub world: WorldConfig,
    /// Interval between two heat decay passes.
    pub decay_interval: Duration,
    /// Load preset used when the simulator starts without an explicit one.
    pub intensity: Intensity,
    /// Seed for the simulator's random number generator.
    pub seed: u64,
    /// Owner of ships placed through [`BattleEngine::place_ship`].
    pub player: PlayerId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            decay_interval: DECAY_INTERVAL,
            intensity: Intensity::default(),
            seed: 0,
            player: PlayerId::new(DEFAULT_PLAYER),
        }
    }
}

/// Outcome counts for a batch of applied commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    /// Commands issued by the simulator.
    pub actions: usize,
    /// Ships successfully placed.
    pub placements: usize,
    /// Shots that resolved against an unhit cell.
    pub shots: usize,
    /// Resolved shots that struck a ship.
    pub hits: usize,
    /// Ships sunk by the batch.
    pub ships_destroyed: usize,
    /// Placements and shots refused by the world.
    pub rejected: usize,
}

impl SimulationSummary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ShipPlaced { .. } => self.placements += 1,
                Event::ShipPlacementRejected { .. } | Event::ShotRejected { .. } => {
                    self.rejected += 1;
                }
                Event::ShotResolved { outcome, .. } => {
                    self.shots += 1;
                    match outcome {
                        ShotOutcome::Miss => {}
                        ShotOutcome::Hit { .. } => self.hits += 1,
                        ShotOutcome::Destroyed { .. } => {
                            self.hits += 1;
                            self.ships_destroyed += 1;
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Work performed while advancing the clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Actions issued by the running simulator.
    pub simulation: SimulationSummary,
    /// Chunks whose activity dropped during decay passes.
    pub decayed_chunks: usize,
}

/// Single-threaded facade over the world and its systems.
#[derive(Debug)]
pub struct BattleEngine {
    world: World,
    heat_decay: HeatDecay,
    simulator: BattleSimulator,
    player: PlayerId,
}

impl BattleEngine {
    /// Creates an engine with empty grids, decay running, and the simulator idle.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let dimensions = config.world.dimensions;
        info!(
            side = dimensions.side(),
            chunk_side = dimensions.chunk_side(),
            seed = config.seed,
            "battle engine created"
        );
        Self {
            world: World::with_config(config.world),
            heat_decay: HeatDecay::new(heat_decay::Config::new(config.decay_interval)),
            simulator: BattleSimulator::new(simulator::Config::new(
                dimensions,
                config.intensity,
                config.seed,
            )),
            player: config.player,
        }
    }

    /// Places a ship on `team`'s grid and reports whether it was accepted.
    ///
    /// Sizes outside the legal ship range are refused without touching state.
    pub fn place_ship(&mut self, x: u32, y: u32, size: u32, horizontal: bool, team: Team) -> bool {
        let owner = self.player.clone();
        self.place_ship_as(owner, x, y, size, horizontal, team)
    }

    /// Places a ship owned by `owner` and reports whether it was accepted.
    pub fn place_ship_as(
        &mut self,
        owner: PlayerId,
        x: u32,
        y: u32,
        size: u32,
        horizontal: bool,
        team: Team,
    ) -> bool {
        let Some(size) = ShipSize::new(size) else {
            debug!(%team, size, "ship size outside legal range");
            return false;
        };

        let events = self.execute(Command::PlaceShip {
            team,
            owner,
            origin: CellCoord::new(x, y),
            size,
            orientation: Orientation::from_horizontal(horizontal),
        });
        events
            .iter()
            .any(|event| matches!(event, Event::ShipPlaced { .. }))
    }

    /// Fires at the opponent of `team` and reports whether the shot resolved.
    pub fn fire_shot(&mut self, x: u32, y: u32, team: Team) -> bool {
        let events = self.execute(Command::FireShot {
            team,
            target: CellCoord::new(x, y),
        });
        events
            .iter()
            .any(|event| matches!(event, Event::ShotResolved { .. }))
    }

    /// Applies `action_count` simulated actions immediately.
    pub fn simulate_battle(
        &mut self,
        action_count: usize,
        options: SimulationOptions,
    ) -> SimulationSummary {
        let mut commands = Vec::new();
        self.simulator.burst(action_count, options, &mut commands);

        let mut summary = SimulationSummary {
            actions: commands.len(),
            ..SimulationSummary::default()
        };
        for command in commands {
            let events = self.execute(command);
            summary.record(&events);
        }

        debug!(?summary, "simulated battle applied");
        summary
    }

    /// Advances the clock by `dt` and lets both systems react.
    ///
    /// While the simulator runs, `dt` is split at its batch boundaries so every
    /// batch is applied at the instant it fell due. Heat decay replays its own
    /// passes at their due instants, so splitting `dt` differently never
    /// changes the outcome.
    pub fn advance(&mut self, dt: Duration) -> TickReport {
        let mut report = TickReport::default();
        let mut remaining = dt;
        loop {
            let step = self
                .simulator
                .until_next_batch()
                .map_or(remaining, |next| next.min(remaining));
            self.step(step, &mut report);
            remaining = remaining.saturating_sub(step);
            if remaining.is_zero() {
                break;
            }
        }
        report
    }

    fn step(&mut self, dt: Duration, report: &mut TickReport) {
        let mut events = self.execute(Command::Tick { dt });

        loop {
            if events.is_empty() {
                break;
            }

            // Decay commands are applied before simulated shots so fresh
            // activity is never overwritten by a value computed before it.
            let mut commands = Vec::new();
            let world = &self.world;
            self.heat_decay
                .handle(&events, |team| query::chunk_view(world, team), &mut commands);
            let decay_commands = commands.len();
            self.simulator.handle(&events, &mut commands);
            report.simulation.actions += commands.len() - decay_commands;

            if commands.is_empty() {
                break;
            }

            events.clear();
            for command in commands {
                let generated = self.execute(command);
                report.simulation.record(&generated);
                report.decayed_chunks += generated
                    .iter()
                    .map(|event| match event {
                        Event::HeatDecayed { chunks, .. } => *chunks,
                        _ => 0,
                    })
                    .sum::<usize>();
                events.extend(generated);
            }
        }
    }

    /// Starts periodic simulated load at the requested intensity.
    pub fn start_simulation(&mut self, intensity: Intensity) {
        self.simulator.set_intensity(intensity);
        self.simulator.start();
        info!(%intensity, "battle simulation started");
    }

    /// Stops periodic simulated load. Already applied actions stay applied.
    pub fn stop_simulation(&mut self) {
        self.simulator.stop();
        info!(
            actions = self.simulator.actions_issued(),
            "battle simulation stopped"
        );
    }

    /// Reports whether periodic simulated load is running.
    #[must_use]
    pub fn is_simulating(&self) -> bool {
        self.simulator.is_running()
    }

    /// Total number of actions the simulator has issued.
    #[must_use]
    pub fn simulated_actions(&self) -> u64 {
        self.simulator.actions_issued()
    }

    /// Chunks the simulator concentrates its load on.
    #[must_use]
    pub fn hotspots(&self) -> &[ChunkCoord] {
        self.simulator.hotspots()
    }

    /// Resumes periodic heat decay.
    pub fn start_decay(&mut self) {
        self.heat_decay.start();
        info!("heat decay started");
    }

    /// Halts periodic heat decay.
    pub fn stop_decay(&mut self) {
        self.heat_decay.stop();
        info!("heat decay stopped");
    }

    /// Reports whether heat decay passes are scheduled.
    #[must_use]
    pub fn is_decaying(&self) -> bool {
        self.heat_decay.is_running()
    }

    /// Read-only view of a team's cells.
    #[must_use]
    pub fn grid(&self, team: Team) -> GridView<'_> {
        query::grid_view(&self.world, team)
    }

    /// Snapshot of one cell, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, team: Team, x: u32, y: u32) -> Option<CellSnapshot> {
        query::cell(&self.world, team, CellCoord::new(x, y))
    }

    /// Every chunk of a team in row-major order.
    #[must_use]
    pub fn chunks(&self, team: Team) -> ChunkView {
        query::chunk_view(&self.world, team)
    }

    /// Chunks intersecting the viewport, for culling.
    #[must_use]
    pub fn chunks_in(&self, team: Team, viewport: CellRect) -> Vec<ChunkSnapshot> {
        query::chunks_in(&self.world, team, viewport)
    }

    /// Every ship a team has placed, destroyed ones included.
    #[must_use]
    pub fn ships(&self, team: Team) -> ShipView {
        query::ship_view(&self.world, team)
    }

    /// Cumulative statistics of a team.
    #[must_use]
    pub fn stats(&self, team: Team) -> TeamStats {
        query::team_stats(&self.world, team)
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        query::now(&self.world)
    }

    /// Grid and chunk layout.
    #[must_use]
    pub fn dimensions(&self) -> GridDimensions {
        query::dimensions(&self.world)
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_engine() -> BattleEngine {
        BattleEngine::new(EngineConfig {
            world: WorldConfig {
                dimensions: GridDimensions::new(200, 100),
                ..WorldConfig::default()
            },
            ..EngineConfig::default()
        })
    }

    #[test]
    fn invalid_sizes_are_refused() {
        let mut engine = small_engine();
        assert!(!engine.place_ship(0, 0, 1, true, Team::Blue));
        assert!(!engine.place_ship(0, 0, 6, true, Team::Blue));
        assert_eq!(engine.stats(Team::Blue).total_ships, 0);
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = SimulationSummary::default();
        summary.record(&[
            Event::ShotResolved {
                team: Team::Red,
                target_team: Team::Blue,
                cell: CellCoord::new(0, 0),
                outcome: ShotOutcome::Miss,
            },
            Event::ShotResolved {
                team: Team::Red,
                target_team: Team::Blue,
                cell: CellCoord::new(1, 0),
                outcome: ShotOutcome::Destroyed {
                    ship: grid_battle_core::ShipId::new(3),
                },
            },
            Event::ShotRejected {
                team: Team::Red,
                cell: CellCoord::new(1, 0),
                reason: grid_battle_core::FireError::AlreadyHit,
            },
        ]);
        assert_eq!(summary.shots, 2);
        assert_eq!(summary.hits, 1);
        assert_eq!(summary.ships_destroyed, 1);
        assert_eq!(summary.rejected, 1);
    }

    #[test]
    fn placed_ships_carry_the_configured_owner() {
        let mut engine = BattleEngine::new(EngineConfig {
            world: WorldConfig {
                dimensions: GridDimensions::new(200, 100),
                ..WorldConfig::default()
            },
            player: PlayerId::new("grace"),
            ..EngineConfig::default()
        });
        assert!(engine.place_ship(3, 3, 3, false, Team::Red));
        assert_eq!(
            engine
                .grid(Team::Red)
                .owner_at(CellCoord::new(3, 4))
                .map(PlayerId::as_str),
            Some("grace")
        );
    }
}
