#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded battle simulator that emits synthetic placement and firing commands.
//!
//! The simulator is a load generator. It holds no battle state of its own:
//! every action is a plain [`Command`] validated and applied by the world like
//! any player input. Roughly 85% of actions are shots and 15% are ship
//! placements. A configurable share of them lands inside a handful of
//! hotspot chunks so the heat map develops visible structure.

use std::{fmt, str::FromStr, time::Duration};

use grid_battle_core::{
    elapsed_in, CellCoord, ChunkCoord, Command, Event, GridDimensions, Orientation, PlayerId,
    ShipSize, Team, Ticker, SHIP_SIZES,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Probability that a generated action is a shot rather than a placement.
pub const FIRE_SHARE: f64 = 0.85;

/// Default probability that a generated action targets a hotspot chunk.
pub const DEFAULT_HOTSPOT_SHARE: f32 = 0.6;

/// Hotspots expressed on a ten-by-ten chunk layout, rescaled to the grid.
const FIXED_HOTSPOTS: [(u32, u32); 3] = [(2, 2), (7, 3), (4, 7)];
const FIXED_HOTSPOT_LAYOUT: u32 = 10;

/// Number of hotspots drawn from the seeded generator on construction.
const RANDOM_HOTSPOTS: usize = 2;

/// Preset load levels; only volume and cadence differ between them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    /// A trickle of actions, one batch per second.
    Light,
    /// Steady skirmishing.
    #[default]
    Moderate,
    /// Sustained bombardment.
    Heavy,
    /// Stress-test volume.
    Extreme,
}

impl Intensity {
    /// Every preset in increasing order of load.
    pub const ALL: [Intensity; 4] = [
        Intensity::Light,
        Intensity::Moderate,
        Intensity::Heavy,
        Intensity::Extreme,
    ];

    /// Simulated time between two action batches.
    #[must_use]
    pub const fn interval(self) -> Duration {
        match self {
            Self::Light => Duration::from_millis(1_000),
            Self::Moderate => Duration::from_millis(500),
            Self::Heavy => Duration::from_millis(250),
            Self::Extreme => Duration::from_millis(100),
        }
    }

    /// Number of actions issued per batch.
    #[must_use]
    pub const fn actions_per_tick(self) -> usize {
        match self {
            Self::Light => 10,
            Self::Moderate => 25,
            Self::Heavy => 60,
            Self::Extreme => 150,
        }
    }

    /// Lowercase label used in configuration files and arguments.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
            Self::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when an intensity label cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown intensity '{0}', expected light, moderate, heavy or extreme")]
pub struct ParseIntensityError(String);

impl FromStr for Intensity {
    type Err = ParseIntensityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|intensity| intensity.label() == normalized)
            .ok_or_else(|| ParseIntensityError(value.to_owned()))
    }
}

/// Configuration parameters required to construct the simulator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    dimensions: GridDimensions,
    intensity: Intensity,
    rng_seed: u64,
    hotspot_share: f32,
}

impl Config {
    /// Creates a configuration for the provided grid, load level, and seed.
    #[must_use]
    pub const fn new(dimensions: GridDimensions, intensity: Intensity, rng_seed: u64) -> Self {
        Self {
            dimensions,
            intensity,
            rng_seed,
            hotspot_share: DEFAULT_HOTSPOT_SHARE,
        }
    }

    /// Overrides the share of periodic actions aimed at hotspots.
    #[must_use]
    pub const fn with_hotspot_share(mut self, hotspot_share: f32) -> Self {
        self.hotspot_share = hotspot_share;
        self
    }
}

/// Per-call overrides for a one-shot burst of actions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationOptions {
    /// Restricts every action to this acting team; both teams act otherwise.
    pub team: Option<Team>,
    /// Probability in `0.0..=1.0` that an action targets a hotspot chunk.
    pub hotspot_share: f32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            team: None,
            hotspot_share: DEFAULT_HOTSPOT_SHARE,
        }
    }
}

/// Pure system that deterministically generates battle actions.
#[derive(Debug)]
pub struct BattleSimulator {
    dimensions: GridDimensions,
    intensity: Intensity,
    hotspot_share: f32,
    ticker: Ticker,
    rng: ChaCha8Rng,
    hotspots: Vec<ChunkCoord>,
    actions_issued: u64,
}

impl BattleSimulator {
    /// Creates an idle simulator; call [`BattleSimulator::start`] to begin periodic load.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let hotspots = pick_hotspots(config.dimensions, &mut rng);
        Self {
            dimensions: config.dimensions,
            intensity: config.intensity,
            hotspot_share: config.hotspot_share,
            ticker: Ticker::stopped(config.intensity.interval()),
            rng,
            hotspots,
            actions_issued: 0,
        }
    }

    /// Starts issuing periodic batches.
    pub fn start(&mut self) {
        self.ticker.start();
    }

    /// Stops issuing batches. Actions already emitted are unaffected.
    pub fn stop(&mut self) {
        self.ticker.stop();
    }

    /// Reports whether periodic batches are scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// Active load preset.
    #[must_use]
    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    /// Switches the load preset, taking effect from the next batch.
    pub fn set_intensity(&mut self, intensity: Intensity) {
        self.intensity = intensity;
        self.ticker.set_interval(intensity.interval());
    }

    /// Simulated time until the next batch, or `None` while stopped.
    #[must_use]
    pub fn until_next_batch(&self) -> Option<Duration> {
        self.ticker.until_next()
    }

    /// Chunks favoured by hotspot-targeted actions.
    #[must_use]
    pub fn hotspots(&self) -> &[ChunkCoord] {
        &self.hotspots
    }

    /// Total number of actions emitted since construction.
    #[must_use]
    pub fn actions_issued(&self) -> u64 {
        self.actions_issued
    }

    /// Consumes world events and emits one batch per elapsed interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let batches = self.ticker.advance(elapsed_in(events));
        if batches == 0 {
            return;
        }

        let options = SimulationOptions {
            team: None,
            hotspot_share: self.hotspot_share,
        };
        let count = self.intensity.actions_per_tick() * batches as usize;
        self.emit(count, options, out);
    }

    /// Emits `action_count` actions immediately, independent of the schedule.
    pub fn burst(&mut self, action_count: usize, options: SimulationOptions, out: &mut Vec<Command>) {
        debug!(
            actions = action_count,
            team = ?options.team,
            hotspot_share = options.hotspot_share,
            "simulating battle burst"
        );
        self.emit(action_count, options, out);
    }

    fn emit(&mut self, count: usize, options: SimulationOptions, out: &mut Vec<Command>) {
        if self.dimensions.side() == 0 {
            return;
        }

        let hotspot_share = if options.hotspot_share.is_nan() {
            0.0
        } else {
            f64::from(options.hotspot_share.clamp(0.0, 1.0))
        };
        out.reserve(count);
        for _ in 0..count {
            let team = options
                .team
                .unwrap_or_else(|| Team::ALL[self.rng.gen_range(0..Team::ALL.len())]);
            let cell = if self.rng.gen_bool(hotspot_share) {
                self.hotspot_cell()
            } else {
                self.random_cell()
            };

            let command = if self.rng.gen_bool(FIRE_SHARE) {
                Command::FireShot { team, target: cell }
            } else {
                self.placement(team, cell)
            };
            out.push(command);
            self.actions_issued = self.actions_issued.saturating_add(1);
        }
    }

    fn placement(&mut self, team: Team, origin: CellCoord) -> Command {
        let cells = SHIP_SIZES[self.rng.gen_range(0..SHIP_SIZES.len())];
        let size = ShipSize::new(u32::from(cells)).unwrap_or(ShipSize::MIN);
        let orientation = Orientation::from_horizontal(self.rng.gen_bool(0.5));
        Command::PlaceShip {
            team,
            owner: PlayerId::simulator(team),
            origin,
            size,
            orientation,
        }
    }

    fn random_cell(&mut self) -> CellCoord {
        let side = self.dimensions.side();
        CellCoord::new(self.rng.gen_range(0..side), self.rng.gen_range(0..side))
    }

    fn hotspot_cell(&mut self) -> CellCoord {
        if self.hotspots.is_empty() {
            return self.random_cell();
        }

        let chunk = self.hotspots[self.rng.gen_range(0..self.hotspots.len())];
        let bounds = self.dimensions.chunk_bounds(chunk);
        let size = bounds.size();
        if size.width() == 0 || size.height() == 0 {
            return self.random_cell();
        }

        CellCoord::new(
            bounds.origin().column() + self.rng.gen_range(0..size.width()),
            bounds.origin().row() + self.rng.gen_range(0..size.height()),
        )
    }
}

fn pick_hotspots(dimensions: GridDimensions, rng: &mut ChaCha8Rng) -> Vec<ChunkCoord> {
    let per_side = dimensions.chunks_per_side();
    if per_side == 0 {
        return Vec::new();
    }

    let mut hotspots: Vec<ChunkCoord> = FIXED_HOTSPOTS
        .iter()
        .map(|&(column, row)| {
            ChunkCoord::new(
                column * per_side / FIXED_HOTSPOT_LAYOUT,
                row * per_side / FIXED_HOTSPOT_LAYOUT,
            )
        })
        .collect();

    for _ in 0..RANDOM_HOTSPOTS {
        hotspots.push(ChunkCoord::new(
            rng.gen_range(0..per_side),
            rng.gen_range(0..per_side),
        ));
    }

    hotspots.sort();
    hotspots.dedup();
    hotspots
}
