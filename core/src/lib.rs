#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the grid battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells along each edge of a team grid.
pub const GRID_SIDE: u32 = 1_000;

/// Number of cells along each edge of a heat-map chunk.
pub const CHUNK_SIDE: u32 = 100;

/// Ship lengths accepted by placement requests.
pub const SHIP_SIZES: [u8; 4] = [2, 3, 4, 5];

/// Length of the placement lockout applied around a destroyed ship.
pub const COOLDOWN_DURATION: Duration = Duration::from_millis(10_000);

/// Interval between two heat decay passes.
pub const DECAY_INTERVAL: Duration = Duration::from_millis(10_000);

/// One of the two opposing sides, each owning a private grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The blue side.
    Blue,
    /// The red side.
    Red,
}

impl Team {
    /// Both teams in their canonical order.
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    /// Returns the team whose grid receives this team's shots.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }

    /// Stable index of the team, usable for fixed-size per-team storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Blue => 0,
            Self::Red => 1,
        }
    }

    /// Lowercase label used for persistence and display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a team label cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown team '{0}', expected 'blue' or 'red'")]
pub struct ParseTeamError(String);

impl FromStr for Team {
    type Err = ParseTeamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blue" => Ok(Self::Blue),
            "red" => Ok(Self::Red),
            _ => Err(ParseTeamError(value.to_owned())),
        }
    }
}

/// Identifier of the player that owns a ship.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player identifier from the provided label.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Identifier used for ships placed by the battle simulator.
    #[must_use]
    pub fn simulator(team: Team) -> Self {
        Self(format!("simulator-{}", team.label()))
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point on the world clock measured in whole milliseconds since world creation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The instant the world was created.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Creates a timestamp from a millisecond offset.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Millisecond offset since world creation.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp shifted forward by `duration`, saturating at the maximum.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Returns the timestamp shifted back by `duration`, saturating at [`Timestamp::ZERO`].
    #[must_use]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_sub(millis))
    }

    /// Time elapsed from `earlier` to `self`, or zero when `earlier` is later.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Enumerates the cell itself and its eight Moore neighbours, skipping
    /// coordinates that would underflow. Upper bounds are left to the caller.
    pub fn moore_neighbourhood(self) -> impl Iterator<Item = CellCoord> {
        (-1i64..=1).flat_map(move |row_offset| {
            (-1i64..=1).filter_map(move |column_offset| {
                let column = u32::try_from(i64::from(self.column) + column_offset).ok()?;
                let row = u32::try_from(i64::from(self.row) + row_offset).ok()?;
                Some(CellCoord::new(column, row))
            })
        })
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Column one past the right edge of the rectangle.
    #[must_use]
    pub const fn column_end(&self) -> u32 {
        self.origin.column().saturating_add(self.size.width())
    }

    /// Row one past the bottom edge of the rectangle.
    #[must_use]
    pub const fn row_end(&self) -> u32 {
        self.origin.row().saturating_add(self.size.height())
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= self.origin.column()
            && cell.column() < self.column_end()
            && cell.row() >= self.origin.row()
            && cell.row() < self.row_end()
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Location of a heat-map chunk expressed in chunk units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    column: u32,
    row: u32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based chunk column.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based chunk row.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Chunk that covers the provided cell for the given chunk edge length.
    ///
    /// A zero `chunk_side` is treated as one so the division is always defined.
    #[must_use]
    pub const fn containing(cell: CellCoord, chunk_side: u32) -> Self {
        let side = if chunk_side == 0 { 1 } else { chunk_side };
        Self {
            column: cell.column() / side,
            row: cell.row() / side,
        }
    }
}

/// Edge lengths of a team grid and of the chunks partitioning it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    side: u32,
    chunk_side: u32,
}

impl GridDimensions {
    /// Creates a new descriptor; a zero chunk side is promoted to one.
    #[must_use]
    pub const fn new(side: u32, chunk_side: u32) -> Self {
        let chunk_side = if chunk_side == 0 { 1 } else { chunk_side };
        Self { side, chunk_side }
    }

    /// Number of cells along each grid edge.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Number of cells along each chunk edge.
    #[must_use]
    pub const fn chunk_side(&self) -> u32 {
        self.chunk_side
    }

    /// Number of chunks along each grid edge. A trailing partial chunk counts.
    #[must_use]
    pub const fn chunks_per_side(&self) -> u32 {
        self.side.div_ceil(self.chunk_side)
    }

    /// Total number of chunks covering the grid.
    #[must_use]
    pub const fn chunk_count(&self) -> usize {
        let per_side = self.chunks_per_side() as usize;
        per_side * per_side
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        let side = self.side as usize;
        side * side
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.side && cell.row() < self.side
    }

    /// Cell rectangle covered by the provided chunk, clipped to the grid.
    #[must_use]
    pub fn chunk_bounds(&self, chunk: ChunkCoord) -> CellRect {
        let column = chunk.column().saturating_mul(self.chunk_side).min(self.side);
        let row = chunk.row().saturating_mul(self.chunk_side).min(self.side);
        let width = self.chunk_side.min(self.side - column);
        let height = self.chunk_side.min(self.side - row);
        CellRect::from_origin_and_size(
            CellCoord::new(column, row),
            CellRectSize::new(width, height),
        )
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self::new(GRID_SIDE, CHUNK_SIDE)
    }
}

/// Unique identifier assigned to a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(u32);

impl ShipId {
    /// Creates a new ship identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Number of cells a ship spans; always one of [`SHIP_SIZES`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipSize(u8);

impl ShipSize {
    /// Smallest accepted ship.
    pub const MIN: ShipSize = ShipSize(2);
    /// Largest accepted ship.
    pub const MAX: ShipSize = ShipSize(5);

    /// Validates the requested length, returning `None` outside `2..=5`.
    #[must_use]
    pub fn new(cells: u32) -> Option<Self> {
        let cells = u8::try_from(cells).ok()?;
        SHIP_SIZES.contains(&cells).then_some(Self(cells))
    }

    /// Number of cells covered by the ship.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Axis along which a ship extends from its origin cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Cells extend toward increasing columns.
    Horizontal,
    /// Cells extend toward increasing rows.
    Vertical,
}

impl Orientation {
    /// Maps the boolean `horizontal` flag used by input layers.
    #[must_use]
    pub const fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    /// Lists the contiguous cells covered by a ship anchored at `origin`.
    ///
    /// Returns `None` when the footprint would overflow the coordinate space.
    /// Grid bounds are not checked here.
    #[must_use]
    pub fn footprint(self, origin: CellCoord, size: ShipSize) -> Option<Vec<CellCoord>> {
        (0..u32::from(size.get()))
            .map(|offset| match self {
                Self::Horizontal => origin
                    .column()
                    .checked_add(offset)
                    .map(|column| CellCoord::new(column, origin.row())),
                Self::Vertical => origin
                    .row()
                    .checked_add(offset)
                    .map(|row| CellCoord::new(origin.column(), row)),
            })
            .collect()
    }
}

/// Relative activity rank of a chunk within its team grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeatLevel {
    /// No recent attack traffic, or too little to register.
    #[default]
    Cold,
    /// Above the noise floor of three percent of the busiest chunk.
    Active,
    /// Within the warm band below the hottest chunks.
    Warm,
    /// Among the busiest fifth of active chunks.
    Hot,
}

impl HeatLevel {
    /// Numeric level in `0..=3`.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Cold => 0,
            Self::Active => 1,
            Self::Warm => 2,
            Self::Hot => 3,
        }
    }
}

/// New activity value computed for a chunk by the heat decay pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkActivityUpdate {
    /// Chunk whose activity is overwritten.
    pub chunk: ChunkCoord,
    /// Decayed activity count; zero clears the chunk.
    pub activity: f32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the world clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a ship on the acting team's own grid.
    PlaceShip {
        /// Team whose grid receives the ship.
        team: Team,
        /// Player recorded as the ship's owner.
        owner: PlayerId,
        /// First cell of the ship.
        origin: CellCoord,
        /// Number of cells the ship covers.
        size: ShipSize,
        /// Direction in which the ship extends from `origin`.
        orientation: Orientation,
    },
    /// Requests a shot from the acting team onto the opponent's grid.
    FireShot {
        /// Team pulling the trigger.
        team: Team,
        /// Cell targeted on the opponent's grid.
        target: CellCoord,
    },
    /// Overwrites decayed chunk activity for one team and re-ranks its heat.
    DecayChunkActivity {
        /// Team whose chunks decayed.
        team: Team,
        /// Per-chunk activity values replacing the current ones.
        updates: Vec<ChunkActivityUpdate>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the world clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// World time after the tick.
        now: Timestamp,
    },
    /// Confirms that a ship was registered on a team grid.
    ShipPlaced {
        /// Team that owns the grid holding the ship.
        team: Team,
        /// Identifier allocated to the ship.
        ship: ShipId,
        /// Cells covered by the ship, in order from the origin.
        cells: Vec<CellCoord>,
    },
    /// Reports that a ship placement request was rejected without side effects.
    ShipPlacementRejected {
        /// Team that requested the placement.
        team: Team,
        /// Origin cell provided in the request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that a shot increased the activity of a chunk.
    ChunkActivityRecorded {
        /// Team whose grid contains the chunk.
        team: Team,
        /// Chunk that absorbed the activity.
        chunk: ChunkCoord,
    },
    /// Confirms that a shot resolved a previously untouched cell.
    ShotResolved {
        /// Team that fired.
        team: Team,
        /// Team whose grid was struck.
        target_team: Team,
        /// Cell that was struck.
        cell: CellCoord,
        /// What the shot struck.
        outcome: ShotOutcome,
    },
    /// Reports that a shot was rejected; activity may still have been recorded.
    ShotRejected {
        /// Team that fired.
        team: Team,
        /// Targeted cell.
        cell: CellCoord,
        /// Specific reason the shot failed.
        reason: FireError,
    },
    /// Announces that a ship took its final hit.
    ShipDestroyed {
        /// Team that owned the ship.
        team: Team,
        /// Identifier of the destroyed ship.
        ship: ShipId,
        /// Moment the placement lockout around the wreck expires.
        cooldown_until: Timestamp,
    },
    /// Announces that a decay pass updated a team's chunks.
    HeatDecayed {
        /// Team whose chunks decayed.
        team: Team,
        /// Number of chunks whose activity changed.
        chunks: usize,
    },
}

/// Result of a shot that struck a fresh cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// The cell held no ship.
    Miss,
    /// The cell held a ship that survived the hit.
    Hit {
        /// Ship that was struck.
        ship: ShipId,
    },
    /// The hit sank the ship.
    Destroyed {
        /// Ship that was sunk.
        ship: ShipId,
    },
}

/// Reasons a ship placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// At least one ship cell falls outside the grid.
    OutOfBounds,
    /// At least one ship cell is already occupied.
    Occupied,
    /// At least one ship cell is still locked by a recent destruction.
    CoolingDown,
}

/// Reasons a shot may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireError {
    /// The targeted cell lies outside the grid.
    OutOfBounds,
    /// The targeted cell was already struck.
    AlreadyHit,
}

/// Immutable representation of a single cell used for queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Ship covering the cell, if any.
    pub ship: Option<ShipId>,
    /// Indicates whether the cell has been struck.
    pub hit: bool,
    /// Moment after which the cell accepts new ships again.
    pub cooldown_until: Option<Timestamp>,
}

impl CellSnapshot {
    /// Reports whether a ship covers the cell.
    #[must_use]
    pub const fn occupied(&self) -> bool {
        self.ship.is_some()
    }

    /// Reports whether a new ship may cover the cell at `now`.
    #[must_use]
    pub fn accepts_ship_at(&self, now: Timestamp) -> bool {
        !self.occupied() && self.cooldown_until.map_or(true, |until| until < now)
    }
}

/// Immutable representation of a single chunk used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkSnapshot {
    /// Location of the chunk.
    pub chunk: ChunkCoord,
    /// Decaying count of recent shots.
    pub activity: f32,
    /// Moment of the most recent shot into the chunk.
    pub last_activity: Timestamp,
    /// Relative heat rank of the chunk.
    pub heat: HeatLevel,
}

/// Read-only snapshot describing every chunk of one team grid.
#[derive(Clone, Debug, Default)]
pub struct ChunkView {
    snapshots: Vec<ChunkSnapshot>,
}

impl ChunkView {
    /// Creates a new chunk view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ChunkSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| (snapshot.chunk.row(), snapshot.chunk.column()));
        Self { snapshots }
    }

    /// Iterator over the captured chunks in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &ChunkSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single chunk.
    #[must_use]
    pub fn get(&self, chunk: ChunkCoord) -> Option<&ChunkSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.chunk == chunk)
    }

    /// Number of chunks captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ChunkSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single ship used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipSnapshot {
    /// Identifier allocated to the ship.
    pub id: ShipId,
    /// Player that placed the ship.
    pub owner: PlayerId,
    /// Cells covered by the ship, in order from the origin.
    pub cells: Vec<CellCoord>,
    /// Number of cells struck so far.
    pub hits: u8,
    /// Indicates whether every cell has been struck.
    pub destroyed: bool,
}

/// Read-only snapshot describing every ship of one team.
#[derive(Clone, Debug, Default)]
pub struct ShipView {
    snapshots: Vec<ShipSnapshot>,
}

impl ShipView {
    /// Creates a new ship view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ShipSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured ships in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ShipSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ShipSnapshot> {
        self.snapshots
    }
}

/// Cumulative statistics derived for one team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    /// Ships ever placed by the team.
    pub total_ships: u32,
    /// Shots that resolved a cell on the team's grid.
    pub total_hits: u32,
    /// Ships of the team that were sunk.
    pub destroyed_ships: u32,
    /// Ships of the team still afloat.
    pub active_ships: u32,
    /// Destroyed ships per resolved shot, as a rounded percentage.
    pub hit_ratio: u32,
}

impl TeamStats {
    /// Assembles statistics, deriving the hit ratio from the counters.
    #[must_use]
    pub fn new(total_ships: u32, total_hits: u32, destroyed_ships: u32, active_ships: u32) -> Self {
        Self {
            total_ships,
            total_hits,
            destroyed_ships,
            active_ships,
            hit_ratio: hit_ratio(destroyed_ships, total_hits),
        }
    }
}

/// Computes `round(100 * destroyed_ships / total_hits)`, or zero without hits.
///
/// The ratio counts sunk ships per resolved shot rather than hits per shot.
#[must_use]
pub fn hit_ratio(destroyed_ships: u32, total_hits: u32) -> u32 {
    if total_hits == 0 {
        return 0;
    }
    let ratio = 100.0 * f64::from(destroyed_ships) / f64::from(total_hits);
    ratio.round() as u32
}

/// Fixed-interval timer driven by simulated time rather than the wall clock.
///
/// Systems feed the durations carried by [`Event::TimeAdvanced`] into
/// [`Ticker::advance`] and act once per elapsed interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticker {
    interval: Duration,
    accumulator: Duration,
    running: bool,
}

impl Ticker {
    /// Creates a running ticker that fires every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            running: true,
        }
    }

    /// Creates a ticker that stays idle until [`Ticker::start`] is called.
    #[must_use]
    pub const fn stopped(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            running: false,
        }
    }

    /// Resumes firing. A running ticker is left untouched.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stops firing and discards the partially elapsed interval.
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = Duration::ZERO;
    }

    /// Reports whether the ticker is currently firing.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Period between two firings.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated towards the next firing.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Time left until the next firing, or `None` while stopped.
    #[must_use]
    pub fn until_next(&self) -> Option<Duration> {
        (self.running && !self.interval.is_zero())
            .then(|| self.interval.saturating_sub(self.accumulator))
    }

    /// Replaces the firing period, keeping the accumulated time.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Accumulates `dt` and returns how many whole intervals elapsed.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running || self.interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut fired = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            fired += 1;
        }
        fired
    }
}

/// Sums the simulated time carried by every [`Event::TimeAdvanced`] in `events`.
#[must_use]
pub fn elapsed_in(events: &[Event]) -> Duration {
    events.iter().fold(Duration::ZERO, |total, event| match event {
        Event::TimeAdvanced { dt, .. } => total.saturating_add(*dt),
        _ => total,
    })
}

/// Latest world time reported by the events, if any tick occurred.
#[must_use]
pub fn latest_time(events: &[Event]) -> Option<Timestamp> {
    events.iter().rev().find_map(|event| match event {
        Event::TimeAdvanced { now, .. } => Some(*now),
        _ => None,
    })
}
