#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure heat decay system that periodically cools chunk activity.
//!
//! The system keeps its own [`Ticker`], advanced by the simulated time carried
//! in [`Event::TimeAdvanced`]. On every elapsed interval it inspects the chunk
//! snapshots of both teams and emits [`Command::DecayChunkActivity`] for the
//! chunks whose activity should drop. The world applies the new values and
//! re-ranks heat levels.

use std::time::Duration;

use grid_battle_core::{
    elapsed_in, latest_time, ChunkActivityUpdate, ChunkView, Command, Event, Team, Ticker,
    Timestamp, DECAY_INTERVAL,
};
use tracing::debug;

/// Chunks touched within this window do not decay.
pub const GRACE_PERIOD: Duration = Duration::from_secs(60);

/// Activity below this value snaps to zero.
pub const SNAP_THRESHOLD: f32 = 0.1;

/// Smallest drop worth writing back.
pub const CHANGE_EPSILON: f32 = 0.01;

/// Retention per pass, keyed by the exclusive upper age bound of each bucket.
const RETENTION_BUCKETS: [(Duration, f32); 2] = [
    (Duration::from_secs(120), 0.999),
    (Duration::from_secs(240), 0.98),
];

/// Retention per pass for chunks idle for four minutes or longer.
const STALE_RETENTION: f32 = 0.95;

/// Configuration parameters required to construct the heat decay system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: Duration,
}

impl Config {
    /// Creates a configuration that runs a decay pass every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DECAY_INTERVAL)
    }
}

/// Heat decay system that turns elapsed time into decay commands.
#[derive(Debug)]
pub struct HeatDecay {
    ticker: Ticker,
    scratch: Vec<ChunkActivityUpdate>,
}

impl Default for HeatDecay {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl HeatDecay {
    /// Creates a running heat decay system.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            ticker: Ticker::new(config.interval),
            scratch: Vec::new(),
        }
    }

    /// Resumes periodic decay.
    pub fn start(&mut self) {
        self.ticker.start();
    }

    /// Halts periodic decay and discards the partially elapsed interval.
    pub fn stop(&mut self) {
        self.ticker.stop();
    }

    /// Reports whether decay passes are scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// Consumes world events and chunk snapshots to emit decay commands.
    ///
    /// The `chunks_for` closure should mirror the world's `query::chunk_view`
    /// helper. It is only invoked when at least one decay pass is due.
    pub fn handle<F>(&mut self, events: &[Event], mut chunks_for: F, out: &mut Vec<Command>)
    where
        F: FnMut(Team) -> ChunkView,
    {
        let passes = self.ticker.advance(elapsed_in(events));
        if passes == 0 {
            return;
        }

        let Some(now) = latest_time(events) else {
            return;
        };

        // The last pass fell due when the accumulator last wrapped.
        let last_pass = now.saturating_sub(self.ticker.pending());
        let interval = self.ticker.interval();
        for team in Team::ALL {
            let view = chunks_for(team);
            self.collect_updates(&view, last_pass, interval, passes);
            if self.scratch.is_empty() {
                continue;
            }

            debug!(%team, passes, chunks = self.scratch.len(), "heat decay pass");
            out.push(Command::DecayChunkActivity {
                team,
                updates: self.scratch.drain(..).collect(),
            });
        }
    }

    /// Replays `passes` decay passes, each at the instant it fell due.
    ///
    /// Ages are measured per pass, so one long tick yields the same values
    /// as a sequence of interval-sized ticks.
    fn collect_updates(
        &mut self,
        view: &ChunkView,
        last_pass: Timestamp,
        interval: Duration,
        passes: u32,
    ) {
        self.scratch.clear();
        for snapshot in view.iter() {
            let mut activity = snapshot.activity;
            for remaining in (0..passes).rev() {
                let due = last_pass.saturating_sub(interval.saturating_mul(remaining));
                let age = due.saturating_duration_since(snapshot.last_activity);
                if let Some(next) = decayed_activity(activity, age) {
                    activity = next;
                }
            }

            if activity < snapshot.activity {
                self.scratch.push(ChunkActivityUpdate {
                    chunk: snapshot.chunk,
                    activity,
                });
            }
        }
    }
}

/// Fraction of activity kept by one pass for a chunk idle for `age`.
///
/// Returns `None` inside the grace period.
#[must_use]
pub fn retention_for(age: Duration) -> Option<f32> {
    if age <= GRACE_PERIOD {
        return None;
    }

    let retention = RETENTION_BUCKETS
        .iter()
        .find(|(limit, _)| age < *limit)
        .map_or(STALE_RETENTION, |(_, retention)| *retention);
    Some(retention)
}

/// Activity after one decay pass, or `None` when the value should stay as is.
///
/// Results under [`SNAP_THRESHOLD`] become exactly zero. Drops no larger than
/// [`CHANGE_EPSILON`] are discarded.
#[must_use]
pub fn decayed_activity(activity: f32, age: Duration) -> Option<f32> {
    if activity <= 0.0 {
        return None;
    }

    let next = activity * retention_for(age)?;
    if next < SNAP_THRESHOLD {
        return Some(0.0);
    }

    (activity - next > CHANGE_EPSILON).then_some(next)
}
