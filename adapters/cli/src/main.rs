#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless grid battle on a simulated clock.

mod config;
mod preference_file;
mod report;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use grid_battle_core::{PlayerId, Team};
use grid_battle_engine::{
    preferences::{PlayerSession, TeamPreferenceStore},
    BattleEngine, EngineConfig, SimulationOptions, TickReport,
};
use grid_battle_system_simulator::Intensity;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Overrides, RunConfig},
    preference_file::FilePreferenceStore,
};

/// Runs a simulated two-team grid battle and prints the resulting heat maps.
#[derive(Debug, Parser)]
#[command(name = "grid-battle", version)]
struct Args {
    /// TOML file with run settings; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulator load preset.
    #[arg(long)]
    intensity: Option<Intensity>,
    /// Seed for the simulator's random number generator.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds of periodic load.
    #[arg(long)]
    duration_secs: Option<u64>,
    /// Simulated milliseconds advanced per step.
    #[arg(long)]
    step_millis: Option<u64>,
    /// Actions applied at once before the clock starts.
    #[arg(long)]
    burst: Option<usize>,
    /// Disables heat decay for the run.
    #[arg(long)]
    no_decay: bool,
    /// Player identity recorded as ship owner.
    #[arg(long)]
    player: Option<String>,
    /// Team to play for; stored as the new preference.
    #[arg(long)]
    team: Option<Team>,
    /// File holding the persisted team choice.
    #[arg(long)]
    preferences: Option<PathBuf>,
}

impl Args {
    fn overrides(self) -> (Option<PathBuf>, Overrides) {
        let overrides = Overrides {
            intensity: self.intensity,
            seed: self.seed,
            duration_secs: self.duration_secs,
            step_millis: self.step_millis,
            burst: self.burst,
            no_decay: self.no_decay,
            player: self.player,
            team: self.team,
            preferences_path: self.preferences,
        };
        (self.config, overrides)
    }
}

/// Entry point for the grid battle command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let (config_path, overrides) = Args::parse().overrides();
    let config = match config_path {
        Some(path) => RunConfig::load(&path)?,
        None => RunConfig::default(),
    }
    .with_overrides(overrides)?;

    let player = PlayerId::new(config.player.clone());
    let team = match &config.preferences_path {
        Some(path) => resolve_team(
            FilePreferenceStore::new(path.clone()),
            player.clone(),
            config.team,
        )?,
        None => config.team.unwrap_or(Team::Blue),
    };
    println!("{player} plays for {team}");

    let mut engine = BattleEngine::new(EngineConfig {
        intensity: config.intensity,
        seed: config.seed,
        player,
        ..EngineConfig::default()
    });
    if !config.decay {
        engine.stop_decay();
    }

    if config.burst > 0 {
        let summary = engine.simulate_battle(config.burst, SimulationOptions::default());
        println!("{}", report::summary_line("burst", &summary));
    }

    let total = run_clock(&mut engine, &config);
    println!("{}", report::summary_line("periodic", &total.simulation));
    println!("decayed chunk updates: {}", total.decayed_chunks);
    println!();

    let per_side = engine.dimensions().chunks_per_side();
    for shown in [team, team.opponent()] {
        println!("{}", report::stats_line(shown, &engine.stats(shown)));
        print!("{}", report::heat_map(&engine.chunks(shown), per_side));
        println!();
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Restores the stored team, overriding it with an explicit choice.
fn resolve_team<S: TeamPreferenceStore>(
    store: S,
    player: PlayerId,
    requested: Option<Team>,
) -> Result<Team> {
    let mut session =
        PlayerSession::restore(player, store).context("failed to restore team preference")?;

    let team = requested.or(session.team()).unwrap_or(Team::Blue);
    let _ = session
        .choose_team(team)
        .context("failed to store team preference")?;
    Ok(team)
}

fn run_clock(engine: &mut BattleEngine, config: &RunConfig) -> TickReport {
    let mut total = TickReport::default();
    if config.duration_secs == 0 {
        return total;
    }

    let step = Duration::from_millis(config.step_millis);
    let duration = Duration::from_secs(config.duration_secs);
    engine.start_simulation(config.intensity);

    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        let dt = step.min(duration - elapsed);
        let step_report = engine.advance(dt);
        report::accumulate(&mut total, &step_report);
        elapsed += dt;
    }

    engine.stop_simulation();
    info!(
        simulated_secs = config.duration_secs,
        actions = total.simulation.actions,
        "simulated clock finished"
    );
    total
}
