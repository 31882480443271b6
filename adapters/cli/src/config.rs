//! Run configuration read from an optional TOML file and command-line overrides.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{ensure, Context, Result};
use grid_battle_core::Team;
use grid_battle_system_simulator::Intensity;
use serde::Deserialize;

/// Settings for one headless battle run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunConfig {
    pub(crate) intensity: Intensity,
    pub(crate) seed: u64,
    pub(crate) duration_secs: u64,
    pub(crate) step_millis: u64,
    pub(crate) burst: usize,
    pub(crate) decay: bool,
    pub(crate) player: String,
    pub(crate) team: Option<Team>,
    pub(crate) preferences_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            intensity: Intensity::Moderate,
            seed: 0,
            duration_secs: 60,
            step_millis: 100,
            burst: 0,
            decay: true,
            player: "player".to_owned(),
            team: None,
            preferences_path: None,
        }
    }
}

/// Values supplied on the command line; each one wins over the file.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) intensity: Option<Intensity>,
    pub(crate) seed: Option<u64>,
    pub(crate) duration_secs: Option<u64>,
    pub(crate) step_millis: Option<u64>,
    pub(crate) burst: Option<usize>,
    pub(crate) no_decay: bool,
    pub(crate) player: Option<String>,
    pub(crate) team: Option<Team>,
    pub(crate) preferences_path: Option<PathBuf>,
}

impl RunConfig {
    /// Reads a configuration file. Missing keys fall back to defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid run configuration toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Layers command-line values on top and re-validates the result.
    pub(crate) fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(intensity) = overrides.intensity {
            self.intensity = intensity;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(duration_secs) = overrides.duration_secs {
            self.duration_secs = duration_secs;
        }
        if let Some(step_millis) = overrides.step_millis {
            self.step_millis = step_millis;
        }
        if let Some(burst) = overrides.burst {
            self.burst = burst;
        }
        if overrides.no_decay {
            self.decay = false;
        }
        if let Some(player) = overrides.player {
            self.player = player;
        }
        if overrides.team.is_some() {
            self.team = overrides.team;
        }
        if overrides.preferences_path.is_some() {
            self.preferences_path = overrides.preferences_path;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.step_millis > 0, "step_millis must be greater than zero");
        ensure!(!self.player.trim().is_empty(), "player must not be empty");
        Ok(())
    }
}
