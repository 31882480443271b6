//! TOML file backend for the persisted team choice.

use std::{fs, io, path::PathBuf};

use grid_battle_core::Team;
use grid_battle_engine::preferences::{PreferenceError, TeamPreferenceStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PreferenceDocument {
    team: Option<String>,
}

/// Stores the chosen team as `team = "<label>"` in a TOML file.
#[derive(Clone, Debug)]
pub(crate) struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn malformed(&self, reason: impl ToString) -> PreferenceError {
        PreferenceError::Malformed {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    fn io(&self, source: io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TeamPreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<Team>, PreferenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io(error)),
        };

        let document: PreferenceDocument =
            toml::from_str(&contents).map_err(|error| self.malformed(error))?;
        match document.team {
            Some(label) => Ok(Some(label.parse()?)),
            None => Ok(None),
        }
    }

    fn store(&mut self, team: Team) -> Result<(), PreferenceError> {
        let document = PreferenceDocument {
            team: Some(team.label().to_owned()),
        };
        let contents = toml::to_string(&document).map_err(|error| self.malformed(error))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| self.io(error))?;
            }
        }
        fs::write(&self.path, contents).map_err(|error| self.io(error))
    }
}
