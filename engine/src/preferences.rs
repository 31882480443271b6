//! Persistence seam for the player's chosen team.
//!
//! The engine only needs a single stored value. Storage backends implement
//! [`TeamPreferenceStore`]; [`PlayerSession`] reads the value once on startup
//! and writes it back only when the choice changes.

use std::{io, path::PathBuf};

use grid_battle_core::{ParseTeamError, PlayerId, Team};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by team preference backends.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The backing storage could not be read or written.
    #[error("failed to access team preference at {}", path.display())]
    Io {
        /// Location of the preference.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The stored document could not be decoded or encoded.
    #[error("malformed team preference at {}: {reason}", path.display())]
    Malformed {
        /// Location of the preference.
        path: PathBuf,
        /// Description of the decoding failure.
        reason: String,
    },
    /// The stored value is not a known team.
    #[error(transparent)]
    UnknownTeam(#[from] ParseTeamError),
}

/// Storage for the single team identifier chosen by the local player.
pub trait TeamPreferenceStore {
    /// Reads the stored team. `Ok(None)` means no team was chosen yet.
    fn load(&self) -> Result<Option<Team>, PreferenceError>;

    /// Persists the chosen team.
    fn store(&mut self, team: Team) -> Result<(), PreferenceError>;
}

/// Volatile store used by tests and headless runs without a preference file.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferenceStore {
    team: Option<Team>,
    writes: usize,
}

impl MemoryPreferenceStore {
    /// Creates a store that already holds `team`.
    #[must_use]
    pub fn with_team(team: Team) -> Self {
        Self {
            team: Some(team),
            writes: 0,
        }
    }

    /// Number of successful writes since creation.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TeamPreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<Team>, PreferenceError> {
        Ok(self.team)
    }

    fn store(&mut self, team: Team) -> Result<(), PreferenceError> {
        self.team = Some(team);
        self.writes += 1;
        Ok(())
    }
}

/// Local player identity plus the persisted team choice.
#[derive(Debug)]
pub struct PlayerSession<S> {
    player: PlayerId,
    team: Option<Team>,
    store: S,
}

impl<S: TeamPreferenceStore> PlayerSession<S> {
    /// Restores the session, reading the stored team exactly once.
    pub fn restore(player: PlayerId, store: S) -> Result<Self, PreferenceError> {
        let team = store.load()?;
        match team {
            Some(team) => info!(player = %player, %team, "restored team preference"),
            None => debug!(player = %player, "no team chosen yet"),
        }
        Ok(Self {
            player,
            team,
            store,
        })
    }

    /// Identity used as the owner of ships placed by this player.
    #[must_use]
    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    /// Currently chosen team, if any.
    #[must_use]
    pub fn team(&self) -> Option<Team> {
        self.team
    }

    /// Records a new choice and reports whether it differed from the previous one.
    pub fn choose_team(&mut self, team: Team) -> Result<bool, PreferenceError> {
        if self.team == Some(team) {
            return Ok(false);
        }

        self.store.store(team)?;
        self.team = Some(team);
        info!(player = %self.player, %team, "team preference changed");
        Ok(true)
    }

    /// Read access to the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
