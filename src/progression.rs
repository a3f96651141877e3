//! Player progression: the persistent profile a finished session pays into.

use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{config_file, write_json};
use crate::error::StoreError;
use crate::items::{Hardware, Inventory, Modifiers};
use crate::outcome::{FinishReason, Outcome};

/// One-off side objective paid on top of a passed, timed run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Bounty {
    #[default]
    #[strum(to_string = "SPEED: >50 WPM")]
    Speed,
    #[strum(to_string = "ACCURACY: >95%")]
    Accuracy,
}

impl Bounty {
    const ALL: [Bounty; 2] = [Bounty::Speed, Bounty::Accuracy];

    pub fn reward(&self) -> u64 {
        match self {
            Bounty::Speed => 800,
            Bounty::Accuracy => 600,
        }
    }

    pub fn is_met(&self, wpm: u32, accuracy: u32) -> bool {
        match self {
            Bounty::Speed => wpm > 50,
            Bounty::Accuracy => accuracy > 95,
        }
    }

    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RunLabel {
    Win,
    Fail,
    Zen,
}

impl RunLabel {
    pub fn of(outcome: &Outcome) -> Self {
        match (outcome.is_zen, outcome.passed) {
            (true, _) => RunLabel::Zen,
            (false, true) => RunLabel::Win,
            (false, false) => RunLabel::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Local>,
    pub wpm: u32,
    pub accuracy: u32,
    /// Total credited, bounty included.
    pub yen: u64,
    pub result: RunLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Profile {
    pub yen: u64,
    pub high_score: u32,
    pub games_played: u32,
    pub total_words_typed: u32,
    pub history: Vec<HistoryEntry>,
    pub inventory: Inventory,
    pub hardware: Vec<Hardware>,
    pub prestige_level: u32,
    pub bounty: Bounty,
}

impl Profile {
    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_hardware(&self.hardware, self.prestige_level)
    }

    /// Folds a finished session into the profile and returns the yen
    /// credited. Items the session spent are removed even when the run was
    /// aborted; an aborted run leaves no other trace.
    pub fn apply_outcome<R: Rng + ?Sized>(
        &mut self,
        outcome: &Outcome,
        rng: &mut R,
        when: DateTime<Local>,
    ) -> u64 {
        self.inventory.subtract(&outcome.consumed);
        if outcome.reason == FinishReason::Aborted {
            return 0;
        }

        let mut credited = outcome.yen_payout;
        if outcome.passed && !outcome.is_zen && self.bounty.is_met(outcome.wpm, outcome.accuracy) {
            credited += self.bounty.reward();
            tracing::info!(bounty = %self.bounty, reward = self.bounty.reward(), "bounty claimed");
            self.bounty = Bounty::roll(rng);
        }

        self.yen = self.yen.saturating_add(credited);
        self.games_played += 1;
        self.total_words_typed += 1;
        if !outcome.is_zen {
            self.high_score = self.high_score.max(outcome.wpm);
        }
        self.history.push(HistoryEntry {
            date: when,
            wpm: outcome.wpm,
            accuracy: outcome.accuracy,
            yen: credited,
            result: RunLabel::of(outcome),
        });
        credited
    }
}

/// Receives each session's outcome once it is final.
pub trait ProgressionSink {
    /// Returns the yen credited for `outcome`.
    fn record(&mut self, outcome: &Outcome) -> u64;
}

impl ProgressionSink for Profile {
    fn record(&mut self, outcome: &Outcome) -> u64 {
        self.apply_outcome(outcome, &mut rand::thread_rng(), Local::now())
    }
}

pub trait ProfileStore {
    fn load(&self) -> Profile;
    fn save(&self, profile: &Profile) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: config_file("profile.json"),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Profile {
        let Ok(bytes) = fs::read(&self.path) else {
            return Profile::default();
        };
        match serde_json::from_slice::<Profile>(&bytes) {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable profile");
                Profile::default()
            }
        }
    }

    fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        write_json(&self.path, profile)?;
        tracing::debug!(path = %self.path.display(), yen = profile.yen, "profile saved");
        Ok(())
    }
}

/// Records into a profile and writes it back after every outcome.
pub struct StoredProgression<S: ProfileStore> {
    store: S,
    profile: Profile,
}

impl<S: ProfileStore> StoredProgression<S> {
    pub fn open(store: S) -> Self {
        let profile = store.load();
        Self { store, profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn record(&mut self, outcome: &Outcome) -> Result<u64, StoreError> {
        let credited = self.profile.record(outcome);
        self.store.save(&self.profile)?;
        Ok(credited)
    }
}
