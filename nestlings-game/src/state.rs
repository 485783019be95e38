//! Pet state: stats, progression fields, genetics lineage, and the per-stat
//! decay watermarks the simulation resumes from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::STAT_MAX;
use crate::decay::DecayOutcome;

/// Identifier for a pet record. Storage assigns these; the engine treats
/// them as opaque.
pub type PetId = String;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum EvolutionStage {
    #[default]
    Baby,
    Child,
    Teen,
    Adult,
}

impl EvolutionStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Baby => "baby",
            Self::Child => "child",
            Self::Teen => "teen",
            Self::Adult => "adult",
        }
    }

    /// Numeric stage index, 0 (Baby) through 3 (Adult).
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Baby => 0,
            Self::Child => 1,
            Self::Teen => 2,
            Self::Adult => 3,
        }
    }

    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Baby),
            1 => Some(Self::Child),
            2 => Some(Self::Teen),
            3 => Some(Self::Adult),
            _ => None,
        }
    }
}

impl fmt::Display for EvolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvolutionStage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baby" => Ok(Self::Baby),
            "child" => Ok(Self::Child),
            "teen" => Ok(Self::Teen),
            "adult" => Ok(Self::Adult),
            _ => Err(()),
        }
    }
}

impl From<EvolutionStage> for String {
    fn from(value: EvolutionStage) -> Self {
        value.as_str().to_string()
    }
}

/// A single pet record. Stats live in `[0, 100]`; the four decay watermarks
/// advance only by whole consumed intervals (see [`crate::decay`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    pub color: String,
    pub pattern: String,
    #[serde(default)]
    pub is_mutation: bool,
    #[serde(default)]
    pub parent1: Option<PetId>,
    #[serde(default)]
    pub parent2: Option<PetId>,

    pub level: u32,
    pub xp: u32,
    #[serde(default)]
    pub stage: EvolutionStage,

    pub hunger: u8,
    pub happiness: u8,
    pub cleanliness: u8,
    pub energy: u8,
    pub health: u8,
    #[serde(default)]
    pub is_sick: bool,

    #[serde(default)]
    pub coins: i64,

    pub last_hunger_decay: DateTime<Utc>,
    pub last_happiness_decay: DateTime<Utc>,
    pub last_cleanliness_decay: DateTime<Utc>,
    pub last_health_decay: DateTime<Utc>,

    #[serde(default)]
    pub last_fed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_cleaned: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_slept: Option<DateTime<Utc>>,

    /// Set when a breeding pair starts incubating an egg; cleared on hatch.
    #[serde(default)]
    pub breeding_since: Option<DateTime<Utc>>,
}

impl Pet {
    /// Create a freshly adopted pet with full stats and all watermarks
    /// anchored at `now`.
    #[must_use]
    pub fn new(id: PetId, name: impl Into<String>, species: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            species: species.into(),
            color: String::from("brown"),
            pattern: String::from("solid"),
            is_mutation: false,
            parent1: None,
            parent2: None,
            level: 1,
            xp: 0,
            stage: EvolutionStage::Baby,
            hunger: STAT_MAX,
            happiness: STAT_MAX,
            cleanliness: STAT_MAX,
            energy: STAT_MAX,
            health: STAT_MAX,
            is_sick: false,
            coins: 0,
            last_hunger_decay: now,
            last_happiness_decay: now,
            last_cleanliness_decay: now,
            last_health_decay: now,
            last_fed: None,
            last_played: None,
            last_cleaned: None,
            last_slept: None,
            breeding_since: None,
        }
    }

    /// Write a decay result back into the record.
    pub fn apply_decay(&mut self, outcome: &DecayOutcome) {
        self.hunger = outcome.hunger;
        self.happiness = outcome.happiness;
        self.cleanliness = outcome.cleanliness;
        self.health = outcome.health;
        self.is_sick = outcome.is_sick;
        self.last_hunger_decay = outcome.last_hunger_decay;
        self.last_happiness_decay = outcome.last_happiness_decay;
        self.last_cleanliness_decay = outcome.last_cleanliness_decay;
        self.last_health_decay = outcome.last_health_decay;
    }
}

/// Add a signed delta to a stat, clamped to `[0, 100]`.
#[must_use]
pub(crate) fn bump_stat(stat: u8, delta: i16) -> u8 {
    let next = i32::from(stat) + i32::from(delta);
    let next = next.clamp(0, i32::from(STAT_MAX));
    u8::try_from(next).unwrap_or(STAT_MAX)
}
