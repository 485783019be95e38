//! Level, XP, and evolution progression.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ADULT_EVOLUTION_LEVEL, CHILD_EVOLUTION_LEVEL, TEEN_EVOLUTION_LEVEL, XP_PER_LEVEL,
};
use crate::state::EvolutionStage;

/// XP curve and evolution thresholds. Defaults match the live game balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "default_xp_per_level")]
    pub xp_per_level: u32,
    #[serde(default = "default_child_level")]
    pub child_level: u32,
    #[serde(default = "default_teen_level")]
    pub teen_level: u32,
    #[serde(default = "default_adult_level")]
    pub adult_level: u32,
}

const fn default_xp_per_level() -> u32 {
    XP_PER_LEVEL
}

const fn default_child_level() -> u32 {
    CHILD_EVOLUTION_LEVEL
}

const fn default_teen_level() -> u32 {
    TEEN_EVOLUTION_LEVEL
}

const fn default_adult_level() -> u32 {
    ADULT_EVOLUTION_LEVEL
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_level: default_xp_per_level(),
            child_level: default_child_level(),
            teen_level: default_teen_level(),
            adult_level: default_adult_level(),
        }
    }
}

impl ProgressionConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionConfigError` when the XP curve is degenerate or
    /// the evolution thresholds do not strictly increase.
    pub fn validate(&self) -> Result<(), ProgressionConfigError> {
        if self.xp_per_level == 0 {
            return Err(ProgressionConfigError::ZeroXpPerLevel);
        }
        if self.child_level >= self.teen_level || self.teen_level >= self.adult_level {
            return Err(ProgressionConfigError::ThresholdOrder {
                child: self.child_level,
                teen: self.teen_level,
                adult: self.adult_level,
            });
        }
        Ok(())
    }
}

/// Errors raised when progression configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressionConfigError {
    #[error("xp_per_level must be at least 1")]
    ZeroXpPerLevel,
    #[error("evolution thresholds must strictly increase (child {child}, teen {teen}, adult {adult})")]
    ThresholdOrder { child: u32, teen: u32, adult: u32 },
}

/// Result of awarding XP: the final state plus the two independent flags the
/// caller uses to trigger level-up and evolution celebrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpOutcome {
    pub level: u32,
    pub xp: u32,
    pub stage: EvolutionStage,
    pub leveled_up: bool,
    pub evolved: bool,
}

/// Award `gain` XP to a pet at `level`/`xp`/`stage`.
///
/// Level-ups consume XP in a loop rather than a single modulo so gains large
/// enough to cross several levels land on the right level and remainder.
/// Evolution checks the thresholds highest-first and fires at most once per
/// call: a pet crossing several thresholds in one award jumps straight to the
/// highest stage it now qualifies for. The stage never decreases.
#[must_use]
pub fn apply_xp(
    level: u32,
    xp: u32,
    stage: EvolutionStage,
    gain: u32,
    cfg: &ProgressionConfig,
) -> XpOutcome {
    // A zero xp_per_level is rejected by validate(); clamp here anyway so a
    // bad config cannot spin this loop forever.
    let per_level = cfg.xp_per_level.max(1);
    let mut new_level = level.max(1);
    let mut new_xp = xp.saturating_add(gain);
    while new_xp >= per_level {
        new_level = new_level.saturating_add(1);
        new_xp -= per_level;
    }

    let new_stage = if new_level >= cfg.adult_level && stage < EvolutionStage::Adult {
        EvolutionStage::Adult
    } else if new_level >= cfg.teen_level && stage < EvolutionStage::Teen {
        EvolutionStage::Teen
    } else if new_level >= cfg.child_level && stage < EvolutionStage::Child {
        EvolutionStage::Child
    } else {
        stage
    };

    XpOutcome {
        level: new_level,
        xp: new_xp,
        stage: new_stage,
        leveled_up: new_level > level,
        evolved: new_stage > stage,
    }
}
