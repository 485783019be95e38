//! Care actions: the closed set of things a user can do for a pet, each
//! mapped to a configuration record of stat deltas, rewards, and a cooldown.
//! Cooldowns are data (a watermark compared against `now`), never a wait.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::challenges::ChallengeKind;
use crate::constants::{
    CLEAN_CLEANLINESS_RESTORE, CLEAN_COIN_REWARD, CLEAN_COOLDOWN_MINUTES, CLEAN_XP_REWARD,
    FEED_COIN_REWARD, FEED_COOLDOWN_MINUTES, FEED_HAPPINESS_BONUS, FEED_HUNGER_RESTORE,
    FEED_XP_REWARD, PLAY_COIN_REWARD, PLAY_COOLDOWN_MINUTES, PLAY_ENERGY_COST, PLAY_HAPPINESS_RESTORE,
    PLAY_HUNGER_COST, PLAY_XP_REWARD, SLEEP_COOLDOWN_MINUTES, SLEEP_ENERGY_RESTORE,
    SLEEP_HEALTH_RESTORE, SLEEP_XP_REWARD,
};
use crate::state::{Pet, bump_stat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareAction {
    Feed,
    Play,
    Clean,
    Sleep,
}

impl CareAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Play => "play",
            Self::Clean => "clean",
            Self::Sleep => "sleep",
        }
    }

    /// The cumulative challenge kind this action counts toward.
    #[must_use]
    pub const fn challenge_kind(self) -> ChallengeKind {
        match self {
            Self::Feed => ChallengeKind::Feed,
            Self::Play => ChallengeKind::Play,
            Self::Clean => ChallengeKind::Clean,
            Self::Sleep => ChallengeKind::Sleep,
        }
    }
}

impl fmt::Display for CareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CareAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feed" => Ok(Self::Feed),
            "play" => Ok(Self::Play),
            "clean" => Ok(Self::Clean),
            "sleep" => Ok(Self::Sleep),
            _ => Err(()),
        }
    }
}

/// Effects of one care action. All deltas are clamped into `[0, 100]` on
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActionEffects {
    #[serde(default)]
    pub hunger: i16,
    #[serde(default)]
    pub happiness: i16,
    #[serde(default)]
    pub cleanliness: i16,
    #[serde(default)]
    pub energy: i16,
    #[serde(default)]
    pub health: i16,
    #[serde(default)]
    pub coin_reward: i64,
    #[serde(default)]
    pub xp_reward: u32,
    #[serde(default)]
    pub cooldown_minutes: u32,
}

/// Per-action effect table. Defaults match the live game balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(default = "default_feed_effects")]
    pub feed: ActionEffects,
    #[serde(default = "default_play_effects")]
    pub play: ActionEffects,
    #[serde(default = "default_clean_effects")]
    pub clean: ActionEffects,
    #[serde(default = "default_sleep_effects")]
    pub sleep: ActionEffects,
}

fn default_feed_effects() -> ActionEffects {
    ActionEffects {
        hunger: FEED_HUNGER_RESTORE,
        happiness: FEED_HAPPINESS_BONUS,
        coin_reward: FEED_COIN_REWARD,
        xp_reward: FEED_XP_REWARD,
        cooldown_minutes: FEED_COOLDOWN_MINUTES,
        ..ActionEffects::default()
    }
}

fn default_play_effects() -> ActionEffects {
    ActionEffects {
        happiness: PLAY_HAPPINESS_RESTORE,
        energy: PLAY_ENERGY_COST,
        hunger: PLAY_HUNGER_COST,
        coin_reward: PLAY_COIN_REWARD,
        xp_reward: PLAY_XP_REWARD,
        cooldown_minutes: PLAY_COOLDOWN_MINUTES,
        ..ActionEffects::default()
    }
}

fn default_clean_effects() -> ActionEffects {
    ActionEffects {
        cleanliness: CLEAN_CLEANLINESS_RESTORE,
        coin_reward: CLEAN_COIN_REWARD,
        xp_reward: CLEAN_XP_REWARD,
        cooldown_minutes: CLEAN_COOLDOWN_MINUTES,
        ..ActionEffects::default()
    }
}

fn default_sleep_effects() -> ActionEffects {
    ActionEffects {
        energy: SLEEP_ENERGY_RESTORE,
        health: SLEEP_HEALTH_RESTORE,
        xp_reward: SLEEP_XP_REWARD,
        cooldown_minutes: SLEEP_COOLDOWN_MINUTES,
        ..ActionEffects::default()
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            feed: default_feed_effects(),
            play: default_play_effects(),
            clean: default_clean_effects(),
            sleep: default_sleep_effects(),
        }
    }
}

impl ActionConfig {
    #[must_use]
    pub const fn effects(&self, action: CareAction) -> &ActionEffects {
        match action {
            CareAction::Feed => &self.feed,
            CareAction::Play => &self.play,
            CareAction::Clean => &self.clean,
            CareAction::Sleep => &self.sleep,
        }
    }
}

const fn action_watermark(pet: &Pet, action: CareAction) -> Option<DateTime<Utc>> {
    match action {
        CareAction::Feed => pet.last_fed,
        CareAction::Play => pet.last_played,
        CareAction::Clean => pet.last_cleaned,
        CareAction::Sleep => pet.last_slept,
    }
}

/// Time left before the action can be used again, `None` when it is ready.
#[must_use]
pub fn cooldown_remaining(
    pet: &Pet,
    action: CareAction,
    cfg: &ActionConfig,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let last = action_watermark(pet, action)?;
    let ready_at = last + Duration::minutes(i64::from(cfg.effects(action).cooldown_minutes));
    if now >= ready_at {
        None
    } else {
        Some(ready_at - now)
    }
}

/// Apply the action's stat deltas, coins, and cooldown watermark to the pet.
///
/// Callers apply decay first so the deltas land on current effective stats.
/// XP and challenge progress are the caller's business (see the engine).
pub fn apply_action(pet: &mut Pet, action: CareAction, cfg: &ActionConfig, now: DateTime<Utc>) {
    let effects = cfg.effects(action);
    pet.hunger = bump_stat(pet.hunger, effects.hunger);
    pet.happiness = bump_stat(pet.happiness, effects.happiness);
    pet.cleanliness = bump_stat(pet.cleanliness, effects.cleanliness);
    pet.energy = bump_stat(pet.energy, effects.energy);
    pet.health = bump_stat(pet.health, effects.health);
    pet.is_sick = pet.health == 0;
    pet.coins = pet.coins.saturating_add(effects.coin_reward);

    match action {
        CareAction::Feed => pet.last_fed = Some(now),
        CareAction::Play => pet.last_played = Some(now),
        CareAction::Clean => pet.last_cleaned = Some(now),
        CareAction::Sleep => pet.last_slept = Some(now),
    }
}
