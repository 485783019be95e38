//! Centralized balance and tuning constants for Nestlings game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Stat bounds ---------------------------------------------------------------
pub(crate) const STAT_MAX: u8 = 100;

// Decay tuning --------------------------------------------------------------
pub(crate) const HUNGER_DECAY_INTERVAL_MINUTES: u32 = 30;
pub(crate) const HAPPINESS_DECAY_INTERVAL_MINUTES: u32 = 60;
pub(crate) const CLEANLINESS_DECAY_INTERVAL_MINUTES: u32 = 120;
pub(crate) const HEALTH_DECAY_INTERVAL_MINUTES: u32 = 60;
pub(crate) const DECAY_POINTS_PER_INTERVAL: u8 = 1;

// Progression tuning --------------------------------------------------------
pub(crate) const XP_PER_LEVEL: u32 = 100;
pub(crate) const CHILD_EVOLUTION_LEVEL: u32 = 5;
pub(crate) const TEEN_EVOLUTION_LEVEL: u32 = 10;
pub(crate) const ADULT_EVOLUTION_LEVEL: u32 = 20;

// Genetics tuning -----------------------------------------------------------
pub(crate) const MUTATION_CHANCE: f64 = 0.05;
pub(crate) const VARIATION_CHANCE: f64 = 0.10;
pub(crate) const BREEDING_INCUBATION_HOURS: i64 = 24;

// Challenge tuning ----------------------------------------------------------
pub(crate) const DAILY_CHALLENGE_COUNT: usize = 3;

// Care action tuning --------------------------------------------------------
pub(crate) const FEED_HUNGER_RESTORE: i16 = 30;
pub(crate) const FEED_HAPPINESS_BONUS: i16 = 5;
pub(crate) const FEED_COIN_REWARD: i64 = 2;
pub(crate) const FEED_XP_REWARD: u32 = 10;
pub(crate) const FEED_COOLDOWN_MINUTES: u32 = 30;

pub(crate) const PLAY_HAPPINESS_RESTORE: i16 = 25;
pub(crate) const PLAY_ENERGY_COST: i16 = -15;
pub(crate) const PLAY_HUNGER_COST: i16 = -5;
pub(crate) const PLAY_COIN_REWARD: i64 = 3;
pub(crate) const PLAY_XP_REWARD: u32 = 15;
pub(crate) const PLAY_COOLDOWN_MINUTES: u32 = 15;

pub(crate) const CLEAN_CLEANLINESS_RESTORE: i16 = 40;
pub(crate) const CLEAN_COIN_REWARD: i64 = 2;
pub(crate) const CLEAN_XP_REWARD: u32 = 10;
pub(crate) const CLEAN_COOLDOWN_MINUTES: u32 = 60;

pub(crate) const SLEEP_ENERGY_RESTORE: i16 = 50;
pub(crate) const SLEEP_HEALTH_RESTORE: i16 = 5;
pub(crate) const SLEEP_XP_REWARD: u32 = 5;
pub(crate) const SLEEP_COOLDOWN_MINUTES: u32 = 240;
