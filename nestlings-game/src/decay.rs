//! Time-based stat decay.
//!
//! Each stat keeps its own "last processed" watermark and decays by whole
//! consumed intervals only. Watermarks advance by `intervals * interval`,
//! never to `now`, so any sub-interval remainder carries into the next call
//! and frequent polling cannot drift the schedule. Health is special-cased:
//! it only decays while the pet has been continuously sick across a call.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CLEANLINESS_DECAY_INTERVAL_MINUTES, DECAY_POINTS_PER_INTERVAL,
    HAPPINESS_DECAY_INTERVAL_MINUTES, HEALTH_DECAY_INTERVAL_MINUTES,
    HUNGER_DECAY_INTERVAL_MINUTES,
};
use crate::state::Pet;

/// Decay schedule for a single stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDecayRate {
    pub interval_minutes: u32,
    pub points_per_interval: u8,
}

impl StatDecayRate {
    #[must_use]
    pub const fn new(interval_minutes: u32, points_per_interval: u8) -> Self {
        Self {
            interval_minutes,
            points_per_interval,
        }
    }
}

/// Per-stat decay schedules. Defaults match the live game balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayConfig {
    #[serde(default = "default_hunger_rate")]
    pub hunger: StatDecayRate,
    #[serde(default = "default_happiness_rate")]
    pub happiness: StatDecayRate,
    #[serde(default = "default_cleanliness_rate")]
    pub cleanliness: StatDecayRate,
    #[serde(default = "default_health_rate")]
    pub health: StatDecayRate,
}

fn default_hunger_rate() -> StatDecayRate {
    StatDecayRate::new(HUNGER_DECAY_INTERVAL_MINUTES, DECAY_POINTS_PER_INTERVAL)
}

fn default_happiness_rate() -> StatDecayRate {
    StatDecayRate::new(HAPPINESS_DECAY_INTERVAL_MINUTES, DECAY_POINTS_PER_INTERVAL)
}

fn default_cleanliness_rate() -> StatDecayRate {
    StatDecayRate::new(
        CLEANLINESS_DECAY_INTERVAL_MINUTES,
        DECAY_POINTS_PER_INTERVAL,
    )
}

fn default_health_rate() -> StatDecayRate {
    StatDecayRate::new(HEALTH_DECAY_INTERVAL_MINUTES, DECAY_POINTS_PER_INTERVAL)
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            hunger: default_hunger_rate(),
            happiness: default_happiness_rate(),
            cleanliness: default_cleanliness_rate(),
            health: default_health_rate(),
        }
    }
}

impl DecayConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `DecayConfigError` when any stat interval is zero.
    pub fn validate(&self) -> Result<(), DecayConfigError> {
        for (stat, rate) in [
            ("hunger", self.hunger),
            ("happiness", self.happiness),
            ("cleanliness", self.cleanliness),
            ("health", self.health),
        ] {
            if rate.interval_minutes == 0 {
                return Err(DecayConfigError::ZeroInterval { stat });
            }
        }
        Ok(())
    }
}

/// Errors raised when decay configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecayConfigError {
    #[error("{stat} decay interval must be at least 1 minute")]
    ZeroInterval { stat: &'static str },
}

/// Result of one decay pass: new stat values and advanced watermarks for the
/// caller to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayOutcome {
    pub hunger: u8,
    pub happiness: u8,
    pub cleanliness: u8,
    pub health: u8,
    /// True iff the new `health` is zero. This is the sickness flag stored
    /// on the pet record.
    pub is_sick: bool,
    /// True iff any of the new hunger/happiness/cleanliness values is zero.
    /// This is the condition that *drives* health decay; it is deliberately
    /// distinct from `is_sick` and both are preserved because game balance
    /// depends on the difference.
    pub needs_critical: bool,
    pub last_hunger_decay: DateTime<Utc>,
    pub last_happiness_decay: DateTime<Utc>,
    pub last_cleanliness_decay: DateTime<Utc>,
    pub last_health_decay: DateTime<Utc>,
}

/// Whole decay intervals elapsed since `last`, and the watermark advanced by
/// exactly those intervals. Negative elapsed time (client/server clock skew)
/// consumes nothing; that case is expected in production and must not error.
fn consume_intervals(
    last: DateTime<Utc>,
    now: DateTime<Utc>,
    interval_minutes: u32,
) -> (u64, DateTime<Utc>) {
    if interval_minutes == 0 {
        return (0, last);
    }
    let elapsed_minutes = now.signed_duration_since(last).num_minutes();
    if elapsed_minutes <= 0 {
        return (0, last);
    }
    let interval = i64::from(interval_minutes);
    let intervals = elapsed_minutes / interval;
    if intervals == 0 {
        return (0, last);
    }
    let advanced = last + Duration::minutes(intervals * interval);
    (u64::try_from(intervals).unwrap_or(0), advanced)
}

fn decay_stat(current: u8, intervals: u64, points_per_interval: u8) -> u8 {
    let loss = intervals.saturating_mul(u64::from(points_per_interval));
    current.saturating_sub(u8::try_from(loss).unwrap_or(u8::MAX))
}

/// Compute the pet's effective stats at `now`.
///
/// Pure function: reads the snapshot, returns new values and watermarks for
/// the caller to persist. Hunger, happiness, and cleanliness decay
/// independently. Health decays only when the pet was already sick before
/// this call *and* is still sick after the other stats decayed; a pet that
/// just became sick (or just recovered) gets its health watermark reset to
/// `now` instead, so sickness time never accrues retroactively.
#[must_use]
pub fn compute_decay(pet: &Pet, now: DateTime<Utc>, cfg: &DecayConfig) -> DecayOutcome {
    let was_sick = pet.hunger == 0 || pet.happiness == 0 || pet.cleanliness == 0;

    let (hunger_ticks, last_hunger_decay) =
        consume_intervals(pet.last_hunger_decay, now, cfg.hunger.interval_minutes);
    let hunger = decay_stat(pet.hunger, hunger_ticks, cfg.hunger.points_per_interval);

    let (happiness_ticks, last_happiness_decay) =
        consume_intervals(pet.last_happiness_decay, now, cfg.happiness.interval_minutes);
    let happiness = decay_stat(
        pet.happiness,
        happiness_ticks,
        cfg.happiness.points_per_interval,
    );

    let (cleanliness_ticks, last_cleanliness_decay) = consume_intervals(
        pet.last_cleanliness_decay,
        now,
        cfg.cleanliness.interval_minutes,
    );
    let cleanliness = decay_stat(
        pet.cleanliness,
        cleanliness_ticks,
        cfg.cleanliness.points_per_interval,
    );

    let needs_critical = hunger == 0 || happiness == 0 || cleanliness == 0;

    let (health, last_health_decay) = if needs_critical && was_sick {
        let (health_ticks, mark) =
            consume_intervals(pet.last_health_decay, now, cfg.health.interval_minutes);
        (
            decay_stat(pet.health, health_ticks, cfg.health.points_per_interval),
            mark,
        )
    } else {
        // Either the sickness clock starts fresh (just became sick) or the
        // accumulated sickness timer is cleared (not sick). Watermarks never
        // move backward, so a skewed `now` in the past cannot rewind it.
        (pet.health, now.max(pet.last_health_decay))
    };

    DecayOutcome {
        hunger,
        happiness,
        cleanliness,
        health,
        is_sick: health == 0,
        needs_critical,
        last_hunger_decay,
        last_happiness_decay,
        last_cleanliness_decay,
        last_health_decay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_pet(now: DateTime<Utc>) -> Pet {
        Pet::new(String::from("p1"), "Waffles", "longfluff", now)
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn whole_intervals_only() {
        let start = at(8, 0);
        let pet = base_pet(start);
        // 89 minutes = 2 hunger intervals (30m), 1 happiness (60m), 0 cleanliness (120m)
        let out = compute_decay(&pet, start + Duration::minutes(89), &DecayConfig::default());
        assert_eq!(out.hunger, 98);
        assert_eq!(out.happiness, 99);
        assert_eq!(out.cleanliness, 100);
        assert_eq!(out.last_hunger_decay, start + Duration::minutes(60));
        assert_eq!(out.last_happiness_decay, start + Duration::minutes(60));
        assert_eq!(out.last_cleanliness_decay, start);
    }

    #[test]
    fn remainder_carries_into_next_call() {
        let start = at(8, 0);
        let mut pet = base_pet(start);
        // 29 minutes: no hunger interval yet, watermark untouched.
        let out = compute_decay(&pet, start + Duration::minutes(29), &DecayConfig::default());
        assert_eq!(out.hunger, 100);
        assert_eq!(out.last_hunger_decay, start);
        pet.apply_decay(&out);
        // One more minute closes the interval.
        let out = compute_decay(&pet, start + Duration::minutes(30), &DecayConfig::default());
        assert_eq!(out.hunger, 99);
        assert_eq!(out.last_hunger_decay, start + Duration::minutes(30));
    }

    #[test]
    fn clock_skew_consumes_nothing() {
        let start = at(8, 0);
        let pet = base_pet(start);
        let out = compute_decay(&pet, start - Duration::hours(5), &DecayConfig::default());
        assert_eq!(out.hunger, 100);
        assert_eq!(out.happiness, 100);
        assert_eq!(out.cleanliness, 100);
        assert_eq!(out.health, 100);
        assert_eq!(out.last_hunger_decay, start);
        assert_eq!(out.last_health_decay, start);
    }

    #[test]
    fn just_became_sick_resets_health_clock_without_decay() {
        let start = at(8, 0);
        let mut pet = base_pet(start);
        pet.hunger = 1;
        let now = start + Duration::hours(10);
        let out = compute_decay(&pet, now, &DecayConfig::default());
        assert_eq!(out.hunger, 0);
        assert!(out.needs_critical);
        // Became sick this call: health untouched, clock starts now.
        assert_eq!(out.health, 100);
        assert!(!out.is_sick);
        assert_eq!(out.last_health_decay, now);
    }

    #[test]
    fn continuously_sick_pet_loses_health() {
        let start = at(8, 0);
        let mut pet = base_pet(start);
        pet.hunger = 0;
        let now = start + Duration::hours(3);
        let out = compute_decay(&pet, now, &DecayConfig::default());
        assert_eq!(out.health, 97);
        assert_eq!(out.last_health_decay, start + Duration::hours(3));
    }

    #[test]
    fn recovered_pet_keeps_health_and_clears_sickness_timer() {
        let start = at(8, 0);
        let mut pet = base_pet(start);
        pet.health = 40;
        // All needs above zero: not sick, regardless of history.
        let now = start + Duration::hours(2);
        let out = compute_decay(&pet, now, &DecayConfig::default());
        assert_eq!(out.health, 40);
        assert_eq!(out.last_health_decay, now);
    }

    #[test]
    fn health_zero_marks_pet_sick() {
        let start = at(8, 0);
        let mut pet = base_pet(start);
        pet.hunger = 0;
        pet.health = 2;
        let out = compute_decay(&pet, start + Duration::hours(5), &DecayConfig::default());
        assert_eq!(out.health, 0);
        assert!(out.is_sick);
    }

    #[test]
    fn very_long_absence_clamps_at_zero() {
        let start = at(8, 0);
        let mut pet = base_pet(start);
        pet.hunger = 0;
        let out = compute_decay(&pet, start + Duration::days(4000), &DecayConfig::default());
        assert_eq!(out.hunger, 0);
        assert_eq!(out.happiness, 0);
        assert_eq!(out.cleanliness, 0);
        assert_eq!(out.health, 0);
        assert!(out.is_sick);
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut cfg = DecayConfig::default();
        cfg.cleanliness.interval_minutes = 0;
        assert_eq!(
            cfg.validate(),
            Err(DecayConfigError::ZeroInterval {
                stat: "cleanliness"
            })
        );
        assert!(DecayConfig::default().validate().is_ok());
    }
}
