//! Injectable time source and calendar-day policy.
//!
//! The engine never reads the wall clock directly; callers supply a [`Clock`]
//! so simulations replay deterministically. The challenge day boundary is a
//! [`DayPolicy`] so timezone behavior is a single deliberate decision rather
//! than ad hoc date truncation scattered across call sites.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Calendar-day identifier used to scope daily challenge instances.
pub type DayKey = NaiveDate;

/// Trait for abstracting the current time.
/// Platform-specific implementations should provide this.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source for production callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and deterministic replays. Clones share
/// the same instant, so a handle kept by a test steers the engine's copy.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Trait mapping an instant to the calendar day it belongs to.
pub trait DayPolicy {
    fn day_key(&self, at: DateTime<Utc>) -> DayKey;
}

/// Default day boundary: midnight UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcDayPolicy;

impl DayPolicy for UtcDayPolicy {
    fn day_key(&self, at: DateTime<Utc>) -> DayKey {
        at.date_naive()
    }
}
