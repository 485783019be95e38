//! Daily challenge assignment, progress tracking, and reward claims.
//!
//! Challenges come in two flavors: cumulative kinds count qualifying actions
//! ("feed 5 times") and gauge kinds store the latest absolute stat value
//! ("get happiness to 90"). Instances are scoped to a calendar day; a new
//! day simply gets fresh instances, so progress never resets in place.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::clock::DayKey;
use crate::constants::DAILY_CHALLENGE_COUNT;

const DEFAULT_CHALLENGE_DATA: &str = include_str!("../assets/challenges.json");

/// How many challenge instances each user holds per calendar day.
#[must_use]
pub const fn daily_challenge_count() -> usize {
    DAILY_CHALLENGE_COUNT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Feed,
    Play,
    Clean,
    Sleep,
    Happiness,
    Health,
    Energy,
}

impl ChallengeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Play => "play",
            Self::Clean => "clean",
            Self::Sleep => "sleep",
            Self::Happiness => "happiness",
            Self::Health => "health",
            Self::Energy => "energy",
        }
    }

    /// Cumulative kinds count actions; gauge kinds track a stat's current
    /// absolute value.
    #[must_use]
    pub const fn semantics(self) -> ProgressSemantics {
        match self {
            Self::Feed | Self::Play | Self::Clean | Self::Sleep => ProgressSemantics::Cumulative,
            Self::Happiness | Self::Health | Self::Energy => ProgressSemantics::Gauge,
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feed" => Ok(Self::Feed),
            "play" => Ok(Self::Play),
            "clean" => Ok(Self::Clean),
            "sleep" => Ok(Self::Sleep),
            "happiness" => Ok(Self::Happiness),
            "health" => Ok(Self::Health),
            "energy" => Ok(Self::Energy),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSemantics {
    Cumulative,
    Gauge,
}

/// Immutable challenge definition, seeded once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeTemplate {
    pub id: String,
    pub kind: ChallengeKind,
    #[serde(default)]
    pub description: String,
    pub target: u32,
    #[serde(default)]
    pub coin_reward: i64,
    #[serde(default)]
    pub xp_reward: u32,
}

/// Seeded challenge template set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChallengeCatalog {
    #[serde(default)]
    pub challenges: Vec<ChallengeTemplate>,
}

impl ChallengeCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_CHALLENGE_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<ChallengeCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a challenge catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate every template.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeConfigError` for the first template with a zero
    /// target.
    pub fn validate(&self) -> Result<(), ChallengeConfigError> {
        for template in &self.challenges {
            if template.target == 0 {
                return Err(ChallengeConfigError::ZeroTarget {
                    id: template.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Errors raised when challenge templates violate their invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChallengeConfigError {
    #[error("challenge template {id} has a zero target")]
    ZeroTarget { id: String },
}

/// A per-user, per-day challenge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub template_id: String,
    pub kind: ChallengeKind,
    pub target: u32,
    #[serde(default)]
    pub coin_reward: i64,
    #[serde(default)]
    pub xp_reward: u32,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub claimed: bool,
    pub assigned_day: DayKey,
}

impl DailyChallenge {
    /// Fresh instance of a template for the given day.
    #[must_use]
    pub fn assign(template: &ChallengeTemplate, day: DayKey) -> Self {
        Self {
            template_id: template.id.clone(),
            kind: template.kind,
            target: template.target,
            coin_reward: template.coin_reward,
            xp_reward: template.xp_reward,
            progress: 0,
            completed: false,
            completed_at: None,
            claimed: false,
            assigned_day: day,
        }
    }
}

/// Reward granted exactly once per completed challenge instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeReward {
    pub coins: i64,
    pub xp: u32,
}

/// Errors raised on invalid progress input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("progress amount must be non-negative (got {amount})")]
    NegativeProgress { amount: i64 },
}

/// Errors raised on an invalid claim attempt. The two cases are distinct so
/// callers can show accurate messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("challenge is not completed yet")]
    NotCompleted,
    #[error("challenge reward was already claimed")]
    AlreadyClaimed,
}

/// Summary of one progress pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Instances that matched kind/day and were still open.
    pub matched: usize,
    /// Instances that crossed their target during this pass.
    pub newly_completed: usize,
}

/// Apply an activity event to the day's challenge instances.
///
/// Only instances matching `kind`, assigned to `today`, and not yet completed
/// are touched. Cumulative kinds add `amount` capped at target; gauge kinds
/// overwrite progress with `amount` capped at target (the latest absolute
/// stat value, not a sum). Completion stamps `completed_at` once.
///
/// # Errors
///
/// Returns `ChallengeError::NegativeProgress` when `amount` is negative;
/// progress can never move backward through this API.
pub fn update_progress(
    challenges: &mut [DailyChallenge],
    kind: ChallengeKind,
    amount: i64,
    today: DayKey,
    now: DateTime<Utc>,
) -> Result<ProgressUpdate, ChallengeError> {
    if amount < 0 {
        return Err(ChallengeError::NegativeProgress { amount });
    }
    let amount = u32::try_from(amount).unwrap_or(u32::MAX);

    let mut update = ProgressUpdate::default();
    for challenge in challenges
        .iter_mut()
        .filter(|c| c.kind == kind && !c.completed && c.assigned_day == today)
    {
        update.matched += 1;
        challenge.progress = match kind.semantics() {
            ProgressSemantics::Cumulative => challenge
                .progress
                .saturating_add(amount)
                .min(challenge.target),
            ProgressSemantics::Gauge => amount.min(challenge.target),
        };
        if challenge.progress >= challenge.target {
            challenge.completed = true;
            challenge.completed_at = Some(now);
            update.newly_completed += 1;
        }
    }
    Ok(update)
}

/// Top up a user's challenge set for `day` to exactly three instances.
///
/// Returns the *new* instances to create; existing instances for `day` are
/// never touched or duplicated, so calling this repeatedly within a day is
/// idempotent. Templates already assigned today are excluded from the
/// shuffle.
#[must_use]
pub fn assign_daily<R>(
    existing: &[DailyChallenge],
    templates: &[ChallengeTemplate],
    day: DayKey,
    rng: &mut R,
) -> SmallVec<[DailyChallenge; 3]>
where
    R: Rng + ?Sized,
{
    let todays: Vec<&DailyChallenge> = existing
        .iter()
        .filter(|c| c.assigned_day == day)
        .collect();
    let needed = DAILY_CHALLENGE_COUNT.saturating_sub(todays.len());
    if needed == 0 {
        return SmallVec::new();
    }

    let taken: HashSet<&str> = todays.iter().map(|c| c.template_id.as_str()).collect();
    let mut candidates: Vec<&ChallengeTemplate> = templates
        .iter()
        .filter(|t| !taken.contains(t.id.as_str()))
        .collect();
    candidates.shuffle(rng);

    candidates
        .into_iter()
        .take(needed)
        .map(|template| DailyChallenge::assign(template, day))
        .collect()
}

/// One-shot reward claim. This is the sole point at which the reward is
/// granted; callers must make the surrounding persistence conditional so two
/// concurrent claims cannot both observe `claimed == false`.
///
/// # Errors
///
/// Returns `ClaimError::NotCompleted` for an incomplete challenge and
/// `ClaimError::AlreadyClaimed` for a second claim attempt.
pub fn claim(challenge: &mut DailyChallenge) -> Result<ChallengeReward, ClaimError> {
    if !challenge.completed {
        return Err(ClaimError::NotCompleted);
    }
    if challenge.claimed {
        return Err(ClaimError::AlreadyClaimed);
    }
    challenge.claimed = true;
    Ok(ChallengeReward {
        coins: challenge.coin_reward,
        xp: challenge.xp_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn day() -> DayKey {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn template(id: &str, kind: ChallengeKind, target: u32) -> ChallengeTemplate {
        ChallengeTemplate {
            id: id.to_string(),
            kind,
            description: String::new(),
            target,
            coin_reward: 10,
            xp_reward: 10,
        }
    }

    #[test]
    fn static_catalog_parses_and_validates() {
        let catalog = ChallengeCatalog::default_catalog();
        assert!(!catalog.challenges.is_empty());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn cumulative_progress_adds_and_caps() {
        let mut set = vec![DailyChallenge::assign(
            &template("feed-5", ChallengeKind::Feed, 5),
            day(),
        )];
        update_progress(&mut set, ChallengeKind::Feed, 2, day(), now()).unwrap();
        assert_eq!(set[0].progress, 2);
        assert!(!set[0].completed);
        let update = update_progress(&mut set, ChallengeKind::Feed, 9, day(), now()).unwrap();
        assert_eq!(set[0].progress, 5);
        assert!(set[0].completed);
        assert_eq!(set[0].completed_at, Some(now()));
        assert_eq!(update.newly_completed, 1);
    }

    #[test]
    fn gauge_progress_overwrites_not_sums() {
        let mut set = vec![DailyChallenge::assign(
            &template("happiness-100", ChallengeKind::Happiness, 100),
            day(),
        )];
        update_progress(&mut set, ChallengeKind::Happiness, 60, day(), now()).unwrap();
        assert_eq!(set[0].progress, 60);
        update_progress(&mut set, ChallengeKind::Happiness, 40, day(), now()).unwrap();
        // Latest absolute value, not 100; the challenge stays open.
        assert_eq!(set[0].progress, 40);
        assert!(!set[0].completed);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut set = vec![DailyChallenge::assign(
            &template("feed-5", ChallengeKind::Feed, 5),
            day(),
        )];
        assert_eq!(
            update_progress(&mut set, ChallengeKind::Feed, -1, day(), now()),
            Err(ChallengeError::NegativeProgress { amount: -1 })
        );
        assert_eq!(set[0].progress, 0);
    }

    #[test]
    fn completed_and_foreign_instances_are_untouched() {
        let yesterday = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        let mut done = DailyChallenge::assign(&template("feed-5", ChallengeKind::Feed, 5), day());
        done.progress = 5;
        done.completed = true;
        let stale = DailyChallenge::assign(&template("feed-5", ChallengeKind::Feed, 5), yesterday);
        let other = DailyChallenge::assign(&template("play-3", ChallengeKind::Play, 3), day());
        let mut set = vec![done, stale, other];
        let update = update_progress(&mut set, ChallengeKind::Feed, 3, day(), now()).unwrap();
        assert_eq!(update.matched, 0);
        assert_eq!(set[0].progress, 5);
        assert_eq!(set[1].progress, 0);
        assert_eq!(set[2].progress, 0);
    }

    #[test]
    fn assign_daily_tops_up_to_three() {
        let catalog = ChallengeCatalog::default_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let fresh = assign_daily(&[], &catalog.challenges, day(), &mut rng);
        assert_eq!(fresh.len(), 3);
        let ids: HashSet<&str> = fresh.iter().map(|c| c.template_id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        for challenge in &fresh {
            assert_eq!(challenge.progress, 0);
            assert!(!challenge.completed);
            assert!(!challenge.claimed);
            assert_eq!(challenge.assigned_day, day());
        }
    }

    #[test]
    fn assign_daily_is_idempotent_within_a_day() {
        let catalog = ChallengeCatalog::default_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        let existing: Vec<DailyChallenge> =
            assign_daily(&[], &catalog.challenges, day(), &mut rng).into_vec();
        let again = assign_daily(&existing, &catalog.challenges, day(), &mut rng);
        assert!(again.is_empty());
    }

    #[test]
    fn assign_daily_excludes_already_assigned_templates() {
        let catalog = ChallengeCatalog::default_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(23);
        let first = DailyChallenge::assign(&catalog.challenges[0], day());
        let kept_id = first.template_id.clone();
        let topped = assign_daily(
            std::slice::from_ref(&first),
            &catalog.challenges,
            day(),
            &mut rng,
        );
        assert_eq!(topped.len(), 2);
        assert!(topped.iter().all(|c| c.template_id != kept_id));
    }

    #[test]
    fn new_day_assigns_fresh_instances() {
        let catalog = ChallengeCatalog::default_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(24);
        let yesterday: Vec<DailyChallenge> = assign_daily(
            &[],
            &catalog.challenges,
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            &mut rng,
        )
        .into_vec();
        let today = assign_daily(&yesterday, &catalog.challenges, day(), &mut rng);
        assert_eq!(today.len(), 3);
    }

    #[test]
    fn claim_is_one_way_and_distinct_errors() {
        let mut challenge =
            DailyChallenge::assign(&template("feed-5", ChallengeKind::Feed, 5), day());
        assert_eq!(claim(&mut challenge), Err(ClaimError::NotCompleted));

        challenge.progress = 5;
        challenge.completed = true;
        let reward = claim(&mut challenge).unwrap();
        assert_eq!(reward.coins, 10);
        assert_eq!(reward.xp, 10);
        assert_eq!(claim(&mut challenge), Err(ClaimError::AlreadyClaimed));
    }
}
