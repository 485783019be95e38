//! Nestlings Game Engine
//!
//! Platform-agnostic core game logic for the Nestlings virtual-pet game.
//! This crate provides the simulation mechanics (stat decay, progression,
//! genetics, and daily challenges) without UI or platform-specific
//! dependencies. Every component is a pure computation over explicitly
//! supplied arguments; time comes from an injected [`Clock`] and randomness
//! from caller-supplied [`rand::Rng`] sources, so everything replays
//! deterministically.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

pub mod actions;
pub mod challenges;
pub mod clock;
pub mod constants;
pub mod decay;
pub mod genetics;
pub mod progression;
pub mod state;

// Re-export commonly used types
pub use actions::{ActionConfig, ActionEffects, CareAction, apply_action, cooldown_remaining};
pub use challenges::{
    ChallengeCatalog, ChallengeError, ChallengeKind, ChallengeReward, ChallengeTemplate,
    ClaimError, DailyChallenge, ProgressSemantics, ProgressUpdate, assign_daily, claim,
    daily_challenge_count, update_progress,
};
pub use clock::{Clock, DayKey, DayPolicy, FixedClock, SystemClock, UtcDayPolicy};
pub use decay::{DecayConfig, DecayOutcome, StatDecayRate, compute_decay};
pub use genetics::{
    GeneticsCatalog, GeneticsConfig, TraitRoll, breeding_ready, hatch, hatch_name,
    incubation_remaining, inherit_traits,
};
pub use progression::{ProgressionConfig, XpOutcome, apply_xp};
pub use state::{EvolutionStage, Pet, PetId};

/// Trait for abstracting pet persistence.
/// Platform-specific implementations should provide this; the engine only
/// ever exchanges full record snapshots.
pub trait PetStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a pet snapshot by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the pet cannot be loaded.
    fn load_pet(&self, id: &str) -> Result<Option<Pet>, Self::Error>;

    /// Persist a pet snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the pet cannot be saved.
    fn save_pet(&self, pet: &Pet) -> Result<(), Self::Error>;
}

/// Trait for abstracting daily-challenge persistence.
pub trait ChallengeStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a user's challenge instances for one calendar day.
    ///
    /// # Errors
    ///
    /// Returns an error if the instances cannot be loaded.
    fn load_daily(&self, user_id: &str, day: DayKey) -> Result<Vec<DailyChallenge>, Self::Error>;

    /// Persist a user's challenge instances for one calendar day.
    ///
    /// # Errors
    ///
    /// Returns an error if the instances cannot be saved.
    fn save_daily(
        &self,
        user_id: &str,
        day: DayKey,
        challenges: &[DailyChallenge],
    ) -> Result<(), Self::Error>;

    /// Conditionally claim a completed, unclaimed challenge and return its
    /// reward. Implementations must make the `completed && !claimed` check
    /// and the `claimed = true` write a single atomic step (row lock,
    /// conditional update statement, or equivalent) so two racing claims
    /// cannot both pay out.
    ///
    /// # Errors
    ///
    /// The outer error is a storage failure; the inner [`ClaimError`]
    /// distinguishes not-completed from already-claimed attempts.
    fn claim_challenge(
        &self,
        user_id: &str,
        template_id: &str,
        day: DayKey,
    ) -> Result<Result<ChallengeReward, ClaimError>, Self::Error>;
}

/// Bundle of all engine tuning, serde-loadable as one document.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub decay: DecayConfig,
    #[serde(default)]
    pub actions: ActionConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default)]
    pub genetics: GeneticsConfig,
}

impl GameConfig {
    /// Validate every sub-config.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), GameConfigError> {
        self.decay.validate()?;
        self.progression.validate()?;
        self.genetics.validate()?;
        Ok(())
    }
}

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum GameConfigError {
    #[error(transparent)]
    Decay(#[from] decay::DecayConfigError),
    #[error(transparent)]
    Progression(#[from] progression::ProgressionConfigError),
    #[error(transparent)]
    Genetics(#[from] genetics::GeneticsConfigError),
}

/// Errors raised by the care-action flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CareError {
    #[error("{action} is on cooldown for another {remaining_minutes} minute(s)")]
    OnCooldown {
        action: CareAction,
        remaining_minutes: i64,
    },
    #[error(transparent)]
    Progress(#[from] ChallengeError),
}

/// Errors raised by the breeding flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreedError {
    #[error("pair is already incubating an egg")]
    AlreadyBreeding,
    #[error("pair has no incubating egg")]
    NotBreeding,
    #[error("egg needs another {remaining_minutes} minute(s) of incubation")]
    StillIncubating { remaining_minutes: i64 },
}

/// Result of one care action, for the caller's UI celebrations and payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareOutcome {
    pub xp: XpOutcome,
    pub coins_gained: i64,
    pub challenges_completed: usize,
}

/// Main game engine composing the pure components around injected clock,
/// storage, and day-boundary policy.
pub struct GameEngine<C, S, P = UtcDayPolicy>
where
    C: Clock,
    S: PetStorage + ChallengeStorage,
    P: DayPolicy,
{
    clock: C,
    storage: S,
    day_policy: P,
    cfg: GameConfig,
    challenge_catalog: ChallengeCatalog,
    genetics_catalog: GeneticsCatalog,
}

impl<C, S> GameEngine<C, S>
where
    C: Clock,
    S: PetStorage + ChallengeStorage,
{
    /// Create an engine with default tuning, the built-in catalogs, and the
    /// UTC-midnight day boundary.
    pub fn new(clock: C, storage: S) -> Self {
        Self::with_day_policy(clock, storage, UtcDayPolicy)
    }
}

impl<C, S, P> GameEngine<C, S, P>
where
    C: Clock,
    S: PetStorage + ChallengeStorage,
    P: DayPolicy,
{
    pub fn with_day_policy(clock: C, storage: S, day_policy: P) -> Self {
        Self {
            clock,
            storage,
            day_policy,
            cfg: GameConfig::default(),
            challenge_catalog: ChallengeCatalog::default_catalog().clone(),
            genetics_catalog: GeneticsCatalog::default_catalog().clone(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, cfg: GameConfig) -> Self {
        self.cfg = cfg;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.cfg
    }

    fn today(&self) -> DayKey {
        self.day_policy.day_key(self.clock.now())
    }

    /// Create and persist a freshly adopted pet.
    ///
    /// # Errors
    ///
    /// Returns an error if the pet cannot be saved.
    pub fn adopt(
        &self,
        id: PetId,
        name: &str,
        species: &str,
    ) -> Result<Pet, <S as PetStorage>::Error> {
        let pet = Pet::new(id, name, species, self.clock.now());
        self.storage.save_pet(&pet)?;
        Ok(pet)
    }

    /// Apply pending decay to an in-memory pet at the engine clock's `now`.
    pub fn refresh(&self, pet: &mut Pet) -> DecayOutcome {
        let outcome = compute_decay(pet, self.clock.now(), &self.cfg.decay);
        pet.apply_decay(&outcome);
        outcome
    }

    /// Load a pet, apply pending decay, persist, and return the current
    /// snapshot. This is the decay-aware read every caller goes through
    /// before showing a pet or mutating its stats.
    ///
    /// # Errors
    ///
    /// Returns an error if the pet cannot be loaded or saved back.
    pub fn checkout_pet(&self, id: &str) -> Result<Option<Pet>, anyhow::Error> {
        let Some(mut pet) = self.storage.load_pet(id).map_err(anyhow::Error::new)? else {
            return Ok(None);
        };
        self.refresh(&mut pet);
        self.storage.save_pet(&pet).map_err(anyhow::Error::new)?;
        Ok(Some(pet))
    }

    /// Perform a care action: cooldown gate, decay, stat effects, XP award,
    /// and challenge progress (the action's cumulative count plus gauge
    /// updates from the pet's new stat values).
    ///
    /// # Errors
    ///
    /// Returns `CareError::OnCooldown` when the action is not ready yet.
    pub fn care_for(
        &self,
        pet: &mut Pet,
        challenges: &mut [DailyChallenge],
        action: CareAction,
    ) -> Result<CareOutcome, CareError> {
        let now = self.clock.now();
        if let Some(remaining) = cooldown_remaining(pet, action, &self.cfg.actions, now) {
            return Err(CareError::OnCooldown {
                action,
                remaining_minutes: remaining.num_minutes().max(1),
            });
        }

        self.refresh(pet);
        apply_action(pet, action, &self.cfg.actions, now);

        let effects = self.cfg.actions.effects(action);
        let xp = apply_xp(
            pet.level,
            pet.xp,
            pet.stage,
            effects.xp_reward,
            &self.cfg.progression,
        );
        pet.level = xp.level;
        pet.xp = xp.xp;
        pet.stage = xp.stage;

        let today = self.today();
        let mut challenges_completed = 0;
        let update = update_progress(challenges, action.challenge_kind(), 1, today, now)?;
        challenges_completed += update.newly_completed;
        for (kind, value) in [
            (ChallengeKind::Happiness, pet.happiness),
            (ChallengeKind::Health, pet.health),
            (ChallengeKind::Energy, pet.energy),
        ] {
            let update = update_progress(challenges, kind, i64::from(value), today, now)?;
            challenges_completed += update.newly_completed;
        }

        Ok(CareOutcome {
            xp,
            coins_gained: effects.coin_reward,
            challenges_completed,
        })
    }

    /// Fetch today's challenge instances for a user, topping the set up to
    /// three with freshly shuffled templates. Idempotent within a day.
    ///
    /// # Errors
    ///
    /// Returns an error if the instances cannot be loaded or saved.
    pub fn daily_challenges<R>(
        &self,
        user_id: &str,
        rng: &mut R,
    ) -> Result<Vec<DailyChallenge>, anyhow::Error>
    where
        R: Rng + ?Sized,
    {
        let day = self.today();
        let mut existing = self
            .storage
            .load_daily(user_id, day)
            .map_err(anyhow::Error::new)?;
        let fresh = assign_daily(&existing, &self.challenge_catalog.challenges, day, rng);
        if !fresh.is_empty() {
            existing.extend(fresh);
            self.storage
                .save_daily(user_id, day, &existing)
                .map_err(anyhow::Error::new)?;
        }
        Ok(existing)
    }

    /// Persist an updated challenge set for today.
    ///
    /// # Errors
    ///
    /// Returns an error if the instances cannot be saved.
    pub fn save_daily_challenges(
        &self,
        user_id: &str,
        challenges: &[DailyChallenge],
    ) -> Result<(), <S as ChallengeStorage>::Error> {
        self.storage.save_daily(user_id, self.today(), challenges)
    }

    /// Claim a completed challenge's reward through the storage layer's
    /// conditional update, guaranteeing an at-most-once payout.
    ///
    /// # Errors
    ///
    /// Storage failures and [`ClaimError`] rejections both surface here;
    /// the latter stay downcastable for user-facing messages.
    pub fn claim_reward(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<ChallengeReward, anyhow::Error> {
        let day = self.today();
        self.storage
            .claim_challenge(user_id, template_id, day)
            .map_err(anyhow::Error::new)?
            .map_err(anyhow::Error::new)
    }

    /// Start a pair incubating an egg.
    ///
    /// # Errors
    ///
    /// Returns `BreedError::AlreadyBreeding` if either parent has an egg.
    pub fn start_breeding(&self, parent1: &mut Pet, parent2: &mut Pet) -> Result<(), BreedError> {
        if parent1.breeding_since.is_some() || parent2.breeding_since.is_some() {
            return Err(BreedError::AlreadyBreeding);
        }
        let now = self.clock.now();
        parent1.breeding_since = Some(now);
        parent2.breeding_since = Some(now);
        Ok(())
    }

    /// Hatch a pair's egg once the 24-hour incubation has elapsed, rolling
    /// the child's traits and name from the supplied random source.
    ///
    /// # Errors
    ///
    /// Returns `BreedError::NotBreeding` when no egg is incubating and
    /// `BreedError::StillIncubating` when the timer has not expired.
    pub fn hatch_egg<R>(
        &self,
        parent1: &mut Pet,
        parent2: &mut Pet,
        child_id: PetId,
        rng: &mut R,
    ) -> Result<Pet, BreedError>
    where
        R: Rng + ?Sized,
    {
        let since = parent1.breeding_since.ok_or(BreedError::NotBreeding)?;
        let now = self.clock.now();
        if !breeding_ready(since, now) {
            return Err(BreedError::StillIncubating {
                remaining_minutes: incubation_remaining(since, now).num_minutes().max(1),
            });
        }
        parent1.breeding_since = None;
        parent2.breeding_since = None;
        Ok(hatch(
            child_id,
            parent1,
            parent2,
            &self.cfg.genetics,
            &self.genetics_catalog,
            now,
            rng,
        ))
    }

    /// Record an instant of `now` for callers that need the engine's view of
    /// the current day (e.g. to key a challenge query).
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
