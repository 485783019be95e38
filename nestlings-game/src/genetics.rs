//! Trait inheritance for breeding, hatchling naming, and the incubation
//! clock.
//!
//! The mutation palettes are disjoint from the normal palettes: a mutated
//! child can only carry mutation colors/patterns and a normal child can only
//! carry normal ones. Species is always inherited from a parent and is never
//! mutated or randomized.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{BREEDING_INCUBATION_HOURS, MUTATION_CHANCE, VARIATION_CHANCE};
use crate::state::Pet;

const DEFAULT_GENETICS_DATA: &str = include_str!("../assets/genetics.json");

/// Trait palettes and hatchling name word lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneticsCatalog {
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub mutation_colors: Vec<String>,
    #[serde(default)]
    pub mutation_patterns: Vec<String>,
    #[serde(default)]
    pub name_prefixes: Vec<String>,
    #[serde(default)]
    pub name_suffixes: Vec<String>,
}

impl GeneticsCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_GENETICS_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<GeneticsCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a genetics catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Mutation and natural-variation odds. Defaults match the live game balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneticsConfig {
    #[serde(default = "default_mutation_chance")]
    pub mutation_chance: f64,
    #[serde(default = "default_variation_chance")]
    pub variation_chance: f64,
}

const fn default_mutation_chance() -> f64 {
    MUTATION_CHANCE
}

const fn default_variation_chance() -> f64 {
    VARIATION_CHANCE
}

impl Default for GeneticsConfig {
    fn default() -> Self {
        Self {
            mutation_chance: default_mutation_chance(),
            variation_chance: default_variation_chance(),
        }
    }
}

impl GeneticsConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `GeneticsConfigError` when a chance lies outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), GeneticsConfigError> {
        for (field, value) in [
            ("mutation_chance", self.mutation_chance),
            ("variation_chance", self.variation_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GeneticsConfigError::ChanceOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

/// Errors raised when genetics configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum GeneticsConfigError {
    #[error("{field} must be between 0.0 and 1.0 (got {value})")]
    ChanceOutOfRange { field: &'static str, value: f64 },
}

/// Traits rolled for a child at breeding time. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRoll {
    pub color: String,
    pub pattern: String,
    pub species: String,
    pub is_mutation: bool,
}

fn pick<'a, R>(palette: &'a [String], rng: &mut R) -> Option<&'a str>
where
    R: Rng + ?Sized,
{
    if palette.is_empty() {
        return None;
    }
    palette.get(rng.gen_range(0..palette.len())).map(String::as_str)
}

fn roll_trait<R>(
    from_parent1: &str,
    from_parent2: &str,
    palette: &[String],
    variation_chance: f64,
    rng: &mut R,
) -> String
where
    R: Rng + ?Sized,
{
    let inherited = if rng.gen_bool(0.5) {
        from_parent1
    } else {
        from_parent2
    };
    // Independent low-probability override with any normal palette entry,
    // regardless of what either parent carries.
    if rng.gen_bool(variation_chance) {
        if let Some(varied) = pick(palette, rng) {
            return varied.to_string();
        }
    }
    inherited.to_string()
}

/// Roll a child's color, pattern, and species from two parents.
///
/// A mutation roll (probability `mutation_chance`) replaces color and pattern
/// with draws from the dedicated mutation palettes. Otherwise each trait is
/// taken 50/50 from a parent, with an independent `variation_chance` override
/// from the normal palette. Species is always a 50/50 parental pick.
#[must_use]
pub fn inherit_traits<R>(
    parent1: &Pet,
    parent2: &Pet,
    cfg: &GeneticsConfig,
    catalog: &GeneticsCatalog,
    rng: &mut R,
) -> TraitRoll
where
    R: Rng + ?Sized,
{
    let species = if rng.gen_bool(0.5) {
        parent1.species.clone()
    } else {
        parent2.species.clone()
    };

    if rng.gen_bool(cfg.mutation_chance) {
        let color = pick(&catalog.mutation_colors, rng)
            .unwrap_or(parent1.color.as_str())
            .to_string();
        let pattern = pick(&catalog.mutation_patterns, rng)
            .unwrap_or(parent1.pattern.as_str())
            .to_string();
        return TraitRoll {
            color,
            pattern,
            species,
            is_mutation: true,
        };
    }

    let color = roll_trait(
        &parent1.color,
        &parent2.color,
        &catalog.colors,
        cfg.variation_chance,
        rng,
    );
    let pattern = roll_trait(
        &parent1.pattern,
        &parent2.pattern,
        &catalog.patterns,
        cfg.variation_chance,
        rng,
    );

    TraitRoll {
        color,
        pattern,
        species,
        is_mutation: false,
    }
}

/// Cosmetic hatchling name: one prefix word plus one suffix word, drawn
/// independently and joined with a space.
#[must_use]
pub fn hatch_name<R>(catalog: &GeneticsCatalog, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let prefix = pick(&catalog.name_prefixes, rng).unwrap_or("Little");
    let suffix = pick(&catalog.name_suffixes, rng).unwrap_or("Nestling");
    format!("{prefix} {suffix}")
}

/// Whether an egg started at `since` has finished its 24-hour incubation.
/// Waiting is data, not a blocking timer: callers poll with their clock.
#[must_use]
pub fn breeding_ready(since: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(since) >= Duration::hours(BREEDING_INCUBATION_HOURS)
}

/// Time left on an incubating egg, zero once it is ready.
#[must_use]
pub fn incubation_remaining(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let remaining = since + Duration::hours(BREEDING_INCUBATION_HOURS) - now;
    remaining.max(Duration::zero())
}

/// Create the hatchling record for a finished egg: rolled traits, generated
/// name, lineage pointers, full starting stats anchored at `now`.
#[must_use]
pub fn hatch<R>(
    id: String,
    parent1: &Pet,
    parent2: &Pet,
    cfg: &GeneticsConfig,
    catalog: &GeneticsCatalog,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Pet
where
    R: Rng + ?Sized,
{
    let traits = inherit_traits(parent1, parent2, cfg, catalog, rng);
    let name = hatch_name(catalog, rng);
    let mut child = Pet::new(id, name, traits.species, now);
    child.color = traits.color;
    child.pattern = traits.pattern;
    child.is_mutation = traits.is_mutation;
    child.parent1 = Some(parent1.id.clone());
    child.parent2 = Some(parent2.id.clone());
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn parents() -> (Pet, Pet) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut p1 = Pet::new(String::from("p1"), "Waffles", "longfluff", now);
        p1.color = String::from("brown");
        p1.pattern = String::from("spotted");
        let mut p2 = Pet::new(String::from("p2"), "Clover", "shortwhisker", now);
        p2.color = String::from("white");
        p2.pattern = String::from("striped");
        (p1, p2)
    }

    #[test]
    fn static_catalog_parses_and_palettes_are_disjoint() {
        let catalog = GeneticsCatalog::default_catalog();
        assert!(!catalog.colors.is_empty());
        assert!(!catalog.mutation_colors.is_empty());
        for color in &catalog.mutation_colors {
            assert!(!catalog.colors.contains(color), "{color} in both palettes");
        }
        for pattern in &catalog.mutation_patterns {
            assert!(!catalog.patterns.contains(pattern));
        }
    }

    #[test]
    fn species_always_comes_from_a_parent() {
        let (p1, p2) = parents();
        let catalog = GeneticsCatalog::default_catalog();
        let cfg = GeneticsConfig::default();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..500 {
            let roll = inherit_traits(&p1, &p2, &cfg, catalog, &mut rng);
            assert!(roll.species == p1.species || roll.species == p2.species);
        }
    }

    #[test]
    fn mutation_draws_only_from_mutation_palettes() {
        let (p1, p2) = parents();
        let catalog = GeneticsCatalog::default_catalog();
        let always = GeneticsConfig {
            mutation_chance: 1.0,
            ..GeneticsConfig::default()
        };
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..100 {
            let roll = inherit_traits(&p1, &p2, &always, catalog, &mut rng);
            assert!(roll.is_mutation);
            assert!(catalog.mutation_colors.contains(&roll.color));
            assert!(catalog.mutation_patterns.contains(&roll.pattern));
        }
    }

    #[test]
    fn no_variation_means_pure_parental_traits() {
        let (p1, p2) = parents();
        let catalog = GeneticsCatalog::default_catalog();
        let strict = GeneticsConfig {
            mutation_chance: 0.0,
            variation_chance: 0.0,
        };
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        for _ in 0..100 {
            let roll = inherit_traits(&p1, &p2, &strict, catalog, &mut rng);
            assert!(!roll.is_mutation);
            assert!(roll.color == p1.color || roll.color == p2.color);
            assert!(roll.pattern == p1.pattern || roll.pattern == p2.pattern);
        }
    }

    #[test]
    fn hatch_name_joins_two_words() {
        let catalog = GeneticsCatalog::default_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(17);
        let name = hatch_name(catalog, &mut rng);
        let words: Vec<&str> = name.split(' ').collect();
        assert_eq!(words.len(), 2);
        assert!(catalog.name_prefixes.iter().any(|w| w == words[0]));
        assert!(catalog.name_suffixes.iter().any(|w| w == words[1]));
    }

    #[test]
    fn incubation_takes_a_full_day() {
        let since = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert!(!breeding_ready(since, since + Duration::hours(23)));
        assert!(breeding_ready(since, since + Duration::hours(24)));
        assert_eq!(
            incubation_remaining(since, since + Duration::hours(20)),
            Duration::hours(4)
        );
        assert_eq!(
            incubation_remaining(since, since + Duration::hours(30)),
            Duration::zero()
        );
    }

    #[test]
    fn hatchling_records_lineage() {
        let (p1, p2) = parents();
        let catalog = GeneticsCatalog::default_catalog();
        let cfg = GeneticsConfig::default();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(19);
        let child = hatch(String::from("c1"), &p1, &p2, &cfg, catalog, now, &mut rng);
        assert_eq!(child.parent1.as_deref(), Some("p1"));
        assert_eq!(child.parent2.as_deref(), Some("p2"));
        assert_eq!(child.level, 1);
        assert_eq!(child.hunger, 100);
    }

    #[test]
    fn validate_rejects_out_of_range_chance() {
        let bad = GeneticsConfig {
            mutation_chance: 1.5,
            ..GeneticsConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(GeneticsConfigError::ChanceOutOfRange { .. })
        ));
        assert!(GeneticsConfig::default().validate().is_ok());
    }
}
