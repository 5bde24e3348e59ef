//! Configuration types for the genetic expression search.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ComputingBound;

/// Top-level search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Individuals produced per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of generations to run after the initial population is scored.
    #[serde(default = "default_generation_count")]
    pub generation_count: usize,
    /// Maximum depth of the trees in the initial population.
    #[serde(default = "default_initial_depth")]
    pub initial_depth: usize,
    /// Elite keeper capacity. Defaults to a tenth of the population.
    #[serde(default)]
    pub elite_size: Option<usize>,
    /// Tournament size, at least 2. Defaults to a hundredth of the population,
    /// raised to 2 for small populations.
    #[serde(default)]
    pub tournament_size: Option<usize>,
    /// Genetic operator probabilities.
    #[serde(default)]
    pub mutation: MutationRates,
    /// Random tree generation settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generation_count: default_generation_count(),
            initial_depth: default_initial_depth(),
            elite_size: None,
            tournament_size: None,
            mutation: MutationRates::default(),
            generator: GeneratorConfig::default(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    1000
}
fn default_generation_count() -> usize {
    100
}
fn default_initial_depth() -> usize {
    10
}

impl SearchConfig {
    /// Capacity of the elite keeper.
    pub fn elite_capacity(&self) -> usize {
        self.elite_size
            .unwrap_or(self.population_size / 10)
            .max(1)
    }

    /// Number of entries drawn per tournament.
    pub fn tournament_draws(&self) -> usize {
        self.tournament_size
            .unwrap_or_else(|| self.population_size.div_ceil(100))
            .max(2)
    }

    /// Validate search configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if self.generation_count == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.initial_depth == 0 {
            return Err(ConfigError::InvalidDepth);
        }
        if self.elite_size == Some(0) {
            return Err(ConfigError::InvalidEliteSize);
        }
        if matches!(self.tournament_size, Some(size) if size < 2) {
            return Err(ConfigError::InvalidTournamentSize);
        }
        self.mutation.validate()?;
        self.generator.validate()?;
        Ok(())
    }
}

/// Probabilities of the genetic operators, evaluated per node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRates {
    /// Replace a constant with a fresh random value.
    #[serde(default = "default_constant_rate")]
    pub constant: f64,
    /// Flip an identifier between `x` and `y`.
    #[serde(default = "default_identifier_rate")]
    pub identifier: f64,
    /// Swap an operator within its family (`+`/`-`, `*`/`/`), or drop a negation.
    #[serde(default = "default_same_family_rate")]
    pub same_family: f64,
    /// Swap an operator into the other family.
    #[serde(default = "default_cross_family_rate")]
    pub cross_family: f64,
    /// Swap the branches of a ternary.
    #[serde(default = "default_branch_swap_rate")]
    pub branch_swap: f64,
    /// Replace the node with a fresh random tree.
    #[serde(default = "default_full_mutation_rate")]
    pub full_mutation: f64,
    /// Crossover probability numerator; the per-node probability is
    /// `crossover / size` of the mutated tree.
    #[serde(default = "default_crossover")]
    pub crossover: f64,
    /// Depth of the trees produced by full mutation.
    #[serde(default = "default_full_mutation_depth")]
    pub full_mutation_depth: usize,
}

impl Default for MutationRates {
    fn default() -> Self {
        Self {
            constant: default_constant_rate(),
            identifier: default_identifier_rate(),
            same_family: default_same_family_rate(),
            cross_family: default_cross_family_rate(),
            branch_swap: default_branch_swap_rate(),
            full_mutation: default_full_mutation_rate(),
            crossover: default_crossover(),
            full_mutation_depth: default_full_mutation_depth(),
        }
    }
}

fn default_constant_rate() -> f64 {
    0.15
}
fn default_identifier_rate() -> f64 {
    0.10
}
fn default_same_family_rate() -> f64 {
    0.10
}
fn default_cross_family_rate() -> f64 {
    0.05
}
fn default_branch_swap_rate() -> f64 {
    0.05
}
fn default_full_mutation_rate() -> f64 {
    0.01
}
fn default_crossover() -> f64 {
    3.0
}
fn default_full_mutation_depth() -> usize {
    5
}

impl MutationRates {
    /// Rates that never alter a tree.
    pub fn disabled() -> Self {
        Self {
            constant: 0.0,
            identifier: 0.0,
            same_family: 0.0,
            cross_family: 0.0,
            branch_swap: 0.0,
            full_mutation: 0.0,
            crossover: 0.0,
            full_mutation_depth: default_full_mutation_depth(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |value: f64, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidProbability { name, value })
            }
        };
        check(self.constant, "constant")?;
        check(self.identifier, "identifier")?;
        check(self.same_family, "same_family")?;
        check(self.cross_family, "cross_family")?;
        check(self.branch_swap, "branch_swap")?;
        check(self.full_mutation, "full_mutation")?;
        if !(self.crossover >= 0.0 && self.crossover.is_finite()) {
            return Err(ConfigError::InvalidProbability {
                name: "crossover",
                value: self.crossover,
            });
        }
        if self.full_mutation_depth == 0 {
            return Err(ConfigError::InvalidDepth);
        }
        Ok(())
    }
}

/// Random tree generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Exclusive upper bound of the integer part of random constants.
    #[serde(default = "default_constant_magnitude")]
    pub constant_magnitude: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            constant_magnitude: default_constant_magnitude(),
        }
    }
}

fn default_constant_magnitude() -> u32 {
    i32::MAX as u32
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.constant_magnitude == 0 {
            return Err(ConfigError::InvalidConstantMagnitude);
        }
        Ok(())
    }
}

/// Configuration of a command-line run: sampling bounds plus search settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Sampling range of `x`.
    #[serde(default)]
    pub x_bound: ComputingBound,
    /// Sampling range of `y`.
    #[serde(default)]
    pub y_bound: ComputingBound,
    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,
}

impl RunConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&content)?;
        config.search.validate()?;
        Ok(config)
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Bound lower ({lower}) must be finite and strictly below upper ({upper})")]
    InvalidBound { lower: f64, upper: f64 },
    #[error("Bound step count must be positive")]
    InvalidStepCount,
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Generation count must be positive")]
    NoGenerations,
    #[error("Tree depth must be positive")]
    InvalidDepth,
    #[error("Elite size must be positive")]
    InvalidEliteSize,
    #[error("Tournament size must be at least 2")]
    InvalidTournamentSize,
    #[error("Invalid {name} probability: {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Constant magnitude must be positive")]
    InvalidConstantMagnitude,
}

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.elite_capacity(), 100);
        assert_eq!(config.tournament_draws(), 10);
    }

    #[test]
    fn test_small_population_derived_sizes() {
        let config = SearchConfig {
            population_size: 10,
            ..Default::default()
        };
        assert_eq!(config.elite_capacity(), 1);
        assert_eq!(config.tournament_draws(), 2);
    }

    #[test]
    fn test_invalid_configs() {
        let config = SearchConfig {
            population_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PopulationTooSmall)
        ));

        let config = SearchConfig {
            mutation: MutationRates {
                constant: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "constant",
                ..
            })
        ));

        let config = SearchConfig {
            elite_size: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEliteSize)
        ));
    }

    #[test]
    fn test_tournament_size_below_two_rejected() {
        for size in [0, 1] {
            let config = SearchConfig {
                tournament_size: Some(size),
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTournamentSize)
            ));
        }

        let config = SearchConfig {
            tournament_size: Some(2),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.tournament_draws(), 2);
    }

    #[test]
    fn test_serialization() {
        let config = RunConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.search.population_size, config.search.population_size);
        assert_eq!(parsed.x_bound, config.x_bound);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: RunConfig =
            serde_json::from_str(r#"{"search": {"population_size": 50}}"#).unwrap();
        assert_eq!(parsed.search.population_size, 50);
        assert_eq!(parsed.search.generation_count, 100);
        assert_eq!(parsed.search.mutation.crossover, 3.0);
        assert_eq!(parsed.x_bound, ComputingBound::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"x_bound": {{"lower": 0.0, "upper": 4.0, "step_count": 4}},
                "search": {{"population_size": 20, "random_seed": 7}}}}"#
        )
        .unwrap();

        let config = RunConfig::from_json_file(&path).unwrap();
        assert_eq!(config.x_bound.step(), 1.0);
        assert_eq!(config.search.random_seed, Some(7));

        fs::write(&path, r#"{"search": {"population_size": 1}}"#).unwrap();
        assert!(matches!(
            RunConfig::from_json_file(&path),
            Err(ConfigLoadError::Invalid(ConfigError::PopulationTooSmall))
        ));

        assert!(matches!(
            RunConfig::from_json_file(dir.path().join("missing.json")),
            Err(ConfigLoadError::Io(_))
        ));
    }
}
