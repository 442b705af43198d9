//! Configuration settings for the trial roster solver

use crate::roster::{ROUNDS_LIMIT, SCENES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub problem: ProblemConfig,
    pub rules: RuleConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    /// Number of persons to schedule (ids 1..=persons, odd = male, even = female)
    pub persons: usize,
    /// Number of rounds in the scheduling cycle
    pub rounds: usize,
}

/// Toggles for the optional rules. The foundational rules (partition,
/// channeling, no-repeat, leadership, cardinality) are always enforced
/// and have no flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Long-run rotation fairness: every person sees each scene at least
    /// floor(rounds/4) times and each role at least floor(rounds/3) times
    pub coverage: bool,
    /// Within each scene, slot sizes non-decreasing in role order
    /// (Prosecution <= Observer <= Public)
    pub priority_ordering: bool,
    /// Hard per-slot gender balance |male - female| <= 1. Ignored in
    /// minimize mode, where imbalance becomes the objective instead
    pub gender_balance: bool,
    /// Canonicalize round 1 to cut person-permutation-equivalent branches
    pub symmetry_breaking: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub mode: SolveMode,
    pub timeout_seconds: u64,
    /// Optional cap on explored search nodes
    pub max_nodes: Option<u64>,
    /// Portfolio width for minimize mode; None or 1 runs sequentially
    pub num_threads: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMode {
    /// Return the first schedule satisfying all active rules
    Satisfy,
    /// Branch-and-bound minimization of the total gender imbalance penalty
    Minimize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Configuration problems detected before search starts. The engine never
/// relaxes a mandatory rule on its own; if an instance is infeasible the
/// only remedy is to disable an optional rule here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("number of persons must be positive")]
    NoPersons,
    #[error("number of rounds must be positive")]
    NoRounds,
    #[error("{rounds} rounds exceed the {limit} distinct (scene, role) slots; a person would have to repeat a slot")]
    TooManyRounds { rounds: usize, limit: usize },
    #[error("{persons} persons cannot supply {needed} distinct leaders ({rounds} rounds x {scenes} scenes)")]
    TooFewPersons {
        persons: usize,
        needed: usize,
        rounds: usize,
        scenes: usize,
    },
    #[error("solver timeout must be positive")]
    ZeroTimeout,
    #[error("thread count must be positive when set")]
    ZeroThreads,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            problem: ProblemConfig {
                persons: 16,
                rounds: 3,
            },
            rules: RuleConfig::default(),
            solver: SolverConfig {
                mode: SolveMode::Satisfy,
                timeout_seconds: 60,
                max_nodes: None,
                num_threads: None,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/schedules"),
            },
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            coverage: true,
            priority_ordering: true,
            gender_balance: true,
            symmetry_breaking: true,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Reject configurations that violate the structural preconditions.
    /// Runs before any search; see `ConfigError` for the individual rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.problem.persons == 0 {
            return Err(ConfigError::NoPersons);
        }
        if self.problem.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.problem.rounds > ROUNDS_LIMIT {
            return Err(ConfigError::TooManyRounds {
                rounds: self.problem.rounds,
                limit: ROUNDS_LIMIT,
            });
        }
        let needed_leaders = self.problem.rounds * SCENES;
        if self.problem.persons < needed_leaders {
            return Err(ConfigError::TooFewPersons {
                persons: self.problem.persons,
                needed: needed_leaders,
                rounds: self.problem.rounds,
                scenes: SCENES,
            });
        }
        if self.solver.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.solver.num_threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(persons) = cli_overrides.persons {
            self.problem.persons = persons;
        }
        if let Some(rounds) = cli_overrides.rounds {
            self.problem.rounds = rounds;
        }
        if let Some(mode) = cli_overrides.mode {
            self.solver.mode = mode;
        }
        if let Some(timeout) = cli_overrides.timeout_seconds {
            self.solver.timeout_seconds = timeout;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub persons: Option<usize>,
    pub rounds: Option<usize>,
    pub mode: Option<SolveMode>,
    pub timeout_seconds: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_too_many_rounds_rejected() {
        let mut settings = Settings::default();
        settings.problem.persons = 60;
        settings.problem.rounds = 13;
        assert_eq!(
            settings.validate(),
            Err(ConfigError::TooManyRounds {
                rounds: 13,
                limit: 12
            })
        );
    }

    #[test]
    fn test_too_few_persons_for_leaders_rejected() {
        // 4 rounds need 16 distinct leaders; 5 persons cannot supply them
        let mut settings = Settings::default();
        settings.problem.persons = 5;
        settings.problem.rounds = 4;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::TooFewPersons {
                persons: 5,
                needed: 16,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_counts_rejected() {
        let mut settings = Settings::default();
        settings.problem.persons = 0;
        assert_eq!(settings.validate(), Err(ConfigError::NoPersons));

        let mut settings = Settings::default();
        settings.problem.rounds = 0;
        assert_eq!(settings.validate(), Err(ConfigError::NoRounds));
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            persons: Some(20),
            rounds: Some(4),
            mode: Some(SolveMode::Minimize),
            timeout_seconds: Some(10),
            output_dir: Some(PathBuf::from("elsewhere")),
        };
        settings.merge_with_cli(&overrides);

        assert_eq!(settings.problem.persons, 20);
        assert_eq!(settings.problem.rounds, 4);
        assert_eq!(settings.solver.mode, SolveMode::Minimize);
        assert_eq!(settings.solver.timeout_seconds, 10);
        assert_eq!(settings.output.output_directory, PathBuf::from("elsewhere"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let settings = Settings::default();
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.problem.persons, settings.problem.persons);
        assert_eq!(loaded.problem.rounds, settings.problem.rounds);
        assert_eq!(loaded.solver.mode, settings.solver.mode);
    }
}
