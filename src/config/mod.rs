//! Configuration management for the trial roster solver

pub mod settings;

pub use settings::{
    CliOverrides, ConfigError, OutputConfig, OutputFormat, ProblemConfig, RuleConfig, Settings,
    SolveMode, SolverConfig,
};
