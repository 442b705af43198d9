//! Roster problem definition: configuration in, validated schedule out

use super::{ScheduleValidator, Solution};
use crate::config::{Settings, SolveMode};
use crate::roster::{CardinalityBounds, Dimensions, SCENES, SLOTS_PER_ROUND};
use crate::search::{SearchEngine, SearchStats, SearchStatus};
use anyhow::{Context, Result};
use std::fmt;

/// One scheduling instance, ready to solve
pub struct RosterProblem {
    settings: Settings,
    dims: Dimensions,
    validator: ScheduleValidator,
}

/// What the solve run produced
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub status: SearchStatus,
    pub solution: Option<Solution>,
    pub stats: SearchStats,
}

impl RosterProblem {
    /// Build a problem from validated settings. Configuration problems
    /// are rejected here; the search never starts on a bad instance.
    pub fn new(settings: Settings) -> Result<Self> {
        settings
            .validate()
            .context("Configuration validation failed")?;
        let dims = Dimensions::new(settings.problem.persons, settings.problem.rounds);
        let validator = ScheduleValidator::new(settings.clone());
        Ok(Self {
            settings,
            dims,
            validator,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Run the engine to a terminal state and wrap the result. Every
    /// schedule the engine emits is re-audited by the validator before
    /// it is handed out.
    pub fn solve(&self) -> Result<SolveReport> {
        let engine = SearchEngine::new(self.dims, self.settings.rules, &self.settings.solver);
        let outcome = engine.solve().context("Search failed")?;

        let solution = match outcome.matrix {
            Some(matrix) => {
                let audit = self.validator.validate(&matrix);
                if !audit.is_valid {
                    anyhow::bail!("Engine produced an invalid schedule:\n{}", audit);
                }
                let proven_optimal = outcome.status == SearchStatus::Optimal;
                Some(Solution::new(matrix, proven_optimal, outcome.stats.elapsed))
            }
            None => None,
        };

        Ok(SolveReport {
            status: outcome.status,
            solution,
            stats: outcome.stats,
        })
    }

    /// Static facts about the instance, for verbose output
    pub fn profile(&self) -> ProblemProfile {
        ProblemProfile {
            persons: self.dims.persons,
            rounds: self.dims.rounds,
            slots: SLOTS_PER_ROUND,
            bounds: self.dims.bounds(),
            leaders: self.dims.rounds * SCENES,
            mode: self.settings.solver.mode,
            active_rules: self.active_rules(),
        }
    }

    fn active_rules(&self) -> Vec<&'static str> {
        let rules = &self.settings.rules;
        let mut active = vec!["partition", "channeling", "no-repeat", "leadership", "cardinality"];
        if rules.coverage {
            active.push("coverage");
        }
        if rules.priority_ordering {
            active.push("priority ordering");
        }
        if rules.gender_balance && self.settings.solver.mode == SolveMode::Satisfy {
            active.push("gender balance");
        }
        if rules.symmetry_breaking {
            active.push("symmetry reduction");
        }
        active
    }
}

/// Static description of a problem instance
#[derive(Debug, Clone)]
pub struct ProblemProfile {
    pub persons: usize,
    pub rounds: usize,
    pub slots: usize,
    pub bounds: CardinalityBounds,
    pub leaders: usize,
    pub mode: SolveMode,
    pub active_rules: Vec<&'static str>,
}

impl fmt::Display for ProblemProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Problem Profile:")?;
        writeln!(
            f,
            "  {} persons over {} rounds, {} slots per round",
            self.persons, self.rounds, self.slots
        )?;
        writeln!(
            f,
            "  Slot occupancy bounds: [{}, {}]",
            self.bounds.min, self.bounds.max
        )?;
        writeln!(f, "  Designated leaders: {}", self.leaders)?;
        writeln!(f, "  Mode: {:?}", self.mode)?;
        writeln!(f, "  Active rules: {}", self.active_rules.join(", "))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn settings(persons: usize, rounds: usize, mode: SolveMode) -> Settings {
        let mut settings = Settings::default();
        settings.problem.persons = persons;
        settings.problem.rounds = rounds;
        settings.solver.mode = mode;
        settings.solver.timeout_seconds = 60;
        settings
    }

    #[test]
    fn test_invalid_configuration_rejected_before_search() {
        // 5 persons cannot supply the 16 leaders of a 4-round schedule
        let result = RosterProblem::new(settings(5, 4, SolveMode::Satisfy));
        assert!(result.is_err());
    }

    #[test]
    fn test_solve_produces_validated_solution() {
        let problem = RosterProblem::new(settings(12, 3, SolveMode::Satisfy)).unwrap();
        let report = problem.solve().unwrap();

        assert_eq!(report.status, SearchStatus::Satisfied);
        let solution = report.solution.unwrap();
        assert_eq!(solution.matrix.round_count(), 3);
        assert!(report.stats.nodes > 0);
    }

    #[test]
    fn test_minimize_reports_optimal_penalty() {
        let mut config = settings(5, 1, SolveMode::Minimize);
        config.rules = RuleConfig {
            priority_ordering: false,
            ..RuleConfig::default()
        };
        let problem = RosterProblem::new(config).unwrap();
        let report = problem.solve().unwrap();

        assert_eq!(report.status, SearchStatus::Optimal);
        let solution = report.solution.unwrap();
        assert_eq!(solution.total_penalty, 0);
        assert!(solution.proven_optimal);
    }

    #[test]
    fn test_profile() {
        let problem = RosterProblem::new(settings(16, 2, SolveMode::Satisfy)).unwrap();
        let profile = problem.profile();
        assert_eq!(profile.bounds.min, 1);
        assert_eq!(profile.bounds.max, 2);
        assert_eq!(profile.leaders, 8);
        assert!(profile.active_rules.contains(&"gender balance"));
    }
}
