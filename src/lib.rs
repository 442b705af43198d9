//! Trial Roster Scheduler
//!
//! This library builds round-robin trial schedules: persons are assigned to
//! scene/role slots across rounds under leadership, coverage and balance
//! rules, using backtracking search with branch-and-bound minimization.

pub mod config;
pub mod roster;
pub mod scheduling;
pub mod search;
pub mod utils;

pub use config::Settings;
pub use scheduling::{RosterProblem, Solution, SolveReport};

use anyhow::Result;

/// Main entry point for solving trial roster problems
pub fn solve_roster(settings: Settings) -> Result<SolveReport> {
    let problem = RosterProblem::new(settings)?;
    problem.solve()
}
