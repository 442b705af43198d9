//! Problem assembly, solution handling, and post-hoc validation

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::{ProblemProfile, RosterProblem, SolveReport};
pub use solution::{Solution, SolutionMetadata, SolutionSummary};
pub use validator::{RuleKind, RuleViolation, ScheduleValidator, ValidationResult};
