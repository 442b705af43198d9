//! Bespoke backtracking search for the trial roster constraints

pub mod engine;
pub mod propagators;
pub mod state;

pub use engine::{SearchEngine, SearchOutcome, SearchStats, SearchStatus};
pub use propagators::Propagators;
pub use state::SearchState;
