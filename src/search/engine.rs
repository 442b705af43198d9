//! Backtracking search and branch-and-bound over partial schedules
//!
//! Rounds are filled sequentially; within a round, persons are branched in
//! increasing id order over candidate slots, with leaders pinned to their
//! Prosecution slot. Satisfy mode stops at the first complete schedule.
//! Minimize mode records the best imbalance penalty found, tightens the
//! shared incumbent bound, and keeps going until the tree is exhausted or
//! a budget expires. A portfolio of rayon workers with rotated slot value
//! orders can race on the same incumbent.

use super::propagators::Propagators;
use super::state::SearchState;
use crate::config::{RuleConfig, SolveMode, SolverConfig};
use crate::roster::{AssignmentMatrix, Dimensions, Person, SLOTS_PER_ROUND};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Terminal classification of a search run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Satisfy mode: a schedule meeting all active rules was found
    Satisfied,
    /// Minimize mode: the tree was exhausted; the incumbent is optimal
    Optimal,
    /// Minimize mode: a budget expired; the incumbent is the best found
    BestFound,
    /// The tree was exhausted without any complete schedule
    Infeasible,
    /// A budget expired before any complete schedule was found
    Unknown,
}

impl SearchStatus {
    pub fn label(self) -> &'static str {
        match self {
            SearchStatus::Satisfied => "satisfied",
            SearchStatus::Optimal => "optimal",
            SearchStatus::BestFound => "best found (budget expired)",
            SearchStatus::Infeasible => "infeasible",
            SearchStatus::Unknown => "unknown (budget expired)",
        }
    }
}

/// Counters accumulated over all workers
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub backtracks: u64,
    pub elapsed: Duration,
}

/// Result of a search run
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub matrix: Option<AssignmentMatrix>,
    /// Total gender-imbalance penalty of the returned matrix (minimize mode)
    pub penalty: Option<u32>,
    pub stats: SearchStats,
}

/// Best solution shared between portfolio workers. The bound only ever
/// tightens; updates happen under the lock so bound and solution agree.
struct Incumbent {
    bound: AtomicU64,
    best: Mutex<Option<(AssignmentMatrix, u32)>>,
}

impl Incumbent {
    fn new() -> Self {
        Self {
            bound: AtomicU64::new(u64::MAX),
            best: Mutex::new(None),
        }
    }

    fn bound(&self) -> u64 {
        self.bound.load(Ordering::Relaxed)
    }

    fn offer(&self, matrix: AssignmentMatrix, penalty: u32) {
        let mut best = self.best.lock().expect("incumbent lock poisoned");
        if u64::from(penalty) < self.bound.load(Ordering::Relaxed) {
            self.bound.store(u64::from(penalty), Ordering::Relaxed);
            *best = Some((matrix, penalty));
        }
    }

    fn take(&self) -> Option<(AssignmentMatrix, u32)> {
        self.best.lock().expect("incumbent lock poisoned").take()
    }
}

pub struct SearchEngine {
    dims: Dimensions,
    rules: RuleConfig,
    mode: SolveMode,
    timeout: Duration,
    max_nodes: Option<u64>,
    num_threads: usize,
}

impl SearchEngine {
    pub fn new(dims: Dimensions, rules: RuleConfig, solver: &SolverConfig) -> Self {
        Self {
            dims,
            rules,
            mode: solver.mode,
            timeout: Duration::from_secs(solver.timeout_seconds),
            max_nodes: solver.max_nodes,
            num_threads: solver.num_threads.unwrap_or(1),
        }
    }

    /// Run the search to a terminal state and classify the result
    pub fn solve(&self) -> Result<SearchOutcome> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let incumbent = Incumbent::new();

        let portfolio_width = match self.mode {
            // Satisfy stops at the first solution; racing would duplicate work
            SolveMode::Satisfy => 1,
            SolveMode::Minimize => self.num_threads.max(1),
        };

        let runs: Vec<WorkerRun> = if portfolio_width <= 1 {
            vec![self.run_worker(0, deadline, &incumbent)]
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(portfolio_width)
                .build()
                .context("Failed to build search thread pool")?;
            let incumbent = &incumbent;
            pool.install(|| {
                (0..portfolio_width)
                    .into_par_iter()
                    .map(|worker| self.run_worker(worker, deadline, incumbent))
                    .collect()
            })
        };

        let stats = SearchStats {
            nodes: runs.iter().map(|r| r.nodes).sum(),
            backtracks: runs.iter().map(|r| r.backtracks).sum(),
            elapsed: started.elapsed(),
        };
        // One fully exhausted worker proves the search space was covered
        let exhausted = runs.iter().any(|r| !r.aborted);

        match self.mode {
            SolveMode::Satisfy => {
                let found = runs.into_iter().find_map(|r| r.found);
                let status = match (&found, exhausted) {
                    (Some(_), _) => SearchStatus::Satisfied,
                    (None, true) => SearchStatus::Infeasible,
                    (None, false) => SearchStatus::Unknown,
                };
                Ok(SearchOutcome {
                    status,
                    matrix: found,
                    penalty: None,
                    stats,
                })
            }
            SolveMode::Minimize => {
                let best = incumbent.take();
                let status = match (&best, exhausted) {
                    (Some(_), true) => SearchStatus::Optimal,
                    (Some(_), false) => SearchStatus::BestFound,
                    (None, true) => SearchStatus::Infeasible,
                    (None, false) => SearchStatus::Unknown,
                };
                let (matrix, penalty) = match best {
                    Some((matrix, penalty)) => (Some(matrix), Some(penalty)),
                    None => (None, None),
                };
                Ok(SearchOutcome {
                    status,
                    matrix,
                    penalty,
                    stats,
                })
            }
        }
    }

    fn run_worker(&self, worker: usize, deadline: Instant, incumbent: &Incumbent) -> WorkerRun {
        // Each worker tries slots in a rotated order so the portfolio
        // descends into different regions first
        let value_order: Vec<usize> = (0..SLOTS_PER_ROUND)
            .map(|i| (i + worker) % SLOTS_PER_ROUND)
            .collect();
        let mut search = Worker {
            props: Propagators::new(self.dims, self.rules, self.mode),
            dims: self.dims,
            mode: self.mode,
            value_order,
            deadline,
            max_nodes: self.max_nodes,
            incumbent,
            state: SearchState::new(self.dims),
            nodes: 0,
            backtracks: 0,
            aborted: false,
            found: None,
        };
        search.dfs(0, 0, 0);
        WorkerRun {
            nodes: search.nodes,
            backtracks: search.backtracks,
            aborted: search.aborted,
            found: search.found,
        }
    }
}

struct WorkerRun {
    nodes: u64,
    backtracks: u64,
    aborted: bool,
    found: Option<AssignmentMatrix>,
}

struct Worker<'a> {
    props: Propagators,
    dims: Dimensions,
    mode: SolveMode,
    value_order: Vec<usize>,
    deadline: Instant,
    max_nodes: Option<u64>,
    incumbent: &'a Incumbent,
    state: SearchState,
    nodes: u64,
    backtracks: u64,
    aborted: bool,
    found: Option<AssignmentMatrix>,
}

impl Worker<'_> {
    /// Returns true when the whole search must stop (solution found in
    /// satisfy mode, or a budget expired)
    fn dfs(&mut self, round: usize, person_idx: usize, completed_penalty: u32) -> bool {
        if self.over_budget() {
            self.aborted = true;
            return true;
        }

        if person_idx == self.dims.persons {
            return self.close_round(round, completed_penalty);
        }

        self.nodes += 1;
        let person = (person_idx + 1) as Person;

        if let Some(slot) = self.props.forced_slot(round, person) {
            return self.try_slot(round, person_idx, slot, completed_penalty);
        }
        for i in 0..SLOTS_PER_ROUND {
            let slot = self.value_order[i];
            if self.try_slot(round, person_idx, slot, completed_penalty) {
                return true;
            }
        }
        false
    }

    /// All persons of `round` are placed: run the exact round checks and
    /// either descend into the next round or accept the schedule
    fn close_round(&mut self, round: usize, completed_penalty: u32) -> bool {
        if !self.props.round_complete_ok(&self.state, round) {
            return false;
        }

        let completed_penalty = match self.mode {
            SolveMode::Minimize => {
                let total = completed_penalty + self.props.round_penalty(&self.state, round);
                if u64::from(total) >= self.incumbent.bound() {
                    return false; // cannot beat the incumbent any more
                }
                total
            }
            SolveMode::Satisfy => completed_penalty,
        };

        if round + 1 < self.dims.rounds {
            return self.dfs(round + 1, 0, completed_penalty);
        }

        if !self.props.schedule_complete_ok(&self.state) {
            return false;
        }
        match self.state.to_matrix() {
            Ok(matrix) => match self.mode {
                SolveMode::Satisfy => {
                    self.found = Some(matrix);
                    true
                }
                SolveMode::Minimize => {
                    self.incumbent.offer(matrix, completed_penalty);
                    false
                }
            },
            // Unreachable on a complete state; treat as a dead branch
            Err(_) => false,
        }
    }

    fn try_slot(
        &mut self,
        round: usize,
        person_idx: usize,
        slot: usize,
        completed_penalty: u32,
    ) -> bool {
        let person = (person_idx + 1) as Person;
        if !self.props.admits(&self.state, round, person, slot) {
            return false;
        }
        self.state.assign(round, person, slot);

        let pruned = self.mode == SolveMode::Minimize
            && u64::from(completed_penalty + self.props.partial_round_bound(&self.state, round))
                >= self.incumbent.bound();
        let stop = if pruned {
            false
        } else {
            self.dfs(round, person_idx + 1, completed_penalty)
        };

        self.state.unassign(round, person, slot);
        if !stop {
            self.backtracks += 1;
        }
        stop
    }

    fn over_budget(&self) -> bool {
        if let Some(max_nodes) = self.max_nodes {
            if self.nodes >= max_nodes {
                return true;
            }
        }
        // Clock checks are amortized over a batch of nodes
        self.nodes % 1024 == 0 && Instant::now() >= self.deadline
    }
}
