//! Solution representation for solved rosters

use crate::roster::{AssignmentMatrix, BalanceRules, SLOTS_PER_ROUND};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A complete, validated schedule together with its scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The solved assignment matrix
    pub matrix: AssignmentMatrix,
    /// Total gender-imbalance penalty (always computed; the objective in
    /// minimize mode)
    pub total_penalty: u32,
    /// Whether the engine proved this schedule optimal
    pub proven_optimal: bool,
    /// Time taken to find this solution
    #[serde(skip)]
    pub solve_time: Duration,
    pub metadata: SolutionMetadata,
}

/// Derived facts about a solution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetadata {
    /// Identifier derived from the assignment content
    pub id: String,
    pub persons: usize,
    pub rounds: usize,
    /// Penalty of each round, summing to total_penalty
    pub round_penalties: Vec<u32>,
    /// Smallest and largest slot occupancy observed
    pub occupancy_range: (usize, usize),
}

impl Solution {
    pub fn new(matrix: AssignmentMatrix, proven_optimal: bool, solve_time: Duration) -> Self {
        let metadata = SolutionMetadata::analyze(&matrix);
        let total_penalty = metadata.round_penalties.iter().sum();
        Self {
            matrix,
            total_penalty,
            proven_optimal,
            solve_time,
            metadata,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Two solutions are equivalent when their matrices agree
    pub fn is_equivalent_to(&self, other: &Solution) -> bool {
        self.matrix == other.matrix
    }

    pub fn summary(&self) -> SolutionSummary {
        SolutionSummary {
            id: self.metadata.id.clone(),
            persons: self.metadata.persons,
            rounds: self.metadata.rounds,
            total_penalty: self.total_penalty,
            proven_optimal: self.proven_optimal,
            solve_time_ms: self.solve_time.as_millis() as u64,
        }
    }
}

/// Compact facts for summary tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionSummary {
    pub id: String,
    pub persons: usize,
    pub rounds: usize,
    pub total_penalty: u32,
    pub proven_optimal: bool,
    pub solve_time_ms: u64,
}

impl SolutionMetadata {
    pub fn analyze(matrix: &AssignmentMatrix) -> Self {
        let round_penalties = BalanceRules::penalty_profile(matrix);

        let mut min_occupancy = usize::MAX;
        let mut max_occupancy = 0;
        for round in &matrix.rounds {
            for slot in 0..SLOTS_PER_ROUND {
                let count = round.slot_count(slot);
                min_occupancy = min_occupancy.min(count);
                max_occupancy = max_occupancy.max(count);
            }
        }
        if matrix.rounds.is_empty() {
            min_occupancy = 0;
        }

        Self {
            id: Self::generate_id(matrix),
            persons: matrix.persons,
            rounds: matrix.round_count(),
            round_penalties,
            occupancy_range: (min_occupancy, max_occupancy),
        }
    }

    /// Content hash over the person -> slot view of every round
    fn generate_id(matrix: &AssignmentMatrix) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        matrix.persons.hash(&mut hasher);
        for round in &matrix.rounds {
            round.slot_of.hash(&mut hasher);
        }
        format!("{:016x}", hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RoundAssignment;

    fn one_per_slot_matrix() -> AssignmentMatrix {
        AssignmentMatrix::new(
            12,
            vec![RoundAssignment::from_slots((0..12).collect()).unwrap()],
        )
    }

    #[test]
    fn test_metadata_analysis() {
        let solution = Solution::new(one_per_slot_matrix(), true, Duration::from_millis(5));
        assert_eq!(solution.total_penalty, 0);
        assert_eq!(solution.metadata.persons, 12);
        assert_eq!(solution.metadata.rounds, 1);
        assert_eq!(solution.metadata.round_penalties, vec![0]);
        assert_eq!(solution.metadata.occupancy_range, (1, 1));
        assert_eq!(solution.metadata.id.len(), 16);
    }

    #[test]
    fn test_id_is_content_derived() {
        let a = Solution::new(one_per_slot_matrix(), false, Duration::ZERO);
        let b = Solution::new(one_per_slot_matrix(), false, Duration::ZERO);
        assert_eq!(a.metadata.id, b.metadata.id);
        assert!(a.is_equivalent_to(&b));

        let other = AssignmentMatrix::new(
            12,
            vec![RoundAssignment::from_slots((0..12).rev().collect()).unwrap()],
        );
        let c = Solution::new(other, false, Duration::ZERO);
        assert_ne!(a.metadata.id, c.metadata.id);
    }

    #[test]
    fn test_json_round_trip() {
        let solution = Solution::new(one_per_slot_matrix(), true, Duration::from_secs(1));
        let json = solution.to_json().unwrap();
        let loaded = Solution::from_json(&json).unwrap();
        assert_eq!(loaded.matrix, solution.matrix);
        assert_eq!(loaded.total_penalty, solution.total_penalty);
        assert!(loaded.proven_optimal);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution.json");

        let solution = Solution::new(one_per_slot_matrix(), false, Duration::ZERO);
        solution.save_to_file(&path).unwrap();
        let loaded = Solution::load_from_file(&path).unwrap();
        assert_eq!(loaded.metadata.id, solution.metadata.id);
    }
}
