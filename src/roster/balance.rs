//! Gender-balance rules: the hard per-slot check used in satisfaction mode
//! and the soft penalty minimized in optimization mode

use super::matrix::{AssignmentMatrix, RoundAssignment};
use super::roles::SLOTS_PER_ROUND;

/// Gender-balance evaluation over slots, rounds and whole schedules
pub struct BalanceRules;

impl BalanceRules {
    /// Hard variant: a slot is balanced when |male - female| <= 1
    pub fn is_balanced(males: usize, females: usize) -> bool {
        males.abs_diff(females) <= 1
    }

    /// Soft variant: penalty of one slot. An odd-sized slot can never be
    /// perfectly balanced, so a spread of exactly one is tolerated there;
    /// any other spread costs its full size.
    pub fn slot_penalty(males: usize, females: usize) -> u32 {
        let spread = males.abs_diff(females);
        let total = males + females;
        if spread <= 1 && total % 2 == 1 {
            0
        } else {
            spread as u32
        }
    }

    /// Sum of slot penalties over one round
    pub fn round_penalty(round: &RoundAssignment) -> u32 {
        (0..SLOTS_PER_ROUND)
            .map(|slot| {
                let (males, females) = round.gender_split(slot);
                Self::slot_penalty(males, females)
            })
            .sum()
    }

    /// The optimization objective: total penalty over all (round, slot)
    pub fn total_penalty(matrix: &AssignmentMatrix) -> u32 {
        matrix.rounds.iter().map(Self::round_penalty).sum()
    }

    /// Per-round penalties, for reporting
    pub fn penalty_profile(matrix: &AssignmentMatrix) -> Vec<u32> {
        matrix.rounds.iter().map(Self::round_penalty).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::roles::{slot_index, Role};

    #[test]
    fn test_odd_slot_with_unit_spread_is_free() {
        // total 5, 3 male / 2 female: spread 1, odd size -> no penalty
        assert_eq!(BalanceRules::slot_penalty(3, 2), 0);
    }

    #[test]
    fn test_even_slot_spread_is_charged() {
        // total 4, 3 male / 1 female: spread 2 -> penalty 2
        assert_eq!(BalanceRules::slot_penalty(3, 1), 2);
    }

    #[test]
    fn test_even_slot_perfectly_balanced_is_free() {
        assert_eq!(BalanceRules::slot_penalty(2, 2), 0);
    }

    #[test]
    fn test_empty_and_singleton_slots_are_free() {
        assert_eq!(BalanceRules::slot_penalty(0, 0), 0);
        assert_eq!(BalanceRules::slot_penalty(1, 0), 0);
        assert_eq!(BalanceRules::slot_penalty(0, 1), 0);
    }

    #[test]
    fn test_hard_check() {
        assert!(BalanceRules::is_balanced(2, 1));
        assert!(BalanceRules::is_balanced(2, 2));
        assert!(!BalanceRules::is_balanced(3, 1));
    }

    #[test]
    fn test_round_penalty_sums_slots() {
        // Persons 1, 3 (both male) in one slot, 2, 4 (both female) in another
        let mut slot_of = vec![0usize; 4];
        slot_of[0] = slot_index(0, Role::Public);
        slot_of[2] = slot_index(0, Role::Public);
        slot_of[1] = slot_index(1, Role::Public);
        slot_of[3] = slot_index(1, Role::Public);
        let round = RoundAssignment::from_slots(slot_of).unwrap();
        assert_eq!(BalanceRules::round_penalty(&round), 4);
    }
}
