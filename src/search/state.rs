//! Partial assignment state explored by the search engine
//!
//! The state keeps the two channeled views of every round (person -> slot
//! and slot -> persons) plus the derived counters the propagators read.
//! Mutation is strictly assign/unassign in LIFO order; the engine owns the
//! state and undoes its own decisions on backtrack, so sibling branches
//! never observe each other's changes.

use crate::roster::{
    scene_of, AssignmentMatrix, Dimensions, Gender, Person, RoundAssignment, ROLES_PER_SCENE,
    SCENES, SLOTS_PER_ROUND,
};
use anyhow::Result;

/// Occupancy counters of one (round, slot)
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotCount {
    pub total: usize,
    pub males: usize,
    pub females: usize,
}

impl SlotCount {
    pub fn spread(&self) -> usize {
        self.males.abs_diff(self.females)
    }
}

/// Mutable search state covering all rounds of a partial schedule
pub struct SearchState {
    dims: Dimensions,
    /// Person view: [round][person_idx] -> slot
    slot_of: Vec<Vec<Option<usize>>>,
    /// Slot view: [round][slot] -> persons, kept in sync with slot_of
    members: Vec<Vec<Vec<Person>>>,
    /// [round][slot] occupancy counters
    counts: Vec<Vec<SlotCount>>,
    /// Per-person scene occurrences across assigned rounds
    scene_counts: Vec<[usize; SCENES]>,
    /// Per-person role occurrences across assigned rounds
    role_counts: Vec<[usize; ROLES_PER_SCENE]>,
    /// Number of persons assigned in each round
    assigned: Vec<usize>,
}

impl SearchState {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            slot_of: vec![vec![None; dims.persons]; dims.rounds],
            members: vec![vec![Vec::new(); SLOTS_PER_ROUND]; dims.rounds],
            counts: vec![vec![SlotCount::default(); SLOTS_PER_ROUND]; dims.rounds],
            scene_counts: vec![[0; SCENES]; dims.persons],
            role_counts: vec![[0; ROLES_PER_SCENE]; dims.persons],
            assigned: vec![0; dims.rounds],
        }
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Place a person into a slot, updating both views and all counters
    pub fn assign(&mut self, round: usize, person: Person, slot: usize) {
        let idx = (person - 1) as usize;
        debug_assert!(self.slot_of[round][idx].is_none());

        self.slot_of[round][idx] = Some(slot);
        self.members[round][slot].push(person);

        let count = &mut self.counts[round][slot];
        count.total += 1;
        match Gender::of(person) {
            Gender::Male => count.males += 1,
            Gender::Female => count.females += 1,
        }

        self.scene_counts[idx][scene_of(slot)] += 1;
        self.role_counts[idx][slot % ROLES_PER_SCENE] += 1;
        self.assigned[round] += 1;
    }

    /// Reverse the most recent assignment of this person in this round.
    /// Backtracking is LIFO, so the person is the last member of the slot.
    pub fn unassign(&mut self, round: usize, person: Person, slot: usize) {
        let idx = (person - 1) as usize;
        debug_assert_eq!(self.slot_of[round][idx], Some(slot));
        debug_assert_eq!(self.members[round][slot].last(), Some(&person));

        self.slot_of[round][idx] = None;
        self.members[round][slot].pop();

        let count = &mut self.counts[round][slot];
        count.total -= 1;
        match Gender::of(person) {
            Gender::Male => count.males -= 1,
            Gender::Female => count.females -= 1,
        }

        self.scene_counts[idx][scene_of(slot)] -= 1;
        self.role_counts[idx][slot % ROLES_PER_SCENE] -= 1;
        self.assigned[round] -= 1;
    }

    pub fn person_slot(&self, round: usize, person: Person) -> Option<usize> {
        self.slot_of[round][(person - 1) as usize]
    }

    pub fn slot_count(&self, round: usize, slot: usize) -> SlotCount {
        self.counts[round][slot]
    }

    pub fn assigned_in_round(&self, round: usize) -> usize {
        self.assigned[round]
    }

    /// Persons of this round not yet placed
    pub fn unassigned_in_round(&self, round: usize) -> usize {
        self.dims.persons - self.assigned[round]
    }

    pub fn scene_counts(&self, person: Person) -> &[usize; SCENES] {
        &self.scene_counts[(person - 1) as usize]
    }

    pub fn role_counts(&self, person: Person) -> &[usize; ROLES_PER_SCENE] {
        &self.role_counts[(person - 1) as usize]
    }

    pub fn round_complete(&self, round: usize) -> bool {
        self.assigned[round] == self.dims.persons
    }

    /// Freeze the fully assigned state into an immutable matrix
    pub fn to_matrix(&self) -> Result<AssignmentMatrix> {
        let mut rounds = Vec::with_capacity(self.dims.rounds);
        for round in 0..self.dims.rounds {
            let slots: Option<Vec<usize>> = self.slot_of[round].iter().copied().collect();
            let slots = slots.ok_or_else(|| {
                anyhow::anyhow!("Round {} is not fully assigned", round + 1)
            })?;
            rounds.push(RoundAssignment::from_slots(slots)?);
        }
        Ok(AssignmentMatrix::new(self.dims.persons, rounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{slot_index, Role};

    #[test]
    fn test_assign_updates_both_views() {
        let mut state = SearchState::new(Dimensions::new(12, 2));
        let slot = slot_index(1, Role::Observer);
        state.assign(0, 3, slot);

        assert_eq!(state.person_slot(0, 3), Some(slot));
        let count = state.slot_count(0, slot);
        assert_eq!(count.total, 1);
        assert_eq!(count.males, 1);
        assert_eq!(count.females, 0);
        assert_eq!(state.assigned_in_round(0), 1);
        assert_eq!(state.scene_counts(3)[1], 1);
        assert_eq!(state.role_counts(3)[Role::Observer.index()], 1);
    }

    #[test]
    fn test_unassign_restores_everything() {
        let mut state = SearchState::new(Dimensions::new(12, 2));
        let slot = slot_index(0, Role::Public);
        state.assign(0, 2, slot);
        state.assign(0, 4, slot);
        state.unassign(0, 4, slot);

        assert_eq!(state.person_slot(0, 4), None);
        assert_eq!(state.slot_count(0, slot).total, 1);
        assert_eq!(state.slot_count(0, slot).females, 1);
        assert_eq!(state.assigned_in_round(0), 1);
        assert_eq!(state.scene_counts(4)[0], 0);

        state.unassign(0, 2, slot);
        assert_eq!(state.assigned_in_round(0), 0);
    }

    #[test]
    fn test_to_matrix_requires_completion() {
        let dims = Dimensions::new(2, 1);
        let mut state = SearchState::new(dims);
        state.assign(0, 1, 0);
        assert!(state.to_matrix().is_err());

        state.assign(0, 2, 1);
        let matrix = state.to_matrix().unwrap();
        assert_eq!(matrix.slot_of(0, 1), 0);
        assert_eq!(matrix.slot_of(0, 2), 1);
        assert!(matrix.rounds[0].views_consistent());
    }

    #[test]
    fn test_counts_span_rounds_independently() {
        let mut state = SearchState::new(Dimensions::new(4, 2));
        state.assign(0, 1, 0);
        state.assign(1, 1, 3);
        assert_eq!(state.slot_count(0, 0).total, 1);
        assert_eq!(state.slot_count(1, 0).total, 0);
        // Scene counts accumulate across rounds for the coverage rule
        assert_eq!(state.scene_counts(1)[0], 1);
        assert_eq!(state.scene_counts(1)[1], 1);
    }
}
