//! Pruning checks run by the search engine
//!
//! Each decision assigns one person of one round to a slot. `admits` runs
//! the propagator suite against the tentative assignment in rule order:
//! leadership, cardinality, no-repeat, coverage, priority ordering,
//! symmetry reduction (round 1 only), then hard gender balance. The
//! channeling and partition rules need no explicit check here: the search
//! state maintains both views synchronously and gives every person exactly
//! one slot per round by construction. The validator re-checks all of them
//! on finished schedules.

use super::state::SearchState;
use crate::config::{RuleConfig, SolveMode};
use crate::roster::{
    prosecution_slot, role_of, scene_of, slot_index, BalanceRules, CardinalityBounds, Dimensions,
    Gender, Person, Role, ROLES_PER_SCENE, SCENES, SLOTS_PER_ROUND,
};

pub struct Propagators {
    dims: Dimensions,
    bounds: CardinalityBounds,
    rules: RuleConfig,
    /// Hard per-slot balance is enforced during search only in satisfy
    /// mode; in minimize mode imbalance is the objective instead
    hard_balance: bool,
}

impl Propagators {
    pub fn new(dims: Dimensions, rules: RuleConfig, mode: SolveMode) -> Self {
        Self {
            dims,
            bounds: dims.bounds(),
            rules,
            hard_balance: rules.gender_balance && mode == SolveMode::Satisfy,
        }
    }

    pub fn bounds(&self) -> CardinalityBounds {
        self.bounds
    }

    /// The single admissible slot for a person whose placement is not
    /// searched over: a leader must sit in the Prosecution slot of the
    /// scene it leads
    pub fn forced_slot(&self, round: usize, person: Person) -> Option<usize> {
        self.dims
            .leader_scene(round, person)
            .map(prosecution_slot)
    }

    /// Whether assigning `person` to `slot` in `round` survives every
    /// active propagator. Persons are branched in increasing id order
    /// within a round; several checks rely on that.
    pub fn admits(&self, state: &SearchState, round: usize, person: Person, slot: usize) -> bool {
        // Leadership: fixed in advance, never searched over
        if let Some(scene) = self.dims.leader_scene(round, person) {
            if slot != prosecution_slot(scene) {
                return false;
            }
        }

        // Cardinality maximum, with a seat reserved in each Prosecution
        // slot for its not-yet-placed leader
        let count = state.slot_count(round, slot);
        let mut capacity = self.bounds.max;
        if role_of(slot) == Role::Prosecution {
            let leader = self.dims.leader(round, scene_of(slot));
            if leader != person && state.person_slot(round, leader).is_none() {
                capacity = capacity.saturating_sub(1);
            }
        }
        if count.total + 1 > capacity {
            return false;
        }

        // No-repeat: a person never receives the same (scene, role) twice
        for earlier in 0..round {
            if state.person_slot(earlier, person) == Some(slot) {
                return false;
            }
        }

        // The persons still unplaced in this round must be able to fill
        // every slot up to its minimum
        let unassigned_after = state.unassigned_in_round(round) - 1;
        if self.min_deficit_after(state, round, slot) > unassigned_after {
            return false;
        }

        if self.rules.coverage && !self.coverage_feasible(state, round, person, slot) {
            return false;
        }

        if self.rules.priority_ordering
            && !self.priority_feasible(state, round, slot, unassigned_after)
        {
            return false;
        }

        if self.rules.symmetry_breaking && round == 0 && !self.symmetry_ok(state, person, slot) {
            return false;
        }

        if self.hard_balance {
            let (males, females) = match Gender::of(person) {
                Gender::Male => (count.males + 1, count.females),
                Gender::Female => (count.males, count.females + 1),
            };
            let free = self.bounds.max - (count.total + 1);
            // Each future member can shrink the spread by at most one
            if males.abs_diff(females) > 1 + free {
                return false;
            }
        }

        true
    }

    /// Exact per-round checks once all persons of the round are placed
    pub fn round_complete_ok(&self, state: &SearchState, round: usize) -> bool {
        debug_assert!(state.round_complete(round));

        for slot in 0..SLOTS_PER_ROUND {
            let count = state.slot_count(round, slot);
            if count.total < self.bounds.min {
                return false;
            }
            if self.hard_balance && count.spread() > 1 {
                return false;
            }
        }

        if self.rules.priority_ordering {
            for scene in 0..SCENES {
                let sizes: Vec<usize> = Role::ALL
                    .iter()
                    .map(|&role| state.slot_count(round, slot_index(scene, role)).total)
                    .collect();
                if sizes[0] > sizes[1] || sizes[1] > sizes[2] {
                    return false;
                }
            }
        }

        true
    }

    /// Exact whole-schedule checks once every round is placed
    pub fn schedule_complete_ok(&self, state: &SearchState) -> bool {
        if !self.rules.coverage {
            return true;
        }
        let scene_quota = self.dims.scene_quota();
        let role_quota = self.dims.role_quota();
        for person in 1..=self.dims.persons as Person {
            if state.scene_counts(person).iter().any(|&c| c < scene_quota) {
                return false;
            }
            if state.role_counts(person).iter().any(|&c| c < role_quota) {
                return false;
            }
        }
        true
    }

    /// Soft-objective penalty of a completed round
    pub fn round_penalty(&self, state: &SearchState, round: usize) -> u32 {
        (0..SLOTS_PER_ROUND)
            .map(|slot| {
                let count = state.slot_count(round, slot);
                BalanceRules::slot_penalty(count.males, count.females)
            })
            .sum()
    }

    /// Admissible lower bound on the penalty of the round in progress:
    /// a slot with spread d and free capacity c finishes with penalty at
    /// least d - c - 1, and never below zero
    pub fn partial_round_bound(&self, state: &SearchState, round: usize) -> u32 {
        (0..SLOTS_PER_ROUND)
            .map(|slot| {
                let count = state.slot_count(round, slot);
                let free = self.bounds.max - count.total;
                (count.spread() as u32).saturating_sub(free as u32 + 1)
            })
            .sum()
    }

    /// Sum of remaining minimum-occupancy deficits after the tentative
    /// assignment lands in `slot`
    fn min_deficit_after(&self, state: &SearchState, round: usize, slot: usize) -> usize {
        if self.bounds.min == 0 {
            return 0;
        }
        (0..SLOTS_PER_ROUND)
            .map(|v| {
                let mut total = state.slot_count(round, v).total;
                if v == slot {
                    total += 1;
                }
                self.bounds.min.saturating_sub(total)
            })
            .sum()
    }

    /// Rotation fairness lookahead: the rounds still to come must suffice
    /// to meet every remaining scene and role quota of this person
    fn coverage_feasible(
        &self,
        state: &SearchState,
        round: usize,
        person: Person,
        slot: usize,
    ) -> bool {
        let rounds_left = self.dims.rounds - 1 - round;
        let scene_quota = self.dims.scene_quota();
        let role_quota = self.dims.role_quota();

        let scene_counts = state.scene_counts(person);
        let scene_deficit: usize = (0..SCENES)
            .map(|c| {
                let have = scene_counts[c] + usize::from(c == scene_of(slot));
                scene_quota.saturating_sub(have)
            })
            .sum();
        if scene_deficit > rounds_left {
            return false;
        }

        let role_counts = state.role_counts(person);
        let role_deficit: usize = (0..ROLES_PER_SCENE)
            .map(|r| {
                let have = role_counts[r] + usize::from(r == role_of(slot).index());
                role_quota.saturating_sub(have)
            })
            .sum();
        role_deficit <= rounds_left
    }

    /// Priority ordering bound: an earlier role may not outgrow a later
    /// role by more than the persons still unplaced in this round
    fn priority_feasible(
        &self,
        state: &SearchState,
        round: usize,
        slot: usize,
        unassigned_after: usize,
    ) -> bool {
        let scene = scene_of(slot);
        let mut sizes = [0usize; ROLES_PER_SCENE];
        for (i, &role) in Role::ALL.iter().enumerate() {
            sizes[i] = state.slot_count(round, slot_index(scene, role)).total;
        }
        sizes[role_of(slot).index()] += 1;
        sizes[0] <= sizes[1] + unassigned_after && sizes[1] <= sizes[2] + unassigned_after
    }

    /// Canonical labeling of round 1: among non-leaders of the same
    /// gender, slot indices follow person-id order. The previous same-
    /// gender person is id - 2 and is already placed when branching in
    /// id order.
    fn symmetry_ok(&self, state: &SearchState, person: Person, slot: usize) -> bool {
        if person <= SCENES as Person {
            return true; // round-1 leader, pinned anyway
        }
        let prev = person - 2;
        if prev <= SCENES as Person {
            return true; // previous same-gender person is a leader
        }
        match state.person_slot(0, prev) {
            Some(prev_slot) => slot >= prev_slot,
            None => true,
        }
    }
}
