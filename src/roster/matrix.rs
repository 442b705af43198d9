//! Assignment matrix: the solved artifact returned by the engine

use super::roles::{self, Gender, Person, Role, SLOTS_PER_ROUND};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One round of the schedule, kept in two channeled views: person -> slot
/// and slot -> persons. Both views describe the same assignment and every
/// constructor keeps them synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundAssignment {
    /// Slot of each person, indexed by person id - 1
    pub slot_of: Vec<usize>,
    /// Members of each slot, indexed by flat slot index
    pub members: Vec<Vec<Person>>,
}

impl RoundAssignment {
    /// Build a round from the person -> slot view; the slot -> persons
    /// view is derived so the two can never start out inconsistent.
    pub fn from_slots(slot_of: Vec<usize>) -> Result<Self> {
        let mut members: Vec<Vec<Person>> = vec![Vec::new(); SLOTS_PER_ROUND];
        for (idx, &slot) in slot_of.iter().enumerate() {
            if slot >= SLOTS_PER_ROUND {
                anyhow::bail!(
                    "Person {} assigned to slot {} outside 0..{}",
                    idx + 1,
                    slot,
                    SLOTS_PER_ROUND
                );
            }
            members[slot].push((idx + 1) as Person);
        }
        Ok(Self { slot_of, members })
    }

    /// Members of the (scene, role) slot
    pub fn slot_members(&self, scene: usize, role: Role) -> &[Person] {
        &self.members[roles::slot_index(scene, role)]
    }

    /// Occupancy of a flat slot
    pub fn slot_count(&self, slot: usize) -> usize {
        self.members[slot].len()
    }

    /// (male, female) counts of a flat slot
    pub fn gender_split(&self, slot: usize) -> (usize, usize) {
        let males = self.members[slot]
            .iter()
            .filter(|&&p| Gender::of(p) == Gender::Male)
            .count();
        (males, self.members[slot].len() - males)
    }

    /// Whether both views agree everywhere: person p sits in slot v's
    /// member list iff slot_of maps p to v
    pub fn views_consistent(&self) -> bool {
        if self.members.len() != SLOTS_PER_ROUND {
            return false;
        }
        let mut derived: Vec<Vec<Person>> = vec![Vec::new(); SLOTS_PER_ROUND];
        for (idx, &slot) in self.slot_of.iter().enumerate() {
            if slot >= SLOTS_PER_ROUND {
                return false;
            }
            derived[slot].push((idx + 1) as Person);
        }
        self.members
            .iter()
            .zip(&derived)
            .all(|(stored, derived)| {
                let mut a = stored.clone();
                let mut b = derived.clone();
                a.sort_unstable();
                b.sort_unstable();
                a == b
            })
    }
}

/// The complete solved schedule: one assignment per round. Immutable once
/// returned by the engine; consumed by the validator and the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentMatrix {
    pub persons: usize,
    pub rounds: Vec<RoundAssignment>,
}

impl AssignmentMatrix {
    pub fn new(persons: usize, rounds: Vec<RoundAssignment>) -> Self {
        Self { persons, rounds }
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Slot a person occupies in a round
    pub fn slot_of(&self, round: usize, person: Person) -> usize {
        self.rounds[round].slot_of[(person - 1) as usize]
    }

    /// The sequence of slots a person receives across the rounds
    pub fn person_track(&self, person: Person) -> Vec<usize> {
        self.rounds
            .iter()
            .map(|r| r.slot_of[(person - 1) as usize])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::roles::slot_index;

    fn identity_round() -> RoundAssignment {
        // 12 persons, one per slot
        RoundAssignment::from_slots((0..12).collect()).unwrap()
    }

    #[test]
    fn test_from_slots_builds_both_views() {
        let round = identity_round();
        assert!(round.views_consistent());
        assert_eq!(round.slot_members(0, Role::Prosecution), &[1]);
        assert_eq!(round.slot_members(3, Role::Public), &[12]);
        for slot in 0..SLOTS_PER_ROUND {
            assert_eq!(round.slot_count(slot), 1);
        }
    }

    #[test]
    fn test_from_slots_rejects_bad_slot() {
        assert!(RoundAssignment::from_slots(vec![12]).is_err());
    }

    #[test]
    fn test_views_consistency_detects_tampering() {
        let mut round = identity_round();
        round.members[0].push(5); // person 5 is not mapped to slot 0
        assert!(!round.views_consistent());
    }

    #[test]
    fn test_gender_split() {
        // Persons 1 (male) and 2 (female) share a slot
        let mut slots = vec![0usize; 2];
        slots[0] = slot_index(1, Role::Public);
        slots[1] = slot_index(1, Role::Public);
        let round = RoundAssignment::from_slots(slots).unwrap();
        assert_eq!(round.gender_split(slot_index(1, Role::Public)), (1, 1));
    }

    #[test]
    fn test_person_track() {
        let r0 = identity_round();
        let r1 = RoundAssignment::from_slots((0..12).map(|s| (s + 1) % 12).collect()).unwrap();
        let matrix = AssignmentMatrix::new(12, vec![r0, r1]);
        assert_eq!(matrix.person_track(1), vec![0, 1]);
        assert_eq!(matrix.person_track(12), vec![11, 0]);
        assert_eq!(matrix.slot_of(1, 12), 0);
    }
}
