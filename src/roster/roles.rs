//! Persons, roles, scenes and slot indexing for the trial roster

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of scenes played simultaneously in every round
pub const SCENES: usize = 4;

/// Number of roles within each scene
pub const ROLES_PER_SCENE: usize = 3;

/// Distinct (scene, role) slots per round
pub const SLOTS_PER_ROUND: usize = SCENES * ROLES_PER_SCENE;

/// A cycle longer than this forces a person to repeat a slot
pub const ROUNDS_LIMIT: usize = SLOTS_PER_ROUND;

/// Person identifier, 1-based
pub type Person = u32;

/// Gender is a pure function of the person id: odd ids are male,
/// even ids are female. It is never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn of(person: Person) -> Self {
        if person % 2 == 1 {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

/// The three roles within a scene, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Prosecution,
    Observer,
    Public,
}

impl Role {
    pub const ALL: [Role; ROLES_PER_SCENE] = [Role::Prosecution, Role::Observer, Role::Public];

    pub fn index(self) -> usize {
        match self {
            Role::Prosecution => 0,
            Role::Observer => 1,
            Role::Public => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Prosecution => "Prosecution",
            Role::Observer => "Observer",
            Role::Public => "Public",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Flat slot index of a (scene, role) pair, 0-based
#[inline]
pub fn slot_index(scene: usize, role: Role) -> usize {
    scene * ROLES_PER_SCENE + role.index()
}

/// Scene of a flat slot index
#[inline]
pub fn scene_of(slot: usize) -> usize {
    slot / ROLES_PER_SCENE
}

/// Role of a flat slot index
#[inline]
pub fn role_of(slot: usize) -> Role {
    Role::from_index(slot % ROLES_PER_SCENE)
}

/// The Prosecution slot of a scene
#[inline]
pub fn prosecution_slot(scene: usize) -> usize {
    slot_index(scene, Role::Prosecution)
}

/// Per-slot occupancy bounds derived once from the population size:
/// no slot may be starved below `min` or loaded beyond `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityBounds {
    pub min: usize,
    pub max: usize,
}

impl CardinalityBounds {
    pub fn for_persons(persons: usize) -> Self {
        Self {
            min: persons / SLOTS_PER_ROUND,
            max: persons.div_ceil(SLOTS_PER_ROUND),
        }
    }
}

/// Problem dimensions fixed before search begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub persons: usize,
    pub rounds: usize,
}

impl Dimensions {
    pub fn new(persons: usize, rounds: usize) -> Self {
        Self { persons, rounds }
    }

    pub fn bounds(&self) -> CardinalityBounds {
        CardinalityBounds::for_persons(self.persons)
    }

    /// The designated leader of (round, scene), 0-based arguments.
    /// Leaders rotate round-robin through the first `rounds * 4` persons,
    /// each leading exactly one (round, scene) in the whole schedule.
    pub fn leader(&self, round: usize, scene: usize) -> Person {
        (round * SCENES + scene + 1) as Person
    }

    /// If `person` leads some scene in `round`, the scene index
    pub fn leader_scene(&self, round: usize, person: Person) -> Option<usize> {
        let first = (round * SCENES + 1) as Person;
        if person >= first && person < first + SCENES as Person {
            Some((person - first) as usize)
        } else {
            None
        }
    }

    /// Scene floor for the coverage rule: rounds / 4
    pub fn scene_quota(&self) -> usize {
        self.rounds / SCENES
    }

    /// Role floor for the coverage rule: rounds / 3
    pub fn role_quota(&self) -> usize {
        self.rounds / ROLES_PER_SCENE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parity() {
        assert_eq!(Gender::of(1), Gender::Male);
        assert_eq!(Gender::of(2), Gender::Female);
        assert_eq!(Gender::of(15), Gender::Male);
        assert_eq!(Gender::of(16), Gender::Female);
    }

    #[test]
    fn test_slot_indexing_round_trips() {
        for scene in 0..SCENES {
            for role in Role::ALL {
                let slot = slot_index(scene, role);
                assert_eq!(scene_of(slot), scene);
                assert_eq!(role_of(slot), role);
            }
        }
        assert_eq!(prosecution_slot(2), 6);
    }

    #[test]
    fn test_cardinality_bounds() {
        // 12 persons over 12 slots: every slot holds exactly one person
        assert_eq!(
            CardinalityBounds::for_persons(12),
            CardinalityBounds { min: 1, max: 1 }
        );
        assert_eq!(
            CardinalityBounds::for_persons(16),
            CardinalityBounds { min: 1, max: 2 }
        );
        assert_eq!(
            CardinalityBounds::for_persons(5),
            CardinalityBounds { min: 0, max: 1 }
        );
    }

    #[test]
    fn test_leader_round_robin() {
        let dims = Dimensions::new(16, 4);
        assert_eq!(dims.leader(0, 0), 1);
        assert_eq!(dims.leader(0, 3), 4);
        assert_eq!(dims.leader(1, 0), 5);
        assert_eq!(dims.leader(3, 3), 16);

        // Each of the first rounds*4 persons leads exactly once
        let mut seen = vec![0u32; 17];
        for round in 0..4 {
            for scene in 0..SCENES {
                seen[dims.leader(round, scene) as usize] += 1;
            }
        }
        assert!(seen[1..=16].iter().all(|&c| c == 1));
    }

    #[test]
    fn test_leader_scene_lookup() {
        let dims = Dimensions::new(16, 4);
        assert_eq!(dims.leader_scene(0, 1), Some(0));
        assert_eq!(dims.leader_scene(0, 4), Some(3));
        assert_eq!(dims.leader_scene(0, 5), None);
        assert_eq!(dims.leader_scene(2, 9), Some(0));
        assert_eq!(dims.leader_scene(2, 13), None);
    }

    #[test]
    fn test_coverage_quotas() {
        let dims = Dimensions::new(16, 4);
        assert_eq!(dims.scene_quota(), 1);
        assert_eq!(dims.role_quota(), 1);

        let dims = Dimensions::new(12, 3);
        assert_eq!(dims.scene_quota(), 0);
        assert_eq!(dims.role_quota(), 1);
    }
}
