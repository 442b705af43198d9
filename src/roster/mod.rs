//! Trial roster core domain model

pub mod balance;
pub mod matrix;
pub mod roles;

pub use balance::BalanceRules;
pub use matrix::{AssignmentMatrix, RoundAssignment};
pub use roles::{
    prosecution_slot, role_of, scene_of, slot_index, CardinalityBounds, Dimensions, Gender,
    Person, Role, ROLES_PER_SCENE, ROUNDS_LIMIT, SCENES, SLOTS_PER_ROUND,
};
