//! Post-hoc validation of finished schedules
//!
//! The validator re-runs every rule against a complete assignment matrix,
//! independently of the search engine. A matrix produced by the engine
//! must always come back fully valid; the validator also audits schedules
//! loaded from disk.

use crate::config::{Settings, SolveMode};
use crate::roster::{
    prosecution_slot, slot_index, AssignmentMatrix, BalanceRules, Dimensions, Gender, Person,
    Role, SCENES, SLOTS_PER_ROUND,
};
use itertools::Itertools;
use std::fmt;

/// Which rule a violation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Shape,
    Channeling,
    Partition,
    NoRepeat,
    Leadership,
    Cardinality,
    Coverage,
    PriorityOrdering,
    GenderBalance,
    Symmetry,
}

impl RuleKind {
    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Shape => "shape",
            RuleKind::Channeling => "channeling",
            RuleKind::Partition => "partition",
            RuleKind::NoRepeat => "no-repeat",
            RuleKind::Leadership => "leadership",
            RuleKind::Cardinality => "cardinality",
            RuleKind::Coverage => "coverage",
            RuleKind::PriorityOrdering => "priority ordering",
            RuleKind::GenderBalance => "gender balance",
            RuleKind::Symmetry => "symmetry reduction",
        }
    }
}

/// A single rule violation found during validation
#[derive(Debug, Clone)]
pub struct RuleViolation {
    pub rule: RuleKind,
    /// Round the violation occurred in (1-based), if round-local
    pub round: Option<usize>,
    pub description: String,
}

/// Result of validating one schedule
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<RuleViolation>,
    /// Total soft gender-imbalance penalty, reported regardless of mode
    pub total_penalty: u32,
}

/// Validates complete schedules against the configured rule set
pub struct ScheduleValidator {
    settings: Settings,
    dims: Dimensions,
}

impl ScheduleValidator {
    pub fn new(settings: Settings) -> Self {
        let dims = Dimensions::new(settings.problem.persons, settings.problem.rounds);
        Self { settings, dims }
    }

    /// Run the full rule suite over a finished matrix. Validation is
    /// idempotent: a valid schedule stays valid however often it is
    /// re-checked, and checking never mutates the matrix.
    pub fn validate(&self, matrix: &AssignmentMatrix) -> ValidationResult {
        let mut violations = Vec::new();

        self.check_shape(matrix, &mut violations);
        if !violations.is_empty() {
            // Dimension mismatches make the remaining checks meaningless
            return ValidationResult {
                is_valid: false,
                violations,
                total_penalty: 0,
            };
        }

        self.check_channeling(matrix, &mut violations);
        self.check_partition(matrix, &mut violations);
        self.check_no_repeat(matrix, &mut violations);
        self.check_leadership(matrix, &mut violations);
        self.check_cardinality(matrix, &mut violations);
        if self.settings.rules.coverage {
            self.check_coverage(matrix, &mut violations);
        }
        if self.settings.rules.priority_ordering {
            self.check_priority_ordering(matrix, &mut violations);
        }
        if self.settings.rules.gender_balance && self.settings.solver.mode == SolveMode::Satisfy {
            self.check_gender_balance(matrix, &mut violations);
        }
        if self.settings.rules.symmetry_breaking {
            self.check_symmetry(matrix, &mut violations);
        }

        ValidationResult {
            is_valid: violations.is_empty(),
            violations,
            total_penalty: BalanceRules::total_penalty(matrix),
        }
    }

    fn check_shape(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        if matrix.persons != self.dims.persons {
            violations.push(RuleViolation {
                rule: RuleKind::Shape,
                round: None,
                description: format!(
                    "Schedule covers {} persons, configuration expects {}",
                    matrix.persons, self.dims.persons
                ),
            });
        }
        if matrix.round_count() != self.dims.rounds {
            violations.push(RuleViolation {
                rule: RuleKind::Shape,
                round: None,
                description: format!(
                    "Schedule has {} rounds, configuration expects {}",
                    matrix.round_count(),
                    self.dims.rounds
                ),
            });
        }
        for (r, round) in matrix.rounds.iter().enumerate() {
            if round.slot_of.len() != self.dims.persons || round.members.len() != SLOTS_PER_ROUND {
                violations.push(RuleViolation {
                    rule: RuleKind::Shape,
                    round: Some(r + 1),
                    description: format!("Round {} has inconsistent dimensions", r + 1),
                });
            } else if let Some(&slot) = round.slot_of.iter().find(|&&s| s >= SLOTS_PER_ROUND) {
                // Schedules loaded from disk may carry arbitrary indices
                violations.push(RuleViolation {
                    rule: RuleKind::Shape,
                    round: Some(r + 1),
                    description: format!(
                        "Round {} assigns slot index {} outside 0..{}",
                        r + 1,
                        slot,
                        SLOTS_PER_ROUND
                    ),
                });
            }
        }
    }

    fn check_channeling(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        for (r, round) in matrix.rounds.iter().enumerate() {
            if !round.views_consistent() {
                violations.push(RuleViolation {
                    rule: RuleKind::Channeling,
                    round: Some(r + 1),
                    description: format!(
                        "Round {}: person->slot and slot->persons views disagree",
                        r + 1
                    ),
                });
            }
        }
    }

    fn check_partition(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        for (r, round) in matrix.rounds.iter().enumerate() {
            let assigned: Vec<Person> = round
                .members
                .iter()
                .flatten()
                .copied()
                .sorted_unstable()
                .collect();
            let expected: Vec<Person> = (1..=self.dims.persons as Person).collect();
            if assigned != expected {
                violations.push(RuleViolation {
                    rule: RuleKind::Partition,
                    round: Some(r + 1),
                    description: format!(
                        "Round {}: slot sets do not partition the person set \
                         ({} memberships over {} persons)",
                        r + 1,
                        assigned.len(),
                        self.dims.persons
                    ),
                });
            }
        }
    }

    fn check_no_repeat(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        for person in 1..=self.dims.persons as Person {
            let track = matrix.person_track(person);
            if track.iter().unique().count() != track.len() {
                violations.push(RuleViolation {
                    rule: RuleKind::NoRepeat,
                    round: None,
                    description: format!(
                        "Person {} repeats a (scene, role) slot: track {:?}",
                        person, track
                    ),
                });
            }
        }
    }

    fn check_leadership(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        for (r, round) in matrix.rounds.iter().enumerate() {
            for scene in 0..SCENES {
                let leader = self.dims.leader(r, scene);
                if !round.members[prosecution_slot(scene)].contains(&leader) {
                    violations.push(RuleViolation {
                        rule: RuleKind::Leadership,
                        round: Some(r + 1),
                        description: format!(
                            "Round {} scene {}: leader {} is not in the Prosecution slot",
                            r + 1,
                            scene + 1,
                            leader
                        ),
                    });
                }
            }
        }
    }

    fn check_cardinality(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        let bounds = self.dims.bounds();
        for (r, round) in matrix.rounds.iter().enumerate() {
            for slot in 0..SLOTS_PER_ROUND {
                let count = round.slot_count(slot);
                if count < bounds.min || count > bounds.max {
                    violations.push(RuleViolation {
                        rule: RuleKind::Cardinality,
                        round: Some(r + 1),
                        description: format!(
                            "Round {} slot {}: {} persons outside bounds [{}, {}]",
                            r + 1,
                            slot + 1,
                            count,
                            bounds.min,
                            bounds.max
                        ),
                    });
                }
            }
        }
    }

    fn check_coverage(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        let scene_quota = self.dims.scene_quota();
        let role_quota = self.dims.role_quota();
        for person in 1..=self.dims.persons as Person {
            let mut scene_counts = [0usize; SCENES];
            let mut role_counts = [0usize; 3];
            for slot in matrix.person_track(person) {
                scene_counts[crate::roster::scene_of(slot)] += 1;
                role_counts[crate::roster::role_of(slot).index()] += 1;
            }
            for (scene, &count) in scene_counts.iter().enumerate() {
                if count < scene_quota {
                    violations.push(RuleViolation {
                        rule: RuleKind::Coverage,
                        round: None,
                        description: format!(
                            "Person {} plays scene {} only {} times (quota {})",
                            person,
                            scene + 1,
                            count,
                            scene_quota
                        ),
                    });
                }
            }
            for (role, &count) in role_counts.iter().enumerate() {
                if count < role_quota {
                    violations.push(RuleViolation {
                        rule: RuleKind::Coverage,
                        round: None,
                        description: format!(
                            "Person {} plays {} only {} times (quota {})",
                            person,
                            Role::from_index(role),
                            count,
                            role_quota
                        ),
                    });
                }
            }
        }
    }

    fn check_priority_ordering(
        &self,
        matrix: &AssignmentMatrix,
        violations: &mut Vec<RuleViolation>,
    ) {
        for (r, round) in matrix.rounds.iter().enumerate() {
            for scene in 0..SCENES {
                let sizes: Vec<usize> = Role::ALL
                    .iter()
                    .map(|&role| round.slot_count(slot_index(scene, role)))
                    .collect();
                if sizes.iter().tuple_windows().any(|(a, b)| a > b) {
                    violations.push(RuleViolation {
                        rule: RuleKind::PriorityOrdering,
                        round: Some(r + 1),
                        description: format!(
                            "Round {} scene {}: slot sizes {:?} decrease along \
                             Prosecution, Observer, Public",
                            r + 1,
                            scene + 1,
                            sizes
                        ),
                    });
                }
            }
        }
    }

    fn check_gender_balance(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        for (r, round) in matrix.rounds.iter().enumerate() {
            for slot in 0..SLOTS_PER_ROUND {
                let (males, females) = round.gender_split(slot);
                if !BalanceRules::is_balanced(males, females) {
                    violations.push(RuleViolation {
                        rule: RuleKind::GenderBalance,
                        round: Some(r + 1),
                        description: format!(
                            "Round {} slot {}: {} male vs {} female exceeds a spread of one",
                            r + 1,
                            slot + 1,
                            males,
                            females
                        ),
                    });
                }
            }
        }
    }

    fn check_symmetry(&self, matrix: &AssignmentMatrix, violations: &mut Vec<RuleViolation>) {
        let Some(first) = matrix.rounds.first() else {
            return;
        };
        for gender in [Gender::Male, Gender::Female] {
            let slots: Vec<usize> = (1..=self.dims.persons as Person)
                .filter(|&p| Gender::of(p) == gender && self.dims.leader_scene(0, p).is_none())
                .map(|p| first.slot_of[(p - 1) as usize])
                .collect();
            if slots.iter().tuple_windows().any(|(a, b)| a > b) {
                violations.push(RuleViolation {
                    rule: RuleKind::Symmetry,
                    round: Some(1),
                    description: format!(
                        "Round 1 is not canonical: {:?} slot indices {:?} decrease \
                         along person-id order",
                        gender, slots
                    ),
                });
            }
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Validation Result: {}",
            if self.is_valid { "VALID" } else { "INVALID" }
        )?;
        writeln!(f, "Total imbalance penalty: {}", self.total_penalty)?;
        writeln!(f, "Violations: {}", self.violations.len())?;
        for violation in &self.violations {
            writeln!(f, "  [{}] {}", violation.rule.label(), violation.description)?;
        }
        Ok(())
    }
}
