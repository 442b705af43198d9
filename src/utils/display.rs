//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::roster::{role_of, scene_of, AssignmentMatrix, Dimensions, Person, Role, SCENES};
use crate::scheduling::Solution;
use anyhow::Result;
use std::path::Path;

/// Format schedules for display
pub struct ScheduleFormatter;

impl ScheduleFormatter {
    /// Format a single solution for console output
    pub fn format_solution(solution: &Solution) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Schedule {} ===\n", solution.metadata.id));
        output.push_str(&format!(
            "Persons: {}, Rounds: {}\n",
            solution.metadata.persons, solution.metadata.rounds
        ));
        output.push_str(&format!(
            "Gender Penalty: {}{}\n",
            solution.total_penalty,
            if solution.proven_optimal {
                " (proven optimal)"
            } else {
                ""
            }
        ));
        output.push_str(&format!(
            "Slot Occupancy: {} to {}\n",
            solution.metadata.occupancy_range.0, solution.metadata.occupancy_range.1
        ));
        output.push_str(&format!(
            "Solve Time: {:.3}s\n",
            solution.solve_time.as_secs_f64()
        ));
        output.push('\n');

        output.push_str(&Self::format_matrix(&solution.matrix));
        output
    }

    /// Format every round of a matrix as scene tables. Designated
    /// leaders are marked with '*'.
    pub fn format_matrix(matrix: &AssignmentMatrix) -> String {
        let dims = Dimensions::new(matrix.persons, matrix.round_count());
        let mut output = String::new();

        for (round_idx, round) in matrix.rounds.iter().enumerate() {
            output.push_str(&format!("Round {}:\n", round_idx + 1));
            output.push_str("  Scene | Prosecution     | Observer        | Public\n");
            output.push_str("  ------+-----------------+-----------------+----------------\n");

            for scene in 0..SCENES {
                let leader = dims.leader(round_idx, scene);
                let cells: Vec<String> = Role::ALL
                    .iter()
                    .map(|&role| Self::format_members(round.slot_members(scene, role), leader))
                    .collect();
                output.push_str(&format!(
                    "  {:5} | {:15} | {:15} | {}\n",
                    scene + 1,
                    cells[0],
                    cells[1],
                    cells[2]
                ));
            }
            output.push('\n');
        }

        output
    }

    fn format_members(members: &[Person], leader: Person) -> String {
        members
            .iter()
            .map(|&p| {
                if p == leader {
                    format!("P{}*", p)
                } else {
                    format!("P{}", p)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Format one person's track through the schedule
    pub fn format_person_track(matrix: &AssignmentMatrix, person: Person) -> String {
        let cells: Vec<String> = matrix
            .person_track(person)
            .iter()
            .map(|&slot| format!("scene {} {}", scene_of(slot) + 1, role_of(slot).label()))
            .collect();
        format!("P{}: {}", person, cells.join(" -> "))
    }

    /// Format multiple solutions as a summary table
    pub fn format_solution_summary(solutions: &[Solution]) -> String {
        let mut output = String::new();

        output.push_str("Schedules Summary:\n");
        output.push_str("ID       | Penalty | Time(ms) | Rounds | Optimal\n");
        output.push_str("---------|---------|----------|--------|--------\n");

        for solution in solutions {
            output.push_str(&format!(
                "{:8} | {:7} | {:8} | {:6} | {}\n",
                &solution.metadata.id[..8.min(solution.metadata.id.len())],
                solution.total_penalty,
                solution.solve_time.as_millis(),
                solution.metadata.rounds,
                if solution.proven_optimal { "yes" } else { "no" }
            ));
        }

        output
    }

    /// Save solutions to files based on output format
    pub fn save_solutions<P: AsRef<Path>>(
        solutions: &[Solution],
        output_dir: P,
        format: &OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        match format {
            OutputFormat::Text => {
                for (i, solution) in solutions.iter().enumerate() {
                    let filename = format!("schedule_{:03}.txt", i + 1);
                    let filepath = output_dir.join(filename);
                    let content = Self::format_solution(solution);
                    std::fs::write(filepath, content)?;
                }
            }
            OutputFormat::Json => {
                for (i, solution) in solutions.iter().enumerate() {
                    let filename = format!("schedule_{:03}.json", i + 1);
                    let filepath = output_dir.join(filename);
                    solution.save_to_file(filepath)?;
                }

                // Also save a summary file
                let summary_path = output_dir.join("schedules_summary.json");
                let summaries: Vec<_> = solutions.iter().map(|s| s.summary()).collect();
                let summary_json = serde_json::to_string_pretty(&summaries)?;
                std::fs::write(summary_path, summary_json)?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    /// Format success message
    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    /// Format error message
    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Format warning message
    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    /// Format info message
    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RoundAssignment;
    use std::time::Duration;

    fn one_round_matrix() -> AssignmentMatrix {
        AssignmentMatrix::new(
            12,
            vec![RoundAssignment::from_slots((0..12).collect()).unwrap()],
        )
    }

    #[test]
    fn test_matrix_formatting_marks_leaders() {
        let text = ScheduleFormatter::format_matrix(&one_round_matrix());
        assert!(text.contains("Round 1:"));
        // Person 1 leads scene 1 of round 1
        assert!(text.contains("P1*"));
        // Person 5 sits in scene 2 Observer, not a leader
        assert!(text.contains("P5"));
        assert!(!text.contains("P5*"));
    }

    #[test]
    fn test_solution_formatting() {
        let solution = Solution::new(one_round_matrix(), true, Duration::from_millis(42));
        let text = ScheduleFormatter::format_solution(&solution);
        assert!(text.contains("Persons: 12, Rounds: 1"));
        assert!(text.contains("proven optimal"));
        assert!(text.contains("Round 1:"));
    }

    #[test]
    fn test_person_track() {
        let track = ScheduleFormatter::format_person_track(&one_round_matrix(), 4);
        // Slot 3 is scene 2, Prosecution
        assert_eq!(track, "P4: scene 2 Prosecution");
    }

    #[test]
    fn test_summary_table() {
        let solution = Solution::new(one_round_matrix(), false, Duration::ZERO);
        let table = ScheduleFormatter::format_solution_summary(&[solution]);
        assert!(table.contains("ID"));
        assert!(table.contains("| no"));
    }

    #[test]
    fn test_save_solutions_text_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let solution = Solution::new(one_round_matrix(), true, Duration::ZERO);

        ScheduleFormatter::save_solutions(
            std::slice::from_ref(&solution),
            dir.path().join("text"),
            &OutputFormat::Text,
        )
        .unwrap();
        assert!(dir.path().join("text/schedule_001.txt").exists());

        ScheduleFormatter::save_solutions(
            std::slice::from_ref(&solution),
            dir.path().join("json"),
            &OutputFormat::Json,
        )
        .unwrap();
        assert!(dir.path().join("json/schedule_001.json").exists());
        assert!(dir.path().join("json/schedules_summary.json").exists());
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));

        let success = ColorOutput::success("OK");
        assert!(success.contains("OK"));
    }
}
