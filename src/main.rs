//! Main CLI application for the trial roster scheduler

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trial_roster::{
    config::{CliOverrides, Settings, SolveMode},
    scheduling::{RosterProblem, ScheduleValidator, Solution},
    search::SearchStatus,
    utils::{ColorOutput, ScheduleFormatter},
};

#[derive(Parser)]
#[command(name = "trial_roster")]
#[command(about = "Round-robin trial roster scheduler")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a roster scheduling problem
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Number of persons (overrides config)
        #[arg(short, long)]
        persons: Option<usize>,

        /// Number of rounds (overrides config)
        #[arg(short, long)]
        rounds: Option<usize>,

        /// Minimize total gender imbalance instead of stopping at the
        /// first satisfying schedule
        #[arg(short, long)]
        minimize: bool,

        /// Solver timeout in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create example configuration files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a saved schedule against the configured rules
    Validate {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Schedule JSON file to validate
        #[arg(short, long)]
        schedule: PathBuf,

        /// Show every person's track through the schedule
        #[arg(long)]
        show_tracks: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            persons,
            rounds,
            minimize,
            timeout,
            output,
            verbose,
        } => solve_command(config, persons, rounds, minimize, timeout, output, verbose),
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Validate {
            config,
            schedule,
            show_tracks,
        } => validate_command(config, schedule, show_tracks),
    }
}

fn solve_command(
    config_path: PathBuf,
    persons: Option<usize>,
    rounds: Option<usize>,
    minimize: bool,
    timeout: Option<u64>,
    output_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    println!("{}", ColorOutput::info("🔄 Starting Trial Roster Scheduler"));

    // Load configuration
    let mut settings = if config_path.exists() {
        Settings::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "Config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Settings::default()
    };

    // Apply CLI overrides
    let cli_overrides = CliOverrides {
        persons,
        rounds,
        mode: minimize.then_some(SolveMode::Minimize),
        timeout_seconds: timeout,
        output_dir,
    };
    settings.merge_with_cli(&cli_overrides);

    if verbose {
        println!("Configuration:");
        println!("  Persons: {}", settings.problem.persons);
        println!("  Rounds: {}", settings.problem.rounds);
        println!("  Mode: {:?}", settings.solver.mode);
        println!("  Timeout: {}s", settings.solver.timeout_seconds);
        println!(
            "  Output dir: {}",
            settings.output.output_directory.display()
        );
        println!();
    }

    // Create and solve the problem
    let problem = RosterProblem::new(settings.clone()).context("Failed to create problem")?;

    if verbose {
        println!("{}", problem.profile());
    }

    println!("{}", ColorOutput::info("🧮 Searching for a schedule..."));
    let report = problem.solve().context("Failed to solve problem")?;

    if verbose {
        println!(
            "Explored {} nodes, {} backtracks in {:.3}s",
            report.stats.nodes,
            report.stats.backtracks,
            report.stats.elapsed.as_secs_f64()
        );
    }

    match report.status {
        SearchStatus::Infeasible => {
            println!(
                "{}",
                ColorOutput::error("❌ No schedule exists under the active rules")
            );
            return Ok(());
        }
        SearchStatus::Unknown => {
            println!(
                "{}",
                ColorOutput::warning("❌ Budget expired before any schedule was found")
            );
            return Ok(());
        }
        SearchStatus::BestFound => {
            println!(
                "{}",
                ColorOutput::warning(
                    "⚠️  Budget expired; reporting the best schedule found so far"
                )
            );
        }
        SearchStatus::Satisfied | SearchStatus::Optimal => {}
    }

    let Some(solution) = report.solution else {
        anyhow::bail!("status {} reported without a schedule", report.status.label());
    };

    println!(
        "{}",
        ColorOutput::success(&format!(
            "✅ Schedule found in {:.3}s (status: {})",
            report.stats.elapsed.as_secs_f64(),
            report.status.label()
        ))
    );

    println!("\n{}", ScheduleFormatter::format_solution(&solution));

    // Save the schedule
    println!("{}", ColorOutput::info("💾 Saving schedule..."));
    ScheduleFormatter::save_solutions(
        std::slice::from_ref(&solution),
        &settings.output.output_directory,
        &settings.output.format,
    )
    .context("Failed to save schedule")?;

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Schedule saved to {}",
            settings.output.output_directory.display()
        ))
    );

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🛠️  Setting up project structure..."));

    let config_dir = directory.join("config");
    let output_dir = directory.join("output/schedules");

    for dir in [&config_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    // Create default configuration
    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        let default_settings = Settings::default();
        default_settings
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    // Create example configuration variants
    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    // Small instance, first satisfying schedule
    let mut satisfy_config = Settings::default();
    satisfy_config.problem.persons = 12;
    satisfy_config.problem.rounds = 3;
    satisfy_config.to_file(&examples_dir.join("satisfy.yaml"))?;

    // Larger instance, minimize gender imbalance across threads
    let mut minimize_config = Settings::default();
    minimize_config.problem.persons = 20;
    minimize_config.problem.rounds = 4;
    minimize_config.solver.mode = SolveMode::Minimize;
    minimize_config.solver.num_threads = Some(4);
    minimize_config.solver.timeout_seconds = 300;
    minimize_config.to_file(&examples_dir.join("minimize.yaml"))?;

    println!(
        "Created example configurations in: {}",
        examples_dir.display()
    );

    println!("\n{}", ColorOutput::success("✅ Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: cargo run -- solve --config config/default.yaml");

    Ok(())
}

fn validate_command(config_path: PathBuf, schedule_path: PathBuf, show_tracks: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🔍 Validating schedule..."));

    // Load configuration
    let settings = if config_path.exists() {
        Settings::from_file(&config_path)?
    } else {
        Settings::default()
    };

    // Load the schedule
    let solution = Solution::load_from_file(&schedule_path)
        .with_context(|| format!("Failed to load schedule from {}", schedule_path.display()))?;

    // Validate
    let validator = ScheduleValidator::new(settings);
    let result = validator.validate(&solution.matrix);

    println!("{}", result);

    if show_tracks {
        // Tracks index the matrix by person and slot; only a schedule
        // that passed the shape checks can be walked safely
        if result.is_valid {
            println!("Person tracks:");
            for person in 1..=solution.matrix.persons as u32 {
                println!(
                    "  {}",
                    ScheduleFormatter::format_person_track(&solution.matrix, person)
                );
            }
        } else {
            println!(
                "{}",
                ColorOutput::warning("Skipping person tracks: schedule failed validation")
            );
        }
    }

    if result.is_valid {
        println!("{}", ColorOutput::success("✅ Schedule is valid!"));
    } else {
        println!("{}", ColorOutput::error("❌ Schedule is invalid"));
        for violation in &result.violations {
            match violation.round {
                Some(round) => println!(
                    "  [{}] round {}: {}",
                    violation.rule.label(),
                    round,
                    violation.description
                ),
                None => println!("  [{}] {}", violation.rule.label(), violation.description),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "trial_roster",
            "solve",
            "--config",
            "test.yaml",
            "--persons",
            "12",
            "--rounds",
            "3",
            "--minimize",
        ]);

        assert!(cli.is_ok());
    }

    #[test]
    fn test_validate_command_survives_corrupt_schedule() {
        use std::time::Duration;
        use trial_roster::roster::{AssignmentMatrix, RoundAssignment};

        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let mut settings = Settings::default();
        settings.problem.persons = 12;
        settings.problem.rounds = 3;
        settings.to_file(&config_path).unwrap();

        // A schedule file edited by hand can point at any slot index
        let mut round = RoundAssignment::from_slots((0..12).collect()).unwrap();
        round.slot_of[5] = 50;
        let matrix = AssignmentMatrix::new(12, vec![round.clone(), round.clone(), round]);
        let schedule_path = temp_dir.path().join("schedule.json");
        Solution::new(matrix, false, Duration::ZERO)
            .save_to_file(&schedule_path)
            .unwrap();

        let result = validate_command(config_path, schedule_path, true);
        assert!(result.is_ok());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        let result = setup_command(temp_dir.path().to_path_buf(), false);

        assert!(result.is_ok());
        assert!(temp_dir.path().join("config/default.yaml").exists());
        assert!(temp_dir
            .path()
            .join("config/examples/minimize.yaml")
            .exists());
    }
}
