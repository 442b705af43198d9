//! Demonstration of the roster scheduling engine
//!
//! This example runs both solver modes through the library interface:
//! plain satisfaction on an exact-partition instance, then portfolio
//! branch-and-bound minimization on a larger one.

use std::time::Instant;
use trial_roster::config::{Settings, SolveMode};
use trial_roster::search::SearchStatus;
use trial_roster::solve_roster;
use trial_roster::utils::ScheduleFormatter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Trial Roster Scheduler Demonstration ===\n");

    satisfy_demo()?;
    minimize_demo()?;

    println!("✅ Both solver modes completed!");
    Ok(())
}

fn satisfy_demo() -> Result<(), Box<dyn std::error::Error>> {
    println!("Satisfy mode: 12 persons over 3 rounds (one person per slot)");

    let mut settings = Settings::default();
    settings.problem.persons = 12;
    settings.problem.rounds = 3;

    let start = Instant::now();
    let report = solve_roster(settings)?;
    println!(
        "  Status: {} ({} nodes in {:.3}ms)",
        report.status.label(),
        report.stats.nodes,
        start.elapsed().as_secs_f64() * 1000.0
    );

    match report.solution {
        Some(solution) => {
            println!("\n{}", ScheduleFormatter::format_matrix(&solution.matrix));
        }
        None => return Err("expected a schedule for the 12-person instance".into()),
    }

    Ok(())
}

fn minimize_demo() -> Result<(), Box<dyn std::error::Error>> {
    println!("Minimize mode: 16 persons over 2 rounds, 4 portfolio workers");

    let mut settings = Settings::default();
    settings.problem.persons = 16;
    settings.problem.rounds = 2;
    settings.solver.mode = SolveMode::Minimize;
    settings.solver.num_threads = Some(4);
    settings.solver.timeout_seconds = 30;

    let start = Instant::now();
    let report = solve_roster(settings)?;
    println!(
        "  Status: {} ({} nodes in {:.3}ms)",
        report.status.label(),
        report.stats.nodes,
        start.elapsed().as_secs_f64() * 1000.0
    );

    match report.solution {
        Some(solution) => {
            println!(
                "  Total imbalance penalty: {}{}",
                solution.total_penalty,
                if report.status == SearchStatus::Optimal {
                    " (proven optimal)"
                } else {
                    ""
                }
            );
            println!("\n{}", ScheduleFormatter::format_solution_summary(&[solution]));
        }
        None => return Err("expected a schedule for the 16-person instance".into()),
    }

    Ok(())
}
