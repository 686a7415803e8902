//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `studlife_core` linkage.
//! - Optionally open a store file and print its dashboard summary.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use studlife_core::{AppCore, CoreConfig, DashboardSummary};

fn main() -> ExitCode {
    println!("studlife_core ping={}", studlife_core::ping());
    println!("studlife_core version={}", studlife_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match print_dashboard(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("studlife_cli error={message}");
            ExitCode::FAILURE
        }
    }
}

fn print_dashboard(db_path: &str) -> Result<(), String> {
    let mut app = AppCore::open(&CoreConfig::for_db_path(db_path)).map_err(|err| err.to_string())?;
    app.load_all();
    print_summary(&app.dashboard());
    app.close().map_err(|err| err.to_string())
}

fn print_summary(summary: &DashboardSummary) {
    if let Some(sleep) = &summary.sleep {
        println!(
            "sleep average_hours={:.1} percent_of_target={} nights={}",
            sleep.average_hours, sleep.percent_of_target, sleep.nights
        );
    }
    if let Some(savings) = &summary.savings {
        println!(
            "savings goals={} total_saved={} total_target={} overall_percent={}",
            savings.goal_count, savings.total_saved, savings.total_target, savings.overall_percent
        );
    }
    if let Some(reminders) = &summary.reminders {
        println!(
            "payments active={} active_amount={} total={}",
            reminders.active_count, reminders.active_amount, reminders.total_count
        );
    }
    if let (Some(jobs), Some(favorites)) = (summary.job_count, summary.favorite_job_count) {
        println!("jobs total={jobs} favorites={favorites}");
    }
}
