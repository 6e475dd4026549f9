use std::rc::Rc;

use chrono::Utc;
use clap::Subcommand;
use cozy_pomodoro_core::stats::{iso_week_key, month_key};
use cozy_pomodoro_core::{AppConfig, StatsRecorder};
use serde_json::json;

use super::timer::settled_core;
use super::{open_db, print_json, CommandResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's completed sessions
    Today,
    /// This ISO week's total
    Week,
    /// This month's total
    Month,
    /// Summary of every bucket
    All,
    /// Per-day counts for this week, as bars
    Chart {
        /// Print the chart data as JSON instead
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> CommandResult {
    let db = open_db()?;
    settled_core(&db, &AppConfig::load_or_default())?;
    let recorder = StatsRecorder::load(Rc::clone(&db));
    let today = Utc::now().date_naive();

    match action {
        StatsAction::Today => print_json(&json!({
            "date": today,
            "count": recorder.day_count(today),
        }))?,
        StatsAction::Week => print_json(&json!({
            "week": iso_week_key(today),
            "count": recorder.week_total(today),
        }))?,
        StatsAction::Month => print_json(&json!({
            "month": month_key(today),
            "count": recorder.month_total(today),
        }))?,
        StatsAction::All => print_json(&recorder.summary(today))?,
        StatsAction::Chart { json } => {
            let days = recorder.week_days(today);
            if json {
                print_json(&days)?;
            } else {
                let max = days.iter().map(|d| d.count).max().unwrap_or(0).max(1);
                for day in &days {
                    let width = (day.count * 30 / max) as usize;
                    println!("{} {:>3} {}", day.label, day.count, "█".repeat(width));
                }
            }
        }
    }
    Ok(())
}
