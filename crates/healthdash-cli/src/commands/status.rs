use healthdash_core::{AlertPriority, DashboardReport, DoseState, NextDose};
use serde_json::json;

use crate::common::{print_json, CliResult, Globals};

fn badge_label(badge: Option<DoseState>) -> &'static str {
    match badge {
        Some(DoseState::Taken) => "taken",
        Some(DoseState::Missed) => "missed",
        Some(DoseState::Pending) => "pending",
        None => "-",
    }
}

fn priority_label(priority: AlertPriority) -> &'static str {
    match priority {
        AlertPriority::High => "high",
        AlertPriority::Medium => "medium",
        AlertPriority::Low => "low",
    }
}

fn next_line(next: &NextDose) -> String {
    let when = if next.tomorrow { "tomorrow " } else { "" };
    format!(
        "{} at {}{} in {} ({})",
        next.slot.label,
        when,
        next.slot.time_of_day.format("%H:%M"),
        next.eta,
        next.pending_supplements.join(", ")
    )
}

fn print_summary(report: &DashboardReport) {
    println!("Healthdash  {}", report.now.format("%Y-%m-%d %H:%M"));
    if let Some(current) = report
        .current_slot
        .as_deref()
        .and_then(|key| report.slots.iter().find(|s| s.key == key))
    {
        println!("Current slot: {}", current.label);
    }
    println!();

    for slot in &report.slots {
        let marker = if slot.active { "*" } else { " " };
        println!(
            "{marker} {}  {:<26} {}",
            slot.time_of_day.format("%H:%M"),
            slot.label,
            badge_label(slot.badge)
        );
    }
    println!();

    println!(
        "Today:   {}/{} ({}%)",
        report.daily.taken, report.daily.total, report.daily.percentage
    );
    println!(
        "Week:    {}/{} ({}%)",
        report.weekly.taken, report.weekly.total, report.weekly.percentage
    );
    println!("Streak:  {} days", report.streak);
    if let Some(phase) = &report.phase {
        println!(
            "Phase:   {}, {}% ({} days left)",
            phase.name, phase.progress_pct, phase.days_remaining
        );
    }
    if let Some(next) = &report.next_dose {
        println!("Next:    {}", next_line(next));
    }

    if !report.alerts.is_empty() {
        println!();
        println!("Alerts:");
        for alert in &report.alerts {
            println!("  [{}] {}", priority_label(alert.priority), alert.message);
        }
    }
    if !report.insights.is_empty() {
        println!();
        println!("Insights:");
        for insight in &report.insights {
            println!("  - {insight}");
        }
    }
}

pub fn run(globals: &Globals, json: bool) -> CliResult {
    let report = globals.context()?.report();
    if json {
        return print_json(&report);
    }
    print_summary(&report);
    Ok(())
}

pub fn alerts(globals: &Globals) -> CliResult {
    let report = globals.context()?.report();
    print_json(&report.alerts)
}

pub fn next(globals: &Globals, json: bool) -> CliResult {
    let report = globals.context()?.report();
    match (&report.next_dose, json) {
        (next, true) => print_json(next),
        (Some(next), false) => {
            println!("{}", next_line(next));
            Ok(())
        }
        (None, false) => {
            println!("no doses scheduled");
            Ok(())
        }
    }
}

pub fn insights(globals: &Globals) -> CliResult {
    let report = globals.context()?.report();
    print_json(&json!({
        "insights": report.insights,
        "trends": report.trends,
    }))
}
