use clap::Subcommand;
use healthdash_core::adherence::{daily_adherence, streak, weekly_adherence};
use healthdash_core::records::parse_date;
use serde_json::json;

use crate::common::{print_json, with_matcher, CliResult, Globals};

#[derive(Subcommand)]
pub enum AdherenceAction {
    /// Adherence for one day (default today)
    Today {
        /// Day to report, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Pooled adherence for the seven days ending today
    Week {
        /// Last day of the week, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
    },
    /// Consecutive days at or above the threshold
    Streak {
        /// Override adherence.streak_threshold_pct
        #[arg(long)]
        threshold: Option<u8>,
    },
}

pub fn run(globals: &Globals, action: AdherenceAction) -> CliResult {
    let ctx = globals.context()?;
    let input = ctx.input();
    let settings = ctx.config.settings();
    let today = ctx.now.date();

    match action {
        AdherenceAction::Today { date } => {
            let date = date.as_deref().map(parse_date).transpose()?.unwrap_or(today);
            let daily = with_matcher(&input, &settings, |m| daily_adherence(m, date, &input.doses));
            print_json(&daily)
        }
        AdherenceAction::Week { end } => {
            let end = end.as_deref().map(parse_date).transpose()?.unwrap_or(today);
            let weekly = with_matcher(&input, &settings, |m| weekly_adherence(m, end, &input.doses));
            print_json(&weekly)
        }
        AdherenceAction::Streak { threshold } => {
            let threshold = threshold.unwrap_or(settings.adherence.streak_threshold_pct);
            if threshold > 100 {
                return Err(format!("threshold {threshold} is above 100").into());
            }
            let days = with_matcher(&input, &settings, |m| {
                streak(m, &input.doses, today, threshold)
            });
            print_json(&json!({ "streak": days, "threshold_pct": threshold }))
        }
    }
}
