use clap::Subcommand;
use healthdash_core::reports::{
    food_reactions, medical_report, symptom_summary, weekly_report, SYMPTOM_SUMMARY_DAYS,
};

use crate::common::{print_json, with_matcher, CliResult, Globals};

#[derive(Subcommand)]
pub enum ReportAction {
    /// Adherence and symptom digest for the last seven days
    Weekly,
    /// Treatment history, 30-day symptoms and die-off episodes for a clinician
    Medical,
    /// Per-symptom severity summary
    Symptoms {
        /// Look-back in days
        #[arg(long, default_value_t = SYMPTOM_SUMMARY_DAYS)]
        days: i64,
    },
    /// Which foods coincide with bad reactions
    Foods,
}

pub fn run(globals: &Globals, action: ReportAction) -> CliResult {
    let ctx = globals.context()?;
    let today = ctx.now.date();

    match action {
        ReportAction::Weekly => {
            let input = ctx.input();
            let settings = ctx.config.settings();
            let episodes = ctx.store.dieoff_episodes();
            let report = with_matcher(&input, &settings, |m| {
                weekly_report(m, &input.doses, &input.symptoms, &episodes, today)
            });
            print_json(&report)
        }
        ReportAction::Medical => print_json(&medical_report(
            &ctx.store.treatment_history(),
            &ctx.store.protocol(),
            &ctx.store.symptoms(),
            &ctx.store.dieoff_episodes(),
            today,
        )),
        ReportAction::Symptoms { days } => {
            if days <= 0 {
                return Err(format!("--days must be positive, got {days}").into());
            }
            print_json(&symptom_summary(&ctx.store.symptoms(), today, days))
        }
        ReportAction::Foods => print_json(&food_reactions(&ctx.store.meals())),
    }
}
