use clap::Subcommand;
use healthdash_core::protocol::{maintenance_stage, phase_plan_for_week};
use serde_json::json;

use crate::common::{print_json, CliResult, Globals};

#[derive(Subcommand)]
pub enum ProtocolAction {
    /// Current schedule and phase
    Show,
    /// Plan for a protocol week (default: the active phase's week)
    Week {
        /// 1-based protocol week
        week: Option<u32>,
    },
    /// Relapse-prevention stage after the protocol
    Maintenance {
        /// Whole weeks since the protocol ended (default: since the phase end date)
        #[arg(long)]
        weeks: Option<i64>,
    },
}

pub fn run(globals: &Globals, action: ProtocolAction) -> CliResult {
    match action {
        ProtocolAction::Show => {
            let ctx = globals.context()?;
            let protocol = ctx.store.protocol();
            let today = ctx.now.date();
            let progress = protocol.phase.as_ref().map(|p| {
                json!({
                    "progress_pct": p.progress_pct(today),
                    "days_remaining": p.days_remaining(today),
                })
            });
            print_json(&json!({
                "phase": protocol.phase,
                "progress": progress,
                "doses_per_day": protocol.schedule.doses_per_day(),
                "schedule": protocol.schedule,
            }))
        }
        ProtocolAction::Week { week } => {
            let week = match week {
                Some(week) => week,
                None => {
                    let ctx = globals.context()?;
                    let phase = ctx
                        .store
                        .protocol()
                        .phase
                        .ok_or("no active phase; pass a week number")?;
                    let elapsed = (ctx.now.date() - phase.start_date).num_days().max(0);
                    u32::try_from(elapsed / 7 + 1)?
                }
            };
            print_json(&phase_plan_for_week(week))
        }
        ProtocolAction::Maintenance { weeks } => {
            let weeks = match weeks {
                Some(weeks) => weeks,
                None => {
                    let ctx = globals.context()?;
                    let phase = ctx
                        .store
                        .protocol()
                        .phase
                        .ok_or("no protocol phase recorded; pass --weeks")?;
                    (ctx.now.date() - phase.end_date).num_weeks()
                }
            };
            print_json(&maintenance_stage(weeks))
        }
    }
}
