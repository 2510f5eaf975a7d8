use clap::Subcommand;
use healthdash_core::risk::{dieoff_tier, sifo_assessment, treatment_analysis};

use crate::common::{print_json, CliResult, Globals};

#[derive(Subcommand)]
pub enum RiskAction {
    /// Response plan for a die-off severity
    Dieoff {
        /// Severity, 1-10
        severity: u8,
    },
    /// Score SIFO risk factors (e.g. antibiotic_use ppi_use)
    Sifo {
        factors: Vec<String>,
    },
    /// Failure patterns in treatment_history.json
    Treatment,
}

pub fn run(globals: &Globals, action: RiskAction) -> CliResult {
    match action {
        RiskAction::Dieoff { severity } => print_json(&dieoff_tier(severity)?),
        RiskAction::Sifo { factors } => print_json(&sifo_assessment(&factors)),
        RiskAction::Treatment => {
            let ctx = globals.context()?;
            print_json(&treatment_analysis(&ctx.store.treatment_history()))
        }
    }
}
