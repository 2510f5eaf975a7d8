//! The 16-week intensive plan and the post-protocol relapse-prevention
//! stages.

use serde::{Deserialize, Serialize};

/// A supplement line in a plan stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSupplement {
    pub name: &'static str,
    pub dose: &'static str,
    pub timing: &'static str,
    pub frequency: &'static str,
}

/// Stage of the 16-week plan for a given protocol week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStage {
    BiofilmDisruption,
    ActiveAntimicrobial,
    Consolidation,
    Complete,
}

/// Resolved plan for one protocol week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhasePlan {
    pub stage: PlanStage,
    pub phase: &'static str,
    pub weeks: &'static str,
    pub duration_weeks: u32,
    pub antimicrobials: bool,
    pub supplements: Vec<PlannedSupplement>,
}

const fn planned(
    name: &'static str,
    dose: &'static str,
    timing: &'static str,
    frequency: &'static str,
) -> PlannedSupplement {
    PlannedSupplement {
        name,
        dose,
        timing,
        frequency,
    }
}

/// Look up the plan for a 1-based protocol week. Week 0 is treated as week 1.
pub fn phase_plan_for_week(week: u32) -> PhasePlan {
    match week {
        0..=4 => PhasePlan {
            stage: PlanStage::BiofilmDisruption,
            phase: "Biofilm Disruption",
            weeks: "1-4",
            duration_weeks: 4,
            antimicrobials: false,
            supplements: vec![
                planned("EDTA", "500mg", "AM fasted", "Daily"),
                planned("NAC", "600mg", "AM fasted", "Daily"),
                planned("Bismuth", "300mg", "With meals", "3x daily"),
            ],
        },
        5..=12 => PhasePlan {
            stage: PlanStage::ActiveAntimicrobial,
            phase: "Active Antimicrobial",
            weeks: "5-12",
            duration_weeks: 8,
            antimicrobials: true,
            supplements: vec![
                planned("Allicin", "450mg", "AM fasted, with lunch, with dinner", "TID"),
                planned("Neem", "300mg", "With Allicin", "TID"),
                planned("Berberine", "500mg", "With meals", "TID"),
            ],
        },
        13..=16 => PhasePlan {
            stage: PlanStage::Consolidation,
            phase: "Consolidation",
            weeks: "13-16",
            duration_weeks: 4,
            antimicrobials: true,
            supplements: vec![
                planned("Allicin", "450mg", "With breakfast, with dinner", "BID"),
                planned("Neem", "300mg", "With Allicin", "BID"),
            ],
        },
        _ => PhasePlan {
            stage: PlanStage::Complete,
            phase: "Protocol Complete",
            weeks: "17+",
            duration_weeks: 0,
            antimicrobials: false,
            supplements: Vec::new(),
        },
    }
}

/// Relapse-prevention stage after the protocol ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceStage {
    pub phase: &'static str,
    pub weeks_since: i64,
    pub prokinetic: &'static str,
    pub antimicrobials: &'static str,
    pub monitoring: &'static str,
}

/// Stage for the number of whole weeks since the protocol completed.
pub fn maintenance_stage(weeks_since: i64) -> MaintenanceStage {
    let (phase, prokinetic, antimicrobials, monitoring) = match weeks_since {
        i64::MIN..=4 => ("Critical Window", "Full dose - DO NOT TAPER", "None", "Daily"),
        5..=12 => ("Consolidation", "Full dose", "Pulsed 1wk on/3wk off", "Weekly"),
        13..=26 => ("Maintenance", "Taper 25%/month", "3 days monthly", "Bi-weekly"),
        _ => ("Sustain", "As needed", "1-2 days monthly", "Monthly"),
    };
    MaintenanceStage {
        phase,
        weeks_since,
        prokinetic,
        antimicrobials,
        monitoring,
    }
}
