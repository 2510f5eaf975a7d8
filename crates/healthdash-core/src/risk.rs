//! Die-off tiers, SIFO risk scoring and treatment-history analysis.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Die-off reaction tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieoffTier {
    Mild,
    Moderate,
    Severe,
}

/// Response plan for a die-off tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DieoffPlan {
    pub tier: DieoffTier,
    pub severity_range: &'static str,
    pub actions: Vec<&'static str>,
    pub continue_treatment: bool,
}

/// Map a 1-10 die-off severity to its response plan.
pub fn dieoff_tier(severity: u8) -> Result<DieoffPlan, ValidationError> {
    let plan = match severity {
        1..=4 => DieoffPlan {
            tier: DieoffTier::Mild,
            severity_range: "1-4/10",
            actions: vec![
                "Continue antimicrobials",
                "Activated charcoal 500mg",
                "Hydrate 3L+",
                "Rest",
            ],
            continue_treatment: true,
        },
        5..=7 => DieoffPlan {
            tier: DieoffTier::Moderate,
            severity_range: "5-7/10",
            actions: vec![
                "Reduce antimicrobial dose 50%",
                "NAC 600mg BID",
                "Bentonite clay",
                "Liver support",
            ],
            continue_treatment: true,
        },
        8..=10 => DieoffPlan {
            tier: DieoffTier::Severe,
            severity_range: "8-10/10",
            actions: vec![
                "PAUSE antimicrobials",
                "Contact provider",
                "Aggressive binding",
                "Hydration IV if needed",
            ],
            continue_treatment: false,
        },
        _ => {
            return Err(ValidationError::InvalidValue {
                field: "severity".into(),
                message: format!("{severity} is outside 1-10"),
            })
        }
    };
    Ok(plan)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SifoAssessment {
    pub score: u32,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<&'static str>,
}

/// Known SIFO risk factors and their weights.
pub const SIFO_WEIGHTS: &[(&str, u32)] = &[
    ("antibiotic_use", 4),
    ("high_sugar_diet", 3),
    ("oral_steroids", 4),
    ("ppi_use", 3),
    ("white_tongue", 3),
    ("brain_fog", 3),
    ("sugar_cravings", 3),
    ("recurrent_infections", 4),
    ("skin_issues", 2),
    ("genital_symptoms", 3),
];

fn sifo_weight(factor: &str) -> u32 {
    let normalized = factor.trim().to_lowercase().replace(['-', ' '], "_");
    SIFO_WEIGHTS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, weight)| *weight)
        .unwrap_or(1)
}

/// Score reported risk factors. Unknown factors weigh 1.
pub fn sifo_assessment(factors: &[String]) -> SifoAssessment {
    let score: u32 = factors.iter().map(|f| sifo_weight(f)).sum();
    let risk_level = if score >= 12 {
        RiskLevel::High
    } else if score >= 7 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };
    let recommendations = match risk_level {
        RiskLevel::Low => vec!["S. boulardii 250mg daily", "Monitor during treatment"],
        RiskLevel::Moderate => vec![
            "S. boulardii 500mg BID",
            "Caprylic acid",
            "Consider antifungal rotation",
        ],
        RiskLevel::High => vec![
            "Full SIFO protocol",
            "Prescription antifungal",
            "Strict diet",
            "Biofilm disruptors",
        ],
    };
    SifoAssessment {
        score,
        risk_level,
        risk_factors: factors.to_vec(),
        recommendations,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentOutcome {
    Resolved,
    Improved,
    Relapse,
    Failed,
}

/// A past treatment course, as stored in `treatment_history.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentCourse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "durationWeeks")]
    pub duration_weeks: Option<u32>,
    #[serde(default, alias = "biofilmDisruptors")]
    pub biofilm_disruptors: bool,
    #[serde(default)]
    pub underdosed: bool,
    #[serde(default)]
    pub prokinetic: bool,
    pub outcome: TreatmentOutcome,
}

impl TreatmentCourse {
    fn relapsed(&self) -> bool {
        self.outcome == TreatmentOutcome::Relapse
    }

    fn unresolved(&self) -> bool {
        self.outcome != TreatmentOutcome::Resolved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternShare {
    pub count: usize,
    /// Share of all courses, one decimal
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailurePatterns {
    pub insufficient_duration: PatternShare,
    pub no_biofilm_disruption: PatternShare,
    pub inadequate_dosing: PatternShare,
    pub no_prokinetic: PatternShare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentAnalysis {
    pub total_treatments: usize,
    pub patterns: FailurePatterns,
    pub recommendations: Vec<&'static str>,
}

/// Look for recurring reasons past courses failed.
pub fn treatment_analysis(history: &[TreatmentCourse]) -> TreatmentAnalysis {
    let total = history.len();
    let count = |pred: fn(&TreatmentCourse) -> bool| history.iter().filter(|c| pred(c)).count();

    let insufficient = count(|c| c.relapsed() && c.duration_weeks.is_some_and(|w| w < 8));
    let no_biofilm = count(|c| c.relapsed() && !c.biofilm_disruptors);
    let underdosed = count(|c| c.unresolved() && c.underdosed);
    let no_prokinetic = count(|c| c.unresolved() && !c.prokinetic);

    let share = |count: usize| PatternShare {
        count,
        pct: if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64 * 1000.0).round() / 10.0
        },
    };

    let mut recommendations = Vec::new();
    if total == 0 {
        recommendations.push("Start with refractory protocol analysis");
    } else {
        if no_biofilm >= 2 {
            recommendations.push("Biofilm disruption phase required (4 weeks)");
        }
        if insufficient >= 2 {
            recommendations.push("Extend to 16-week intensive protocol");
        }
        if underdosed >= 1 {
            recommendations.push("Use therapeutic dosing (Allicin 1350mg/day)");
        }
        if no_prokinetic >= 2 {
            recommendations.push("Prokinetic mandatory throughout");
        }
        if recommendations.is_empty() {
            recommendations.push("Standard 16-week protocol recommended");
        }
    }

    TreatmentAnalysis {
        total_treatments: total,
        patterns: FailurePatterns {
            insufficient_duration: share(insufficient),
            no_biofilm_disruption: share(no_biofilm),
            inadequate_dosing: share(underdosed),
            no_prokinetic: share(no_prokinetic),
        },
        recommendations,
    }
}
