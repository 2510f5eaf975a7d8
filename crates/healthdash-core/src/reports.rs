//! Summary reports: the weekly digest, the medical report for a clinician,
//! per-symptom summaries and the food reaction matrix.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::adherence::{weekly_adherence, DoseMatcher, WeeklyAdherence};
use crate::protocol::ProtocolDocument;
use crate::records::{DieoffEpisode, DoseRecord, MealReaction, MealRecord, SymptomRecord};
use crate::risk::TreatmentCourse;

/// Default look-back for [`symptom_summary`] and [`medical_report`].
pub const SYMPTOM_SUMMARY_DAYS: i64 = 30;

/// Past treatment courses listed in full in a medical report.
pub const RECENT_TREATMENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub adherence: WeeklyAdherence,
    pub symptom_count: usize,
    /// Distinct symptom types logged in the week, sorted.
    pub symptom_types: Vec<String>,
    pub dieoff_episodes: usize,
}

/// Digest of the seven days ending at `today`.
pub fn weekly_report(
    matcher: &DoseMatcher<'_>,
    doses: &[DoseRecord],
    symptoms: &[SymptomRecord],
    episodes: &[DieoffEpisode],
    today: NaiveDate,
) -> WeeklyReport {
    let start_date = today - Duration::days(6);
    let in_range = |day: Option<NaiveDate>| day.is_some_and(|d| d >= start_date && d <= today);
    let in_week: Vec<&SymptomRecord> = symptoms.iter().filter(|s| in_range(s.day())).collect();
    let types: BTreeSet<&str> = in_week.iter().map(|s| s.symptom_type.as_str()).collect();

    WeeklyReport {
        start_date,
        end_date: today,
        adherence: weekly_adherence(matcher, today, doses),
        symptom_count: in_week.len(),
        symptom_types: types.into_iter().map(String::from).collect(),
        dieoff_episodes: episodes.iter().filter(|e| in_range(e.day())).count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentSummary {
    pub total: usize,
    /// The newest courses, oldest first.
    pub recent: Vec<TreatmentCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DieoffSummary {
    pub count: usize,
    /// Mean over rated episodes, one decimal.
    pub average_severity: Option<f64>,
}

/// Everything a clinician needs in one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub treatment_history: TreatmentSummary,
    pub protocol: ProtocolDocument,
    pub symptoms: Vec<SymptomSummary>,
    pub symptoms_logged: usize,
    pub dieoff: DieoffSummary,
}

/// Medical report over the [`SYMPTOM_SUMMARY_DAYS`] days ending at `today`.
///
/// Treatment history is not windowed: courses are listed as stored, the
/// last [`RECENT_TREATMENTS`] in full.
pub fn medical_report(
    treatments: &[TreatmentCourse],
    protocol: &ProtocolDocument,
    symptoms: &[SymptomRecord],
    episodes: &[DieoffEpisode],
    today: NaiveDate,
) -> MedicalReport {
    let start_date = today - Duration::days(SYMPTOM_SUMMARY_DAYS - 1);
    let in_range = |day: Option<NaiveDate>| day.is_some_and(|d| d >= start_date && d <= today);

    let summaries = symptom_summary(symptoms, today, SYMPTOM_SUMMARY_DAYS);
    let recent_episodes: Vec<&DieoffEpisode> =
        episodes.iter().filter(|e| in_range(e.day())).collect();
    let rated: Vec<u8> = recent_episodes.iter().filter_map(|e| e.severity).collect();

    MedicalReport {
        start_date,
        end_date: today,
        treatment_history: TreatmentSummary {
            total: treatments.len(),
            recent: treatments[treatments.len().saturating_sub(RECENT_TREATMENTS)..].to_vec(),
        },
        protocol: protocol.clone(),
        symptoms_logged: summaries.iter().map(|s| s.count).sum(),
        symptoms: summaries,
        dieoff: DieoffSummary {
            count: recent_episodes.len(),
            average_severity: mean_one_decimal(&rated),
        },
    }
}

fn mean_one_decimal(values: &[u8]) -> Option<f64> {
    (!values.is_empty()).then(|| {
        let mean = values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64;
        (mean * 10.0).round() / 10.0
    })
}

/// Severity summary for one symptom type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomSummary {
    pub symptom_type: String,
    /// Mean severity rounded to one decimal; `None` when no entry is rated.
    pub average: Option<f64>,
    pub count: usize,
    /// Severity of the newest rated entry.
    pub latest: Option<u8>,
}

/// Per-type summaries over the `days` days ending at `today`, sorted by type.
pub fn symptom_summary(symptoms: &[SymptomRecord], today: NaiveDate, days: i64) -> Vec<SymptomSummary> {
    let since = today - Duration::days(days.max(1) - 1);
    let mut by_type: BTreeMap<&str, Vec<(NaiveDate, Option<u8>)>> = BTreeMap::new();
    for symptom in symptoms {
        let Some(day) = symptom.day() else { continue };
        if day < since || day > today {
            continue;
        }
        by_type
            .entry(symptom.symptom_type.as_str())
            .or_default()
            .push((day, symptom.severity));
    }

    by_type
        .into_iter()
        .map(|(kind, mut entries)| {
            entries.sort_by_key(|(day, _)| *day);
            let rated: Vec<u8> = entries.iter().filter_map(|(_, s)| *s).collect();
            SymptomSummary {
                symptom_type: kind.to_string(),
                average: mean_one_decimal(&rated),
                count: entries.len(),
                latest: rated.last().copied(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FoodVerdict {
    Safe,
    Avoid,
    Caution,
}

/// Reaction tally for one food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodReaction {
    pub food: String,
    pub count: u32,
    /// Meals with no reaction
    pub good: u32,
    /// Mild or unrecorded reactions
    pub neutral: u32,
    pub bad: u32,
    pub verdict: FoodVerdict,
}

/// Reaction matrix across all meals, most eaten first.
pub fn food_reactions(meals: &[MealRecord]) -> Vec<FoodReaction> {
    let mut tally: BTreeMap<String, (u32, u32, u32)> = BTreeMap::new();
    for meal in meals {
        for food in meal.foods.split(',').map(|f| f.trim().to_lowercase()) {
            if food.is_empty() {
                continue;
            }
            let (good, neutral, bad) = tally.entry(food).or_default();
            match meal.reaction {
                Some(MealReaction::None) => *good += 1,
                Some(MealReaction::Bad) => *bad += 1,
                Some(MealReaction::Mild) | None => *neutral += 1,
            }
        }
    }

    let mut reactions: Vec<FoodReaction> = tally
        .into_iter()
        .map(|(food, (good, neutral, bad))| FoodReaction {
            food,
            count: good + neutral + bad,
            good,
            neutral,
            bad,
            verdict: if bad > good {
                FoodVerdict::Avoid
            } else if good > bad {
                FoodVerdict::Safe
            } else {
                FoodVerdict::Caution
            },
        })
        .collect();
    // Stable: ties stay alphabetical.
    reactions.sort_by(|a, b| b.count.cmp(&a.count));
    reactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adherence::{AliasTable, MatchPolicy};
    use crate::protocol::ProtocolSchedule;
    use crate::risk::TreatmentOutcome;
    use crate::timing::{SlotTiming, TimingRules};

    fn symptom(date: &str, kind: &str, severity: Option<u8>) -> SymptomRecord {
        SymptomRecord {
            date: date.into(),
            symptom_type: kind.into(),
            severity,
            ..Default::default()
        }
    }

    fn episode(date: &str, severity: Option<u8>) -> DieoffEpisode {
        DieoffEpisode {
            date: date.into(),
            severity,
            ..Default::default()
        }
    }

    fn course(name: &str) -> TreatmentCourse {
        TreatmentCourse {
            name: Some(name.into()),
            duration_weeks: Some(4),
            biofilm_disruptors: false,
            underdosed: false,
            prokinetic: false,
            outcome: TreatmentOutcome::Relapse,
        }
    }

    fn meal(foods: &str, reaction: Option<MealReaction>) -> MealRecord {
        MealRecord {
            date: "2024-01-01".into(),
            meal_type: None,
            foods: foods.into(),
            reaction,
        }
    }

    #[test]
    fn weekly_report_counts_symptoms_in_range() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );
        let symptoms = vec![
            symptom("2024-01-01", "bloating", Some(5)),
            symptom("2024-01-07", "gas", Some(2)),
            symptom("2024-01-07", "bloating", Some(4)),
            symptom("2023-12-31", "nausea", Some(6)),
        ];
        let episodes = vec![
            episode("2024-01-03", Some(4)),
            episode("2023-12-29", Some(7)),
            episode("undated", Some(2)),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let report = weekly_report(&matcher, &[], &symptoms, &episodes, today);
        assert_eq!(report.symptom_count, 3);
        assert_eq!(report.dieoff_episodes, 1);
        assert_eq!(report.symptom_types, vec!["bloating", "gas"]);
        assert_eq!(report.adherence.percentage, 0);
        assert_eq!(report.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn symptom_summary_averages_rated_entries() {
        let symptoms = vec![
            symptom("2024-01-03", "bloating", Some(6)),
            symptom("2024-01-01", "bloating", Some(5)),
            symptom("2024-01-02", "bloating", None),
            symptom("2024-01-04", "bloating", Some(5)),
            symptom("2023-11-01", "bloating", Some(10)),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let summary = symptom_summary(&symptoms, today, SYMPTOM_SUMMARY_DAYS);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].count, 4);
        assert_eq!(summary[0].average, Some(5.3));
        assert_eq!(summary[0].latest, Some(5));
    }

    #[test]
    fn medical_report_combines_history_symptoms_and_dieoff() {
        let treatments: Vec<TreatmentCourse> =
            ["Rifaximin", "Nystatin", "Berberine", "Allicin"].map(course).to_vec();
        let symptoms = vec![
            symptom("2024-03-30", "bloating", Some(6)),
            symptom("2024-03-02", "bloating", Some(3)),
            symptom("2024-03-01", "fatigue", Some(8)),
            symptom("2024-02-29", "fatigue", Some(9)),
        ];
        let episodes = vec![
            episode("2024-03-20", Some(5)),
            episode("2024-03-25", Some(8)),
            episode("2024-03-28", None),
            episode("2024-02-01", Some(10)),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();

        let report = medical_report(
            &treatments,
            &ProtocolDocument::default(),
            &symptoms,
            &episodes,
            today,
        );

        assert_eq!(report.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(report.treatment_history.total, 4);
        let recent: Vec<&str> = report
            .treatment_history
            .recent
            .iter()
            .filter_map(|c| c.name.as_deref())
            .collect();
        assert_eq!(recent, vec!["Nystatin", "Berberine", "Allicin"]);

        assert_eq!(report.symptoms_logged, 3);
        assert_eq!(report.symptoms[0].symptom_type, "bloating");
        assert_eq!(report.symptoms[0].average, Some(4.5));
        assert_eq!(report.symptoms[1].average, Some(8.0));

        assert_eq!(report.dieoff.count, 3);
        assert_eq!(report.dieoff.average_severity, Some(6.5));
    }

    #[test]
    fn medical_report_with_no_records() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        let report = medical_report(&[], &ProtocolDocument::default(), &[], &[], today);
        assert_eq!(report.treatment_history.total, 0);
        assert!(report.treatment_history.recent.is_empty());
        assert!(report.symptoms.is_empty());
        assert_eq!(report.dieoff.count, 0);
        assert_eq!(report.dieoff.average_severity, None);
    }

    #[test]
    fn food_matrix_verdicts() {
        let meals = vec![
            meal("Rice, Chicken", Some(MealReaction::None)),
            meal("rice, onion", Some(MealReaction::Bad)),
            meal("Onion", Some(MealReaction::Bad)),
            meal("rice", Some(MealReaction::None)),
            meal("chicken, ", Some(MealReaction::Bad)),
            meal("", None),
        ];
        let matrix = food_reactions(&meals);
        let rows: Vec<(&str, u32, FoodVerdict)> = matrix
            .iter()
            .map(|r| (r.food.as_str(), r.count, r.verdict))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("rice", 3, FoodVerdict::Safe),
                ("chicken", 2, FoodVerdict::Caution),
                ("onion", 2, FoodVerdict::Avoid),
            ]
        );
    }
}
