//! Qualitative insights from same-day symptom and biometric pairs.
//!
//! These are descriptive heuristics: fixed thresholds over same-date pairs
//! and a simple comparison of recent against earlier severities.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::records::{SleepRecord, SymptomRecord, VitalRecord};
use crate::series::{daily_hrv, nightly_sleep};

pub const LOW_HRV_INSIGHT: &str = "Low HRV correlates with higher symptoms";
pub const GOOD_HRV_INSIGHT: &str = "Good HRV, milder symptoms";
pub const SHORT_DEEP_SLEEP_INSIGHT: &str = "Short deep sleep correlates with higher symptoms";

/// Pair thresholds for the correlation heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationRules {
    pub low_hrv: f64,
    pub good_hrv: f64,
    pub short_deep_minutes: f64,
    pub high_severity: u8,
    pub mild_severity: u8,
    /// Pairs needed before an insight is emitted
    pub min_pairs: usize,
    /// Entries in each half of the trend comparison
    pub trend_window: usize,
    /// Mean severity change that counts as a trend
    pub trend_delta: f64,
}

impl Default for CorrelationRules {
    fn default() -> Self {
        Self {
            low_hrv: 51.0,
            good_hrv: 61.0,
            short_deep_minutes: 30.0,
            high_severity: 5,
            mild_severity: 3,
            min_pairs: 2,
            trend_window: 5,
            trend_delta: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Worsening,
    Stable,
}

/// Severity trend for one symptom type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomTrend {
    pub symptom_type: String,
    pub recent_mean: f64,
    pub previous_mean: f64,
    pub direction: TrendDirection,
}

impl SymptomTrend {
    /// Insight text; stable trends have none.
    pub fn insight(&self) -> Option<String> {
        match self.direction {
            TrendDirection::Improving => Some(format!("{} is improving", self.symptom_type)),
            TrendDirection::Worsening => Some(format!("{} is worsening", self.symptom_type)),
            TrendDirection::Stable => None,
        }
    }
}

/// Same-date pairs of (biometric value, symptom severity).
fn pairs(series: &BTreeMap<NaiveDate, f64>, symptoms: &[SymptomRecord]) -> Vec<(f64, u8)> {
    symptoms
        .iter()
        .filter_map(|s| {
            let value = series.get(&s.day()?)?;
            Some((*value, s.severity?))
        })
        .collect()
}

fn count(pairs: &[(f64, u8)], pred: impl Fn(f64, u8) -> bool) -> usize {
    pairs.iter().filter(|(v, s)| pred(*v, *s)).count()
}

/// Insight strings from HRV and deep-sleep pairings.
pub fn correlate(
    symptoms: &[SymptomRecord],
    vitals: &[VitalRecord],
    sleep: &[SleepRecord],
    rules: &CorrelationRules,
) -> Vec<String> {
    let hrv: BTreeMap<NaiveDate, f64> = daily_hrv(vitals).into_iter().collect();
    let deep: BTreeMap<NaiveDate, f64> = nightly_sleep(sleep)
        .into_iter()
        .filter_map(|n| Some((n.date, n.deep_minutes?)))
        .collect();

    let hrv_pairs = pairs(&hrv, symptoms);
    let deep_pairs = pairs(&deep, symptoms);

    let mut insights = Vec::new();
    if count(&hrv_pairs, |v, s| v < rules.low_hrv && s >= rules.high_severity) >= rules.min_pairs {
        insights.push(LOW_HRV_INSIGHT.to_string());
    }
    if count(&hrv_pairs, |v, s| v >= rules.good_hrv && s <= rules.mild_severity) >= rules.min_pairs {
        insights.push(GOOD_HRV_INSIGHT.to_string());
    }
    if count(&deep_pairs, |v, s| v < rules.short_deep_minutes && s >= rules.high_severity)
        >= rules.min_pairs
    {
        insights.push(SHORT_DEEP_SLEEP_INSIGHT.to_string());
    }
    insights
}

/// Per-type trends, ordered by symptom type.
///
/// Entries are ordered by date then time of day; types with fewer than two
/// full windows of rated entries are skipped.
pub fn symptom_trends(symptoms: &[SymptomRecord], rules: &CorrelationRules) -> Vec<SymptomTrend> {
    let window = rules.trend_window;
    if window == 0 {
        return Vec::new();
    }

    let mut by_type: BTreeMap<&str, Vec<(NaiveDate, &str, u8)>> = BTreeMap::new();
    for symptom in symptoms {
        if let (Some(day), Some(severity)) = (symptom.day(), symptom.severity) {
            by_type.entry(symptom.symptom_type.as_str()).or_default().push((
                day,
                symptom.time.as_deref().unwrap_or(""),
                severity,
            ));
        }
    }

    by_type
        .into_iter()
        .filter_map(|(kind, mut entries)| {
            if entries.len() < window * 2 {
                return None;
            }
            // Newest first.
            entries.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
            let mean = |slice: &[(NaiveDate, &str, u8)]| {
                slice.iter().map(|e| f64::from(e.2)).sum::<f64>() / slice.len() as f64
            };
            let recent_mean = mean(&entries[..window]);
            let previous_mean = mean(&entries[window..window * 2]);

            let direction = if recent_mean <= previous_mean - rules.trend_delta {
                TrendDirection::Improving
            } else if recent_mean >= previous_mean + rules.trend_delta {
                TrendDirection::Worsening
            } else {
                TrendDirection::Stable
            };
            Some(SymptomTrend {
                symptom_type: kind.to_string(),
                recent_mean,
                previous_mean,
                direction,
            })
        })
        .collect()
}
