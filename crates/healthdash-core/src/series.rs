//! Per-date views over raw vitals and sleep records.
//!
//! Records are grouped by their `date` key, missing values are dropped, and
//! several readings for one date (different sources) collapse to their mean.
//! Series are returned newest first.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::records::{SleepRecord, VitalRecord};

/// Mean of the present values, or `None` when nothing is present.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// One HRV value per date, newest first.
pub fn daily_hrv(vitals: &[VitalRecord]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for vital in vitals {
        if let (Some(day), Some(hrv)) = (vital.day(), vital.hrv) {
            by_date.entry(day).or_default().push(hrv);
        }
    }
    by_date
        .into_iter()
        .rev()
        .filter_map(|(day, values)| mean(&values).map(|v| (day, v)))
        .collect()
}

/// Collapsed sleep metrics for one night.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NightSummary {
    pub date: NaiveDate,
    pub total_hours: Option<f64>,
    pub deep_minutes: Option<f64>,
    pub quality: Option<f64>,
}

#[derive(Default)]
struct NightValues {
    total_hours: Vec<f64>,
    deep_minutes: Vec<f64>,
    quality: Vec<f64>,
}

/// One summary per night, newest first. Nights with no usable field at all
/// are left out.
pub fn nightly_sleep(sleep: &[SleepRecord]) -> Vec<NightSummary> {
    let mut by_date: BTreeMap<NaiveDate, NightValues> = BTreeMap::new();
    for night in sleep {
        let Some(day) = night.day() else { continue };
        let values = by_date.entry(day).or_default();
        values.total_hours.extend(night.total_hours);
        values.deep_minutes.extend(night.deep_minutes);
        values.quality.extend(night.quality);
    }
    by_date
        .into_iter()
        .rev()
        .map(|(date, values)| NightSummary {
            date,
            total_hours: mean(&values.total_hours),
            deep_minutes: mean(&values.deep_minutes),
            quality: mean(&values.quality),
        })
        .filter(|n| n.total_hours.is_some() || n.deep_minutes.is_some() || n.quality.is_some())
        .collect()
}

/// Whether the dates are consecutive calendar days, newest first.
pub fn is_consecutive_run(dates: &[NaiveDate]) -> bool {
    dates
        .windows(2)
        .all(|pair| pair[0].pred_opt() == Some(pair[1]))
}
