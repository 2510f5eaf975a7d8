//! Roll raw wearable exports up into daily records.
//!
//! Watches export many HRV readings per day and sleep as a list of staged
//! segments. These helpers turn both into the per-date [`VitalRecord`] and
//! [`SleepRecord`] shapes the rest of the engine works with.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::records::{lenient, record_date, SleepRecord, VitalRecord};

pub const WEARABLE_SOURCE: &str = "wearable";

/// One HRV reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrvSample {
    pub date: String,
    #[serde(default, alias = "hrv", deserialize_with = "lenient::f64")]
    pub hrv_ms: Option<f64>,
}

/// One staged stretch of a night's sleep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSegment {
    pub date: String,
    pub start: String,
    pub end: String,
    /// Stage label such as `AsleepCore`, `AsleepDeep`, `AsleepREM` or `Awake`.
    #[serde(alias = "value")]
    pub stage: String,
}

/// Daily HRV statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHrv {
    pub date: NaiveDate,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl DailyHrv {
    pub fn to_vital(&self) -> VitalRecord {
        VitalRecord {
            date: self.date.format("%Y-%m-%d").to_string(),
            hrv: Some(self.avg),
            source: Some(WEARABLE_SOURCE.to_string()),
            ..Default::default()
        }
    }
}

/// Per-date HRV statistics, oldest first. Samples without a value or a
/// readable date are skipped.
pub fn aggregate_hrv(samples: &[HrvSample]) -> Vec<DailyHrv> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        if let (Some(day), Some(hrv)) = (record_date(&sample.date), sample.hrv_ms) {
            by_date.entry(day).or_default().push(hrv);
        }
    }
    by_date
        .into_iter()
        .map(|(date, values)| DailyHrv {
            date,
            avg: values.iter().sum::<f64>() / values.len() as f64,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            samples: values.len(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Core,
    Deep,
    Rem,
    Awake,
    Other,
}

impl Stage {
    fn parse(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("core") {
            Stage::Core
        } else if label.contains("deep") {
            Stage::Deep
        } else if label.contains("rem") {
            Stage::Rem
        } else if label.contains("awake") {
            Stage::Awake
        } else {
            Stage::Other
        }
    }
}

/// Parse a segment timestamp, keeping local wall-clock time.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
        .map(|dt| dt.naive_local())
}

#[derive(Default)]
struct StageMinutes {
    core: f64,
    deep: f64,
    rem: f64,
    awake: f64,
    other: f64,
}

/// Per-night sleep records, oldest first.
///
/// `total_hours` counts every asleep stage and leaves out time awake.
/// Segments with unreadable or reversed timestamps are skipped.
pub fn aggregate_sleep(segments: &[SleepSegment]) -> Vec<SleepRecord> {
    let mut by_date: BTreeMap<NaiveDate, StageMinutes> = BTreeMap::new();
    for segment in segments {
        let Some(day) = record_date(&segment.date) else { continue };
        let (Some(start), Some(end)) = (parse_timestamp(&segment.start), parse_timestamp(&segment.end))
        else {
            continue;
        };
        let minutes = (end - start).num_seconds() as f64 / 60.0;
        if minutes <= 0.0 {
            continue;
        }
        let night = by_date.entry(day).or_default();
        match Stage::parse(&segment.stage) {
            Stage::Core => night.core += minutes,
            Stage::Deep => night.deep += minutes,
            Stage::Rem => night.rem += minutes,
            Stage::Awake => night.awake += minutes,
            Stage::Other => night.other += minutes,
        }
    }

    by_date
        .into_iter()
        .map(|(date, m)| SleepRecord {
            date: date.format("%Y-%m-%d").to_string(),
            total_hours: Some((m.core + m.deep + m.rem + m.other) / 60.0),
            deep_minutes: Some(m.deep),
            rem_minutes: Some(m.rem),
            core_minutes: Some(m.core),
            awake_minutes: Some(m.awake),
            quality: None,
            source: Some(WEARABLE_SOURCE.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: &str, end: &str, stage: &str) -> SleepSegment {
        SleepSegment {
            date: "2024-01-02".into(),
            start: start.into(),
            end: end.into(),
            stage: stage.into(),
        }
    }

    #[test]
    fn hrv_statistics_per_day() {
        let samples: Vec<HrvSample> = serde_json::from_str(
            r#"[
                {"date": "2024-01-01", "hrv_ms": 40},
                {"date": "2024-01-01", "hrv_ms": "60"},
                {"date": "2024-01-01", "hrv_ms": ""},
                {"date": "2024-01-02", "hrv": 55.5}
            ]"#,
        )
        .unwrap();
        let daily = aggregate_hrv(&samples);
        assert_eq!(daily.len(), 2);
        assert_eq!((daily[0].avg, daily[0].min, daily[0].max), (50.0, 40.0, 60.0));
        assert_eq!(daily[0].samples, 2);

        let vital = daily[1].to_vital();
        assert_eq!(vital.date, "2024-01-02");
        assert_eq!(vital.hrv, Some(55.5));
    }

    #[test]
    fn sleep_segments_sum_by_stage() {
        let segments = vec![
            segment("2024-01-01 23:00:00", "2024-01-02 01:00:00", "AsleepCore"),
            segment("2024-01-02T01:00:00", "2024-01-02T01:45:00", "AsleepDeep"),
            segment("2024-01-02 01:45:00 -0500", "2024-01-02 02:15:00 -0500", "AsleepREM"),
            segment("2024-01-02 02:15:00", "2024-01-02 02:30:00", "Awake"),
            segment("not a time", "2024-01-02 03:00:00", "AsleepCore"),
        ];
        let nights = aggregate_sleep(&segments);
        assert_eq!(nights.len(), 1);
        let night = &nights[0];
        assert_eq!(night.deep_minutes, Some(45.0));
        assert_eq!(night.rem_minutes, Some(30.0));
        assert_eq!(night.awake_minutes, Some(15.0));
        assert_eq!(night.total_hours, Some(3.25));
    }
}
