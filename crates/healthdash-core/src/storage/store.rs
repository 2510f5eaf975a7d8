//! Reads the JSON record files a dashboard evaluation needs.
//!
//! Every read degrades instead of failing: a missing or malformed file is an
//! empty array, and a single malformed record is skipped. Both cases are
//! logged with `warn!` so bad exports are still visible.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::alerts::Alert;
use crate::evaluation::DashboardInput;
use crate::protocol::ProtocolDocument;
use crate::records::{
    DieoffEpisode, DoseRecord, MealRecord, SleepRecord, SymptomRecord, VitalRecord,
};
use crate::risk::TreatmentCourse;
use crate::wearables::{aggregate_hrv, aggregate_sleep, HrvSample, SleepSegment};

/// Record files understood by [`DataStore`].
pub const DATA_FILES: &[&str] = &[
    "vitals.json",
    "sleep.json",
    "symptoms.json",
    "doses.json",
    "meals.json",
    "alerts.json",
    "protocol.json",
    "hrv_samples.json",
    "sleep_segments.json",
    "treatment_history.json",
    "dieoff_episodes.json",
];

/// A directory of JSON record files.
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_text(&self, name: &str) -> Option<String> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "record file missing");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read record file");
                None
            }
        }
    }

    /// Read an array file, skipping records that do not parse.
    pub fn read_array<T: DeserializeOwned>(&self, name: &str) -> Vec<T> {
        let Some(content) = self.read_text(name) else {
            return Vec::new();
        };
        let raw: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                warn!(file = name, error = %e, "malformed record file, treating as empty");
                return Vec::new();
            }
        };

        let total = raw.len();
        let records: Vec<T> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(file = name, index, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect();
        debug!(file = name, total, kept = records.len(), "loaded records");
        records
    }

    /// The protocol document, or the default kill-phase protocol when the
    /// file is missing, malformed or has an invalid schedule.
    pub fn protocol(&self) -> ProtocolDocument {
        let Some(content) = self.read_text("protocol.json") else {
            return ProtocolDocument::default();
        };
        let document: ProtocolDocument = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "malformed protocol.json, using default protocol");
                return ProtocolDocument::default();
            }
        };
        if let Err(e) = document.schedule.validate() {
            warn!(error = %e, "invalid schedule in protocol.json, using default schedule");
            return ProtocolDocument {
                phase: document.phase,
                ..Default::default()
            };
        }
        document
    }

    /// Daily vitals, filled in from raw HRV samples for dates that have no
    /// HRV reading of their own.
    pub fn vitals(&self) -> Vec<VitalRecord> {
        let mut vitals: Vec<VitalRecord> = self.read_array("vitals.json");
        let covered: BTreeSet<NaiveDate> = vitals
            .iter()
            .filter(|v| v.hrv.is_some())
            .filter_map(VitalRecord::day)
            .collect();
        let samples: Vec<HrvSample> = self.read_array("hrv_samples.json");
        vitals.extend(
            aggregate_hrv(&samples)
                .iter()
                .filter(|daily| !covered.contains(&daily.date))
                .map(|daily| daily.to_vital()),
        );
        vitals
    }

    /// Nightly sleep, filled in from staged segments for nights without a
    /// record of their own.
    pub fn sleep(&self) -> Vec<SleepRecord> {
        let mut sleep: Vec<SleepRecord> = self.read_array("sleep.json");
        let covered: BTreeSet<NaiveDate> = sleep.iter().filter_map(SleepRecord::day).collect();
        let segments: Vec<SleepSegment> = self.read_array("sleep_segments.json");
        sleep.extend(
            aggregate_sleep(&segments)
                .into_iter()
                .filter(|night| night.day().is_some_and(|d| !covered.contains(&d))),
        );
        sleep
    }

    pub fn symptoms(&self) -> Vec<SymptomRecord> {
        self.read_array("symptoms.json")
    }

    pub fn doses(&self) -> Vec<DoseRecord> {
        self.read_array("doses.json")
    }

    pub fn meals(&self) -> Vec<MealRecord> {
        self.read_array("meals.json")
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.read_array("alerts.json")
    }

    pub fn treatment_history(&self) -> Vec<TreatmentCourse> {
        self.read_array("treatment_history.json")
    }

    pub fn dieoff_episodes(&self) -> Vec<DieoffEpisode> {
        self.read_array("dieoff_episodes.json")
    }

    /// Snapshot of everything an evaluation reads.
    pub fn load_input(&self) -> DashboardInput {
        DashboardInput {
            vitals: self.vitals(),
            sleep: self.sleep(),
            symptoms: self.symptoms(),
            doses: self.doses(),
            meals: self.meals(),
            protocol: self.protocol(),
            external_alerts: self.alerts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn missing_directory_is_empty_input() {
        let store = DataStore::new("/nonexistent/healthdash/data");
        let input = store.load_input();
        assert!(input.vitals.is_empty());
        assert!(input.doses.is_empty());
        assert_eq!(input.protocol, ProtocolDocument::default());
    }

    #[test]
    fn malformed_file_is_empty_and_bad_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "symptoms.json", "{ not json");
        write(
            dir.path(),
            "vitals.json",
            indoc! {r#"
                [
                  {"date": "2024-01-01", "hrv": "48"},
                  {"hrv": 50},
                  {"date": "2024-01-02", "hrv": null, "rhr": 61}
                ]
            "#},
        );
        let store = DataStore::new(dir.path());
        assert!(store.symptoms().is_empty());

        let vitals = store.vitals();
        assert_eq!(vitals.len(), 2);
        assert_eq!(vitals[0].hrv, Some(48.0));
        assert_eq!(vitals[1].hrv, None);
    }

    #[test]
    fn invalid_schedule_falls_back_but_keeps_phase() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "protocol.json",
            indoc! {r#"
                {
                  "phase": {"name": "Kill Phase", "start_date": "2024-01-01", "end_date": "2024-02-01"},
                  "schedule": {"slots": [
                    {"key": "a", "label": "A", "time_of_day": "09:00", "supplements": []},
                    {"key": "b", "label": "B", "time_of_day": "08:00", "supplements": []}
                  ]}
                }
            "#},
        );
        let protocol = DataStore::new(dir.path()).protocol();
        assert_eq!(protocol.phase.map(|p| p.name).as_deref(), Some("Kill Phase"));
        assert_eq!(protocol.schedule.doses_per_day(), 8);
    }

    #[test]
    fn wearable_data_fills_gaps_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vitals.json", r#"[{"date": "2024-01-01", "hrv": 70}]"#);
        write(
            dir.path(),
            "hrv_samples.json",
            r#"[
                {"date": "2024-01-01", "hrv_ms": 20},
                {"date": "2024-01-02", "hrv_ms": 44},
                {"date": "2024-01-02", "hrv_ms": 46}
            ]"#,
        );
        let vitals = DataStore::new(dir.path()).vitals();
        assert_eq!(vitals.len(), 2);
        assert_eq!(vitals[0].hrv, Some(70.0));
        assert_eq!(vitals[1].date, "2024-01-02");
        assert_eq!(vitals[1].hrv, Some(45.0));
    }
}
