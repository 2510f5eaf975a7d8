use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedule::ProtocolSchedule;

/// A dated treatment phase (e.g. "Kill Phase").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPhase {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ProtocolPhase {
    /// Whole days from `today` until the phase ends; negative once it is over.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }

    /// Elapsed share of the phase as a rounded percentage in 0..=100.
    pub fn progress_pct(&self, today: NaiveDate) -> u8 {
        let total = (self.end_date - self.start_date).num_days();
        if total <= 0 {
            return if today >= self.end_date { 100 } else { 0 };
        }
        let elapsed = (today - self.start_date).num_days();
        let pct = (elapsed as f64 / total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    pub fn contains(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

/// The protocol document supplied by the data-access layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDocument {
    #[serde(default)]
    pub phase: Option<ProtocolPhase>,
    #[serde(default)]
    pub schedule: ProtocolSchedule,
}
