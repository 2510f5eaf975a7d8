use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::protocol::hhmm;

/// Detector thresholds, read from the `[alerts]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// HRV below this (ms) on consecutive recent days is critical
    #[serde(default = "default_hrv_critical")]
    pub hrv_critical: f64,
    #[serde(default = "default_hrv_critical_days")]
    pub hrv_critical_days: usize,
    /// HRV below this (ms) on consecutive recent days is a warning
    #[serde(default = "default_hrv_warning")]
    pub hrv_warning: f64,
    #[serde(default = "default_hrv_warning_days")]
    pub hrv_warning_days: usize,
    /// HRV above this (ms) on recent days is worth celebrating
    #[serde(default = "default_hrv_optimal")]
    pub hrv_optimal: f64,
    #[serde(default = "default_hrv_optimal_days")]
    pub hrv_optimal_days: usize,
    /// Number of most recent nights the sleep detectors look at
    #[serde(default = "default_sleep_window_nights")]
    pub sleep_window_nights: usize,
    /// Nights in the window that must breach before a sleep alert fires
    #[serde(default = "default_sleep_min_breaches")]
    pub sleep_min_breaches: usize,
    #[serde(default = "default_deep_sleep_minutes")]
    pub deep_sleep_minutes: f64,
    #[serde(default = "default_sleep_quality_floor")]
    pub sleep_quality_floor: f64,
    #[serde(default = "default_sleep_hours_floor")]
    pub sleep_hours_floor: f64,
    /// Start of the no-dose reminder window (inclusive)
    #[serde(default = "default_reminder_start", with = "hhmm")]
    pub reminder_start: NaiveTime,
    /// End of the no-dose reminder window (exclusive)
    #[serde(default = "default_reminder_end", with = "hhmm")]
    pub reminder_end: NaiveTime,
    /// Warn when the active phase ends within this many days
    #[serde(default = "default_phase_ending_days")]
    pub phase_ending_days: i64,
}

fn default_hrv_critical() -> f64 {
    51.0
}
fn default_hrv_critical_days() -> usize {
    2
}
fn default_hrv_warning() -> f64 {
    61.0
}
fn default_hrv_warning_days() -> usize {
    3
}
fn default_hrv_optimal() -> f64 {
    80.0
}
fn default_hrv_optimal_days() -> usize {
    3
}
fn default_sleep_window_nights() -> usize {
    7
}
fn default_sleep_min_breaches() -> usize {
    3
}
fn default_deep_sleep_minutes() -> f64 {
    30.0
}
fn default_sleep_quality_floor() -> f64 {
    5.0
}
fn default_sleep_hours_floor() -> f64 {
    5.0
}
fn default_reminder_start() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}
fn default_reminder_end() -> NaiveTime {
    NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default()
}
fn default_phase_ending_days() -> i64 {
    7
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            hrv_critical: default_hrv_critical(),
            hrv_critical_days: default_hrv_critical_days(),
            hrv_warning: default_hrv_warning(),
            hrv_warning_days: default_hrv_warning_days(),
            hrv_optimal: default_hrv_optimal(),
            hrv_optimal_days: default_hrv_optimal_days(),
            sleep_window_nights: default_sleep_window_nights(),
            sleep_min_breaches: default_sleep_min_breaches(),
            deep_sleep_minutes: default_deep_sleep_minutes(),
            sleep_quality_floor: default_sleep_quality_floor(),
            sleep_hours_floor: default_sleep_hours_floor(),
            reminder_start: default_reminder_start(),
            reminder_end: default_reminder_end(),
            phase_ending_days: default_phase_ending_days(),
        }
    }
}
