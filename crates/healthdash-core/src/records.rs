//! Logged health records as delivered by the data-access layer.
//!
//! Records arrive from JSON exports where numeric fields are sometimes
//! numbers, sometimes strings and sometimes missing. Every numeric field is
//! coerced through [`lenient`] so a missing or garbled value stays `None`
//! and is excluded downstream instead of turning into `0`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Parse a record's `date` partition key.
///
/// Accepts `YYYY-MM-DD`, tolerating a trailing time component
/// (`2024-01-05T08:00:00Z`) which is dropped.
pub fn record_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Strict `YYYY-MM-DD` parse for dates supplied on the command line.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// A supplement intake logged by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseRecord {
    pub supplement_name: String,
    #[serde(default)]
    pub dosage: String,
    /// Local wall-clock time the dose was logged.
    pub logged_at: NaiveDateTime,
    /// Calendar day (`YYYY-MM-DD`) the dose belongs to.
    pub date: String,
}

impl DoseRecord {
    pub fn day(&self) -> Option<NaiveDate> {
        record_date(&self.date)
    }
}

/// One day's vitals from a single source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    pub date: String,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub hrv: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub rhr: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub blood_oxygen: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub respiratory_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub heart_rate: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

impl VitalRecord {
    pub fn day(&self) -> Option<NaiveDate> {
        record_date(&self.date)
    }
}

/// One night of sleep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub date: String,
    #[serde(default, alias = "sleep_hours", deserialize_with = "lenient::f64")]
    pub total_hours: Option<f64>,
    #[serde(default, alias = "deep_sleep_minutes", deserialize_with = "lenient::f64")]
    pub deep_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub rem_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub core_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub awake_minutes: Option<f64>,
    /// Subjective quality, 1-10.
    #[serde(default, alias = "sleep_quality", deserialize_with = "lenient::f64")]
    pub quality: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

impl SleepRecord {
    pub fn day(&self) -> Option<NaiveDate> {
        record_date(&self.date)
    }
}

/// A logged symptom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomRecord {
    pub date: String,
    #[serde(rename = "type")]
    pub symptom_type: String,
    /// 0-10; anything outside that range is dropped at parse time.
    #[serde(default, deserialize_with = "lenient::severity")]
    pub severity: Option<u8>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SymptomRecord {
    pub fn day(&self) -> Option<NaiveDate> {
        record_date(&self.date)
    }
}

/// Reaction recorded against a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealReaction {
    None,
    Mild,
    Bad,
}

/// A logged meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub date: String,
    #[serde(default)]
    pub meal_type: Option<String>,
    /// Comma-separated food list as typed by the user.
    #[serde(default)]
    pub foods: String,
    #[serde(default)]
    pub reaction: Option<MealReaction>,
}

/// A logged die-off (Herxheimer) episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DieoffEpisode {
    pub date: String,
    /// 0-10, parsed like symptom severity.
    #[serde(default, deserialize_with = "lenient::severity")]
    pub severity: Option<u8>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DieoffEpisode {
    pub fn day(&self) -> Option<NaiveDate> {
        record_date(&self.date)
    }
}

/// Serde helpers that coerce loosely typed JSON into optional numbers.
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    /// Coerce a number, numeric string, `null` or anything else into
    /// `Option<f64>`. Non-numeric input becomes `None`, never `0`.
    pub fn f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Loose>::deserialize(deserializer)?;
        Ok(raw.and_then(|value| match value {
            Loose::Number(n) => Some(n),
            Loose::Text(s) => parse_number(&s),
            Loose::Other(_) => None,
        })
        .filter(|n| n.is_finite()))
    }

    /// Like [`f64`] but restricted to whole numbers in 0..=10.
    pub fn severity<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64(deserializer)?;
        Ok(value
            .filter(|n| n.fract() == 0.0 && (0.0..=10.0).contains(n))
            .map(|n| n as u8))
    }

    /// Parse a trimmed numeric string; empty or garbled text yields `None`.
    pub fn parse_number(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}
