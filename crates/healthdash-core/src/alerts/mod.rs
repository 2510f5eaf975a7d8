//! Threshold-based alerts over HRV, sleep and protocol state.
//!
//! Detected alerts are recomputed on every evaluation and never persisted.
//! [`merge_alerts`] combines them with alerts the data layer already stores.

mod engine;
mod thresholds;

use serde::{Deserialize, Serialize};

pub use engine::AlertEngine;
pub use thresholds::AlertThresholds;

/// Alert urgency. Ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

/// What an alert is about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertCategory {
    #[serde(rename = "HRV", alias = "hrv")]
    Hrv,
    #[serde(alias = "sleep")]
    Sleep,
    #[default]
    #[serde(alias = "protocol")]
    Protocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub priority: AlertPriority,
    pub message: String,
    #[serde(default, alias = "details")]
    pub recommendation: String,
    #[serde(default)]
    pub category: AlertCategory,
}

impl Alert {
    pub fn new(
        priority: AlertPriority,
        category: AlertCategory,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            message: message.into(),
            recommendation: recommendation.into(),
            category,
        }
    }
}

/// Detected alerts followed by external ones, stably sorted by priority.
///
/// Ties keep detector order, then external order.
pub fn merge_alerts(detected: Vec<Alert>, external: Vec<Alert>) -> Vec<Alert> {
    let mut merged = detected;
    merged.extend(external);
    merged.sort_by_key(|alert| alert.priority);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(priority: AlertPriority, message: &str) -> Alert {
        Alert::new(priority, AlertCategory::Protocol, message, "")
    }

    #[test]
    fn merge_is_stable() {
        let detected = vec![
            alert(AlertPriority::Low, "a"),
            alert(AlertPriority::High, "b"),
            alert(AlertPriority::Medium, "c"),
        ];
        let external = vec![alert(AlertPriority::High, "x"), alert(AlertPriority::Low, "y")];

        let merged = merge_alerts(detected, external);
        let order: Vec<&str> = merged.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(order, vec!["b", "x", "c", "a", "y"]);
    }

    #[test]
    fn external_alerts_parse_loosely() {
        let raw = r#"{"type":"protocol_update","message":"Protocol updated","details":"new dose","priority":"medium"}"#;
        let alert: Alert = serde_json::from_str(raw).unwrap();
        assert_eq!(alert.priority, AlertPriority::Medium);
        assert_eq!(alert.recommendation, "new dose");
        assert_eq!(alert.category, AlertCategory::Protocol);
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&AlertCategory::Hrv).unwrap();
        assert_eq!(json, "\"HRV\"");
    }
}
