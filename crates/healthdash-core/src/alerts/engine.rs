use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use super::{Alert, AlertCategory, AlertPriority, AlertThresholds};
use crate::protocol::ProtocolPhase;
use crate::records::{DoseRecord, SleepRecord, VitalRecord};
use crate::series::{daily_hrv, is_consecutive_run, nightly_sleep, NightSummary};

/// Runs the HRV, sleep and protocol detectors.
///
/// Inputs may arrive in any order and with missing values; the engine
/// builds its own newest-first, per-date views and never mutates them.
#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    pub thresholds: AlertThresholds,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// All detected alerts in detector order (unsorted).
    pub fn detect(
        &self,
        vitals: &[VitalRecord],
        sleep: &[SleepRecord],
        doses: &[DoseRecord],
        phase: Option<&ProtocolPhase>,
        now: NaiveDateTime,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();
        alerts.extend(self.hrv_alerts(vitals));
        alerts.extend(self.sleep_alerts(sleep));
        alerts.extend(self.protocol_reminder(doses, now));
        alerts.extend(self.phase_ending(phase, now.date()));
        debug!(count = alerts.len(), "alert detectors finished");
        alerts
    }

    /// Critical, warning and optimal HRV alerts. Critical suppresses warning.
    pub fn hrv_alerts(&self, vitals: &[VitalRecord]) -> Vec<Alert> {
        let t = &self.thresholds;
        let series = daily_hrv(vitals);
        let mut alerts = Vec::new();

        if recent_run(&series, t.hrv_critical_days, |hrv| hrv < t.hrv_critical) {
            alerts.push(Alert::new(
                AlertPriority::High,
                AlertCategory::Hrv,
                format!(
                    "HRV critically low: below {} ms for {} consecutive days",
                    t.hrv_critical, t.hrv_critical_days
                ),
                "Prioritize rest today. Skip intense exercise, hydrate and get to bed early. \
                 If this continues, consider reducing antimicrobial doses and contact your provider.",
            ));
        } else if recent_run(&series, t.hrv_warning_days, |hrv| hrv < t.hrv_warning) {
            alerts.push(Alert::new(
                AlertPriority::Medium,
                AlertCategory::Hrv,
                format!(
                    "HRV trending low: below {} ms for {} consecutive days",
                    t.hrv_warning, t.hrv_warning_days
                ),
                "Keep activity light and watch for die-off symptoms.",
            ));
        }

        if t.hrv_optimal_days > 0
            && series.len() >= t.hrv_optimal_days
            && series[..t.hrv_optimal_days]
                .iter()
                .all(|(_, hrv)| *hrv > t.hrv_optimal)
        {
            alerts.push(Alert::new(
                AlertPriority::Low,
                AlertCategory::Hrv,
                format!(
                    "HRV above {} ms for the last {} days",
                    t.hrv_optimal, t.hrv_optimal_days
                ),
                "Recovery looks strong. Stay on the current protocol.",
            ));
        }
        alerts
    }

    /// Deep sleep, sleep quality and sleep duration alerts.
    pub fn sleep_alerts(&self, sleep: &[SleepRecord]) -> Vec<Alert> {
        let t = &self.thresholds;
        let nights = nightly_sleep(sleep);
        let window = &nights[..nights.len().min(t.sleep_window_nights)];
        let mut alerts = Vec::new();

        let short_deep = breaches(window, |n| {
            n.deep_minutes.is_some_and(|m| m < t.deep_sleep_minutes)
        });
        if short_deep >= t.sleep_min_breaches {
            alerts.push(Alert::new(
                AlertPriority::High,
                AlertCategory::Sleep,
                format!(
                    "Deep sleep under {} minutes on {} of the last {} nights",
                    t.deep_sleep_minutes,
                    short_deep,
                    window.len()
                ),
                "Review evening routine: no screens an hour before bed, cool dark room, \
                 and take the prokinetic on schedule.",
            ));
        }

        let poor_quality = breaches(window, |n| {
            n.quality
                .is_some_and(|q| q > 0.0 && q < t.sleep_quality_floor)
        });
        if poor_quality >= t.sleep_min_breaches {
            alerts.push(Alert::new(
                AlertPriority::Medium,
                AlertCategory::Sleep,
                format!(
                    "Sleep quality below {} on {} of the last {} nights",
                    t.sleep_quality_floor,
                    poor_quality,
                    window.len()
                ),
                "Note any night-time symptoms and keep a consistent bedtime.",
            ));
        }

        let short_nights = breaches(window, |n| {
            n.total_hours.is_some_and(|h| h < t.sleep_hours_floor)
        });
        if short_nights >= t.sleep_min_breaches {
            alerts.push(Alert::new(
                AlertPriority::Medium,
                AlertCategory::Sleep,
                format!(
                    "Under {} hours of sleep on {} of the last {} nights",
                    t.sleep_hours_floor,
                    short_nights,
                    window.len()
                ),
                "Aim for at least seven hours. Recovery depends on it.",
            ));
        }
        alerts
    }

    /// Reminder when no dose has been logged today by midday.
    pub fn protocol_reminder(&self, doses: &[DoseRecord], now: NaiveDateTime) -> Option<Alert> {
        let t = &self.thresholds;
        let time = now.time();
        if time < t.reminder_start || time >= t.reminder_end {
            return None;
        }
        let today = now.date();
        if doses.iter().any(|d| d.day() == Some(today)) {
            return None;
        }
        Some(Alert::new(
            AlertPriority::Low,
            AlertCategory::Protocol,
            "No supplements logged today",
            "Log your morning doses so adherence stays accurate.",
        ))
    }

    /// Warning when the active phase is about to end.
    pub fn phase_ending(&self, phase: Option<&ProtocolPhase>, today: NaiveDate) -> Option<Alert> {
        let phase = phase?;
        let remaining = phase.days_remaining(today);
        if remaining <= 0 || remaining > self.thresholds.phase_ending_days {
            return None;
        }
        Some(Alert::new(
            AlertPriority::Medium,
            AlertCategory::Protocol,
            format!("{} ends in {} days", phase.name, remaining),
            "Plan the next phase and restock supplements.",
        ))
    }
}

fn breaches(window: &[NightSummary], pred: impl Fn(&NightSummary) -> bool) -> usize {
    window.iter().filter(|n| pred(n)).count()
}

/// Whether the `days` newest entries are consecutive and all satisfy `pred`.
fn recent_run(series: &[(NaiveDate, f64)], days: usize, pred: impl Fn(f64) -> bool) -> bool {
    if days == 0 || series.len() < days {
        return false;
    }
    let recent = &series[..days];
    let dates: Vec<NaiveDate> = recent.iter().map(|(d, _)| *d).collect();
    is_consecutive_run(&dates) && recent.iter().all(|(_, hrv)| pred(*hrv))
}
