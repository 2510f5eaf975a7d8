//! One-shot dashboard evaluation.
//!
//! [`evaluate`] is a pure function of its inputs and `now`: calling it twice
//! with the same arguments yields the same report.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adherence::{
    daily_adherence, slot_badge, streak, weekly_adherence, AdherenceRules, DailyAdherence,
    DoseMatcher, DoseState, SupplementStatus, WeeklyAdherence,
};
use crate::alerts::{merge_alerts, Alert, AlertEngine, AlertThresholds};
use crate::correlation::{correlate, symptom_trends, CorrelationRules, SymptomTrend};
use crate::protocol::{hhmm, ProtocolDocument};
use crate::records::{DoseRecord, MealRecord, SleepRecord, SymptomRecord, VitalRecord};
use crate::timing::{NextDose, SlotTiming, TimingRules};

/// Everything the data-access layer supplies for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardInput {
    #[serde(default)]
    pub vitals: Vec<VitalRecord>,
    #[serde(default)]
    pub sleep: Vec<SleepRecord>,
    #[serde(default)]
    pub symptoms: Vec<SymptomRecord>,
    #[serde(default)]
    pub doses: Vec<DoseRecord>,
    #[serde(default)]
    pub meals: Vec<MealRecord>,
    #[serde(default)]
    pub protocol: ProtocolDocument,
    /// Alerts persisted by the data layer, merged after detected ones.
    #[serde(default)]
    pub external_alerts: Vec<Alert>,
}

/// Engine tunables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub timing: TimingRules,
    #[serde(default)]
    pub adherence: AdherenceRules,
    #[serde(default)]
    pub alerts: AlertThresholds,
    #[serde(default)]
    pub correlation: CorrelationRules,
}

/// Per-slot summary for today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub key: String,
    pub label: String,
    #[serde(with = "hhmm")]
    pub time_of_day: chrono::NaiveTime,
    pub badge: Option<DoseState>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub name: String,
    pub progress_pct: u8,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub now: NaiveDateTime,
    pub today: NaiveDate,
    pub current_slot: Option<String>,
    pub slots: Vec<SlotSummary>,
    pub statuses: Vec<SupplementStatus>,
    pub next_dose: Option<NextDose>,
    pub daily: DailyAdherence,
    pub weekly: WeeklyAdherence,
    pub streak: u32,
    pub phase: Option<PhaseProgress>,
    pub alerts: Vec<Alert>,
    pub insights: Vec<String>,
    pub trends: Vec<SymptomTrend>,
}

/// Evaluate the dashboard as of `now`.
pub fn evaluate(input: &DashboardInput, now: NaiveDateTime, settings: &Settings) -> DashboardReport {
    let today = now.date();
    let schedule = &input.protocol.schedule;
    let timing = SlotTiming::new(schedule, settings.timing);
    let aliases = settings.adherence.alias_table();
    let matcher = DoseMatcher::new(timing, &aliases, settings.adherence.match_policy);

    let statuses = matcher.day_statuses(today, &input.doses, now);
    let slots = schedule
        .slots
        .iter()
        .map(|slot| {
            let in_slot: Vec<SupplementStatus> = statuses
                .iter()
                .filter(|s| s.slot == slot.key)
                .cloned()
                .collect();
            SlotSummary {
                key: slot.key.clone(),
                label: slot.label.clone(),
                time_of_day: slot.time_of_day,
                badge: slot_badge(&in_slot),
                active: timing.is_active(slot, now),
            }
        })
        .collect();

    let daily = daily_adherence(&matcher, today, &input.doses);
    let weekly = weekly_adherence(&matcher, today, &input.doses);
    let streak_days = streak(
        &matcher,
        &input.doses,
        today,
        settings.adherence.streak_threshold_pct,
    );

    let phase = input.protocol.phase.as_ref();
    let engine = AlertEngine::with_thresholds(settings.alerts.clone());
    let detected = engine.detect(&input.vitals, &input.sleep, &input.doses, phase, now);
    let alerts = merge_alerts(detected, input.external_alerts.clone());

    let trends = symptom_trends(&input.symptoms, &settings.correlation);
    let mut insights = correlate(
        &input.symptoms,
        &input.vitals,
        &input.sleep,
        &settings.correlation,
    );
    insights.extend(trends.iter().filter_map(SymptomTrend::insight));

    let report = DashboardReport {
        now,
        today,
        current_slot: timing.current_slot(now).map(|s| s.key.clone()),
        slots,
        next_dose: timing.next_dose(now, &statuses),
        statuses,
        daily,
        weekly,
        streak: streak_days,
        phase: phase.map(|p| PhaseProgress {
            name: p.name.clone(),
            progress_pct: p.progress_pct(today),
            days_remaining: p.days_remaining(today),
        }),
        alerts,
        insights,
        trends,
    };

    debug!(
        %now,
        daily_pct = report.daily.percentage,
        weekly_pct = report.weekly.percentage,
        streak = report.streak,
        alerts = report.alerts.len(),
        insights = report.insights.len(),
        "dashboard evaluated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertPriority;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_input_degrades_to_no_data() {
        let report = evaluate(&DashboardInput::default(), now(), &Settings::default());
        assert_eq!(report.daily.taken, 0);
        assert_eq!(report.daily.total, 8);
        assert_eq!(report.streak, 0);
        assert!(report.phase.is_none());
        assert!(report.insights.is_empty());
        assert_eq!(report.current_slot.as_deref(), Some("lunch"));

        // Only the no-dose reminder fires at 11:00.
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].priority, AlertPriority::Low);

        assert_eq!(report.statuses.len(), 8);
        let missed = report
            .statuses
            .iter()
            .filter(|s| s.state == DoseState::Missed)
            .count();
        // 07:00 and 08:00 are past their grace period; lunch is not.
        assert_eq!(missed, 3);
    }

    #[test]
    fn slots_carry_badges() {
        let mut input = DashboardInput::default();
        input.doses.push(DoseRecord {
            supplement_name: "Allimax".into(),
            dosage: "450mg".into(),
            logged_at: NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(7, 10, 0)
                .unwrap(),
            date: "2024-03-10".into(),
        });
        let report = evaluate(&input, now(), &Settings::default());
        let morning = &report.slots[0];
        assert_eq!(morning.badge, Some(DoseState::Taken));
        assert_eq!(report.slots[1].badge, Some(DoseState::Missed));
        assert_eq!(report.slots[2].badge, Some(DoseState::Pending));
        assert!(report.slots[2].active);
    }
}
