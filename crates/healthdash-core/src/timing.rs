//! Slot timing: which dosing slot is current, whether a slot has passed,
//! and when the next dose is due.
//!
//! All functions take `now` as a local [`NaiveDateTime`] supplied by the
//! caller's clock; nothing here reads the system time.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::adherence::{DoseState, SupplementStatus};
use crate::protocol::{ProtocolSchedule, ScheduleSlot};

/// Timing windows around a slot, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingRules {
    /// How long after the slot time a dose is still on time.
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: i64,
    /// How long before the slot time it counts as active.
    #[serde(default = "default_active_lead_minutes")]
    pub active_lead_minutes: i64,
    /// Maximum distance between a logged dose and the slot time.
    #[serde(default = "default_proximity_minutes")]
    pub proximity_minutes: i64,
}

fn default_grace_minutes() -> i64 {
    120
}
fn default_active_lead_minutes() -> i64 {
    60
}
fn default_proximity_minutes() -> i64 {
    180
}

impl Default for TimingRules {
    fn default() -> Self {
        Self {
            grace_minutes: default_grace_minutes(),
            active_lead_minutes: default_active_lead_minutes(),
            proximity_minutes: default_proximity_minutes(),
        }
    }
}

impl TimingRules {
    pub fn grace(&self) -> Duration {
        Duration::minutes(self.grace_minutes)
    }

    pub fn active_lead(&self) -> Duration {
        Duration::minutes(self.active_lead_minutes)
    }

    pub fn proximity(&self) -> Duration {
        Duration::minutes(self.proximity_minutes)
    }
}

/// Non-negative time until a dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eta {
    pub hours: i64,
    pub minutes: i64,
}

impl Eta {
    fn from_duration(duration: Duration) -> Self {
        let total = duration.num_minutes().max(0);
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h{:02}m", self.hours, self.minutes)
    }
}

/// The next dose due.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextDose {
    pub slot: ScheduleSlot,
    pub pending_supplements: Vec<String>,
    pub eta: Eta,
    /// True when nothing is left today and this is tomorrow's first slot.
    pub tomorrow: bool,
}

/// Resolves slot timing against a schedule.
#[derive(Debug, Clone, Copy)]
pub struct SlotTiming<'a> {
    schedule: &'a ProtocolSchedule,
    rules: TimingRules,
}

impl<'a> SlotTiming<'a> {
    pub fn new(schedule: &'a ProtocolSchedule, rules: TimingRules) -> Self {
        Self { schedule, rules }
    }

    pub fn rules(&self) -> TimingRules {
        self.rules
    }

    pub fn schedule(&self) -> &'a ProtocolSchedule {
        self.schedule
    }

    /// Slots by time of day. Schedules built through
    /// [`ProtocolSchedule::new`] are already ascending; deserialized ones
    /// may not be.
    fn by_time(&self) -> Vec<&'a ScheduleSlot> {
        let mut slots: Vec<&'a ScheduleSlot> = self.schedule.slots.iter().collect();
        slots.sort_by_key(|slot| slot.time_of_day);
        slots
    }

    /// The slot whose window contains `now`.
    ///
    /// Windows are split at the midpoint between consecutive slot times. The
    /// first slot also owns the early morning and the last slot owns the late
    /// evening, so exactly one slot is current. Returns `None` only for an
    /// empty schedule.
    pub fn current_slot(&self, now: NaiveDateTime) -> Option<&'a ScheduleSlot> {
        let now_secs = now.time().num_seconds_from_midnight();
        let slots = self.by_time();

        let mut current = *slots.first()?;
        for pair in slots.windows(2) {
            let lower = pair[0].time_of_day.num_seconds_from_midnight();
            let upper = pair[1].time_of_day.num_seconds_from_midnight();
            let boundary = lower + upper.saturating_sub(lower) / 2;
            if now_secs >= boundary {
                current = pair[1];
            } else {
                break;
            }
        }
        Some(current)
    }

    /// Whether `now` is strictly past the slot time plus the grace period.
    pub fn has_passed(&self, slot: &ScheduleSlot, now: NaiveDateTime) -> bool {
        self.has_passed_on(slot, now.date(), now)
    }

    /// [`has_passed`](Self::has_passed) for the slot on an arbitrary day.
    /// Slots on earlier days have always passed; later days never have.
    pub fn has_passed_on(&self, slot: &ScheduleSlot, day: NaiveDate, now: NaiveDateTime) -> bool {
        now > NaiveDateTime::new(day, slot.time_of_day) + self.rules.grace()
    }

    /// Whether `now` falls within `[slot - lead, slot + grace]`.
    pub fn is_active(&self, slot: &ScheduleSlot, now: NaiveDateTime) -> bool {
        let at = slot_at(now, slot.time_of_day);
        now >= at - self.rules.active_lead() && now <= at + self.rules.grace()
    }

    /// The first slot with a pending supplement scheduled after `now`, or
    /// tomorrow's first slot when today has nothing left.
    pub fn next_dose(
        &self,
        now: NaiveDateTime,
        todays_statuses: &[SupplementStatus],
    ) -> Option<NextDose> {
        let slots = self.by_time();
        for slot in &slots {
            let at = slot_at(now, slot.time_of_day);
            if at <= now {
                continue;
            }
            let pending: Vec<String> = todays_statuses
                .iter()
                .filter(|s| s.slot == slot.key && s.state == DoseState::Pending)
                .map(|s| s.supplement_name.clone())
                .collect();
            if !pending.is_empty() {
                return Some(NextDose {
                    slot: (*slot).clone(),
                    pending_supplements: pending,
                    eta: Eta::from_duration(at - now),
                    tomorrow: false,
                });
            }
        }

        let first = self.schedule.first_slot()?;
        let tomorrow = now.date().succ_opt()?;
        let at = NaiveDateTime::new(tomorrow, first.time_of_day);
        Some(NextDose {
            slot: first.clone(),
            pending_supplements: first.supplements.iter().map(|s| s.name.clone()).collect(),
            eta: Eta::from_duration(at - now),
            tomorrow: true,
        })
    }
}

/// The slot time on the same calendar day as `now`.
fn slot_at(now: NaiveDateTime, time: NaiveTime) -> NaiveDateTime {
    NaiveDateTime::new(now.date(), time)
}
