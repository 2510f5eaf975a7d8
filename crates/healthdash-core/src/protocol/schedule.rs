use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A supplement and its dosage within a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementDose {
    pub name: String,
    pub dosage: String,
}

impl SupplementDose {
    pub fn new(name: impl Into<String>, dosage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
        }
    }
}

/// A named time-of-day dosing checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub key: String,
    pub label: String,
    #[serde(with = "hhmm")]
    pub time_of_day: NaiveTime,
    pub supplements: Vec<SupplementDose>,
}

/// Ordered list of slots covering one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSchedule {
    pub slots: Vec<ScheduleSlot>,
}

impl ProtocolSchedule {
    /// Build a schedule, rejecting slots that are not strictly ascending.
    pub fn new(slots: Vec<ScheduleSlot>) -> Result<Self, ValidationError> {
        let schedule = Self { slots };
        schedule.validate()?;
        Ok(schedule)
    }

    /// The kill-phase protocol: five slots, eight doses a day.
    pub fn default_kill_phase() -> Self {
        let slot = |key: &str, label: &str, h: u32, doses: Vec<SupplementDose>| ScheduleSlot {
            key: key.to_string(),
            label: label.to_string(),
            time_of_day: NaiveTime::from_hms_opt(h, 0, 0).unwrap_or_default(),
            supplements: doses,
        };

        Self {
            slots: vec![
                slot(
                    "morning_empty_stomach",
                    "Morning (Empty Stomach)",
                    7,
                    vec![
                        SupplementDose::new("Allimax", "450mg"),
                        SupplementDose::new("Neem", "300mg"),
                    ],
                ),
                slot(
                    "breakfast",
                    "Breakfast",
                    8,
                    vec![SupplementDose::new("Probiotic (S. boulardii)", "250mg")],
                ),
                slot(
                    "lunch",
                    "Lunch",
                    12,
                    vec![
                        SupplementDose::new("Allimax", "450mg"),
                        SupplementDose::new("Neem", "300mg"),
                    ],
                ),
                slot(
                    "dinner",
                    "Dinner",
                    18,
                    vec![
                        SupplementDose::new("Allimax", "450mg"),
                        SupplementDose::new("Neem", "300mg"),
                    ],
                ),
                slot(
                    "bedtime",
                    "Bedtime",
                    22,
                    vec![SupplementDose::new("Prokinetic", "1 capsule")],
                ),
            ],
        }
    }

    /// Check that slot times are unique and ascending.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for pair in self.slots.windows(2) {
            if pair[1].time_of_day <= pair[0].time_of_day {
                return Err(ValidationError::UnorderedSlot {
                    key: pair[1].key.clone(),
                    time: pair[1].time_of_day.format("%H:%M").to_string(),
                });
            }
        }
        Ok(())
    }

    /// Total scheduled doses per day; the denominator of daily adherence.
    pub fn doses_per_day(&self) -> u32 {
        self.slots.iter().map(|s| s.supplements.len() as u32).sum()
    }

    /// The earliest slot of the day.
    pub fn first_slot(&self) -> Option<&ScheduleSlot> {
        self.slots.iter().min_by_key(|s| s.time_of_day)
    }

    pub fn slot(&self, key: &str) -> Option<&ScheduleSlot> {
        self.slots.iter().find(|s| s.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for ProtocolSchedule {
    fn default() -> Self {
        Self::default_kill_phase()
    }
}

/// Parse an `HH:MM` time of day.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeOfDay(raw.to_string()))
}

/// Serde adapter for `HH:MM` strings.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_has_eight_doses() {
        let schedule = ProtocolSchedule::default_kill_phase();
        assert_eq!(schedule.slots.len(), 5);
        assert_eq!(schedule.doses_per_day(), 8);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_times() {
        let mut schedule = ProtocolSchedule::default_kill_phase();
        schedule.slots[1].time_of_day = schedule.slots[0].time_of_day;
        let err = schedule.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnorderedSlot {
                key: "breakfast".into(),
                time: "07:00".into()
            }
        );
    }

    #[test]
    fn new_rejects_descending_slots() {
        let mut slots = ProtocolSchedule::default_kill_phase().slots;
        slots.swap(2, 3);
        assert!(ProtocolSchedule::new(slots).is_err());
    }

    #[test]
    fn slot_serializes_time_as_hhmm() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let json = serde_json::to_value(&schedule.slots[2]).unwrap();
        assert_eq!(json["time_of_day"], "12:00");

        let back: ScheduleSlot = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule.slots[2]);
    }

    #[test]
    fn bad_time_of_day_is_rejected() {
        assert!(parse_time_of_day("7am").is_err());
        assert!(parse_time_of_day("25:00").is_err());
        assert_eq!(
            parse_time_of_day("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
    }
}
