//! Decides whether a scheduled dose was taken.
//!
//! A dose counts as taken when a logged [`DoseRecord`] for the same day has a
//! matching supplement name and was logged within the proximity window of
//! the slot time. Unmatched doses are Missed once the grace period has
//! elapsed and Pending before that.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::status::{DoseState, SupplementStatus};
use crate::protocol::ScheduleSlot;
use crate::records::DoseRecord;
use crate::timing::SlotTiming;

/// How many slot checks one logged dose may satisfy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every slot check looks at every record independently. A single dose
    /// logged between two slots can satisfy both.
    #[default]
    Lenient,
    /// Checks run in schedule order and each record proves at most one dose.
    ClaimOnce,
}

/// Canonical supplement names and the spellings users log them under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Case-insensitive substring matcher for supplement names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let entry = |canonical: &str, aliases: &[&str]| AliasEntry {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };
        Self {
            entries: vec![
                entry("allimax", &["allicin", "garlic"]),
                entry("neem", &[]),
                entry("probiotic", &["boulardii", "megaspore", "sporebiotic"]),
                entry("prokinetic", &["motilpro", "iberogast", "ginger"]),
                entry("berberine", &[]),
                entry("nac", &["n-acetyl"]),
                entry("bismuth", &[]),
                entry("edta", &[]),
            ],
        }
    }
}

impl AliasTable {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }

    /// Lowercase keywords that identify the scheduled supplement in a log.
    fn keywords(&self, scheduled: &str) -> Vec<String> {
        let scheduled = scheduled.to_lowercase();
        let mut keywords = Vec::new();
        for entry in &self.entries {
            let canonical = entry.canonical.to_lowercase();
            let known = std::iter::once(&canonical)
                .chain(entry.aliases.iter())
                .map(|a| a.to_lowercase())
                .any(|a| !a.is_empty() && scheduled.contains(&a));
            if known {
                keywords.push(canonical);
                keywords.extend(entry.aliases.iter().map(|a| a.to_lowercase()));
            }
        }
        if keywords.is_empty() {
            keywords.push(scheduled);
        }
        keywords.retain(|k| !k.is_empty());
        keywords
    }

    /// Whether a logged supplement name refers to the scheduled one.
    pub fn matches(&self, scheduled: &str, logged: &str) -> bool {
        let logged = logged.to_lowercase();
        self.keywords(scheduled)
            .iter()
            .any(|keyword| logged.contains(keyword.as_str()))
    }
}

/// Matches logged doses against scheduled slots.
#[derive(Debug, Clone, Copy)]
pub struct DoseMatcher<'a> {
    timing: SlotTiming<'a>,
    aliases: &'a AliasTable,
    policy: MatchPolicy,
}

impl<'a> DoseMatcher<'a> {
    pub fn new(timing: SlotTiming<'a>, aliases: &'a AliasTable, policy: MatchPolicy) -> Self {
        Self {
            timing,
            aliases,
            policy,
        }
    }

    pub fn timing(&self) -> SlotTiming<'a> {
        self.timing
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Whether `dose` proves the scheduled supplement for `slot` on `day`.
    fn proves(
        &self,
        slot: &ScheduleSlot,
        supplement: &str,
        dose: &DoseRecord,
        day: NaiveDate,
    ) -> bool {
        if dose.day() != Some(day) || !self.aliases.matches(supplement, &dose.supplement_name) {
            return false;
        }
        let scheduled = NaiveDateTime::new(day, slot.time_of_day);
        let distance = (dose.logged_at - scheduled).abs();
        distance <= self.timing.rules().proximity()
    }

    /// State of one supplement in one slot for `now`'s calendar day.
    ///
    /// This is the single-check form: it ignores whether the proving record
    /// also satisfies another slot.
    pub fn match_status(
        &self,
        slot: &ScheduleSlot,
        supplement: &str,
        todays_doses: &[DoseRecord],
        now: NaiveDateTime,
    ) -> DoseState {
        let today = now.date();
        if todays_doses
            .iter()
            .any(|dose| self.proves(slot, supplement, dose, today))
        {
            DoseState::Taken
        } else if self.timing.has_passed(slot, now) {
            DoseState::Missed
        } else {
            DoseState::Pending
        }
    }

    /// Taken flags for every slot/supplement pair of `day`, in schedule
    /// order, honoring the configured [`MatchPolicy`].
    fn taken_flags(&self, day: NaiveDate, doses: &[DoseRecord]) -> Vec<bool> {
        let day_doses: Vec<&DoseRecord> = doses.iter().filter(|d| d.day() == Some(day)).collect();
        let mut claimed = vec![false; day_doses.len()];
        let mut flags = Vec::new();

        for slot in &self.timing.schedule().slots {
            for supplement in &slot.supplements {
                let taken = match self.policy {
                    MatchPolicy::Lenient => day_doses
                        .iter()
                        .any(|dose| self.proves(slot, &supplement.name, dose, day)),
                    MatchPolicy::ClaimOnce => {
                        let scheduled = NaiveDateTime::new(day, slot.time_of_day);
                        let closest = day_doses
                            .iter()
                            .enumerate()
                            .filter(|(i, dose)| {
                                !claimed[*i] && self.proves(slot, &supplement.name, dose, day)
                            })
                            .min_by_key(|(_, dose)| (dose.logged_at - scheduled).abs());
                        match closest {
                            Some((i, _)) => {
                                claimed[i] = true;
                                true
                            }
                            None => false,
                        }
                    }
                };
                flags.push(taken);
            }
        }
        flags
    }

    /// Number of scheduled doses taken on `day`.
    pub fn taken_count(&self, day: NaiveDate, doses: &[DoseRecord]) -> u32 {
        self.taken_flags(day, doses)
            .into_iter()
            .filter(|taken| *taken)
            .count() as u32
    }

    /// Statuses for every scheduled dose on `day` as seen at `now`.
    pub fn day_statuses(
        &self,
        day: NaiveDate,
        doses: &[DoseRecord],
        now: NaiveDateTime,
    ) -> Vec<SupplementStatus> {
        let flags = self.taken_flags(day, doses);
        let pairs = self
            .timing
            .schedule()
            .slots
            .iter()
            .flat_map(|slot| slot.supplements.iter().map(move |s| (slot, s)));

        pairs
            .zip(flags)
            .map(|((slot, supplement), taken)| {
                let state = if taken {
                    DoseState::Taken
                } else if self.timing.has_passed_on(slot, day, now) {
                    DoseState::Missed
                } else {
                    DoseState::Pending
                };
                SupplementStatus {
                    slot: slot.key.clone(),
                    supplement_name: supplement.name.clone(),
                    state,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolSchedule;
    use crate::timing::TimingRules;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn dose(name: &str, h: u32, m: u32) -> DoseRecord {
        DoseRecord {
            supplement_name: name.to_string(),
            dosage: String::new(),
            logged_at: at(h, m),
            date: "2024-03-10".to_string(),
        }
    }

    #[test]
    fn aliases_match_case_insensitively() {
        let table = AliasTable::default();
        assert!(table.matches("Allimax", "allicin 450mg"));
        assert!(table.matches("Allimax", "ALLIMAX"));
        assert!(table.matches("Probiotic (S. boulardii)", "S. Boulardii"));
        assert!(table.matches("Probiotic (S. boulardii)", "probiotic"));
        assert!(!table.matches("Neem", "Allimax"));
    }

    #[test]
    fn unknown_names_fall_back_to_substring() {
        let table = AliasTable::default();
        assert!(table.matches("Vitamin D", "vitamin d3 5000iu"));
        assert!(!table.matches("Vitamin D", "magnesium"));
    }

    #[test]
    fn taken_requires_name_and_proximity() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );
        let lunch = schedule.slot("lunch").unwrap();

        let doses = vec![dose("allicin", 14, 30)];
        assert_eq!(matcher.match_status(lunch, "Allimax", &doses, at(15, 0)), DoseState::Taken);
        assert_eq!(matcher.match_status(lunch, "Neem", &doses, at(15, 0)), DoseState::Missed);

        // 3h01m away is outside the proximity window.
        let late = vec![dose("allicin", 15, 1)];
        assert_eq!(matcher.match_status(lunch, "Allimax", &late, at(13, 0)), DoseState::Pending);
    }

    #[test]
    fn doses_from_other_days_do_not_count() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );
        let lunch = schedule.slot("lunch").unwrap();

        let mut yesterday = dose("Allimax", 12, 0);
        yesterday.date = "2024-03-09".into();
        yesterday.logged_at = yesterday.logged_at - chrono::Duration::days(1);
        assert_eq!(
            matcher.match_status(lunch, "Allimax", &[yesterday], at(12, 30)),
            DoseState::Pending
        );
    }

    #[test]
    fn lenient_policy_lets_one_dose_cover_two_slots() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );
        // 09:30 is within three hours of both the 07:00 and the 12:00 slot.
        let doses = vec![dose("Allimax", 9, 30)];
        assert_eq!(matcher.taken_count(day(), &doses), 2);
    }

    #[test]
    fn claim_once_policy_uses_each_dose_once() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::ClaimOnce,
        );
        let doses = vec![dose("Allimax", 9, 30)];
        assert_eq!(matcher.taken_count(day(), &doses), 1);

        let doses = vec![dose("Allimax", 7, 5), dose("Allimax", 12, 10)];
        assert_eq!(matcher.taken_count(day(), &doses), 2);
    }

    #[test]
    fn day_statuses_cover_every_scheduled_dose() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );
        let doses = vec![dose("Allimax", 7, 0), dose("Neem", 7, 2), dose("boulardii", 8, 15)];

        let statuses = matcher.day_statuses(day(), &doses, at(12, 30));
        assert_eq!(statuses.len(), 8);
        let states: Vec<DoseState> = statuses.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![
                DoseState::Taken,
                DoseState::Taken,
                DoseState::Taken,
                DoseState::Pending,
                DoseState::Pending,
                DoseState::Pending,
                DoseState::Pending,
                DoseState::Pending,
            ]
        );
    }
}
