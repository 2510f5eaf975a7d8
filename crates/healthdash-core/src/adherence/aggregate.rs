//! Daily, weekly and streak adherence figures.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::matcher::DoseMatcher;
use crate::records::DoseRecord;

/// Default minimum daily percentage for a day to extend the streak.
pub const DEFAULT_STREAK_THRESHOLD_PCT: u8 = 80;

/// How far back a streak walk looks before giving up.
const MAX_STREAK_DAYS: i64 = 3650;

/// Adherence for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAdherence {
    pub date: NaiveDate,
    pub taken: u32,
    pub total: u32,
    pub percentage: u8,
}

/// Adherence over the seven days ending at `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAdherence {
    pub end_date: NaiveDate,
    pub taken: u32,
    pub total: u32,
    /// Σtaken / Σtotal, rounded.
    pub percentage: u8,
    /// Oldest day first.
    pub per_day: Vec<DailyAdherence>,
}

fn percentage(taken: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(taken) / f64::from(total) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Taken and total scheduled doses for `date`.
pub fn daily_adherence(
    matcher: &DoseMatcher<'_>,
    date: NaiveDate,
    doses: &[DoseRecord],
) -> DailyAdherence {
    let total = matcher.timing().schedule().doses_per_day();
    let taken = matcher.taken_count(date, doses).min(total);
    DailyAdherence {
        date,
        taken,
        total,
        percentage: percentage(taken, total),
    }
}

/// Pooled adherence for the seven days ending at `end_date` inclusive.
pub fn weekly_adherence(
    matcher: &DoseMatcher<'_>,
    end_date: NaiveDate,
    doses: &[DoseRecord],
) -> WeeklyAdherence {
    let per_day: Vec<DailyAdherence> = (0..7)
        .rev()
        .map(|offset| daily_adherence(matcher, end_date - Duration::days(offset), doses))
        .collect();

    let taken = per_day.iter().map(|d| d.taken).sum();
    let total = per_day.iter().map(|d| d.total).sum();
    WeeklyAdherence {
        end_date,
        taken,
        total,
        percentage: percentage(taken, total),
        per_day,
    }
}

/// Consecutive qualifying days walking backward from `today`.
///
/// A day qualifies when its adherence is at least `threshold_pct`. The walk
/// stops at the first day that falls short or has no logged doses. Today is
/// still in progress, so it only counts when it already qualifies and never
/// breaks the streak.
pub fn streak(
    matcher: &DoseMatcher<'_>,
    doses: &[DoseRecord],
    today: NaiveDate,
    threshold_pct: u8,
) -> u32 {
    let qualifies = |day: NaiveDate| {
        let logged = doses.iter().any(|d| d.day() == Some(day));
        logged && daily_adherence(matcher, day, doses).percentage >= threshold_pct
    };

    let mut count = u32::from(qualifies(today));
    for offset in 1..=MAX_STREAK_DAYS {
        if !qualifies(today - Duration::days(offset)) {
            break;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adherence::{AliasTable, MatchPolicy};
    use crate::protocol::ProtocolSchedule;
    use crate::timing::{SlotTiming, TimingRules};
    use chrono::NaiveDateTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    /// `count` doses of the kill-phase schedule taken on `day`, in slot order.
    fn doses_for(schedule: &ProtocolSchedule, day: NaiveDate, count: usize) -> Vec<DoseRecord> {
        schedule
            .slots
            .iter()
            .flat_map(|slot| {
                slot.supplements.iter().map(move |s| DoseRecord {
                    supplement_name: s.name.clone(),
                    dosage: s.dosage.clone(),
                    logged_at: NaiveDateTime::new(day, slot.time_of_day),
                    date: day.format("%Y-%m-%d").to_string(),
                })
            })
            .take(count)
            .collect()
    }

    #[test]
    fn daily_counts_and_rounds() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );

        let doses = doses_for(&schedule, date(5), 5);
        let daily = daily_adherence(&matcher, date(5), &doses);
        assert_eq!((daily.taken, daily.total), (5, 8));
        assert_eq!(daily.percentage, 63);

        let empty = daily_adherence(&matcher, date(6), &doses);
        assert_eq!(empty.taken, 0);
        assert_eq!(empty.percentage, 0);
    }

    #[test]
    fn empty_schedule_is_zero_percent() {
        let schedule = ProtocolSchedule { slots: vec![] };
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );
        let daily = daily_adherence(&matcher, date(5), &[]);
        assert_eq!((daily.taken, daily.total, daily.percentage), (0, 0, 0));
    }

    #[test]
    fn weekly_pools_counts() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );

        // One perfect day and six empty ones: 8 / 56.
        let doses = doses_for(&schedule, date(4), 8);
        let weekly = weekly_adherence(&matcher, date(10), &doses);
        assert_eq!(weekly.per_day.len(), 7);
        assert_eq!(weekly.per_day[0].date, date(4));
        assert_eq!(weekly.per_day[0].percentage, 100);
        assert_eq!((weekly.taken, weekly.total), (8, 56));
        assert_eq!(weekly.percentage, 14);
    }

    #[test]
    fn streak_counts_back_from_today() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );

        let mut doses = Vec::new();
        for d in 1..=5 {
            doses.extend(doses_for(&schedule, date(d), 8));
        }
        // Day 6 dips to 50%.
        doses.extend(doses_for(&schedule, date(6), 4));

        assert_eq!(streak(&matcher, &doses, date(5), 80), 5);
        assert_eq!(streak(&matcher, &doses, date(6), 80), 5);
        assert_eq!(streak(&matcher, &doses, date(8), 80), 0);
    }

    #[test]
    fn streak_stops_at_days_without_data() {
        let schedule = ProtocolSchedule::default_kill_phase();
        let aliases = AliasTable::default();
        let matcher = DoseMatcher::new(
            SlotTiming::new(&schedule, TimingRules::default()),
            &aliases,
            MatchPolicy::Lenient,
        );

        let mut doses = doses_for(&schedule, date(1), 8);
        doses.extend(doses_for(&schedule, date(3), 8));
        assert_eq!(streak(&matcher, &doses, date(3), DEFAULT_STREAK_THRESHOLD_PCT), 1);
        assert_eq!(streak(&matcher, &[], date(3), DEFAULT_STREAK_THRESHOLD_PCT), 0);
    }
}
