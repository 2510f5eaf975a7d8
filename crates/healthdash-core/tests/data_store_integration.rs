//! Integration tests for loading a data directory and evaluating it.

use std::path::Path;

use healthdash_core::clock::{Clock, FixedClock};
use healthdash_core::{evaluate, AlertCategory, Config, DataStore, DoseState};
use indoc::{formatdoc, indoc};

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn seed(dir: &Path) {
    write(
        dir,
        "doses.json",
        indoc! {r#"
            [
              {"supplement_name": "Allimax", "dosage": "450mg", "logged_at": "2024-04-02T07:02:00", "date": "2024-04-02"},
              {"supplement_name": "Neem", "dosage": "300mg", "logged_at": "2024-04-02T07:03:00", "date": "2024-04-02"},
              {"supplement_name": "Neem", "logged_at": "not a time", "date": "2024-04-02"}
            ]
        "#},
    );
    write(
        dir,
        "vitals.json",
        indoc! {r#"
            [
              {"date": "2024-04-02", "hrv": "47"},
              {"date": "2024-04-01", "hrv": 49, "rhr": 64}
            ]
        "#},
    );
    write(
        dir,
        "sleep_segments.json",
        indoc! {r#"
            [
              {"date": "2024-04-02", "start": "2024-04-01 23:30:00", "end": "2024-04-02 05:30:00", "stage": "AsleepCore"},
              {"date": "2024-04-02", "start": "2024-04-02 05:30:00", "end": "2024-04-02 05:50:00", "stage": "AsleepDeep"}
            ]
        "#},
    );
    write(
        dir,
        "protocol.json",
        indoc! {r#"
            {
              "phase": {"name": "Kill Phase", "start_date": "2024-03-10", "end_date": "2024-04-07"},
              "schedule": {"slots": [
                {"key": "morning", "label": "Morning", "time_of_day": "07:00",
                 "supplements": [{"name": "Allimax", "dosage": "450mg"}, {"name": "Neem", "dosage": "300mg"}]},
                {"key": "evening", "label": "Evening", "time_of_day": "19:00",
                 "supplements": [{"name": "Allimax", "dosage": "450mg"}]}
              ]}
            }
        "#},
    );
    write(dir, "meals.json", "this file is corrupt");
}

#[test]
fn test_directory_to_report() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let store = DataStore::new(dir.path());
    let input = store.load_input();
    assert_eq!(input.doses.len(), 2);
    assert!(input.meals.is_empty());
    assert_eq!(input.sleep.len(), 1);
    assert_eq!(input.sleep[0].total_hours, Some(380.0 / 60.0));

    let now = FixedClock::parse("2024-04-02T09:00").unwrap().now();
    let report = evaluate(&input, now, &Config::default().settings());

    assert_eq!((report.daily.taken, report.daily.total), (2, 3));
    assert_eq!(report.daily.percentage, 67);
    assert_eq!(report.slots[0].badge, Some(DoseState::Taken));
    assert_eq!(report.slots[1].badge, Some(DoseState::Pending));
    assert_eq!(report.next_dose.map(|n| n.slot.key), Some("evening".into()));

    // Two low HRV days plus five days left in the phase.
    let categories: Vec<AlertCategory> = report.alerts.iter().map(|a| a.category).collect();
    assert_eq!(categories, vec![AlertCategory::Hrv, AlertCategory::Protocol]);
    assert_eq!(report.phase.map(|p| p.days_remaining), Some(5));
}

#[test]
fn test_config_points_at_data_directory() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let config_path = dir.path().join("config.toml");
    write(
        dir.path(),
        "config.toml",
        &formatdoc! {r#"
            [data]
            dir = "{}"

            [adherence]
            streak_threshold_pct = 60
        "#, dir.path().display()},
    );

    let config = Config::load_from(&config_path).unwrap();
    assert_eq!(config.records_dir().unwrap(), dir.path());

    let store = DataStore::new(config.records_dir().unwrap());
    let now = FixedClock::parse("2024-04-02T20:00").unwrap().now();
    let report = evaluate(&store.load_input(), now, &config.settings());
    // 2 of 3 doses clears a 60% threshold.
    assert_eq!(report.streak, 1);
}
