//! End-to-end flow: migrate, check in, report, reopen.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::fs;

use health_tracker::store::{RECORDS_V1_KEY, RECORDS_V2_KEY};
use health_tracker::types::{FamilyCondition, SupplementDose, Trend};
use health_tracker::{
    AnalysisWindows, DailyRecord, FamilyHistory, FileBackend, HealthRank, HealthTracker,
    MetricKey, StorageBackend, TrackerError,
};

fn good_day(date: &str) -> DailyRecord {
    DailyRecord {
        sleep_hours: Some(8.0),
        exercise_minutes: Some(45.0),
        nutrition_score: Some(9.0),
        smoking_count: Some(0.0),
        steps: Some(11000.0),
        heart_rate: Some(62.0),
        stress_level: Some(2.0),
        mood_score: Some(8.0),
        supplements: vec![SupplementDose {
            name: "NAC".to_string(),
            dose_mg: 1500.0,
            taken: true,
        }],
        ..DailyRecord::new(date)
    }
}

#[test]
fn test_file_backed_tracker_flow() {
    let temp = tempfile::tempdir().expect("tempdir");
    let data_dir = temp.path().join("data");

    // Seed first-release data on disk
    let mut backend = FileBackend::new(&data_dir);
    backend
        .write(
            RECORDS_V1_KEY,
            r#"[
                {"date": "2026-02-18", "sleepHours": 6, "exerciseMinutes": 10,
                 "nutritionScore": 5, "smokingCount": 3},
                {"date": "2026-02-19", "sleepHours": 6.5, "exerciseMinutes": 15,
                 "nutritionScore": 6, "smokingCount": 2}
            ]"#,
        )
        .expect("seed v1");

    let mut tracker = HealthTracker::new(backend, AnalysisWindows::default());
    assert_eq!(tracker.records().len(), 2);
    assert_eq!(tracker.records()[0].date, "2026-02-19");
    assert!(data_dir.join(format!("{RECORDS_V2_KEY}.json")).exists());

    tracker.check_in(good_day("2026-02-20")).expect("check in 20th");
    tracker.check_in(good_day("2026-02-21")).expect("check in 21st");

    let history = FamilyHistory {
        conditions: vec![FamilyCondition {
            condition: "Heart disease".to_string(),
            relation: "Grandfather".to_string(),
            age_of_onset: Some(60.0),
        }],
        blood_type: "A-".to_string(),
        updated_at: None,
    };
    let now = Utc.with_ymd_and_hms(2026, 2, 21, 7, 0, 0).unwrap();
    tracker.save_family_history(&history, now).expect("save family");

    let reference = Utc.with_ymd_and_hms(2026, 2, 21, 20, 0, 0).unwrap();
    let report = tracker.report(&reference);

    assert_eq!(report.date_key, "2026-02-21");
    assert_eq!(report.streak, 4);
    assert_eq!(report.score.confidence, 67);
    assert_eq!(report.rank, HealthRank::Excellent);
    assert!(report.risk_flags.is_empty());
    assert_eq!(report.analytics.trends[&MetricKey::ExerciseMinutes], Trend::Flat);
    assert_eq!(report.adherence.len(), 1);
    assert_eq!(report.adherence[0].taken, 2);
    assert_eq!(report.adherence[0].total, 4);
    assert_eq!(report.adherence[0].rate, 50);

    // Everything survives a reopen
    let reopened = HealthTracker::new(FileBackend::new(&data_dir), AnalysisWindows::default());
    assert_eq!(reopened.records(), tracker.records());
    assert_eq!(reopened.family_history().updated_at, Some(now));
    assert_eq!(reopened.report(&reference), report);
}

#[test]
fn test_rejected_check_in_leaves_history_untouched() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut tracker = HealthTracker::new(FileBackend::new(temp.path()), AnalysisWindows::default());
    tracker.check_in(good_day("2026-02-21")).expect("check in");

    let invalid = good_day("2026-02-21").with_metric(MetricKey::HeartRate, 400.0);
    assert!(matches!(
        tracker.check_in(invalid),
        Err(TrackerError::InvalidRecord(_))
    ));

    let reopened = HealthTracker::new(FileBackend::new(temp.path()), AnalysisWindows::default());
    assert_eq!(reopened.records()[0].heart_rate, Some(62.0));
}

#[test]
fn test_corrupt_store_opens_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    let backend = FileBackend::new(temp.path());
    fs::write(backend.path_for(RECORDS_V2_KEY), "{\"date\":").expect("write corrupt file");

    let mut tracker = HealthTracker::new(backend, AnalysisWindows::default());
    assert!(tracker.records().is_empty());

    // The next check-in replaces the corrupt file
    tracker.check_in(good_day("2026-02-21")).expect("check in");
    let reopened = HealthTracker::new(FileBackend::new(temp.path()), AnalysisWindows::default());
    assert_eq!(reopened.records().len(), 1);
}
