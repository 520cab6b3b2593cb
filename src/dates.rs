//! Date keys and record ordering
//!
//! Records are identified by a `YYYY-MM-DD` key in the user's local calendar.
//! This module converts instants to keys, orders histories newest first, and
//! walks calendar days backwards for streaks and the seven-day series.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use std::collections::HashMap;

use crate::types::{DailyRecord, DaySnapshot};

/// Format of a record date key
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format an instant as a `YYYY-MM-DD` key in its own timezone.
pub fn to_date_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    date_key(instant.date_naive())
}

/// Format a calendar date as a record key
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a record key back into a calendar date
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Sort records newest first. The sort is stable; duplicates are kept.
pub fn normalize_records(records: &[DailyRecord]) -> Vec<DailyRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Count consecutive logged days ending on the reference date.
///
/// Returns 0 when the reference date itself has no record.
pub fn calculate_streak<Tz: TimeZone>(records: &[DailyRecord], reference: &DateTime<Tz>) -> usize {
    streak_from(records, reference.date_naive())
}

fn streak_from(records: &[DailyRecord], today: NaiveDate) -> usize {
    if records.is_empty() {
        return 0;
    }

    let by_date = index_by_date(records);
    let mut streak = 0;
    let mut cursor = Some(today);

    while let Some(day) = cursor {
        if !by_date.contains_key(date_key(day).as_str()) {
            break;
        }
        streak += 1;
        cursor = day.checked_sub_days(Days::new(1));
    }

    streak
}

/// Seven daily snapshots, oldest first, ending on the reference date.
pub fn weekly_series<Tz: TimeZone>(
    records: &[DailyRecord],
    reference: &DateTime<Tz>,
) -> Vec<DaySnapshot> {
    let today = reference.date_naive();
    let by_date = index_by_date(records);

    (0..7u64)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|day| {
            let key = date_key(day);
            let label = day.format("%m-%d").to_string();
            match by_date.get(key.as_str()) {
                Some(record) => DaySnapshot {
                    date: label,
                    sleep: record.sleep_hours,
                    exercise: record.exercise_minutes,
                    smoking: record.smoking_count,
                    steps: record.steps,
                    heart_rate: record.heart_rate,
                    stress: record.stress_level,
                    mood: record.mood_score,
                    outdoor: record.outdoor_minutes,
                    screen: record.screen_time_hours,
                },
                None => DaySnapshot {
                    date: label,
                    ..Default::default()
                },
            }
        })
        .collect()
}

fn index_by_date(records: &[DailyRecord]) -> HashMap<&str, &DailyRecord> {
    records.iter().map(|r| (r.date.as_str(), r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn dated(dates: &[&str]) -> Vec<DailyRecord> {
        dates.iter().map(|d| DailyRecord::new(*d)).collect()
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_date_key_uses_local_calendar() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        // 02:00 UTC on the 21st is still the 20th at UTC-5
        let instant = Utc.with_ymd_and_hms(2026, 2, 21, 2, 0, 0).unwrap().with_timezone(&tz);
        assert_eq!(to_date_key(&instant), "2026-02-20");
        assert_eq!(to_date_key(&noon(2026, 2, 1)), "2026-02-01");
    }

    #[test]
    fn test_normalize_sorts_newest_first() {
        let records = dated(&["2026-02-19", "2026-02-21", "2026-01-30", "2026-02-20"]);
        let sorted = normalize_records(&records);
        let keys: Vec<&str> = sorted.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(keys, vec!["2026-02-21", "2026-02-20", "2026-02-19", "2026-01-30"]);
    }

    #[test]
    fn test_normalize_keeps_duplicates_stable() {
        let mut first = DailyRecord::new("2026-02-20");
        first.notes = "first".to_string();
        let mut second = DailyRecord::new("2026-02-20");
        second.notes = "second".to_string();

        let sorted = normalize_records(&[first, DailyRecord::new("2026-02-21"), second]);
        assert_eq!(sorted.len(), 3);
        assert_eq!(sorted[1].notes, "first");
        assert_eq!(sorted[2].notes, "second");
    }

    #[test]
    fn test_streak_stops_at_gap() {
        let records = dated(&["2026-02-21", "2026-02-20", "2026-02-19", "2026-02-17"]);
        assert_eq!(calculate_streak(&records, &noon(2026, 2, 21)), 3);
    }

    #[test]
    fn test_streak_requires_today() {
        let records = dated(&["2026-02-19", "2026-02-18"]);
        assert_eq!(calculate_streak(&records, &noon(2026, 2, 21)), 0);
        assert_eq!(calculate_streak(&[], &noon(2026, 2, 21)), 0);
    }

    #[test]
    fn test_streak_crosses_year_boundary() {
        let records = dated(&["2026-01-02", "2026-01-01", "2025-12-31", "2025-12-30"]);
        assert_eq!(calculate_streak(&records, &noon(2026, 1, 2)), 4);
    }

    #[test]
    fn test_streak_crosses_leap_day() {
        let records = dated(&["2028-03-01", "2028-02-29", "2028-02-28"]);
        assert_eq!(calculate_streak(&records, &noon(2028, 3, 1)), 3);
    }

    #[test]
    fn test_weekly_series() {
        let mut today = DailyRecord::new("2026-02-21");
        today.sleep_hours = Some(7.5);
        today.steps = Some(8000.0);
        let mut earlier = DailyRecord::new("2026-02-16");
        earlier.mood_score = Some(6.0);

        let series = weekly_series(&[today, earlier], &noon(2026, 2, 21));
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, "02-15");
        assert_eq!(series[6].date, "02-21");
        assert_eq!(series[6].sleep, Some(7.5));
        assert_eq!(series[6].steps, Some(8000.0));
        assert_eq!(series[1].mood, Some(6.0));
        assert_eq!(series[3].sleep, None);
    }

    #[test]
    fn test_parse_date_key() {
        assert_eq!(parse_date_key("2026-02-21"), NaiveDate::from_ymd_opt(2026, 2, 21));
        assert!(parse_date_key("2026-02-30").is_none());
        assert!(parse_date_key("21/02/2026").is_none());
    }
}
