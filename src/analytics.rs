//! Windowed analytics
//!
//! All functions here take a history sorted newest first (see
//! [`crate::dates::normalize_records`]) and slice it into fixed windows of
//! records, not calendar days: the "last 7" are the seven newest entries.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::catalog::{COMPARISON_METRICS, TREND_METRICS};
use crate::risk::metric_anomalies;
use crate::scoring::round_half_up;
use crate::types::{
    Analytics, DailyRecord, FamilyHistory, MetricAverages, MetricKey, PeriodDelta,
    SupplementAdherence, Trend,
};

/// Default window for weekly averages and period comparison
pub const DEFAULT_TREND_WINDOW: usize = 7;

/// Default window for supplement adherence
pub const DEFAULT_ADHERENCE_WINDOW: usize = 14;

/// Records `[start, start + len)`, clipped to the history
fn window(records: &[DailyRecord], start: usize, len: usize) -> &[DailyRecord] {
    let start = start.min(records.len());
    let end = start.saturating_add(len).min(records.len());
    &records[start..end]
}

/// Mean of a metric over a group; `None` when no record carries a finite value
pub fn window_average(group: &[DailyRecord], key: MetricKey) -> Option<f64> {
    let values: Vec<f64> = group
        .iter()
        .filter_map(|r| r.metric(key))
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

fn window_averages(group: &[DailyRecord], keys: &[MetricKey]) -> MetricAverages {
    keys.iter()
        .map(|key| (*key, window_average(group, *key)))
        .collect()
}

/// Up when current beats previous, down when it trails, flat otherwise
/// (including when either side is unknown).
pub fn trend_direction(current: Option<f64>, previous: Option<f64>) -> Trend {
    match (current, previous) {
        (Some(c), Some(p)) if c > p => Trend::Up,
        (Some(c), Some(p)) if c < p => Trend::Down,
        _ => Trend::Flat,
    }
}

/// Weekly averages, week-over-week trends and baseline anomalies.
pub fn compute_analytics(
    records: &[DailyRecord],
    family_history: Option<&FamilyHistory>,
) -> Analytics {
    compute_analytics_over(records, family_history, DEFAULT_TREND_WINDOW)
}

/// [`compute_analytics`] with a custom window length.
pub fn compute_analytics_over(
    records: &[DailyRecord],
    family_history: Option<&FamilyHistory>,
    window_days: usize,
) -> Analytics {
    let last = window(records, 0, window_days);
    let prev = window(records, window_days, window_days);

    let last7_avg = window_averages(last, &TREND_METRICS);
    let prev7_avg = window_averages(prev, &TREND_METRICS);

    let trends = TREND_METRICS
        .iter()
        .map(|key| (*key, trend_direction(last7_avg.get(*key), prev7_avg.get(*key))))
        .collect();

    let anomalies = metric_anomalies(&last7_avg, records.first(), family_history);

    debug!(
        records = records.len(),
        anomalies = anomalies.len(),
        "computed analytics"
    );

    Analytics {
        last7_avg,
        prev7_avg,
        trends,
        anomalies,
    }
}

fn round_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Compare the newest `window_days` records with the `window_days` before them.
///
/// Returns `None` when either window is empty. A metric is included only when
/// both windows have an average for it.
pub fn compare_periods(
    records: &[DailyRecord],
    window_days: usize,
) -> Option<BTreeMap<MetricKey, PeriodDelta>> {
    let recent = window(records, 0, window_days);
    let prior = window(records, window_days, window_days);

    if recent.is_empty() || prior.is_empty() {
        return None;
    }

    let deltas = COMPARISON_METRICS
        .iter()
        .filter_map(|key| {
            let recent_avg = window_average(recent, *key)?;
            let prior_avg = window_average(prior, *key)?;
            Some((
                *key,
                PeriodDelta {
                    recent: round_tenth(recent_avg),
                    prior: round_tenth(prior_avg),
                    delta: round_tenth(recent_avg - prior_avg),
                },
            ))
        })
        .collect();

    Some(deltas)
}

/// Per-supplement adherence over the newest `window_days` records.
///
/// Supplements are listed in the order they are first seen. `total` is the
/// window length, so days that do not mention a supplement count as missed.
pub fn supplement_adherence(
    records: &[DailyRecord],
    window_days: usize,
) -> Vec<SupplementAdherence> {
    let recent = window(records, 0, window_days);
    if recent.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let names: Vec<&str> = recent
        .iter()
        .flat_map(|r| r.supplements.iter())
        .map(|s| s.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect();

    let total = recent.len();
    names
        .into_iter()
        .map(|name| {
            let taken = recent
                .iter()
                .filter(|r| r.supplements.iter().any(|s| s.name == name && s.taken))
                .count();
            SupplementAdherence {
                name: name.to_string(),
                taken,
                total,
                rate: round_half_up(taken as f64 / total as f64 * 100.0) as u32,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SupplementDose;
    use pretty_assertions::assert_eq;

    fn sleep_split(recent: f64, prior: f64) -> Vec<DailyRecord> {
        (0..14)
            .map(|i| {
                DailyRecord::new(format!("2026-02-{:02}", 28 - i))
                    .with_metric(MetricKey::SleepHours, if i < 7 { recent } else { prior })
            })
            .collect()
    }

    fn dose(name: &str, taken: bool) -> SupplementDose {
        SupplementDose {
            name: name.to_string(),
            dose_mg: 0.0,
            taken,
        }
    }

    #[test]
    fn test_compute_averages_and_trends() {
        let records: Vec<DailyRecord> = sleep_split(8.0, 6.0)
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.with_metric(MetricKey::Steps, if i < 7 { 10000.0 } else { 7000.0 })
                    .with_metric(MetricKey::HeartRate, 65.0)
                    .with_metric(MetricKey::ExerciseMinutes, 40.0)
            })
            .collect();

        let result = compute_analytics(&records, None);
        assert_eq!(result.last7_avg.get(MetricKey::SleepHours), Some(8.0));
        assert_eq!(result.prev7_avg.get(MetricKey::SleepHours), Some(6.0));
        assert_eq!(result.trends[&MetricKey::SleepHours], Trend::Up);
        assert_eq!(result.trends[&MetricKey::HeartRate], Trend::Flat);
        assert_eq!(result.trends[&MetricKey::MoodScore], Trend::Flat);
        assert_eq!(result.last7_avg.get(MetricKey::MoodScore), None);
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_analytics_on_empty_history() {
        let result = compute_analytics(&[], None);
        assert_eq!(result.last7_avg.iter().count(), TREND_METRICS.len());
        assert!(result.last7_avg.iter().all(|(_, v)| v.is_none()));
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_analytics_flags_latest_against_baseline() {
        let mut records = sleep_split(8.0, 8.0);
        records[0].sleep_hours = Some(4.0);

        let result = compute_analytics(&records, None);
        // Baseline includes the latest day: (4 + 6 * 8) / 7
        assert!((result.last7_avg.get(MetricKey::SleepHours).unwrap() - 52.0 / 7.0).abs() < 1e-9);
        assert_eq!(result.anomalies, vec!["Sleep dipped sharply vs weekly baseline"]);
        assert_eq!(result.trends[&MetricKey::SleepHours], Trend::Down);
    }

    #[test]
    fn test_trend_direction() {
        assert_eq!(trend_direction(Some(8.0), Some(6.0)), Trend::Up);
        assert_eq!(trend_direction(Some(5.0), Some(8.0)), Trend::Down);
        assert_eq!(trend_direction(Some(7.0), Some(7.0)), Trend::Flat);
        assert_eq!(trend_direction(None, Some(5.0)), Trend::Flat);
        assert_eq!(trend_direction(Some(5.0), None), Trend::Flat);
    }

    #[test]
    fn test_window_average_skips_missing() {
        let records = vec![
            DailyRecord::new("a").with_metric(MetricKey::Steps, 4000.0),
            DailyRecord::new("b"),
            DailyRecord::new("c").with_metric(MetricKey::Steps, 6000.0),
        ];
        assert_eq!(window_average(&records, MetricKey::Steps), Some(5000.0));
        assert_eq!(window_average(&records, MetricKey::Weight), None);
        assert_eq!(window_average(&[], MetricKey::Steps), None);
    }

    #[test]
    fn test_compare_periods_deltas() {
        let result = compare_periods(&sleep_split(8.0, 6.0), DEFAULT_TREND_WINDOW).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(
            result[&MetricKey::SleepHours],
            PeriodDelta {
                recent: 8.0,
                prior: 6.0,
                delta: 2.0
            }
        );
    }

    #[test]
    fn test_compare_periods_rounds_to_one_decimal() {
        let mut records = sleep_split(7.0, 6.0);
        records[0].sleep_hours = Some(7.5);
        let result = compare_periods(&records, 7).unwrap();
        // (7.5 + 6 * 7) / 7 = 7.0714...
        assert_eq!(result[&MetricKey::SleepHours].recent, 7.1);
        assert_eq!(result[&MetricKey::SleepHours].delta, 1.1);
    }

    #[test]
    fn test_compare_periods_insufficient_data() {
        assert_eq!(compare_periods(&[], 7), None);
        let single = vec![DailyRecord::new("2026-02-21").with_metric(MetricKey::SleepHours, 7.0)];
        assert_eq!(compare_periods(&single, 7), None);
        assert_eq!(compare_periods(&sleep_split(8.0, 6.0), 0), None);
    }

    #[test]
    fn test_compare_periods_short_prior_window() {
        let records = sleep_split(8.0, 6.0);
        let result = compare_periods(&records[..9], 7).unwrap();
        assert_eq!(result[&MetricKey::SleepHours].prior, 6.0);
    }

    #[test]
    fn test_supplement_adherence() {
        let mut records = vec![
            DailyRecord::new("2026-02-21"),
            DailyRecord::new("2026-02-20"),
            DailyRecord::new("2026-02-19"),
        ];
        records[0].supplements = vec![dose("NAC", true), dose("Glycine", true)];
        records[1].supplements = vec![dose("NAC", true), dose("Glycine", false)];
        records[2].supplements = vec![dose("NAC", false), dose("Glycine", true)];

        let result = supplement_adherence(&records, 3);
        assert_eq!(
            result,
            vec![
                SupplementAdherence {
                    name: "NAC".to_string(),
                    taken: 2,
                    total: 3,
                    rate: 67
                },
                SupplementAdherence {
                    name: "Glycine".to_string(),
                    taken: 2,
                    total: 3,
                    rate: 67
                },
            ]
        );
    }

    #[test]
    fn test_adherence_counts_days_without_mentions() {
        let mut records = vec![DailyRecord::new("b"), DailyRecord::new("a")];
        records[1].supplements = vec![dose("Magnesium", true)];

        let result = supplement_adherence(&records, DEFAULT_ADHERENCE_WINDOW);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total, 2);
        assert_eq!(result[0].rate, 50);
    }

    #[test]
    fn test_adherence_empty_input() {
        assert!(supplement_adherence(&[], DEFAULT_ADHERENCE_WINDOW).is_empty());
        assert!(supplement_adherence(&[DailyRecord::new("a")], 14).is_empty());
    }

    #[test]
    fn test_analytics_are_idempotent() {
        let records = sleep_split(8.0, 6.0);
        assert_eq!(compute_analytics(&records, None), compute_analytics(&records, None));
        assert_eq!(compare_periods(&records, 7), compare_periods(&records, 7));
        assert_eq!(supplement_adherence(&records, 14), supplement_adherence(&records, 14));
    }
}
