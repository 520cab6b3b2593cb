//! Risk rules and baseline anomalies
//!
//! Two independent flag surfaces:
//! - [`evaluate_risk`] checks a single record against absolute cutoffs.
//! - [`metric_anomalies`] compares the latest record with its weekly baseline.
//!
//! Both cross-reference family history. Some concerns (heart rate, systolic
//! pressure, glucose) appear on both surfaces with different wording; callers
//! rely on which surface emits which message, so they are kept separate.
//!
//! Every comparison treats a missing value as non-triggering.

use tracing::debug;

use crate::catalog::{risk_threshold, FamilyRule, ANOMALY_FAMILY_RULES, RISK_FAMILY_RULES};
use crate::types::{DailyRecord, FamilyHistory, MetricAverages, MetricKey};

fn gt(value: Option<f64>, limit: f64) -> bool {
    matches!(value, Some(v) if v > limit)
}

fn ge(value: Option<f64>, limit: f64) -> bool {
    matches!(value, Some(v) if v >= limit)
}

fn lt(value: Option<f64>, limit: f64) -> bool {
    matches!(value, Some(v) if v < limit)
}

fn le(value: Option<f64>, limit: f64) -> bool {
    matches!(value, Some(v) if v <= limit)
}

/// Catalog high cutoff for a metric. Unknown cutoffs never trigger.
fn high(key: MetricKey) -> f64 {
    risk_threshold(key)
        .and_then(|t| t.high)
        .unwrap_or(f64::INFINITY)
}

fn low(key: MetricKey) -> f64 {
    risk_threshold(key)
        .and_then(|t| t.low)
        .unwrap_or(f64::NEG_INFINITY)
}

/// Evaluate the absolute risk rules against one record.
///
/// Flags are returned in evaluation order and are not deduplicated.
pub fn evaluate_risk(record: &DailyRecord, family_history: Option<&FamilyHistory>) -> Vec<String> {
    let mut flags = Vec::new();

    let sleep = record.sleep_hours;
    let exercise = record.exercise_minutes;
    let smoking = record.smoking_count;

    // Lifestyle combinations
    if lt(sleep, 6.0) && ge(smoking, 5.0) {
        flags.push("Low sleep + high smoking".to_string());
    }
    if lt(exercise, 20.0) && le(record.nutrition_score, 4.0) {
        flags.push("Low activity + poor nutrition".to_string());
    }
    if ge(smoking, high(MetricKey::SmokingCount)) {
        flags.push("Very high smoking count".to_string());
    }
    if lt(sleep, low(MetricKey::SleepHours)) {
        flags.push("Sleep deprivation risk".to_string());
    }

    // Vitals
    if let Some(sys) = record
        .blood_pressure_sys
        .filter(|v| *v > high(MetricKey::BloodPressureSys))
    {
        let dia = record
            .blood_pressure_dia
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());
        flags.push(format!("High blood pressure ({sys}/{dia} mmHg)"));
    }
    if gt(record.blood_pressure_dia, high(MetricKey::BloodPressureDia)) {
        flags.push("Diastolic pressure elevated".to_string());
    }
    if gt(record.heart_rate, high(MetricKey::HeartRate)) {
        flags.push("Resting heart rate elevated (>95 bpm)".to_string());
    }

    // Stress and its combinations
    if ge(record.stress_level, high(MetricKey::StressLevel)) {
        flags.push("Acute stress level".to_string());
        if lt(sleep, 6.0) {
            flags.push("High stress + sleep deficit combination".to_string());
        }
        if lt(exercise, 15.0) {
            flags.push("High stress without exercise offset".to_string());
        }
    }

    // Blood markers
    if let Some(glucose) = record.blood_glucose.filter(|v| *v > high(MetricKey::BloodGlucose)) {
        flags.push(format!("Blood glucose elevated ({glucose} mg/dL)"));
    }
    if gt(record.cholesterol_total, high(MetricKey::CholesterolTotal)) {
        flags.push("Total cholesterol high".to_string());
    }
    if gt(record.cholesterol_ldl, high(MetricKey::CholesterolLdl)) {
        flags.push("LDL cholesterol elevated".to_string());
    }
    if gt(record.triglycerides, high(MetricKey::Triglycerides)) {
        flags.push("Triglycerides elevated".to_string());
    }

    apply_family_rules(&RISK_FAMILY_RULES, record, family_history, &mut flags);

    debug!(date = %record.date, flags = flags.len(), "evaluated risk rules");
    flags
}

/// Compare the latest record with its trailing weekly averages.
///
/// Baseline rules need both the baseline and the latest value; a missing
/// operand silently skips the rule. An absent latest record yields no flags.
pub fn metric_anomalies(
    baseline: &MetricAverages,
    latest: Option<&DailyRecord>,
    family_history: Option<&FamilyHistory>,
) -> Vec<String> {
    let Some(latest) = latest else {
        return Vec::new();
    };
    let mut flags = Vec::new();

    if let (Some(avg), Some(now)) = (baseline.get(MetricKey::SleepHours), latest.sleep_hours) {
        if now < avg - 1.5 {
            flags.push("Sleep dipped sharply vs weekly baseline".to_string());
        }
    }

    if let (Some(avg), Some(now)) = (baseline.get(MetricKey::Steps), latest.steps) {
        if now < avg * 0.6 {
            flags.push("Step count dropped materially today".to_string());
        }
    }

    if gt(latest.heart_rate, 95.0) {
        flags.push("Heart rate is elevated".to_string());
    }

    if ge(latest.stress_level, 8.0) && lt(latest.sleep_hours, 6.0) {
        flags.push("High stress combined with sleep deficit".to_string());
    }

    if let (Some(avg), Some(now)) = (baseline.get(MetricKey::MoodScore), latest.mood_score) {
        if now < avg - 2.0 {
            flags.push("Mood dropped significantly vs baseline".to_string());
        }
    }

    if let (Some(avg), Some(now)) = (
        baseline.get(MetricKey::ScreenTimeHours),
        latest.screen_time_hours,
    ) {
        if now > avg * 1.5 {
            flags.push("Screen time spiked vs weekly average".to_string());
        }
    }

    if gt(latest.blood_pressure_sys, 140.0) {
        flags.push("Blood pressure systolic above 140 mmHg".to_string());
    }

    if gt(latest.blood_glucose, 125.0) {
        flags.push("Blood glucose elevated (>125 mg/dL)".to_string());
    }

    apply_family_rules(&ANOMALY_FAMILY_RULES, latest, family_history, &mut flags);

    flags
}

/// One flag per (condition, matching rule) pair, conditions in profile order.
fn apply_family_rules(
    rules: &[FamilyRule],
    record: &DailyRecord,
    family_history: Option<&FamilyHistory>,
    flags: &mut Vec<String>,
) {
    let Some(history) = family_history else {
        return;
    };

    for condition in &history.conditions {
        let name = condition.condition.to_lowercase();
        for rule in rules {
            let matches = rule.keywords.iter().any(|k| name.contains(k));
            if matches && gt(record.metric(rule.metric), rule.above) {
                flags.push(rule.message.to_string());
            }
        }
    }
}
