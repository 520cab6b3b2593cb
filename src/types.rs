//! Core types for the health tracker
//!
//! This module defines the data structures that flow through the tracker:
//! daily records and their profile context on the way in, and scores,
//! averages, trends and adherence rates on the way out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a tracked numeric metric.
///
/// Serialized with the same camelCase keys a [`DailyRecord`] uses, so a
/// metric key can index both a stored record and any per-metric output map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    SleepHours,
    ExerciseMinutes,
    NutritionScore,
    SmokingCount,
    Steps,
    HeartRate,
    BloodPressureSys,
    BloodPressureDia,
    Weight,
    BloodGlucose,
    CholesterolTotal,
    #[serde(rename = "cholesterolHDL")]
    CholesterolHdl,
    #[serde(rename = "cholesterolLDL")]
    CholesterolLdl,
    Triglycerides,
    StressLevel,
    MoodScore,
    AnxietyLevel,
    OutdoorMinutes,
    ScreenTimeHours,
}

impl MetricKey {
    /// Every metric a record can carry, in record field order.
    pub const ALL: [MetricKey; 19] = [
        MetricKey::SleepHours,
        MetricKey::ExerciseMinutes,
        MetricKey::NutritionScore,
        MetricKey::SmokingCount,
        MetricKey::Steps,
        MetricKey::HeartRate,
        MetricKey::BloodPressureSys,
        MetricKey::BloodPressureDia,
        MetricKey::Weight,
        MetricKey::BloodGlucose,
        MetricKey::CholesterolTotal,
        MetricKey::CholesterolHdl,
        MetricKey::CholesterolLdl,
        MetricKey::Triglycerides,
        MetricKey::StressLevel,
        MetricKey::MoodScore,
        MetricKey::AnxietyLevel,
        MetricKey::OutdoorMinutes,
        MetricKey::ScreenTimeHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::SleepHours => "sleepHours",
            MetricKey::ExerciseMinutes => "exerciseMinutes",
            MetricKey::NutritionScore => "nutritionScore",
            MetricKey::SmokingCount => "smokingCount",
            MetricKey::Steps => "steps",
            MetricKey::HeartRate => "heartRate",
            MetricKey::BloodPressureSys => "bloodPressureSys",
            MetricKey::BloodPressureDia => "bloodPressureDia",
            MetricKey::Weight => "weight",
            MetricKey::BloodGlucose => "bloodGlucose",
            MetricKey::CholesterolTotal => "cholesterolTotal",
            MetricKey::CholesterolHdl => "cholesterolHDL",
            MetricKey::CholesterolLdl => "cholesterolLDL",
            MetricKey::Triglycerides => "triglycerides",
            MetricKey::StressLevel => "stressLevel",
            MetricKey::MoodScore => "moodScore",
            MetricKey::AnxietyLevel => "anxietyLevel",
            MetricKey::OutdoorMinutes => "outdoorMinutes",
            MetricKey::ScreenTimeHours => "screenTimeHours",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        MetricKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown metric '{value}'"))
    }
}

/// A supplement actually logged on a given day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplementDose {
    pub name: String,
    pub dose_mg: f64,
    pub taken: bool,
}

/// One day's logged health metrics, keyed by its `YYYY-MM-DD` date.
///
/// Every metric is optional: `None` means "not measured", which is distinct
/// from a measured zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyRecord {
    /// Date key (YYYY-MM-DD)
    pub date: String,

    // Core
    pub sleep_hours: Option<f64>,
    pub exercise_minutes: Option<f64>,
    /// Self-rated, 1-10
    pub nutrition_score: Option<f64>,
    pub smoking_count: Option<f64>,

    // Vitals
    pub steps: Option<f64>,
    /// Resting heart rate (bpm)
    pub heart_rate: Option<f64>,
    pub blood_pressure_sys: Option<f64>,
    pub blood_pressure_dia: Option<f64>,
    /// Body weight (lbs)
    pub weight: Option<f64>,

    // Blood markers (mg/dL)
    pub blood_glucose: Option<f64>,
    pub cholesterol_total: Option<f64>,
    #[serde(rename = "cholesterolHDL")]
    pub cholesterol_hdl: Option<f64>,
    #[serde(rename = "cholesterolLDL")]
    pub cholesterol_ldl: Option<f64>,
    pub triglycerides: Option<f64>,

    // Mind, 1-10
    pub stress_level: Option<f64>,
    pub mood_score: Option<f64>,
    pub anxiety_level: Option<f64>,

    // Environment
    pub outdoor_minutes: Option<f64>,
    pub screen_time_hours: Option<f64>,

    pub supplements: Vec<SupplementDose>,
    pub notes: String,
}

/// A condition present in the user's family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyCondition {
    /// Free-text condition name (e.g. "Type 2 Diabetes")
    pub condition: String,
    /// Relation to the user (e.g. "Father")
    pub relation: String,
    pub age_of_onset: Option<f64>,
}

/// Family history profile, saved wholesale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyHistory {
    pub conditions: Vec<FamilyCondition>,
    pub blood_type: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Supplement template the daily checklist is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementStackEntry {
    pub name: String,
    pub default_dose_mg: f64,
    /// Free-text schedule (e.g. "morning")
    pub schedule: String,
}

/// Composite score for a single record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Earned points as a percentage of the points available (0-100)
    pub total: u32,
    /// Share of configured metrics that were scorable (0-100)
    pub confidence: u32,
    /// Per-metric points; `None` marks a metric that could not be scored
    pub parts: BTreeMap<MetricKey, Option<u32>>,
}

/// Categorical rank derived from a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthRank {
    Excellent,
    Healthy,
    Watch,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl HealthRank {
    pub fn label(&self) -> &'static str {
        match self {
            HealthRank::Excellent => "Excellent",
            HealthRank::Healthy => "Healthy",
            HealthRank::Watch => "Watch",
            HealthRank::AtRisk => "At Risk",
        }
    }
}

impl fmt::Display for HealthRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of a metric between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }
}

/// Per-metric window means; a metric with no data in the window maps to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricAverages(pub BTreeMap<MetricKey, Option<f64>>);

impl MetricAverages {
    /// Mean for `key`, or `None` when absent or not computable
    pub fn get(&self, key: MetricKey) -> Option<f64> {
        self.0.get(&key).copied().flatten()
    }

    pub fn insert(&mut self, key: MetricKey, value: Option<f64>) {
        self.0.insert(key, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricKey, &Option<f64>)> {
        self.0.iter()
    }
}

impl FromIterator<(MetricKey, Option<f64>)> for MetricAverages {
    fn from_iter<I: IntoIterator<Item = (MetricKey, Option<f64>)>>(iter: I) -> Self {
        MetricAverages(iter.into_iter().collect())
    }
}

/// Weekly averages, trends and anomalies over a record history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    #[serde(rename = "last7Avg")]
    pub last7_avg: MetricAverages,
    #[serde(rename = "prev7Avg")]
    pub prev7_avg: MetricAverages,
    pub trends: BTreeMap<MetricKey, Trend>,
    pub anomalies: Vec<String>,
}

/// Recent vs prior window averages for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodDelta {
    pub recent: f64,
    pub prior: f64,
    pub delta: f64,
}

/// Adherence of a single supplement over a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementAdherence {
    pub name: String,
    /// Days in the window the supplement was marked taken
    pub taken: usize,
    /// Days in the window
    pub total: usize,
    /// Rounded percentage (0-100)
    pub rate: u32,
}

/// One day of the seven-day chart series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySnapshot {
    /// MM-DD label
    pub date: String,
    pub sleep: Option<f64>,
    pub exercise: Option<f64>,
    pub smoking: Option<f64>,
    pub steps: Option<f64>,
    pub heart_rate: Option<f64>,
    pub stress: Option<f64>,
    pub mood: Option<f64>,
    pub outdoor: Option<f64>,
    pub screen: Option<f64>,
}
