//! Metric catalog
//!
//! Static tables describing every tracked metric: how it is entered, how it
//! is scored, and which cutoffs the risk rules compare it against. Adding a
//! metric to the score or the rule set is an edit to these tables.

use crate::types::{HealthRank, MetricKey, SupplementStackEntry};

/// Input grouping used by the check-in form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Core,
    Vitals,
    Blood,
    Mind,
    Environment,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Core => "Core",
            Category::Vitals => "Vitals",
            Category::Blood => "Blood Markers",
            Category::Mind => "Mind",
            Category::Environment => "Environment",
        }
    }
}

/// Entry definition of a metric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricField {
    pub key: MetricKey,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Value pre-filled on a fresh check-in form
    pub default: Option<f64>,
    pub category: Category,
}

const fn field(
    key: MetricKey,
    label: &'static str,
    unit: &'static str,
    (min, max, step): (f64, f64, f64),
    default: Option<f64>,
    category: Category,
) -> MetricField {
    MetricField {
        key,
        label,
        unit,
        min,
        max,
        step,
        default,
        category,
    }
}

/// Every metric field, in form order
pub const METRIC_FIELDS: [MetricField; 19] = [
    field(MetricKey::SleepHours, "Sleep", "h", (0.0, 24.0, 0.5), Some(7.0), Category::Core),
    field(
        MetricKey::ExerciseMinutes,
        "Exercise",
        "min",
        (0.0, 600.0, 5.0),
        Some(30.0),
        Category::Core,
    ),
    field(
        MetricKey::NutritionScore,
        "Nutrition",
        "/10",
        (1.0, 10.0, 1.0),
        Some(7.0),
        Category::Core,
    ),
    field(MetricKey::SmokingCount, "Smoking", "", (0.0, 100.0, 1.0), Some(0.0), Category::Core),
    field(MetricKey::Steps, "Steps", "", (0.0, 99999.0, 100.0), None, Category::Vitals),
    field(MetricKey::HeartRate, "Heart Rate", "bpm", (30.0, 220.0, 1.0), None, Category::Vitals),
    field(
        MetricKey::BloodPressureSys,
        "BP Systolic",
        "mmHg",
        (60.0, 250.0, 1.0),
        None,
        Category::Vitals,
    ),
    field(
        MetricKey::BloodPressureDia,
        "BP Diastolic",
        "mmHg",
        (30.0, 150.0, 1.0),
        None,
        Category::Vitals,
    ),
    field(MetricKey::Weight, "Weight", "lbs", (50.0, 500.0, 0.1), None, Category::Vitals),
    field(
        MetricKey::BloodGlucose,
        "Blood Glucose",
        "mg/dL",
        (30.0, 500.0, 1.0),
        None,
        Category::Blood,
    ),
    field(
        MetricKey::CholesterolTotal,
        "Total Cholesterol",
        "mg/dL",
        (50.0, 400.0, 1.0),
        None,
        Category::Blood,
    ),
    field(MetricKey::CholesterolHdl, "HDL", "mg/dL", (10.0, 150.0, 1.0), None, Category::Blood),
    field(MetricKey::CholesterolLdl, "LDL", "mg/dL", (10.0, 300.0, 1.0), None, Category::Blood),
    field(
        MetricKey::Triglycerides,
        "Triglycerides",
        "mg/dL",
        (10.0, 1000.0, 1.0),
        None,
        Category::Blood,
    ),
    field(MetricKey::StressLevel, "Stress", "/10", (1.0, 10.0, 1.0), None, Category::Mind),
    field(MetricKey::MoodScore, "Mood", "/10", (1.0, 10.0, 1.0), None, Category::Mind),
    field(MetricKey::AnxietyLevel, "Anxiety", "/10", (1.0, 10.0, 1.0), None, Category::Mind),
    field(
        MetricKey::OutdoorMinutes,
        "Outdoor Time",
        "min",
        (0.0, 1440.0, 5.0),
        None,
        Category::Environment,
    ),
    field(
        MetricKey::ScreenTimeHours,
        "Screen Time",
        "h",
        (0.0, 24.0, 0.5),
        None,
        Category::Environment,
    ),
];

pub fn field_for(key: MetricKey) -> Option<&'static MetricField> {
    METRIC_FIELDS.iter().find(|f| f.key == key)
}

pub fn fields_by_category(category: Category) -> impl Iterator<Item = &'static MetricField> {
    METRIC_FIELDS.iter().filter(move |f| f.category == category)
}

/// How a metric's raw value is turned into points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringStrategy {
    /// Full points inside `optimal`, partial inside `acceptable`, a floor otherwise
    Range {
        optimal: (f64, f64),
        acceptable: (f64, f64),
    },
    /// Linear in `value / scale`; reversed when `inverse`
    Scale { scale: f64, inverse: bool },
    /// Three descending cutoffs; `inverse` means lower is better
    Threshold {
        high: f64,
        mid: f64,
        low: f64,
        inverse: bool,
    },
}

/// Scoring weight of a metric. Weights across the table sum to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricWeight {
    pub key: MetricKey,
    pub weight: u32,
    pub strategy: ScoringStrategy,
}

const fn range(
    key: MetricKey,
    weight: u32,
    optimal: (f64, f64),
    acceptable: (f64, f64),
) -> MetricWeight {
    MetricWeight {
        key,
        weight,
        strategy: ScoringStrategy::Range {
            optimal,
            acceptable,
        },
    }
}

const fn scale(key: MetricKey, weight: u32, scale: f64, inverse: bool) -> MetricWeight {
    MetricWeight {
        key,
        weight,
        strategy: ScoringStrategy::Scale { scale, inverse },
    }
}

const fn threshold(
    key: MetricKey,
    weight: u32,
    (high, mid, low): (f64, f64, f64),
    inverse: bool,
) -> MetricWeight {
    MetricWeight {
        key,
        weight,
        strategy: ScoringStrategy::Threshold {
            high,
            mid,
            low,
            inverse,
        },
    }
}

/// Metrics contributing to the composite score
pub const SCORE_WEIGHTS: [MetricWeight; 12] = [
    range(MetricKey::SleepHours, 15, (7.0, 9.0), (6.0, 10.0)),
    threshold(MetricKey::ExerciseMinutes, 15, (45.0, 30.0, 15.0), false),
    threshold(MetricKey::Steps, 10, (10000.0, 7000.0, 4000.0), false),
    range(MetricKey::HeartRate, 10, (55.0, 80.0), (50.0, 90.0)),
    scale(MetricKey::NutritionScore, 10, 10.0, false),
    threshold(MetricKey::SmokingCount, 10, (0.0, 3.0, 10.0), true),
    scale(MetricKey::StressLevel, 5, 10.0, true),
    scale(MetricKey::MoodScore, 5, 10.0, false),
    range(MetricKey::BloodPressureSys, 5, (90.0, 120.0), (85.0, 140.0)),
    range(MetricKey::BloodGlucose, 5, (70.0, 100.0), (60.0, 125.0)),
    threshold(MetricKey::OutdoorMinutes, 5, (60.0, 30.0, 15.0), false),
    threshold(MetricKey::ScreenTimeHours, 5, (4.0, 8.0, 12.0), true),
];

pub fn weight_for(key: MetricKey) -> Option<&'static MetricWeight> {
    SCORE_WEIGHTS.iter().find(|w| w.key == key)
}

/// Absolute cutoffs consulted by the risk rules (independent of scoring)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThreshold {
    pub key: MetricKey,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

const fn risk(key: MetricKey, high: Option<f64>, low: Option<f64>) -> RiskThreshold {
    RiskThreshold { key, high, low }
}

pub const RISK_THRESHOLDS: [RiskThreshold; 10] = [
    risk(MetricKey::BloodPressureSys, Some(140.0), Some(90.0)),
    risk(MetricKey::BloodPressureDia, Some(90.0), Some(60.0)),
    risk(MetricKey::HeartRate, Some(95.0), Some(45.0)),
    risk(MetricKey::BloodGlucose, Some(125.0), Some(70.0)),
    risk(MetricKey::CholesterolTotal, Some(240.0), None),
    risk(MetricKey::CholesterolLdl, Some(160.0), None),
    risk(MetricKey::Triglycerides, Some(200.0), None),
    risk(MetricKey::StressLevel, Some(8.0), None),
    risk(MetricKey::SleepHours, None, Some(5.0)),
    risk(MetricKey::SmokingCount, Some(10.0), None),
];

pub fn risk_threshold(key: MetricKey) -> Option<&'static RiskThreshold> {
    RISK_THRESHOLDS.iter().find(|t| t.key == key)
}

/// Rank tiers in descending-minimum order; the first tier met wins.
pub const RANK_TIERS: [(u32, HealthRank); 4] = [
    (86, HealthRank::Excellent),
    (72, HealthRank::Healthy),
    (58, HealthRank::Watch),
    (0, HealthRank::AtRisk),
];

/// Metrics averaged and trended week over week
pub const TREND_METRICS: [MetricKey; 10] = [
    MetricKey::SleepHours,
    MetricKey::Steps,
    MetricKey::HeartRate,
    MetricKey::ExerciseMinutes,
    MetricKey::StressLevel,
    MetricKey::MoodScore,
    MetricKey::ScreenTimeHours,
    MetricKey::OutdoorMinutes,
    MetricKey::Weight,
    MetricKey::BloodPressureSys,
];

/// Metrics included in a recent-vs-prior period comparison
pub const COMPARISON_METRICS: [MetricKey; 8] = [
    MetricKey::SleepHours,
    MetricKey::ExerciseMinutes,
    MetricKey::Steps,
    MetricKey::HeartRate,
    MetricKey::StressLevel,
    MetricKey::MoodScore,
    MetricKey::ScreenTimeHours,
    MetricKey::OutdoorMinutes,
];

/// Family-history cross-reference: fires when a condition name contains any
/// of `keywords` (case-insensitive) and the metric exceeds `above`.
///
/// Matching is plain substring search over free text, so synonyms that do not
/// contain a keyword ("T2D", "cardiac") are not recognized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyRule {
    pub keywords: &'static [&'static str],
    pub metric: MetricKey,
    pub above: f64,
    pub message: &'static str,
}

/// Family rules applied alongside the absolute risk rules
pub const RISK_FAMILY_RULES: [FamilyRule; 2] = [
    FamilyRule {
        keywords: &["diabetes"],
        metric: MetricKey::BloodGlucose,
        above: 100.0,
        message: "Glucose above normal with family history of diabetes",
    },
    FamilyRule {
        keywords: &["heart"],
        metric: MetricKey::SmokingCount,
        above: 0.0,
        message: "Smoking with family history of heart disease",
    },
];

/// Family rules applied alongside the baseline anomaly checks
pub const ANOMALY_FAMILY_RULES: [FamilyRule; 3] = [
    FamilyRule {
        keywords: &["diabetes"],
        metric: MetricKey::BloodGlucose,
        above: 100.0,
        message: "Glucose elevated with family history of diabetes",
    },
    FamilyRule {
        keywords: &["heart"],
        metric: MetricKey::HeartRate,
        above: 90.0,
        message: "Elevated heart rate with family history of heart disease",
    },
    FamilyRule {
        keywords: &["hypertension", "blood pressure"],
        metric: MetricKey::BloodPressureSys,
        above: 130.0,
        message: "BP trending high with family history of hypertension",
    },
];

/// Supplement stack seeded on first use
pub fn default_supplement_stack() -> Vec<SupplementStackEntry> {
    [
        ("NAC", 1500.0, "morning"),
        ("Glycine", 6000.0, "evening"),
        ("Vitamin D3", 5000.0, "morning"),
        ("Magnesium", 400.0, "evening"),
        ("Omega-3", 2000.0, "morning"),
    ]
    .into_iter()
    .map(|(name, dose, schedule)| SupplementStackEntry {
        name: name.to_string(),
        default_dose_mg: dose,
        schedule: schedule.to_string(),
    })
    .collect()
}
