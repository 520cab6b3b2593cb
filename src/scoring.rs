//! Composite health scoring
//!
//! Each weighted metric earns points according to its catalog strategy:
//! - Range: optimal / acceptable intervals
//! - Scale: linear over a 1..=scale rating
//! - Threshold: three descending cutoffs
//!
//! The composite score is earned points over the points that were actually
//! available, so missing data lowers confidence rather than the score.

use tracing::debug;

use crate::catalog::{weight_for, ScoringStrategy, RANK_TIERS, SCORE_WEIGHTS};
use crate::types::{DailyRecord, HealthRank, MetricKey, ScoreBreakdown};

/// Round half up, matching how scores have always been displayed
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Points earned by a single metric value.
///
/// Returns `None` when the metric carries no weight or the value is not a
/// finite number; `None` means "unscored", which is distinct from zero points.
pub fn score_metric(key: MetricKey, value: f64) -> Option<u32> {
    let config = weight_for(key)?;
    if !value.is_finite() {
        return None;
    }

    let max_pts = config.weight as f64;
    let share = |fraction: f64| round_half_up(max_pts * fraction);

    let points = match config.strategy {
        ScoringStrategy::Range {
            optimal,
            acceptable,
        } => {
            if within(value, optimal) {
                max_pts
            } else if within(value, acceptable) {
                share(0.65)
            } else {
                share(0.3)
            }
        }
        ScoringStrategy::Scale { scale, inverse } => {
            let ratio = if inverse {
                (scale - value + 1.0) / scale
            } else {
                value / scale
            };
            share(ratio.clamp(0.0, 1.0))
        }
        ScoringStrategy::Threshold {
            high,
            mid,
            low,
            inverse: true,
        } => {
            if value <= high {
                max_pts
            } else if value <= mid {
                share(0.65)
            } else if value <= low {
                share(0.3)
            } else {
                0.0
            }
        }
        ScoringStrategy::Threshold { high, mid, low, .. } => {
            if value >= high {
                max_pts
            } else if value >= mid {
                share(0.7)
            } else if value >= low {
                share(0.35)
            } else {
                share(0.15)
            }
        }
    };

    Some(points as u32)
}

fn within(value: f64, (low, high): (f64, f64)) -> bool {
    value >= low && value <= high
}

/// Score every weighted metric of a record.
///
/// An absent record scores `{ total: 0, confidence: 0, parts: {} }`.
pub fn score_breakdown(record: Option<&DailyRecord>) -> ScoreBreakdown {
    let Some(record) = record else {
        return ScoreBreakdown::default();
    };

    let mut breakdown = ScoreBreakdown::default();
    let mut earned = 0u32;
    let mut possible = 0u32;
    let mut filled = 0usize;

    for config in SCORE_WEIGHTS.iter() {
        let score = record
            .metric(config.key)
            .and_then(|value| score_metric(config.key, value));

        if let Some(points) = score {
            earned += points;
            possible += config.weight;
            filled += 1;
        }
        breakdown.parts.insert(config.key, score);
    }

    breakdown.total = if possible > 0 {
        round_half_up(earned as f64 / possible as f64 * 100.0) as u32
    } else {
        0
    };
    breakdown.confidence = round_half_up(filled as f64 / SCORE_WEIGHTS.len() as f64 * 100.0) as u32;

    debug!(
        date = %record.date,
        total = breakdown.total,
        confidence = breakdown.confidence,
        "scored record"
    );

    breakdown
}

/// Rank a composite score; the highest tier whose minimum is met wins.
pub fn health_rank(score: u32) -> HealthRank {
    RANK_TIERS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, rank)| *rank)
        .unwrap_or(HealthRank::AtRisk)
}
