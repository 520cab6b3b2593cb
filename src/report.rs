//! Dashboard assembly
//!
//! [`build_report`] runs every analytic over a history for one reference day.
//! [`HealthTracker`] is the stateful front end: it owns a [`Store`], keeps the
//! normalized history in memory and persists every change.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::analytics::{compare_periods, compute_analytics_over, supplement_adherence};
use crate::catalog::default_supplement_stack;
use crate::config::AnalysisWindows;
use crate::dates::{calculate_streak, normalize_records, to_date_key, weekly_series};
use crate::error::TrackerError;
use crate::records::upsert_record;
use crate::risk::evaluate_risk;
use crate::scoring::{health_rank, score_breakdown};
use crate::store::{StorageBackend, Store};
use crate::types::{
    Analytics, DailyRecord, DaySnapshot, FamilyHistory, HealthRank, MetricKey, PeriodDelta,
    ScoreBreakdown, SupplementAdherence, SupplementStackEntry,
};
use crate::validation::validate_record;

/// Everything the dashboard shows for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Reference day (YYYY-MM-DD)
    pub date_key: String,
    /// The reference day's record, if logged
    pub today: Option<DailyRecord>,
    pub score: ScoreBreakdown,
    pub rank: HealthRank,
    pub risk_flags: Vec<String>,
    pub analytics: Analytics,
    pub comparison: Option<BTreeMap<MetricKey, PeriodDelta>>,
    pub adherence: Vec<SupplementAdherence>,
    pub streak: usize,
    pub weekly: Vec<DaySnapshot>,
}

/// Build the report for `reference` over `records` (any order).
pub fn build_report<Tz: TimeZone>(
    records: &[DailyRecord],
    family_history: Option<&FamilyHistory>,
    reference: &DateTime<Tz>,
    windows: &AnalysisWindows,
) -> HealthReport {
    let records = normalize_records(records);
    let date_key = to_date_key(reference);
    let today = records.iter().find(|r| r.date == date_key).cloned();

    let score = score_breakdown(today.as_ref());
    let rank = health_rank(score.total);
    let risk_flags = today
        .as_ref()
        .map(|record| evaluate_risk(record, family_history))
        .unwrap_or_default();

    let report = HealthReport {
        analytics: compute_analytics_over(&records, family_history, windows.trend_days),
        comparison: compare_periods(&records, windows.comparison_days),
        adherence: supplement_adherence(&records, windows.adherence_days),
        streak: calculate_streak(&records, reference),
        weekly: weekly_series(&records, reference),
        date_key,
        today,
        score,
        rank,
        risk_flags,
    };

    debug!(
        date = %report.date_key,
        total = report.score.total,
        flags = report.risk_flags.len(),
        streak = report.streak,
        "built report"
    );

    report
}

/// Stateful tracker over a storage backend
#[derive(Debug)]
pub struct HealthTracker<B: StorageBackend> {
    store: Store<B>,
    windows: AnalysisWindows,
    records: Vec<DailyRecord>,
    family_history: FamilyHistory,
}

impl<B: StorageBackend> HealthTracker<B> {
    /// Open a tracker, loading (and if needed migrating) persisted data
    pub fn new(backend: B, windows: AnalysisWindows) -> Self {
        let mut store = Store::new(backend);
        let records = normalize_records(&store.load_records());
        let family_history = store.load_family_history();
        debug!(records = records.len(), "opened tracker");

        Self {
            store,
            windows,
            records,
            family_history,
        }
    }

    /// History, newest first
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn record_for(&self, date: &str) -> Option<&DailyRecord> {
        self.records.iter().find(|r| r.date == date)
    }

    pub fn family_history(&self) -> &FamilyHistory {
        &self.family_history
    }

    pub fn windows(&self) -> &AnalysisWindows {
        &self.windows
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    /// Validate and store a day's record, replacing any record for that date
    pub fn check_in(&mut self, record: DailyRecord) -> Result<(), TrackerError> {
        validate_record(&record)?;
        let date = record.date.clone();
        let next = upsert_record(&self.records, record);
        self.store.save_records(&next)?;
        self.records = next;
        debug!(%date, records = self.records.len(), "checked in");
        Ok(())
    }

    pub fn save_family_history(
        &mut self,
        family_history: &FamilyHistory,
        now: DateTime<Utc>,
    ) -> Result<&FamilyHistory, TrackerError> {
        self.family_history = self.store.save_family_history(family_history, now)?;
        Ok(&self.family_history)
    }

    /// Saved supplement stack, seeding and persisting the default stack when
    /// none has been saved yet
    pub fn supplement_stack(&mut self) -> Result<Vec<SupplementStackEntry>, TrackerError> {
        let saved = self.store.load_supplement_stack();
        if !saved.is_empty() {
            return Ok(saved);
        }

        let stack = default_supplement_stack();
        self.store.save_supplement_stack(&stack)?;
        Ok(stack)
    }

    /// Drop every stored record
    pub fn reset_history(&mut self) -> Result<(), TrackerError> {
        self.store.reset_records()?;
        self.records.clear();
        Ok(())
    }

    pub fn report<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> HealthReport {
        build_report(
            &self.records,
            Some(&self.family_history),
            reference,
            &self.windows,
        )
    }
}
