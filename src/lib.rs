//! Health Tracker - scoring, risk and analytics engine for daily health check-ins
//!
//! The tracker turns a history of daily records into dashboard signals through a
//! deterministic core: catalog lookup → per-metric scoring → composite rank →
//! rule-based risk flags → windowed analytics.
//!
//! ## Modules
//!
//! - **Core**: Pure scoring, risk and analytics over in-memory records
//! - **Persistence**: Versioned JSON storage with migration of older records
//! - **Interop**: C ABI and the `htrack` command line (feature `cli`)

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod dates;
pub mod error;
pub mod records;
pub mod report;
pub mod risk;
pub mod scoring;
pub mod store;
pub mod types;
pub mod validation;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use analytics::{compare_periods, compute_analytics, supplement_adherence};
pub use config::{load_config, AnalysisWindows, TrackerConfig};
pub use dates::{calculate_streak, normalize_records, to_date_key, weekly_series};
pub use error::TrackerError;
pub use records::upsert_record;
pub use report::{build_report, HealthReport, HealthTracker};
pub use risk::{evaluate_risk, metric_anomalies};
pub use scoring::{health_rank, score_breakdown, score_metric};
pub use store::{FileBackend, MemoryBackend, StorageBackend, Store};
pub use types::{DailyRecord, FamilyCondition, FamilyHistory, HealthRank, MetricKey};
pub use validation::{validate_record, validate_records, ValidationError};

/// Tracker version reported by the CLI and the C ABI
pub const TRACKER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by `htrack doctor`
pub const PRODUCER_NAME: &str = "health-tracker";
