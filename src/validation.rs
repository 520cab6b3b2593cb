//! Record validation
//!
//! Check-ins are validated before they are stored so the analytics core can
//! assume well-formed date keys and in-range numeric values.

use serde::Serialize;
use std::collections::HashSet;

use crate::catalog::METRIC_FIELDS;
use crate::dates::parse_date_key;
use crate::types::{DailyRecord, MetricKey};

/// Validation errors for daily records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid date key '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("{metric} is not a finite number")]
    NotFinite { metric: MetricKey },

    #[error("{metric} = {value} is outside {min}..={max}")]
    OutOfRange {
        metric: MetricKey,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Supplement at position {0} has no name")]
    UnnamedSupplement(usize),

    #[error("Supplement '{name}' has invalid dose {dose_mg} mg")]
    InvalidDose { name: String, dose_mg: f64 },

    #[error("Duplicate record for {0}")]
    DuplicateDate(String),
}

/// Validate a single record
pub fn validate_record(record: &DailyRecord) -> Result<(), ValidationError> {
    if record.date.len() != 10 || parse_date_key(&record.date).is_none() {
        return Err(ValidationError::InvalidDate(record.date.clone()));
    }

    for field in METRIC_FIELDS.iter() {
        let Some(value) = record.metric(field.key) else {
            continue;
        };
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { metric: field.key });
        }
        if value < field.min || value > field.max {
            return Err(ValidationError::OutOfRange {
                metric: field.key,
                value,
                min: field.min,
                max: field.max,
            });
        }
    }

    for (index, supplement) in record.supplements.iter().enumerate() {
        if supplement.name.trim().is_empty() {
            return Err(ValidationError::UnnamedSupplement(index));
        }
        if !supplement.dose_mg.is_finite() || supplement.dose_mg < 0.0 {
            return Err(ValidationError::InvalidDose {
                name: supplement.name.clone(),
                dose_mg: supplement.dose_mg,
            });
        }
    }

    Ok(())
}

/// A failed record within a history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIssue {
    pub index: usize,
    pub date: String,
    pub error: String,
}

/// Validate a whole history, reporting every failing record and every
/// repeated date key (the first occurrence of a date is accepted).
pub fn validate_records(records: &[DailyRecord]) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let result = validate_record(record).and_then(|()| {
            if seen.insert(record.date.as_str()) {
                Ok(())
            } else {
                Err(ValidationError::DuplicateDate(record.date.clone()))
            }
        });

        if let Err(e) = result {
            issues.push(RecordIssue {
                index,
                date: record.date.clone(),
                error: e.to_string(),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SupplementDose;

    #[test]
    fn test_valid_record() {
        let record = DailyRecord::check_in_defaults("2026-02-21")
            .with_metric(MetricKey::HeartRate, 62.0)
            .with_metric(MetricKey::Steps, 0.0);
        assert!(validate_record(&record).is_ok());
    }

    #[test]
    fn test_rejects_bad_dates() {
        for date in ["", "2026-2-21", "2026-02-30", "21-02-2026", "2026-02-21T00:00"] {
            let result = validate_record(&DailyRecord::new(date));
            assert_eq!(result, Err(ValidationError::InvalidDate(date.to_string())));
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        let record = DailyRecord::new("2026-02-21").with_metric(MetricKey::SleepHours, 25.0);
        assert!(matches!(
            validate_record(&record),
            Err(ValidationError::OutOfRange {
                metric: MetricKey::SleepHours,
                ..
            })
        ));

        let record = DailyRecord::new("2026-02-21").with_metric(MetricKey::StressLevel, 0.0);
        assert!(validate_record(&record).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let record = DailyRecord::new("2026-02-21").with_metric(MetricKey::Weight, f64::NAN);
        assert_eq!(
            validate_record(&record),
            Err(ValidationError::NotFinite {
                metric: MetricKey::Weight
            })
        );
    }

    #[test]
    fn test_rejects_bad_supplements() {
        let mut record = DailyRecord::new("2026-02-21");
        record.supplements = vec![SupplementDose {
            name: " ".to_string(),
            dose_mg: 100.0,
            taken: true,
        }];
        assert_eq!(validate_record(&record), Err(ValidationError::UnnamedSupplement(0)));

        record.supplements[0].name = "NAC".to_string();
        record.supplements[0].dose_mg = -5.0;
        assert!(matches!(
            validate_record(&record),
            Err(ValidationError::InvalidDose { .. })
        ));
    }

    #[test]
    fn test_validate_records_reports_duplicates() {
        let records = vec![
            DailyRecord::new("2026-02-21"),
            DailyRecord::new("2026-02-20").with_metric(MetricKey::HeartRate, 500.0),
            DailyRecord::new("2026-02-21"),
        ];
        let issues = validate_records(&records);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].index, 1);
        assert_eq!(issues[1].index, 2);
        assert_eq!(issues[1].error, "Duplicate record for 2026-02-21");
    }
}
