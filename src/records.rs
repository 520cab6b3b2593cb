//! Daily record construction
//!
//! Helpers used by the check-in flow: building a fresh record for a date,
//! reading and writing metrics by key, ticking supplements off the stack and
//! replacing the day's record inside a history.

use crate::catalog::METRIC_FIELDS;
use crate::dates::normalize_records;
use crate::types::{DailyRecord, MetricKey, SupplementDose, SupplementStackEntry};

impl DailyRecord {
    /// Empty record for a date: no metrics, no supplements, no notes
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    /// Fresh check-in record pre-filled with the catalog's form defaults
    pub fn check_in_defaults(date: impl Into<String>) -> Self {
        let mut record = Self::new(date);
        for field in METRIC_FIELDS.iter() {
            if field.default.is_some() {
                record.set_metric(field.key, field.default);
            }
        }
        record
    }

    /// Value of a metric, `None` when not measured
    pub fn metric(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::SleepHours => self.sleep_hours,
            MetricKey::ExerciseMinutes => self.exercise_minutes,
            MetricKey::NutritionScore => self.nutrition_score,
            MetricKey::SmokingCount => self.smoking_count,
            MetricKey::Steps => self.steps,
            MetricKey::HeartRate => self.heart_rate,
            MetricKey::BloodPressureSys => self.blood_pressure_sys,
            MetricKey::BloodPressureDia => self.blood_pressure_dia,
            MetricKey::Weight => self.weight,
            MetricKey::BloodGlucose => self.blood_glucose,
            MetricKey::CholesterolTotal => self.cholesterol_total,
            MetricKey::CholesterolHdl => self.cholesterol_hdl,
            MetricKey::CholesterolLdl => self.cholesterol_ldl,
            MetricKey::Triglycerides => self.triglycerides,
            MetricKey::StressLevel => self.stress_level,
            MetricKey::MoodScore => self.mood_score,
            MetricKey::AnxietyLevel => self.anxiety_level,
            MetricKey::OutdoorMinutes => self.outdoor_minutes,
            MetricKey::ScreenTimeHours => self.screen_time_hours,
        }
    }

    /// Set or clear a metric
    pub fn set_metric(&mut self, key: MetricKey, value: Option<f64>) {
        let slot = match key {
            MetricKey::SleepHours => &mut self.sleep_hours,
            MetricKey::ExerciseMinutes => &mut self.exercise_minutes,
            MetricKey::NutritionScore => &mut self.nutrition_score,
            MetricKey::SmokingCount => &mut self.smoking_count,
            MetricKey::Steps => &mut self.steps,
            MetricKey::HeartRate => &mut self.heart_rate,
            MetricKey::BloodPressureSys => &mut self.blood_pressure_sys,
            MetricKey::BloodPressureDia => &mut self.blood_pressure_dia,
            MetricKey::Weight => &mut self.weight,
            MetricKey::BloodGlucose => &mut self.blood_glucose,
            MetricKey::CholesterolTotal => &mut self.cholesterol_total,
            MetricKey::CholesterolHdl => &mut self.cholesterol_hdl,
            MetricKey::CholesterolLdl => &mut self.cholesterol_ldl,
            MetricKey::Triglycerides => &mut self.triglycerides,
            MetricKey::StressLevel => &mut self.stress_level,
            MetricKey::MoodScore => &mut self.mood_score,
            MetricKey::AnxietyLevel => &mut self.anxiety_level,
            MetricKey::OutdoorMinutes => &mut self.outdoor_minutes,
            MetricKey::ScreenTimeHours => &mut self.screen_time_hours,
        };
        *slot = value;
    }

    /// Builder-style variant of [`DailyRecord::set_metric`]
    pub fn with_metric(mut self, key: MetricKey, value: f64) -> Self {
        self.set_metric(key, Some(value));
        self
    }

    /// Number of metrics with a measured value
    pub fn measured_count(&self) -> usize {
        MetricKey::ALL
            .iter()
            .filter(|key| self.metric(**key).is_some())
            .count()
    }

    /// Flip a supplement's `taken` flag, adding it from the stack if the
    /// record does not mention it yet.
    pub fn toggle_supplement(&mut self, stack: &[SupplementStackEntry], name: &str) {
        if let Some(existing) = self.supplements.iter_mut().find(|s| s.name == name) {
            existing.taken = !existing.taken;
            return;
        }

        let dose_mg = stack
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.default_dose_mg)
            .unwrap_or(0.0);

        self.supplements.push(SupplementDose {
            name: name.to_string(),
            dose_mg,
            taken: true,
        });
    }
}

/// Replace any record sharing `record`'s date and return the history newest first.
pub fn upsert_record(records: &[DailyRecord], record: DailyRecord) -> Vec<DailyRecord> {
    let mut next: Vec<DailyRecord> = records
        .iter()
        .filter(|existing| existing.date != record.date)
        .cloned()
        .collect();
    next.insert(0, record);
    normalize_records(&next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_supplement_stack;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_record_is_empty() {
        let record = DailyRecord::new("2026-02-21");
        assert_eq!(record.date, "2026-02-21");
        assert_eq!(record.measured_count(), 0);
        assert!(record.supplements.is_empty());
        assert_eq!(record.notes, "");
    }

    #[test]
    fn test_check_in_defaults() {
        let record = DailyRecord::check_in_defaults("2026-02-21");
        assert_eq!(record.sleep_hours, Some(7.0));
        assert_eq!(record.exercise_minutes, Some(30.0));
        assert_eq!(record.nutrition_score, Some(7.0));
        assert_eq!(record.smoking_count, Some(0.0));
        assert_eq!(record.steps, None);
        assert_eq!(record.measured_count(), 4);
    }

    #[test]
    fn test_metric_accessors_cover_every_key() {
        let mut record = DailyRecord::new("2026-02-21");
        for (i, key) in MetricKey::ALL.iter().enumerate() {
            record.set_metric(*key, Some(i as f64));
        }
        for (i, key) in MetricKey::ALL.iter().enumerate() {
            assert_eq!(record.metric(*key), Some(i as f64));
        }
        record.set_metric(MetricKey::Weight, None);
        assert_eq!(record.metric(MetricKey::Weight), None);
    }

    #[test]
    fn test_upsert_replaces_same_date() {
        let history = vec![
            DailyRecord::new("2026-02-20").with_metric(MetricKey::SleepHours, 6.0),
            DailyRecord::new("2026-02-21").with_metric(MetricKey::SleepHours, 5.0),
        ];
        let updated = upsert_record(
            &history,
            DailyRecord::new("2026-02-21").with_metric(MetricKey::SleepHours, 8.0),
        );

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].date, "2026-02-21");
        assert_eq!(updated[0].sleep_hours, Some(8.0));
        assert_eq!(updated[1].date, "2026-02-20");
    }

    #[test]
    fn test_upsert_inserts_new_date() {
        let history = vec![DailyRecord::new("2026-02-20")];
        let updated = upsert_record(&history, DailyRecord::new("2026-02-21"));
        let keys: Vec<&str> = updated.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(keys, vec!["2026-02-21", "2026-02-20"]);
    }

    #[test]
    fn test_toggle_supplement() {
        let stack = default_supplement_stack();
        let mut record = DailyRecord::new("2026-02-21");

        record.toggle_supplement(&stack, "Glycine");
        assert_eq!(
            record.supplements,
            vec![SupplementDose {
                name: "Glycine".to_string(),
                dose_mg: 6000.0,
                taken: true,
            }]
        );

        record.toggle_supplement(&stack, "Glycine");
        assert!(!record.supplements[0].taken);

        record.toggle_supplement(&stack, "Creatine");
        assert_eq!(record.supplements[1].dose_mg, 0.0);
        assert!(record.supplements[1].taken);
    }
}
