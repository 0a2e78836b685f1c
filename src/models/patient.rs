//! Fixed-schema patient record. Every field is optional; rendering
//! substitutes the "Not provided" sentinel. A save replaces the whole
//! record, there is no field-level merge.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::Gender;
use super::{ModelError, NOT_PROVIDED};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub study_date: Option<NaiveDate>,
    pub referring_physician: Option<String>,
    pub chief_complaint: Option<String>,
    pub clinical_history: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
}

impl PatientRecord {
    /// Range checks applied at the API boundary. No cross-field invariants.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(age) = self.age {
            if age > 120 {
                return Err(ModelError::OutOfRange {
                    field: "age",
                    detail: format!("{age} exceeds 120"),
                });
            }
        }
        if let Some(w) = self.weight_kg {
            if !w.is_finite() || w < 0.0 {
                return Err(ModelError::OutOfRange {
                    field: "weight_kg",
                    detail: format!("{w} must be a non-negative number"),
                });
            }
        }
        if let Some(h) = self.height_cm {
            if !h.is_finite() || h < 0.0 {
                return Err(ModelError::OutOfRange {
                    field: "height_cm",
                    detail: format!("{h} must be a non-negative number"),
                });
            }
        }
        Ok(())
    }

    pub fn age_display(&self) -> String {
        match self.age {
            Some(a) => a.to_string(),
            None => NOT_PROVIDED.to_string(),
        }
    }

    pub fn gender_display(&self) -> &str {
        self.gender.map(|g| g.as_str()).unwrap_or(NOT_PROVIDED)
    }

    pub fn date_display(date: Option<NaiveDate>) -> String {
        match date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => NOT_PROVIDED.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_valid() {
        assert!(PatientRecord::default().validate().is_ok());
    }

    #[test]
    fn age_over_120_is_rejected() {
        let rec = PatientRecord {
            age: Some(121),
            ..Default::default()
        };
        assert!(matches!(
            rec.validate(),
            Err(ModelError::OutOfRange { field: "age", .. })
        ));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let rec = PatientRecord {
            weight_kg: Some(-1.0),
            ..Default::default()
        };
        assert!(rec.validate().is_err());
    }

    #[test]
    fn missing_fields_render_sentinel() {
        let rec = PatientRecord::default();
        assert_eq!(rec.age_display(), "Not provided");
        assert_eq!(rec.gender_display(), "Not provided");
        assert_eq!(PatientRecord::date_display(None), "Not provided");
    }
}
