//! Wire shapes exchanged with the prediction service.
//!
//! Field names match the service's request model exactly, including the
//! mixed-case `HbA1c_level` and the five one-hot smoking flags.

use serde::{Deserialize, Serialize};

use super::enums::{PatientField, SmokingHistory};
use super::patient::{FieldValue, PatientRecord, ValidationError};

/// Request body for `POST /predict`.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientPayload {
    pub gender: u8,
    pub age: u32,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub bmi: f64,
    pub HbA1c_level: f64,
    pub blood_glucose_level: u32,
    pub smoking_history_current: u8,
    pub smoking_history_ever: u8,
    pub smoking_history_former: u8,
    pub smoking_history_never: u8,
    pub smoking_history_not_current: u8,
}

/// The five smoking flags, in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmokingFlags {
    pub current: u8,
    pub ever: u8,
    pub former: u8,
    pub never: u8,
    pub not_current: u8,
}

impl SmokingFlags {
    /// One-hot encoding of a single category.
    pub fn from_category(category: SmokingHistory) -> Self {
        let mut flags = Self::default();
        *flags.slot_mut(category) = 1;
        flags
    }

    fn slot(&self, category: SmokingHistory) -> u8 {
        match category {
            SmokingHistory::Current => self.current,
            SmokingHistory::Ever => self.ever,
            SmokingHistory::Former => self.former,
            SmokingHistory::Never => self.never,
            SmokingHistory::NotCurrent => self.not_current,
        }
    }

    fn slot_mut(&mut self, category: SmokingHistory) -> &mut u8 {
        match category {
            SmokingHistory::Current => &mut self.current,
            SmokingHistory::Ever => &mut self.ever,
            SmokingHistory::Former => &mut self.former,
            SmokingHistory::Never => &mut self.never,
            SmokingHistory::NotCurrent => &mut self.not_current,
        }
    }

    /// Number of flags set to 1.
    pub fn count_set(&self) -> usize {
        SmokingHistory::ALL
            .iter()
            .filter(|c| self.slot(**c) == 1)
            .count()
    }

    /// Collapse the flag set to one category.
    ///
    /// Flags must be 0 or 1. If several are set the first in
    /// `SmokingHistory::PRECEDENCE` wins; if none are set the result is `Never`.
    pub fn resolve(&self) -> Result<SmokingHistory, ValidationError> {
        if SmokingHistory::ALL.iter().any(|c| self.slot(*c) > 1) {
            return Err(ValidationError::new(
                PatientField::SmokingHistory,
                "smoking flags must be 0 or 1",
            ));
        }
        Ok(SmokingHistory::PRECEDENCE
            .into_iter()
            .find(|c| self.slot(*c) == 1)
            .unwrap_or(SmokingHistory::Never))
    }
}

impl PatientPayload {
    pub fn smoking_flags(&self) -> SmokingFlags {
        SmokingFlags {
            current: self.smoking_history_current,
            ever: self.smoking_history_ever,
            former: self.smoking_history_former,
            never: self.smoking_history_never,
            not_current: self.smoking_history_not_current,
        }
    }
}

impl From<PatientRecord> for PatientPayload {
    fn from(record: PatientRecord) -> Self {
        let flags = SmokingFlags::from_category(record.smoking_history());
        Self {
            gender: record.gender().code(),
            age: u32::from(record.age()),
            hypertension: u8::from(record.hypertension()),
            heart_disease: u8::from(record.heart_disease()),
            bmi: record.bmi(),
            HbA1c_level: record.hba1c_level(),
            blood_glucose_level: u32::from(record.blood_glucose_level()),
            smoking_history_current: flags.current,
            smoking_history_ever: flags.ever,
            smoking_history_former: flags.former,
            smoking_history_never: flags.never,
            smoking_history_not_current: flags.not_current,
        }
    }
}

impl TryFrom<PatientPayload> for PatientRecord {
    type Error = ValidationError;

    fn try_from(p: PatientPayload) -> Result<Self, Self::Error> {
        let smoking = p.smoking_flags().resolve()?;
        let number = |n: f64| FieldValue::Number(n);
        Ok(PatientRecord::default()
            .set_field(PatientField::Gender, number(f64::from(p.gender)))?
            .set_field(PatientField::Age, number(f64::from(p.age)))?
            .set_field(PatientField::Hypertension, number(f64::from(p.hypertension)))?
            .set_field(PatientField::HeartDisease, number(f64::from(p.heart_disease)))?
            .set_field(PatientField::Bmi, number(p.bmi))?
            .set_field(PatientField::Hba1cLevel, number(p.HbA1c_level))?
            .set_field(PatientField::BloodGlucoseLevel, number(f64::from(p.blood_glucose_level)))?
            .with_smoking_history(smoking))
    }
}

/// Response body from `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Gender;

    fn sample() -> PatientRecord {
        PatientRecord::default()
            .set_field(PatientField::Age, FieldValue::Number(50.0))
            .unwrap()
            .set_field(PatientField::Bmi, FieldValue::Number(31.0))
            .unwrap()
            .set_field(PatientField::Hba1cLevel, FieldValue::Number(6.6))
            .unwrap()
            .set_field(PatientField::BloodGlucoseLevel, FieldValue::Number(140.0))
            .unwrap()
            .with_smoking_history(SmokingHistory::Former)
    }

    #[test]
    fn payload_uses_service_field_names() {
        let json = serde_json::to_value(PatientPayload::from(sample())).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "gender",
            "age",
            "hypertension",
            "heart_disease",
            "bmi",
            "HbA1c_level",
            "blood_glucose_level",
            "smoking_history_current",
            "smoking_history_ever",
            "smoking_history_former",
            "smoking_history_never",
            "smoking_history_not_current",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 12);
        assert_eq!(json["age"], 50);
        assert_eq!(json["HbA1c_level"], 6.6);
        assert_eq!(json["smoking_history_former"], 1);
        assert_eq!(json["smoking_history_never"], 0);
    }

    #[test]
    fn record_serializes_as_payload_and_back() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let back: PatientRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn deserializing_out_of_range_record_fails() {
        let mut payload = PatientPayload::from(sample());
        payload.bmi = 95.0;
        let json = serde_json::to_string(&payload).unwrap();
        let err = serde_json::from_str::<PatientRecord>(&json).unwrap_err();
        assert!(err.to_string().contains("Invalid bmi"));
    }

    #[test]
    fn multiple_flags_resolve_by_precedence() {
        let flags = SmokingFlags {
            current: 0,
            ever: 1,
            former: 1,
            never: 1,
            not_current: 1,
        };
        assert_eq!(flags.resolve().unwrap(), SmokingHistory::Former);

        let flags = SmokingFlags {
            not_current: 1,
            never: 1,
            ..Default::default()
        };
        assert_eq!(flags.resolve().unwrap(), SmokingHistory::NotCurrent);
    }

    #[test]
    fn empty_flag_set_resolves_to_never() {
        assert_eq!(
            SmokingFlags::default().resolve().unwrap(),
            SmokingHistory::Never
        );
    }

    #[test]
    fn non_binary_flag_rejected() {
        let flags = SmokingFlags {
            current: 2,
            ..Default::default()
        };
        let err = flags.resolve().unwrap_err();
        assert_eq!(err.field, PatientField::SmokingHistory);
    }

    #[test]
    fn every_category_encodes_one_hot() {
        for category in SmokingHistory::ALL {
            let flags = SmokingFlags::from_category(category);
            assert_eq!(flags.count_set(), 1);
            assert_eq!(flags.resolve().unwrap(), category);
        }
    }

    #[test]
    fn payload_gender_code_validated() {
        let mut payload = PatientPayload::from(sample());
        payload.gender = 1;
        let record = PatientRecord::try_from(payload).unwrap();
        assert_eq!(record.gender(), Gender::Male);
        payload.gender = 7;
        assert!(PatientRecord::try_from(payload).is_err());
    }

    #[test]
    fn prediction_response_parses() {
        let parsed: PredictionResponse =
            serde_json::from_str(r#"{"prediction": 1, "probability": 0.82}"#).unwrap();
        assert_eq!(parsed.prediction, 1);
        assert_eq!(parsed.probability, 0.82);
    }
}
