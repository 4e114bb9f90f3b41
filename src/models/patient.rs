//! Validated patient attribute set submitted for a risk assessment.
//!
//! A `PatientRecord` can only be obtained through `Default` or through
//! `set_field`, so every value held by one is inside its declared domain.
//! Smoking history is a single enum value here; the flat one-hot form only
//! exists at the wire boundary (`models::wire`).

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::enums::{Gender, PatientField, SmokingHistory};
use super::wire::PatientPayload;

pub const AGE_RANGE: RangeInclusive<f64> = 0.0..=120.0;
pub const BMI_RANGE: RangeInclusive<f64> = 10.0..=70.0;
pub const HBA1C_RANGE: RangeInclusive<f64> = 3.0..=15.0;
pub const GLUCOSE_RANGE: RangeInclusive<f64> = 50.0..=500.0;

/// A field value rejected by its domain check. Nothing is committed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: PatientField,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: PatientField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Raw input for a single field, as it arrives from a form control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Flag(bool),
    Gender(Gender),
    Smoking(SmokingHistory),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatientPayload", into = "PatientPayload")]
pub struct PatientRecord {
    gender: Gender,
    age: u8,
    hypertension: bool,
    heart_disease: bool,
    bmi: f64,
    hba1c_level: f64,
    blood_glucose_level: u16,
    smoking_history: SmokingHistory,
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self {
            gender: Gender::Female,
            age: 45,
            hypertension: false,
            heart_disease: false,
            bmi: 25.0,
            hba1c_level: 5.5,
            blood_glucose_level: 100,
            smoking_history: SmokingHistory::Never,
        }
    }
}

impl PatientRecord {
    /// Return a copy of this record with one field replaced.
    ///
    /// The receiver is never modified, so a failed assignment leaves the
    /// caller's record exactly as it was.
    pub fn set_field(&self, field: PatientField, value: FieldValue) -> Result<Self, ValidationError> {
        let mut next = *self;
        match field {
            PatientField::Gender => {
                next.gender = match value {
                    FieldValue::Gender(g) => g,
                    FieldValue::Number(n) => {
                        let code = integer_in(field, n, 0.0..=1.0)?;
                        Gender::from_code(code as u8)
                            .ok_or_else(|| ValidationError::new(field, "must be 0 or 1"))?
                    }
                    other => return Err(type_mismatch(field, other)),
                };
            }
            PatientField::Age => {
                next.age = integer_in(field, expect_number(field, value)?, AGE_RANGE)? as u8;
            }
            PatientField::Hypertension => next.hypertension = expect_flag(field, value)?,
            PatientField::HeartDisease => next.heart_disease = expect_flag(field, value)?,
            PatientField::Bmi => {
                next.bmi = finite_in(field, expect_number(field, value)?, BMI_RANGE)?;
            }
            PatientField::Hba1cLevel => {
                next.hba1c_level = finite_in(field, expect_number(field, value)?, HBA1C_RANGE)?;
            }
            PatientField::BloodGlucoseLevel => {
                next.blood_glucose_level =
                    integer_in(field, expect_number(field, value)?, GLUCOSE_RANGE)? as u16;
            }
            PatientField::SmokingHistory => {
                next.smoking_history = match value {
                    FieldValue::Smoking(s) => s,
                    other => return Err(type_mismatch(field, other)),
                };
            }
        }
        Ok(next)
    }

    /// Replace the smoking category. Always valid: the enum cannot hold
    /// zero or several categories.
    pub fn with_smoking_history(mut self, smoking: SmokingHistory) -> Self {
        self.smoking_history = smoking;
        self
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn hypertension(&self) -> bool {
        self.hypertension
    }

    pub fn heart_disease(&self) -> bool {
        self.heart_disease
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    /// HbA1c in percent.
    pub fn hba1c_level(&self) -> f64 {
        self.hba1c_level
    }

    /// Blood glucose in mg/dL.
    pub fn blood_glucose_level(&self) -> u16 {
        self.blood_glucose_level
    }

    pub fn smoking_history(&self) -> SmokingHistory {
        self.smoking_history
    }
}

fn type_mismatch(field: PatientField, value: FieldValue) -> ValidationError {
    ValidationError::new(field, format!("unsupported value {value:?}"))
}

fn expect_number(field: PatientField, value: FieldValue) -> Result<f64, ValidationError> {
    match value {
        FieldValue::Number(n) => Ok(n),
        other => Err(type_mismatch(field, other)),
    }
}

fn expect_flag(field: PatientField, value: FieldValue) -> Result<bool, ValidationError> {
    match value {
        FieldValue::Flag(b) => Ok(b),
        FieldValue::Number(n) if n == 0.0 => Ok(false),
        FieldValue::Number(n) if n == 1.0 => Ok(true),
        FieldValue::Number(_) => Err(ValidationError::new(field, "must be 0 or 1")),
        other => Err(type_mismatch(field, other)),
    }
}

fn finite_in(
    field: PatientField,
    n: f64,
    range: RangeInclusive<f64>,
) -> Result<f64, ValidationError> {
    if !n.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if !range.contains(&n) {
        return Err(ValidationError::new(
            field,
            format!("{n} is outside [{}, {}]", range.start(), range.end()),
        ));
    }
    Ok(n)
}

fn integer_in(
    field: PatientField,
    n: f64,
    range: RangeInclusive<f64>,
) -> Result<u32, ValidationError> {
    let n = finite_in(field, n, range)?;
    if n.fract() != 0.0 {
        return Err(ValidationError::new(field, format!("{n} is not a whole number")));
    }
    Ok(n as u32)
}
