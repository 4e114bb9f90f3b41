use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patient::PatientRecord;

/// Binary risk class returned by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    pub fn code(self) -> u8 {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::High => 1,
        }
    }

    /// "High Risk" / "Low Risk".
    pub fn as_label(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low Risk",
            RiskLabel::High => "High Risk",
        }
    }

    /// Compact history badge.
    pub fn badge(self) -> &'static str {
        match self {
            RiskLabel::Low => "LOW",
            RiskLabel::High => "HIGH",
        }
    }
}

impl From<RiskLabel> for u8 {
    fn from(label: RiskLabel) -> Self {
        label.code()
    }
}

impl TryFrom<u8> for RiskLabel {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RiskLabel::Low),
            1 => Ok(RiskLabel::High),
            other => Err(format!("prediction must be 0 or 1, got {other}")),
        }
    }
}

/// Outcome of one prediction call, bound to the record that produced it.
///
/// The record is held by value, so later edits to the working record cannot
/// reach a stored result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PredictionResultRepr")]
pub struct PredictionResult {
    #[serde(rename = "prediction")]
    label: RiskLabel,
    probability: f64,
    #[serde(rename = "timestamp")]
    retrieved_at: DateTime<Utc>,
    #[serde(rename = "patientData")]
    record: PatientRecord,
}

#[derive(Deserialize)]
struct PredictionResultRepr {
    prediction: RiskLabel,
    probability: f64,
    timestamp: DateTime<Utc>,
    #[serde(rename = "patientData")]
    patient_data: PatientRecord,
}

impl TryFrom<PredictionResultRepr> for PredictionResult {
    type Error = String;

    fn try_from(repr: PredictionResultRepr) -> Result<Self, Self::Error> {
        PredictionResult::new(repr.prediction, repr.probability, repr.timestamp, repr.patient_data)
    }
}

impl PredictionResult {
    /// Build a result, rejecting probabilities outside [0, 1].
    pub fn new(
        label: RiskLabel,
        probability: f64,
        retrieved_at: DateTime<Utc>,
        record: PatientRecord,
    ) -> Result<Self, String> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(format!("probability must be within [0, 1], got {probability}"));
        }
        Ok(Self {
            label,
            probability,
            retrieved_at,
            record,
        })
    }

    pub fn label(&self) -> RiskLabel {
        self.label
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    /// Snapshot of the record that was submitted.
    pub fn record(&self) -> &PatientRecord {
        &self.record
    }
}
