//! Structured JSON export.
//!
//! Shape: `{ "currentAssessment": Entry | null, "history": [Entry] }`. Each
//! entry nests the row-schema values and embeds the submitted record and the
//! full prediction verbatim, so the document can be read back losslessly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rows::{Cell, ExportRow, RowKind};
use super::{ExportError, ExportFormat};
use crate::models::{PatientRecord, PredictionResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDocument {
    pub current_assessment: Option<DocumentEntry>,
    pub history: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub id: String,
    /// Local wall-clock rendering, identical to the tabular exports.
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
    pub risk_level: String,
    pub probability: String,
    pub patient: DocumentPatient,
    pub patient_data: PatientRecord,
    pub prediction: PredictionResult,
}

/// Patient values as displayed in the tabular exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatient {
    pub age: u8,
    pub gender: String,
    pub bmi: f64,
    pub hba1c: f64,
    pub glucose: u16,
    pub hypertension: String,
    pub heart_disease: String,
    pub smoking: String,
}

impl DocumentEntry {
    pub fn from_row(row: &ExportRow<'_>) -> Self {
        Self {
            id: row.id.clone(),
            timestamp: row.timestamp_local.clone(),
            created_at: row.created_at,
            risk_level: row.risk_level.to_string(),
            probability: row.probability_percent.clone(),
            patient: DocumentPatient {
                age: row.age,
                gender: row.gender.to_string(),
                bmi: row.bmi,
                hba1c: row.hba1c,
                glucose: row.glucose,
                hypertension: row.hypertension.to_string(),
                heart_disease: row.heart_disease.to_string(),
                smoking: row.smoking.to_string(),
            },
            patient_data: *row.result.record(),
            prediction: *row.result,
        }
    }

    /// Values in row-schema order, for comparison with the tabular exports.
    pub fn cells(&self) -> [Cell; 12] {
        let p = &self.patient;
        [
            Cell::Text(self.id.clone()),
            Cell::Text(self.timestamp.clone()),
            Cell::Text(self.risk_level.clone()),
            Cell::Text(self.probability.clone()),
            Cell::Number(f64::from(p.age)),
            Cell::Text(p.gender.clone()),
            Cell::Number(p.bmi),
            Cell::Number(p.hba1c),
            Cell::Number(f64::from(p.glucose)),
            Cell::Text(p.hypertension.clone()),
            Cell::Text(p.heart_disease.clone()),
            Cell::Text(p.smoking.clone()),
        ]
    }
}

impl AssessmentDocument {
    pub fn from_rows(rows: &[ExportRow<'_>]) -> Self {
        let mut current_assessment = None;
        let mut history = Vec::with_capacity(rows.len());
        for row in rows {
            match row.kind {
                RowKind::Current => current_assessment = Some(DocumentEntry::from_row(row)),
                RowKind::History => history.push(DocumentEntry::from_row(row)),
            }
        }
        Self {
            current_assessment,
            history,
        }
    }

    /// All entries, CURRENT first.
    pub fn entries(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.current_assessment.iter().chain(self.history.iter())
    }
}

pub fn encode(rows: &[ExportRow<'_>]) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(&AssessmentDocument::from_rows(rows)).map_err(|e| {
        ExportError::Encoding {
            format: ExportFormat::Json,
            reason: e.to_string(),
        }
    })
}

/// Read a previously exported document back.
pub fn parse(bytes: &[u8]) -> Result<AssessmentDocument, ExportError> {
    serde_json::from_slice(bytes).map_err(|e| ExportError::Encoding {
        format: ExportFormat::Json,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    use crate::export::rows::build_rows;
    use crate::history::AssessmentHistory;
    use crate::models::{FieldValue, PatientField, RiskLabel, SmokingHistory};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 9, 10, minute, 0).unwrap()
    }

    fn result(age: f64, bmi: f64, probability: f64, smoking: SmokingHistory) -> PredictionResult {
        let record = PatientRecord::default()
            .set_field(PatientField::Age, FieldValue::Number(age))
            .unwrap()
            .set_field(PatientField::Bmi, FieldValue::Number(bmi))
            .unwrap()
            .with_smoking_history(smoking);
        let label = if probability >= 0.5 { RiskLabel::High } else { RiskLabel::Low };
        PredictionResult::new(label, probability, at(0), record).unwrap()
    }

    #[test]
    fn empty_state_document() {
        let bytes = encode(&[]).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({ "currentAssessment": null, "history": [] }));
    }

    #[test]
    fn top_level_keys_only() {
        let current = result(50.0, 31.0, 0.82, SmokingHistory::Never);
        let bytes = encode(&build_rows(Some(&current), &[])).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(value["currentAssessment"]["id"], "CURRENT");
        assert_eq!(value["currentAssessment"]["riskLevel"], "High Risk");
        assert_eq!(value["currentAssessment"]["probability"], "82.0%");
        assert_eq!(value["currentAssessment"]["patient"]["smoking"], "Never");
        assert_eq!(value["currentAssessment"]["patientData"]["HbA1c_level"], 5.5);
        assert_eq!(value["currentAssessment"]["prediction"]["prediction"], 1);
    }

    #[test]
    fn round_trip_reconstructs_records_and_results() {
        let mut history = AssessmentHistory::new();
        history.record(result(33.0, 22.4, 0.071_234_5, SmokingHistory::Former), at(1));
        history.record(result(67.0, 35.15, 0.912_345_678_9, SmokingHistory::NotCurrent), at(2));
        let current = result(50.0, 31.0, 0.82, SmokingHistory::Current);

        let bytes = encode(&build_rows(Some(&current), history.snapshot())).unwrap();
        let doc = parse(&bytes).unwrap();

        let restored_current = doc.current_assessment.as_ref().unwrap();
        assert_eq!(restored_current.prediction, current);
        assert_eq!(restored_current.patient_data, *current.record());

        assert_eq!(doc.history.len(), 2);
        for (entry, original) in doc.history.iter().zip(history.snapshot()) {
            assert_eq!(entry.id, original.id().to_string());
            assert_eq!(entry.created_at, original.created_at());
            assert_eq!(entry.prediction, *original.result());
            assert_eq!(entry.patient_data, *original.record());
        }
    }

    #[test]
    fn history_without_current() {
        let mut history = AssessmentHistory::new();
        history.record(result(40.0, 24.0, 0.2, SmokingHistory::Ever), at(3));
        let doc = AssessmentDocument::from_rows(&build_rows(None, history.snapshot()));
        assert!(doc.current_assessment.is_none());
        assert_eq!(doc.history.len(), 1);
        assert_eq!(doc.entries().count(), 1);
    }

    #[test]
    fn malformed_document_is_encoding_error() {
        let err = parse(b"{\"history\": 3}").unwrap_err();
        assert!(matches!(err, ExportError::Encoding { format: ExportFormat::Json, .. }));
    }
}
