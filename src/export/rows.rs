//! Canonical export rows.
//!
//! Every encoder (spreadsheet, CSV, JSON document) and the plaintext report
//! consume `ExportRow` values built here, so labels, percentages and
//! timestamps are computed exactly once per assessment.

use chrono::{DateTime, Local, Utc};

use crate::history::HistoryEntry;
use crate::models::{PatientRecord, PredictionResult};

/// Id used for the in-progress assessment row.
pub const CURRENT_ROW_ID: &str = "CURRENT";

/// Column header and spreadsheet width hint (in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub width: u16,
}

/// Row schema, in output order.
pub const COLUMNS: [Column; 12] = [
    Column { header: "Assessment ID", width: 15 },
    Column { header: "Timestamp", width: 20 },
    Column { header: "Risk Level", width: 12 },
    Column { header: "Probability", width: 12 },
    Column { header: "Age", width: 8 },
    Column { header: "Gender", width: 10 },
    Column { header: "BMI", width: 8 },
    Column { header: "HbA1c Level", width: 12 },
    Column { header: "Blood Glucose", width: 15 },
    Column { header: "Hypertension", width: 12 },
    Column { header: "Heart Disease", width: 12 },
    Column { header: "Smoking Status", width: 15 },
];

/// A single output value. Numbers stay numeric for the spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Text form shared by the delimited and plaintext outputs.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Current,
    History,
}

/// One assessment, fully projected into display values.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow<'a> {
    pub kind: RowKind,
    pub id: String,
    pub timestamp_local: String,
    pub risk_level: &'static str,
    pub probability_percent: String,
    pub age: u8,
    pub gender: &'static str,
    pub bmi: f64,
    pub hba1c: f64,
    pub glucose: u16,
    pub hypertension: &'static str,
    pub heart_disease: &'static str,
    pub smoking: &'static str,
    /// Result the row was projected from (its record snapshot included).
    pub result: &'a PredictionResult,
    pub created_at: DateTime<Utc>,
}

impl<'a> ExportRow<'a> {
    pub fn project(
        kind: RowKind,
        id: String,
        record: &PatientRecord,
        result: &'a PredictionResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            id,
            timestamp_local: local_timestamp(created_at),
            risk_level: result.label().as_label(),
            probability_percent: format_probability(result.probability()),
            age: record.age(),
            gender: record.gender().label(),
            bmi: record.bmi(),
            hba1c: record.hba1c_level(),
            glucose: record.blood_glucose_level(),
            hypertension: yes_no(record.hypertension()),
            heart_disease: yes_no(record.heart_disease()),
            smoking: record.smoking_history().label(),
            result,
            created_at,
        }
    }

    /// Row for the current, not-yet-archived result.
    pub fn current(result: &'a PredictionResult) -> Self {
        Self::project(
            RowKind::Current,
            CURRENT_ROW_ID.to_string(),
            result.record(),
            result,
            result.retrieved_at(),
        )
    }

    pub fn from_entry(entry: &'a HistoryEntry) -> Self {
        Self::project(
            RowKind::History,
            entry.id().to_string(),
            entry.record(),
            entry.result(),
            entry.created_at(),
        )
    }

    /// Values in `COLUMNS` order.
    pub fn cells(&self) -> [Cell; 12] {
        [
            Cell::Text(self.id.clone()),
            Cell::Text(self.timestamp_local.clone()),
            Cell::Text(self.risk_level.to_string()),
            Cell::Text(self.probability_percent.clone()),
            Cell::Number(f64::from(self.age)),
            Cell::Text(self.gender.to_string()),
            Cell::Number(self.bmi),
            Cell::Number(self.hba1c),
            Cell::Number(f64::from(self.glucose)),
            Cell::Text(self.hypertension.to_string()),
            Cell::Text(self.heart_disease.to_string()),
            Cell::Text(self.smoking.to_string()),
        ]
    }
}

/// CURRENT (if any) first, then history in store order (newest first).
pub fn build_rows<'a>(
    current: Option<&'a PredictionResult>,
    history: &'a [HistoryEntry],
) -> Vec<ExportRow<'a>> {
    let mut rows = Vec::with_capacity(history.len() + 1);
    if let Some(result) = current {
        rows.push(ExportRow::current(result));
    }
    rows.extend(history.iter().map(ExportRow::from_entry));
    rows
}

/// `0.8234` → `"82.3%"`. Ties round away from zero (`0.0625` → `"6.3%"`).
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", (probability * 1000.0).round() / 10.0)
}

/// Local wall-clock rendering, e.g. `3/14/2026, 9:30:00 AM`.
pub fn local_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
