//! Plaintext assessment report for clipboard and print sinks.
//!
//! The report is a line-per-field projection of the same `ExportRow` the
//! exports use. `render_report_pdf` lays those lines out on one A4 page.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::export::{ExportError, ExportRow, RowKind, CURRENT_ROW_ID};
use crate::models::{PatientRecord, PredictionResult};

pub const REPORT_TITLE: &str = "Diabetes Risk Assessment Result:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No assessment result available yet")]
pub struct EmptyResultError;

/// Build the clipboard/print report for `record` and the result it produced.
///
/// Fails with `EmptyResultError` until a prediction has completed.
pub fn format_report(
    record: &PatientRecord,
    result: Option<&PredictionResult>,
) -> Result<String, EmptyResultError> {
    let result = result.ok_or(EmptyResultError)?;
    let row = ExportRow::project(
        RowKind::Current,
        CURRENT_ROW_ID.to_string(),
        record,
        result,
        result.retrieved_at(),
    );
    Ok(report_lines(&row).join("\n"))
}

fn report_lines(row: &ExportRow<'_>) -> Vec<String> {
    vec![
        REPORT_TITLE.to_string(),
        format!("Risk Level: {}", row.risk_level),
        format!("Probability: {}", row.probability_percent),
        format!("Age: {}", row.age),
        format!("Gender: {}", row.gender),
        format!("BMI: {}", row.bmi),
        format!("HbA1c: {}%", row.hba1c),
        format!("Blood Glucose: {} mg/dL", row.glucose),
        format!("Hypertension: {}", row.hypertension),
        format!("Heart Disease: {}", row.heart_disease),
        format!("Smoking: {}", row.smoking),
        format!("Timestamp: {}", row.timestamp_local),
    ]
}

/// Render a finished plaintext report as a single-page PDF. Returns PDF bytes.
pub fn render_report_pdf(report: &str) -> Result<Vec<u8>, ExportError> {
    let pdf_err = |e: String| ExportError::SinkRejected {
        sink: "print",
        reason: e,
    };

    let (doc, page1, layer1) =
        PdfDocument::new("Diabetes Risk Assessment", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| pdf_err(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| pdf_err(format!("PDF font error: {e}")))?;

    let mut y = Mm(280.0);
    let mut lines = report.lines();

    if let Some(title) = lines.next() {
        layer.use_text(title, 14.0, Mm(20.0), y, &bold);
        y -= Mm(10.0);
    }
    for line in lines {
        layer.use_text(line, 10.0, Mm(25.0), y, &font);
        y -= Mm(6.0);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| pdf_err(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| pdf_err(format!("PDF buffer error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::export::local_timestamp;
    use crate::models::{FieldValue, PatientField, RiskLabel, SmokingHistory};

    fn example() -> PredictionResult {
        let record = PatientRecord::default()
            .set_field(PatientField::Age, FieldValue::Number(50.0))
            .unwrap()
            .set_field(PatientField::Bmi, FieldValue::Number(31.0))
            .unwrap()
            .set_field(PatientField::Hba1cLevel, FieldValue::Number(6.6))
            .unwrap()
            .set_field(PatientField::BloodGlucoseLevel, FieldValue::Number(140.0))
            .unwrap()
            .with_smoking_history(SmokingHistory::Never);
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 14, 5, 6).unwrap();
        PredictionResult::new(RiskLabel::High, 0.82, at, record).unwrap()
    }

    #[test]
    fn report_without_result_fails() {
        let err = format_report(&PatientRecord::default(), None).unwrap_err();
        assert_eq!(err, EmptyResultError);
    }

    #[test]
    fn report_lists_fields_in_fixed_order() {
        let result = example();
        let text = format_report(result.record(), Some(&result)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[..11],
            [
                "Diabetes Risk Assessment Result:",
                "Risk Level: High Risk",
                "Probability: 82.0%",
                "Age: 50",
                "Gender: Female",
                "BMI: 31",
                "HbA1c: 6.6%",
                "Blood Glucose: 140 mg/dL",
                "Hypertension: No",
                "Heart Disease: No",
                "Smoking: Never",
            ]
        );
        assert_eq!(
            lines[11],
            format!("Timestamp: {}", local_timestamp(result.retrieved_at()))
        );
    }

    #[test]
    fn report_projects_given_record() {
        let result = example();
        let other = result
            .record()
            .set_field(PatientField::Age, FieldValue::Number(80.0))
            .unwrap();
        let text = format_report(&other, Some(&result)).unwrap();
        assert!(text.contains("Age: 80"));
        assert!(text.contains("Risk Level: High Risk"));
    }

    #[test]
    fn pdf_rendering_produces_pdf_bytes() {
        let result = example();
        let text = format_report(result.record(), Some(&result)).unwrap();
        let pdf = render_report_pdf(&text).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
