//! Export engine: current assessment + history → spreadsheet, CSV or JSON.
//!
//! All three encoders read the same `ExportRow` values (see `rows`). No
//! encoder derives a label or a number on its own.

pub mod csv;
pub mod document;
pub mod rows;
pub mod spreadsheet;

pub use document::{AssessmentDocument, DocumentEntry, DocumentPatient};
pub use rows::*;
pub use spreadsheet::{SheetLayout, SHEET_NAME};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::history::HistoryEntry;
use crate::models::PredictionResult;

/// Prefix shared by every exported file name.
pub const EXPORT_FILE_STEM: &str = "diabetes_assessments";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Spreadsheet,
    Csv,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Spreadsheet, ExportFormat::Csv, ExportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json;charset=utf-8",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    /// Content could not be encoded into the requested format.
    #[error("Export encoding error ({format}): {reason}")]
    Encoding { format: ExportFormat, reason: String },

    /// A sink refused the finished content.
    #[error("{sink} sink rejected content: {reason}")]
    SinkRejected { sink: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Finished export, ready for a download sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `diabetes_assessments_<YYYY-MM-DD>.<ext>`, dated by export time (UTC).
pub fn export_filename(format: ExportFormat, exported_at: DateTime<Utc>) -> String {
    format!(
        "{EXPORT_FILE_STEM}_{}.{}",
        exported_at.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Encode the current result (if any) and the history snapshot.
///
/// A missing current result only removes the CURRENT row; an empty session
/// still exports a header-only table or an empty document.
pub fn export(
    format: ExportFormat,
    current: Option<&PredictionResult>,
    history: &[HistoryEntry],
    exported_at: DateTime<Utc>,
) -> Result<ExportArtifact, ExportError> {
    let rows = build_rows(current, history);
    let bytes = match format {
        ExportFormat::Spreadsheet => spreadsheet::encode(&rows)?,
        ExportFormat::Csv => csv::encode(&rows)?,
        ExportFormat::Json => document::encode(&rows)?,
    };

    tracing::debug!(format = %format, rows = rows.len(), bytes = bytes.len(), "Export encoded");

    Ok(ExportArtifact {
        filename: export_filename(format, exported_at),
        mime_type: format.mime_type(),
        bytes,
    })
}
