//! Delivery targets for finished exports and reports.
//!
//! Sinks receive content that is already fully encoded. A sink failure
//! surfaces as `ExportError` and never touches session state.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::default_export_dir;
use crate::export::{ExportArtifact, ExportError};
use crate::report::render_report_pdf;

/// Receives a finished export file.
pub trait DownloadSink {
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError>;
}

/// Receives report text.
pub trait ClipboardSink {
    fn write_text(&self, text: &str) -> Result<(), ExportError>;
}

/// Receives report text for printing.
pub trait PrintSink {
    fn print(&self, report: &str) -> Result<PathBuf, ExportError>;
}

// ═══════════════════════════════════════════════════════════
// Directory-backed sinks
// ═══════════════════════════════════════════════════════════

/// Writes each artifact into a directory under its export file name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sink writing into `~/GlycoCheck/exports`.
    pub fn default_location() -> Self {
        Self::new(default_export_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
        let path = write_into(&self.dir, &artifact.filename, &artifact.bytes)?;
        tracing::info!(
            path = %path.display(),
            mime = artifact.mime_type,
            bytes = artifact.bytes.len(),
            "Export written"
        );
        Ok(path)
    }
}

/// Renders the report as a PDF into a directory, ready for a print dialog.
#[derive(Debug, Clone)]
pub struct PdfFileSink {
    dir: PathBuf,
    filename: String,
}

impl PdfFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            filename: "diabetes_assessment_report.pdf".to_string(),
        }
    }

    /// Sink writing into `~/GlycoCheck/exports`.
    pub fn default_location() -> Self {
        Self::new(default_export_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }
}

impl PrintSink for PdfFileSink {
    fn print(&self, report: &str) -> Result<PathBuf, ExportError> {
        let pdf = render_report_pdf(report)?;
        let path = write_into(&self.dir, &self.filename, &pdf)?;
        tracing::info!(path = %path.display(), bytes = pdf.len(), "Report PDF written");
        Ok(path)
    }
}

fn write_into(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    if filename.is_empty() || filename.contains(['/', '\\']) {
        return Err(ExportError::SinkRejected {
            sink: "download",
            reason: format!("invalid file name {filename:?}"),
        });
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

// ═══════════════════════════════════════════════════════════
// In-memory clipboard
// ═══════════════════════════════════════════════════════════

/// Process-local clipboard. Holds the last text written.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ExportError> {
        let mut slot = self.contents.lock().map_err(|_| ExportError::SinkRejected {
            sink: "clipboard",
            reason: "clipboard lock poisoned".into(),
        })?;
        *slot = Some(text.to_string());
        tracing::debug!(chars = text.len(), "Report copied to clipboard");
        Ok(())
    }
}
