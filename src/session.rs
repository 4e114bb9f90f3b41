//! Assessment session: the live patient record, the current result, the
//! bounded history and the single in-flight prediction.
//!
//! The session is owned by one interactive caller and mutated sequentially.
//! A submission is split into `begin_submission` (takes a copy of the live
//! record) and `complete_submission` (commits the outcome), so the caller can
//! keep editing the record while the prediction call is suspended.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::export::{self, ExportArtifact, ExportError, ExportFormat};
use crate::history::{AssessmentHistory, HistoryEntry, HistoryStats, HistorySummary};
use crate::indicators::{self, ActionItem, RiskIndicators};
use crate::models::{FieldValue, PatientField, PatientRecord, PredictionResult, ValidationError};
use crate::prediction::{PredictionClient, PredictionError};
use crate::report::{self, EmptyResultError};
use crate::sinks::{ClipboardSink, DownloadSink, PrintSink};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    EmptyResult(#[from] EmptyResultError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

// ═══════════════════════════════════════════════════════════
// PendingPrediction
// ═══════════════════════════════════════════════════════════

/// Request id of the submission in flight, shared with its ticket.
type PendingSlot = Arc<Mutex<Option<Uuid>>>;

fn lock_slot(slot: &PendingSlot) -> MutexGuard<'_, Option<Uuid>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ticket for the prediction currently in flight.
///
/// Holds the record exactly as it was when the submission began. Dropping
/// the ticket without completing it releases the session's pending slot.
#[derive(Debug)]
pub struct PendingPrediction {
    request_id: Uuid,
    record: PatientRecord,
    started_at: DateTime<Utc>,
    slot: PendingSlot,
}

impl PendingPrediction {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Drop for PendingPrediction {
    fn drop(&mut self) {
        let mut pending = lock_slot(&self.slot);
        if *pending == Some(self.request_id) {
            *pending = None;
            tracing::info!(request_id = %self.request_id, "Prediction abandoned");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// AssessmentSession
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct AssessmentSession {
    record: PatientRecord,
    current: Option<PredictionResult>,
    history: AssessmentHistory,
    pending: PendingSlot,
}

impl AssessmentSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            history: AssessmentHistory::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Live, editable record.
    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    /// Assign one field. On error the live record is left untouched.
    pub fn set_field(
        &mut self,
        field: PatientField,
        value: FieldValue,
    ) -> Result<&PatientRecord, ValidationError> {
        self.record = self.record.set_field(field, value)?;
        Ok(&self.record)
    }

    pub fn reset_record(&mut self) {
        self.record = PatientRecord::default();
    }

    pub fn current_result(&self) -> Option<&PredictionResult> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &AssessmentHistory {
        &self.history
    }

    pub fn is_pending(&self) -> bool {
        lock_slot(&self.pending).is_some()
    }

    /// Clear the slot if `ticket` owns it.
    fn release(&self, ticket: &PendingPrediction) -> Result<(), PredictionError> {
        let mut pending = lock_slot(&self.pending);
        if *pending != Some(ticket.request_id) {
            return Err(PredictionError::StaleSubmission);
        }
        *pending = None;
        Ok(())
    }

    // ── Submission ──────────────────────────────────────────

    /// Start a submission for the live record.
    ///
    /// Rejected with `SubmissionPending` while another one is in flight.
    pub fn begin_submission(&mut self) -> Result<PendingPrediction, PredictionError> {
        let mut pending = lock_slot(&self.pending);
        if pending.is_some() {
            tracing::warn!("Submission rejected, a prediction is already in flight");
            return Err(PredictionError::SubmissionPending);
        }
        let ticket = PendingPrediction {
            request_id: Uuid::new_v4(),
            record: self.record,
            started_at: Utc::now(),
            slot: Arc::clone(&self.pending),
        };
        *pending = Some(ticket.request_id);
        drop(pending);
        tracing::info!(request_id = %ticket.request_id, "Prediction submitted");
        Ok(ticket)
    }

    /// Commit the outcome of `ticket`'s prediction call.
    ///
    /// On success the result becomes current and is archived in history. On
    /// failure the current result and history are left as they were. Either
    /// way the session stops being pending.
    pub fn complete_submission(
        &mut self,
        ticket: PendingPrediction,
        outcome: Result<PredictionResult, PredictionError>,
    ) -> Result<&HistoryEntry, PredictionError> {
        self.release(&ticket).map_err(|e| {
            tracing::warn!(request_id = %ticket.request_id, "Stale prediction ticket ignored");
            e
        })?;

        let result = outcome
            .and_then(|result| {
                if result.record() == &ticket.record {
                    Ok(result)
                } else {
                    Err(PredictionError::InvalidResponse(
                        "result does not describe the submitted record".into(),
                    ))
                }
            })
            .map_err(|e| {
                tracing::warn!(request_id = %ticket.request_id, error = %e, "Prediction failed");
                e
            })?;

        self.current = Some(result);
        let entry = self.history.record(result, Utc::now());
        tracing::info!(
            request_id = %ticket.request_id,
            assessment_id = %entry.id(),
            label = result.label().badge(),
            "Prediction completed"
        );
        Ok(entry)
    }

    /// Drop the in-flight submission without touching any result.
    pub fn cancel_submission(&mut self, ticket: &PendingPrediction) -> Result<(), PredictionError> {
        self.release(ticket)?;
        tracing::info!(request_id = %ticket.request_id, "Prediction cancelled");
        Ok(())
    }

    /// Begin, call `client` and complete in one step.
    ///
    /// Dropping the returned future before it resolves abandons the
    /// submission and frees the session for the next one.
    pub async fn submit<C: PredictionClient>(
        &mut self,
        client: &C,
    ) -> Result<&HistoryEntry, PredictionError> {
        let ticket = self.begin_submission()?;
        let outcome = client.predict(ticket.record()).await;
        self.complete_submission(ticket, outcome)
    }

    // ── Derived views ───────────────────────────────────────

    /// Indicators for the live record.
    pub fn indicators(&self) -> RiskIndicators {
        indicators::derive_indicators(&self.record)
    }

    pub fn action_items(&self) -> Option<&'static [ActionItem; 3]> {
        self.current
            .as_ref()
            .map(|r| indicators::derive_action_items(r.label()))
    }

    pub fn stats(&self) -> HistoryStats {
        self.history.stats()
    }

    pub fn history_summaries(&self) -> Vec<HistorySummary> {
        self.history.snapshot().iter().map(HistoryEntry::summary).collect()
    }

    // ── Export and report ───────────────────────────────────

    pub fn export(
        &self,
        format: ExportFormat,
        exported_at: DateTime<Utc>,
    ) -> Result<ExportArtifact, ExportError> {
        export::export(format, self.current.as_ref(), self.history.snapshot(), exported_at)
    }

    /// Encode and hand the artifact to `sink`.
    pub fn export_to(
        &self,
        format: ExportFormat,
        sink: &impl DownloadSink,
    ) -> Result<PathBuf, ExportError> {
        let artifact = self.export(format, Utc::now())?;
        sink.deliver(&artifact).map_err(|e| {
            tracing::warn!(format = %format, error = %e, "Export delivery failed");
            e
        })
    }

    /// Plaintext report for the current result and the record it scored.
    pub fn report(&self) -> Result<String, EmptyResultError> {
        let result = self.current.as_ref().ok_or(EmptyResultError)?;
        report::format_report(result.record(), Some(result))
    }

    pub fn copy_report(&self, clipboard: &impl ClipboardSink) -> Result<(), SessionError> {
        let text = self.report()?;
        clipboard.write_text(&text).map_err(|e| {
            tracing::warn!(error = %e, "Clipboard rejected report");
            e
        })?;
        Ok(())
    }

    pub fn print_report(&self, printer: &impl PrintSink) -> Result<PathBuf, SessionError> {
        let text = self.report()?;
        let path = printer.print(&text).map_err(|e| {
            tracing::warn!(error = %e, "Print sink rejected report");
            e
        })?;
        Ok(path)
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
