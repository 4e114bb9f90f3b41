//! Prediction client boundary.
//!
//! A client takes a patient record, sends it to the risk-scoring service and
//! returns a `PredictionResult` carrying a copy of that record. Clients hold
//! no session state and never retry.

pub mod http;
pub mod mock;

pub use http::*;
pub use mock::*;

use std::future::Future;

use thiserror::Error;

use crate::models::PatientRecord;
use crate::models::PredictionResult;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("Prediction service is not reachable at {0}")]
    Connection(String),

    #[error("Prediction request timed out after {0} ms")]
    Timeout(u64),

    #[error("Prediction service returned error (status {status}): {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Invalid prediction response: {0}")]
    InvalidResponse(String),

    #[error("A prediction request is already in flight")]
    SubmissionPending,

    #[error("Prediction ticket does not match the pending request")]
    StaleSubmission,
}

/// Anything that can score a patient record.
pub trait PredictionClient {
    /// Score `record`. Implementations copy the record before suspending, so
    /// the caller may keep editing its own copy while the call is pending.
    fn predict(
        &self,
        record: &PatientRecord,
    ) -> impl Future<Output = Result<PredictionResult, PredictionError>> + Send;
}
