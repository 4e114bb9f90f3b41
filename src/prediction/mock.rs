use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::{PredictionClient, PredictionError};
use crate::models::{PatientRecord, PredictionResult, RiskLabel};

/// Mock prediction client for testing: returns a configurable outcome.
pub struct MockPredictionClient {
    outcome: Result<(RiskLabel, f64), PredictionError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_record: Mutex<Option<PatientRecord>>,
}

impl MockPredictionClient {
    pub fn new(label: RiskLabel, probability: f64) -> Self {
        Self {
            outcome: Ok((label, probability)),
            delay: None,
            calls: AtomicUsize::new(0),
            last_record: Mutex::new(None),
        }
    }

    pub fn failing(error: PredictionError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
            last_record: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Record received by the most recent call.
    pub fn last_record(&self) -> Option<PatientRecord> {
        self.last_record.lock().ok().and_then(|r| *r)
    }
}

impl PredictionClient for MockPredictionClient {
    fn predict(
        &self,
        record: &PatientRecord,
    ) -> impl Future<Output = Result<PredictionResult, PredictionError>> + Send {
        let snapshot = *record;
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_record.lock() {
            *last = Some(snapshot);
        }
        let outcome = self.outcome.clone();
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let (label, probability) = outcome?;
            PredictionResult::new(label, probability, Utc::now(), snapshot)
                .map_err(PredictionError::InvalidResponse)
        }
    }
}
