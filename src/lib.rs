//! Diabetes risk assessment session and export engine.
//!
//! A session holds a validated `PatientRecord`, sends snapshots of it to a
//! risk-scoring service through a `PredictionClient`, keeps the newest ten
//! results in a bounded history, and exports everything as a spreadsheet,
//! CSV or JSON document with identical per-row values.

pub mod config;
pub mod export;
pub mod history;
pub mod indicators;
pub mod models;
pub mod prediction;
pub mod report;
pub mod session;
pub mod sinks;

pub use session::{AssessmentSession, PendingPrediction, SessionError};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`, otherwise uses `config::default_log_filter()`. Returns
/// `false` when a subscriber was already installed.
pub fn init_tracing() -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_init_is_idempotent() {
        init_tracing();
        assert!(!init_tracing());
    }
}
