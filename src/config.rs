use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "GlycoCheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of assessments retained in session history.
pub const HISTORY_CAPACITY: usize = 10;

/// Prediction service used when nothing else is configured.
pub const DEFAULT_PREDICTION_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_PREDICTION_URL: &str = "GLYCOCHECK_PREDICTION_URL";
pub const ENV_PREDICTION_TIMEOUT: &str = "GLYCOCHECK_PREDICTION_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "glycocheck_lib=info"
}

/// Get the application data directory
/// ~/GlycoCheck/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default target directory for exported files and printed reports.
pub fn default_export_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Connection settings for the prediction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionConfig {
    /// Base URL; `/predict` is appended per request.
    pub base_url: String,
    /// Whole-request timeout. Expiry surfaces as `PredictionError::Timeout`.
    pub timeout: Duration,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PREDICTION_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PredictionConfig {
    /// Read overrides from the environment. Missing or unusable values keep
    /// the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_PREDICTION_URL) {
            let url = url.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                config.base_url = url.trim_end_matches('/').to_string();
            } else {
                tracing::warn!(value = url, "Ignoring {ENV_PREDICTION_URL}: not an http(s) URL");
            }
        }

        if let Some(raw) = lookup(ENV_PREDICTION_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "Ignoring {ENV_PREDICTION_TIMEOUT}: expected positive integer"),
            }
        }

        config
    }
}
