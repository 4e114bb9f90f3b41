use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use super::{PredictionClient, PredictionError};
use crate::config::PredictionConfig;
use crate::models::{PatientPayload, PatientRecord, PredictionResponse, PredictionResult, RiskLabel};

/// HTTP client for the remote risk-scoring service (`POST /predict`).
pub struct HttpPredictionClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPredictionClient {
    pub fn new(config: &PredictionConfig) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PredictionError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout: config.timeout,
        })
    }

    /// Client configured from `GLYCOCHECK_PREDICTION_*` environment variables.
    pub fn from_env() -> Result<Self, PredictionError> {
        Self::new(&PredictionConfig::from_env())
    }

    pub fn endpoint(&self) -> String {
        format!("{}/predict", self.base_url)
    }

    fn classify(&self, e: reqwest::Error) -> PredictionError {
        if e.is_timeout() {
            PredictionError::Timeout(self.timeout.as_millis() as u64)
        } else if e.is_connect() {
            PredictionError::Connection(self.base_url.clone())
        } else {
            PredictionError::HttpClient(e.to_string())
        }
    }
}

impl PredictionClient for HttpPredictionClient {
    fn predict(
        &self,
        record: &PatientRecord,
    ) -> impl Future<Output = Result<PredictionResult, PredictionError>> + Send {
        let snapshot = *record;
        async move {
            let payload = PatientPayload::from(snapshot);

            let response = self
                .client
                .post(self.endpoint())
                .json(&payload)
                .send()
                .await
                .map_err(|e| self.classify(e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PredictionError::ServiceStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: PredictionResponse = response.json().await.map_err(|e| {
                if e.is_timeout() {
                    self.classify(e)
                } else {
                    PredictionError::ResponseParsing(e.to_string())
                }
            })?;

            let label =
                RiskLabel::try_from(parsed.prediction).map_err(PredictionError::InvalidResponse)?;
            PredictionResult::new(label, parsed.probability, Utc::now(), snapshot)
                .map_err(PredictionError::InvalidResponse)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::models::{FieldValue, PatientField, SmokingHistory};

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String, timeout: Duration) -> HttpPredictionClient {
        HttpPredictionClient::new(&PredictionConfig { base_url, timeout }).unwrap()
    }

    fn sample() -> PatientRecord {
        PatientRecord::default()
            .set_field(PatientField::Age, FieldValue::Number(50.0))
            .unwrap()
            .set_field(PatientField::Bmi, FieldValue::Number(31.0))
            .unwrap()
            .with_smoking_history(SmokingHistory::Current)
    }

    #[tokio::test]
    async fn posts_payload_and_parses_result() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let router = Router::new()
            .route(
                "/predict",
                post(
                    |State(seen): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                        *seen.lock().unwrap() = Some(body);
                        Json(json!({ "prediction": 1, "probability": 0.82 }))
                    },
                ),
            )
            .with_state(seen.clone());
        let base = spawn_stub(router).await;

        let record = sample();
        let result = client_for(base, Duration::from_secs(5))
            .predict(&record)
            .await
            .unwrap();

        assert_eq!(result.label(), RiskLabel::High);
        assert_eq!(result.probability(), 0.82);
        assert_eq!(*result.record(), record);

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["age"], 50);
        assert_eq!(body["bmi"], 31.0);
        assert_eq!(body["smoking_history_current"], 1);
        assert_eq!(body["smoking_history_never"], 0);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let router = Router::new().route(
            "/predict",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad payload").into_response() }),
        );
        let base = spawn_stub(router).await;

        let err = client_for(base, Duration::from_secs(5))
            .predict(&sample())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PredictionError::ServiceStatus {
                status: 422,
                body: "bad payload".into()
            }
        );
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let router = Router::new().route(
            "/predict",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "prediction": 0, "probability": 0.1 }))
            }),
        );
        let base = spawn_stub(router).await;

        let err = client_for(base, Duration::from_millis(200))
            .predict(&sample())
            .await
            .unwrap_err();
        assert_eq!(err, PredictionError::Timeout(200));
    }

    #[tokio::test]
    async fn out_of_range_probability_rejected() {
        let router = Router::new().route(
            "/predict",
            post(|| async { Json(json!({ "prediction": 1, "probability": 1.7 })) }),
        );
        let base = spawn_stub(router).await;

        let err = client_for(base, Duration::from_secs(5))
            .predict(&sample())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let router = Router::new().route("/predict", post(|| async { "not json" }));
        let base = spawn_stub(router).await;

        let err = client_for(base, Duration::from_secs(5))
            .predict(&sample())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::ResponseParsing(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{addr}"), Duration::from_secs(5))
            .predict(&sample())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::Connection(_)));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let client = client_for("http://localhost:8000/".into(), Duration::from_secs(1));
        assert_eq!(client.endpoint(), "http://localhost:8000/predict");
    }
}
