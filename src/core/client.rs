use crate::core::{
    ConfigProvider, FailureReason, PixelSource, PredictionOutcome, PredictionResponse, Predictor,
    ServiceInfo,
};
use crate::utils::error::{PredictError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Posts the current drawing to the prediction endpoint.
///
/// One call is one request: no retries, no timeout, no caching. Callers that
/// need a deadline wrap the future themselves.
pub struct PredictionClient<S: PixelSource, C: ConfigProvider> {
    source: S,
    config: C,
    client: Client,
}

impl<S: PixelSource, C: ConfigProvider> PredictionClient<S, C> {
    pub fn new(source: S, config: C) -> Self {
        Self::with_http_client(source, config, Client::new())
    }

    pub fn with_http_client(source: S, config: C, client: Client) -> Self {
        Self {
            source,
            config,
            client,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Inverted, row-major flattened pixels as a JSON array.
    pub fn serialize_pixels(&self) -> Result<String> {
        let pixels = self.source.pixels();
        let inverted = self.source.invert(pixels);
        let flattened = self.source.flatten(inverted);
        Ok(serde_json::to_string(&flattened)?)
    }

    pub async fn predict_digit(&self) -> Result<PredictionOutcome> {
        let body = self.serialize_pixels()?;
        let url = self.config.endpoint_url();

        if self.config.log_payload() {
            tracing::debug!(payload = %body, "Prediction request body");
        }
        tracing::debug!("Posting {} bytes to {}", body.len(), url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Prediction response status: {}", status);

        if !status.is_success() {
            let detail = rejection_detail(response.bytes().await);
            tracing::warn!(
                "Prediction rejected with status {}: {}",
                status,
                detail.as_deref().unwrap_or("<no detail>")
            );
            return Ok(PredictionOutcome::Failed(FailureReason::Rejected {
                status: status.as_u16(),
                detail,
            }));
        }

        let raw = response.bytes().await?;
        match serde_json::from_slice::<PredictionResponse>(&raw) {
            Ok(decoded) => {
                tracing::info!("Predicted digit: {}", decoded.prediction);
                Ok(PredictionOutcome::Predicted(decoded.prediction))
            }
            Err(e) => {
                tracing::warn!("Could not decode prediction response: {}", e);
                Ok(PredictionOutcome::Failed(FailureReason::MalformedResponse {
                    detail: e.to_string(),
                }))
            }
        }
    }

    pub async fn health_check(&self) -> Result<ServiceInfo> {
        let url = self
            .config
            .info_url()
            .ok_or_else(|| PredictError::MissingConfig {
                field: "info_url".to_string(),
            })?;

        tracing::debug!("Checking prediction service at {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Service info request failed: {}", status);
            return Err(PredictError::ServiceUnavailable {
                status: status.as_u16(),
            });
        }

        let raw = response.bytes().await?;
        let info: ServiceInfo = serde_json::from_slice(&raw)?;
        tracing::info!("Service '{}' is up", info.service);
        Ok(info)
    }
}

fn rejection_detail<B: AsRef<[u8]>>(body: reqwest::Result<B>) -> Option<String> {
    match body {
        Ok(raw) => error_detail(raw.as_ref()),
        Err(e) => {
            tracing::debug!("Could not read rejection body: {}", e);
            None
        }
    }
}

// Failure bodies look like {"error": "..."}; anything else carries no detail.
fn error_detail(raw: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(raw).ok()?;
    match value.get("error")? {
        serde_json::Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait::async_trait]
impl<S: PixelSource, C: ConfigProvider> Predictor for PredictionClient<S, C> {
    async fn predict_digit(&self) -> Result<PredictionOutcome> {
        PredictionClient::predict_digit(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pixels::GridPixelSource;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct MockConfig {
        endpoint_url: String,
        info_url: Option<String>,
        log_payload: bool,
    }

    impl MockConfig {
        fn new(endpoint_url: String) -> Self {
            Self {
                endpoint_url,
                info_url: None,
                log_payload: true,
            }
        }

        fn with_payload_logging(mut self, enabled: bool) -> Self {
            self.log_payload = enabled;
            self
        }

        fn with_info_url(mut self, info_url: String) -> Self {
            self.info_url = Some(info_url);
            self
        }
    }

    impl ConfigProvider for MockConfig {
        fn endpoint_url(&self) -> &str {
            &self.endpoint_url
        }

        fn info_url(&self) -> Option<&str> {
            self.info_url.as_deref()
        }

        fn log_payload(&self) -> bool {
            self.log_payload
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    // Debug-level subscriber for the current thread, writing into `logs`.
    fn capture_logs(logs: &CapturedLogs) -> tracing::subscriber::DefaultGuard {
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn checkerboard_client(endpoint: String) -> PredictionClient<GridPixelSource<u8>, MockConfig> {
        let source = GridPixelSource::grayscale(vec![vec![0, 255], vec![255, 0]]);
        PredictionClient::new(source, MockConfig::new(endpoint))
    }

    #[test]
    fn test_serialize_pixels_inverts_then_flattens() {
        let client = checkerboard_client("http://unused".to_string());
        assert_eq!(client.serialize_pixels().unwrap(), "[255,0,0,255]");
    }

    #[test]
    fn test_serialize_pixels_matches_row_major_inversion() {
        let grid = vec![vec![0u8, 17, 34], vec![51, 68, 85], vec![102, 119, 255]];
        let source = GridPixelSource::grayscale(grid.clone());
        let client = PredictionClient::new(source, MockConfig::new("http://unused".to_string()));

        let decoded: Vec<u8> = serde_json::from_str(&client.serialize_pixels().unwrap()).unwrap();
        let expected: Vec<u8> = grid.into_iter().flatten().map(|v| 255 - v).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_serialize_pixels_is_stable_and_lossless() {
        let source = GridPixelSource::normalized(vec![vec![0.0, 0.125], vec![0.5, 1.0]]);
        let client = PredictionClient::new(source, MockConfig::new("http://unused".to_string()));

        let first = client.serialize_pixels().unwrap();
        let second = client.serialize_pixels().unwrap();
        assert_eq!(first, second);

        let decoded: Vec<f64> = serde_json::from_str(&first).unwrap();
        assert_eq!(decoded, vec![1.0, 0.875, 0.5, 0.0]);
        assert_eq!(serde_json::to_string(&decoded).unwrap(), first);
    }

    #[test]
    fn test_serialize_pixels_reflects_grid_updates() {
        let client = checkerboard_client("http://unused".to_string());
        client.source().set_pixels(vec![vec![255, 255]]);
        assert_eq!(client.serialize_pixels().unwrap(), "[0,0]");
    }

    #[test]
    fn test_serialize_pixels_encodes_non_finite_as_null() {
        let source = GridPixelSource::new(vec![vec![f64::NAN, 0.0]], 1.0);
        let client = PredictionClient::new(source, MockConfig::new("http://unused".to_string()));
        assert_eq!(client.serialize_pixels().unwrap(), "[null,1.0]");
    }

    #[tokio::test]
    async fn test_predict_digit_returns_decoded_prediction() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/predict")
                .header("content-type", "application/json")
                .body("[255,0,0,255]");
            then.status(200).json_body(json!({ "prediction": 7 }));
        });

        let client = checkerboard_client(server.url("/predict"));
        let outcome = client.predict_digit().await.unwrap();

        mock.assert();
        assert_eq!(outcome, PredictionOutcome::Predicted(7));
    }

    #[tokio::test]
    async fn test_payload_is_logged_when_enabled() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({ "prediction": 7 }));
        });

        let logs = CapturedLogs::default();
        let _guard = capture_logs(&logs);

        let client = checkerboard_client(server.url("/predict"));
        client.predict_digit().await.unwrap();

        let output = logs.contents();
        assert!(output.contains("payload=[255,0,0,255]"), "{}", output);
    }

    #[tokio::test]
    async fn test_payload_is_not_logged_when_disabled() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({ "prediction": 7 }));
        });

        let logs = CapturedLogs::default();
        let _guard = capture_logs(&logs);

        let source = GridPixelSource::grayscale(vec![vec![0, 255], vec![255, 0]]);
        let config = MockConfig::new(server.url("/predict")).with_payload_logging(false);
        let client = PredictionClient::new(source, config);
        client.predict_digit().await.unwrap();

        let output = logs.contents();
        // other debug events still arrive, only the body is withheld
        assert!(output.contains("Posting 13 bytes"), "{}", output);
        assert!(!output.contains("payload="), "{}", output);
        assert!(!output.contains("[255,0,0,255]"), "{}", output);
    }

    #[tokio::test]
    async fn test_unreadable_rejection_body_is_logged_and_dropped() {
        let read_error = Client::new().get("not a url").send().await.unwrap_err();

        let logs = CapturedLogs::default();
        let _guard = capture_logs(&logs);

        assert_eq!(rejection_detail::<Vec<u8>>(Err(read_error)), None);
        assert!(logs.contents().contains("Could not read rejection body"));
    }

    #[test]
    fn test_rejection_detail_reads_error_field() {
        let body = br#"{"error": "Invalid sample length: 4"}"#.to_vec();
        assert_eq!(
            rejection_detail(Ok(body)),
            Some("Invalid sample length: 4".to_string())
        );
        assert_eq!(rejection_detail(Ok(b"{}".to_vec())), None);
    }

    #[tokio::test]
    async fn test_predict_digit_reports_rejection_without_erroring() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(500)
                .json_body(json!({ "error": "Server failed to process request" }));
        });

        let client = checkerboard_client(server.url("/predict"));
        let outcome = client.predict_digit().await.unwrap();

        mock.assert();
        assert_eq!(
            outcome,
            PredictionOutcome::Failed(FailureReason::Rejected {
                status: 500,
                detail: Some("Server failed to process request".to_string()),
            })
        );
        assert_eq!(outcome.prediction(), None);
    }

    #[tokio::test]
    async fn test_predict_digit_rejection_with_non_json_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(422).body("unprocessable");
        });

        let client = checkerboard_client(server.url("/predict"));
        let outcome = client.predict_digit().await.unwrap();

        assert_eq!(
            outcome,
            PredictionOutcome::Failed(FailureReason::Rejected {
                status: 422,
                detail: None,
            })
        );
    }

    #[tokio::test]
    async fn test_predict_digit_treats_undecodable_body_as_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({ "label": 7 }));
        });

        let client = checkerboard_client(server.url("/predict"));
        let outcome = client.predict_digit().await.unwrap();

        assert!(matches!(
            outcome,
            PredictionOutcome::Failed(FailureReason::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_predict_digit_propagates_transport_errors() {
        // nothing listens on port 1
        let client = checkerboard_client("http://127.0.0.1:1/predict".to_string());
        let result = client.predict_digit().await;

        assert!(matches!(result, Err(PredictError::Transport(_))));
    }

    #[tokio::test]
    async fn test_predict_digit_propagates_unusable_url() {
        let client = checkerboard_client("not a url".to_string());
        let result = client.predict_digit().await;

        assert!(matches!(result, Err(PredictError::Transport(_))));
    }

    #[tokio::test]
    async fn test_predict_digit_sends_empty_grid() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/predict").body("[]");
            then.status(200).json_body(json!({ "prediction": 0 }));
        });

        let source = GridPixelSource::grayscale(vec![]);
        let client = PredictionClient::new(source, MockConfig::new(server.url("/predict")));

        assert_eq!(client.serialize_pixels().unwrap(), "[]");
        let outcome = client.predict_digit().await.unwrap();

        mock.assert();
        assert_eq!(outcome.prediction(), Some(0));
    }

    #[tokio::test]
    async fn test_concurrent_predictions_are_independent_requests() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({ "prediction": 3 }));
        });

        let client = checkerboard_client(server.url("/predict"));
        let (first, second) = tokio::join!(client.predict_digit(), client.predict_digit());

        mock.assert_hits(2);
        assert_eq!(first.unwrap(), PredictionOutcome::Predicted(3));
        assert_eq!(second.unwrap(), PredictionOutcome::Predicted(3));
    }

    #[tokio::test]
    async fn test_health_check_decodes_service_info() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200)
                .json_body(json!({ "service": "mnist-predictor", "uptime": "0:05:12" }));
        });

        let source = GridPixelSource::grayscale(vec![]);
        let config = MockConfig::new(server.url("/predict")).with_info_url(server.url("/api"));
        let client = PredictionClient::new(source, config);

        let info = client.health_check().await.unwrap();

        mock.assert();
        assert_eq!(info.service, "mnist-predictor");
        assert_eq!(info.uptime, json!("0:05:12"));
    }

    #[tokio::test]
    async fn test_health_check_requires_info_url() {
        let client = checkerboard_client("http://unused".to_string());
        let err = client.health_check().await.unwrap_err();

        assert!(matches!(err, PredictError::MissingConfig { field } if field == "info_url"));
    }

    #[tokio::test]
    async fn test_health_check_reports_unavailable_service() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(503);
        });

        let source = GridPixelSource::grayscale(vec![]);
        let config = MockConfig::new(server.url("/predict")).with_info_url(server.url("/api"));
        let client = PredictionClient::new(source, config);

        let err = client.health_check().await.unwrap_err();
        assert!(matches!(err, PredictError::ServiceUnavailable { status: 503 }));
    }
}
