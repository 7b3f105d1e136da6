//! Vision REST API client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use croploc_models::DetectionResult;
use reqwest::{Client, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::credentials::{load_default_credentials, AccessTokenProvider};
use crate::error::{VisionError, VisionResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};
use crate::token_cache::TokenCache;
use crate::types::{BatchAnnotateImagesRequest, BatchAnnotateImagesResponse};

/// Vision client configuration.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the Vision API
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Maximum number of objects requested per submission
    pub max_results: u32,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_results: 10,
            retry: RetryConfig::default(),
        }
    }
}

impl VisionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("VISION_ENDPOINT")
                .unwrap_or_else(|_| "https://vision.googleapis.com".to_string()),
            timeout: Duration::from_secs(
                std::env::var("VISION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("VISION_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            max_results: std::env::var("VISION_MAX_RESULTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            retry: RetryConfig::from_env(),
        }
    }
}

/// Client for the Vision object-localization endpoint.
pub struct VisionClient {
    http: Client,
    config: VisionConfig,
    token_cache: Arc<TokenCache>,
}

impl Clone for VisionClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            token_cache: Arc::clone(&self.token_cache),
        }
    }
}

impl VisionClient {
    /// Create a new Vision client from a config and token provider.
    pub fn new(
        config: VisionConfig,
        provider: Arc<dyn AccessTokenProvider>,
    ) -> VisionResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("croploc-vision/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(VisionError::Network)?;

        Ok(Self {
            http,
            config,
            token_cache: Arc::new(TokenCache::new(provider)),
        })
    }

    /// Create from environment variables, loading default credentials.
    pub fn from_env() -> VisionResult<Self> {
        let provider =
            load_default_credentials().map_err(|e| VisionError::auth(e.to_string()))?;
        Self::new(VisionConfig::from_env(), provider)
    }

    /// Submit an encoded image for object localization.
    ///
    /// Issues a single request by default (retry is opt-in, see
    /// [`RetryConfig`]). The response is normalized so that a service-reported
    /// error discards any entries returned alongside it.
    pub async fn localize_objects(&self, image: &[u8]) -> VisionResult<DetectionResult> {
        if image.is_empty() {
            return Err(VisionError::request_failed("empty submission buffer"));
        }

        let body =
            BatchAnnotateImagesRequest::object_localization(BASE64.encode(image), self.config.max_results);
        let url = format!("{}/v1/images:annotate", self.config.endpoint);

        debug!(bytes = image.len(), "Submitting image for object localization");

        self.execute_request("localize_objects", async {
            with_retry(&self.config.retry, "localize_objects", || {
                self.send_annotate(&url, &body)
            })
            .await
        })
        .await
    }

    /// Issue one annotate call, replaying once on a stale access token.
    async fn send_annotate(
        &self,
        url: &str,
        body: &BatchAnnotateImagesRequest,
    ) -> VisionResult<DetectionResult> {
        let token = self.token_cache.get_token().await?;
        let mut response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?;
        let mut status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.token_cache.invalidate().await;
            let token = self.token_cache.get_token().await?;
            response = self
                .http
                .post(url)
                .bearer_auth(&token)
                .json(body)
                .send()
                .await?;
            status = response.status();
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VisionError::from_http_status(
                status.as_u16(),
                format!("{} failed: {}", url, text),
            ));
        }

        let text = response.text().await.unwrap_or_default();
        let batch: BatchAnnotateImagesResponse = serde_json::from_str(&text).map_err(|e| {
            VisionError::invalid_response(format!(
                "Failed to parse annotate response: {} (body prefix: {})",
                e,
                &text[..text.len().min(200)]
            ))
        })?;

        Self::normalize_response(batch)
    }

    /// Map the wire response into a [`DetectionResult`].
    fn normalize_response(batch: BatchAnnotateImagesResponse) -> VisionResult<DetectionResult> {
        let response = batch
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::invalid_response("empty batch response"))?;

        if let Some(error) = response.error {
            if !error.message.is_empty() {
                return Ok(DetectionResult::from_remote_error(error.message));
            }
        }

        Ok(DetectionResult::success(
            response
                .localized_object_annotations
                .into_iter()
                .map(Into::into)
                .collect(),
        ))
    }

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(&self, operation: &str, fut: F) -> VisionResult<T>
    where
        F: std::future::Future<Output = VisionResult<T>>,
    {
        let span = info_span!("vision_request", operation = %operation);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }
}
