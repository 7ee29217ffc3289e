//! Per-record submission engine.
//!
//! One `submit` call fully resolves one record: acquire a token, POST the
//! payload, classify the response, and (for created records) fetch the
//! secondary business id. Retries happen inside the call with explicit
//! per-class bounds; the engine keeps no state across calls. Whether a
//! record should be submitted at all is the driver's business.

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use regpush_auth::TokenProvider;
use regpush_client::{HttpClient, HttpResponse, RetryConfig, RetryPolicy, truncate_message};

use crate::outcome::Submission;

/// Configuration for the upload engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Registry API base URL, no trailing slash required.
    pub base_url: String,
    /// Entity type created per record, e.g. "WaterFacility".
    pub entity: String,
    /// Business-id field read from the follow-up fetch.
    pub secondary_id_field: String,
    /// Bound and delay shared by the auth and timeout retry classes.
    pub retry: RetryConfig,
}

impl EngineConfig {
    /// Create a config for the given registry and entity type.
    pub fn new(base_url: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            entity: entity.into(),
            secondary_id_field: "wfId".to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Set the business-id field fetched after creation.
    pub fn with_secondary_id_field(mut self, field: impl Into<String>) -> Self {
        self.secondary_id_field = field.into();
        self
    }

    /// Set the retry bound and delay.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn create_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.entity)
    }

    fn fetch_url(&self, id: &str) -> String {
        format!("{}/{}", self.create_url(), id)
    }
}

/// Submits one payload at a time and classifies the response.
pub struct UploadEngine {
    config: EngineConfig,
    http: HttpClient,
    tokens: TokenProvider,
}

impl UploadEngine {
    /// Create a new engine.
    pub fn new(config: EngineConfig, http: HttpClient, tokens: TokenProvider) -> Self {
        Self {
            config,
            http,
            tokens,
        }
    }

    /// Submit one payload. Total: every fault folds into a FAILED outcome.
    ///
    /// The auth (401) and timeout classes retry independently, each bounded
    /// by the configured retry count; the serialized payload is reused
    /// across attempts, never re-transformed.
    #[instrument(skip(self, payload))]
    pub async fn submit<P: Serialize>(&mut self, payload: &P) -> Submission {
        let mut auth_retries = RetryPolicy::new(self.config.retry.max_retries);
        let mut timeout_retries = RetryPolicy::new(self.config.retry.max_retries);
        let create_url = self.config.create_url();

        loop {
            let token = match self.tokens.bearer_token().await {
                Ok(token) => token,
                Err(err) => return Submission::failed(truncate_message(&err.to_string())),
            };

            let response = match self.http.post_json(&create_url, &token, payload).await {
                Ok(response) => response,
                Err(err) if err.is_timeout() => {
                    if timeout_retries.try_again() {
                        debug!(attempt = timeout_retries.attempt(), "creation timed out, retrying");
                        sleep(self.config.retry.delay).await;
                        continue;
                    }
                    return Submission::failed("Timeout after retries");
                }
                Err(err) => return Submission::failed(truncate_message(&err.to_string())),
            };

            match response.status() {
                status if response.is_success() => {
                    debug!(status, "record created");
                    return self.complete_success(&response, &token).await;
                }
                401 => {
                    if auth_retries.try_again() {
                        debug!(attempt = auth_retries.attempt(), "token rejected, refreshing");
                        self.tokens.invalidate();
                        continue;
                    }
                    return Submission::failed(format!(
                        "Auth failed after {} retries",
                        self.config.retry.max_retries
                    ));
                }
                status if status >= 500 => {
                    return classify_server_error(status, response.body());
                }
                status => {
                    return Submission::failed(format!(
                        "HTTP {status}: {}",
                        truncate_message(response.body())
                    ));
                }
            }
        }
    }

    /// Extract the created-resource id and fetch the secondary business id.
    ///
    /// The outcome is SUCCESS whatever happens to the follow-up fetch; a
    /// failed fetch only leaves the secondary id empty.
    async fn complete_success(&self, response: &HttpResponse, token: &str) -> Submission {
        let parsed: serde_json::Value = match response.json() {
            Ok(value) => value,
            Err(err) => return Submission::failed(truncate_message(&err.to_string())),
        };

        let Some(remote_id) = parsed
            .get("result")
            .and_then(|r| r.get(&self.config.entity))
            .and_then(|e| e.get("osid"))
            .and_then(|v| v.as_str())
            .map(String::from)
        else {
            return Submission::failed(format!(
                "missing result.{}.osid in creation response",
                self.config.entity
            ));
        };

        let secondary_id = self.fetch_secondary_id(&remote_id, token).await;
        Submission::success(remote_id, secondary_id)
    }

    async fn fetch_secondary_id(&self, remote_id: &str, token: &str) -> Option<String> {
        let fetched = match self.http.get(&self.config.fetch_url(remote_id), token).await {
            Ok(response) if response.is_success() => response.json::<serde_json::Value>().ok(),
            Ok(response) => {
                warn!(remote_id, status = response.status(), "secondary id fetch failed");
                None
            }
            Err(err) => {
                warn!(remote_id, error = %err, "secondary id fetch failed");
                None
            }
        };

        fetched
            .as_ref()
            .and_then(|v| v.get(&self.config.secondary_id_field))
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

/// Classify a 5xx response as DUPLICATE or FAILED.
///
/// The registry reports unique-constraint violations as plain 5xx errors,
/// so duplicates are recognized by substring only. Any 5xx body that
/// happens to mention "duplicate" or "unique" classifies as DUPLICATE;
/// that is the remote API's observed contract, kept in this one function
/// so a structured error code can replace it later.
pub fn classify_server_error(status: u16, body: &str) -> Submission {
    let lowered = body.to_lowercase();
    if lowered.contains("duplicate") || lowered.contains("unique") {
        debug!(status, "server error classified as duplicate");
        Submission::duplicate("Duplicate record")
    } else {
        debug!(status, "server error classified as failure");
        Submission::failed(format!("Server error: {}", truncate_message(body)))
    }
}
