//! Thin HTTP wrapper: bearer-authorized requests returning status + body.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::Result;

/// HTTP client issuing bearer-authorized JSON requests.
///
/// Transport faults (timeout, connection) surface as [`crate::Error`];
/// any completed exchange, whatever the status code, surfaces as an
/// [`HttpResponse`] for the caller to classify.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            inner: config.build_client()?,
        })
    }

    /// POST a JSON payload.
    #[instrument(skip(self, token, payload))]
    pub async fn post_json<P: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        payload: &P,
    ) -> Result<HttpResponse> {
        let response = self
            .inner
            .post(url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;

        HttpResponse::read(response).await
    }

    /// GET a resource.
    #[instrument(skip(self, token))]
    pub async fn get(&self, url: &str, token: &str) -> Result<HttpResponse> {
        let response = self.inner.get(url).bearer_auth(token).send().await?;

        HttpResponse::read(response).await
    }
}

/// A completed HTTP exchange: status code plus the full response body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: String,
}

impl HttpResponse {
    async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, body_len = body.len(), "response received");
        Ok(Self { status, body })
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_json_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/things"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&ClientConfig::default()).unwrap();
        let response = client
            .post_json(
                &format!("{}/things", mock_server.uri()),
                "tok",
                &serde_json::json!({"name": "a"}),
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&ClientConfig::default()).unwrap();
        let response = client
            .get(&format!("{}/missing", mock_server.uri()), "tok")
            .await
            .unwrap();

        assert!(!response.is_success());
        assert_eq!(response.status(), 404);
        assert_eq!(response.body(), "no such thing");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let config = ClientConfig::builder()
            .with_timeout(Duration::from_millis(50))
            .build();
        let client = HttpClient::new(&config).unwrap();

        let err = client
            .get(&format!("{}/slow", mock_server.uri()), "tok")
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_json_parse_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&ClientConfig::default()).unwrap();
        let response = client
            .get(&format!("{}/garbled", mock_server.uri()), "tok")
            .await
            .unwrap();

        assert!(response.json::<serde_json::Value>().is_err());
    }
}
