//! Bearer token acquisition and caching.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, instrument};

use regpush_client::truncate_message;

use crate::config::AuthConfig;
use crate::error::{Error, ErrorKind, Result};

/// Time buffer subtracted from token expiry so a token is never presented
/// when it could expire mid-request.
pub const EXPIRY_SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// A cached access token with its absolute expiry instant.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Valid means: still at least the safety margin away from expiry.
    fn is_valid(&self) -> bool {
        Instant::now() + EXPIRY_SAFETY_MARGIN < self.expires_at
    }
}

/// Token response from the identity endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Obtains and caches a bearer token via the client-credentials grant.
///
/// The cached token is mutated only by a successful exchange; a failed
/// exchange leaves the cache untouched. All methods take `&mut self`: in
/// the strictly sequential engine the exclusive borrow is the single-flight
/// discipline, with no lock and no shared global.
pub struct TokenProvider {
    config: AuthConfig,
    http: reqwest::Client,
    cached: Option<CachedToken>,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("config", &self.config)
            .field("cached", &self.cached.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl TokenProvider {
    /// Create a new token provider.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            cached: None,
        }
    }

    /// Return a bearer token valid for at least the safety margin from now,
    /// exchanging credentials when the cache is missing or expiring.
    pub async fn bearer_token(&mut self) -> Result<String> {
        if let Some(token) = self.cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }

        debug!("cached token missing or near expiry, exchanging credentials");
        let fresh = self.exchange().await?;
        let value = fresh.access_token.clone();
        self.cached = Some(fresh);
        debug!("token refreshed");
        Ok(value)
    }

    /// Drop the cached token so the next call re-exchanges.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Perform the client-credentials exchange.
    #[instrument(skip(self))]
    async fn exchange(&self) -> Result<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", &self.config.client_id),
            ("client_secret", self.config.client_secret()),
        ];
        let body = serde_urlencoded::to_string(params)?;

        let response = self
            .http
            .post(&self.config.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::new(ErrorKind::Exchange {
                status,
                message: truncate_message(&message),
            }));
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}
