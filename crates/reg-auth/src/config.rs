//! Identity configuration and client-secret sourcing.

use crate::error::{Error, ErrorKind, Result};

/// Configuration for the client-credentials grant.
///
/// The `client_secret` is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone)]
pub struct AuthConfig {
    /// Identity token endpoint URL.
    pub token_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    client_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl AuthConfig {
    /// Create a new auth config.
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Get the client secret (for internal use).
    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

/// Read the client secret from an environment variable.
pub fn secret_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::new(ErrorKind::EnvVar(var.to_string()))),
    }
}

/// Read the client secret from an environment variable, falling back to an
/// interactive masked prompt when the variable is unset or empty.
pub fn secret_from_env_or_prompt(var: &str, prompt: &str) -> Result<String> {
    match secret_from_env(var) {
        Ok(value) => Ok(value),
        Err(_) => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| Error::with_source(ErrorKind::Prompt(e.to_string()), e)),
    }
}
