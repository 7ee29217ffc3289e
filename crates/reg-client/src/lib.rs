//! # regpush-client
//!
//! Core HTTP infrastructure for the regpush uploader.
//!
//! Provides a configured [`HttpClient`] with bounded timeouts, a transport
//! error taxonomy that separates timeouts and connection faults from HTTP
//! status responses, and a fixed-delay [`RetryPolicy`] with an explicit,
//! auditable attempt bound.
//!
//! Status-code classification (success, auth, duplicate, server error) is
//! deliberately NOT done here; the upload engine owns it. This crate only
//! answers "did the request complete, and with what status and body".

mod config;
mod error;
mod http;
mod retry;

pub use config::{parse_base_url, ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use http::{HttpClient, HttpResponse};
pub use retry::{RetryConfig, RetryPolicy};

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("regpush/", env!("CARGO_PKG_VERSION"));

/// Maximum characters of a response body or fault message carried into an
/// outcome message.
pub const MESSAGE_LIMIT: usize = 200;

/// Truncate a message to [`MESSAGE_LIMIT`] characters.
///
/// Counts characters, not bytes, so multi-byte text never splits mid-codepoint.
pub fn truncate_message(message: &str) -> String {
    message.chars().take(MESSAGE_LIMIT).collect()
}
