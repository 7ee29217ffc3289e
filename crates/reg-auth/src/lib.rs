//! # regpush-auth
//!
//! Credential lifecycle for the regpush uploader.
//!
//! A [`TokenProvider`] owns the one cached bearer token, obtained through a
//! client-credentials exchange and refreshed whenever the cached token is
//! within the expiry safety margin. The provider is an explicit instance
//! injected into the upload engine; there is no ambient token state.
//!
//! ## Security
//!
//! - Secrets and tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages never carry credential values

mod config;
mod error;
mod token;

pub use config::{AuthConfig, secret_from_env, secret_from_env_or_prompt};
pub use error::{Error, ErrorKind, Result};
pub use token::{EXPIRY_SAFETY_MARGIN, TokenProvider};
