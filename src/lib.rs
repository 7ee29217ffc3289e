//! # regpush
//!
//! Resumable bulk uploader for registry APIs.
//!
//! Pushes a batch of tabular records into a remote registry one record at
//! a time, surviving crashes, network failures, and token expiry without
//! re-submitting already-accepted records. Progress is appended to a
//! pipe-delimited log file; re-running the tool skips every record the log
//! records as SUCCESS.
//!
//! ## Crates
//!
//! - **regpush-client** - HTTP infrastructure: timeouts, transport error
//!   taxonomy, bounded fixed-delay retry
//! - **regpush-auth** - client-credentials token exchange with
//!   expiry-margin caching
//! - **regpush-upload** - the upload core: engine, log, bulk driver
//!
//! The root crate adds the water-facility payload and CSV transform plus
//! the `regpush` binary.

pub mod facility;

// Re-export the member crates for convenient access
pub use regpush_auth as auth;
pub use regpush_client as client;
pub use regpush_upload as upload;
