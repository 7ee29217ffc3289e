//! # regpush-upload
//!
//! The upload core: submits records to a registry API one at a time,
//! classifies each response, and appends every outcome to a durable,
//! append-only log that later runs resume from.
//!
//! - [`UploadEngine`] - one payload in, one [`Submission`] out, with
//!   bounded auth and timeout retries inside the call
//! - [`UploadLog`] - the pipe-delimited progress log; a key logged SUCCESS
//!   is never resubmitted
//! - [`BulkDriver`] - iterates a batch, skips completed keys, logs every
//!   outcome, and emits periodic progress lines
//! - [`RecordTransform`] - the seam where raw rows become payloads
//!
//! Execution is strictly sequential: one record is fully resolved before
//! the next begins, so a terminated run leaves the log consistent through
//! the last processed record.

mod driver;
mod engine;
mod error;
mod log;
mod outcome;
mod progress;
mod transform;

pub use driver::{BulkDriver, DEFAULT_PROGRESS_INTERVAL};
pub use engine::{classify_server_error, EngineConfig, UploadEngine};
pub use error::{Error, ErrorKind, Result};
pub use log::{LogEntry, LogStats, UploadLog};
pub use outcome::{Outcome, RunSummary, Submission};
pub use progress::format_progress;
pub use transform::{RecordTransform, TransformError};
