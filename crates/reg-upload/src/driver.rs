//! Bulk upload driver.
//!
//! Iterates input rows in order, skips keys the log already records as
//! SUCCESS, submits the rest one at a time, and appends every outcome to
//! the log before moving on. A terminated run therefore leaves the log
//! consistent through the last fully processed record.

use std::time::Instant;

use tracing::{info, warn};

use crate::engine::UploadEngine;
use crate::error::Result;
use crate::log::{LogEntry, UploadLog};
use crate::outcome::{Outcome, RunSummary};
use crate::progress::format_progress;
use crate::transform::RecordTransform;

/// Default number of records between progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// Drives one upload run over a batch of input rows.
pub struct BulkDriver<T: RecordTransform> {
    engine: UploadEngine,
    log: UploadLog,
    transform: T,
    progress_interval: usize,
}

impl<T: RecordTransform> BulkDriver<T> {
    /// Create a new driver.
    pub fn new(engine: UploadEngine, log: UploadLog, transform: T) -> Self {
        Self {
            engine,
            log,
            transform,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Set how many records pass between progress lines.
    pub fn with_progress_interval(mut self, every: usize) -> Self {
        self.progress_interval = every.max(1);
        self
    }

    /// The upload log this driver appends to.
    pub fn log(&self) -> &UploadLog {
        &self.log
    }

    /// Process every row not already completed, in input order.
    ///
    /// Per-record faults never abort the run: each attempted record gets
    /// exactly one log entry and the loop advances. Only a log append
    /// failure is fatal, since without the log there is nothing to resume
    /// from.
    pub async fn run(
        &mut self,
        rows: &[T::Row],
        mut on_progress: impl FnMut(&str),
    ) -> Result<RunSummary> {
        let completed = self.log.completed_keys()?;
        let pending: Vec<&T::Row> = rows
            .iter()
            .filter(|row| !completed.contains(&self.transform.item_key(row)))
            .collect();

        let total = pending.len();
        let mut success = 0usize;
        let mut duplicate = 0usize;
        let mut failed = 0usize;
        let start = Instant::now();

        info!(total, skipped = rows.len() - total, "starting upload run");

        for (index, row) in pending.iter().enumerate() {
            let processed = index + 1;
            let item_key = self.transform.item_key(row);

            match self.transform.transform(row) {
                Ok(payload) => {
                    let submission = self.engine.submit(&payload).await;
                    self.log
                        .append(&LogEntry::from_submission(&item_key, &submission))?;
                    match submission.outcome {
                        Outcome::Success => success += 1,
                        Outcome::Duplicate => duplicate += 1,
                        Outcome::Failed => failed += 1,
                    }
                }
                Err(err) => {
                    warn!(item_key = %item_key, error = %err, "row transform failed");
                    self.log.append(&LogEntry::new(
                        &item_key,
                        Outcome::Failed,
                        format!("Transform error: {err}"),
                    ))?;
                    failed += 1;
                }
            }

            if processed % self.progress_interval == 0 || processed == total {
                on_progress(&format_progress(
                    processed,
                    total,
                    success,
                    duplicate,
                    failed,
                    start.elapsed().as_secs_f64(),
                ));
            }
        }

        let summary = RunSummary {
            total,
            success,
            duplicate,
            failed,
            duration_seconds: start.elapsed().as_secs_f64(),
        };
        info!(
            total = summary.total,
            success = summary.success,
            duplicate = summary.duplicate,
            failed = summary.failed,
            "upload run finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::transform::TransformError;
    use regpush_auth::{AuthConfig, TokenProvider};
    use regpush_client::{ClientConfig, HttpClient};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Rows are (key, transformable) pairs.
    struct PairTransform;

    impl RecordTransform for PairTransform {
        type Row = (String, bool);
        type Payload = serde_json::Value;

        fn item_key(&self, row: &Self::Row) -> String {
            row.0.clone()
        }

        fn transform(&self, row: &Self::Row) -> std::result::Result<Self::Payload, TransformError> {
            if row.1 {
                Ok(serde_json::json!({"geoCode": row.0}))
            } else {
                Err(TransformError::missing_field("water_point_type"))
            }
        }
    }

    async fn start_registry() -> (MockServer, Arc<AtomicU32>) {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "expires_in": 3600,
            })))
            .mount(&server)
            .await;

        let posts = Arc::new(AtomicU32::new(0));
        let posts_clone = posts.clone();
        Mock::given(method("POST"))
            .and(path("/api/v1/WaterFacility"))
            .respond_with(move |req: &wiremock::Request| {
                posts_clone.fetch_add(1, Ordering::SeqCst);
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                let key = body["geoCode"].as_str().unwrap().to_string();
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "result": {"WaterFacility": {"osid": format!("os-{key}")}}
                }))
            })
            .mount(&server)
            .await;

        // Secondary-id fetches 404; success must not depend on them.
        (server, posts)
    }

    fn driver_for(server: &MockServer, log: UploadLog) -> BulkDriver<PairTransform> {
        let config = EngineConfig::new(format!("{}/api/v1", server.uri()), "WaterFacility");
        let http = HttpClient::new(&ClientConfig::default()).unwrap();
        let tokens = TokenProvider::new(AuthConfig::new(
            format!("{}/auth/token", server.uri()),
            "demo-api",
            "s3cret",
        ));
        BulkDriver::new(UploadEngine::new(config, http, tokens), log, PairTransform)
    }

    fn rows(keys: &[(&str, bool)]) -> Vec<(String, bool)> {
        keys.iter().map(|(k, ok)| (k.to_string(), *ok)).collect()
    }

    #[tokio::test]
    async fn test_every_record_gets_one_log_entry() {
        let (server, posts) = start_registry().await;
        let dir = tempfile::tempdir().unwrap();
        let log = UploadLog::new(dir.path().join("progress.txt"));
        let mut driver = driver_for(&server, log.clone());

        let summary = driver
            .run(&rows(&[("A", true), ("B", false), ("C", true)]), |_| {})
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.failed, 1);

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("B|FAILED|Transform error: missing required field 'water_point_type'"));
        // The untransformable row never reached the network.
        assert_eq!(posts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rerun_skips_completed_keys() {
        let (server, posts) = start_registry().await;
        let dir = tempfile::tempdir().unwrap();
        let log = UploadLog::new(dir.path().join("progress.txt"));

        let batch = rows(&[("A", true), ("B", true)]);

        let first = driver_for(&server, log.clone())
            .run(&batch, |_| {})
            .await
            .unwrap();
        assert_eq!(first.success, 2);
        assert_eq!(posts.load(Ordering::SeqCst), 2);

        // Fresh driver, same log: nothing left to submit.
        let second = driver_for(&server, log.clone())
            .run(&batch, |_| {})
            .await
            .unwrap();
        assert_eq!(second.total, 0);
        assert_eq!(posts.load(Ordering::SeqCst), 2);
        assert_eq!(log.stats().unwrap().success, 2);
    }

    #[tokio::test]
    async fn test_progress_cadence_and_final_record() {
        let (server, _posts) = start_registry().await;
        let dir = tempfile::tempdir().unwrap();
        let log = UploadLog::new(dir.path().join("progress.txt"));
        let mut driver = driver_for(&server, log).with_progress_interval(2);

        let mut lines = Vec::new();
        driver
            .run(
                &rows(&[("A", true), ("B", true), ("C", true), ("D", true), ("E", true)]),
                |line| lines.push(line.to_string()),
            )
            .await
            .unwrap();

        // Every second record, plus the final one.
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Progress: 2/5"));
        assert!(lines[1].starts_with("Progress: 4/5"));
        assert!(lines[2].starts_with("Progress: 5/5 (100.0%)"));
    }

    #[tokio::test]
    async fn test_empty_batch_emits_no_progress() {
        let (server, _posts) = start_registry().await;
        let dir = tempfile::tempdir().unwrap();
        let log = UploadLog::new(dir.path().join("progress.txt"));
        let mut driver = driver_for(&server, log);

        let mut lines = Vec::new();
        let summary = driver.run(&[], |line: &str| lines.push(line.to_string())).await.unwrap();

        assert_eq!(summary.total, 0);
        assert!(lines.is_empty());
    }
}
