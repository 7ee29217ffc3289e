//! Progress line formatting.

/// Format one status line for a run in flight.
///
/// Pure function of the counters: rate is processed/elapsed (0 when no time
/// has passed), ETA is remaining/rate in minutes (0 when the rate is 0).
pub fn format_progress(
    processed: usize,
    total: usize,
    success: usize,
    duplicate: usize,
    failed: usize,
    elapsed_secs: f64,
) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        processed as f64 * 100.0 / total as f64
    };
    let rate = if elapsed_secs > 0.0 {
        processed as f64 / elapsed_secs
    } else {
        0.0
    };
    let remaining = total.saturating_sub(processed);
    let eta_minutes = if rate > 0.0 {
        remaining as f64 / rate / 60.0
    } else {
        0.0
    };

    format!(
        "Progress: {processed}/{total} ({percent:.1}%) | OK: {success} | Dup: {duplicate} | Fail: {failed} | Rate: {rate:.1}/s | ETA: {eta_minutes:.1}m"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mid_run() {
        let line = format_progress(50, 200, 40, 5, 5, 25.0);
        assert_eq!(
            line,
            "Progress: 50/200 (25.0%) | OK: 40 | Dup: 5 | Fail: 5 | Rate: 2.0/s | ETA: 1.3m"
        );
    }

    #[test]
    fn test_zero_elapsed_yields_zero_rate_and_eta() {
        let line = format_progress(10, 100, 10, 0, 0, 0.0);
        assert!(line.contains("Rate: 0.0/s"));
        assert!(line.contains("ETA: 0.0m"));
    }

    #[test]
    fn test_final_record() {
        let line = format_progress(3, 3, 1, 1, 1, 1.5);
        assert!(line.starts_with("Progress: 3/3 (100.0%)"));
        assert!(line.contains("ETA: 0.0m"));
    }
}
