// src/metrics.rs
//! Metric registration for the refresh pipeline.
//!
//! Only the `metrics` facade is used; installing a recorder or exporter is
//! the embedding host's concern. With no recorder installed every emission
//! is a no-op.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time registration so the series carry descriptions once a recorder
/// shows up. Safe to call from every constructor.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "pollens_refresh_total",
            "Refresh attempts, successful or not."
        );
        describe_counter!(
            "pollens_refresh_errors_total",
            "Refreshes that ended in a fetch error."
        );
        describe_counter!(
            "pollens_skipped_pollens_total",
            "Upstream pollen entries outside the known vocabulary."
        );
        describe_histogram!("pollens_fetch_ms", "Upstream fetch time in milliseconds.");
        describe_gauge!(
            "pollens_last_refresh_ts",
            "Unix timestamp of the last successful refresh."
        );
    });
}
