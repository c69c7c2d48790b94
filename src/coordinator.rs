// src/coordinator.rs
//! Refresh coordinator: drives periodic fetches for one county and holds the
//! current snapshot for readers.
//!
//! The coordinator is a cheap cloneable handle over shared state. The
//! refresh path replaces the snapshot wholesale; readers take an `Arc` and
//! never wait on the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::client::RiskSource;
use crate::config::{CountyCode, MAX_SCAN_INTERVAL_HOURS, MIN_SCAN_INTERVAL_HOURS};
use crate::dataset::RiskDataset;
use crate::error::{FetchError, FetchErrorKind};
use crate::metrics::ensure_metrics_described;

/// Where the coordinator sits in its refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    /// Created; no refresh has completed yet.
    #[default]
    Idle,
    /// A refresh is in flight.
    Refreshing,
    /// The last refresh succeeded.
    Ready,
    /// The last refresh failed; any earlier snapshot is retained.
    Failed,
}

/// Cloneable record of the most recent failed refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub kind: FetchErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Full refresh state; `state()` hands out clones of this.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    /// Latest good snapshot. Survives failed refreshes untouched.
    pub dataset: Option<Arc<RiskDataset>>,
    /// Failure of the most recent refresh, cleared by the next success.
    pub last_error: Option<RefreshFailure>,
    pub last_success: Option<DateTime<Utc>>,
    pub phase: RefreshPhase,
}

struct CoordinatorInner {
    source: Arc<dyn RiskSource>,
    county: CountyCode,
    interval: Duration,
    state: RwLock<RefreshState>,
    // Serializes refreshes: a scheduled tick and a manual refresh never
    // overlap, and double-start is caught under the same lock.
    refresh_gate: tokio::sync::Mutex<()>,
    phase_tx: watch::Sender<RefreshPhase>,
    shutdown_tx: watch::Sender<bool>,
    started: AtomicBool,
}

/// Handle to one county's refresh loop. Clones share all state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl RefreshCoordinator {
    /// A coordinator does nothing until `start` is called. The interval is
    /// clamped to the supported polling range.
    pub fn new(source: Arc<dyn RiskSource>, county: CountyCode, interval: Duration) -> Self {
        ensure_metrics_described();
        let interval = interval.clamp(
            Duration::from_secs(MIN_SCAN_INTERVAL_HOURS * 3600),
            Duration::from_secs(MAX_SCAN_INTERVAL_HOURS * 3600),
        );
        let (phase_tx, _) = watch::channel(RefreshPhase::Idle);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(CoordinatorInner {
                source,
                county,
                interval,
                state: RwLock::new(RefreshState::default()),
                refresh_gate: tokio::sync::Mutex::new(()),
                phase_tx,
                shutdown_tx,
                started: AtomicBool::new(false),
            }),
        }
    }

    /// One blocking refresh, then the periodic loop.
    ///
    /// On `Ok` the first snapshot is already installed, so a reader never
    /// sees an empty coordinator after a successful start. On `Err` nothing
    /// is recorded and nothing is scheduled: the coordinator is exactly as
    /// constructed and the caller decides what to do with the failure.
    /// Calling `start` again after success is a no-op.
    pub async fn start(&self) -> Result<(), FetchError> {
        let _gate = self.inner.refresh_gate.lock().await;
        if self.inner.started.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.set_phase(RefreshPhase::Refreshing);
        match self.fetch_once().await {
            Ok(dataset) => self.apply_success(dataset),
            Err(e) => {
                self.set_phase(RefreshPhase::Idle);
                return Err(e);
            }
        }

        self.inner.started.store(true, Ordering::SeqCst);
        self.spawn_refresh_loop();
        Ok(())
    }

    /// Fetch immediately, regardless of the schedule. Concurrent calls are
    /// serialized; failures are recorded in the state and also returned.
    pub async fn refresh_now(&self) -> Result<(), FetchError> {
        let _gate = self.inner.refresh_gate.lock().await;
        self.set_phase(RefreshPhase::Refreshing);
        match self.fetch_once().await {
            Ok(dataset) => {
                self.apply_success(dataset);
                Ok(())
            }
            Err(e) => {
                self.apply_failure(&e);
                Err(e)
            }
        }
    }

    /// Latest good snapshot, if any. Never waits on an in-flight refresh.
    pub fn current(&self) -> Option<Arc<RiskDataset>> {
        self.inner
            .state
            .read()
            .ok()
            .and_then(|st| st.dataset.clone())
    }

    /// Clone of the full refresh state.
    pub fn state(&self) -> RefreshState {
        self.inner
            .state
            .read()
            .map(|st| st.clone())
            .unwrap_or_default()
    }

    /// Phase updates; receivers wake on every finished refresh.
    pub fn subscribe(&self) -> watch::Receiver<RefreshPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Cancel future scheduled refreshes. Idempotent; an in-flight refresh
    /// finishes and its result still lands. `current` keeps serving the
    /// last snapshot.
    pub fn stop(&self) {
        self.inner.shutdown_tx.send_replace(true);
    }

    pub fn county(&self) -> &CountyCode {
        &self.inner.county
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /* ---- internals ---- */

    async fn fetch_once(&self) -> Result<RiskDataset, FetchError> {
        counter!("pollens_refresh_total").increment(1);
        self.inner.source.fetch(&self.inner.county).await
    }

    fn set_phase(&self, phase: RefreshPhase) {
        if let Ok(mut st) = self.inner.state.write() {
            st.phase = phase;
        }
        self.inner.phase_tx.send_replace(phase);
    }

    fn apply_success(&self, dataset: RiskDataset) {
        let now = Utc::now();
        let dataset = Arc::new(dataset);
        if let Ok(mut st) = self.inner.state.write() {
            st.dataset = Some(dataset.clone());
            st.last_error = None;
            st.last_success = Some(now);
            st.phase = RefreshPhase::Ready;
        }
        gauge!("pollens_last_refresh_ts").set(now.timestamp() as f64);
        tracing::info!(
            target: "refresh",
            source = self.inner.source.name(),
            county = %self.inner.county,
            county_name = %dataset.county_name,
            aggregate = dataset.aggregate_level,
            pollens = dataset.pollen_levels.len(),
            "snapshot updated"
        );
        self.inner.phase_tx.send_replace(RefreshPhase::Ready);
    }

    fn apply_failure(&self, e: &FetchError) {
        counter!("pollens_refresh_errors_total").increment(1);
        if let Ok(mut st) = self.inner.state.write() {
            st.last_error = Some(RefreshFailure {
                kind: e.kind(),
                message: e.to_string(),
                at: Utc::now(),
            });
            st.phase = RefreshPhase::Failed;
        }
        self.inner.phase_tx.send_replace(RefreshPhase::Failed);
    }

    fn spawn_refresh_loop(&self) {
        let coord = self.clone();
        let mut shutdown = self.inner.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(coord.inner.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval's first tick fires immediately and the initial
            // refresh already happened in start(); consume it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    // wait_for resolves to a watch read guard, which is not
                    // Send; drop it inside the block so the select output is.
                    _ = async { let _ = shutdown.wait_for(|stopped| *stopped).await; } => break,
                    _ = ticker.tick() => {
                        if let Err(e) = coord.refresh_now().await {
                            tracing::warn!(
                                target: "refresh",
                                county = %coord.inner.county,
                                "refresh tick failed: {e}"
                            );
                        }
                    }
                }
            }
            tracing::debug!(target: "refresh", county = %coord.inner.county, "refresh loop stopped");
        });
    }
}
