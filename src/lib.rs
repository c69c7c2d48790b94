// src/lib.rs
// Public library surface for integration tests (and embedding hosts).

pub mod client;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod readers;
pub mod scale;
pub mod vocabulary;

// ---- Re-exports for stable public API ----
pub use crate::client::{PollensClient, RiskSource, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use crate::config::{CountyCode, WatcherConfig};
pub use crate::coordinator::{RefreshCoordinator, RefreshFailure, RefreshPhase, RefreshState};
pub use crate::dataset::{CountyRisksPayload, PollenRiskEntry, RiskDataset};
pub use crate::error::{FetchError, FetchErrorKind, InvalidCountyCode, ReadError};
pub use crate::readers::{build_readers, CountyRiskReader, PollenReader, RiskValue};
pub use crate::scale::RiskScale;
pub use crate::vocabulary::{PollenKind, PollenSpecies};
