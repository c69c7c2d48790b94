// src/error.rs
//! Error types for the fetch and read paths.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single fetch attempt against the upstream pollen feed.
///
/// One attempt per call; the next scheduled refresh is the retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },
    #[error("malformed upstream body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// Coarse classification, kept in the coordinator's failure record.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Status { .. } => FetchErrorKind::Status,
            FetchError::Parse(_) => FetchErrorKind::Parse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Timeout,
    Status,
    Parse,
}

/// Failure reported by a reader querying the current snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("no pollen data available yet for county {county}")]
    Unavailable { county: String },
    #[error("pollen {name:?} is not present in the current snapshot")]
    UnknownPollen { name: String },
    #[error("risk level {level} has no label on a {scale_len}-entry scale")]
    LevelOutOfRange { level: u8, scale_len: usize },
}

/// County code that does not match the French department format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid county code {0:?} (expected a department code such as \"60\", \"2A\" or \"971\")")]
pub struct InvalidCountyCode(pub String);
