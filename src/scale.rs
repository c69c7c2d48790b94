// src/scale.rs
//! Ordered label scale that turns an integer risk level into a phrase.

use crate::error::ReadError;

/// Labels the upstream feed currently pairs with levels 0..=3.
pub const RNSA_LABELS: [&str; 4] = ["nul", "faible", "moyen", "élevé"];

/// Ordered list of labels; the index is the risk level.
///
/// The scale is configurable so a label-set change upstream (earlier feeds
/// used six levels) does not require a code change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskScale {
    labels: Vec<String>,
}

impl Default for RiskScale {
    fn default() -> Self {
        Self::rnsa()
    }
}

impl RiskScale {
    /// The standard four-label scale of the current feed.
    pub fn rnsa() -> Self {
        Self {
            labels: RNSA_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build from a custom ordered label list; empty input falls back to the
    /// standard scale.
    pub fn from_labels(labels: Vec<String>) -> Self {
        if labels.is_empty() {
            Self::rnsa()
        } else {
            Self { labels }
        }
    }

    /// Label for a level, or an error when the level falls off the scale.
    pub fn label(&self, level: u8) -> Result<&str, ReadError> {
        self.labels
            .get(level as usize)
            .map(String::as_str)
            .ok_or(ReadError::LevelOutOfRange {
                level,
                scale_len: self.labels.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
