// src/dataset.rs
//! Typed snapshot of one county fetch, plus the wire shapes it is built from.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;

use crate::config::CountyCode;
use crate::vocabulary;

/// Wire shape of the upstream county document.
#[derive(Debug, Clone, Deserialize)]
pub struct CountyRisksPayload {
    #[serde(rename = "countyName")]
    pub county_name: String,
    #[serde(rename = "riskLevel")]
    pub risk_level: u8,
    #[serde(default)]
    pub risks: Vec<PollenRiskEntry>,
}

/// One per-pollen entry inside the county document.
#[derive(Debug, Clone, Deserialize)]
pub struct PollenRiskEntry {
    #[serde(rename = "pollenName")]
    pub pollen_name: String,
    pub level: u8,
}

/// Complete result of one successful fetch.
///
/// A snapshot is immutable and replaced wholesale on every refresh; it is
/// never merged with a previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskDataset {
    pub county_code: CountyCode,
    /// Human-readable county name as reported upstream ("Oise").
    pub county_name: String,
    /// Lowercased upstream pollen name to risk level.
    pub pollen_levels: BTreeMap<String, u8>,
    /// County-wide aggregate, on the same scale as the per-pollen levels.
    pub aggregate_level: u8,
    pub fetched_at: DateTime<Utc>,
}

impl RiskDataset {
    /// Build a snapshot from the upstream payload. Entries whose name is not
    /// in the known vocabulary are logged, counted and skipped; everything
    /// else in the payload is preserved.
    pub fn from_payload(county_code: CountyCode, payload: CountyRisksPayload) -> Self {
        let mut pollen_levels = BTreeMap::new();
        for entry in payload.risks {
            if vocabulary::find(&entry.pollen_name).is_none() {
                tracing::warn!(
                    target: "pollens",
                    pollen = %entry.pollen_name,
                    county = %county_code,
                    "unknown pollen name from upstream, skipping"
                );
                counter!("pollens_skipped_pollens_total").increment(1);
                continue;
            }
            pollen_levels.insert(entry.pollen_name.to_lowercase(), entry.level);
        }
        Self {
            county_code,
            county_name: payload.county_name,
            pollen_levels,
            aggregate_level: payload.risk_level,
            fetched_at: Utc::now(),
        }
    }

    /// Level for a pollen name, tolerant of case and stripped diacritics.
    pub fn level_for(&self, name: &str) -> Option<u8> {
        if let Some(&level) = self.pollen_levels.get(&name.to_lowercase()) {
            return Some(level);
        }
        let species = vocabulary::find(name)?;
        self.pollen_levels.get(species.name).copied()
    }
}
