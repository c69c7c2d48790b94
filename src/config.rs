// src/config.rs
//! Watcher configuration: county selection, polling cadence, presentation.
//!
//! Values come from an optional TOML file (path overridable via
//! `POLLENS_CONFIG_PATH`), then env overrides, then validation. A missing
//! file is not an error; defaults cover everything.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::InvalidCountyCode;
use crate::scale::RiskScale;

pub const DEFAULT_CONFIG_PATH: &str = "config/pollens.toml";
pub const DEFAULT_COUNTY: &str = "60";
pub const DEFAULT_SCAN_INTERVAL_HOURS: u64 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 240;

pub const ENV_CONFIG_PATH: &str = "POLLENS_CONFIG_PATH";
pub const ENV_COUNTY: &str = "POLLENS_COUNTY";
pub const ENV_SCAN_INTERVAL_HOURS: &str = "POLLENS_SCAN_INTERVAL_HOURS";

/// Supported polling range; the feed itself updates a few times a day at most.
pub const MIN_SCAN_INTERVAL_HOURS: u64 = 3;
pub const MAX_SCAN_INTERVAL_HOURS: u64 = 24;

// Metropolitan departments 01..95 (including Corsican 2A/2B) and the
// overseas 971..976.
static COUNTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0[1-9]|[1-8][0-9]|9[0-5]|2[AB]|97[1-6])$").expect("county regex")
});

/// Validated French department code ("60", "2A", "971"), uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountyCode(String);

impl CountyCode {
    pub fn new(code: &str) -> Result<Self, InvalidCountyCode> {
        let canon = code.trim().to_ascii_uppercase();
        if COUNTY_RE.is_match(&canon) {
            Ok(Self(canon))
        } else {
            Err(InvalidCountyCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CountyCode {
    type Err = InvalidCountyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Runtime configuration for one watched county.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    /// Department code to poll.
    #[serde(default = "default_county")]
    pub county: String,
    /// Polling period in hours, clamped to the supported range.
    #[serde(default = "default_scan_interval_hours")]
    pub scan_interval_hours: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Render values as labels ("moyen") instead of raw integers.
    #[serde(default = "default_literal_states")]
    pub literal_states: bool,
    /// Pollen names to expose; empty means every known taxon.
    #[serde(default)]
    pub pollens: Vec<String>,
    /// Custom ordered label scale; empty means the standard one.
    #[serde(default)]
    pub risk_labels: Vec<String>,
}

fn default_county() -> String {
    DEFAULT_COUNTY.to_string()
}

fn default_scan_interval_hours() -> u64 {
    DEFAULT_SCAN_INTERVAL_HOURS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_literal_states() -> bool {
    true
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            county: default_county(),
            scan_interval_hours: default_scan_interval_hours(),
            timeout_secs: default_timeout_secs(),
            literal_states: default_literal_states(),
            pollens: Vec::new(),
            risk_labels: Vec::new(),
        }
    }
}

impl WatcherConfig {
    /// Load from the env-selected path, the default path, or defaults when
    /// no file exists; env overrides are applied last.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading config at {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("parsing config at {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.apply_env_overrides();
        cfg.normalize();
        cfg.county_code().context("validating county code")?;
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: WatcherConfig = toml::from_str(s).context("invalid watcher TOML")?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Validated form of the `county` field.
    pub fn county_code(&self) -> Result<CountyCode, InvalidCountyCode> {
        CountyCode::new(&self.county)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_hours * 3600)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn scale(&self) -> RiskScale {
        RiskScale::from_labels(self.risk_labels.clone())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(county) = std::env::var(ENV_COUNTY) {
            let county = county.trim();
            if !county.is_empty() {
                self.county = county.to_string();
            }
        }
        if let Some(hours) = std::env::var(ENV_SCAN_INTERVAL_HOURS)
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.scan_interval_hours = hours;
        }
    }

    fn normalize(&mut self) {
        self.scan_interval_hours = clamp_interval_hours(self.scan_interval_hours);
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        for pollen in &mut self.pollens {
            *pollen = pollen.trim().to_lowercase();
        }
        self.pollens.retain(|pollen| !pollen.is_empty());
    }
}

pub fn clamp_interval_hours(hours: u64) -> u64 {
    hours.clamp(MIN_SCAN_INTERVAL_HOURS, MAX_SCAN_INTERVAL_HOURS)
}
