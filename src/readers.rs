// src/readers.rs
//! Read-only views over the coordinator's snapshot: one reader per watched
//! pollen, plus literal and numeric views of the county aggregate.

use crate::config::WatcherConfig;
use crate::coordinator::RefreshCoordinator;
use crate::error::ReadError;
use crate::scale::RiskScale;
use crate::vocabulary::{self, PollenKind, PollenSpecies};

/// A rendered risk value: the numeric or the label form of one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskValue {
    Numeric(u8),
    Literal(String),
}

impl std::fmt::Display for RiskValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskValue::Numeric(level) => write!(f, "{level}"),
            RiskValue::Literal(label) => f.write_str(label),
        }
    }
}

/// Risk level of one pollen taxon in the watched county.
pub struct PollenReader {
    coordinator: RefreshCoordinator,
    species: &'static PollenSpecies,
    scale: RiskScale,
    literal: bool,
}

impl PollenReader {
    pub fn new(
        coordinator: RefreshCoordinator,
        species: &'static PollenSpecies,
        scale: RiskScale,
        literal: bool,
    ) -> Self {
        Self {
            coordinator,
            species,
            scale,
            literal,
        }
    }

    /// Stable identifier, e.g. `pollens_60_bouleau`.
    pub fn id(&self) -> String {
        format!(
            "pollens_{}_{}",
            self.coordinator.county(),
            self.species.slug
        )
    }

    pub fn name(&self) -> &'static str {
        self.species.name
    }

    pub fn kind(&self) -> PollenKind {
        self.species.kind
    }

    /// Raw level from the current snapshot.
    pub fn level(&self) -> Result<u8, ReadError> {
        let dataset = self
            .coordinator
            .current()
            .ok_or_else(|| ReadError::Unavailable {
                county: self.coordinator.county().to_string(),
            })?;
        dataset
            .level_for(self.species.name)
            .ok_or_else(|| ReadError::UnknownPollen {
                name: self.species.name.to_string(),
            })
    }

    /// Level mapped through the label scale.
    pub fn label(&self) -> Result<String, ReadError> {
        let level = self.level()?;
        self.scale.label(level).map(str::to_string)
    }

    /// The configured presentation: label when literal, integer otherwise.
    pub fn value(&self) -> Result<RiskValue, ReadError> {
        if self.literal {
            self.label().map(RiskValue::Literal)
        } else {
            self.level().map(RiskValue::Numeric)
        }
    }
}

/// County-wide aggregate risk, in literal or numeric form.
pub struct CountyRiskReader {
    coordinator: RefreshCoordinator,
    scale: RiskScale,
    numeric: bool,
}

impl CountyRiskReader {
    pub fn literal(coordinator: RefreshCoordinator, scale: RiskScale) -> Self {
        Self {
            coordinator,
            scale,
            numeric: false,
        }
    }

    pub fn numeric(coordinator: RefreshCoordinator, scale: RiskScale) -> Self {
        Self {
            coordinator,
            scale,
            numeric: true,
        }
    }

    /// `pollens_{county}`, with a `_risklevel` suffix on the numeric variant
    /// so the two ids never collide.
    pub fn id(&self) -> String {
        let base = format!("pollens_{}", self.coordinator.county());
        if self.numeric {
            format!("{base}_risklevel")
        } else {
            base
        }
    }

    /// County name from the current snapshot, once one exists.
    pub fn county_name(&self) -> Option<String> {
        self.coordinator.current().map(|d| d.county_name.clone())
    }

    pub fn level(&self) -> Result<u8, ReadError> {
        self.coordinator
            .current()
            .map(|d| d.aggregate_level)
            .ok_or_else(|| ReadError::Unavailable {
                county: self.coordinator.county().to_string(),
            })
    }

    pub fn value(&self) -> Result<RiskValue, ReadError> {
        let level = self.level()?;
        if self.numeric {
            Ok(RiskValue::Numeric(level))
        } else {
            self.scale.label(level).map(|l| RiskValue::Literal(l.to_string()))
        }
    }
}

/// Build the standard reader set for a config: one reader per enabled pollen
/// plus the two aggregate variants. An empty `pollens` list enables the whole
/// vocabulary.
pub fn build_readers(
    coordinator: &RefreshCoordinator,
    config: &WatcherConfig,
) -> (Vec<PollenReader>, Vec<CountyRiskReader>) {
    let scale = config.scale();
    let pollens = vocabulary::all()
        .iter()
        .filter(|sp| {
            config.pollens.is_empty()
                || config.pollens.iter().any(|p| vocabulary::find(p) == Some(*sp))
        })
        .map(|sp| PollenReader::new(coordinator.clone(), sp, scale.clone(), config.literal_states))
        .collect();
    let aggregates = vec![
        CountyRiskReader::literal(coordinator.clone(), scale.clone()),
        CountyRiskReader::numeric(coordinator.clone(), scale),
    ];
    (pollens, aggregates)
}
