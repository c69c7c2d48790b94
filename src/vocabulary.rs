// src/vocabulary.rs
//! Fixed vocabulary of the pollen taxa reported by the upstream feed.
//!
//! Upstream names arrive capitalized and accented ("Châtaignier"). Lookups
//! here are case-insensitive and tolerate stripped diacritics, so "chene",
//! "Chêne" and "CHÊNE" all resolve to the same taxon.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Broad classification of a taxon, surfaced as reader metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollenKind {
    Tree,
    Grass,
}

/// One known pollen taxon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollenSpecies {
    /// Canonical lowercase name as reported upstream.
    pub name: &'static str,
    /// ASCII identifier used in reader ids.
    pub slug: &'static str,
    pub kind: PollenKind,
}

const fn species(name: &'static str, slug: &'static str, kind: PollenKind) -> PollenSpecies {
    PollenSpecies { name, slug, kind }
}

/// Everything the feed is known to report, in upstream listing order.
const SPECIES: &[PollenSpecies] = &[
    species("tilleul", "tilleul", PollenKind::Tree),
    species("ambroisies", "ambroisies", PollenKind::Grass),
    species("olivier", "olivier", PollenKind::Tree),
    species("plantain", "plantain", PollenKind::Grass),
    species("noisetier", "noisetier", PollenKind::Tree),
    species("aulne", "aulne", PollenKind::Tree),
    species("armoise", "armoise", PollenKind::Grass),
    species("châtaignier", "chataignier", PollenKind::Tree),
    species("urticacées", "urticacees", PollenKind::Grass),
    species("oseille", "oseille", PollenKind::Grass),
    species("graminées", "graminees", PollenKind::Grass),
    species("chêne", "chene", PollenKind::Tree),
    species("platane", "platane", PollenKind::Tree),
    species("bouleau", "bouleau", PollenKind::Tree),
    species("charme", "charme", PollenKind::Tree),
    species("peuplier", "peuplier", PollenKind::Tree),
    species("frêne", "frene", PollenKind::Tree),
    species("saule", "saule", PollenKind::Tree),
    species("cyprès", "cypres", PollenKind::Tree),
    species("cupressacées", "cupressacees", PollenKind::Grass),
];

static BY_KEY: Lazy<HashMap<&'static str, &'static PollenSpecies>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(SPECIES.len());
    for sp in SPECIES {
        map.insert(sp.slug, sp);
    }
    map
});

/// All known taxa, in upstream listing order.
pub fn all() -> &'static [PollenSpecies] {
    SPECIES
}

/// Resolve an upstream or user-supplied pollen name to a known taxon.
pub fn find(name: &str) -> Option<&'static PollenSpecies> {
    BY_KEY.get(fold(name).as_str()).copied()
}

// Lowercase and strip the diacritics that occur in French taxon names. The
// folded form of every canonical name equals its slug.
fn fold(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().to_lowercase().chars() {
        out.push(match ch {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        });
    }
    out
}
