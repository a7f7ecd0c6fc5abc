//! Species knowledge base and fuzzy name correction
//!
//! A static, read-only classification of the species the bot can meet on
//! the early routes: those the grass drain move is effective against and
//! those that resist it. Everything outside the two sets is treated
//! conservatively by the move selector.

pub mod resolver;

pub use resolver::SpeciesResolver;

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::{BattleBotError, Result};

/// How the drain move fares against a species
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effectiveness {
    Effective,
    Resisted,
    /// Species outside the knowledge base
    Unknown,
}

#[derive(Debug, Deserialize)]
struct SpeciesToml {
    #[serde(default)]
    effective: Vec<String>,
    #[serde(default)]
    resisted: Vec<String>,
}

/// The two disjoint species sets used for move selection and as the
/// correction target for noisy species readings
#[derive(Debug, Clone)]
pub struct SpeciesKnowledgeBase {
    effective: BTreeSet<String>,
    resisted: BTreeSet<String>,
}

impl SpeciesKnowledgeBase {
    /// Build from explicit sets. Names are uppercased; the sets must be
    /// disjoint.
    pub fn new<I, J, S>(effective: I, resisted: J) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let effective: BTreeSet<String> =
            effective.into_iter().map(|s| s.as_ref().trim().to_uppercase()).collect();
        let resisted: BTreeSet<String> =
            resisted.into_iter().map(|s| s.as_ref().trim().to_uppercase()).collect();

        if let Some(overlap) = effective.intersection(&resisted).next() {
            return Err(BattleBotError::Config(format!(
                "species {} listed as both effective and resisted",
                overlap
            )));
        }

        Ok(Self { effective, resisted })
    }

    /// The default roster for the routes the bot actually walks: wild
    /// encounters up to Petalburg Woods plus the early trainer rosters.
    pub fn early_hoenn() -> Self {
        let effective = [
            "GEODUDE", "NOSEPASS", "MARILL", "AZURILL", "MAGIKARP", "TENTACOOL", "CARVANHA",
            "BARBOACH", "GOLDEEN",
        ];
        let resisted = [
            "SHROOMISH", "LOTAD", "SEEDOT", "WURMPLE", "SILCOON", "CASCOON", "BEAUTIFLY",
            "DUSTOX", "TAILLOW", "TORCHIC",
        ];
        Self::new(effective, resisted).expect("default roster is disjoint")
    }

    /// Load from a TOML document with `effective` and `resisted` arrays
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: SpeciesToml = toml::from_str(source)?;
        Self::new(raw.effective, raw.resisted)
    }

    /// Whether the exact (uppercased) name is in either set
    pub fn contains(&self, species: &str) -> bool {
        let name = species.trim().to_uppercase();
        self.effective.contains(&name) || self.resisted.contains(&name)
    }

    /// Effectiveness of the drain move against a species
    pub fn effectiveness(&self, species: &str) -> Effectiveness {
        let name = species.trim().to_uppercase();
        if self.effective.contains(&name) {
            Effectiveness::Effective
        } else if self.resisted.contains(&name) {
            Effectiveness::Resisted
        } else {
            Effectiveness::Unknown
        }
    }

    /// Correct a noisy species reading against the roster.
    ///
    /// Exact matches return unchanged. Otherwise the closest roster name by
    /// normalized Levenshtein similarity wins, provided it clears
    /// `min_similarity`; extra, missing, and substituted letters from the
    /// oracle all land below 1.0 but typically above the threshold.
    pub fn correct(&self, raw: &str, min_similarity: f64) -> Option<String> {
        let candidate = raw.trim().to_uppercase();
        if candidate.is_empty() {
            return None;
        }
        if self.contains(&candidate) {
            return Some(candidate);
        }

        let mut best: Option<(f64, &String)> = None;
        for name in self.effective.iter().chain(self.resisted.iter()) {
            let score = strsim::normalized_levenshtein(&candidate, name);
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, name));
            }
        }

        match best {
            Some((score, name)) if score >= min_similarity => {
                if score < 1.0 {
                    log::debug!(
                        "corrected species reading {:?} -> {:?} (similarity {:.2})",
                        raw,
                        name,
                        score
                    );
                }
                Some(name.clone())
            }
            _ => None,
        }
    }

    /// All known species names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effective.iter().chain(self.resisted.iter()).map(|s| s.as_str())
    }
}

impl Default for SpeciesKnowledgeBase {
    fn default() -> Self {
        Self::early_hoenn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_lookups() {
        let kb = SpeciesKnowledgeBase::early_hoenn();
        assert_eq!(kb.effectiveness("GEODUDE"), Effectiveness::Effective);
        assert_eq!(kb.effectiveness("SHROOMISH"), Effectiveness::Resisted);
        assert_eq!(kb.effectiveness("POOCHYENA"), Effectiveness::Unknown);
    }

    #[test]
    fn test_overlapping_sets_rejected() {
        let result = SpeciesKnowledgeBase::new(["GEODUDE"], ["GEODUDE"]);
        assert!(matches!(result, Err(BattleBotError::Config(_))));
    }

    #[test]
    fn test_correction_is_idempotent_on_canonical_names() {
        let kb = SpeciesKnowledgeBase::early_hoenn();
        assert_eq!(kb.correct("GEODUDE", 0.6), Some("GEODUDE".to_string()));
        assert_eq!(kb.correct("geodude", 0.6), Some("GEODUDE".to_string()));
    }

    #[test]
    fn test_correction_fixes_substituted_letters() {
        let kb = SpeciesKnowledgeBase::new(["POOCHYENA"], ["SHROOMISH"]).unwrap();
        // substitution noise: POOCHENNA vs POOCHYENA
        assert_eq!(kb.correct("POOCHENNA", 0.6), Some("POOCHYENA".to_string()));
        // dropped letter
        assert_eq!(kb.correct("SHROMISH", 0.6), Some("SHROOMISH".to_string()));
    }

    #[test]
    fn test_correction_rejects_distant_strings() {
        let kb = SpeciesKnowledgeBase::early_hoenn();
        assert_eq!(kb.correct("LASS TIANA", 0.6), None);
        assert_eq!(kb.correct("", 0.6), None);
    }

    #[test]
    fn test_from_toml() {
        let kb = SpeciesKnowledgeBase::from_toml_str(
            "effective = [\"geodude\"]\nresisted = [\"shroomish\"]\n",
        )
        .unwrap();
        assert_eq!(kb.effectiveness("GEODUDE"), Effectiveness::Effective);
        assert_eq!(kb.effectiveness("SHROOMISH"), Effectiveness::Resisted);
    }
}
