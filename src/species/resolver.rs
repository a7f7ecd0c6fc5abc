//! Opponent species resolution
//!
//! Two tiers: the visible-entity list reflects whatever creature is on
//! screen right now (and therefore catches a trainer switching mid-battle),
//! while dialogue patterns lag but survive ticks where the entity list is
//! empty. Either way the raw reading goes through fuzzy correction before
//! anything trusts it.

use once_cell::sync::Lazy;
use regex::Regex;

use super::SpeciesKnowledgeBase;
use crate::battle::session::BattleSession;
use crate::perception::{text, Observation};

/// Labels the oracle emits for things that are never the opposing creature
const GENERIC_LABELS: &[&str] = &[
    "player", "trainer", "foe", "enemy", "rival", "lass", "youngster", "bug catcher", "twins",
    "school kid", "rich boy", "fisherman", "hiker", "poke ball", "pokeball", "hp bar",
    "health bar", "cursor", "menu", "dialogue",
];

static SENT_OUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsent\s+out\s+([A-Za-z][A-Za-z'\-]*)").expect("valid regex"));

// The transcription sometimes drops the word "out"
static SENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsent\s+([A-Za-z][A-Za-z'\-]*)").expect("valid regex"));

static WILD_APPEARED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bwild\s+([A-Za-z][A-Za-z'\-]*)\s+appeared").expect("valid regex")
});

/// Resolves the opposing species from observations and dialogue history
pub struct SpeciesResolver {
    kb: SpeciesKnowledgeBase,
    min_similarity: f64,
}

impl SpeciesResolver {
    pub fn new(kb: SpeciesKnowledgeBase, min_similarity: f64) -> Self {
        Self { kb, min_similarity }
    }

    pub fn knowledge_base(&self) -> &SpeciesKnowledgeBase {
        &self.kb
    }

    /// Resolve the opposing species and keep the session cache coherent.
    ///
    /// Tier 1 scans the visible-entity list; a reading from it always
    /// overwrites a conflicting cache entry. Tier 2 falls back to dialogue
    /// patterns, newest first. When both tiers come up empty the cached
    /// value from an earlier tick is reused.
    pub fn resolve(&self, session: &mut BattleSession, obs: &Observation) -> Option<String> {
        if let Some(name) = self.from_visible_entities(obs) {
            if session.current_opponent_species.as_deref() != Some(name.as_str()) {
                if let Some(previous) = &session.current_opponent_species {
                    log::info!("opponent switched: {} -> {}", previous, name);
                }
                session.current_opponent_species = Some(name.clone());
            }
            return Some(name);
        }

        if let Some(name) = self.from_dialogue(session) {
            session.current_opponent_species = Some(name.clone());
            return Some(name);
        }

        session.current_opponent_species.clone()
    }

    /// Tier 1: first entity that is neither the player's creature nor a
    /// generic label and survives fuzzy correction
    fn from_visible_entities(&self, obs: &Observation) -> Option<String> {
        let own_species = obs.battle_info.player_pokemon.as_ref().map(|p| p.species.as_str());

        for entity in &obs.visible_entities {
            let name = entity.name().trim();
            if name.is_empty() {
                continue;
            }
            let lower = name.to_lowercase();
            if GENERIC_LABELS.iter().any(|label| lower == *label || lower.starts_with(label)) {
                continue;
            }
            if own_species.map_or(false, |own| own.eq_ignore_ascii_case(name)) {
                continue;
            }
            if let Some(corrected) = self.kb.correct(name, self.min_similarity) {
                return Some(corrected);
            }
        }
        None
    }

    /// Tier 2: dialogue patterns, newest line first
    fn from_dialogue(&self, session: &BattleSession) -> Option<String> {
        for line in session.dialogue_history.iter_newest_first() {
            let normalized = text::normalize_lines(line);

            for re in [&*SENT_OUT_RE, &*SENT_RE, &*WILD_APPEARED_RE] {
                let Some(caps) = re.captures(&normalized) else {
                    continue;
                };
                let raw = &caps[1];
                if raw.eq_ignore_ascii_case("out") {
                    continue;
                }
                if let Some(corrected) = self.kb.correct(raw, self.min_similarity) {
                    return Some(corrected);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::session::BattleSession;
    use crate::perception::{Observation, PlayerPokemon, VisibleEntity};

    fn resolver() -> SpeciesResolver {
        SpeciesResolver::new(SpeciesKnowledgeBase::early_hoenn(), 0.6)
    }

    fn session() -> BattleSession {
        BattleSession::new(10, false, None)
    }

    fn obs_with_entities(names: &[&str]) -> Observation {
        let mut obs = Observation::default();
        obs.visible_entities = names.iter().map(|n| VisibleEntity::from(*n)).collect();
        obs.battle_info.player_pokemon = Some(PlayerPokemon {
            species: "TREECKO".to_string(),
            level: 8,
            moves: vec![],
        });
        obs
    }

    #[test]
    fn test_visible_entity_skips_player_and_labels() {
        let mut session = session();
        let obs = obs_with_entities(&["PLAYER", "TREECKO", "LASS TIANA", "GEODUDE"]);
        assert_eq!(resolver().resolve(&mut session, &obs), Some("GEODUDE".to_string()));
    }

    #[test]
    fn test_dialogue_sent_out_pattern() {
        let mut session = session();
        session.dialogue_history.push("LASS TIANA sent out SHROOMISH!");
        let obs = Observation::default();
        assert_eq!(resolver().resolve(&mut session, &obs), Some("SHROOMISH".to_string()));
    }

    #[test]
    fn test_dialogue_tolerates_dropped_out() {
        let mut session = session();
        session.dialogue_history.push("LASS TIANA sent SHROOMISH!");
        let obs = Observation::default();
        assert_eq!(resolver().resolve(&mut session, &obs), Some("SHROOMISH".to_string()));
    }

    #[test]
    fn test_dialogue_newline_inside_pattern() {
        let mut session = session();
        session.dialogue_history.push("LASS TIANA sent\nout SHROOMISH!");
        let obs = Observation::default();
        assert_eq!(resolver().resolve(&mut session, &obs), Some("SHROOMISH".to_string()));
    }

    #[test]
    fn test_wild_appeared_pattern() {
        let mut session = session();
        session.dialogue_history.push("Wild TAILLOW appeared!");
        let obs = Observation::default();
        assert_eq!(resolver().resolve(&mut session, &obs), Some("TAILLOW".to_string()));
    }

    #[test]
    fn test_tier1_overrides_stale_dialogue_cache() {
        let mut session = session();
        session.dialogue_history.push("LASS TIANA sent out SHROOMISH!");
        let r = resolver();

        let empty = Observation::default();
        assert_eq!(r.resolve(&mut session, &empty), Some("SHROOMISH".to_string()));

        // Mid-battle switch: the entity list now shows a different creature
        let obs = obs_with_entities(&["GEODUDE"]);
        assert_eq!(r.resolve(&mut session, &obs), Some("GEODUDE".to_string()));
        assert_eq!(session.current_opponent_species.as_deref(), Some("GEODUDE"));
    }

    #[test]
    fn test_cache_reused_when_both_tiers_empty() {
        let mut session = session();
        session.current_opponent_species = Some("MARILL".to_string());
        let obs = Observation::default();
        assert_eq!(resolver().resolve(&mut session, &obs), Some("MARILL".to_string()));
    }

    #[test]
    fn test_misspelled_entity_is_corrected() {
        let mut session = session();
        let obs = obs_with_entities(&["GEODUDDE"]);
        assert_eq!(resolver().resolve(&mut session, &obs), Some("GEODUDE".to_string()));
    }

    #[test]
    fn test_unresolvable_everything_returns_none() {
        let mut session = session();
        session.dialogue_history.push("TREECKO used POUND!");
        let obs = Observation::default();
        assert_eq!(resolver().resolve(&mut session, &obs), None);
    }
}
