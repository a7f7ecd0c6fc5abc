//! Observation types produced by the external perception pipeline
//!
//! The perception oracle turns an emulator frame plus memory snapshot into
//! one structured observation per tick. It is treated as a black box with
//! known failure modes: dialogue text carries OCR-style spelling noise and
//! raw line breaks, visual flags flicker, and the opponent half of the
//! memory-derived battle info is never populated reliably.

pub mod text;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One visible entity reported by the oracle.
///
/// Depending on its own confidence the oracle emits either bare name
/// strings or structured records; both shapes are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisibleEntity {
    /// Bare name string
    Name(String),
    /// Structured record with an optional kind tag
    Record {
        name: String,
        #[serde(default)]
        kind: Option<String>,
    },
}

impl VisibleEntity {
    /// The entity's display name
    pub fn name(&self) -> &str {
        match self {
            VisibleEntity::Name(name) => name,
            VisibleEntity::Record { name, .. } => name,
        }
    }
}

impl From<&str> for VisibleEntity {
    fn from(name: &str) -> Self {
        VisibleEntity::Name(name.to_string())
    }
}

/// Free text currently rendered on screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnScreenText {
    /// Dialogue box contents, if any. May contain raw newlines that break
    /// words mid-token.
    #[serde(default)]
    pub dialogue: Option<String>,
}

/// Coarse visual flags extracted from the frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualElements {
    /// Some menu-shaped region is visible
    #[serde(default)]
    pub menu_visible: bool,
}

/// One move slot of a creature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveSlot {
    pub name: String,
    /// Remaining uses
    pub pp: u8,
}

/// Memory-derived data for one creature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPokemon {
    pub species: String,
    pub level: u8,
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
}

impl PlayerPokemon {
    /// Look up a move slot by name, case-insensitively
    pub fn move_named(&self, name: &str) -> Option<&MoveSlot> {
        self.moves.iter().find(|slot| slot.name.eq_ignore_ascii_case(name))
    }
}

/// Battle kind as reported by the oracle's structured memory flags.
///
/// Only consulted after every textual signal has failed; the flags lag
/// behind the screen and misreport double-battle variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportedBattleKind {
    Wild,
    Trainer,
}

/// Memory-derived battle information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleInfo {
    #[serde(default)]
    pub in_battle: bool,

    /// The player's active creature
    #[serde(default)]
    pub player_pokemon: Option<PlayerPokemon>,

    /// Opponent slot. Observed empty on every real run; the species
    /// resolver derives the opponent from dialogue and visible entities
    /// instead and never reads this field.
    #[serde(default)]
    pub opponent_pokemon: Option<PlayerPokemon>,

    /// Structured battle-kind flag, last-resort classification input
    #[serde(default)]
    pub reported_kind: Option<ReportedBattleKind>,
}

/// One tick's structured observation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Observation {
    /// Free-text screen classification from the oracle
    #[serde(default)]
    pub screen_context: Option<String>,

    #[serde(default)]
    pub on_screen_text: OnScreenText,

    #[serde(default)]
    pub visible_entities: Vec<VisibleEntity>,

    #[serde(default)]
    pub visual_elements: VisualElements,

    #[serde(default)]
    pub battle_info: BattleInfo,

    /// Terrain under the player; absent on battle screens
    #[serde(default)]
    pub overworld_tile: Option<String>,
}

impl Observation {
    /// Current dialogue text, if any
    pub fn dialogue(&self) -> Option<&str> {
        self.on_screen_text.dialogue.as_deref()
    }

    /// Parse an observation from the oracle's JSON feed
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_shapes_both_parse() {
        let json = r#"["GEODUDE", {"name": "LASS TIANA", "kind": "trainer"}]"#;
        let entities: Vec<VisibleEntity> = serde_json::from_str(json).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name(), "GEODUDE");
        assert_eq!(entities[1].name(), "LASS TIANA");
    }

    #[test]
    fn test_observation_from_sparse_json() {
        let obs = Observation::from_json_str(r#"{"battle_info": {"in_battle": true}}"#).unwrap();
        assert!(obs.battle_info.in_battle);
        assert!(obs.dialogue().is_none());
        assert!(obs.visible_entities.is_empty());
        assert!(!obs.visual_elements.menu_visible);
    }

    #[test]
    fn test_move_named_is_case_insensitive() {
        let creature = PlayerPokemon {
            species: "TREECKO".to_string(),
            level: 8,
            moves: vec![MoveSlot { name: "Absorb".to_string(), pp: 15 }],
        };
        assert!(creature.move_named("ABSORB").is_some());
        assert!(creature.move_named("POUND").is_none());
    }

    #[test]
    fn test_reported_kind_parses_lowercase() {
        let info: BattleInfo =
            serde_json::from_str(r#"{"in_battle": true, "reported_kind": "trainer"}"#).unwrap();
        assert_eq!(info.reported_kind, Some(ReportedBattleKind::Trainer));
    }
}
