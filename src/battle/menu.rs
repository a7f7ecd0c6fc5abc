//! Battle menu state detection
//!
//! Classifies the current battle sub-screen from dialogue text and coarse
//! visual flags. The rules are an ordered list; earlier rules are the more
//! reliable signals and win outright.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::perception::{text, Observation};

/// Which battle sub-screen is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuState {
    /// Narrative text is playing
    Dialogue,
    /// Top-level action menu (FIGHT / BAG / POKEMON / RUN)
    BaseMenu,
    /// Move list
    FightMenu,
    /// Item list
    BagMenu,
    /// Nothing recognizable
    Unknown,
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuState::Dialogue => write!(f, "dialogue"),
            MenuState::BaseMenu => write!(f, "base_menu"),
            MenuState::FightMenu => write!(f, "fight_menu"),
            MenuState::BagMenu => write!(f, "bag_menu"),
            MenuState::Unknown => write!(f, "unknown"),
        }
    }
}

static WHAT_WILL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)what\s+will\s+\S+\s+do").expect("valid regex"));

static PP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpp\b\s*:?\s*\d+\s*/\s*\d+").expect("valid regex"));

static GO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bgo!?\s+\S+").expect("valid regex"));

/// Fragments that mean narrative text is playing
const NARRATIVE_MARKERS: &[&str] = &[
    "appeared",
    "fainted",
    "gained",
    "grew to",
    "learned",
    "sent out",
    "used ",
    "couldn't get away",
    "can't escape",
    "got away safely",
    "no running from",
    "is hurt",
    "it's super effective",
    "not very effective",
];

const BAG_MARKERS: &[&str] = &["cancel", "close bag"];

/// Whether a normalized dialogue line reads as narrative text
pub(crate) fn is_narrative_text(normalized: &str) -> bool {
    let lower = normalized.to_lowercase();
    NARRATIVE_MARKERS.iter().any(|marker| lower.contains(marker)) || GO_RE.is_match(normalized)
}

/// Classifies battle sub-screens from one observation
#[derive(Debug, Default)]
pub struct MenuStateDetector;

impl MenuStateDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the current menu state. Rules run in reliability order and
    /// the first hit wins; anything unrecognized is `Unknown`.
    pub fn detect(&self, obs: &Observation) -> MenuState {
        let dialogue = obs.dialogue().map(text::normalize_lines).unwrap_or_default();
        let known_moves: Vec<&str> = obs
            .battle_info
            .player_pokemon
            .as_ref()
            .map(|p| p.moves.iter().map(|m| m.name.as_str()).collect())
            .unwrap_or_default();

        // "What will X do?" is the single most reliable battle signal
        if WHAT_WILL_RE.is_match(&dialogue) {
            return MenuState::BaseMenu;
        }

        if !dialogue.is_empty() && !known_moves.is_empty() {
            let mentioned =
                known_moves.iter().filter(|m| text::contains_ci(&dialogue, m)).count();
            if mentioned > 0 && PP_RE.is_match(&dialogue) {
                return MenuState::FightMenu;
            }
            // A comma/colon-delimited listing of the move set with no PP
            // column still reads as the fight menu
            if mentioned >= 2 && (dialogue.contains(',') || dialogue.contains(':')) {
                return MenuState::FightMenu;
            }
        }

        // Visual fallback: a visible menu plus a move name among the
        // on-screen entities
        if obs.battle_info.player_pokemon.is_some() && obs.visual_elements.menu_visible {
            let move_on_screen = obs.visible_entities.iter().any(|entity| {
                known_moves.iter().any(|m| entity.name().eq_ignore_ascii_case(m))
            });
            if move_on_screen {
                return MenuState::FightMenu;
            }
        }

        if !dialogue.is_empty() && is_narrative_text(&dialogue) {
            return MenuState::Dialogue;
        }

        if !dialogue.is_empty() {
            let lower = dialogue.to_lowercase();
            if BAG_MARKERS.iter().any(|marker| lower.contains(marker)) {
                return MenuState::BagMenu;
            }
        }

        MenuState::Unknown
    }
}
