//! Move selection
//!
//! A flat decision table over the only two moves the bot ever uses: the
//! grass drain move and the neutral move it starts with. The neutral move
//! is the terminal fallback for every uncertain branch, so selection can
//! never stall on bad data.

use crate::config::BattleConfig;
use crate::perception::PlayerPokemon;
use crate::species::{Effectiveness, SpeciesKnowledgeBase};

/// The two moves the bot considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChosenMove {
    /// The grass drain move
    Drain,
    /// The always-available neutral move
    Neutral,
}

/// Picks between the drain move and the neutral move
#[derive(Debug)]
pub struct MoveSelector {
    drain_move: String,
    unlock_level: u8,
}

impl MoveSelector {
    pub fn new(config: &BattleConfig) -> Self {
        Self {
            drain_move: config.drain_move.clone(),
            unlock_level: config.drain_move_unlock_level,
        }
    }

    /// Select a move for the resolved opponent. Deterministic: the same
    /// (species, level, remaining uses) always yields the same choice.
    pub fn select(
        &self,
        kb: &SpeciesKnowledgeBase,
        species: Option<&str>,
        player: &PlayerPokemon,
    ) -> ChosenMove {
        if player.level < self.unlock_level {
            return ChosenMove::Neutral;
        }

        match player.move_named(&self.drain_move) {
            Some(slot) if slot.pp > 0 => {}
            Some(_) => {
                log::debug!("{} is out of uses", self.drain_move);
                return ChosenMove::Neutral;
            }
            None => {
                log::debug!("{} not in the move set", self.drain_move);
                return ChosenMove::Neutral;
            }
        }

        let Some(species) = species else {
            return ChosenMove::Neutral;
        };

        match kb.effectiveness(species) {
            Effectiveness::Effective => ChosenMove::Drain,
            Effectiveness::Resisted => ChosenMove::Neutral,
            Effectiveness::Unknown => ChosenMove::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::MoveSlot;

    fn selector() -> MoveSelector {
        MoveSelector::new(&BattleConfig::default())
    }

    fn kb() -> SpeciesKnowledgeBase {
        SpeciesKnowledgeBase::early_hoenn()
    }

    fn player(level: u8, absorb_pp: u8) -> PlayerPokemon {
        PlayerPokemon {
            species: "TREECKO".to_string(),
            level,
            moves: vec![
                MoveSlot { name: "POUND".to_string(), pp: 35 },
                MoveSlot { name: "ABSORB".to_string(), pp: absorb_pp },
            ],
        }
    }

    #[test]
    fn test_below_unlock_level_always_neutral() {
        let selector = selector();
        let kb = kb();
        for species in [Some("GEODUDE"), Some("SHROOMISH"), None] {
            assert_eq!(selector.select(&kb, species, &player(5, 15)), ChosenMove::Neutral);
        }
    }

    #[test]
    fn test_exhausted_pp_forces_neutral() {
        assert_eq!(selector().select(&kb(), Some("GEODUDE"), &player(8, 0)), ChosenMove::Neutral);
    }

    #[test]
    fn test_missing_drain_move_forces_neutral() {
        let creature = PlayerPokemon {
            species: "TREECKO".to_string(),
            level: 8,
            moves: vec![MoveSlot { name: "POUND".to_string(), pp: 35 }],
        };
        assert_eq!(selector().select(&kb(), Some("GEODUDE"), &creature), ChosenMove::Neutral);
    }

    #[test]
    fn test_unknown_species_is_conservative() {
        assert_eq!(selector().select(&kb(), None, &player(8, 15)), ChosenMove::Neutral);
        // Known to neither set
        assert_eq!(
            selector().select(&kb(), Some("POOCHYENA"), &player(8, 15)),
            ChosenMove::Neutral
        );
    }

    #[test]
    fn test_effectiveness_table() {
        let selector = selector();
        let kb = kb();
        assert_eq!(selector.select(&kb, Some("GEODUDE"), &player(8, 15)), ChosenMove::Drain);
        assert_eq!(selector.select(&kb, Some("SHROOMISH"), &player(8, 15)), ChosenMove::Neutral);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let selector = selector();
        let kb = kb();
        let creature = player(8, 15);
        let first = selector.select(&kb, Some("MARILL"), &creature);
        for _ in 0..10 {
            assert_eq!(selector.select(&kb, Some("MARILL"), &creature), first);
        }
    }
}
