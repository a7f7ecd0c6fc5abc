//! Tuning configuration for the battle core
//!
//! Every threshold here was tuned against live runs rather than derived, so
//! they are carried as data: serde fields with defaults, loadable from a
//! TOML document the same way game definitions are.

use serde::{Deserialize, Serialize};

use crate::{BattleBotError, Result};

fn default_fuzzy_threshold() -> f64 {
    0.6
}

fn default_dialogue_capacity() -> usize {
    10
}

fn default_wild_dialogue_limit() -> u32 {
    3
}

fn default_wild_forced_flee_tick() -> u32 {
    3
}

fn default_trainer_blind_move_tick() -> u32 {
    3
}

fn default_trainer_forced_move_tick() -> u32 {
    5
}

fn default_reclassify_streak() -> u32 {
    9
}

fn default_reclassify_flee_attempts() -> u32 {
    2
}

fn default_drain_move() -> String {
    "ABSORB".to_string()
}

fn default_neutral_move() -> String {
    "POUND".to_string()
}

fn default_drain_unlock_level() -> u8 {
    6
}

fn default_scripted_milestone() -> String {
    "birch-rescue".to_string()
}

/// Tunable parameters for classification, resolution, and escalation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Minimum normalized similarity for fuzzy species correction
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_match_threshold: f64,

    /// Capacity of the per-battle dialogue history ring
    #[serde(default = "default_dialogue_capacity")]
    pub dialogue_history_capacity: usize,

    /// Consecutive dialogue turns in a wild battle after which the action
    /// menu is assumed present even though detection missed it
    #[serde(default = "default_wild_dialogue_limit")]
    pub wild_dialogue_menu_limit: u32,

    /// Unknown-state streak at which a wild battle forces a flee attempt;
    /// earlier ticks are treated as animation delay
    #[serde(default = "default_wild_forced_flee_tick")]
    pub wild_forced_flee_tick: u32,

    /// Unknown-state streak at which a trainer battle tries a blind move
    /// pick with the best available species guess
    #[serde(default = "default_trainer_blind_move_tick")]
    pub trainer_blind_move_tick: u32,

    /// Unknown-state streak at which a trainer battle picks a move
    /// regardless of confidence
    #[serde(default = "default_trainer_forced_move_tick")]
    pub trainer_forced_move_tick: u32,

    /// Unknown-state streak required for the stuck-flee trainer
    /// reclassification
    #[serde(default = "default_reclassify_streak")]
    pub reclassify_unknown_streak: u32,

    /// Failed flee attempts required for the stuck-flee trainer
    /// reclassification
    #[serde(default = "default_reclassify_flee_attempts")]
    pub reclassify_min_flee_attempts: u32,

    /// Name of the drain move
    #[serde(default = "default_drain_move")]
    pub drain_move: String,

    /// Name of the always-available neutral move
    #[serde(default = "default_neutral_move")]
    pub neutral_move: String,

    /// Level at which the starter learns the drain move
    #[serde(default = "default_drain_unlock_level")]
    pub drain_move_unlock_level: u8,

    /// Milestone checked once per session for the scripted rescue battle
    #[serde(default = "default_scripted_milestone")]
    pub scripted_battle_milestone: String,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            fuzzy_match_threshold: default_fuzzy_threshold(),
            dialogue_history_capacity: default_dialogue_capacity(),
            wild_dialogue_menu_limit: default_wild_dialogue_limit(),
            wild_forced_flee_tick: default_wild_forced_flee_tick(),
            trainer_blind_move_tick: default_trainer_blind_move_tick(),
            trainer_forced_move_tick: default_trainer_forced_move_tick(),
            reclassify_unknown_streak: default_reclassify_streak(),
            reclassify_min_flee_attempts: default_reclassify_flee_attempts(),
            drain_move: default_drain_move(),
            neutral_move: default_neutral_move(),
            drain_move_unlock_level: default_drain_unlock_level(),
            scripted_battle_milestone: default_scripted_milestone(),
        }
    }
}

impl BattleConfig {
    /// Load from a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the thresholds
    pub fn validate(&self) -> Result<()> {
        if !(self.fuzzy_match_threshold > 0.0 && self.fuzzy_match_threshold <= 1.0) {
            return Err(BattleBotError::Config(format!(
                "fuzzy_match_threshold must be in (0, 1], got {}",
                self.fuzzy_match_threshold
            )));
        }
        if self.dialogue_history_capacity == 0 {
            return Err(BattleBotError::Config(
                "dialogue_history_capacity must be non-zero".to_string(),
            ));
        }
        if self.wild_forced_flee_tick == 0 || self.trainer_blind_move_tick == 0 {
            return Err(BattleBotError::Config(
                "escalation ticks must be non-zero".to_string(),
            ));
        }
        if self.trainer_forced_move_tick < self.trainer_blind_move_tick {
            return Err(BattleBotError::Config(format!(
                "trainer_forced_move_tick ({}) must not precede trainer_blind_move_tick ({})",
                self.trainer_forced_move_tick, self.trainer_blind_move_tick
            )));
        }
        if self.drain_move.trim().is_empty() || self.neutral_move.trim().is_empty() {
            return Err(BattleBotError::Config("move names must be non-empty".to_string()));
        }
        Ok(())
    }
}
