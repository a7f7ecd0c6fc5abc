//! Emerald BattleBot
//!
//! Battle resolution core for an autonomous agent playing a GBA Pokemon
//! title. Each simulation tick the embedding agent feeds one structured
//! observation (screen text, visible entities, visual flags, memory-derived
//! battle info) and receives one symbolic decision back; an external action
//! executor turns decisions into button presses.
//!
//! The perception feed is noisy by design: dialogue text carries OCR-style
//! spelling errors and raw line breaks, menu visibility flags flicker, and
//! the opponent side of the memory snapshot is unreliable. Everything in
//! this crate is built to make forward progress anyway - prioritized rule
//! cascades, escalation counters for stuck states, and a conservative
//! fallback on every branch.

pub mod battle;
pub mod config;
pub mod perception;
pub mod progress;
pub mod species;

// Re-export commonly used types
pub use battle::controller::{BattleController, BattleDecision};
pub use battle::menu::{MenuState, MenuStateDetector};
pub use battle::session::{BattleSession, BattleType, DialogueHistory};
pub use config::BattleConfig;
pub use perception::Observation;
pub use progress::{MilestoneProgress, NoProgress};
pub use species::{Effectiveness, SpeciesKnowledgeBase};

use thiserror::Error;

/// Errors surfaced while building or configuring the battle core.
///
/// The per-tick decision path never returns an error: perception ambiguity
/// is absorbed by escalation counters and fallback decisions inside
/// [`BattleController`].
#[derive(Debug, Error)]
pub enum BattleBotError {
    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),

    /// TOML document failed to parse
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON observation failed to parse
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown symbolic decision string
    #[error("unknown decision: {0}")]
    UnknownDecision(String),
}

/// Result type for battle core operations
pub type Result<T> = std::result::Result<T, BattleBotError>;
