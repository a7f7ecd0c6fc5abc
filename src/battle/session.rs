//! Per-encounter battle state

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Encounter classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleType {
    Wild,
    Trainer,
    Unknown,
}

impl fmt::Display for BattleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleType::Wild => write!(f, "wild"),
            BattleType::Trainer => write!(f, "trainer"),
            BattleType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Bounded log of recent dialogue lines.
///
/// Append-only with de-duplication of immediately repeated lines (a static
/// textbox is observed once per tick); the oldest entry is evicted once
/// capacity is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueHistory {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DialogueHistory {
    pub fn new(capacity: usize) -> Self {
        Self { lines: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append a line. Returns `false` when the line equals the newest entry
    /// and is dropped as an immediate repeat.
    pub fn push(&mut self, line: impl Into<String>) -> bool {
        let line = line.into();
        if self.lines.back().map_or(false, |last| *last == line) {
            return false;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        true
    }

    /// Newest line, if any
    pub fn latest(&self) -> Option<&str> {
        self.lines.back().map(|s| s.as_str())
    }

    /// Oldest-first iteration
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Newest-first iteration
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().rev().map(|s| s.as_str())
    }

    /// Case-insensitive containment check over all retained lines
    pub fn any_contains_ci(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.lines.iter().any(|line| line.to_lowercase().contains(&needle))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Mutable state for one battle encounter.
///
/// Created by the controller on the overworld-to-battle transition and
/// destroyed once the battle and its trailing dialogue have drained. No
/// other component creates or retains one across a battle boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSession {
    battle_type: BattleType,
    type_locked: bool,

    /// Failed escape attempts observed this encounter
    pub run_attempts: u32,

    /// Set once at creation from milestone progress; forces the trainer
    /// classification for the whole session
    pub is_scripted_unescapable: bool,

    pub dialogue_history: DialogueHistory,

    /// Cached opponent species from the most recent successful resolve
    pub current_opponent_species: Option<String>,

    /// Consecutive ticks with an unresolved menu state
    pub unknown_state_streak: u32,

    /// Consecutive dialogue-state ticks, the wild menu-fallback counter
    pub dialogue_streak: u32,

    /// Terrain under the player on the tick before the battle began;
    /// battle screens carry no tile data
    pub battle_start_tile: Option<String>,
}

impl BattleSession {
    pub fn new(dialogue_capacity: usize, scripted: bool, battle_start_tile: Option<String>) -> Self {
        Self {
            battle_type: if scripted { BattleType::Trainer } else { BattleType::Unknown },
            type_locked: scripted,
            run_attempts: 0,
            is_scripted_unescapable: scripted,
            dialogue_history: DialogueHistory::new(dialogue_capacity),
            current_opponent_species: None,
            unknown_state_streak: 0,
            dialogue_streak: 0,
            battle_start_tile,
        }
    }

    pub fn battle_type(&self) -> BattleType {
        self.battle_type
    }

    pub fn is_type_locked(&self) -> bool {
        self.type_locked
    }

    /// Apply a classification result.
    ///
    /// A locked session ignores everything; locking is honored only for
    /// the trainer type, so the wild default can never freeze the session.
    pub fn apply_classification(&mut self, battle_type: BattleType, lock: bool) {
        if self.type_locked {
            return;
        }
        if battle_type != self.battle_type {
            log::debug!("battle type {} -> {}", self.battle_type, battle_type);
        }
        self.battle_type = battle_type;
        if lock && battle_type == BattleType::Trainer {
            self.type_locked = true;
            log::info!("battle type locked: trainer");
        }
    }

    /// Force the trainer classification and lock it
    pub fn lock_trainer(&mut self, reason: &str) {
        if self.type_locked {
            return;
        }
        log::info!("reclassifying as trainer battle: {}", reason);
        self.battle_type = BattleType::Trainer;
        self.type_locked = true;
    }
}
