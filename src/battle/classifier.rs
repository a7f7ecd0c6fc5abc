//! Wild-versus-trainer classification
//!
//! A priority cascade over layered evidence. Dialogue text is the primary
//! signal: terrain-based inference was tried and retired as unreliable, so
//! the cascade leans on lexical markers with WILD as the safe default (a
//! missed flee is cheaper than being stuck unable to flee a trainer).

use crate::battle::session::{BattleSession, BattleType};
use crate::perception::{text, Observation, ReportedBattleKind};

/// Dialogue fragments that mean a trainer owns the opposing creature
const TRAINER_MARKERS: &[&str] = &["sent out", "no running from"];

/// Messages that on their own prove fleeing is impossible: the game's
/// trainer-battle escape refusal, and the rescue plea that opens the one
/// scripted unescapable encounter
const TRAINER_LOCK_MESSAGES: &[&str] = &["no running from a trainer battle", "h-help me"];

/// Outcome of one classification pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub battle_type: BattleType,
    /// Whether this result is confident enough to freeze the session type
    pub lock: bool,
}

impl Classification {
    fn wild() -> Self {
        Self { battle_type: BattleType::Wild, lock: false }
    }

    fn trainer(lock: bool) -> Self {
        Self { battle_type: BattleType::Trainer, lock }
    }
}

/// Classifies encounters from scripted flags, dialogue, and memory flags
#[derive(Debug, Default)]
pub struct BattleTypeClassifier;

impl BattleTypeClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify the encounter. Each step short-circuits:
    ///
    /// 1. scripted story battle -> trainer, locked
    /// 2. authoritative no-escape messages -> trainer, locked
    /// 3. a "wild " lexical marker anywhere in recent dialogue -> wild,
    ///    replacing any provisional trainer guess
    /// 4. trainer phrasing ("sent out", escape refusal, the foe label)
    ///    -> trainer, locked
    /// 5. the oracle's structured battle flag, unlocked
    /// 6. wild, unlocked
    pub fn classify(&self, session: &BattleSession, obs: &Observation) -> Classification {
        if session.is_scripted_unescapable {
            return Classification::trainer(true);
        }

        if self.has_lock_message(session) {
            log::debug!("classifier: authoritative no-escape message");
            return Classification::trainer(true);
        }

        let has_wild_marker = session
            .dialogue_history
            .iter()
            .any(|line| text::contains_ci(&text::normalize_lines(line), "wild "));
        if has_wild_marker {
            log::debug!("classifier: wild lexical marker in dialogue");
            return Classification::wild();
        }

        let has_trainer_marker = session.dialogue_history.iter().any(|line| {
            let normalized = text::normalize_lines(line);
            TRAINER_MARKERS.iter().any(|marker| text::contains_ci(&normalized, marker))
                || contains_word_ci(&normalized, "foe")
        });
        if has_trainer_marker {
            log::debug!("classifier: trainer phrasing in dialogue");
            return Classification::trainer(true);
        }

        match obs.battle_info.reported_kind {
            // Provisional: memory flags lag the screen, so text evidence on
            // a later tick may still override this
            Some(ReportedBattleKind::Trainer) => Classification::trainer(false),
            Some(ReportedBattleKind::Wild) | None => Classification::wild(),
        }
    }

    /// Stuck-flee self-correction: repeated flee failures combined with a
    /// long run of unreadable menus only happen when the game is refusing
    /// the escape, which only trainer battles do.
    pub fn should_reclassify_stuck(
        &self,
        session: &BattleSession,
        min_flee_attempts: u32,
        min_unknown_streak: u32,
    ) -> bool {
        !session.is_type_locked()
            && session.battle_type() == BattleType::Wild
            && session.run_attempts >= min_flee_attempts
            && session.unknown_state_streak >= min_unknown_streak
    }

    fn has_lock_message(&self, session: &BattleSession) -> bool {
        session.dialogue_history.iter().any(|line| {
            let normalized = text::normalize_lines(line);
            TRAINER_LOCK_MESSAGES.iter().any(|msg| text::contains_ci(&normalized, msg))
        })
    }
}

/// Case-insensitive whole-word containment
fn contains_word_ci(haystack: &str, word: &str) -> bool {
    haystack
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .any(|token| token == word)
}
