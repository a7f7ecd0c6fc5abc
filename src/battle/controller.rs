//! Per-tick battle orchestration
//!
//! The controller owns the session lifecycle exclusively: it creates a
//! `BattleSession` on the overworld-to-battle transition, mutates it one
//! tick at a time, and tears it down once the battle and its trailing
//! dialogue have drained. Every tick maps one observation to one symbolic
//! decision; translating decisions into button input is the embedding
//! agent's job.
//!
//! Nothing in here returns an error. Unreadable screens surface as the
//! unknown menu state and are worn down by escalation counters until a
//! decision is forced.

use std::fmt;
use std::str::FromStr;

use crate::config::BattleConfig;
use crate::perception::{text, Observation};
use crate::progress::MilestoneProgress;
use crate::species::{SpeciesKnowledgeBase, SpeciesResolver};
use crate::{BattleBotError, Result};

use super::classifier::BattleTypeClassifier;
use super::menu::{is_narrative_text, MenuState, MenuStateDetector};
use super::moves::{ChosenMove, MoveSelector};
use super::session::{BattleSession, BattleType};

/// Dialogue fragments reporting a failed escape attempt
const ESCAPE_FAILED_MARKERS: &[&str] = &["couldn't get away", "can't escape"];

/// Symbolic decision vocabulary consumed by the action executor.
///
/// The drain move rides in move slot A and the neutral move in slot B,
/// which is where the wire strings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleDecision {
    /// Attempt to run from a wild encounter
    Flee,
    /// Leave a sub-menu that was entered by mistake
    BackOut,
    /// Advance narrative text
    AdvanceDialogue,
    /// Use the drain move
    UseDrainMove,
    /// Use the neutral move
    UseNeutralMove,
    /// Blind advance while the screen is unreadable
    RecoveryAdvance,
}

impl fmt::Display for BattleDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleDecision::Flee => write!(f, "flee"),
            BattleDecision::BackOut => write!(f, "back-out"),
            BattleDecision::AdvanceDialogue => write!(f, "advance-dialogue"),
            BattleDecision::UseDrainMove => write!(f, "use-move-a"),
            BattleDecision::UseNeutralMove => write!(f, "use-move-b"),
            BattleDecision::RecoveryAdvance => write!(f, "error-recovery-advance"),
        }
    }
}

impl FromStr for BattleDecision {
    type Err = BattleBotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flee" => Ok(BattleDecision::Flee),
            "back-out" => Ok(BattleDecision::BackOut),
            "advance-dialogue" => Ok(BattleDecision::AdvanceDialogue),
            "use-move-a" => Ok(BattleDecision::UseDrainMove),
            "use-move-b" => Ok(BattleDecision::UseNeutralMove),
            "error-recovery-advance" => Ok(BattleDecision::RecoveryAdvance),
            other => Err(BattleBotError::UnknownDecision(other.to_string())),
        }
    }
}

/// Top-level battle state machine
pub struct BattleController<P> {
    config: BattleConfig,
    classifier: BattleTypeClassifier,
    menus: MenuStateDetector,
    resolver: SpeciesResolver,
    selector: MoveSelector,
    progress: P,
    session: Option<BattleSession>,
    /// Terrain under the player, cached while out of battle
    last_overworld_tile: Option<String>,
    decisions_emitted: u32,
}

impl<P: MilestoneProgress> BattleController<P> {
    pub fn new(config: BattleConfig, kb: SpeciesKnowledgeBase, progress: P) -> Self {
        let resolver = SpeciesResolver::new(kb, config.fuzzy_match_threshold);
        let selector = MoveSelector::new(&config);
        Self {
            config,
            classifier: BattleTypeClassifier::new(),
            menus: MenuStateDetector::new(),
            resolver,
            selector,
            progress,
            session: None,
            last_overworld_tile: None,
            decisions_emitted: 0,
        }
    }

    /// The active session, if a battle is in progress
    pub fn session(&self) -> Option<&BattleSession> {
        self.session.as_ref()
    }

    pub fn in_battle(&self) -> bool {
        self.session.is_some()
    }

    /// Process one tick. Returns a decision while a battle (or its
    /// trailing dialogue) is active, `None` on the overworld.
    pub fn tick(&mut self, obs: &Observation) -> Option<BattleDecision> {
        if let Some(tile) = obs.overworld_tile.as_deref() {
            self.last_overworld_tile = Some(tile.to_string());
        }

        if self.session.is_none() {
            if !obs.battle_info.in_battle {
                return None;
            }
            self.start_session();
        } else if !obs.battle_info.in_battle {
            // The battle proper is over; keep the session alive while the
            // outro text (EXP gains, level ups) drains
            if self.is_post_battle_dialogue(obs) {
                if let Some(session) = self.session.as_mut() {
                    record_dialogue(session, obs);
                }
                self.decisions_emitted += 1;
                return Some(BattleDecision::AdvanceDialogue);
            }
            self.end_session();
            return None;
        }

        let mut session = self.session.take()?;
        let decision = self.decide(&mut session, obs);
        self.session = Some(session);
        self.decisions_emitted += 1;
        log::debug!("battle tick -> {}", decision);
        Some(decision)
    }

    fn start_session(&mut self) {
        let milestone = &self.config.scripted_battle_milestone;
        // Milestone still pending means this is the scripted rescue battle;
        // no milestone data defaults to a normal classification
        let scripted = matches!(self.progress.is_complete(milestone), Some(false));
        let session = BattleSession::new(
            self.config.dialogue_history_capacity,
            scripted,
            self.last_overworld_tile.clone(),
        );
        log::info!(
            "battle started (scripted={}, start_tile={:?})",
            scripted,
            session.battle_start_tile
        );
        self.session = Some(session);
        self.decisions_emitted = 0;
    }

    fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!(
                "battle ended: type={} locked={} opponent={:?} run_attempts={} decisions={}",
                session.battle_type(),
                session.is_type_locked(),
                session.current_opponent_species,
                session.run_attempts,
                self.decisions_emitted
            );
        }
    }

    fn is_post_battle_dialogue(&self, obs: &Observation) -> bool {
        obs.dialogue()
            .map(|d| is_narrative_text(&text::normalize_lines(d)))
            .unwrap_or(false)
    }

    fn decide(&self, session: &mut BattleSession, obs: &Observation) -> BattleDecision {
        record_dialogue(session, obs);

        if !session.is_type_locked() {
            let result = self.classifier.classify(session, obs);
            session.apply_classification(result.battle_type, result.lock);
        }

        let menu = self.menus.detect(obs);
        log::trace!("menu state: {}", menu);

        match menu {
            MenuState::Unknown => session.unknown_state_streak += 1,
            _ => session.unknown_state_streak = 0,
        }
        match menu {
            MenuState::Dialogue => session.dialogue_streak += 1,
            MenuState::BaseMenu | MenuState::FightMenu | MenuState::BagMenu => {
                session.dialogue_streak = 0
            }
            MenuState::Unknown => {}
        }

        if self.classifier.should_reclassify_stuck(
            session,
            self.config.reclassify_min_flee_attempts,
            self.config.reclassify_unknown_streak,
        ) {
            session.lock_trainer("repeated flee failures in an unresolved menu");
        }

        // Post-intro dialogue exhausts itself; past the limit a wild battle
        // assumes the action menu is up even though detection missed it
        let menu = if session.battle_type() != BattleType::Trainer
            && menu == MenuState::Dialogue
            && session.dialogue_streak > self.config.wild_dialogue_menu_limit
        {
            log::debug!(
                "forcing base menu after {} dialogue turns",
                session.dialogue_streak
            );
            MenuState::BaseMenu
        } else {
            menu
        };

        match session.battle_type() {
            BattleType::Trainer => self.decide_trainer(session, obs, menu),
            BattleType::Wild | BattleType::Unknown => self.decide_wild(session, menu),
        }
    }

    fn decide_wild(&self, session: &BattleSession, menu: MenuState) -> BattleDecision {
        match menu {
            MenuState::Dialogue => BattleDecision::AdvanceDialogue,
            MenuState::BaseMenu => {
                log::debug!("attempting flee (failures so far: {})", session.run_attempts);
                BattleDecision::Flee
            }
            MenuState::FightMenu | MenuState::BagMenu => BattleDecision::BackOut,
            MenuState::Unknown => {
                if session.unknown_state_streak < self.config.wild_forced_flee_tick {
                    BattleDecision::RecoveryAdvance
                } else {
                    log::debug!(
                        "forcing flee after {} unresolved ticks",
                        session.unknown_state_streak
                    );
                    BattleDecision::Flee
                }
            }
        }
    }

    fn decide_trainer(
        &self,
        session: &mut BattleSession,
        obs: &Observation,
        menu: MenuState,
    ) -> BattleDecision {
        match menu {
            MenuState::Dialogue => BattleDecision::AdvanceDialogue,
            MenuState::BaseMenu | MenuState::FightMenu => self.move_decision(session, obs),
            MenuState::BagMenu => BattleDecision::BackOut,
            MenuState::Unknown => {
                let streak = session.unknown_state_streak;
                if streak < self.config.trainer_blind_move_tick {
                    BattleDecision::RecoveryAdvance
                } else if streak < self.config.trainer_forced_move_tick {
                    log::debug!("blind move selection (unresolved streak {})", streak);
                    self.move_decision(session, obs)
                } else {
                    log::debug!("forcing move selection (unresolved streak {})", streak);
                    self.move_decision(session, obs)
                }
            }
        }
    }

    fn move_decision(&self, session: &mut BattleSession, obs: &Observation) -> BattleDecision {
        let species = self.resolver.resolve(session, obs);

        let Some(player) = obs.battle_info.player_pokemon.as_ref() else {
            log::warn!("no player creature data; falling back to the neutral move");
            return BattleDecision::UseNeutralMove;
        };

        match self.selector.select(self.resolver.knowledge_base(), species.as_deref(), player) {
            ChosenMove::Drain => BattleDecision::UseDrainMove,
            ChosenMove::Neutral => BattleDecision::UseNeutralMove,
        }
    }
}

/// Record the tick's dialogue line and count newly observed flee failures
fn record_dialogue(session: &mut BattleSession, obs: &Observation) {
    let Some(raw) = obs.dialogue() else {
        return;
    };
    let line = text::normalize_lines(raw);
    if line.is_empty() {
        return;
    }
    if session.dialogue_history.push(line.clone()) {
        let is_escape_failure =
            ESCAPE_FAILED_MARKERS.iter().any(|marker| text::contains_ci(&line, marker))
                && !text::contains_ci(&line, "no running from");
        if is_escape_failure {
            session.run_attempts += 1;
            log::debug!("flee attempt failed ({} so far)", session.run_attempts);
        }
    }
}
