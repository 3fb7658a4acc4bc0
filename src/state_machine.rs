//! Session phase transitions, pause/resume, and the single deferred-action slot.
//!
//! Mirrors the closed-enum-plus-explicit-legal-transitions shape used elsewhere in this codebase
//! for lobby lifecycle state, generalized from three states to the eight phases a duel needs.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Preview,
    Sequence,
    RoundStart,
    Swap,
    Reveal,
    Paused,
    GameOver,
}

/// The single action that may be deferred while a session is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    StartRound,
}

#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: Phase,
    saved_phase: Option<Phase>,
    pending_action: Option<PendingAction>,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Waiting,
            saved_phase: None,
            pending_action: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }

    /// The phase a caller should reason about for gameplay purposes: the saved phase while
    /// paused, otherwise the current phase.
    pub fn effective_phase(&self) -> Phase {
        if self.is_paused() {
            self.saved_phase.unwrap_or(Phase::Waiting)
        } else {
            self.phase
        }
    }

    fn legal(from: Phase, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (from, to),
            (Waiting, Preview)
                | (Preview, Sequence)
                | (Sequence, RoundStart)
                | (RoundStart, Swap)
                | (Swap, Reveal)
                | (Reveal, RoundStart)
                | (Reveal, GameOver)
        ) || to == GameOver
    }

    /// Transitions to `to`. Rejected while paused (callers must `resume` first) and rejected if
    /// the transition isn't in the legal set, except that any phase may transition to
    /// `GameOver` (forfeit/disconnect termination).
    pub fn transition(&mut self, to: Phase) -> CoreResult<()> {
        if self.is_paused() && to != Phase::GameOver {
            return Err(CoreError::ProgrammerError(
                "cannot transition while paused".into(),
            ));
        }
        if self.is_terminal() {
            return Err(CoreError::IllegalTransition);
        }
        if !Self::legal(self.phase, to) {
            return Err(CoreError::IllegalTransition);
        }
        self.phase = to;
        Ok(())
    }

    /// Pauses the machine, saving the current phase. No-op if already paused or terminal.
    pub fn pause(&mut self) {
        if self.is_paused() || self.is_terminal() {
            return;
        }
        self.saved_phase = Some(self.phase);
        self.phase = Phase::Paused;
    }

    /// Resumes to the saved phase, consuming any pending action. Returns the consumed action,
    /// if any, so the caller (the `Session`) can act on it. No-op if not paused.
    pub fn resume(&mut self) -> Option<PendingAction> {
        if !self.is_paused() {
            return None;
        }
        self.phase = self.saved_phase.take().unwrap_or(Phase::Waiting);
        self.pending_action.take()
    }

    /// Sets the single deferred-action slot. Only meaningful while paused.
    pub fn set_pending_action(&mut self, action: PendingAction) {
        self.pending_action = Some(action);
    }

    /// Forces termination regardless of current phase, including while paused.
    pub fn end_game(&mut self) {
        self.saved_phase = None;
        self.pending_action = None;
        self.phase = Phase::GameOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.transition(Phase::Preview).is_ok());
        assert!(sm.transition(Phase::Sequence).is_ok());
        assert!(sm.transition(Phase::RoundStart).is_ok());
        assert!(sm.transition(Phase::Swap).is_ok());
        assert!(sm.transition(Phase::Reveal).is_ok());
        assert!(sm.transition(Phase::RoundStart).is_ok());
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.transition(Phase::Swap).is_err());
    }

    #[test]
    fn pause_blocks_transitions_until_resume() {
        let mut sm = SessionStateMachine::new();
        sm.transition(Phase::Preview).unwrap();
        sm.pause();
        assert!(sm.is_paused());
        assert!(sm.transition(Phase::Sequence).is_err());
        sm.set_pending_action(PendingAction::StartRound);
        let action = sm.resume();
        assert_eq!(action, Some(PendingAction::StartRound));
        assert_eq!(sm.phase(), Phase::Preview);
        assert!(sm.transition(Phase::Sequence).is_ok());
    }

    #[test]
    fn pause_is_idempotent() {
        let mut sm = SessionStateMachine::new();
        sm.transition(Phase::Preview).unwrap();
        sm.pause();
        sm.pause();
        assert!(sm.is_paused());
        assert_eq!(sm.resume(), None);
        assert_eq!(sm.phase(), Phase::Preview);
    }

    #[test]
    fn end_game_is_always_reachable_and_terminal() {
        let mut sm = SessionStateMachine::new();
        sm.transition(Phase::Preview).unwrap();
        sm.pause();
        sm.end_game();
        assert!(sm.is_terminal());
        assert!(sm.transition(Phase::Preview).is_err());
    }
}
