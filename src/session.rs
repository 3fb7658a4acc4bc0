//! A single two-player duel: preview -> sequence -> (swap -> reveal) x6 -> game over.
//!
//! A `Session` never performs I/O itself. Every mutating method returns the [`Outbound`] events
//! that resulted, to be dispatched by the lobby actor that owns this session exclusively. Timer
//! ticks and expirations re-enter the session the same way: through `handle_timer_event`, called
//! by the actor after receiving a `TimerEvent` on its own mailbox.

use std::sync::Arc;

use uuid::Uuid;

use crate::deck::{resolve_round, Card, RoundOutcome, CARDS_PER_PLAYER};
use crate::error::{CoreError, CoreResult};
use crate::player::Player;
use crate::state_machine::{PendingAction, Phase, SessionStateMachine};
use crate::timer::Timer;

use crate::protocol::messages::{Outbound, PlayerSummary, ReconnectSnapshot, RoundResultPayload, ServerEvent};

#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    pub preview_secs: u64,
    pub sequence_secs: u64,
    pub swap_secs: u64,
    pub continue_secs: u64,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            preview_secs: 30,
            sequence_secs: 60,
            swap_secs: 20,
            continue_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPurpose {
    Preview,
    Sequence,
    Swap,
    Continue,
}

#[derive(Debug, Clone, Copy)]
pub enum TimerEventKind {
    Tick(u64),
    Expired,
}

#[derive(Debug, Clone, Copy)]
pub struct TimerEvent {
    pub generation: u64,
    pub kind: TimerEventKind,
}

#[derive(Debug, Clone)]
struct RoundRecord {
    round: u8,
    card0: Card,
    card1: Card,
    winner_idx: Option<usize>,
    score0: u8,
    score1: u8,
}

pub struct Session {
    pub lobby_id: String,
    players: [Player; 2],
    state: SessionStateMachine,
    current_round: u8,
    history: Vec<RoundRecord>,
    preview_ready: [bool; 2],
    continue_ready: [bool; 2],
    completed: bool,
    timings: SessionTimings,
    timer: Option<Timer>,
    timer_purpose: Option<TimerPurpose>,
    timer_generation: u64,
    on_timer_event: Arc<dyn Fn(TimerEvent) + Send + Sync>,
}

impl Session {
    pub fn new(
        lobby_id: String,
        player0: Player,
        player1: Player,
        timings: SessionTimings,
        on_timer_event: Arc<dyn Fn(TimerEvent) + Send + Sync>,
    ) -> Self {
        Self {
            lobby_id,
            players: [player0, player1],
            state: SessionStateMachine::new(),
            current_round: 0,
            history: Vec::new(),
            preview_ready: [false, false],
            continue_ready: [false, false],
            completed: false,
            timings,
            timer: None,
            timer_purpose: None,
            timer_generation: 0,
            on_timer_event,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn phase(&self) -> Phase {
        self.state.effective_phase()
    }

    pub fn player_index(&self, player_id: Uuid) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn player_id_at(&self, idx: usize) -> Uuid {
        self.players[idx].id
    }

    pub fn is_disconnected(&self, idx: usize) -> bool {
        self.players[idx].disconnected
    }

    pub fn hand_of(&self, idx: usize) -> &[Card] {
        &self.players[idx].hand
    }

    fn other(idx: usize) -> usize {
        1 - idx
    }

    fn summary(&self, idx: usize) -> PlayerSummary {
        PlayerSummary {
            player_id: self.players[idx].id,
            name: self.players[idx].name.clone(),
        }
    }

    // ---- timer plumbing -------------------------------------------------

    fn start_timer(&mut self, purpose: TimerPurpose, duration_secs: u64) {
        self.timer_generation += 1;
        let generation = self.timer_generation;
        let sink_tick = self.on_timer_event.clone();
        let sink_complete = self.on_timer_event.clone();
        let mut timer = Timer::new(duration_secs)
            .with_tick(Arc::new(move |secs| {
                sink_tick(TimerEvent {
                    generation,
                    kind: TimerEventKind::Tick(secs),
                });
            }))
            .with_complete(Arc::new(move || {
                sink_complete(TimerEvent {
                    generation,
                    kind: TimerEventKind::Expired,
                });
            }));
        timer.start();
        self.timer = Some(timer);
        self.timer_purpose = Some(purpose);
    }

    fn clear_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.clear();
        }
        self.timer_purpose = None;
        self.timer_generation += 1; // invalidate any in-flight callbacks
    }

    fn tick_event(&self, secs: u64) -> ServerEvent {
        match self.timer_purpose {
            Some(TimerPurpose::Preview) => ServerEvent::PreviewTimerUpdate {
                seconds_remaining: secs,
            },
            Some(TimerPurpose::Continue) => ServerEvent::ContinueCountdown {
                seconds_remaining: secs,
            },
            _ => ServerEvent::TimerUpdate {
                seconds_remaining: secs,
            },
        }
    }

    /// Handles a tick or expiry from this session's timer. Stale events (from a timer that was
    /// since cleared/replaced) are ignored by generation check.
    pub fn handle_timer_event(&mut self, event: TimerEvent) -> Vec<Outbound> {
        if event.generation != self.timer_generation || self.completed {
            return Vec::new();
        }
        match event.kind {
            TimerEventKind::Tick(secs) => vec![Outbound::to_both(self.tick_event(secs))],
            TimerEventKind::Expired => match self.timer_purpose {
                Some(TimerPurpose::Preview) => self.force_begin_sequence(),
                Some(TimerPurpose::Sequence) => self.force_begin_round(),
                Some(TimerPurpose::Swap) => self.reveal(),
                Some(TimerPurpose::Continue) => self.advance_after_reveal(),
                None => Vec::new(),
            },
        }
    }

    // ---- lifecycle --------------------------------------------------------

    /// Deals hands, enters Preview, and starts the preview timer.
    pub fn start(&mut self) -> Vec<Outbound> {
        self.players[0].deal_hand();
        self.players[1].deal_hand();
        self.state
            .transition(Phase::Preview)
            .expect("Waiting -> Preview is always legal at session start");
        self.start_timer(TimerPurpose::Preview, self.timings.preview_secs);

        vec![
            Outbound::to_player(
                0,
                ServerEvent::CardsPreview {
                    your_hand: self.players[0].hand.clone(),
                    opponent_hand: self.players[1].hand.clone(),
                    seconds: self.timings.preview_secs,
                },
            ),
            Outbound::to_player(
                1,
                ServerEvent::CardsPreview {
                    your_hand: self.players[1].hand.clone(),
                    opponent_hand: self.players[0].hand.clone(),
                    seconds: self.timings.preview_secs,
                },
            ),
        ]
    }

    pub fn handle_preview_ready(&mut self, idx: usize) -> Vec<Outbound> {
        if self.state.effective_phase() != Phase::Preview || self.preview_ready[idx] {
            return Vec::new();
        }
        self.preview_ready[idx] = true;
        let mut events = vec![Outbound::to_player(
            Self::other(idx),
            ServerEvent::OpponentPreviewReady,
        )];
        if self.preview_ready[0] && self.preview_ready[1] {
            events.extend(self.force_begin_sequence());
        }
        events
    }

    fn force_begin_sequence(&mut self) -> Vec<Outbound> {
        if self.state.effective_phase() != Phase::Preview {
            return Vec::new();
        }
        self.clear_timer();
        self.state
            .transition(Phase::Sequence)
            .expect("Preview -> Sequence is always legal");
        self.start_timer(TimerPurpose::Sequence, self.timings.sequence_secs);
        vec![Outbound::to_both(ServerEvent::GameStart {
            seconds: self.timings.sequence_secs,
        })]
    }

    pub fn handle_set_sequence(&mut self, idx: usize, cards: Vec<Card>) -> CoreResult<Vec<Outbound>> {
        if self.state.effective_phase() != Phase::Sequence {
            return Err(CoreError::IllegalTransition);
        }
        if self.players[idx].sequence_set {
            return Err(CoreError::IllegalTransition);
        }
        if !crate::protocol::validation::is_permutation_of_hand(&cards, &self.players[idx].hand) {
            return Err(CoreError::InvalidInput(
                "sequence must be a permutation of the dealt hand".into(),
            ));
        }
        self.players[idx].set_sequence(cards)?;
        let mut events = vec![Outbound::to_player(idx, ServerEvent::SequenceConfirmed)];
        if self.players[0].sequence_set && self.players[1].sequence_set {
            events.extend(self.force_begin_round());
        }
        Ok(events)
    }

    fn force_begin_round(&mut self) -> Vec<Outbound> {
        if self.state.effective_phase() != Phase::Sequence {
            return Vec::new();
        }
        self.clear_timer();
        for p in &mut self.players {
            p.auto_commit_sequence();
        }
        self.state
            .transition(Phase::RoundStart)
            .expect("Sequence -> RoundStart is always legal");
        self.begin_round()
    }

    /// Starts (or resumes into) a round: resets per-round player flags, transitions to Swap, and
    /// starts the swap timer. Called directly from `force_begin_round` and after a reveal's
    /// continue trigger, and (after the configured yield) following a pause-interlocked resume.
    pub fn begin_round(&mut self) -> Vec<Outbound> {
        if self.state.effective_phase() == Phase::RoundStart {
            self.state
                .transition(Phase::Swap)
                .expect("RoundStart -> Swap is always legal");
        }
        self.players[0].reset_round();
        self.players[1].reset_round();
        self.start_timer(TimerPurpose::Swap, self.timings.swap_secs);

        vec![
            Outbound::to_player(
                0,
                ServerEvent::RoundStart {
                    round: self.current_round + 1,
                    seconds: self.timings.swap_secs,
                    your_swaps_remaining: self.players[0].swaps_remaining(),
                },
            ),
            Outbound::to_player(
                1,
                ServerEvent::RoundStart {
                    round: self.current_round + 1,
                    seconds: self.timings.swap_secs,
                    your_swaps_remaining: self.players[1].swaps_remaining(),
                },
            ),
        ]
    }

    pub fn handle_swap_cards(&mut self, idx: usize, pos1: i64, pos2: i64) -> CoreResult<Vec<Outbound>> {
        if self.state.effective_phase() != Phase::Swap {
            return Err(CoreError::IllegalTransition);
        }
        if self.players[idx].ready {
            return Err(CoreError::RuleViolation("already acted this round".into()));
        }
        let remaining = CARDS_PER_PLAYER - self.current_round as usize;
        if !crate::protocol::validation::is_valid_swap_positions(pos1, pos2, remaining) {
            return Err(CoreError::InvalidInput("invalid swap positions".into()));
        }
        let round = self.current_round as usize;
        let (abs1, abs2) = (pos1 as usize + round, pos2 as usize + round);
        self.players[idx].swap_cards(abs1, abs2)?;
        self.players[idx].ready = true;

        let mut events = vec![
            Outbound::to_player(
                idx,
                ServerEvent::SwapConfirmed {
                    sequence: self.players[idx].remaining_cards(round).to_vec(),
                    swaps_remaining: self.players[idx].swaps_remaining(),
                },
            ),
            Outbound::to_player(Self::other(idx), ServerEvent::OpponentSwapped),
        ];
        if self.players[0].ready && self.players[1].ready {
            events.extend(self.reveal());
        }
        Ok(events)
    }

    pub fn handle_skip_swap(&mut self, idx: usize) -> CoreResult<Vec<Outbound>> {
        if self.state.effective_phase() != Phase::Swap {
            return Err(CoreError::IllegalTransition);
        }
        if self.players[idx].ready {
            return Err(CoreError::RuleViolation("already acted this round".into()));
        }
        self.players[idx].ready = true;
        let mut events = vec![Outbound::to_player(idx, ServerEvent::SkipConfirmed)];
        if self.players[0].ready && self.players[1].ready {
            events.extend(self.reveal());
        }
        Ok(events)
    }

    fn reveal(&mut self) -> Vec<Outbound> {
        if self.state.effective_phase() != Phase::Swap {
            return Vec::new();
        }
        self.clear_timer();
        self.state
            .transition(Phase::Reveal)
            .expect("Swap -> Reveal is always legal");

        let round_idx = self.current_round as usize;
        let card0 = self.players[0]
            .card_at(round_idx)
            .expect("sequence is fully committed before reveal");
        let card1 = self.players[1]
            .card_at(round_idx)
            .expect("sequence is fully committed before reveal");

        let winner_idx = match resolve_round(card0, card1) {
            RoundOutcome::FirstWins => Some(0),
            RoundOutcome::SecondWins => Some(1),
            RoundOutcome::Draw => None,
        };
        if let Some(w) = winner_idx {
            self.players[w].score += 1;
        }

        self.current_round += 1;
        let record = RoundRecord {
            round: self.current_round,
            card0,
            card1,
            winner_idx,
            score0: self.players[0].score,
            score1: self.players[1].score,
        };
        self.history.push(record.clone());
        self.continue_ready = [false, false];

        self.start_timer(TimerPurpose::Continue, self.timings.continue_secs);

        vec![
            Outbound::to_player(0, self.round_result_event(&record, 0)),
            Outbound::to_player(1, self.round_result_event(&record, 1)),
        ]
    }

    fn round_result_event(&self, record: &RoundRecord, viewer: usize) -> ServerEvent {
        let (your_card, opponent_card, your_score, opponent_score) = if viewer == 0 {
            (record.card0, record.card1, record.score0, record.score1)
        } else {
            (record.card1, record.card0, record.score1, record.score0)
        };
        let winner = record.winner_idx.map(|w| self.players[w].id);
        let explanation = match record.winner_idx {
            None => "Draw".to_string(),
            Some(w) => format!("{} wins the round", self.players[w].name),
        };
        ServerEvent::RoundResult(RoundResultPayload {
            round: record.round,
            your_card,
            opponent_card,
            winner,
            explanation,
            your_score,
            opponent_score,
        })
    }

    pub fn handle_continue(&mut self, idx: usize) -> CoreResult<Vec<Outbound>> {
        if self.state.effective_phase() != Phase::Reveal {
            return Err(CoreError::IllegalTransition);
        }
        if self.continue_ready[idx] {
            return Ok(Vec::new());
        }
        self.continue_ready[idx] = true;
        let mut events = vec![Outbound::to_player(
            Self::other(idx),
            ServerEvent::OpponentContinued,
        )];
        if self.continue_ready[0] && self.continue_ready[1] {
            events.extend(self.advance_after_reveal());
        }
        Ok(events)
    }

    fn advance_after_reveal(&mut self) -> Vec<Outbound> {
        if self.state.effective_phase() != Phase::Reveal {
            return Vec::new();
        }
        self.clear_timer();
        if self.current_round >= CARDS_PER_PLAYER as u8 {
            return self.end_game(false, None);
        }
        self.state
            .transition(Phase::RoundStart)
            .expect("Reveal -> RoundStart is always legal before round 6");

        // A standard disconnect already paused the state machine before we could get here (the
        // transition above would fail while paused), so reaching this point with a player still
        // disconnected only happens via the reveal-phase path, which never pauses: the round
        // starts normally and the absent player catches up on reconnect.
        self.begin_round()
    }

    fn end_game(&mut self, by_disconnect: bool, forced_winner: Option<usize>) -> Vec<Outbound> {
        self.clear_timer();
        self.state.end_game();
        self.completed = true;

        let winner_idx = forced_winner.or_else(|| match self.players[0].score.cmp(&self.players[1].score) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        });
        let winner = winner_idx.map(|w| self.players[w].id);

        vec![
            Outbound::to_player(
                0,
                ServerEvent::GameEnd {
                    winner,
                    your_score: self.players[0].score,
                    opponent_score: self.players[1].score,
                    by_disconnect,
                },
            ),
            Outbound::to_player(
                1,
                ServerEvent::GameEnd {
                    winner,
                    your_score: self.players[1].score,
                    opponent_score: self.players[0].score,
                    by_disconnect,
                },
            ),
        ]
    }

    // ---- disconnect / reconnect --------------------------------------

    /// Marks `idx` disconnected. Pauses the session unless the current phase is Reveal, per the
    /// standard-vs-reveal disconnect split.
    pub fn mark_disconnected(&mut self, idx: usize) {
        self.players[idx].mark_disconnected();
        if self.completed {
            return;
        }
        if self.state.effective_phase() != Phase::Reveal {
            if let Some(timer) = &mut self.timer {
                timer.pause();
            }
            self.state.pause();
        }
    }

    pub fn notify_opponent_disconnected(&self, disconnected_idx: usize, remaining_secs: u64) -> Vec<Outbound> {
        vec![Outbound::to_player(
            Self::other(disconnected_idx),
            ServerEvent::OpponentDisconnected {
                reconnect_seconds_remaining: remaining_secs,
            },
        )]
    }

    pub fn end_by_disconnect(&mut self, disconnected_idx: usize) -> Vec<Outbound> {
        self.end_game(true, Some(Self::other(disconnected_idx)))
    }

    /// Ends the session with no outbound events, used when both players are simultaneously
    /// disconnected and nobody remains to notify.
    pub fn force_complete_silently(&mut self) {
        self.clear_timer();
        self.state.end_game();
        self.completed = true;
    }

    fn build_snapshot(&self, idx: usize) -> ReconnectSnapshot {
        let other = Self::other(idx);
        let phase = self.state.effective_phase();
        let round_history = self
            .history
            .iter()
            .map(|r| match self.round_result_event(r, idx) {
                ServerEvent::RoundResult(payload) => payload,
                _ => unreachable!(),
            })
            .collect();
        ReconnectSnapshot {
            phase,
            current_round: self.current_round,
            your_score: self.players[idx].score,
            your_swaps_remaining: self.players[idx].swaps_remaining(),
            opponent_score: self.players[other].score,
            opponent_swaps_remaining: self.players[other].swaps_remaining(),
            round_history,
            time_remaining: self.timer.as_ref().map(Timer::remaining_secs).unwrap_or(0),
            your_upcoming_cards: self.players[idx]
                .remaining_cards(self.current_round as usize)
                .to_vec(),
            your_hand: self.players[idx].hand.clone(),
            you: self.summary(idx),
            opponent: self.summary(other),
            you_ready: match phase {
                Phase::Swap => self.players[idx].ready,
                Phase::Preview => self.preview_ready[idx],
                Phase::Reveal => self.continue_ready[idx],
                _ => false,
            },
            opponent_ready: match phase {
                Phase::Swap => self.players[other].ready,
                Phase::Preview => self.preview_ready[other],
                Phase::Reveal => self.continue_ready[other],
                _ => false,
            },
            opponent_hand: if phase == Phase::Preview {
                Some(self.players[other].hand.clone())
            } else {
                None
            },
        }
    }

    /// Reassociates `idx` with a live connection and resyncs it. Resumes the session only if
    /// `opponent_live` is true; otherwise the returning player is told the opponent is still
    /// absent rather than being resumed into a one-sided game.
    ///
    /// Returns the resulting events plus whether the caller must, after a short yield, invoke
    /// [`Session::begin_round`] to carry out a round start that was deferred while paused.
    pub fn mark_reconnected(
        &mut self,
        idx: usize,
        new_connection_id: Uuid,
        opponent_live: bool,
        opponent_remaining_secs: u64,
    ) -> (Vec<Outbound>, bool) {
        self.players[idx].mark_connected(new_connection_id);
        let snapshot = self.build_snapshot(idx);
        let mut events = vec![Outbound::to_player(
            idx,
            ServerEvent::Reconnected(Box::new(snapshot)),
        )];

        if !opponent_live {
            events.push(Outbound::to_player(
                idx,
                ServerEvent::OpponentDisconnected {
                    reconnect_seconds_remaining: opponent_remaining_secs,
                },
            ));
            return (events, false);
        }

        let mut should_resume_round = false;
        if self.state.is_paused() {
            if let Some(timer) = &mut self.timer {
                timer.resume();
            }
            let pending = self.state.resume();
            events.push(Outbound::to_both(ServerEvent::GameResumed {
                phase: self.state.effective_phase(),
            }));
            events.push(Outbound::to_player(Self::other(idx), ServerEvent::OpponentReconnected));
            if pending == Some(PendingAction::StartRound) {
                should_resume_round = true;
            }
        }
        (events, should_resume_round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_player(name: &str) -> Player {
        Player::new(Uuid::new_v4(), name.to_string(), Uuid::new_v4())
    }

    fn make_session() -> Session {
        Session::new(
            "ABCDEF".into(),
            make_player("Alice"),
            make_player("Bob"),
            SessionTimings::default(),
            Arc::new(|_| {}),
        )
    }

    #[tokio::test]
    async fn start_deals_hands_and_enters_preview() {
        let mut s = make_session();
        let events = s.start();
        assert_eq!(events.len(), 2);
        assert_eq!(s.phase(), Phase::Preview);
        assert_eq!(s.players[0].hand.len(), CARDS_PER_PLAYER);
    }

    #[tokio::test]
    async fn both_preview_ready_advances_to_sequence() {
        let mut s = make_session();
        s.start();
        assert!(s.handle_preview_ready(0).len() >= 1);
        let events = s.handle_preview_ready(1);
        assert_eq!(s.phase(), Phase::Sequence);
        assert!(events
            .iter()
            .any(|o| matches!(o.event, ServerEvent::GameStart { .. })));
    }

    #[tokio::test]
    async fn full_happy_path_reaches_game_over() {
        let mut s = make_session();
        s.start();
        s.handle_preview_ready(0);
        s.handle_preview_ready(1);
        assert_eq!(s.phase(), Phase::Sequence);

        let hand0 = s.players[0].hand.clone();
        let hand1 = s.players[1].hand.clone();
        s.handle_set_sequence(0, hand0).unwrap();
        s.handle_set_sequence(1, hand1).unwrap();
        assert_eq!(s.phase(), Phase::Swap);

        for round in 0..CARDS_PER_PLAYER {
            assert_eq!(s.phase(), Phase::Swap, "round {round}");
            s.handle_skip_swap(0).unwrap();
            s.handle_skip_swap(1).unwrap();
            assert_eq!(s.phase(), Phase::Reveal);
            s.handle_continue(0).unwrap();
            let events = s.handle_continue(1).unwrap();
            if round + 1 < CARDS_PER_PLAYER {
                assert_eq!(s.phase(), Phase::Swap);
            } else {
                assert!(s.is_completed());
                assert!(events
                    .iter()
                    .any(|o| matches!(o.event, ServerEvent::GameEnd { .. })));
            }
        }
        assert_eq!(s.history.len(), CARDS_PER_PLAYER);
        assert!(s.players[0].score + s.players[1].score <= CARDS_PER_PLAYER as u8);
    }

    #[tokio::test]
    async fn swap_rejects_non_adjacent_or_already_played_positions() {
        let mut s = make_session();
        s.start();
        s.handle_preview_ready(0);
        s.handle_preview_ready(1);
        let hand0 = s.players[0].hand.clone();
        let hand1 = s.players[1].hand.clone();
        s.handle_set_sequence(0, hand0).unwrap();
        s.handle_set_sequence(1, hand1).unwrap();

        assert!(s.handle_swap_cards(0, 0, 2).is_err());
        assert!(s.handle_swap_cards(0, 0, 1).is_ok());
        // second swap same round blocked
        assert!(s.handle_swap_cards(0, 1, 2).is_err());
    }

    #[tokio::test]
    async fn disconnect_outside_reveal_pauses_the_session() {
        let mut s = make_session();
        s.start();
        s.mark_disconnected(0);
        assert!(s.state.is_paused());
        assert_eq!(s.phase(), Phase::Preview);
    }

    #[tokio::test]
    async fn reconnect_with_live_opponent_resumes() {
        let mut s = make_session();
        s.start();
        s.mark_disconnected(0);
        let (events, should_resume_round) = s.mark_reconnected(0, Uuid::new_v4(), true, 0);
        assert!(!should_resume_round);
        assert!(!s.state.is_paused());
        assert!(events
            .iter()
            .any(|o| matches!(o.event, ServerEvent::GameResumed { .. })));
    }

    #[tokio::test]
    async fn reconnect_with_disconnected_opponent_does_not_resume() {
        let mut s = make_session();
        s.start();
        s.mark_disconnected(0);
        s.mark_disconnected(1);
        let (events, should_resume_round) = s.mark_reconnected(0, Uuid::new_v4(), false, 100);
        assert!(!should_resume_round);
        assert!(events
            .iter()
            .any(|o| matches!(o.event, ServerEvent::OpponentDisconnected { .. })));
    }

    #[tokio::test]
    async fn end_by_disconnect_declares_the_other_player_winner() {
        let mut s = make_session();
        s.start();
        let p1_id = s.players[1].id;
        let events = s.end_by_disconnect(0);
        assert!(s.is_completed());
        let has_correct_winner = events.iter().any(|o| {
            matches!(&o.event, ServerEvent::GameEnd { winner: Some(w), by_disconnect: true, .. } if *w == p1_id)
        });
        assert!(has_correct_winner);
    }
}
