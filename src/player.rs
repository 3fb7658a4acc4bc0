//! Per-participant state: hand, committed sequence, swap budget, readiness, liveness.

use uuid::Uuid;

use crate::deck::{Card, Deck};
use crate::error::{CoreError, CoreResult};

pub const MAX_SWAPS_PER_GAME: u8 = 3;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub connection_id: Option<Uuid>,
    pub hand: Vec<Card>,
    pub sequence: Vec<Card>,
    pub sequence_set: bool,
    pub swaps_used: u8,
    pub swapped_this_round: bool,
    pub score: u8,
    pub ready: bool,
    pub disconnected: bool,
}

impl Player {
    pub fn new(id: Uuid, name: String, connection_id: Uuid) -> Self {
        Self {
            id,
            name,
            connection_id: Some(connection_id),
            hand: Vec::new(),
            sequence: Vec::new(),
            sequence_set: false,
            swaps_used: 0,
            swapped_this_round: false,
            score: 0,
            ready: false,
            disconnected: false,
        }
    }

    pub fn deal_hand(&mut self) {
        self.hand = Deck::deal();
    }

    /// Accepts `seq` as the committed play order iff it is a permutation of `hand` by card
    /// identity. Succeeds at most once; later calls are rejected by the session before they
    /// reach here (`sequence_set` guards against accidental re-entry too).
    pub fn set_sequence(&mut self, seq: Vec<Card>) -> CoreResult<()> {
        if seq.len() != self.hand.len() {
            return Err(CoreError::InvalidInput(
                "sequence length must match hand size".into(),
            ));
        }
        let mut hand_ids: Vec<Uuid> = self.hand.iter().map(|c| c.id).collect();
        let mut seq_ids: Vec<Uuid> = seq.iter().map(|c| c.id).collect();
        hand_ids.sort();
        seq_ids.sort();
        if hand_ids != seq_ids {
            return Err(CoreError::InvalidInput(
                "sequence must be a permutation of the dealt hand".into(),
            ));
        }
        self.sequence = seq;
        self.sequence_set = true;
        Ok(())
    }

    /// Auto-commits a random permutation of `hand`, used when the sequence timer expires before
    /// a player has submitted one.
    pub fn auto_commit_sequence(&mut self) {
        if !self.sequence_set {
            self.sequence = Deck::shuffled(&self.hand);
            self.sequence_set = true;
        }
    }

    pub fn can_swap(&self) -> bool {
        self.swaps_used < MAX_SWAPS_PER_GAME && !self.swapped_this_round
    }

    /// Swaps two absolute positions in `sequence`. `i` and `j` must be adjacent
    /// (`|i - j| == 1`) and within bounds; the session is responsible for translating the
    /// wire's remaining-cards-relative positions into these absolute indices first.
    pub fn swap_cards(&mut self, i: usize, j: usize) -> CoreResult<()> {
        if !self.can_swap() {
            return Err(CoreError::RuleViolation(
                "no swaps remaining this round or this game".into(),
            ));
        }
        let len = self.sequence.len();
        if i >= len || j >= len {
            return Err(CoreError::InvalidInput("swap position out of range".into()));
        }
        if i.abs_diff(j) != 1 {
            return Err(CoreError::RuleViolation(
                "can only swap adjacent cards".into(),
            ));
        }
        self.sequence.swap(i, j);
        self.swaps_used += 1;
        self.swapped_this_round = true;
        Ok(())
    }

    pub fn swaps_remaining(&self) -> u8 {
        MAX_SWAPS_PER_GAME - self.swaps_used
    }

    pub fn reset_round(&mut self) {
        self.swapped_this_round = false;
        self.ready = false;
    }

    pub fn mark_disconnected(&mut self) {
        self.disconnected = true;
        self.connection_id = None;
    }

    pub fn mark_connected(&mut self, connection_id: Uuid) {
        self.disconnected = false;
        self.connection_id = Some(connection_id);
    }

    pub fn card_at(&self, round_index: usize) -> Option<Card> {
        self.sequence.get(round_index).copied()
    }

    /// The cards still left to play, in play order, from the current round onward.
    pub fn remaining_cards(&self, round_index: usize) -> &[Card] {
        if round_index >= self.sequence.len() {
            &[]
        } else {
            &self.sequence[round_index..]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_player() -> Player {
        let mut p = Player::new(Uuid::new_v4(), "Alice".into(), Uuid::new_v4());
        p.deal_hand();
        p
    }

    #[test]
    fn set_sequence_accepts_a_permutation_of_hand() {
        let mut p = new_player();
        let mut seq = p.hand.clone();
        seq.reverse();
        assert!(p.set_sequence(seq).is_ok());
        assert!(p.sequence_set);
    }

    #[test]
    fn set_sequence_rejects_foreign_cards() {
        let mut p = new_player();
        let mut seq = p.hand.clone();
        seq[0].id = Uuid::new_v4();
        assert!(p.set_sequence(seq).is_err());
    }

    #[test]
    fn swap_budget_is_enforced() {
        let mut p = new_player();
        p.set_sequence(p.hand.clone()).unwrap();
        assert!(p.swap_cards(0, 1).is_ok());
        // second swap same round is blocked until reset_round
        assert!(p.swap_cards(1, 2).is_err());
        p.reset_round();
        assert!(p.swap_cards(1, 2).is_ok());
        p.reset_round();
        assert!(p.swap_cards(2, 3).is_ok());
        p.reset_round();
        // budget of 3 exhausted
        assert!(p.swap_cards(3, 4).is_err());
    }

    #[test]
    fn swap_rejects_non_adjacent_positions() {
        let mut p = new_player();
        p.set_sequence(p.hand.clone()).unwrap();
        assert!(p.swap_cards(0, 2).is_err());
    }
}
