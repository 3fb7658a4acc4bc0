//! Card model, deck construction/dealing, and the win relation.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CARDS_PER_KIND: usize = 3;
pub const CARDS_PER_PLAYER: usize = 6;
pub const FULL_DECK_SIZE: usize = CARDS_PER_KIND * 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Rock,
    Paper,
    Scissors,
}

impl CardKind {
    const ALL: [CardKind; 3] = [CardKind::Rock, CardKind::Paper, CardKind::Scissors];

    /// The color tag a client renders for this kind; derived, not stored independently.
    pub fn color(self) -> &'static str {
        match self {
            CardKind::Rock => "gray",
            CardKind::Paper => "blue",
            CardKind::Scissors => "red",
        }
    }

    /// `true` if `self` beats `other` under rock/scissors/paper.
    pub fn beats(self, other: CardKind) -> bool {
        matches!(
            (self, other),
            (CardKind::Rock, CardKind::Scissors)
                | (CardKind::Scissors, CardKind::Paper)
                | (CardKind::Paper, CardKind::Rock)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub kind: CardKind,
}

impl Card {
    fn new(kind: CardKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }
}

/// A canonical nine-card deck: three of each kind.
pub struct Deck;

impl Deck {
    fn full() -> Vec<Card> {
        let mut cards = Vec::with_capacity(FULL_DECK_SIZE);
        for kind in CardKind::ALL {
            for _ in 0..CARDS_PER_KIND {
                cards.push(Card::new(kind));
            }
        }
        cards
    }

    /// Deals a uniformly shuffled six-card hand from a fresh canonical deck.
    pub fn deal() -> Vec<Card> {
        let mut cards = Self::full();
        cards.shuffle(&mut rand::rng());
        cards.truncate(CARDS_PER_PLAYER);
        cards
    }

    /// Returns a uniformly shuffled permutation of `cards`, used to auto-commit a sequence
    /// when a player fails to submit one before the sequence timer expires.
    pub fn shuffled(cards: &[Card]) -> Vec<Card> {
        let mut out = cards.to_vec();
        out.shuffle(&mut rand::rng());
        out
    }
}

/// The outcome of a single round's card comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    FirstWins,
    SecondWins,
    Draw,
}

/// Compares two revealed cards and determines the round's outcome.
pub fn resolve_round(first: Card, second: Card) -> RoundOutcome {
    if first.kind == second.kind {
        RoundOutcome::Draw
    } else if first.kind.beats(second.kind) {
        RoundOutcome::FirstWins
    } else {
        RoundOutcome::SecondWins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deal_returns_six_distinct_cards_from_the_canonical_deck() {
        let hand = Deck::deal();
        assert_eq!(hand.len(), CARDS_PER_PLAYER);
        let ids: HashSet<_> = hand.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CARDS_PER_PLAYER);

        let mut counts = [0usize; 3];
        for card in &hand {
            counts[card.kind as usize] += 1;
        }
        for count in counts {
            assert!(count <= CARDS_PER_KIND);
        }
    }

    #[test]
    fn rock_paper_scissors_relation_is_cyclic() {
        assert!(CardKind::Rock.beats(CardKind::Scissors));
        assert!(CardKind::Scissors.beats(CardKind::Paper));
        assert!(CardKind::Paper.beats(CardKind::Rock));
        assert!(!CardKind::Rock.beats(CardKind::Paper));
        assert!(!CardKind::Rock.beats(CardKind::Rock));
    }

    #[test]
    fn resolve_round_matches_the_win_relation() {
        let rock = Card::new(CardKind::Rock);
        let paper = Card::new(CardKind::Paper);
        let rock2 = Card::new(CardKind::Rock);

        assert_eq!(resolve_round(rock, paper), RoundOutcome::SecondWins);
        assert_eq!(resolve_round(paper, rock), RoundOutcome::FirstWins);
        assert_eq!(resolve_round(rock, rock2), RoundOutcome::Draw);
    }

    #[test]
    fn shuffled_preserves_multiset_identity() {
        let hand = Deck::deal();
        let shuffled = Deck::shuffled(&hand);
        let mut a: Vec<_> = hand.iter().map(|c| c.id).collect();
        let mut b: Vec<_> = shuffled.iter().map(|c| c.id).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
