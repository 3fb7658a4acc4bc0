//! Pure input-validation layer. Every inbound event's user-controlled fields pass through here
//! before reaching the lobby registry or a session.

use crate::deck::Card;
use crate::protocol::lobby_codes::{self, LOBBY_ID_LENGTH};

pub const MAX_PLAYER_NAME_LENGTH: usize = 20;
pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const MAX_PLAYER_ID_LENGTH: usize = 100;

/// Trims, truncates, and strips characters that could be used for markup injection in a client
/// that renders names as-is. Falls back to a default name when nothing usable remains.
pub fn sanitize_player_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect();
    let truncated: String = cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect();
    let truncated = truncated.trim().to_string();
    if truncated.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        truncated
    }
}

/// Normalizes and validates a lobby id: uppercased, exactly [`LOBBY_ID_LENGTH`] characters from
/// the clean alphabet.
pub fn normalize_lobby_id(raw: &str) -> Option<String> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.len() != LOBBY_ID_LENGTH {
        return None;
    }
    if !lobby_codes::is_valid_format(&upper) {
        return None;
    }
    Some(upper)
}

/// A caller-supplied player id is accepted if it looks like a UUID, looks like
/// `player_<a>_<b>`, or is a short alphanumeric/underscore/hyphen token.
pub fn is_valid_player_id_string(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > MAX_PLAYER_ID_LENGTH {
        return false;
    }
    if raw.len() == 36 && uuid::Uuid::parse_str(raw).is_ok() {
        return true;
    }
    if let Some(rest) = raw.strip_prefix("player_") {
        let mut parts = rest.splitn(2, '_');
        let (a, b) = (parts.next(), parts.next());
        if let (Some(a), Some(b)) = (a, b) {
            return !a.is_empty()
                && !b.is_empty()
                && a.chars().all(|c| c.is_ascii_alphanumeric())
                && b.chars().all(|c| c.is_ascii_alphanumeric());
        }
        return false;
    }
    raw.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A submitted sequence is valid iff it is the same length as `hand` and is a permutation of it
/// by card identity.
pub fn is_permutation_of_hand(sequence: &[Card], hand: &[Card]) -> bool {
    if sequence.len() != hand.len() {
        return false;
    }
    let mut seq_ids: Vec<_> = sequence.iter().map(|c| c.id).collect();
    let mut hand_ids: Vec<_> = hand.iter().map(|c| c.id).collect();
    seq_ids.sort();
    hand_ids.sort();
    seq_ids == hand_ids
}

/// Swap positions are valid iff both are within the player's remaining-cards view for the
/// current round and are adjacent.
pub fn is_valid_swap_positions(pos1: i64, pos2: i64, cards_remaining: usize) -> bool {
    if pos1 < 0 || pos2 < 0 {
        return false;
    }
    let (pos1, pos2) = (pos1 as usize, pos2 as usize);
    pos1 < cards_remaining && pos2 < cards_remaining && pos1.abs_diff(pos2) == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sanitize_strips_markup_characters_and_truncates() {
        assert_eq!(sanitize_player_name("  Bob<script>  "), "Bobscript");
        let long = "x".repeat(50);
        assert_eq!(sanitize_player_name(&long).len(), MAX_PLAYER_NAME_LENGTH);
        assert_eq!(sanitize_player_name(""), DEFAULT_PLAYER_NAME);
        assert_eq!(sanitize_player_name("   "), DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn normalize_lobby_id_rejects_wrong_length_and_bad_chars() {
        assert!(normalize_lobby_id("abc123").is_none()); // contains '1'
        assert!(normalize_lobby_id("ABCDE").is_none());
        assert_eq!(
            normalize_lobby_id("abcdez").unwrap(),
            "ABCDEZ".to_string()
        );
    }

    #[test]
    fn swap_positions_require_adjacency_and_bounds() {
        assert!(is_valid_swap_positions(0, 1, 6));
        assert!(!is_valid_swap_positions(0, 2, 6));
        assert!(!is_valid_swap_positions(5, 6, 6));
        assert!(!is_valid_swap_positions(-1, 0, 6));
    }

    proptest! {
        #[test]
        fn sanitize_player_name_never_exceeds_max_length(raw in ".{0,200}") {
            let cleaned = sanitize_player_name(&raw);
            prop_assert!(cleaned.chars().count() <= MAX_PLAYER_NAME_LENGTH);
            prop_assert!(!cleaned.is_empty());
        }

        #[test]
        fn normalize_lobby_id_output_is_always_clean_alphabet(raw in "[A-Za-z0-9]{6}") {
            if let Some(normalized) = normalize_lobby_id(&raw) {
                prop_assert_eq!(normalized.len(), LOBBY_ID_LENGTH);
                prop_assert!(lobby_codes::is_valid_format(&normalized));
            }
        }
    }
}
