//! Ambiguity-free lobby id generation.
//!
//! The alphabet below excludes `0`/`O`, `1`/`I`/`L` so a player reading a code aloud over voice
//! chat can't confuse characters. It is the same clean alphabet this codebase has always used for
//! its room codes.

use rand::RngExt;

pub const LOBBY_ID_LENGTH: usize = 6;
const CLEAN_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a single candidate lobby id. Not guaranteed unique; callers retry against their own
/// registry via [`generate_unique`].
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..LOBBY_ID_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CLEAN_CHARS.len());
            CLEAN_CHARS[idx] as char
        })
        .collect()
}

/// Generates a lobby id not already reported as taken by `exists`, retrying a bounded number of
/// times before giving up (mirrors the defensive bound the teacher's region-prefixed room code
/// generator applies when a requested prefix can't be satisfied).
pub fn generate_unique(exists: impl Fn(&str) -> bool) -> Option<String> {
    const MAX_ATTEMPTS: usize = 20;
    for _ in 0..MAX_ATTEMPTS {
        let candidate = generate();
        if !exists(&candidate) {
            return Some(candidate);
        }
    }
    None
}

pub fn is_valid_format(candidate: &str) -> bool {
    candidate.len() == LOBBY_ID_LENGTH
        && candidate
            .bytes()
            .all(|b| CLEAN_CHARS.contains(&b.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_codes_use_only_the_clean_alphabet() {
        for _ in 0..200 {
            let code = generate();
            assert_eq!(code.len(), LOBBY_ID_LENGTH);
            assert!(is_valid_format(&code));
            assert!(!code.contains(['0', 'O', '1', 'I', 'L']));
        }
    }

    #[test]
    fn generate_unique_avoids_taken_codes() {
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let code = generate_unique(|c| seen.contains(c)).unwrap();
            assert!(seen.insert(code));
        }
    }

    #[test]
    fn generate_unique_gives_up_when_everything_is_taken() {
        assert!(generate_unique(|_| true).is_none());
    }
}
