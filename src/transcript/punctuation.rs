//! Punctuation restoration.
//!
//! The recognizer's plain text carries punctuation, but its aligned token
//! stream usually drops it (or bundles several glyphs into one token). A
//! tolerant character scan over the plain text re-attaches each punctuation
//! mark to the timed token that precedes it.
//!
//! The scan only attaches while it is in sync with the token stream. One
//! unmatched non-punctuation character is enough to suspend attaching until
//! the next successful match, so punctuation around text the aligner skipped
//! may be dropped.

use crate::transcript::types::{CharacterToken, TimedToken};
use tracing::debug;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Symbols treated as punctuation on top of the Unicode P* categories.
const EXPLICIT_PUNCTUATION: &str =
    "，。！？、；：＂＇（）《》【】…—·,.:;!?'\"()[]{}~@#$%^&*+-=/<>";

/// Returns true for any character in a Unicode punctuation category (Pc, Pd,
/// Ps, Pe, Pi, Pf, Po) and for the symbols in [`EXPLICIT_PUNCTUATION`].
pub fn is_punctuation(ch: char) -> bool {
    if EXPLICIT_PUNCTUATION.contains(ch) {
        return true;
    }
    matches!(
        get_general_category(ch),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Folds the punctuation of `plain_text` into the timed tokens.
///
/// Tokens missing either timestamp are dropped first. The result has one
/// entry per remaining token, with the same timing; only text grows.
pub fn restore_punctuation(plain_text: &str, tokens: &[TimedToken]) -> Vec<CharacterToken> {
    let mut restored: Vec<CharacterToken> = tokens
        .iter()
        .filter_map(|token| {
            let (start, end) = token.span()?;
            Some(CharacterToken::new(token.text.clone(), start, end))
        })
        .collect();

    if restored.is_empty() || plain_text.is_empty() {
        return restored;
    }

    // Match against the aligner's text, not the growing restored text
    let expected: Vec<Vec<char>> = restored.iter().map(|t| t.text.chars().collect()).collect();

    let mut cursor = 0usize;
    let mut sub_index = 0usize;
    let mut mismatches = 0usize;
    let mut attached = 0usize;

    for ch in plain_text.chars() {
        while cursor < expected.len() && expected[cursor].is_empty() {
            cursor += 1;
        }

        if cursor >= expected.len() {
            // Trailing mode: only punctuation directly after the last token
            if !is_punctuation(ch) {
                break;
            }
            if let Some(last) = restored.last_mut() {
                last.text.push(ch);
                attached += 1;
            }
            continue;
        }

        let token = &expected[cursor];
        if sub_index < token.len() && token[sub_index] == ch {
            sub_index += 1;
            mismatches = 0;
            if sub_index >= token.len() {
                cursor += 1;
                sub_index = 0;
            }
        } else if is_punctuation(ch) {
            if mismatches == 0 && cursor > 0 {
                restored[cursor - 1].text.push(ch);
                attached += 1;
            }
        } else {
            mismatches += 1;
        }
    }

    debug!(
        tokens = restored.len(),
        attached, "restored punctuation into token stream"
    );
    restored
}
