//! Punctuation-driven sentence segmentation over timed tokens.

use crate::defaults;
use crate::error::{Result, VoxfuseError};
use crate::transcript::types::{CharacterToken, SentenceUnit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cut rules shared by sentence segmentation and subtitle re-splitting.
///
/// A buffer is cut when its last mark ends a sentence, when it is at least
/// `max_chars` long and the last mark is a soft cut, or unconditionally once
/// it reaches `force_chars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutRules {
    /// Length (chars) from which a soft-cut mark ends the buffer.
    pub max_chars: usize,
    /// Length (chars) at which the buffer is cut regardless of punctuation.
    pub force_chars: usize,
    /// Marks that always end a sentence.
    pub sentence_end_chars: String,
    /// Marks that end a sentence once `max_chars` is reached.
    pub soft_cut_chars: String,
}

impl Default for CutRules {
    fn default() -> Self {
        Self {
            max_chars: defaults::MAX_SENTENCE_CHARS,
            force_chars: defaults::FORCE_CUT_CHARS,
            sentence_end_chars: defaults::SENTENCE_END_CHARS.to_string(),
            soft_cut_chars: defaults::SOFT_CUT_CHARS.to_string(),
        }
    }
}

impl CutRules {
    /// Checks the thresholds. `section` prefixes the key in error messages.
    pub fn validate(&self, section: &str) -> Result<()> {
        if self.max_chars == 0 {
            return Err(VoxfuseError::ConfigInvalidValue {
                key: format!("{section}.max_chars"),
                message: "must be at least 1".to_string(),
            });
        }
        if self.force_chars < self.max_chars {
            return Err(VoxfuseError::ConfigInvalidValue {
                key: format!("{section}.force_chars"),
                message: format!(
                    "must be >= max_chars ({}), got {}",
                    self.max_chars, self.force_chars
                ),
            });
        }
        Ok(())
    }

    pub fn is_sentence_end(&self, ch: char) -> bool {
        self.sentence_end_chars.contains(ch)
    }

    pub fn is_soft_cut(&self, ch: char) -> bool {
        self.soft_cut_chars.contains(ch)
    }

    /// Decides whether a buffer of `buffered` chars ending in `last` is cut.
    pub fn should_cut(&self, last: Option<char>, buffered: usize) -> bool {
        if last.is_some_and(|ch| self.is_sentence_end(ch)) {
            return true;
        }
        if buffered >= self.max_chars && last.is_some_and(|ch| self.is_soft_cut(ch)) {
            return true;
        }
        buffered >= self.force_chars
    }
}

/// Groups punctuation-restored tokens into sentences.
///
/// Every token lands in exactly one sentence, in order. Each sentence spans
/// its first token's start to its last token's end.
pub fn split_sentences(tokens: &[CharacterToken], rules: &CutRules) -> Vec<SentenceUnit> {
    let mut sentences = Vec::new();
    let mut buffer: Vec<CharacterToken> = Vec::new();
    let mut buffered = 0usize;

    for token in tokens {
        buffered += token.char_count();
        buffer.push(token.clone());

        if rules.should_cut(token.last_char(), buffered) {
            sentences.extend(SentenceUnit::from_tokens(std::mem::take(&mut buffer)));
            buffered = 0;
        }
    }
    sentences.extend(SentenceUnit::from_tokens(buffer));

    debug!(
        tokens = tokens.len(),
        sentences = sentences.len(),
        "split transcript into sentences"
    );
    sentences
}
