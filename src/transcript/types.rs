//! Data types shared by the transcript stages.

use crate::error::{Result, VoxfuseError};
use serde::{Deserialize, Serialize};

/// A token as reported by the alignment collaborator.
///
/// Either timestamp may be missing; such tokens travel through reconciliation
/// untouched and are left out of punctuation restoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedToken {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl TimedToken {
    /// Creates a token carrying both timestamps.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Creates a token without timing.
    pub fn untimed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            end: None,
        }
    }

    /// `(start, end)` when both timestamps are present.
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((self.start?, self.end?))
    }
}

/// One chunk's output from the speech-recognition collaborator: the plain
/// text (with punctuation) and the aligned token stream (often without it).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<TimedToken>,
}

impl ChunkResult {
    pub fn new(text: impl Into<String>, tokens: Vec<TimedToken>) -> Self {
        Self {
            text: text.into(),
            tokens,
        }
    }

    /// True when at least one token carries both timestamps.
    pub fn has_timed_tokens(&self) -> bool {
        self.tokens.iter().any(|t| t.span().is_some())
    }
}

/// A fully timed unit of transcript text, usually a single glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl CharacterToken {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Number of code points in the token text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }
}

/// Rejects tokens whose bounds are non-finite or reversed.
pub fn check_tokens(tokens: &[CharacterToken]) -> Result<()> {
    for (index, token) in tokens.iter().enumerate() {
        if !token.start.is_finite() || !token.end.is_finite() || token.end < token.start {
            return Err(VoxfuseError::InvalidToken {
                index,
                start: token.start,
                end: token.end,
            });
        }
    }
    Ok(())
}

/// A contiguous run of tokens cut by the sentence rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceUnit {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chars: Vec<CharacterToken>,
}

impl SentenceUnit {
    /// Builds a unit from a non-empty token run.
    pub(crate) fn from_tokens(tokens: Vec<CharacterToken>) -> Option<Self> {
        let start = tokens.first()?.start;
        let end = tokens.last()?.end;
        let text = tokens.iter().map(|t| t.text.as_str()).collect();
        Some(Self {
            start,
            end,
            text,
            chars: tokens,
        })
    }

    /// Creates a unit without per-character timing.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            chars: Vec::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
