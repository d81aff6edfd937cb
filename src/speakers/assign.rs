//! Sentence-level speaker assignment.
//!
//! A sentence goes to the speaker with the most overlapping turn time. With no
//! overlap, the turn nearest to the sentence midpoint wins if it is close
//! enough; otherwise the previous speaker carries over.

use crate::defaults;
use crate::error::{Result, VoxfuseError};
use crate::speakers::turn::{DiarizationTurn, validate_turns};
use crate::transcript::types::SentenceUnit;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerParams {
    /// Nearest-turn fallback is accepted up to this distance (seconds).
    pub max_nearest_distance: f64,
}

impl Default for SpeakerParams {
    fn default() -> Self {
        Self {
            max_nearest_distance: defaults::MAX_NEAREST_TURN_SECS,
        }
    }
}

impl SpeakerParams {
    pub fn validate(&self) -> Result<()> {
        if !self.max_nearest_distance.is_finite() || self.max_nearest_distance < 0.0 {
            return Err(VoxfuseError::ConfigInvalidValue {
                key: "speakers.max_nearest_distance".to_string(),
                message: format!(
                    "must be zero or more seconds, got {}",
                    self.max_nearest_distance
                ),
            });
        }
        Ok(())
    }
}

/// How a sentence's speaker was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Largest summed overlap.
    Overlap,
    /// Nearest turn within range.
    Nearest,
    /// Previous speaker reused.
    CarriedOver,
    /// No diarization available.
    Unknown,
}

/// A sentence with its speaker label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSentence {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub speaker: String,
    pub resolution: Resolution,
}

impl TaggedSentence {
    fn new(sentence: &SentenceUnit, speaker: &str, resolution: Resolution) -> Self {
        Self {
            start: sentence.start,
            end: sentence.end,
            text: sentence.text.clone(),
            speaker: speaker.to_string(),
            resolution,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Speaker with the largest summed overlap; ties go to the speaker seen first
/// in turn order.
fn dominant_speaker<'a>(start: f64, end: f64, turns: &'a [DiarizationTurn]) -> Option<&'a str> {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    for turn in turns {
        let overlap = turn.overlap(start, end);
        if overlap <= 0.0 {
            continue;
        }
        match totals.iter_mut().find(|(speaker, _)| *speaker == turn.speaker) {
            Some((_, total)) => *total += overlap,
            None => totals.push((turn.speaker.as_str(), overlap)),
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (speaker, total) in totals {
        if best.is_none_or(|(_, max)| total > max) {
            best = Some((speaker, total));
        }
    }
    best.map(|(speaker, _)| speaker)
}

/// Closest turn to `t` and its distance; the earliest turn wins ties.
fn nearest_turn(t: f64, turns: &[DiarizationTurn]) -> Option<(&str, f64)> {
    let mut nearest: Option<(&str, f64)> = None;
    for turn in turns {
        let distance = turn.distance_to(t);
        if nearest.is_none_or(|(_, min)| distance < min) {
            nearest = Some((turn.speaker.as_str(), distance));
        }
    }
    nearest
}

/// Labels every sentence with a speaker.
///
/// Sentences come back in input order, one per input. Without turns every
/// sentence is labelled with the unknown speaker.
///
/// A zero-duration sentence is not carried over blindly. It skips the
/// overlap sum and goes straight to the nearest-turn rule, so a point
/// sentence sitting on a turn boundary takes that turn's speaker. It only
/// inherits the previous speaker when no turn lies within
/// `max_nearest_distance`.
pub fn assign_speakers(
    sentences: &[SentenceUnit],
    turns: &[DiarizationTurn],
    params: &SpeakerParams,
) -> Result<Vec<TaggedSentence>> {
    validate_turns(turns)?;

    let Some(first) = turns.first() else {
        debug!(
            sentences = sentences.len(),
            "no diarization turns, labelling sentences as unknown"
        );
        return Ok(sentences
            .iter()
            .map(|s| TaggedSentence::new(s, defaults::UNKNOWN_SPEAKER, Resolution::Unknown))
            .collect());
    };

    let mut last_speaker: &str = &first.speaker;
    let mut tagged = Vec::with_capacity(sentences.len());
    let mut carried = 0usize;

    for sentence in sentences {
        // Zero-length sentences cannot overlap anything; go straight to distance
        if sentence.duration() > 0.0
            && let Some(speaker) = dominant_speaker(sentence.start, sentence.end, turns)
        {
            last_speaker = speaker;
            tagged.push(TaggedSentence::new(sentence, speaker, Resolution::Overlap));
            continue;
        }

        let midpoint = (sentence.start + sentence.end) / 2.0;
        match nearest_turn(midpoint, turns) {
            Some((speaker, distance)) if distance <= params.max_nearest_distance => {
                last_speaker = speaker;
                tagged.push(TaggedSentence::new(sentence, speaker, Resolution::Nearest));
            }
            _ => {
                carried += 1;
                tagged.push(TaggedSentence::new(
                    sentence,
                    last_speaker,
                    Resolution::CarriedOver,
                ));
            }
        }
    }

    debug!(
        sentences = tagged.len(),
        turns = turns.len(),
        carried,
        "assigned speakers"
    );
    Ok(tagged)
}
