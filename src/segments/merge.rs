//! Collapsing consecutive same-speaker sentences and dropping noise.

use crate::defaults;
use crate::error::{Result, VoxfuseError};
use crate::speakers::TaggedSentence;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeParams {
    /// Same-speaker neighbours separated by less than this (seconds) are merged.
    pub gap_threshold: f64,
    /// Blank segments shorter than this (seconds) are dropped.
    pub noise_min_duration: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            gap_threshold: defaults::GAP_THRESHOLD_SECS,
            noise_min_duration: defaults::NOISE_MIN_DURATION_SECS,
        }
    }
}

impl MergeParams {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("merge.gap_threshold", self.gap_threshold),
            ("merge.noise_min_duration", self.noise_min_duration),
        ];
        for (key, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(VoxfuseError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: format!("must be a positive number of seconds, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// A speaker-homogeneous span of transcript. Per-character timing is gone
/// at this point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSegment {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
    pub text: String,
}

impl MergedSegment {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    /// A segment attributed to the unknown speaker.
    pub fn unknown(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self::new(start, end, defaults::UNKNOWN_SPEAKER, text)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True for blank segments too short to be speech.
    pub fn is_noise(&self, min_duration: f64) -> bool {
        self.duration() < min_duration && self.text.trim().is_empty()
    }

    fn absorb(&mut self, sentence: &TaggedSentence) {
        self.end = sentence.end;
        self.text.push_str(&sentence.text);
    }
}

impl From<&TaggedSentence> for MergedSegment {
    fn from(sentence: &TaggedSentence) -> Self {
        Self::new(sentence.start, sentence.end, &sentence.speaker, &sentence.text)
    }
}

/// Folds each sentence into the previous segment when the speaker matches and
/// the gap is below `gap_threshold`; otherwise starts a new segment.
pub fn merge_sentences(sentences: &[TaggedSentence], gap_threshold: f64) -> Vec<MergedSegment> {
    let mut merged: Vec<MergedSegment> = Vec::new();

    for sentence in sentences {
        match merged.last_mut() {
            Some(prev)
                if prev.speaker == sentence.speaker
                    && sentence.start - prev.end < gap_threshold =>
            {
                prev.absorb(sentence);
            }
            _ => merged.push(MergedSegment::from(sentence)),
        }
    }
    merged
}

/// Drops blank segments shorter than `min_duration`.
pub fn filter_noise(segments: Vec<MergedSegment>, min_duration: f64) -> Vec<MergedSegment> {
    segments
        .into_iter()
        .filter(|segment| !segment.is_noise(min_duration))
        .collect()
}

/// Merges same-speaker neighbours, then removes noise.
pub fn merge_and_filter(sentences: &[TaggedSentence], params: &MergeParams) -> Vec<MergedSegment> {
    let merged = merge_sentences(sentences, params.gap_threshold);
    let before = merged.len();
    let kept = filter_noise(merged, params.noise_min_duration);

    debug!(
        sentences = sentences.len(),
        merged = before,
        dropped = before - kept.len(),
        "merged speaker segments"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speakers::Resolution;

    fn tagged(start: f64, end: f64, speaker: &str, text: &str) -> TaggedSentence {
        TaggedSentence {
            start,
            end,
            text: text.to_string(),
            speaker: speaker.to_string(),
            resolution: Resolution::Overlap,
        }
    }

    #[test]
    fn test_adjacent_same_speaker_merge() {
        let sentences = vec![
            tagged(0.0, 2.0, "A", "你好。"),
            tagged(2.5, 4.0, "A", "再見。"),
        ];
        let merged = merge_and_filter(&sentences, &MergeParams::default());

        assert_eq!(merged, vec![MergedSegment::new(0.0, 4.0, "A", "你好。再見。")]);
    }

    #[test]
    fn test_speaker_change_starts_new_segment() {
        let sentences = vec![
            tagged(0.0, 1.0, "A", "一"),
            tagged(1.1, 2.0, "B", "二"),
            tagged(2.1, 3.0, "A", "三"),
        ];
        let merged = merge_and_filter(&sentences, &MergeParams::default());

        let speakers: Vec<&str> = merged.iter().map(|s| s.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_large_gap_splits_same_speaker() {
        let sentences = vec![tagged(0.0, 1.0, "A", "一"), tagged(2.0, 3.0, "A", "二")];
        let merged = merge_and_filter(&sentences, &MergeParams::default());

        // A gap equal to the threshold does not merge
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_overlapping_sentences_merge() {
        let sentences = vec![tagged(0.0, 2.0, "A", "一"), tagged(1.5, 3.0, "A", "二")];
        let merged = merge_and_filter(&sentences, &MergeParams::default());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].end, 3.0);
    }

    #[test]
    fn test_blank_short_segment_is_dropped() {
        let sentences = vec![
            tagged(0.0, 1.0, "A", "內容"),
            tagged(5.0, 5.01, "B", "  "),
            tagged(9.0, 9.01, "A", "嗯"),
        ];
        let merged = merge_and_filter(&sentences, &MergeParams::default());

        let texts: Vec<&str> = merged.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["內容", "嗯"]);
    }

    #[test]
    fn test_blank_long_segment_is_kept() {
        let merged = filter_noise(vec![MergedSegment::new(0.0, 1.0, "A", "")], 0.05);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_and_filter(&[], &MergeParams::default()).is_empty());
    }

    #[test]
    fn test_unknown_segment() {
        let segment = MergedSegment::unknown(0.0, 0.0, "全文");
        assert_eq!(segment.speaker, "UNKNOWN");
        assert_eq!(segment.duration(), 0.0);
    }

    #[test]
    fn test_validate_rejects_negative_gap() {
        let params = MergeParams {
            gap_threshold: -1.0,
            ..MergeParams::default()
        };
        assert!(params.validate().is_err());
        assert!(MergeParams::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let zero_gap = MergeParams {
            gap_threshold: 0.0,
            ..MergeParams::default()
        };
        let zero_noise = MergeParams {
            noise_min_duration: 0.0,
            ..MergeParams::default()
        };

        for (params, expected_key) in [
            (zero_gap, "merge.gap_threshold"),
            (zero_noise, "merge.noise_min_duration"),
        ] {
            match params.validate() {
                Err(VoxfuseError::ConfigInvalidValue { key, .. }) => assert_eq!(key, expected_key),
                other => panic!("Expected ConfigInvalidValue, got {:?}", other),
            }
        }
    }
}
