//! Re-splitting merged segments into subtitle-sized sentences.
//!
//! Merging discards per-character timing, so subtitle times are interpolated
//! linearly across each segment's characters. The result is approximate but
//! keeps subtitle formatting independent of the token stream.

use crate::segments::merge::MergedSegment;
use crate::transcript::CutRules;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One subtitle line with interpolated timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSentence {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl SubtitleSentence {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Rounds seconds to millisecond precision.
pub fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

fn resplit_segment(segment: &MergedSegment, rules: &CutRules, out: &mut Vec<SubtitleSentence>) {
    let chars: Vec<char> = segment.text.chars().collect();
    let char_duration = segment.duration() / chars.len() as f64;

    let mut buffer = String::new();
    let mut buffered = 0usize;
    let mut buf_start = 0usize;

    let mut emit = |buffer: &str, from: f64, to: f64| {
        let text = buffer.trim();
        if !text.is_empty() {
            out.push(SubtitleSentence {
                start: round_millis(from),
                end: round_millis(to),
                text: text.to_string(),
            });
        }
    };

    for (index, &ch) in chars.iter().enumerate() {
        buffer.push(ch);
        buffered += 1;

        if rules.should_cut(Some(ch), buffered) {
            let from = segment.start + buf_start as f64 * char_duration;
            let to = segment.start + (index + 1) as f64 * char_duration;
            emit(&buffer, from, to);
            buffer.clear();
            buffered = 0;
            buf_start = index + 1;
        }
    }

    // The remainder runs to the segment end, not the interpolated point
    let from = segment.start + buf_start as f64 * char_duration;
    emit(&buffer, from, segment.end);
}

/// Splits every segment into subtitle sentences using the same cut rules as
/// sentence segmentation, applied per character.
///
/// Blank segments are skipped. Text is trimmed; times are rounded to the
/// millisecond.
pub fn resplit_for_subtitles(segments: &[MergedSegment], rules: &CutRules) -> Vec<SubtitleSentence> {
    let mut sentences = Vec::new();
    for segment in segments {
        if segment.text.trim().is_empty() {
            continue;
        }
        resplit_segment(segment, rules, &mut sentences);
    }

    debug!(
        segments = segments.len(),
        subtitles = sentences.len(),
        "re-split segments for subtitles"
    );
    sentences
}
