//! Plain-text and SRT rendering of fusion results.
//!
//! Pure string builders; callers decide where the text goes.

use crate::segments::{MergedSegment, SubtitleSentence};
use crate::transcript::ChunkResult;

/// Formats seconds as `MM:SS.mmm`, or `HH:MM:SS.mmm` from one hour up.
pub fn format_time(secs: f64) -> String {
    let secs = secs.max(0.0);
    let hours = (secs / 3600.0).floor() as u64;
    let minutes = ((secs % 3600.0) / 60.0).floor() as u64;
    let seconds = secs % 60.0;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:06.3}")
    } else {
        format!("{minutes:02}:{seconds:06.3}")
    }
}

/// Formats seconds as an SRT timestamp `HH:MM:SS,mmm`. Milliseconds are
/// truncated, not rounded.
pub fn format_srt_time(secs: f64) -> String {
    let secs = secs.max(0.0);
    let hours = (secs / 3600.0).floor() as u64;
    let minutes = ((secs % 3600.0) / 60.0).floor() as u64;
    let seconds = (secs % 60.0).floor() as u64;
    let millis = ((secs % 1.0) * 1000.0) as u64;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// One line per segment: `[start → end] SPEAKER: text`.
pub fn to_txt(segments: &[MergedSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        let start = format_time(segment.start);
        let end = format_time(segment.end);
        if segment.speaker.is_empty() {
            out.push_str(&format!("[{start} → {end}] {}\n", segment.text));
        } else {
            out.push_str(&format!(
                "[{start} → {end}] {}: {}\n",
                segment.speaker, segment.text
            ));
        }
    }
    out
}

fn srt_cue(index: usize, start: f64, end: f64, text: &str) -> String {
    format!(
        "{index}\n{} --> {}\n{text}\n\n",
        format_srt_time(start),
        format_srt_time(end)
    )
}

/// Numbered SRT cues with the speaker as a `[SPEAKER]` prefix.
pub fn to_srt(segments: &[MergedSegment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let text = if segment.speaker.is_empty() {
                segment.text.clone()
            } else {
                format!("[{}] {}", segment.speaker, segment.text)
            };
            srt_cue(i + 1, segment.start, segment.end, &text)
        })
        .collect()
}

/// Alternating timestamp and text lines, as used for video descriptions.
pub fn to_subtitle_txt(sentences: &[SubtitleSentence]) -> String {
    sentences
        .iter()
        .map(|sentence| format!("{}\n{}\n", format_time(sentence.start), sentence.text))
        .collect()
}

/// Numbered single-sentence SRT cues.
pub fn to_subtitle_srt(sentences: &[SubtitleSentence]) -> String {
    sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| srt_cue(i + 1, sentence.start, sentence.end, &sentence.text))
        .collect()
}

/// The recognizer's plain text for the whole recording, in chunk order.
pub fn raw_text(results: &[ChunkResult]) -> String {
    results.iter().map(|r| r.text.as_str()).collect()
}
