//! Speaker-homogeneous segments: merging, noise filtering and subtitle
//! re-splitting.

pub mod merge;
pub mod subtitle;

pub use merge::{MergeParams, MergedSegment, filter_noise, merge_and_filter, merge_sentences};
pub use subtitle::{SubtitleSentence, resplit_for_subtitles, round_millis};
