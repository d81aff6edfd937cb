//! Waveform handling and silence-aware chunk planning.
//!
//! Long recordings are cut into model-sized chunks before they are handed to
//! an external speech recognizer. Cuts land inside detected silence where
//! possible so no word straddles a chunk boundary.

pub mod silence;
pub mod waveform;

pub use silence::{AudioChunk, SegmenterParams, SilenceRegion, detect_silence, segment_audio};
pub use waveform::Waveform;
