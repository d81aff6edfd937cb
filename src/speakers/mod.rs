//! Speaker attribution: diarization turns and the sentence-to-speaker assigner.

pub mod assign;
pub mod turn;

pub use assign::{Resolution, SpeakerParams, TaggedSentence, assign_speakers};
pub use turn::{DiarizationTurn, validate_turns};
