//! voxfuse - Speaker-attributed transcripts from ASR and diarization output
//!
//! Fuses per-chunk speech-recognition results and speaker-diarization turns
//! into speaker-labelled segments and subtitle-sized sentences. Model
//! inference stays outside the crate, behind the traits in [`pipeline`].

// Library code propagates errors instead of panicking
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod io;
pub mod output;
pub mod pipeline;
pub mod segments;
pub mod speakers;
pub mod transcript;

// Stages
pub use audio::{AudioChunk, SegmenterParams, SilenceRegion, Waveform, segment_audio};
pub use segments::{
    MergeParams, MergedSegment, SubtitleSentence, merge_and_filter, resplit_for_subtitles,
};
pub use speakers::{DiarizationTurn, SpeakerParams, TaggedSentence, assign_speakers};
pub use transcript::{
    CharacterToken, ChunkResult, CutRules, SentenceUnit, TimedToken, reconcile,
    restore_punctuation, split_sentences,
};

// Orchestration
pub use pipeline::{
    CancellationToken, ChunkTranscriber, Diarizer, FusionOutput, FusionPipeline, Phase,
    ProgressReporter, ScriptConverter, fuse, fuse_with_converter,
};

// Error handling
pub use error::{Result, VoxfuseError};

// Config
pub use config::Config;
