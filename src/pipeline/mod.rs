//! Orchestration of the external collaborators around the fusion core.
//!
//! Runs are synchronous. Chunk transcription may fan out over scoped worker
//! threads; everything after it is a single pass over in-memory data.

pub mod collaborators;
pub mod orchestrator;
pub mod progress;

pub use collaborators::{
    ChunkTranscriber, Diarizer, MockConverter, MockDiarizer, MockTranscriber, ScriptConverter,
};
pub use orchestrator::{
    FusionOutput, FusionPipeline, convert_segments, convert_text, fuse, fuse_with_converter,
};
pub use progress::{CancellationToken, LogReporter, NoopReporter, Phase, ProgressReporter};
