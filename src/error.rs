//! Error types for voxfuse.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxfuseError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Structurally invalid input
    #[error("Invalid diarization turn #{index}: start {start}s, end {end}s")]
    InvalidTurn { index: usize, start: f64, end: f64 },

    #[error("Invalid token #{index}: start {start}s, end {end}s")]
    InvalidToken { index: usize, start: f64, end: f64 },

    #[error("Invalid waveform: {message}")]
    InvalidWaveform { message: String },

    #[error("Chunk count mismatch: {results} transcription results for {chunks} chunks")]
    ChunkMismatch { results: usize, chunks: usize },

    // Collaborator failures surfaced by the orchestrator
    #[error("Transcription of chunk {chunk} failed: {message}")]
    Transcription { chunk: usize, message: String },

    #[error("Diarization failed: {message}")]
    Diarization { message: String },

    #[error("Script conversion failed: {message}")]
    Conversion { message: String },

    #[error("Cancelled after {phase}")]
    Cancelled { phase: String },

    // Serialization and I/O
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxfuseError>;
