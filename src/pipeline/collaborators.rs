//! Seams for the external speech-recognition, diarization and script
//! conversion backends.
//!
//! The engine never runs a model itself. Callers plug in implementations of
//! these traits; the mocks here stand in for them in tests.

use crate::audio::Waveform;
use crate::error::{Result, VoxfuseError};
use crate::speakers::DiarizationTurn;
use crate::transcript::ChunkResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Speech recognition plus forced alignment for one chunk of audio.
///
/// Token timestamps in the returned result are relative to the start of the
/// chunk. Implementations must be shareable across worker threads.
pub trait ChunkTranscriber: Send + Sync {
    /// Transcribe one chunk.
    fn transcribe(&self, audio: &Waveform) -> Result<ChunkResult>;

    /// Name of the underlying model, for logs.
    fn model_name(&self) -> &str;
}

/// Implement ChunkTranscriber for Arc<T> to allow sharing across pipelines.
impl<T: ChunkTranscriber + ?Sized> ChunkTranscriber for Arc<T> {
    fn transcribe(&self, audio: &Waveform) -> Result<ChunkResult> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Speaker diarization over the whole recording.
pub trait Diarizer: Send + Sync {
    /// Returns turns sorted by start time.
    fn diarize(&self, audio: &Waveform) -> Result<Vec<DiarizationTurn>>;
}

impl<T: Diarizer + ?Sized> Diarizer for Arc<T> {
    fn diarize(&self, audio: &Waveform) -> Result<Vec<DiarizationTurn>> {
        (**self).diarize(audio)
    }
}

/// Chinese script conversion of finished text, e.g. an OpenCC binding.
pub trait ScriptConverter: Send + Sync {
    /// Convert `text` using the named conversion profile (such as `s2twp`).
    fn convert(&self, text: &str, profile: &str) -> Result<String>;

    /// Name of the backend, for logs.
    fn name(&self) -> &str;
}

impl<T: ScriptConverter + ?Sized> ScriptConverter for Arc<T> {
    fn convert(&self, text: &str, profile: &str) -> Result<String> {
        (**self).convert(text, profile)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock transcriber for testing
///
/// Hands out scripted results in call order, repeating the last one once the
/// script runs out.
#[derive(Debug)]
pub struct MockTranscriber {
    model_name: String,
    responses: Vec<ChunkResult>,
    fail_on: Option<usize>,
    calls: AtomicUsize,
}

impl MockTranscriber {
    /// Create a new mock transcriber returning empty results
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            responses: Vec::new(),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to return the same result for every chunk
    pub fn with_response(mut self, response: ChunkResult) -> Self {
        self.responses = vec![response];
        self
    }

    /// Configure one result per call, in order
    pub fn with_responses(mut self, responses: Vec<ChunkResult>) -> Self {
        self.responses = responses;
        self
    }

    /// Configure the mock to fail on the given call (0-based)
    pub fn with_failure_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Number of transcribe calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChunkTranscriber for MockTranscriber {
    fn transcribe(&self, _audio: &Waveform) -> Result<ChunkResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(call) {
            return Err(VoxfuseError::Transcription {
                chunk: call,
                message: "mock transcription failure".to_string(),
            });
        }
        let response = self
            .responses
            .get(call)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_default();
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Mock diarizer for testing
#[derive(Debug, Clone, Default)]
pub struct MockDiarizer {
    turns: Vec<DiarizationTurn>,
    should_fail: bool,
}

impl MockDiarizer {
    pub fn new(turns: Vec<DiarizationTurn>) -> Self {
        Self {
            turns,
            should_fail: false,
        }
    }

    /// Configure the mock to fail on diarize
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Diarizer for MockDiarizer {
    fn diarize(&self, _audio: &Waveform) -> Result<Vec<DiarizationTurn>> {
        if self.should_fail {
            Err(VoxfuseError::Diarization {
                message: "mock diarization failure".to_string(),
            })
        } else {
            Ok(self.turns.clone())
        }
    }
}

/// Mock converter for testing
///
/// Replaces characters one for one from a fixed table and leaves everything
/// else untouched. Records the profile of the last call.
#[derive(Debug, Default)]
pub struct MockConverter {
    table: Vec<(char, char)>,
    should_fail: bool,
    last_profile: Mutex<Option<String>>,
}

impl MockConverter {
    pub fn new(table: &[(char, char)]) -> Self {
        Self {
            table: table.to_vec(),
            ..Self::default()
        }
    }

    /// Configure the mock to fail on convert
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Profile passed to the most recent convert call
    pub fn last_profile(&self) -> Option<String> {
        self.last_profile
            .lock()
            .ok()
            .and_then(|profile| profile.clone())
    }
}

impl ScriptConverter for MockConverter {
    fn convert(&self, text: &str, profile: &str) -> Result<String> {
        if let Ok(mut last) = self.last_profile.lock() {
            *last = Some(profile.to_string());
        }
        if self.should_fail {
            return Err(VoxfuseError::Conversion {
                message: "mock conversion failure".to_string(),
            });
        }
        Ok(text
            .chars()
            .map(|ch| {
                self.table
                    .iter()
                    .find(|(from, _)| *from == ch)
                    .map_or(ch, |&(_, to)| to)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock-converter"
    }
}
