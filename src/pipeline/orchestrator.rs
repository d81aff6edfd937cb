//! End-to-end fusion: chunking, transcription, diarization, merging and
//! script conversion.
//!
//! [`fuse`] is the pure core over collaborator output already in memory.
//! [`FusionPipeline`] drives the collaborators around it.

use crate::audio::{AudioChunk, Waveform, segment_audio};
use crate::config::{Config, ConversionConfig};
use crate::error::{Result, VoxfuseError};
use crate::output::raw_text;
use crate::pipeline::collaborators::{ChunkTranscriber, Diarizer, ScriptConverter};
use crate::pipeline::progress::{CancellationToken, NoopReporter, Phase, ProgressReporter};
use crate::segments::{MergedSegment, SubtitleSentence, merge_and_filter, resplit_for_subtitles};
use crate::speakers::{DiarizationTurn, assign_speakers, validate_turns};
use crate::transcript::{
    CharacterToken, ChunkResult, check_tokens, reconcile_chunks, restore_punctuation,
    split_sentences,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionOutput {
    /// Speaker-attributed segments.
    pub merged: Vec<MergedSegment>,
    /// Subtitle-sized sentences re-split from `merged`.
    pub sentences: Vec<SubtitleSentence>,
    /// The recognizer's plain text, in chunk order.
    pub raw_text: String,
    /// The chunk plan the audio was transcribed with.
    pub chunks: Vec<AudioChunk>,
}

/// Reconciles every chunk and restores its punctuation, in chunk order.
fn restored_tokens(results: &[ChunkResult], chunk_starts: &[f64]) -> Result<Vec<CharacterToken>> {
    let reconciled = reconcile_chunks(results, chunk_starts)?;

    let mut tokens = Vec::new();
    for (index, chunk) in reconciled.iter().enumerate() {
        if !chunk.has_timed_tokens() {
            warn!(chunk = index, "chunk result has no timed tokens");
            continue;
        }
        tokens.extend(restore_punctuation(&chunk.text, &chunk.tokens));
    }
    check_tokens(&tokens)?;
    Ok(tokens)
}

/// Runs the algorithmic core over collaborator output already in memory.
///
/// `chunk_starts[i]` is the global offset of `chunk_results[i]`. Degenerate
/// input falls back to a single unknown-speaker segment carrying the raw
/// text: with no timed tokens it spans `0..0`, with no turns it spans the
/// timed tokens. No script conversion is applied.
pub fn fuse(
    chunk_results: &[ChunkResult],
    chunk_starts: &[f64],
    turns: &[DiarizationTurn],
    config: &Config,
) -> Result<Vec<MergedSegment>> {
    validate_turns(turns)?;
    let tokens = restored_tokens(chunk_results, chunk_starts)?;
    let text = raw_text(chunk_results);

    let sentences = split_sentences(&tokens, &config.sentence_rules());
    if sentences.is_empty() {
        debug!("no timed tokens, falling back to a single unknown segment");
        return Ok(vec![MergedSegment::unknown(0.0, 0.0, text)]);
    }

    if turns.is_empty() {
        let start = tokens.first().map_or(0.0, |t| t.start);
        let end = tokens.iter().map(|t| t.end).fold(start, f64::max);
        debug!(start, end, "no diarization turns, emitting one unknown segment");
        return Ok(vec![MergedSegment::unknown(start, end, text)]);
    }

    let tagged = assign_speakers(&sentences, turns, &config.speakers)?;
    Ok(merge_and_filter(&tagged, &config.merge))
}

/// [`fuse`], then converts every segment's text with `converter` when
/// `config.conversion` is enabled.
pub fn fuse_with_converter(
    chunk_results: &[ChunkResult],
    chunk_starts: &[f64],
    turns: &[DiarizationTurn],
    config: &Config,
    converter: &dyn ScriptConverter,
) -> Result<Vec<MergedSegment>> {
    let merged = fuse(chunk_results, chunk_starts, turns, config)?;
    convert_segments(merged, Some(converter), &config.conversion)
}

/// Converts `text` when a converter is present and conversion is enabled;
/// otherwise returns it unchanged.
pub fn convert_text(
    text: String,
    converter: Option<&dyn ScriptConverter>,
    conversion: &ConversionConfig,
) -> Result<String> {
    match converter {
        Some(converter) if conversion.enabled => converter
            .convert(&text, &conversion.profile)
            .map_err(into_conversion_error),
        _ => Ok(text),
    }
}

/// Applies [`convert_text`] to the text of every segment. Timing and speakers
/// are untouched.
pub fn convert_segments(
    segments: Vec<MergedSegment>,
    converter: Option<&dyn ScriptConverter>,
    conversion: &ConversionConfig,
) -> Result<Vec<MergedSegment>> {
    if let Some(converter) = converter
        && conversion.enabled
    {
        debug!(
            converter = converter.name(),
            profile = %conversion.profile,
            segments = segments.len(),
            "converting segment script"
        );
    }
    segments
        .into_iter()
        .map(|segment| -> Result<MergedSegment> {
            Ok(MergedSegment {
                text: convert_text(segment.text, converter, conversion)?,
                ..segment
            })
        })
        .collect()
}

/// Drives the collaborators and the fusion core over one recording.
pub struct FusionPipeline {
    config: Config,
    transcriber: Arc<dyn ChunkTranscriber>,
    diarizer: Option<Arc<dyn Diarizer>>,
    converter: Option<Arc<dyn ScriptConverter>>,
    reporter: Arc<dyn ProgressReporter>,
    cancellation: CancellationToken,
    workers: usize,
}

impl FusionPipeline {
    /// Create a pipeline that transcribes chunks one at a time, without
    /// diarization.
    pub fn new(config: Config, transcriber: Arc<dyn ChunkTranscriber>) -> Self {
        Self {
            config,
            transcriber,
            diarizer: None,
            converter: None,
            reporter: Arc::new(NoopReporter),
            cancellation: CancellationToken::new(),
            workers: 1,
        }
    }

    /// Enable speaker diarization.
    pub fn with_diarizer(mut self, diarizer: Arc<dyn Diarizer>) -> Self {
        self.diarizer = Some(diarizer);
        self
    }

    /// Convert merged text and raw text with `converter`, subject to
    /// `config.conversion.enabled`.
    pub fn with_converter(mut self, converter: Arc<dyn ScriptConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Set a custom progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Observe a cancellation token between phases.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Transcribe up to `workers` chunks concurrently. 0 and 1 both mean
    /// sequential.
    pub fn parallel(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn finish_phase(&self, phase: Phase) -> Result<()> {
        info!(%phase, "fusion phase complete");
        self.reporter.report(phase, phase.fraction());
        self.cancellation.check(phase)
    }

    /// Run the whole pipeline over `audio`.
    pub fn run(&self, audio: &Waveform) -> Result<FusionOutput> {
        self.config.validate()?;

        let chunks = segment_audio(audio, &self.config.segmenter)?;
        info!(
            chunks = chunks.len(),
            duration = audio.duration(),
            "planned transcription chunks"
        );
        self.finish_phase(Phase::Chunked)?;

        let slices: Vec<Waveform> = chunks.iter().map(|c| audio.slice(c.start, c.end)).collect();
        let results = self.transcribe_all(&slices)?;
        info!(
            model = self.transcriber.model_name(),
            chunks = results.len(),
            "transcription complete"
        );
        self.finish_phase(Phase::Transcribed)?;

        let turns = match &self.diarizer {
            Some(diarizer) => diarizer.diarize(audio).map_err(into_diarization_error)?,
            None => Vec::new(),
        };
        info!(turns = turns.len(), "diarization complete");
        self.finish_phase(Phase::Diarized)?;

        let chunk_starts: Vec<f64> = chunks.iter().map(|c| c.start).collect();
        let converter = self.converter.as_deref();
        let merged = fuse(&results, &chunk_starts, &turns, &self.config)?;
        let merged = convert_segments(merged, converter, &self.config.conversion)?;
        let raw_text = convert_text(raw_text(&results), converter, &self.config.conversion)?;
        info!(segments = merged.len(), "merge complete");
        self.finish_phase(Phase::Merged)?;

        let sentences = resplit_for_subtitles(&merged, &self.config.subtitle_rules());
        let output = FusionOutput {
            merged,
            sentences,
            raw_text,
            chunks,
        };
        self.finish_phase(Phase::Done)?;
        Ok(output)
    }

    /// Transcribes every slice, keeping chunk order. The first failing chunk
    /// (by index) decides the error.
    fn transcribe_all(&self, slices: &[Waveform]) -> Result<Vec<ChunkResult>> {
        if self.workers <= 1 {
            return slices
                .iter()
                .enumerate()
                .map(|(index, audio)| {
                    self.transcriber
                        .transcribe(audio)
                        .map_err(|e| into_chunk_error(index, e))
                })
                .collect();
        }

        let mut results = Vec::with_capacity(slices.len());
        for (batch_index, batch) in slices.chunks(self.workers).enumerate() {
            let offset = batch_index * self.workers;
            let batch_results: Vec<Result<ChunkResult>> = thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|audio| {
                        let transcriber = &self.transcriber;
                        scope.spawn(move || transcriber.transcribe(audio))
                    })
                    .collect();

                handles
                    .into_iter()
                    .enumerate()
                    .map(|(i, handle)| {
                        handle.join().unwrap_or_else(|_| {
                            Err(VoxfuseError::Transcription {
                                chunk: offset + i,
                                message: "transcription worker panicked".to_string(),
                            })
                        })
                    })
                    .collect()
            });

            for (i, result) in batch_results.into_iter().enumerate() {
                results.push(result.map_err(|e| into_chunk_error(offset + i, e))?);
            }
        }
        Ok(results)
    }
}

/// Tags a collaborator failure with the index of the chunk it belongs to.
fn into_chunk_error(chunk: usize, error: VoxfuseError) -> VoxfuseError {
    match error {
        VoxfuseError::Transcription { message, .. } => VoxfuseError::Transcription { chunk, message },
        other => VoxfuseError::Transcription {
            chunk,
            message: other.to_string(),
        },
    }
}

fn into_conversion_error(error: VoxfuseError) -> VoxfuseError {
    match error {
        VoxfuseError::Conversion { .. } => error,
        other => VoxfuseError::Conversion {
            message: other.to_string(),
        },
    }
}

fn into_diarization_error(error: VoxfuseError) -> VoxfuseError {
    match error {
        VoxfuseError::Diarization { .. } => error,
        other => VoxfuseError::Diarization {
            message: other.to_string(),
        },
    }
}
