//! Re-deriving one global timeline from per-chunk transcription results.
//!
//! Each chunk is transcribed on its own, so its token timestamps are relative
//! to the chunk start. Shifting them by the chunk offset is an immutable
//! update: tokens without timing pass through as-is and every other field is
//! preserved.

use crate::error::{Result, VoxfuseError};
use crate::transcript::types::{ChunkResult, TimedToken};
use tracing::debug;

fn offset_token(token: &TimedToken, offset: f64) -> TimedToken {
    match token.span() {
        Some((start, end)) => TimedToken {
            start: Some(start + offset),
            end: Some(end + offset),
            ..token.clone()
        },
        None => token.clone(),
    }
}

/// Returns a copy of `result` with every fully timed token shifted by `offset`.
pub fn offset_chunk(result: &ChunkResult, offset: f64) -> ChunkResult {
    ChunkResult {
        text: result.text.clone(),
        tokens: result
            .tokens
            .iter()
            .map(|token| offset_token(token, offset))
            .collect(),
    }
}

fn check_counts(results: &[ChunkResult], chunk_starts: &[f64]) -> Result<()> {
    if results.len() != chunk_starts.len() {
        return Err(VoxfuseError::ChunkMismatch {
            results: results.len(),
            chunks: chunk_starts.len(),
        });
    }
    Ok(())
}

/// Shifts every chunk result onto the global timeline, keeping chunk order.
pub fn reconcile_chunks(results: &[ChunkResult], chunk_starts: &[f64]) -> Result<Vec<ChunkResult>> {
    check_counts(results, chunk_starts)?;

    Ok(results
        .iter()
        .zip(chunk_starts)
        .map(|(result, &offset)| offset_chunk(result, offset))
        .collect())
}

/// Flattens chunk results into one global token stream in chunk order.
pub fn reconcile(results: &[ChunkResult], chunk_starts: &[f64]) -> Result<Vec<TimedToken>> {
    let tokens: Vec<TimedToken> = reconcile_chunks(results, chunk_starts)?
        .into_iter()
        .flat_map(|chunk| chunk.tokens)
        .collect();

    debug!(
        chunks = results.len(),
        tokens = tokens.len(),
        "reconciled chunk timestamps"
    );
    Ok(tokens)
}
