//! JSON loading of collaborator output.
//!
//! Transcription results and diarization turns usually arrive from other
//! processes as JSON documents; these helpers parse and sanity-check them.

use crate::error::Result;
use crate::speakers::{DiarizationTurn, validate_turns};
use crate::transcript::ChunkResult;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Parses a JSON array of `{text, tokens: [{text, start?, end?}]}` objects,
/// one per chunk, in chunk order.
pub fn load_chunk_results<R: Read>(reader: R) -> Result<Vec<ChunkResult>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parses a JSON array of `{start, end, speaker}` turns and rejects reversed
/// or non-finite bounds.
pub fn load_turns<R: Read>(reader: R) -> Result<Vec<DiarizationTurn>> {
    let turns: Vec<DiarizationTurn> = serde_json::from_reader(reader)?;
    validate_turns(&turns)?;
    Ok(turns)
}

/// [`load_chunk_results`] from a file.
pub fn load_chunk_results_file(path: &Path) -> Result<Vec<ChunkResult>> {
    load_chunk_results(BufReader::new(File::open(path)?))
}

/// [`load_turns`] from a file.
pub fn load_turns_file(path: &Path) -> Result<Vec<DiarizationTurn>> {
    load_turns(BufReader::new(File::open(path)?))
}

/// Writes any result type as pretty-printed JSON.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
