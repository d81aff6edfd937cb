//! Diarization turns as delivered by the speaker-diarization collaborator.

use crate::error::{Result, VoxfuseError};
use serde::{Deserialize, Serialize};

/// One speaker-labelled time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationTurn {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

impl DiarizationTurn {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
        }
    }

    /// Seconds shared with `[start, end]`, never negative.
    pub fn overlap(&self, start: f64, end: f64) -> f64 {
        (end.min(self.end) - start.max(self.start)).max(0.0)
    }

    /// Distance from `t` to the nearest edge of the turn, 0 when inside.
    pub fn distance_to(&self, t: f64) -> f64 {
        if t < self.start {
            self.start - t
        } else if t > self.end {
            t - self.end
        } else {
            0.0
        }
    }
}

/// Rejects turns with non-finite or reversed bounds.
///
/// Ordering by start is assumed, not checked: assignment works on any order,
/// only tie-breaking follows list order.
pub fn validate_turns(turns: &[DiarizationTurn]) -> Result<()> {
    for (index, turn) in turns.iter().enumerate() {
        if !turn.start.is_finite() || !turn.end.is_finite() || turn.end < turn.start {
            return Err(VoxfuseError::InvalidTurn {
                index,
                start: turn.start,
                end: turn.end,
            });
        }
    }
    Ok(())
}
