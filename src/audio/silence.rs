//! Silence detection and chunk planning for long-form transcription.
//!
//! Frame energy is measured as RMS over fixed-size frames. Runs of quiet frames
//! long enough to be a real pause become [`SilenceRegion`]s, and the chunk
//! planner greedily cuts at the silence midpoint closest to the target length.

use crate::audio::waveform::Waveform;
use crate::defaults;
use crate::error::{Result, VoxfuseError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Float slack when comparing accumulated frame times against thresholds.
const TIME_EPSILON: f64 = 1e-9;

/// Tunables for silence detection and chunk planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterParams {
    /// Preferred chunk length (seconds). Shorter audio is never split.
    pub target_duration: f64,
    /// Hard upper bound for a chunk (seconds).
    pub max_duration: f64,
    /// Frames quieter than this (dBFS) count as silence.
    pub silence_threshold_db: f64,
    /// Minimum silence run (seconds) worth cutting in.
    pub min_silence_duration: f64,
    /// RMS analysis frame length (seconds).
    pub frame_duration: f64,
    /// Earliest offset into a chunk (seconds) a cut may be placed.
    pub min_chunk_lead: f64,
    /// The search window opens this many seconds before the ideal cut.
    pub search_backoff: f64,
}

impl Default for SegmenterParams {
    fn default() -> Self {
        Self {
            target_duration: defaults::TARGET_CHUNK_SECS,
            max_duration: defaults::MAX_CHUNK_SECS,
            silence_threshold_db: defaults::SILENCE_THRESHOLD_DB,
            min_silence_duration: defaults::MIN_SILENCE_SECS,
            frame_duration: defaults::FRAME_SECS,
            min_chunk_lead: defaults::MIN_CHUNK_LEAD_SECS,
            search_backoff: defaults::SEARCH_BACKOFF_SECS,
        }
    }
}

impl SegmenterParams {
    /// Checks that durations are finite and positive, that the lead and
    /// backoff offsets are not negative, and that the target fits inside the
    /// hard maximum.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("segmenter.target_duration", self.target_duration),
            ("segmenter.max_duration", self.max_duration),
            ("segmenter.frame_duration", self.frame_duration),
            ("segmenter.min_silence_duration", self.min_silence_duration),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(VoxfuseError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: format!("must be a positive number of seconds, got {value}"),
                });
            }
        }

        let non_negative = [
            ("segmenter.min_chunk_lead", self.min_chunk_lead),
            ("segmenter.search_backoff", self.search_backoff),
        ];
        for (key, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(VoxfuseError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: format!("must be zero or more seconds, got {value}"),
                });
            }
        }

        if !self.silence_threshold_db.is_finite() {
            return Err(VoxfuseError::ConfigInvalidValue {
                key: "segmenter.silence_threshold_db".to_string(),
                message: "must be finite".to_string(),
            });
        }

        if self.max_duration < self.target_duration {
            return Err(VoxfuseError::ConfigInvalidValue {
                key: "segmenter.max_duration".to_string(),
                message: format!(
                    "must not be shorter than target_duration ({}s)",
                    self.target_duration
                ),
            });
        }

        Ok(())
    }

    /// Linear amplitude equivalent of `silence_threshold_db`.
    pub fn linear_threshold(&self) -> f64 {
        10f64.powf(self.silence_threshold_db / 20.0)
    }
}

/// A contiguous quiet stretch of the recording (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceRegion {
    pub start: f64,
    pub end: f64,
}

impl SilenceRegion {
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A planned time range submitted independently to transcription.
///
/// A plan covers `[0, total)` with `chunks[i].end == chunks[i + 1].start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioChunk {
    pub start: f64,
    pub end: f64,
}

impl AudioChunk {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Root-mean-square energy of one frame.
pub fn frame_rms(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = frame
        .iter()
        .map(|&sample| {
            let s = sample as f64;
            s * s
        })
        .sum();

    (sum_squares / frame.len() as f64).sqrt()
}

fn frame_size(sample_rate: u32, frame_duration: f64) -> usize {
    ((sample_rate as f64 * frame_duration).round() as usize).max(1)
}

/// Finds every run of quiet frames lasting at least `min_silence_duration`.
///
/// A trailing partial frame is ignored. A recording that ends while still
/// quiet yields a final region ending at the last whole frame.
pub fn detect_silence(waveform: &Waveform, params: &SegmenterParams) -> Vec<SilenceRegion> {
    let size = frame_size(waveform.sample_rate(), params.frame_duration);
    let threshold = params.linear_threshold();
    let frames = waveform.samples().chunks_exact(size);
    let num_frames = frames.len();

    let mut regions = Vec::new();
    let mut silence_start: Option<f64> = None;

    let close_region = |start: f64, end: f64, regions: &mut Vec<SilenceRegion>| {
        if end - start + TIME_EPSILON >= params.min_silence_duration {
            regions.push(SilenceRegion { start, end });
        }
    };

    for (i, frame) in frames.enumerate() {
        let time = i as f64 * params.frame_duration;
        if frame_rms(frame) < threshold {
            if silence_start.is_none() {
                silence_start = Some(time);
            }
        } else if let Some(start) = silence_start.take() {
            close_region(start, time, &mut regions);
        }
    }

    if let Some(start) = silence_start {
        close_region(start, num_frames as f64 * params.frame_duration, &mut regions);
    }

    regions
}

/// Plans chunk boundaries for a recording.
///
/// Audio no longer than `target_duration` comes back as a single chunk.
/// Otherwise each cut is placed at the silence midpoint closest to
/// `start + target_duration` inside
/// `[max(start + min_chunk_lead, ideal - search_backoff), min(total, start + max_duration)]`,
/// falling back to a hard cut at `start + max_duration`.
pub fn segment_audio(waveform: &Waveform, params: &SegmenterParams) -> Result<Vec<AudioChunk>> {
    params.validate()?;

    let total = waveform.duration();
    if total <= params.target_duration {
        return Ok(vec![AudioChunk {
            start: 0.0,
            end: total,
        }]);
    }

    let regions = detect_silence(waveform, params);
    debug!(
        total_secs = total,
        silence_regions = regions.len(),
        "detected silence regions"
    );

    let mut chunks = Vec::new();
    let mut current = 0.0;

    while current < total {
        let ideal_end = current + params.target_duration;
        if ideal_end >= total {
            chunks.push(AudioChunk {
                start: current,
                end: total,
            });
            break;
        }

        let search_start = (current + params.min_chunk_lead).max(ideal_end - params.search_backoff);
        let search_end = total.min(current + params.max_duration);

        let best_split = regions
            .iter()
            .map(SilenceRegion::midpoint)
            .filter(|&mid| mid > current && mid >= search_start && mid <= search_end)
            .fold(None::<f64>, |best, mid| match best {
                Some(b) if (b - ideal_end).abs() <= (mid - ideal_end).abs() => Some(b),
                _ => Some(mid),
            });

        let end = match best_split {
            Some(split) => split,
            None => {
                debug!(chunk_start = current, "no silence in window, forcing cut");
                (current + params.max_duration).min(total)
            }
        };

        chunks.push(AudioChunk {
            start: current,
            end,
        });
        current = end;
    }

    debug!(chunks = chunks.len(), "planned audio chunks");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 100 Hz keeps multi-minute fixtures small: one 20 ms frame is 2 samples.
    const TEST_RATE: u32 = 100;

    fn loud_with_silences(total_secs: f64, silences: &[(f64, f64)]) -> Waveform {
        let len = (total_secs * TEST_RATE as f64) as usize;
        let mut samples = vec![0.5f32; len];
        for &(start, end) in silences {
            let from = (start * TEST_RATE as f64) as usize;
            let to = ((end * TEST_RATE as f64) as usize).min(len);
            for s in &mut samples[from..to] {
                *s = 0.0;
            }
        }
        Waveform::new(samples, TEST_RATE).unwrap()
    }

    fn assert_contiguous(chunks: &[AudioChunk], total: f64, max: f64) {
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].start, 0.0);
        assert_eq!(chunks.last().unwrap().end, total);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap: {:?}", pair);
        }
        for chunk in chunks {
            assert!(chunk.duration() > 0.0, "empty chunk: {:?}", chunk);
            assert!(
                chunk.duration() <= max + 1e-9,
                "chunk longer than max: {:?}",
                chunk
            );
        }
    }

    #[test]
    fn test_frame_rms() {
        assert_eq!(frame_rms(&[]), 0.0);
        assert_eq!(frame_rms(&[0.0, 0.0]), 0.0);
        assert!((frame_rms(&[0.5, -0.5]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_linear_threshold() {
        let params = SegmenterParams::default();
        assert!((params.linear_threshold() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_detect_silence_finds_inner_region() {
        let wave = loud_with_silences(10.0, &[(4.0, 5.0)]);
        let regions = detect_silence(&wave, &SegmenterParams::default());

        assert_eq!(regions.len(), 1);
        assert!((regions[0].start - 4.0).abs() < 1e-6);
        assert!((regions[0].end - 5.0).abs() < 1e-6);
        assert!((regions[0].midpoint() - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_detect_silence_ignores_short_pauses() {
        let wave = loud_with_silences(10.0, &[(2.0, 2.2), (6.0, 6.4)]);
        let regions = detect_silence(&wave, &SegmenterParams::default());

        // 0.2s is too short, 0.4s qualifies
        assert_eq!(regions.len(), 1);
        assert!((regions[0].start - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_detect_silence_keeps_trailing_region() {
        let wave = loud_with_silences(10.0, &[(9.0, 10.0)]);
        let regions = detect_silence(&wave, &SegmenterParams::default());

        assert_eq!(regions.len(), 1);
        assert!((regions[0].end - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_audio_is_single_chunk() {
        let wave = loud_with_silences(90.0, &[(30.0, 31.0)]);
        let chunks = segment_audio(&wave, &SegmenterParams::default()).unwrap();

        assert_eq!(chunks, vec![AudioChunk { start: 0.0, end: 90.0 }]);
    }

    #[test]
    fn test_empty_audio_is_single_zero_chunk() {
        let wave = Waveform::new(Vec::new(), 16000).unwrap();
        let chunks = segment_audio(&wave, &SegmenterParams::default()).unwrap();

        assert_eq!(chunks, vec![AudioChunk { start: 0.0, end: 0.0 }]);
    }

    #[test]
    fn test_cuts_at_silence_nearest_ideal_point() {
        // Ideal cut at 120s; silences centred at 100.5s and 125.5s
        let wave = loud_with_silences(200.0, &[(100.0, 101.0), (125.0, 126.0)]);
        let chunks = segment_audio(&wave, &SegmenterParams::default()).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!((chunks[0].end - 125.5).abs() < 1e-6);
        assert_contiguous(&chunks, 200.0, 180.0);
    }

    #[test]
    fn test_silence_before_search_window_is_ignored() {
        // 85.5s midpoint is before ideal - 30 = 90s
        let wave = loud_with_silences(200.0, &[(85.0, 86.0)]);
        let chunks = segment_audio(&wave, &SegmenterParams::default()).unwrap();

        assert!((chunks[0].end - 180.0).abs() < 1e-9);
        assert_contiguous(&chunks, 200.0, 180.0);
    }

    #[test]
    fn test_forced_cut_without_silence() {
        let wave = loud_with_silences(400.0, &[]);
        let chunks = segment_audio(&wave, &SegmenterParams::default()).unwrap();

        assert_eq!(chunks.len(), 3);
        assert!((chunks[0].end - 180.0).abs() < 1e-9);
        assert!((chunks[1].end - 360.0).abs() < 1e-9);
        assert_contiguous(&chunks, 400.0, 180.0);
    }

    #[test]
    fn test_long_recording_with_scattered_pauses() {
        let silences: Vec<(f64, f64)> = (1..40)
            .map(|i| {
                let start = i as f64 * 23.7;
                (start, start + 0.6)
            })
            .collect();
        let wave = loud_with_silences(950.0, &silences);
        let chunks = segment_audio(&wave, &SegmenterParams::default()).unwrap();

        assert!(chunks.len() >= 6);
        assert_contiguous(&chunks, 950.0, 180.0);
        // Every cut but the last lands inside one of the pauses
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                silences
                    .iter()
                    .any(|&(s, e)| chunk.end >= s && chunk.end <= e),
                "cut at {} is not inside a pause",
                chunk.end
            );
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let wave = loud_with_silences(10.0, &[]);
        let params = SegmenterParams {
            max_duration: 60.0,
            ..Default::default()
        };
        let result = segment_audio(&wave, &params);
        assert!(matches!(
            result,
            Err(VoxfuseError::ConfigInvalidValue { .. })
        ));

        let params = SegmenterParams {
            frame_duration: 0.0,
            ..Default::default()
        };
        assert!(segment_audio(&wave, &params).is_err());
    }

    #[test]
    fn test_zero_min_silence_duration_rejected() {
        let params = SegmenterParams {
            min_silence_duration: 0.0,
            ..Default::default()
        };
        match params.validate() {
            Err(VoxfuseError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "segmenter.min_silence_duration");
            }
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }

        let params = SegmenterParams {
            min_chunk_lead: 0.0,
            search_backoff: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }
}
