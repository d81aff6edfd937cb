//! In-memory mono waveform handed over by the audio-decoding collaborator.

use crate::error::{Result, VoxfuseError};

/// Normalized mono samples (nominally -1.0..=1.0) plus their sample rate.
///
/// Read-only once constructed: the segmenter only ever reads fixed-size frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wraps already-normalized mono samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(VoxfuseError::InvalidWaveform {
                message: "sample rate must be positive".to_string(),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Builds a mono waveform from interleaved multi-channel samples by
    /// averaging the channels of each frame. A trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(VoxfuseError::InvalidWaveform {
                message: "channel count must be positive".to_string(),
            });
        }
        if channels == 1 {
            return Self::new(samples.to_vec(), sample_rate);
        }

        let channels = channels as usize;
        let mono = samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self::new(mono, sample_rate)
    }

    /// Builds a waveform from 16-bit PCM, normalizing by `i16::MAX`.
    pub fn from_pcm_i16(samples: &[i16], sample_rate: u32) -> Result<Self> {
        let normalized = samples
            .iter()
            .map(|&s| s as f32 / i16::MAX as f32)
            .collect();
        Self::new(normalized, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copies out the samples between `start` and `end` (seconds).
    ///
    /// Bounds are clamped to the waveform, so an out-of-range request yields
    /// an empty waveform rather than an error.
    pub fn slice(&self, start: f64, end: f64) -> Waveform {
        let to_index = |secs: f64| -> usize {
            let idx = (secs.max(0.0) * self.sample_rate as f64) as usize;
            idx.min(self.samples.len())
        };
        let from = to_index(start);
        let to = to_index(end).max(from);
        Waveform {
            samples: self.samples[from..to].to_vec(),
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_rate_is_rejected() {
        let result = Waveform::new(vec![0.0; 10], 0);
        match result {
            Err(VoxfuseError::InvalidWaveform { message }) => {
                assert!(message.contains("sample rate"));
            }
            _ => panic!("Expected InvalidWaveform error"),
        }
    }

    #[test]
    fn duration_is_samples_over_rate() {
        let wave = Waveform::new(vec![0.0; 32000], 16000).unwrap();
        assert_eq!(wave.duration(), 2.0);
        assert_eq!(wave.len(), 32000);
        assert!(!wave.is_empty());
    }

    #[test]
    fn empty_waveform_has_zero_duration() {
        let wave = Waveform::new(Vec::new(), 16000).unwrap();
        assert_eq!(wave.duration(), 0.0);
        assert!(wave.is_empty());
    }

    #[test]
    fn stereo_is_downmixed_by_mean() {
        let interleaved = vec![0.2f32, 0.4, -0.5, 0.5, 1.0, 0.0];
        let wave = Waveform::from_interleaved(&interleaved, 2, 8000).unwrap();
        let samples = wave.samples();
        assert_eq!(samples.len(), 3);
        assert!((samples[0] - 0.3).abs() < 1e-6);
        assert!(samples[1].abs() < 1e-6);
        assert!((samples[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn interleaved_rejects_zero_channels() {
        assert!(Waveform::from_interleaved(&[0.0, 0.0], 0, 16000).is_err());
    }

    #[test]
    fn pcm_is_normalized() {
        let wave = Waveform::from_pcm_i16(&[i16::MAX, 0, -i16::MAX], 16000).unwrap();
        assert_eq!(wave.samples(), &[1.0, 0.0, -1.0]);
    }

    #[test]
    fn slice_copies_requested_range() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let wave = Waveform::new(samples, 10).unwrap();

        let part = wave.slice(2.0, 4.5);
        assert_eq!(part.len(), 25);
        assert_eq!(part.samples()[0], 20.0);
        assert_eq!(part.sample_rate(), 10);
    }

    #[test]
    fn slice_clamps_out_of_range_bounds() {
        let wave = Waveform::new(vec![0.5; 100], 10).unwrap();
        assert_eq!(wave.slice(8.0, 20.0).len(), 20);
        assert!(wave.slice(20.0, 30.0).is_empty());
        assert!(wave.slice(5.0, 2.0).is_empty());
    }
}
