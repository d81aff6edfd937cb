use crate::audio::SegmenterParams;
use crate::defaults;
use crate::error::{Result, VoxfuseError};
use crate::segments::MergeParams;
use crate::speakers::SpeakerParams;
use crate::transcript::CutRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub segmenter: SegmenterParams,
    pub sentences: SentenceConfig,
    pub speakers: SpeakerParams,
    pub merge: MergeParams,
    pub subtitles: SubtitleConfig,
    pub conversion: ConversionConfig,
}

/// Sentence segmentation rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SentenceConfig {
    pub max_sentence_chars: usize,
    pub force_cut_chars: usize,
    pub sentence_end_chars: String,
    pub soft_cut_chars: String,
}

/// Subtitle re-split thresholds; punctuation sets come from `[sentences]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubtitleConfig {
    pub max_chars: usize,
    pub force_chars: usize,
}

/// Chinese script conversion of the final text
///
/// Applied only when a converter is plugged into the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    pub enabled: bool,
    pub profile: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            profile: defaults::CONVERSION_PROFILE.to_string(),
        }
    }
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            max_sentence_chars: defaults::MAX_SENTENCE_CHARS,
            force_cut_chars: defaults::FORCE_CUT_CHARS,
            sentence_end_chars: defaults::SENTENCE_END_CHARS.to_string(),
            soft_cut_chars: defaults::SOFT_CUT_CHARS.to_string(),
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            max_chars: defaults::MAX_SENTENCE_CHARS,
            force_chars: defaults::FORCE_CUT_CHARS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values. The result is validated.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoxfuseError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoxfuseError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only a missing file falls back to defaults. Invalid TOML or invalid
    /// values are returned as errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(VoxfuseError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXFUSE_TARGET_DURATION → segmenter.target_duration
    /// - VOXFUSE_MAX_DURATION → segmenter.max_duration
    /// - VOXFUSE_GAP_THRESHOLD → merge.gap_threshold
    ///
    /// Empty values are ignored; unparsable ones are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = env_seconds("VOXFUSE_TARGET_DURATION") {
            self.segmenter.target_duration = secs;
        }

        if let Some(secs) = env_seconds("VOXFUSE_MAX_DURATION") {
            self.segmenter.max_duration = secs;
        }

        if let Some(secs) = env_seconds("VOXFUSE_GAP_THRESHOLD") {
            self.merge.gap_threshold = secs;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxfuse/config.toml on Linux, `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voxfuse").join("config.toml"))
    }

    /// Check every section for values the algorithms cannot work with
    pub fn validate(&self) -> Result<()> {
        self.segmenter.validate()?;
        if self.sentences.sentence_end_chars.is_empty() {
            return Err(VoxfuseError::ConfigInvalidValue {
                key: "sentences.sentence_end_chars".to_string(),
                message: "must contain at least one mark".to_string(),
            });
        }
        self.sentence_rules().validate("sentences")?;
        self.subtitle_rules().validate("subtitles")?;
        self.speakers.validate()?;
        self.merge.validate()?;
        if self.conversion.enabled && self.conversion.profile.trim().is_empty() {
            return Err(VoxfuseError::ConfigInvalidValue {
                key: "conversion.profile".to_string(),
                message: "must name a profile when conversion is enabled".to_string(),
            });
        }
        Ok(())
    }

    /// Cut rules for sentence segmentation
    pub fn sentence_rules(&self) -> CutRules {
        CutRules {
            max_chars: self.sentences.max_sentence_chars,
            force_chars: self.sentences.force_cut_chars,
            sentence_end_chars: self.sentences.sentence_end_chars.clone(),
            soft_cut_chars: self.sentences.soft_cut_chars.clone(),
        }
    }

    /// Cut rules for subtitle re-splitting
    pub fn subtitle_rules(&self) -> CutRules {
        CutRules {
            max_chars: self.subtitles.max_chars,
            force_chars: self.subtitles.force_chars,
            ..self.sentence_rules()
        }
    }
}

fn env_seconds(key: &str) -> Option<f64> {
    let value = std::env::var(key).ok()?;
    if value.is_empty() {
        return None;
    }
    match value.trim().parse::<f64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!(key, value = %value, "ignoring unparsable environment override");
            None
        }
    }
}
