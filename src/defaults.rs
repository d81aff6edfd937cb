//! Default configuration constants for voxfuse.
//!
//! Shared by the per-stage parameter structs and the TOML configuration so
//! both agree on the same values.

/// Preferred chunk length in seconds before a split point is searched.
pub const TARGET_CHUNK_SECS: f64 = 120.0;

/// Hard upper bound on a chunk's length in seconds.
pub const MAX_CHUNK_SECS: f64 = 180.0;

/// Frame energy below this level (dBFS) counts as silence.
pub const SILENCE_THRESHOLD_DB: f64 = -40.0;

/// Shortest run of quiet frames, in seconds, that qualifies as a silence region.
pub const MIN_SILENCE_SECS: f64 = 0.3;

/// RMS analysis frame length in seconds.
pub const FRAME_SECS: f64 = 0.02;

/// A split point is never searched earlier than this many seconds into a chunk.
pub const MIN_CHUNK_LEAD_SECS: f64 = 60.0;

/// How far before the ideal cut point the silence search window opens.
pub const SEARCH_BACKOFF_SECS: f64 = 30.0;

/// Buffer length (in characters) after which a soft-cut mark ends a sentence.
pub const MAX_SENTENCE_CHARS: usize = 30;

/// Buffer length (in characters) at which a sentence is cut unconditionally.
pub const FORCE_CUT_CHARS: usize = 50;

/// Marks that always end a sentence.
pub const SENTENCE_END_CHARS: &str = "。！？!?";

/// Marks that end a sentence once it is long enough.
pub const SOFT_CUT_CHARS: &str = "，,";

/// Nearest-turn fallback is only trusted within this many seconds.
pub const MAX_NEAREST_TURN_SECS: f64 = 2.0;

/// Adjacent same-speaker sentences closer than this (seconds) are merged.
pub const GAP_THRESHOLD_SECS: f64 = 1.0;

/// Segments shorter than this (seconds) with blank text are dropped as noise.
pub const NOISE_MIN_DURATION_SECS: f64 = 0.05;

/// Speaker label used when no diarization is available.
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// Script conversion profile handed to the converter (OpenCC naming:
/// Simplified to Traditional, Taiwan standard with phrases).
pub const CONVERSION_PROFILE: &str = "s2twp";
