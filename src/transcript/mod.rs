//! Timed transcript processing: chunk reconciliation, punctuation
//! restoration and sentence segmentation.

pub mod punctuation;
pub mod reconcile;
pub mod sentences;
pub mod types;

pub use punctuation::{is_punctuation, restore_punctuation};
pub use reconcile::{offset_chunk, reconcile, reconcile_chunks};
pub use sentences::{CutRules, split_sentences};
pub use types::{CharacterToken, ChunkResult, SentenceUnit, TimedToken, check_tokens};
