//! Progress reporting and cooperative cancellation at phase boundaries.

use crate::error::{Result, VoxfuseError};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Pipeline phases, in the order they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Chunked,
    Transcribed,
    Diarized,
    Merged,
    Done,
}

impl Phase {
    /// Fraction of the whole run completed once this phase is done.
    pub fn fraction(self) -> f64 {
        match self {
            Phase::Chunked => 0.2,
            Phase::Transcribed => 0.6,
            Phase::Diarized => 0.78,
            Phase::Merged => 0.9,
            Phase::Done => 1.0,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Chunked => "chunked",
            Phase::Transcribed => "transcribed",
            Phase::Diarized => "diarized",
            Phase::Merged => "merged",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Trait for observing pipeline progress.
pub trait ProgressReporter: Send + Sync {
    /// Called once per completed phase with a fraction in `[0, 1]`.
    fn report(&self, phase: Phase, fraction: f64);
}

impl<F> ProgressReporter for F
where
    F: Fn(Phase, f64) + Send + Sync,
{
    fn report(&self, phase: Phase, fraction: f64) {
        self(phase, fraction)
    }
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _phase: Phase, _fraction: f64) {}
}

/// Reporter that logs each phase at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, phase: Phase, fraction: f64) {
        info!(%phase, percent = (fraction * 100.0).round(), "fusion progress");
    }
}

/// Shared cancellation flag, checked between phases.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Errors with `Cancelled` if the flag is set once `phase` has finished.
    pub fn check(&self, phase: Phase) -> Result<()> {
        if self.is_cancelled() {
            return Err(VoxfuseError::Cancelled {
                phase: phase.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_phase_fractions_increase() {
        let phases = [
            Phase::Chunked,
            Phase::Transcribed,
            Phase::Diarized,
            Phase::Merged,
            Phase::Done,
        ];
        let fractions: Vec<f64> = phases.iter().map(|p| p.fraction()).collect();
        assert!(fractions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(fractions[4], 1.0);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Transcribed.to_string(), "transcribed");
        assert_eq!(Phase::Done.to_string(), "done");
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Mutex::new(Vec::new());
        let reporter = |phase: Phase, fraction: f64| seen.lock().unwrap().push((phase, fraction));

        reporter.report(Phase::Merged, 0.9);
        assert_eq!(seen.lock().unwrap().as_slice(), &[(Phase::Merged, 0.9)]);
    }

    #[test]
    fn test_log_and_noop_reporters() {
        // Just ensure they don't panic
        LogReporter.report(Phase::Chunked, 0.2);
        NoopReporter.report(Phase::Done, 1.0);
    }

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.check(Phase::Chunked).is_ok());

        clone.cancel();

        assert!(token.is_cancelled());
        match token.check(Phase::Transcribed) {
            Err(VoxfuseError::Cancelled { phase }) => assert_eq!(phase, "transcribed"),
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    }
}
