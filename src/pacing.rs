//! Request pacing between calls to external services.
//!
//! Delays here are for rate courtesy only; nothing depends on them for
//! correctness. They sit behind the [`Pacer`] trait so the pipeline can run
//! in tests without wall-clock waits.
//!
//! - [`Jitter`]: sleeps for a uniformly random duration within a window
//! - `NoPause`: returns immediately, for tests

use rand::{rng, Rng};
use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;

/// A delay policy awaited between consecutive requests.
pub trait Pacer {
    async fn pause(&self);
}

/// Sleep for a random duration in `[min, max]`.
///
/// The window is bounded, so a pause can never block indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    min: Duration,
    max: Duration,
}

impl Jitter {
    /// Build a window from millisecond bounds. Reversed bounds are swapped.
    pub fn millis(min_ms: u64, max_ms: u64) -> Self {
        let (lo, hi) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Self {
            min: Duration::from_millis(lo),
            max: Duration::from_millis(hi),
        }
    }

    /// Draw a delay from the window.
    pub fn sample(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        Duration::from_millis(rng().random_range(lo..=hi))
    }
}

impl Pacer for Jitter {
    async fn pause(&self) {
        let delay = self.sample();
        trace!(?delay, "Pacing");
        sleep(delay).await;
    }
}

/// No delay at all.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

#[cfg(test)]
impl Pacer for NoPause {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_sample_stays_in_window() {
        let jitter = Jitter::millis(400, 800);
        for _ in 0..200 {
            let d = jitter.sample();
            assert!(d >= Duration::from_millis(400));
            assert!(d <= Duration::from_millis(800));
        }
    }

    #[test]
    fn test_jitter_swaps_reversed_bounds() {
        assert_eq!(Jitter::millis(900, 100), Jitter::millis(100, 900));
    }

    #[test]
    fn test_jitter_degenerate_window() {
        let jitter = Jitter::millis(250, 250);
        assert_eq!(jitter.sample(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_jitter_pause_completes() {
        let t0 = std::time::Instant::now();
        Jitter::millis(10, 20).pause().await;
        assert!(t0.elapsed() >= Duration::from_millis(10));
    }
}
