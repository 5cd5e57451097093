//! Pacing of animation chunks at a target typing speed.
//!
//! The controller first measures how fast the host applies single-character
//! edits, then picks randomized chunk sizes around the length needed to hit
//! the target speed, and sleeps whenever the run gets ahead of schedule.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

use crate::config::{
    AnimationConfig, DEFAULT_AVERAGE_WORD_LENGTH, DEFAULT_WARMUP_CHUNKS, DEFAULT_WORDS_PER_MINUTE,
};

/// Source of elapsed time and of delays.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic time since an arbitrary, fixed origin.
    fn elapsed(&self) -> Duration;

    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by tokio's time driver.
///
/// Honors `tokio::time::pause`, so paced code runs instantly in tests.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Convert a typing speed into characters per second.
pub fn words_to_chars_per_second(words_per_minute: f64, average_word_length: f64) -> f64 {
    words_per_minute * average_word_length / 60.0
}

#[derive(Debug, Clone, Copy)]
enum Warmup {
    NotStarted,
    Measuring { started: Duration, advances: usize },
    Done,
}

/// Chunk-size oracle and rate limiter for one animation run.
pub struct PaceController {
    chars_per_second: f64,
    warmup_chunks: usize,
    warmup: Warmup,
    average_chunk_len: Option<f64>,
    /// Characters advanced since the controller was created.
    sum: usize,
    started: Duration,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
}

impl fmt::Debug for PaceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaceController")
            .field("chars_per_second", &self.chars_per_second)
            .field("warmup", &self.warmup)
            .field("average_chunk_len", &self.average_chunk_len)
            .field("sum", &self.sum)
            .finish_non_exhaustive()
    }
}

impl PaceController {
    /// Create a controller for `chars_per_second`.
    ///
    /// A non-positive or non-finite rate falls back to the default speed.
    pub fn new(chars_per_second: f64, clock: Arc<dyn Clock>) -> Self {
        let chars_per_second = if chars_per_second.is_finite() && chars_per_second > 0.0 {
            chars_per_second
        } else {
            words_to_chars_per_second(DEFAULT_WORDS_PER_MINUTE, DEFAULT_AVERAGE_WORD_LENGTH)
        };

        Self {
            chars_per_second,
            warmup_chunks: DEFAULT_WARMUP_CHUNKS,
            warmup: Warmup::NotStarted,
            average_chunk_len: None,
            sum: 0,
            started: clock.elapsed(),
            clock,
            rng: Box::new(StdRng::from_os_rng()),
        }
    }

    pub fn from_config(config: &AnimationConfig, clock: Arc<dyn Clock>) -> Self {
        let cps = words_to_chars_per_second(
            config.effective_words_per_minute(),
            config.effective_word_length(),
        );
        Self::new(cps, clock).with_warmup_chunks(config.warmup_chunks)
    }

    /// Use `rng` for chunk sizes.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Measure over `chunks` edits. Zero skips measuring and uses
    /// single-character chunks throughout.
    pub fn with_warmup_chunks(mut self, chunks: usize) -> Self {
        self.warmup_chunks = chunks;
        if chunks == 0 {
            self.warmup = Warmup::Done;
            self.average_chunk_len = Some(1.0);
        }
        self
    }

    pub fn chars_per_second(&self) -> f64 {
        self.chars_per_second
    }

    /// Estimated chunk length, known once warm-up is over.
    pub fn average_chunk_len(&self) -> Option<f64> {
        self.average_chunk_len
    }

    /// Total characters advanced so far.
    pub fn advanced(&self) -> usize {
        self.sum
    }

    /// Suggest the size of the next chunk.
    pub fn next_chunk_len(&mut self) -> usize {
        match self.average_chunk_len {
            Some(average) if average >= 1.0 => {
                let upper = (average * 2.0).floor() as usize;
                if upper > 1 {
                    self.rng.random_range(1..upper)
                } else {
                    1
                }
            }
            _ => 1,
        }
    }

    /// Endless stream of chunk size suggestions.
    pub fn chunk_lengths(&mut self) -> ChunkLengths<'_> {
        ChunkLengths { pace: self }
    }

    /// Record that `chunk_len` characters were just emitted and wait until
    /// the target speed allows the next chunk.
    ///
    /// Never waits during warm-up and never tries to catch up when behind.
    /// Returns how long it waited.
    pub async fn advance(&mut self, chunk_len: usize) -> Duration {
        self.sum += chunk_len;

        if !self.observe_warmup() {
            return Duration::ZERO;
        }

        let expected = Duration::try_from_secs_f64(self.sum as f64 / self.chars_per_second)
            .unwrap_or(Duration::MAX);
        let actual = self.clock.elapsed().saturating_sub(self.started);

        if expected > actual {
            let wait = expected - actual;
            self.clock.sleep(wait).await;
            wait
        } else {
            Duration::ZERO
        }
    }

    /// Step the warm-up measurement. Returns `true` once pacing applies.
    fn observe_warmup(&mut self) -> bool {
        match self.warmup {
            Warmup::Done => true,
            Warmup::NotStarted => {
                self.warmup = Warmup::Measuring {
                    started: self.clock.elapsed(),
                    advances: 0,
                };
                false
            }
            Warmup::Measuring { started, advances } => {
                let advances = advances + 1;
                if advances < self.warmup_chunks {
                    self.warmup = Warmup::Measuring { started, advances };
                    return false;
                }

                let window = self.clock.elapsed().saturating_sub(started);
                let average = self.estimate_chunk_len(window);
                self.average_chunk_len = Some(average);
                self.warmup = Warmup::Done;
                true
            }
        }
    }

    fn estimate_chunk_len(&self, window: Duration) -> f64 {
        let window_secs = window.as_secs_f64();
        let measured_cps = if window_secs > 0.0 {
            self.warmup_chunks as f64 / window_secs
        } else {
            f64::INFINITY
        };
        let chunk_len = (self.chars_per_second / measured_cps).max(1.0);

        debug!(
            target_cps = self.chars_per_second,
            measured_cps,
            window_ms = window.as_millis(),
            chunk_len,
            "Estimated animation chunk length"
        );

        chunk_len
    }
}

/// Iterator returned by [`PaceController::chunk_lengths`].
#[derive(Debug)]
pub struct ChunkLengths<'a> {
    pace: &'a mut PaceController,
}

impl Iterator for ChunkLengths<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        Some(self.pace.next_chunk_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock that only moves when told to, or when slept on.
    #[derive(Debug, Default)]
    struct ManualClock {
        now: Mutex<Duration>,
    }

    impl ManualClock {
        fn tick(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn elapsed(&self) -> Duration {
            *self.now.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.tick(duration);
        }
    }

    fn seeded(cps: f64, clock: Arc<dyn Clock>) -> PaceController {
        PaceController::new(cps, clock).with_rng(StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_words_to_chars() {
        assert_eq!(words_to_chars_per_second(1200.0, 5.0), 100.0);
        assert_eq!(words_to_chars_per_second(1000.0, 5.0) * 60.0, 5000.0);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        let pace = PaceController::new(0.0, Arc::new(ManualClock::default()));
        assert!(pace.chars_per_second() > 0.0);
    }

    #[tokio::test]
    async fn test_warmup_requests_single_chars_without_waiting() {
        let clock = Arc::new(ManualClock::default());
        let mut pace = seeded(100.0, clock.clone());

        for _ in 0..DEFAULT_WARMUP_CHUNKS {
            assert_eq!(pace.next_chunk_len(), 1);
            assert_eq!(pace.advance(1).await, Duration::ZERO);
        }
        assert_eq!(pace.average_chunk_len(), None);
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_warmup_estimates_chunk_len() {
        let clock = Arc::new(ManualClock::default());
        let mut pace = seeded(100.0, clock.clone());

        // host applies one edit every 40ms, i.e. 25 chars/s against a target of 100
        pace.advance(1).await;
        for _ in 0..DEFAULT_WARMUP_CHUNKS {
            clock.tick(Duration::from_millis(40));
            pace.advance(1).await;
        }

        let average = pace.average_chunk_len().unwrap();
        assert!((average - 4.0).abs() < 1e-9, "average = {average}");

        for _ in 0..200 {
            let len = pace.next_chunk_len();
            assert!((1..8).contains(&len), "len = {len}");
        }
    }

    #[tokio::test]
    async fn test_fast_host_gets_single_char_chunks() {
        let clock = Arc::new(ManualClock::default());
        let mut pace = seeded(100.0, clock.clone());

        for _ in 0..=DEFAULT_WARMUP_CHUNKS {
            clock.tick(Duration::from_millis(1));
            pace.advance(1).await;
        }

        assert_eq!(pace.average_chunk_len(), Some(1.0));
        for _ in 0..50 {
            assert_eq!(pace.next_chunk_len(), 1);
        }
    }

    #[tokio::test]
    async fn test_waits_only_when_ahead() {
        let clock = Arc::new(ManualClock::default());
        let mut pace = seeded(10.0, clock.clone()).with_warmup_chunks(0);

        // 5 chars at 10 cps are due at 0.5s
        assert_eq!(pace.advance(5).await, Duration::from_millis(500));

        // already behind schedule: no wait, no catch-up
        clock.tick(Duration::from_secs(3));
        assert_eq!(pace.advance(5).await, Duration::ZERO);
        assert_eq!(clock.elapsed(), Duration::from_millis(3500));

        // 30 chars are due at 3s, which has passed
        assert_eq!(pace.advance(20).await, Duration::ZERO);
        assert_eq!(pace.advance(10).await, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paced_run_is_never_early() {
        let clock = Arc::new(TokioClock::new());
        let start = tokio::time::Instant::now();
        // 1200 words per minute is 100 characters per second
        let config = AnimationConfig::with_words_per_minute(1200.0);
        let mut pace =
            PaceController::from_config(&config, clock.clone()).with_rng(StdRng::seed_from_u64(1));

        let mut remaining = 500usize;
        while remaining > 0 {
            let len = pace.next_chunk_len().min(remaining);
            pace.advance(len).await;
            remaining -= len;

            if pace.average_chunk_len().is_some() {
                let due = Duration::from_secs_f64(pace.advanced() as f64 / 100.0);
                assert!(start.elapsed() >= due);
            }
        }

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5), "elapsed = {elapsed:?}");
        assert!(elapsed < Duration::from_millis(5100), "elapsed = {elapsed:?}");
    }
}
