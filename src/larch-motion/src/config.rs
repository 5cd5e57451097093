//! Animation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Typing speed used when none (or a nonsensical one) is configured.
pub const DEFAULT_WORDS_PER_MINUTE: f64 = 1000.0;

/// Characters per word when converting words per minute to characters.
pub const DEFAULT_AVERAGE_WORD_LENGTH: f64 = 5.0;

/// Number of single-character chunks used to measure edit throughput.
pub const DEFAULT_WARMUP_CHUNKS: usize = 30;

/// Settings for one animation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Target typing speed.
    pub words_per_minute: f64,
    /// Characters per word.
    pub average_word_length: f64,
    /// Chunks measured before chunk sizes are randomized.
    pub warmup_chunks: usize,
    /// Give up on the animation after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            average_word_length: DEFAULT_AVERAGE_WORD_LENGTH,
            warmup_chunks: DEFAULT_WARMUP_CHUNKS,
            timeout_secs: None,
        }
    }
}

impl AnimationConfig {
    /// Create a config with the given speed and defaults elsewhere.
    pub fn with_words_per_minute(words_per_minute: f64) -> Self {
        Self {
            words_per_minute,
            ..Default::default()
        }
    }

    /// Speed actually used: non-positive or non-finite values fall back to
    /// [`DEFAULT_WORDS_PER_MINUTE`].
    pub fn effective_words_per_minute(&self) -> f64 {
        positive_or(self.words_per_minute, DEFAULT_WORDS_PER_MINUTE)
    }

    pub fn effective_word_length(&self) -> f64 {
        positive_or(self.average_word_length, DEFAULT_AVERAGE_WORD_LENGTH)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnimationConfig::default();
        assert_eq!(config.effective_words_per_minute(), 1000.0);
        assert_eq!(config.effective_word_length(), 5.0);
        assert_eq!(config.warmup_chunks, 30);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_non_positive_rate_falls_back() {
        for wpm in [0.0, -20.0, f64::NAN, f64::INFINITY] {
            let config = AnimationConfig::with_words_per_minute(wpm);
            assert_eq!(config.effective_words_per_minute(), DEFAULT_WORDS_PER_MINUTE);
        }
        assert_eq!(
            AnimationConfig::with_words_per_minute(240.0).effective_words_per_minute(),
            240.0
        );
    }

    #[test]
    fn test_partial_deserialize() {
        let config: AnimationConfig =
            serde_json::from_str(r#"{"words_per_minute": 600, "timeout_secs": 10}"#).unwrap();
        assert_eq!(config.words_per_minute, 600.0);
        assert_eq!(config.warmup_chunks, DEFAULT_WARMUP_CHUNKS);
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }
}
