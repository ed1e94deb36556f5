//! Reading-time estimation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Assumed reading speed
pub const WORDS_PER_MINUTE: u32 = 200;

/// Estimated time needed to read a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReadingTime {
    /// Whitespace-delimited words in the text
    pub words: usize,
    /// Whole minutes, never less than one
    pub minutes: u32,
}

impl ReadingTime {
    /// Estimate at the default reading speed
    pub fn estimate(text: &str) -> Self {
        Self::with_speed(text, WORDS_PER_MINUTE)
    }

    /// Estimate at `words_per_minute`; zero falls back to the default speed
    pub fn with_speed(text: &str, words_per_minute: u32) -> Self {
        let wpm = if words_per_minute == 0 {
            WORDS_PER_MINUTE
        } else {
            words_per_minute
        };
        let words = word_count(text);
        let minutes = words.div_ceil(wpm as usize).max(1);
        Self {
            words,
            minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min read", self.minutes)
    }
}

/// Number of whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_one_minute() {
        let rt = ReadingTime::estimate("");
        assert_eq!(rt.words, 0);
        assert_eq!(rt.minutes, 1);
        assert_eq!(rt.to_string(), "1 min read");

        assert_eq!(ReadingTime::estimate("   \n\t ").minutes, 1);
    }

    #[test]
    fn test_rounds_up_to_whole_minutes() {
        let words = |n: usize| vec!["word"; n].join(" ");
        assert_eq!(ReadingTime::estimate(&words(200)).minutes, 1);
        assert_eq!(ReadingTime::estimate(&words(201)).minutes, 2);
        assert_eq!(ReadingTime::estimate(&words(600)).minutes, 3);
        assert_eq!(ReadingTime::estimate(&words(600)).to_string(), "3 min read");
    }

    #[test]
    fn test_monotonic_in_word_count() {
        let mut text = String::new();
        let mut previous = ReadingTime::estimate(&text).minutes;
        for _ in 0..1000 {
            text.push_str("lorem ");
            let current = ReadingTime::estimate(&text).minutes;
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_custom_speed() {
        let text = vec!["w"; 100].join("\n");
        assert_eq!(ReadingTime::with_speed(&text, 50).minutes, 2);
        assert_eq!(ReadingTime::with_speed(&text, 0).minutes, 1);
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        assert_eq!(word_count("  one\ttwo\n\nthree  "), 3);
    }
}
