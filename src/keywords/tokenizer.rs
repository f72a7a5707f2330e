//! Caption tokenizer
//!
//! Lowercases, extracts word tokens of two or more characters, and drops
//! stop words. Punctuation acts as a separator.

use once_cell::sync::Lazy;
use regex::Regex;

use super::stop_words::is_stop_word;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Tokens of `text`, in order of appearance (repeats kept).
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_stop_words() {
        assert_eq!(
            tokenize("The Viral TREND, and the cool one!"),
            vec!["viral", "trend", "cool"]
        );
    }

    #[test]
    fn test_single_chars_dropped() {
        assert_eq!(tokenize("a b c rust 9 42"), vec!["rust", "42"]);
    }

    #[test]
    fn test_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
