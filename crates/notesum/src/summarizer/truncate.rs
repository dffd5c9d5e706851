//! Last-resort truncation
//!
//! Never fails. Prefers whole sentences within a word budget of
//! `max_length / 4`; text without sentence punctuation is cut at
//! `max_length * 4` characters instead.

use crate::summarizer::extractive::split_sentences;

pub const ELLIPSIS: &str = "...";

/// Shorten `text` to roughly `max_length` token-like units
pub fn simple_truncate(text: &str, max_length: usize) -> String {
    let text = text.trim();
    if text.is_empty() || max_length == 0 {
        return String::new();
    }

    let char_limit = max_length.saturating_mul(4);
    let sentences = split_sentences(text);

    let result = if sentences.is_empty() {
        truncate_chars(text, char_limit)
    } else {
        truncate_sentences(&sentences, (max_length / 4).max(1))
    };

    // Very long words can push the sentence path past the character cap
    if result.chars().count() > char_limit + ELLIPSIS.len() {
        truncate_chars(&result, char_limit)
    } else {
        result
    }
}

/// Keep leading sentences while their word total stays within `word_budget`;
/// hard-cut the first sentence if it alone is over budget
fn truncate_sentences(sentences: &[String], word_budget: usize) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut words = 0;

    for sentence in sentences {
        let count = sentence.split_whitespace().count();
        if words + count > word_budget {
            break;
        }
        words += count;
        kept.push(sentence);
    }

    if kept.is_empty() {
        let head: Vec<&str> = sentences[0].split_whitespace().take(word_budget).collect();
        return format!("{}{ELLIPSIS}", head.join(" "));
    }

    kept.join(" ")
}

/// Cut at `limit` characters, backing up to a space if one falls within the
/// last 20% of the window
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let window: String = text.chars().take(limit).collect();
    let snap_floor = limit * 4 / 5;

    let cut = match window.rfind(' ') {
        Some(pos) if window[..pos].chars().count() >= snap_floor => &window[..pos],
        _ => window.as_str(),
    };

    format!("{}{ELLIPSIS}", cut.trim_end())
}
