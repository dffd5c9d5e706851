//! Extractive fallback summarizer
//!
//! Builds a summary from the note's own sentences with no external
//! dependency. Sentences are scored by the term counts of their words,
//! adjusted for position, length, emphasis keywords and numbers; the best
//! few are re-ordered as they appear in the note and packed into the length
//! budget.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::config::ExtractiveConfig;
use crate::summarizer::provider::SummaryProvider;
use crate::summarizer::truncate::{ELLIPSIS, simple_truncate};
use crate::summarizer::types::{ProviderKind, ResolvedOptions, SummarizerError, SummaryStyle};

/// Words that carry no topical weight
const STOP_WORDS: &[&str] = &[
    "the", "and", "nor", "yet", "for", "but", "are", "was", "were", "been", "being", "has",
    "have", "had", "does", "did", "will", "would", "shall", "should", "can", "could", "may",
    "might", "must", "this", "that", "these", "those", "its", "they", "them", "their", "there",
    "then", "than", "also", "into", "from", "with", "about", "which", "who", "what", "when",
    "where", "you", "your", "our", "his", "her", "she",
];

/// Transition and emphasis words that flag a sentence as carrying a point
const EMPHASIS_KEYWORDS: &[&str] = &[
    "important",
    "significant",
    "therefore",
    "however",
    "conclusion",
    "result",
    "key",
    "main",
    "essential",
    "critical",
    "because",
    "consequently",
    "finally",
    "notably",
];

const KEYWORD_BONUS: f64 = 1.4;
const NUMERIC_BONUS: f64 = 1.2;
const SHORT_SENTENCE_PENALTY: f64 = 0.3;
const LONG_SENTENCE_PENALTY: f64 = 0.7;
const MID_LENGTH_BONUS: f64 = 1.2;

const SELECTION_RATIO: f64 = 0.3;
const MIN_SELECTED: usize = 2;
const MAX_SELECTED: usize = 4;

/// `max_length` units per output word
const UNITS_PER_WORD: f64 = 3.5;
/// Shortest cut when the best sentence alone overflows the budget
const MIN_TRUNCATED_WORDS: usize = 10;
/// Words listed by the keyword-only summary
const TOP_KEYWORDS: usize = 10;
/// Bullet clauses at or below this many characters are dropped
const MIN_BULLET_CHARS: usize = 15;

pub const BULLET_MARKER: &str = "• ";
pub const DETAILED_PREFIX: &str = "Summary:";

/// A candidate sentence and its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub sentence: String,
    pub score: f64,
    /// Position among the candidate sentences
    pub original_index: usize,
}

/// Term counts over a whole note, remembering first-appearance order so
/// ties rank deterministically
#[derive(Debug, Clone, Default)]
pub struct WordFrequencies {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl WordFrequencies {
    pub fn from_text(text: &str) -> Self {
        let mut frequencies = Self::default();
        for word in content_words(text) {
            match frequencies.counts.get_mut(&word) {
                Some(count) => *count += 1,
                None => {
                    frequencies.order.push(word.clone());
                    frequencies.counts.insert(word, 1);
                }
            }
        }
        frequencies
    }

    pub fn count(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `n` most frequent words, earlier words first on ties
    pub fn top(&self, n: usize) -> Vec<&str> {
        let mut ranked: Vec<&String> = self.order.iter().collect();
        ranked.sort_by(|a, b| self.count(b).cmp(&self.count(a)));
        ranked.into_iter().take(n).map(String::as_str).collect()
    }
}

/// Local extractive summarizer
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    config: ExtractiveConfig,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new(ExtractiveConfig::default())
    }
}

impl ExtractiveSummarizer {
    pub fn new(config: ExtractiveConfig) -> Self {
        Self { config }
    }

    /// Summarize `text` within `options.max_length`, formatted per style
    pub fn summarize_text(
        &self,
        text: &str,
        options: &ResolvedOptions,
    ) -> Result<String, SummarizerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SummarizerError::FallbackError(
                "Nothing to summarize".to_string(),
            ));
        }

        let frequencies = WordFrequencies::from_text(text);
        let candidates = self.candidate_sentences(text);

        let summary = if candidates.is_empty() {
            debug!("No usable sentences, building keyword summary");
            keyword_summary(text, &frequencies, options.max_length)
        } else {
            let selected = self.select_sentences(&candidates, &frequencies);
            debug!(
                "Selected {} of {} candidate sentences",
                selected.len(),
                candidates.len()
            );
            compose(&selected, options.max_length)
        };

        if summary.trim().is_empty() {
            return Err(SummarizerError::FallbackError(
                "Extractive summary came out empty".to_string(),
            ));
        }

        Ok(apply_style(&summary, options.style))
    }

    /// Sentences long enough to stand alone, capped at `max_candidates`
    pub fn candidate_sentences(&self, text: &str) -> Vec<String> {
        split_sentences(text)
            .into_iter()
            .filter(|s| s.chars().count() >= self.config.min_sentence_chars)
            .take(self.config.max_candidates)
            .collect()
    }

    /// Score every candidate
    pub fn score_sentences(
        &self,
        candidates: &[String],
        frequencies: &WordFrequencies,
    ) -> Vec<ScoredSentence> {
        let last = candidates.len().saturating_sub(1);

        candidates
            .iter()
            .enumerate()
            .map(|(index, sentence)| {
                let words = content_words(sentence);
                let mut score: f64 = words.iter().map(|w| frequencies.count(w) as f64).sum();

                if index == 0 {
                    score *= self.config.first_sentence_bonus;
                } else if index == last {
                    score *= self.config.last_sentence_bonus;
                }

                score *= length_factor(words.len());

                let lowered: HashSet<String> = normalized_words(sentence).collect();
                for keyword in EMPHASIS_KEYWORDS {
                    if lowered.contains(*keyword) {
                        score *= KEYWORD_BONUS;
                    }
                }

                if sentence.chars().any(|c| c.is_ascii_digit()) {
                    score *= NUMERIC_BONUS;
                }

                ScoredSentence {
                    sentence: sentence.clone(),
                    score,
                    original_index: index,
                }
            })
            .collect()
    }

    /// Best-scoring sentences, returned in their original order
    pub fn select_sentences(
        &self,
        candidates: &[String],
        frequencies: &WordFrequencies,
    ) -> Vec<ScoredSentence> {
        let mut scored = self.score_sentences(candidates, frequencies);
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.original_index.cmp(&b.original_index))
        });

        let wanted = ((candidates.len() as f64 * SELECTION_RATIO).ceil() as usize)
            .clamp(MIN_SELECTED, MAX_SELECTED);
        scored.truncate(wanted);
        scored.sort_by_key(|s| s.original_index);
        scored
    }

    /// Convenience: the sentences `summarize_text` would draw from
    pub fn select(&self, text: &str) -> Vec<ScoredSentence> {
        let frequencies = WordFrequencies::from_text(text);
        let candidates = self.candidate_sentences(text);
        self.select_sentences(&candidates, &frequencies)
    }
}

#[async_trait]
impl SummaryProvider for ExtractiveSummarizer {
    async fn summarize(
        &self,
        text: &str,
        options: &ResolvedOptions,
    ) -> Result<String, SummarizerError> {
        self.summarize_text(text, options)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Fallback
    }
}

fn length_factor(content_words: usize) -> f64 {
    match content_words {
        n if n < 5 => SHORT_SENTENCE_PENALTY,
        n if n > 35 => LONG_SENTENCE_PENALTY,
        8..=25 => MID_LENGTH_BONUS,
        _ => 1.0,
    }
}

/// Pack sentences into `max_length / 3.5` words, stopping at the first one
/// that would overflow
fn compose(selected: &[ScoredSentence], max_length: usize) -> String {
    let target_words = (max_length as f64 / UNITS_PER_WORD).floor() as usize;
    let mut parts: Vec<&str> = Vec::new();
    let mut words = 0;

    for scored in selected {
        let count = scored.sentence.split_whitespace().count();
        if words + count <= target_words {
            words += count;
            parts.push(&scored.sentence);
            continue;
        }

        if parts.is_empty() {
            let keep = target_words.max(MIN_TRUNCATED_WORDS);
            if count <= keep {
                parts.push(&scored.sentence);
            } else {
                let head: Vec<&str> = scored.sentence.split_whitespace().take(keep).collect();
                return format!("{}{ELLIPSIS}", head.join(" "));
            }
        }
        break;
    }

    parts.join(" ")
}

/// "Key topics: ..." followed by a plain truncation of the note
fn keyword_summary(text: &str, frequencies: &WordFrequencies, max_length: usize) -> String {
    let truncated = simple_truncate(text, max_length);
    let top = frequencies.top(TOP_KEYWORDS);
    if top.is_empty() {
        return truncated;
    }
    format!("Key topics: {}. {}", top.join(", "), truncated)
}

/// Reformat an assembled summary for `style`
pub fn apply_style(summary: &str, style: SummaryStyle) -> String {
    let summary = summary.trim();
    match style {
        SummaryStyle::Concise => summary.to_string(),
        SummaryStyle::Detailed => format!("{DETAILED_PREFIX} {summary}"),
        SummaryStyle::Bullet => {
            let mut clauses = split_sentences(summary);
            if clauses.is_empty() {
                clauses.push(summary.to_string());
            }

            let bullets: Vec<String> = clauses
                .iter()
                .filter(|c| c.chars().count() > MIN_BULLET_CHARS)
                .map(|c| format!("{BULLET_MARKER}{c}"))
                .collect();

            if bullets.is_empty() {
                format!("{BULLET_MARKER}{summary}")
            } else {
                bullets.join("\n")
            }
        }
    }
}

/// Split on `.`, `!` and `?` followed by whitespace or end of text
///
/// Returns nothing for text that never ends a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut terminated = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_none_or(|next| next.is_whitespace()) {
            terminated = true;
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    if !terminated {
        return Vec::new();
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Lowercased words with non-word characters treated as separators
fn normalized_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Normalized words longer than two characters that are not stop words
fn content_words(text: &str) -> Vec<String> {
    normalized_words(text)
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}
