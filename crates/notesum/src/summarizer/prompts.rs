//! Prompts for chat-style summarization providers
//!
//! Placeholders: {max_words} - target word count, {text} - the note body

use crate::summarizer::types::SummaryStyle;

/// System message sent ahead of every summarization prompt
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that writes faithful, compact summaries of personal notes. Never add facts that are not in the note.";

/// Plain-prose summary prompt
pub const CONCISE_PROMPT: &str = r#"Summarize the following note in at most {max_words} words. Write plain prose, keep the key facts, and do not add an introduction.

Note:
{text}"#;

/// Bullet-point summary prompt
pub const BULLET_PROMPT: &str = r#"Summarize the following note as a short list of bullet points using at most {max_words} words in total. Start every line with "• " and put one point per line.

Note:
{text}"#;

/// Detailed summary prompt
pub const DETAILED_PROMPT: &str = r#"Write a detailed summary of the following note in at most {max_words} words. Cover the main points, decisions and any figures mentioned.

Note:
{text}"#;

/// Render the prompt for `style`
pub fn render(style: SummaryStyle, text: &str, max_words: usize) -> String {
    let template = match style {
        SummaryStyle::Concise => CONCISE_PROMPT,
        SummaryStyle::Bullet => BULLET_PROMPT,
        SummaryStyle::Detailed => DETAILED_PROMPT,
    };
    template
        .replace("{max_words}", &max_words.to_string())
        .replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let prompt = render(SummaryStyle::Bullet, "Buy milk. Call the bank.", 40);
        assert!(prompt.contains("at most 40 words"));
        assert!(prompt.contains("Buy milk. Call the bank."));
        assert!(prompt.contains("• "));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn test_render_per_style() {
        assert!(render(SummaryStyle::Concise, "x", 10).contains("plain prose"));
        assert!(render(SummaryStyle::Detailed, "x", 10).contains("detailed summary"));
    }
}
