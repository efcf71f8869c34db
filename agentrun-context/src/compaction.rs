//! Pluggable context-window compaction.
//!
//! [`NoCompaction`] preserves the distilled 20-entry splice behavior
//! exactly; [`SlidingWindow`] drops older turns once the composed
//! prefix's estimated token count exceeds a limit.

use agentrun_types::message::{Content, ContentPart, Message};

/// Estimates token usage for a composed prefix and decides whether, and
/// how, to compact it before the fresh user turn is appended.
pub trait ContextStrategy: Send + Sync {
    /// Rough token count for `messages`.
    fn token_estimate(&self, messages: &[Message]) -> usize;

    /// Whether `messages` exceeds `limit` and should be compacted.
    fn should_compact(&self, messages: &[Message], limit: usize) -> bool {
        self.token_estimate(messages) > limit
    }

    /// Produce a shorter prefix under token pressure.
    fn compact(&self, messages: Vec<Message>) -> Vec<Message>;
}

/// Never compacts. The default when no strategy is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCompaction;

impl ContextStrategy for NoCompaction {
    fn token_estimate(&self, _messages: &[Message]) -> usize {
        0
    }

    fn should_compact(&self, _messages: &[Message], _limit: usize) -> bool {
        false
    }

    fn compact(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
    }
}

/// Drops the oldest messages once estimated tokens exceed the limit,
/// keeping the first message (the thread's anchor) and as many of the
/// most recent messages as fit roughly half the original budget.
pub struct SlidingWindow {
    chars_per_token: usize,
}

impl SlidingWindow {
    /// A window using the default 4-chars-per-token estimate.
    pub fn new() -> Self {
        Self { chars_per_token: 4 }
    }

    /// A window using a caller-supplied chars-per-token ratio.
    pub fn with_ratio(chars_per_token: usize) -> Self {
        Self { chars_per_token: chars_per_token.max(1) }
    }

    fn estimate_message_tokens(&self, msg: &Message) -> usize {
        let text_len = match &msg.content {
            Content::Text(t) => t.len(),
            Content::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => text.len(),
                    ContentPart::ImageUrl { .. } | ContentPart::ImageBase64 { .. } => 4000,
                })
                .sum(),
        };
        text_len / self.chars_per_token + 4
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStrategy for SlidingWindow {
    fn token_estimate(&self, messages: &[Message]) -> usize {
        messages.iter().map(|m| self.estimate_message_tokens(m)).sum()
    }

    fn compact(&self, messages: Vec<Message>) -> Vec<Message> {
        if messages.len() <= 2 {
            return messages;
        }

        let first = messages[0].clone();
        let rest = &messages[1..];
        let total_tokens: usize = messages.iter().map(|m| self.estimate_message_tokens(m)).sum();
        let target = total_tokens / 2;

        let mut kept = Vec::new();
        let mut current_tokens = self.estimate_message_tokens(&first);
        for msg in rest.iter().rev() {
            let msg_tokens = self.estimate_message_tokens(msg);
            if current_tokens + msg_tokens > target && !kept.is_empty() {
                break;
            }
            kept.push(msg.clone());
            current_tokens += msg_tokens;
        }

        kept.reverse();
        let mut result = vec![first];
        result.extend(kept);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(text: &str) -> Message {
        Message::user(text)
    }

    #[test]
    fn no_compaction_never_triggers() {
        let strategy = NoCompaction;
        let messages = vec![text_message(&"a".repeat(10_000))];
        assert!(!strategy.should_compact(&messages, 1));
        assert_eq!(strategy.compact(messages.clone()).len(), messages.len());
    }

    #[test]
    fn sliding_window_estimates_tokens() {
        let sw = SlidingWindow::new();
        let messages = vec![text_message(&"a".repeat(400))];
        assert_eq!(sw.token_estimate(&messages), 104);
    }

    #[test]
    fn sliding_window_should_compact_past_limit() {
        let sw = SlidingWindow::new();
        let messages = vec![text_message(&"a".repeat(400))];
        assert!(sw.should_compact(&messages, 50));
        assert!(!sw.should_compact(&messages, 200));
    }

    #[test]
    fn sliding_window_compact_preserves_first_and_recent() {
        let sw = SlidingWindow::new();
        let messages = vec![
            text_message(&"first ".repeat(100)),
            text_message(&"old ".repeat(100)),
            text_message(&"middle ".repeat(100)),
            text_message(&"recent ".repeat(100)),
            text_message(&"latest ".repeat(100)),
        ];

        let compacted = sw.compact(messages.clone());
        assert_eq!(compacted[0].content.as_text(), messages[0].content.as_text());
        assert!(compacted.len() < messages.len());
        assert!(compacted.len() >= 2);
        assert_eq!(
            compacted.last().unwrap().content.as_text(),
            messages.last().unwrap().content.as_text()
        );
    }

    #[test]
    fn sliding_window_short_messages_unchanged() {
        let sw = SlidingWindow::new();
        let messages = vec![text_message("hi"), text_message("hello")];
        assert_eq!(sw.compact(messages.clone()).len(), messages.len());
    }
}
