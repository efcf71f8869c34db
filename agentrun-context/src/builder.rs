//! Composes the initial message list for a run and persists completed
//! turns back to memory.

use crate::compaction::ContextStrategy;
use crate::memory::MemoryAdapter;
use agentrun_types::agent::{Agent, RunOptions};
use agentrun_types::error::MemoryError;
use agentrun_types::message::{Content, ContentPart, Message, Role};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds the initial transcript for a run from `(agent, runOptions,
/// threadId, memory?, contextBuilder?)` and offers the memory-facing
/// utility operations used after a run completes.
pub struct MessageBuilder {
    memory: Option<Arc<dyn MemoryAdapter>>,
    context_strategy: Option<Arc<dyn ContextStrategy>>,
    history_limit: usize,
}

impl MessageBuilder {
    /// A builder with no memory attached: every run gets a fresh
    /// `[system, user]` transcript.
    pub fn new(history_limit: usize) -> Self {
        Self { memory: None, context_strategy: None, history_limit }
    }

    /// Attach a memory adapter.
    pub fn with_memory(mut self, memory: Arc<dyn MemoryAdapter>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Attach a pluggable compaction strategy, used in place of the
    /// plain most-recent-N splice.
    pub fn with_context_strategy(mut self, strategy: Arc<dyn ContextStrategy>) -> Self {
        self.context_strategy = Some(strategy);
        self
    }

    /// The configured compaction strategy, if any, for use on the
    /// growing in-run transcript rather than just initial history.
    pub fn context_strategy(&self) -> Option<&Arc<dyn ContextStrategy>> {
        self.context_strategy.as_ref()
    }

    /// The configured history limit, doubling as a token budget for
    /// compaction when no finer-grained limit is supplied.
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    fn user_content(&self, options: &RunOptions) -> Content {
        let mut text = options.input.clone();
        if let Some(transcript) = &options.audio_transcript {
            text = format!("[Audio transcription]: {transcript}\n{text}");
        }
        if options.images.is_empty() {
            Content::Text(text)
        } else {
            let mut parts = vec![ContentPart::text(text)];
            parts.extend(options.images.iter().cloned());
            Content::Parts(parts)
        }
    }

    fn bare_transcript(&self, agent: &Agent, user_message: Message) -> Vec<Message> {
        vec![Message::system(agent.instructions.clone()), user_message]
    }

    /// Produce the initial message list for a run.
    pub async fn build_initial(&self, agent: &Agent, options: &RunOptions, thread_id: &str) -> Vec<Message> {
        let user_message = Message::user(self.user_content(options));

        let memory = match (&self.memory, options.use_memory) {
            (Some(m), true) => m,
            _ => return self.bare_transcript(agent, user_message),
        };

        if let Err(err) = memory.ensure_thread(thread_id).await {
            tracing::warn!(thread_id, error = %err, "failed to ensure memory thread, proceeding without history");
            return self.bare_transcript(agent, user_message);
        }

        if !options.load_history {
            return self.bare_transcript(agent, user_message);
        }

        if let Some(strategy) = &self.context_strategy {
            let history = memory.recent_entries(thread_id, usize::MAX).await.unwrap_or_default();
            let prefix = if strategy.should_compact(&history, self.history_limit) {
                strategy.compact(history)
            } else {
                history
            };
            let mut messages = vec![Message::system(agent.instructions.clone())];
            messages.extend(prefix);
            messages.push(user_message);
            return messages;
        }

        match memory.recent_entries(thread_id, self.history_limit).await {
            Ok(entries) => {
                let mut messages = vec![Message::system(agent.instructions.clone())];
                messages.extend(entries);
                messages.push(user_message);
                messages
            }
            Err(err) => {
                tracing::warn!(thread_id, error = %err, "failed to load memory history, proceeding without it");
                self.bare_transcript(agent, user_message)
            }
        }
    }

    /// Persist a turn to memory. Never raises: failures are logged and,
    /// if `on_error` is supplied, forwarded to it.
    pub async fn save_entry(
        &self,
        thread_id: &str,
        message: Message,
        on_error: Option<&(dyn Fn(MemoryError) + Send + Sync)>,
    ) {
        let Some(memory) = &self.memory else { return };
        if let Err(err) = memory.ensure_thread(thread_id).await {
            tracing::warn!(thread_id, error = %err, "failed to ensure memory thread while saving entry");
            if let Some(cb) = on_error {
                cb(err);
            }
            return;
        }
        if let Err(err) = memory.append_entry(thread_id, message).await {
            tracing::warn!(thread_id, error = %err, "failed to save memory entry");
            if let Some(cb) = on_error {
                cb(err);
            }
        }
    }

    /// Append a bullet list of prior-run insights to the system message.
    pub fn enrich_messages_with_insights(&self, messages: &mut [Message], insights: &[String]) {
        if insights.is_empty() {
            return;
        }
        if let Some(system) = messages.iter_mut().find(|m| m.role == Role::System) {
            let bullets = insights.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n");
            let text = format!("{}\n\nInsights from prior runs:\n{bullets}", system.content.as_text());
            system.content = Content::Text(text);
        }
    }

    /// Append key-value context pairs to the system message.
    pub fn add_context_to_messages(&self, messages: &mut [Message], context: &HashMap<String, Value>) {
        if context.is_empty() {
            return;
        }
        if let Some(system) = messages.iter_mut().find(|m| m.role == Role::System) {
            let pairs = context
                .iter()
                .map(|(k, v)| format!("- {k}: {v}"))
                .collect::<Vec<_>>()
                .join("\n");
            let text = format!("{}\n\nContext:\n{pairs}", system.content.as_text());
            system.content = Content::Text(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAdapter;

    fn agent() -> Agent {
        Agent::builder("assistant", "openai/gpt-4o", "You are helpful.").build()
    }

    #[tokio::test]
    async fn memory_off_yields_two_message_transcript() {
        let builder = MessageBuilder::new(20);
        let mut options = RunOptions::new("hello");
        options.use_memory = false;
        let messages = builder.build_initial(&agent(), &options, "thread_1").await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }

    #[tokio::test]
    async fn memory_on_splices_recent_history() {
        let memory = Arc::new(InMemoryAdapter::new());
        memory.ensure_thread("thread_1").await.unwrap();
        memory.append_entry("thread_1", Message::user("earlier turn")).await.unwrap();
        memory
            .append_entry("thread_1", Message::assistant("earlier reply"))
            .await
            .unwrap();

        let builder = MessageBuilder::new(20).with_memory(memory);
        let options = RunOptions::new("new question");
        let messages = builder.build_initial(&agent(), &options, "thread_1").await;

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content.as_text(), "earlier turn");
        assert_eq!(messages[2].content.as_text(), "earlier reply");
        assert_eq!(messages[3].content.as_text(), "new question");
    }

    #[tokio::test]
    async fn load_history_false_matches_memory_off_shape() {
        let memory = Arc::new(InMemoryAdapter::new());
        memory.ensure_thread("thread_1").await.unwrap();
        memory.append_entry("thread_1", Message::user("earlier turn")).await.unwrap();

        let builder = MessageBuilder::new(20).with_memory(memory);
        let mut options = RunOptions::new("new question");
        options.load_history = false;
        let messages = builder.build_initial(&agent(), &options, "thread_1").await;
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn audio_transcript_is_prepended_to_text() {
        let builder = MessageBuilder::new(20);
        let mut options = RunOptions::new("what next?");
        options.use_memory = false;
        options.audio_transcript = Some("please continue".to_string());
        let messages = builder.build_initial(&agent(), &options, "thread_1").await;
        assert!(messages[1].content.as_text().starts_with("[Audio transcription]: please continue"));
    }

    #[test]
    fn insights_are_appended_to_system_message() {
        let builder = MessageBuilder::new(20);
        let mut messages = vec![Message::system("base"), Message::user("hi")];
        builder.enrich_messages_with_insights(&mut messages, &["be concise".to_string()]);
        assert!(messages[0].content.as_text().contains("be concise"));
    }

    #[test]
    fn context_pairs_are_appended_to_system_message() {
        let builder = MessageBuilder::new(20);
        let mut messages = vec![Message::system("base"), Message::user("hi")];
        let mut context = HashMap::new();
        context.insert("locale".to_string(), Value::String("en-US".to_string()));
        builder.add_context_to_messages(&mut messages, &context);
        assert!(messages[0].content.as_text().contains("locale"));
    }
}
