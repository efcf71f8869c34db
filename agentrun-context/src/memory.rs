//! The memory adapter contract and an in-process implementation.

use agentrun_types::error::MemoryError;
use agentrun_types::message::Message;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persists and retrieves a thread's turn history.
///
/// Implementations back onto whatever store a deployment uses. Failures
/// here never fail a run — see [`crate::builder::MessageBuilder::save_entry`].
#[async_trait]
pub trait MemoryAdapter: Send + Sync {
    /// Ensure a thread entity exists, creating it if missing. Idempotent.
    async fn ensure_thread(&self, thread_id: &str) -> Result<(), MemoryError>;

    /// Append one turn to a thread's history.
    async fn append_entry(&self, thread_id: &str, message: Message) -> Result<(), MemoryError>;

    /// Fetch up to `limit` most-recent entries for a thread, oldest first.
    async fn recent_entries(&self, thread_id: &str, limit: usize) -> Result<Vec<Message>, MemoryError>;
}

/// An in-process [`MemoryAdapter`] backed by a `HashMap` behind an async
/// `RwLock`. Suitable for tests, single-process deployments, and as the
/// default when no adapter is configured.
#[derive(Default)]
pub struct InMemoryAdapter {
    threads: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemoryAdapter {
    /// Create an empty in-memory adapter.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryAdapter for InMemoryAdapter {
    async fn ensure_thread(&self, thread_id: &str) -> Result<(), MemoryError> {
        self.threads.write().await.entry(thread_id.to_string()).or_default();
        Ok(())
    }

    async fn append_entry(&self, thread_id: &str, message: Message) -> Result<(), MemoryError> {
        self.threads
            .write()
            .await
            .entry(thread_id.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn recent_entries(&self, thread_id: &str, limit: usize) -> Result<Vec<Message>, MemoryError> {
        let threads = self.threads.read().await;
        Ok(match threads.get(thread_id) {
            Some(entries) => {
                let start = entries.len().saturating_sub(limit);
                entries[start..].to_vec()
            }
            None => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recent_entries_returns_oldest_first_capped_at_limit() {
        let adapter = InMemoryAdapter::new();
        adapter.ensure_thread("thread_1").await.unwrap();
        for i in 0..5 {
            adapter
                .append_entry("thread_1", Message::user(format!("turn {i}")))
                .await
                .unwrap();
        }
        let recent = adapter.recent_entries("thread_1", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content.as_text(), "turn 3");
        assert_eq!(recent[1].content.as_text(), "turn 4");
    }

    #[tokio::test]
    async fn unknown_thread_yields_empty_history() {
        let adapter = InMemoryAdapter::new();
        let recent = adapter.recent_entries("thread_missing", 20).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn ensure_thread_is_idempotent() {
        let adapter = InMemoryAdapter::new();
        adapter.ensure_thread("thread_1").await.unwrap();
        adapter.ensure_thread("thread_1").await.unwrap();
        assert!(adapter.recent_entries("thread_1", 10).await.unwrap().is_empty());
    }
}
