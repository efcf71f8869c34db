//! Checkpoint persistence, keyed by `(agentId, runId, stepIndex)`.
//!
//! Shaped after the same store contract memory adapters use, so an
//! in-memory backend (the default, and what tests use) and any
//! externally supplied durable backend share one interface.

use agentrun_types::checkpoint::Checkpoint;
use agentrun_types::error::MemoryError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persists and retrieves checkpoints.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Save (or overwrite) a checkpoint.
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), MemoryError>;

    /// Load the checkpoint for an exact `(agentId, runId, stepIndex)` key.
    async fn load(&self, agent_id: &str, run_id: &str, step_index: u32) -> Result<Option<Checkpoint>, MemoryError>;

    /// Load a checkpoint by its own id, regardless of key.
    async fn load_by_id(&self, checkpoint_id: &str) -> Result<Option<Checkpoint>, MemoryError>;
}

/// An in-process [`CheckpointStore`] backed by a `HashMap` behind an
/// async `RwLock`.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    entries: RwLock<HashMap<(String, String, u32), Checkpoint>>,
}

impl InMemoryCheckpointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), MemoryError> {
        let key = (checkpoint.agent_id.clone(), checkpoint.run_id.clone(), checkpoint.step_index);
        self.entries.write().await.insert(key, checkpoint);
        Ok(())
    }

    async fn load(&self, agent_id: &str, run_id: &str, step_index: u32) -> Result<Option<Checkpoint>, MemoryError> {
        let key = (agent_id.to_string(), run_id.to_string(), step_index);
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn load_by_id(&self, checkpoint_id: &str) -> Result<Option<Checkpoint>, MemoryError> {
        Ok(self.entries.read().await.values().find(|c| c.id == checkpoint_id).cloned())
    }
}
