//! Checkpoint storage and replay.
//!
//! Every run records a [`checkpoint::Checkpoint`] after each iteration.
//! Checkpoints support three operations: deterministic replay (rebuild the
//! transcript, make no new backend calls), live replay (resume the control
//! loop from a rebuilt transcript), and forking (derive a new checkpoint
//! with overridden context, input, or tool results).

mod replay;
mod store;

pub use replay::{
    compare_traces, deterministic_replay, fork, fork_and_replay, live_replay, ForkOptions,
    ReplayOverrides, RunFromTranscript,
};
pub use store::{CheckpointStore, InMemoryCheckpointStore};
