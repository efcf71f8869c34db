//! The message builder, memory adapter contract, and pluggable context
//! compaction strategies.

pub mod builder;
pub mod compaction;
pub mod memory;

pub use builder::MessageBuilder;
pub use compaction::{ContextStrategy, NoCompaction, SlidingWindow};
pub use memory::{InMemoryAdapter, MemoryAdapter};
