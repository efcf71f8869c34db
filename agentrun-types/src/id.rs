//! Typed identifier wrappers for runs, threads, traces, spans, tool calls
//! and checkpoints.
//!
//! These are plain strings underneath with no format enforced — the
//! orchestrator mints them with its own prefixed-random scheme (see
//! [`crate::gen`]), but callers and adapters may construct them from any
//! string they already have.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to `String`.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(AgentId, "Unique identifier for an agent.");
typed_id!(RunId, "Unique identifier for one run of an agent.");
typed_id!(ThreadId, "Identifies the memory scope a run's turns are saved under.");
typed_id!(TraceId, "Identifies the span tree produced by one run.");
typed_id!(SpanId, "Unique identifier for one span within a trace.");
typed_id!(ToolCallId, "Unique identifier for one tool invocation within a run.");
typed_id!(CheckpointId, "Unique identifier for a saved checkpoint.");

/// Minting helpers producing the `prefix_<rand>` identifier shapes named in
/// the external interface: `run_` + 12 chars, `thread_` + 12, `trace_` + 16,
/// `span_` + 12.
pub mod gen {
    use super::*;

    fn rand_suffix(len: usize) -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        // Seeded from the current time and a per-call counter; this is an
        // identifier generator, not a security primitive, so a small xorshift
        // over wall-clock nanos is sufficient entropy.
        static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let count = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let mut seed = nanos ^ count.wrapping_mul(0x9E3779B97F4A7C15);
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                ALPHABET[(seed as usize) % ALPHABET.len()] as char
            })
            .collect()
    }

    /// Mint a new run id: `run_` + 12 random chars.
    pub fn run_id() -> RunId {
        RunId::new(format!("run_{}", rand_suffix(12)))
    }

    /// Mint a new thread id: `thread_` + 12 random chars.
    pub fn thread_id() -> ThreadId {
        ThreadId::new(format!("thread_{}", rand_suffix(12)))
    }

    /// Mint a new trace id: `trace_` + 16 random chars.
    pub fn trace_id() -> TraceId {
        TraceId::new(format!("trace_{}", rand_suffix(16)))
    }

    /// Mint a new span id: `span_` + 12 random chars.
    pub fn span_id() -> SpanId {
        SpanId::new(format!("span_{}", rand_suffix(12)))
    }

    /// Mint a new tool call id: `call_` + 12 random chars.
    pub fn tool_call_id() -> ToolCallId {
        ToolCallId::new(format!("call_{}", rand_suffix(12)))
    }

    /// Mint a new checkpoint id: `ckpt_` + 12 random chars.
    pub fn checkpoint_id() -> CheckpointId {
        CheckpointId::new(format!("ckpt_{}", rand_suffix(12)))
    }
}
