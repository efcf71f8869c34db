//! The span recorder: builds [`Span`] records and forwards them,
//! synchronously, to an optional observer. Purely descriptive — nothing
//! here influences control flow.

use agentrun_types::id::gen::span_id;
use agentrun_types::span::{Span, SpanKind, SpanStatus, Trace};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A callback invoked synchronously, immediately after a span is
/// constructed. Typically wired to a UI, a file sink, or an exporter.
pub type SpanObserver = Arc<dyn Fn(&Span) + Send + Sync>;

/// Accumulates the spans recorded for one run's trace and, if an
/// observer is attached, forwards each one as it is built.
pub struct SpanRecorder {
    trace_id: String,
    observer: Option<SpanObserver>,
    spans: Mutex<Vec<Span>>,
}

impl SpanRecorder {
    /// A recorder with no observer: spans are only kept in [`Self::trace`].
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self { trace_id: trace_id.into(), observer: None, spans: Mutex::new(Vec::new()) }
    }

    /// A recorder that forwards every span to `observer` as it is built.
    pub fn with_observer(trace_id: impl Into<String>, observer: SpanObserver) -> Self {
        Self { trace_id: trace_id.into(), observer: Some(observer), spans: Mutex::new(Vec::new()) }
    }

    /// Build a span, store it, forward it to the observer if any, and
    /// emit a matching `tracing` event.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        name: impl Into<String>,
        parent_id: Option<String>,
        start_time: u64,
        end_time: u64,
        attributes: HashMap<String, Value>,
        status: SpanStatus,
        kind: SpanKind,
    ) -> Span {
        let span = Span {
            id: span_id().to_string(),
            trace_id: self.trace_id.clone(),
            parent_id,
            name: name.into(),
            start_time,
            end_time,
            attributes,
            status,
            kind,
        };

        match span.status {
            SpanStatus::Error => tracing::warn!(
                span_id = %span.id,
                trace_id = %span.trace_id,
                name = %span.name,
                duration_ms = span.duration().as_millis(),
                attributes = ?span.attributes,
                "span recorded"
            ),
            SpanStatus::Ok | SpanStatus::Unset => tracing::info!(
                span_id = %span.id,
                trace_id = %span.trace_id,
                name = %span.name,
                duration_ms = span.duration().as_millis(),
                attributes = ?span.attributes,
                "span recorded"
            ),
        }

        if let Some(observer) = &self.observer {
            observer(&span);
        }

        self.spans.lock().expect("span recorder mutex poisoned").push(span.clone());
        span
    }

    /// Snapshot every span recorded so far as a [`Trace`], with the root
    /// `agent.run` span (the first recorded, by convention) at index 0.
    pub fn trace(&self) -> Trace {
        Trace {
            trace_id: self.trace_id.clone(),
            spans: self.spans.lock().expect("span recorder mutex poisoned").clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn record_mints_a_fresh_id_per_span() {
        let recorder = SpanRecorder::new("trace_1");
        let a = recorder.record("a", None, 0, 10, HashMap::new(), SpanStatus::Ok, SpanKind::Internal);
        let b = recorder.record("b", None, 10, 20, HashMap::new(), SpanStatus::Ok, SpanKind::Internal);
        assert_ne!(a.id, b.id);
        assert_eq!(recorder.trace().spans.len(), 2);
    }

    #[test]
    fn observer_is_invoked_synchronously_per_span() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let recorder = SpanRecorder::with_observer(
            "trace_1",
            Arc::new(move |_span: &Span| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        recorder.record("a", None, 0, 5, HashMap::new(), SpanStatus::Ok, SpanKind::Internal);
        recorder.record("b", None, 5, 10, HashMap::new(), SpanStatus::Error, SpanKind::Client);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn trace_preserves_recording_order() {
        let recorder = SpanRecorder::new("trace_1");
        recorder.record("first", None, 0, 1, HashMap::new(), SpanStatus::Ok, SpanKind::Internal);
        recorder.record("second", Some("span_x".into()), 1, 2, HashMap::new(), SpanStatus::Ok, SpanKind::Internal);
        let trace = recorder.trace();
        assert_eq!(trace.spans[0].name, "first");
        assert_eq!(trace.spans[1].name, "second");
        assert_eq!(trace.spans[1].parent_id.as_deref(), Some("span_x"));
    }
}
