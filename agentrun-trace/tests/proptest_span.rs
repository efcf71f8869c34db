//! Property-based tests: span hierarchy invariants.

use agentrun_trace::SpanRecorder;
use agentrun_types::span::{SpanKind, SpanStatus};
use proptest::prelude::*;
use std::collections::HashMap;

proptest! {
    /// Invariant 3: every non-root span's interval is contained in its
    /// parent's, and every span's duration is non-negative, for any
    /// root interval and any set of child offsets recorded within it.
    #[test]
    fn children_recorded_within_a_parent_interval_stay_contained(
        root_start in 0u64..1_000_000,
        root_len in 0u64..10_000,
        child_offsets in proptest::collection::vec((0u64..10_000, 0u64..10_000), 0..10),
    ) {
        let root_end = root_start + root_len;
        let recorder = SpanRecorder::new("trace_1");
        let root = recorder.record("agent.run", None, root_start, root_end, HashMap::new(), SpanStatus::Ok, SpanKind::Internal);

        prop_assert_eq!(root.duration().as_millis(), root_len);

        for (i, (start_offset, len)) in child_offsets.iter().enumerate() {
            // Clamp the child inside the root's interval by construction.
            let offset = if root_len == 0 { 0 } else { start_offset % (root_len + 1) };
            let child_start = root_start + offset;
            let remaining = root_end - child_start;
            let child_len = if remaining == 0 { 0 } else { len % (remaining + 1) };
            let child_end = child_start + child_len;
            let child = recorder.record(
                format!("child_{i}"),
                Some(root.id.clone()),
                child_start,
                child_end,
                HashMap::new(),
                SpanStatus::Ok,
                SpanKind::Internal,
            );

            prop_assert!(child.end_time >= child.start_time);
            prop_assert!(root.contains(&child), "child {} not contained in root interval", i);
        }

        let trace = recorder.trace();
        prop_assert_eq!(trace.spans.len(), child_offsets.len() + 1);
        prop_assert_eq!(trace.spans[0].id.clone(), root.id);
    }
}
