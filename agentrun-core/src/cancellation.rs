//! Per-run cancellation: a timeout trigger composed with an optional
//! caller-supplied token, earliest wins.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A per-run cancellation trigger. `token` fires when either the
/// deadline elapses or the caller-supplied token (if any) fires;
/// `reason` records which one won.
pub struct RunTrigger {
    /// Fires on timeout or caller cancellation, whichever comes first.
    pub token: CancellationToken,
    reason: Arc<Mutex<Option<String>>>,
    done: CancellationToken,
}

impl RunTrigger {
    /// Install a trigger with the given deadline, optionally composed
    /// with a caller-supplied token.
    pub fn install(timeout: Duration, external: Option<CancellationToken>) -> Self {
        let token = CancellationToken::new();
        let reason = Arc::new(Mutex::new(None));
        let done = CancellationToken::new();

        let task_token = token.clone();
        let task_reason = reason.clone();
        let task_done = done.clone();
        tokio::spawn(async move {
            let sleep = tokio::time::sleep(timeout);
            tokio::pin!(sleep);
            tokio::select! {
                _ = &mut sleep => {
                    *task_reason.lock().expect("reason mutex poisoned") =
                        Some(format!("Run timed out after {}ms", timeout.as_millis()));
                    task_token.cancel();
                }
                _ = external_cancelled(&external) => {
                    *task_reason.lock().expect("reason mutex poisoned") =
                        Some("Run cancelled by caller".to_string());
                    task_token.cancel();
                }
                _ = task_done.cancelled() => {}
            }
        });

        Self { token, reason, done }
    }

    /// The reason the trigger fired, if it has.
    pub fn reason(&self) -> String {
        self.reason
            .lock()
            .expect("reason mutex poisoned")
            .clone()
            .unwrap_or_else(|| "run cancelled".to_string())
    }

    /// Stop the background timer task; call once the run has finished
    /// so the trigger doesn't fire after the fact.
    pub fn stop(&self) {
        self.done.cancel();
    }
}

async fn external_cancelled(external: &Option<CancellationToken>) {
    match external {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
