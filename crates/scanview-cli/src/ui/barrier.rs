//! Completion barrier for spinner sub-tasks
//!
//! Every spinner registers its task handle here. Summary renders call
//! [`CompletionBarrier::wait`] first, which joins everything registered so
//! far; the handles are consumed, so a second wait with nothing new
//! registered returns immediately. There is no timeout: each task ends on
//! its own once its stage finishes or its producer goes away.

use super::error::RenderError;
use tokio::task::JoinHandle;

/// Handle of a registered sub-task
pub type TaskHandle = JoinHandle<Result<(), RenderError>>;

/// Counted set of outstanding sub-tasks
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    tasks: Vec<TaskHandle>,
}

impl CompletionBarrier {
    /// Empty barrier
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a spawned sub-task
    pub fn register(&mut self, handle: TaskHandle) {
        self.tasks.push(handle);
    }

    /// Number of tracked tasks that are still running
    pub fn outstanding(&self) -> usize {
        self.tasks.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every registered task has finished.
    ///
    /// Task failures are logged, not returned: a spinner that could not
    /// draw its final state must not hold back the summary that follows.
    pub async fn wait(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        if !tasks.is_empty() {
            tracing::debug!(count = tasks.len(), "waiting for sub-tasks");
        }
        for handle in tasks {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "sub-task render failed"),
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::warn!(error = %e, "sub-task panicked"),
            }
        }
    }

    /// Stop every task that is still running and wait for it to unwind.
    /// Used at shutdown, when no later render will need them.
    pub async fn cancel(&mut self) {
        for handle in &self.tasks {
            handle.abort();
        }
        self.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_joins_all_tasks() {
        let done = Arc::new(AtomicUsize::new(0));
        let mut barrier = CompletionBarrier::new();
        for ms in [30, 10, 20] {
            let done = Arc::clone(&done);
            barrier.register(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok::<(), RenderError>(())
            }));
        }
        assert!(barrier.outstanding() <= 3);

        barrier.wait().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(barrier.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_wait_is_idempotent_when_empty() {
        let mut barrier = CompletionBarrier::new();
        barrier.wait().await;
        barrier.wait().await;
        assert_eq!(barrier.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_failed_task_does_not_fail_wait() {
        let mut barrier = CompletionBarrier::new();
        barrier.register(tokio::spawn(async { Err::<(), _>(RenderError::Closed) }));
        barrier.wait().await;
        assert_eq!(barrier.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_stuck_tasks() {
        let mut barrier = CompletionBarrier::new();
        barrier.register(tokio::spawn(async {
            std::future::pending::<()>().await;
            Ok::<(), RenderError>(())
        }));
        assert_eq!(barrier.outstanding(), 1);
        barrier.cancel().await;
        assert_eq!(barrier.outstanding(), 0);
    }
}
