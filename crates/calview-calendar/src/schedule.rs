//! Cancellable delayed tasks.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// A closure that runs once after a delay unless cancelled first.
///
/// Dropping the task cancels it.
#[derive(Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
}

impl ScheduledTask {
    pub fn spawn<F>(runtime: &Handle, delay: Duration, job: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        runtime.spawn(async move {
            let due = tokio::select! {
                biased;
                _ = cancelled.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            };
            if due {
                // Marks the task as no longer pending before the job runs.
                cancelled.cancel();
                job();
            }
        });

        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the job is still waiting to run.
    pub fn is_pending(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Holds at most one pending [`ScheduledTask`]; scheduling a new job cancels
/// the previous one, so a burst of calls inside the quiet period runs only
/// the last job.
#[derive(Debug)]
pub struct Debouncer {
    runtime: Handle,
    quiet: Duration,
    pending: Mutex<Option<ScheduledTask>>,
}

impl Debouncer {
    pub fn new(runtime: Handle, quiet: Duration) -> Self {
        Self {
            runtime,
            quiet,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Schedule `job` after the quiet period, replacing any pending job.
    pub fn schedule<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let task = ScheduledTask::spawn(&self.runtime, self.quiet, job);
        if let Some(previous) = self.pending.lock().replace(task) {
            previous.cancel();
        }
    }

    /// Drop the pending job, if any. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(task) => {
                let was_pending = task.is_pending();
                task.cancel();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().as_ref().is_some_and(ScheduledTask::is_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_task_runs_after_delay() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();

        let task = ScheduledTask::spawn(&Handle::current(), Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!task.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();

        let task = ScheduledTask::spawn(&Handle::current(), Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        task.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_runs_only_last_job() {
        let debouncer = Debouncer::new(Handle::current(), Duration::from_millis(250));
        let last = Arc::new(AtomicU32::new(0));
        let runs = Arc::new(AtomicU32::new(0));

        for value in 1..=5 {
            let last = last.clone();
            let runs = runs.clone();
            debouncer.schedule(move || {
                last.store(value, Ordering::SeqCst);
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_cancel() {
        let debouncer = Debouncer::new(Handle::current(), Duration::from_millis(250));
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();

        debouncer.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
