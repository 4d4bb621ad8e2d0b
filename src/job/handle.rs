//! Background job handle
//!
//! A job runs once on its own tokio task. Any number of callers may wait for
//! it; all of them receive the same memoized result. State changes are
//! published through a `watch` channel and only ever move forward.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::error::panic_message;
use crate::core::{Result, ScribeError};

/// Lifecycle of a background job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Created, not started
    Pending,
    /// Work is executing
    Running,
    /// Finished with a result
    Done(Arc<str>),
    /// Finished with a failure cause
    Failed(Arc<str>),
}

impl JobState {
    /// Whether the job has finished, either way
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done(_) => "done",
            Self::Failed(_) => "failed",
        }
    }
}

struct JobInner {
    name: String,
    started: AtomicBool,
    waiters: AtomicUsize,
    state: watch::Sender<JobState>,
}

impl JobInner {
    /// Move to `next` unless the job already reached a terminal state
    fn transition(&self, next: JobState) -> bool {
        self.state.send_if_modified(|current| {
            if current.is_terminal() {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    fn finish(&self, outcome: Result<String>) {
        let next = match outcome {
            Ok(value) => {
                tracing::info!(job = %self.name, bytes = value.len(), "Background job complete");
                JobState::Done(Arc::from(value))
            }
            Err(e) => {
                tracing::error!(job = %self.name, error = %e, "Background job failed");
                JobState::Failed(Arc::from(e.to_string()))
            }
        };
        self.transition(next);
    }
}

/// Decrements the waiter count when a waiting caller leaves, even if cancelled
struct WaiterGuard<'a>(&'a AtomicUsize);

impl<'a> WaiterGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared handle to a job that runs at most once
#[derive(Clone)]
pub struct BackgroundJobHandle {
    inner: Arc<JobInner>,
}

impl BackgroundJobHandle {
    /// Create a pending job
    pub fn new(name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(JobState::Pending);
        Self {
            inner: Arc::new(JobInner {
                name: name.into(),
                started: AtomicBool::new(false),
                waiters: AtomicUsize::new(0),
                state,
            }),
        }
    }

    /// Job name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current state snapshot
    pub fn state(&self) -> JobState {
        self.inner.state.borrow().clone()
    }

    /// Whether the job reached `Done` or `Failed`
    pub fn is_finished(&self) -> bool {
        self.inner.state.borrow().is_terminal()
    }

    /// Number of callers currently blocked in [`await_result`](Self::await_result)
    pub fn waiters(&self) -> usize {
        self.inner.waiters.load(Ordering::SeqCst)
    }

    fn claim(&self) -> Result<()> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(ScribeError::AlreadyStarted(self.inner.name.clone()));
        }
        self.inner.transition(JobState::Running);
        tracing::info!(job = %self.inner.name, "Background job started");
        Ok(())
    }

    /// Run async `work` on a new tokio task. Fails if the job was started before.
    pub fn start<F, Fut>(&self, work: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        self.claim()?;
        let inner = Arc::clone(&self.inner);

        Ok(tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(work()).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => Err(panicked(panic.as_ref())),
            };
            inner.finish(outcome);
        }))
    }

    /// Run synchronous `work` on the blocking pool. Fails if the job was started before.
    pub fn start_blocking<F>(&self, work: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce() -> Result<String> + Send + 'static,
    {
        self.claim()?;
        let inner = Arc::clone(&self.inner);

        Ok(tokio::spawn(async move {
            let outcome = match tokio::task::spawn_blocking(work).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => Err(panicked(e.into_panic().as_ref())),
                Err(e) => Err(ScribeError::Other(format!("job task aborted: {}", e))),
            };
            inner.finish(outcome);
        }))
    }

    /// Wait until the job finishes and return its memoized result.
    ///
    /// Only the calling task is suspended. Every caller, before or after
    /// completion, receives the same `Arc<str>`.
    pub async fn await_result(&self) -> Result<Arc<str>> {
        let mut rx = self.inner.state.subscribe();

        let state = {
            let _guard = WaiterGuard::enter(&self.inner.waiters);
            tracing::debug!(job = %self.inner.name, "Waiting for background job");
            rx.wait_for(JobState::is_terminal)
                .await
                .map(|state| state.clone())
                .map_err(|_| ScribeError::JobFailed("job handle dropped".to_string()))?
        };

        match state {
            JobState::Done(value) => Ok(value),
            JobState::Failed(cause) => Err(ScribeError::JobFailed(cause.to_string())),
            JobState::Pending | JobState::Running => Err(ScribeError::JobFailed(
                "job ended in a non-terminal state".to_string(),
            )),
        }
    }
}

impl fmt::Debug for BackgroundJobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundJobHandle")
            .field("name", &self.inner.name)
            .field("state", &self.state().label())
            .field("waiters", &self.waiters())
            .finish()
    }
}

fn panicked(panic: &(dyn std::any::Any + Send)) -> ScribeError {
    ScribeError::Other(format!("job panicked: {}", panic_message(panic)))
}
