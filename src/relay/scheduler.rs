use super::activity::ActivityTracker;
use crate::realtime::CommitError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error};

/// Anything the scheduler can ask to flush its buffered audio
#[async_trait::async_trait]
pub trait CommitTarget: Send + Sync {
    async fn commit(&self) -> Result<(), CommitError>;
}

/// Handle for waking the scheduler ahead of its interval
#[derive(Clone)]
pub struct SchedulerHandle {
    poke: Arc<Notify>,
}

impl SchedulerHandle {
    /// Request a commit attempt before the next interval elapses
    pub fn poke(&self) {
        self.poke.notify_one();
    }
}

/// Timer-driven commit loop.
///
/// On every wake (interval elapsed, or poked) the scheduler commits the
/// buffered upstream audio, but only when audio has actually been sent
/// since the last commit and the sender has not gone idle. Benign commit
/// outcomes (empty or sub-minimum buffer) keep the loop running; any other
/// failure terminates it so the session can be torn down.
pub struct CommitScheduler {
    target: Arc<dyn CommitTarget>,
    activity: Arc<ActivityTracker>,
    interval: Duration,
    poke: Arc<Notify>,
}

impl CommitScheduler {
    pub fn new(
        target: Arc<dyn CommitTarget>,
        activity: Arc<ActivityTracker>,
        interval: Duration,
    ) -> Self {
        Self {
            target,
            activity,
            interval,
            poke: Arc::new(Notify::new()),
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            poke: Arc::clone(&self.poke),
        }
    }

    /// Run until a fatal commit error occurs or the task is cancelled
    pub async fn run(self) -> Result<(), CommitError> {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.poke.notified() => {}
            }

            if !self.activity.has_pending_audio() {
                continue;
            }

            if self.activity.is_idle() {
                // The sender stopped producing audio; skip the commit and
                // stay quiet until the next chunk arrives
                debug!("Session idle for {:?}, suppressing commit", self.activity.idle_for());
                self.activity.mark_idle();
                continue;
            }

            match self.target.commit().await {
                Ok(()) => {}
                Err(CommitError::BufferEmpty) => {
                    // Buffer confirmed empty upstream; nothing to flush
                    // until more audio arrives
                    self.activity.mark_idle();
                }
                Err(CommitError::BufferTooSmall { buffered }) => {
                    // More audio is expected shortly; retry on the next tick
                    debug!("Buffer too small to commit ({} bytes), waiting", buffered);
                }
                Err(err) => {
                    error!("Commit failed: {}", err);
                    return Err(err);
                }
            }
        }
    }
}
