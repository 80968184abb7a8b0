use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Per-session audio activity state shared between the audio-forwarding
/// path and the commit scheduler.
///
/// The audio path is the only writer of "active" (every chunk marks the
/// session active and refreshes the timestamp); the scheduler is the only
/// writer of "inactive". Timestamps use `tokio::time` so schedulers and
/// tests run under the same clock.
pub struct ActivityTracker {
    started: Instant,
    pending: AtomicBool,

    /// Milliseconds since `started` at which the last chunk was seen
    last_audio_ms: AtomicU64,

    idle_threshold: Duration,
}

impl ActivityTracker {
    pub fn new(idle_threshold: Duration) -> Self {
        Self {
            started: Instant::now(),
            pending: AtomicBool::new(false),
            last_audio_ms: AtomicU64::new(0),
            idle_threshold,
        }
    }

    /// Record an audio chunk: audio is flowing, refresh the timestamp
    pub fn mark_active(&self) {
        self.last_audio_ms
            .store(self.started.elapsed().as_millis() as u64, Ordering::SeqCst);
        self.pending.store(true, Ordering::SeqCst);
    }

    /// Clear the pending flag; called by the scheduler once the session
    /// has gone quiet or the buffer is confirmed empty
    pub fn mark_idle(&self) {
        self.pending.store(false, Ordering::SeqCst);
    }

    pub fn has_pending_audio(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Time elapsed since the last audio chunk
    pub fn idle_for(&self) -> Duration {
        let now_ms = self.started.elapsed().as_millis() as u64;
        Duration::from_millis(now_ms.saturating_sub(self.last_audio_ms.load(Ordering::SeqCst)))
    }

    pub fn is_idle(&self) -> bool {
        self.idle_for() > self.idle_threshold
    }
}
