use std::time::Duration;
use stt_relay::relay::ActivityTracker;

#[tokio::test(start_paused = true)]
async fn chunk_marks_session_active() {
    let tracker = ActivityTracker::new(Duration::from_secs(5));
    assert!(!tracker.has_pending_audio());

    tracker.mark_active();
    assert!(tracker.has_pending_audio());
    assert!(!tracker.is_idle());
}

#[tokio::test(start_paused = true)]
async fn session_goes_idle_after_threshold() {
    let tracker = ActivityTracker::new(Duration::from_millis(100));

    tracker.mark_active();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!tracker.is_idle());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(tracker.is_idle());

    // Idleness does not clear the flag by itself; that is the
    // scheduler's job
    assert!(tracker.has_pending_audio());
    tracker.mark_idle();
    assert!(!tracker.has_pending_audio());
}

#[tokio::test(start_paused = true)]
async fn new_chunk_refreshes_idle_clock() {
    let tracker = ActivityTracker::new(Duration::from_millis(100));

    tracker.mark_active();
    tokio::time::sleep(Duration::from_millis(80)).await;
    tracker.mark_active();
    tokio::time::sleep(Duration::from_millis(80)).await;

    // 160ms since the first chunk, but only 80ms since the last one
    assert!(!tracker.is_idle());
}
