use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Sessions tracked before the oldest is evicted
const MAX_TRACKED_SESSIONS: usize = 64;

/// Transcript deltas retained per session
const MAX_DELTAS_PER_SESSION: usize = 256;

/// One forwarded transcript delta
#[derive(Debug, Clone, Serialize)]
pub struct DeltaRecord {
    pub text: String,
    pub is_final: bool,
    pub at: DateTime<Utc>,
}

/// Everything recorded about a single relay session
#[derive(Debug, Clone, Serialize)]
pub struct SessionTrace {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub audio_chunks: u64,
    pub audio_bytes: u64,
    pub deltas: VecDeque<DeltaRecord>,
}

/// Per-session summary for the listing endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub audio_chunks: u64,
    pub audio_bytes: u64,
    pub delta_count: usize,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, SessionTrace>,

    /// Insertion order, for eviction
    order: VecDeque<String>,
}

/// Append-only in-memory store of per-session relay activity.
///
/// The relay core only ever appends; the debug HTTP handlers only read.
/// Nothing in here feeds back into relay decisions.
#[derive(Default)]
pub struct InspectStore {
    inner: RwLock<Inner>,
}

impl InspectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, session_id: &str) {
        let mut inner = self.inner.write().await;

        while inner.order.len() >= MAX_TRACKED_SESSIONS {
            if let Some(oldest) = inner.order.pop_front() {
                inner.sessions.remove(&oldest);
            }
        }

        inner.order.push_back(session_id.to_string());
        inner.sessions.insert(
            session_id.to_string(),
            SessionTrace {
                session_id: session_id.to_string(),
                created_at: Utc::now(),
                audio_chunks: 0,
                audio_bytes: 0,
                deltas: VecDeque::new(),
            },
        );
    }

    pub async fn record_audio(&self, session_id: &str, bytes: usize) {
        let mut inner = self.inner.write().await;
        if let Some(trace) = inner.sessions.get_mut(session_id) {
            trace.audio_chunks += 1;
            trace.audio_bytes += bytes as u64;
        }
    }

    pub async fn record_delta(&self, session_id: &str, text: &str, is_final: bool) {
        let mut inner = self.inner.write().await;
        if let Some(trace) = inner.sessions.get_mut(session_id) {
            if trace.deltas.len() >= MAX_DELTAS_PER_SESSION {
                trace.deltas.pop_front();
            }
            trace.deltas.push_back(DeltaRecord {
                text: text.to_string(),
                is_final,
                at: Utc::now(),
            });
        }
    }

    pub async fn summaries(&self) -> Vec<SessionSummary> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.sessions.get(id))
            .map(|trace| SessionSummary {
                session_id: trace.session_id.clone(),
                created_at: trace.created_at,
                audio_chunks: trace.audio_chunks,
                audio_bytes: trace.audio_bytes,
                delta_count: trace.deltas.len(),
            })
            .collect()
    }

    pub async fn session(&self, session_id: &str) -> Option<SessionTrace> {
        let inner = self.inner.read().await;
        inner.sessions.get(session_id).cloned()
    }
}
