use super::activity::ActivityTracker;
use super::messages::{ClientMessage, TransportMode};
use super::normalizer::{normalize, NormalizedEvent};
use super::scheduler::{CommitScheduler, CommitTarget};
use crate::config::Config;
use crate::inspect::InspectStore;
use crate::realtime::{ClientEvent, RealtimeClient};
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// One duplex relay session: a client connection wired to its own upstream
/// link and commit scheduler.
///
/// The session runs three concurrent tasks (client→upstream audio,
/// upstream→client transcripts, and the scheduler) and tears all of them
/// down as soon as any one finishes.
pub struct RelaySession {
    id: String,
    mode: TransportMode,
    config: Arc<Config>,
    inspect: Arc<InspectStore>,
}

impl RelaySession {
    pub fn new(mode: TransportMode, config: Arc<Config>, inspect: Arc<InspectStore>) -> Self {
        Self {
            id: format!("sess-{}", uuid::Uuid::new_v4()),
            mode,
            config,
            inspect,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Drive the session until the client disconnects, the upstream
    /// connection ends, or a fatal error occurs. Teardown is performed
    /// exactly once before returning.
    pub async fn run(self, socket: WebSocket) {
        info!("Session {} started (mode {:?})", self.id, self.mode);
        self.inspect.register(&self.id).await;

        let (ws_tx, ws_rx) = socket.split();
        let (client, writer) = ClientSender::start(ws_tx, self.mode);

        // Handshake first, so the client learns the expected audio format
        // even if the upstream connect below fails
        client.send(&ClientMessage::ready()).await;

        let upstream = match RealtimeClient::connect(&self.config.realtime).await {
            Ok(link) => Arc::new(link),
            Err(err) => {
                error!("Session {}: realtime connect failed: {}", self.id, err);
                client
                    .send(&ClientMessage::Error {
                        reason: "realtime_connect_failed".to_string(),
                        detail: Some(json!(err.to_string())),
                    })
                    .await;
                drop(client);
                let _ = writer.await;
                return;
            }
        };

        client
            .send(&ClientMessage::SessionStarted {
                session_id: self.id.clone(),
            })
            .await;

        let control = ClientEvent::transcription_request(&self.config.realtime.language);
        if let Err(err) = upstream.send_event(&control).await {
            error!("Session {}: initial control event failed: {}", self.id, err);
            client
                .send(&ClientMessage::Error {
                    reason: "realtime_setup_failed".to_string(),
                    detail: Some(json!(err.to_string())),
                })
                .await;
            upstream.close().await;
            drop(client);
            let _ = writer.await;
            return;
        }

        let activity = Arc::new(ActivityTracker::new(self.config.relay.idle_timeout()));

        let scheduler = CommitScheduler::new(
            Arc::clone(&upstream) as Arc<dyn CommitTarget>,
            Arc::clone(&activity),
            self.config.relay.commit_interval(),
        );

        let mut scheduler_task = tokio::spawn(scheduler.run());

        let mut audio_task = tokio::spawn(forward_audio(
            ws_rx,
            Arc::clone(&upstream),
            Arc::clone(&activity),
            client.clone(),
            Arc::clone(&self.inspect),
            self.id.clone(),
        ));

        let mut transcript_task = tokio::spawn(forward_transcripts(
            Arc::clone(&upstream),
            client.clone(),
            Arc::clone(&self.inspect),
            self.id.clone(),
        ));

        // First task to finish wins; the others are cancelled and awaited
        tokio::select! {
            res = &mut audio_task => {
                log_join("audio forward", res);
                info!("Session {}: client audio stream ended", self.id);
                reap("transcript forward", &mut transcript_task).await;
                reap("commit scheduler", &mut scheduler_task).await;
            }
            res = &mut transcript_task => {
                log_join("transcript forward", res);
                info!("Session {}: realtime event stream ended", self.id);
                reap("audio forward", &mut audio_task).await;
                reap("commit scheduler", &mut scheduler_task).await;
            }
            res = &mut scheduler_task => {
                match res {
                    Ok(Err(err)) => {
                        error!("Session {}: commit scheduler failed: {}", self.id, err);
                        client
                            .send(&ClientMessage::Error {
                                reason: "commit_failed".to_string(),
                                detail: Some(json!(err.to_string())),
                            })
                            .await;
                    }
                    Ok(Ok(())) => {}
                    Err(err) => error!("Commit scheduler task panicked: {}", err),
                }
                reap("audio forward", &mut audio_task).await;
                reap("transcript forward", &mut transcript_task).await;
            }
        }

        upstream.close().await;
        drop(client);
        let _ = writer.await;

        info!("Session {} closed", self.id);
    }
}

/// Abort a forwarding task and wait for the cancellation to land
async fn reap<T: std::fmt::Debug>(name: &str, task: &mut JoinHandle<T>) {
    task.abort();
    match (&mut *task).await {
        // The task beat the cancellation; its outcome is only logged
        Ok(out) => debug!("{} task finished during teardown: {:?}", name, out),
        Err(err) if err.is_cancelled() => {}
        Err(err) => error!("{} task panicked: {}", name, err),
    }
}

fn log_join(name: &str, res: Result<(), tokio::task::JoinError>) {
    if let Err(err) = res {
        error!("{} task panicked: {}", name, err);
    }
}

/// Client → upstream: forward binary audio frames, answer text-level
/// pings, ignore everything else
async fn forward_audio(
    mut ws_rx: SplitStream<WebSocket>,
    upstream: Arc<RealtimeClient>,
    activity: Arc<ActivityTracker>,
    client: ClientSender,
    inspect: Arc<InspectStore>,
    session_id: String,
) {
    while let Some(msg) = ws_rx.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                debug!("Client socket read failed: {}", err);
                break;
            }
        };

        match msg {
            Message::Binary(chunk) => {
                if chunk.is_empty() {
                    continue;
                }
                if let Err(err) = upstream.append_audio(&chunk).await {
                    error!("Forwarding audio chunk failed: {}", err);
                    break;
                }
                activity.mark_active();
                inspect.record_audio(&session_id, chunk.len()).await;
            }
            Message::Text(text) => {
                if text.trim() == "ping" {
                    client.send_pong().await;
                }
                // Unrecognized text frames are ignored, not errors
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
}

/// Upstream → client: normalize raw events and forward transcripts,
/// status notices, and non-fatal error notices
async fn forward_transcripts(
    upstream: Arc<RealtimeClient>,
    client: ClientSender,
    inspect: Arc<InspectStore>,
    session_id: String,
) {
    let mut previous = String::new();

    loop {
        let event = match upstream.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!("Realtime connection closed");
                break;
            }
            Err(err) => {
                error!("Realtime read failed: {}", err);
                break;
            }
        };

        let Some(normalized) = normalize(&event, &previous) else {
            continue;
        };

        match normalized {
            NormalizedEvent::Error { detail } => {
                warn!("Realtime error event: {}", detail);
                client
                    .send(&ClientMessage::Error {
                        reason: "realtime_error".to_string(),
                        detail: Some(detail),
                    })
                    .await;
            }
            NormalizedEvent::Info { kind } => {
                client.send(&ClientMessage::Info { msg: kind }).await;
            }
            NormalizedEvent::Transcript {
                text,
                delta,
                is_final,
            } => {
                inspect.record_delta(&session_id, &delta, is_final).await;
                client.send_transcript(&text, &delta, is_final).await;
                previous = text;
            }
        }
    }
}

/// Outbound half of the client connection.
///
/// All writers funnel through one mpsc channel into a single writer task,
/// so transcript frames and pong replies never interleave on the socket.
/// Dropping every clone closes the channel, which makes the writer task
/// send a close frame and exit.
#[derive(Clone)]
struct ClientSender {
    tx: mpsc::Sender<Message>,
    mode: TransportMode,
}

impl ClientSender {
    fn start(
        mut ws_tx: SplitSink<WebSocket, Message>,
        mode: TransportMode,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Message>(64);

        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(err) = ws_tx.send(msg).await {
                    debug!("Client write failed: {}", err);
                    return;
                }
            }
            let _ = ws_tx.send(Message::Close(None)).await;
        });

        (Self { tx, mode }, writer)
    }

    /// Send an envelope frame. Text-mode clients only understand raw
    /// transcript deltas, so envelopes are JSON-mode only.
    async fn send(&self, message: &ClientMessage) {
        if self.mode != TransportMode::Json {
            return;
        }
        match serde_json::to_string(message) {
            Ok(payload) => {
                let _ = self.tx.send(Message::Text(payload)).await;
            }
            Err(err) => warn!("Failed to encode client message: {}", err),
        }
    }

    async fn send_transcript(&self, text: &str, delta: &str, is_final: bool) {
        match self.mode {
            TransportMode::Json => {
                self.send(&ClientMessage::transcript(text.to_string(), is_final))
                    .await;
            }
            TransportMode::Text => {
                let _ = self.tx.send(Message::Text(delta.to_string())).await;
            }
        }
    }

    async fn send_pong(&self) {
        let _ = self.tx.send(Message::Text("pong".to_string())).await;
    }
}
