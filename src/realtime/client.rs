use super::events::{ClientEvent, ServerEvent};
use crate::config::RealtimeSettings;
use crate::relay::scheduler::CommitTarget;
use base64::Engine;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Smallest buffer worth committing: 100ms of 16kHz mono s16le audio.
/// Committing less than this makes the service reject the commit.
pub const MIN_COMMIT_BYTES: usize = 3200;

/// Failure to establish the upstream connection
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid realtime connection request: {0}")]
    Request(String),

    #[error("realtime handshake failed: {0}")]
    Handshake(#[source] Box<tungstenite::Error>),
}

/// Failure on an established upstream connection
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("realtime connection is closed")]
    NotConnected,

    #[error("failed to encode realtime event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("realtime transport failed: {0}")]
    Transport(#[source] Box<tungstenite::Error>),
}

/// Outcome of a single commit attempt.
///
/// `BufferEmpty` and `BufferTooSmall` are expected under low traffic and
/// recoverable; anything wrapped in `Link` is fatal to the session.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("input buffer has no audio to commit")]
    BufferEmpty,

    #[error("input buffer holds only {buffered} bytes of audio")]
    BufferTooSmall { buffered: usize },

    #[error(transparent)]
    Link(#[from] RealtimeError),
}

/// Connection to the remote realtime transcription service.
///
/// Writes (`append_audio`, `commit`, `send_event`) serialize on the sink
/// half so frames never interleave; `next_event` reads from the stream
/// half independently and is not blocked by writers.
pub struct RealtimeClient {
    writer: Mutex<Option<WsSink>>,
    reader: Mutex<Option<WsSource>>,

    /// Bytes appended since the last successful commit
    pending_bytes: AtomicUsize,
}

impl RealtimeClient {
    /// Open the upstream connection, authenticating with a bearer
    /// credential and optionally requesting the beta protocol variant
    pub async fn connect(settings: &RealtimeSettings) -> Result<Self, ConnectError> {
        let mut request = settings
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ConnectError::Request(e.to_string()))?;

        let bearer = format!("Bearer {}", settings.api_key);
        let auth = HeaderValue::from_str(&bearer)
            .map_err(|_| ConnectError::Request("credential is not a valid header value".into()))?;
        request.headers_mut().insert(AUTHORIZATION, auth);

        if settings.beta_header {
            request
                .headers_mut()
                .insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));
        }

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| ConnectError::Handshake(Box::new(e)))?;

        info!("Connected to realtime service at {}", settings.url);

        let (sink, source) = stream.split();

        Ok(Self {
            writer: Mutex::new(Some(sink)),
            reader: Mutex::new(Some(source)),
            pending_bytes: AtomicUsize::new(0),
        })
    }

    /// Transmit one audio chunk without triggering processing
    pub async fn append_audio(&self, pcm: &[u8]) -> Result<(), RealtimeError> {
        let audio = base64::engine::general_purpose::STANDARD.encode(pcm);
        self.send_event(&ClientEvent::AppendAudio { audio }).await?;
        self.pending_bytes.fetch_add(pcm.len(), Ordering::SeqCst);
        Ok(())
    }

    /// Signal the service to process the buffered audio.
    ///
    /// Classifies before sending: an empty or sub-minimum buffer is
    /// reported as a typed outcome instead of a wasted round trip the
    /// service would reject anyway.
    pub async fn commit(&self) -> Result<(), CommitError> {
        let buffered = self.pending_bytes.load(Ordering::SeqCst);
        if buffered == 0 {
            return Err(CommitError::BufferEmpty);
        }
        if buffered < MIN_COMMIT_BYTES {
            return Err(CommitError::BufferTooSmall { buffered });
        }

        self.send_event(&ClientEvent::CommitBuffer).await?;
        self.pending_bytes.store(0, Ordering::SeqCst);
        debug!("Committed {} buffered bytes", buffered);
        Ok(())
    }

    /// Transmit an arbitrary control event
    pub async fn send_event(&self, event: &ClientEvent) -> Result<(), RealtimeError> {
        let payload = serde_json::to_string(event)?;

        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(RealtimeError::NotConnected)?;
        sink.send(Message::Text(payload))
            .await
            .map_err(|e| RealtimeError::Transport(Box::new(e)))
    }

    /// Next event from the service, or `None` once the connection has
    /// ended. Suspends until data arrives. Non-text frames and
    /// unparseable payloads are skipped.
    pub async fn next_event(&self) -> Result<Option<ServerEvent>, RealtimeError> {
        let mut reader = self.reader.lock().await;
        let source = match reader.as_mut() {
            Some(s) => s,
            None => return Ok(None),
        };

        loop {
            let msg = match source.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(RealtimeError::Transport(Box::new(e))),
                None => return Ok(None),
            };

            match msg {
                Message::Text(raw) => match serde_json::from_str::<ServerEvent>(&raw) {
                    Ok(event) => return Ok(Some(event)),
                    Err(err) => {
                        warn!("Skipping unparseable realtime event: {}", err);
                    }
                },
                Message::Close(_) => return Ok(None),
                // Ping/pong are handled by the transport; binary frames are
                // not part of this protocol
                _ => {}
            }
        }
    }

    /// Release the connection. Idempotent; later operations fail fast
    /// with `NotConnected`.
    pub async fn close(&self) {
        let mut writer = self.writer.lock().await;
        if let Some(mut sink) = writer.take() {
            if let Err(err) = sink.send(Message::Close(None)).await {
                debug!("Realtime close handshake failed: {}", err);
            }
        }
        drop(writer);

        self.reader.lock().await.take();
    }
}

#[async_trait::async_trait]
impl CommitTarget for RealtimeClient {
    async fn commit(&self) -> Result<(), CommitError> {
        RealtimeClient::commit(self).await
    }
}
