use serde::Serialize;
use serde_json::Value;

/// How frames are delivered to the client.
///
/// `Json` wraps everything in typed envelopes; `Text` sends only the raw
/// transcript delta (and `pong`) as plain text frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    Json,
    Text,
}

impl TransportMode {
    /// Parse the `mode` query parameter; anything but `text` means JSON
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("text") => TransportMode::Text,
            _ => TransportMode::Json,
        }
    }
}

/// JSON frame sent to the client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Capability handshake, sent as soon as the socket is accepted
    #[serde(rename = "ready")]
    Ready { audio: AudioFormat, modes: Vec<String> },

    #[serde(rename = "session.started")]
    SessionStarted { session_id: String },

    #[serde(rename = "info")]
    Info { msg: String },

    #[serde(rename = "error")]
    Error {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<Value>,
    },

    #[serde(rename = "stt.partial")]
    SttPartial { text: String },

    #[serde(rename = "stt.final")]
    SttFinal { text: String },
}

/// Audio format the relay expects from the client
#[derive(Debug, Clone, Serialize)]
pub struct AudioFormat {
    pub encoding: String,
    pub sample_rate_hz: u32,
    pub channels: u16,
}

impl ClientMessage {
    pub fn ready() -> Self {
        ClientMessage::Ready {
            audio: AudioFormat {
                encoding: "pcm_s16le".to_string(),
                sample_rate_hz: 16000,
                channels: 1,
            },
            modes: vec!["json".to_string(), "text".to_string()],
        }
    }

    pub fn transcript(text: String, is_final: bool) -> Self {
        if is_final {
            ClientMessage::SttFinal { text }
        } else {
            ClientMessage::SttPartial { text }
        }
    }
}
