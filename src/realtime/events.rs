use serde::{Deserialize, Serialize};

/// Outbound protocol event sent to the realtime service
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Append one base64-encoded audio chunk to the remote input buffer
    #[serde(rename = "input_audio_buffer.append")]
    AppendAudio { audio: String },

    /// Ask the service to process everything appended since the last commit
    #[serde(rename = "input_audio_buffer.commit")]
    CommitBuffer,

    /// Configure how the service should respond to committed audio
    #[serde(rename = "response.create")]
    CreateResponse { response: ResponseSpec },
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseSpec {
    pub modalities: Vec<String>,
    pub instructions: String,
}

impl ClientEvent {
    /// Initial control event requesting text-only transcription in the
    /// configured language
    pub fn transcription_request(language: &str) -> Self {
        ClientEvent::CreateResponse {
            response: ResponseSpec {
                modalities: vec!["text".to_string()],
                instructions: format!("Transcribe in {}", language),
            },
        }
    }
}

/// Inbound event from the realtime service.
///
/// The service emits many event shapes; this struct keeps the discriminant
/// plus the handful of payload fields the relay reads, and tolerates
/// everything else. Unknown shapes simply deserialize with all payload
/// fields absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerEvent {
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Absolute transcript (completed-transcription events)
    #[serde(default)]
    pub transcript: Option<String>,

    /// Incremental transcript suffix (delta events)
    #[serde(default)]
    pub delta: Option<String>,

    /// Completed output text (response.text.done)
    #[serde(default)]
    pub text: Option<String>,

    /// Provider error payload, carried through verbatim
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}
