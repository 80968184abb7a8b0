use crate::realtime::ServerEvent;
use serde_json::Value;

/// A raw upstream event reduced to what the client needs to see
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    /// Session-configuration acknowledgement; forwarded as a status notice
    Info { kind: String },

    /// Protocol error from the service, detail carried through verbatim
    Error { detail: Value },

    /// New transcript state: the full text, the newly-added suffix, and
    /// whether the service considers this utterance complete
    Transcript {
        text: String,
        delta: String,
        is_final: bool,
    },
}

/// Normalize one raw event against the previously forwarded transcript.
///
/// Returns `None` when the event carries nothing worth forwarding: an
/// unrecognized shape, an empty transcript, or a transcript identical to
/// `previous` (which would produce a no-op message on every poll tick).
/// Callers replace their previous transcript with `text` whenever a
/// `Transcript` is returned.
pub fn normalize(event: &ServerEvent, previous: &str) -> Option<NormalizedEvent> {
    if event.kind == "error" {
        return Some(NormalizedEvent::Error {
            detail: event.error.clone().unwrap_or(Value::Null),
        });
    }

    if matches!(
        event.kind.as_str(),
        "session.created" | "session.updated" | "transcription_session.updated"
    ) {
        return Some(NormalizedEvent::Info {
            kind: event.kind.clone(),
        });
    }

    let (text, is_final) = extract_transcript(event, previous)?;

    // A transcript that extends the previous one yields just the new
    // suffix; a correction or restart supersedes it entirely
    let delta = match text.strip_prefix(previous) {
        Some(suffix) => suffix.to_string(),
        None => text.clone(),
    };

    if delta.is_empty() {
        return None;
    }

    Some(NormalizedEvent::Transcript {
        text,
        delta,
        is_final,
    })
}

/// Best-effort absolute transcript for the event, across the shapes the
/// service emits. Delta-only events accumulate onto `previous`.
fn extract_transcript(event: &ServerEvent, previous: &str) -> Option<(String, bool)> {
    match event.kind.as_str() {
        "conversation.item.input_audio_transcription.completed" => {
            non_empty(event.transcript.as_deref()).map(|t| (t.to_string(), true))
        }
        "response.audio_transcript.done" => {
            non_empty(event.transcript.as_deref()).map(|t| (t.to_string(), true))
        }
        "response.text.done" => non_empty(event.text.as_deref()).map(|t| (t.to_string(), true)),
        "conversation.item.input_audio_transcription.delta"
        | "response.audio_transcript.delta"
        | "response.text.delta" => {
            let delta = non_empty(event.delta.as_deref())?;
            Some((format!("{}{}", previous, delta), false))
        }
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
