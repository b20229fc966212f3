use serde_json::Value;

use crate::sse::SseFrame;

/// Typed run-lifecycle event interpreted from one feed frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStreamEvent {
    /// Incremental text to append to the open assistant message.
    Token { text: String },
    /// Authoritative final text; replaces accumulated content wholesale.
    Final { text: String, sources: Vec<String> },
    /// The run completed; the feed closes shortly after.
    Done,
    /// Auxiliary tool-invocation metadata, observability only.
    ToolStart {
        tool: Option<String>,
        input: Option<Value>,
    },
    ToolEnd {
        tool: Option<String>,
        output: Option<Value>,
    },
}

impl RunStreamEvent {
    /// True when this event terminates the run lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Interpret one decoded frame as a run-lifecycle event.
///
/// The frame data parses as JSON; a malformed payload degrades to a null
/// payload and field defaults rather than an error. Unknown event names
/// (the backend's transient `error` frame included) return `None` and are
/// skipped by callers.
pub fn interpret_frame(frame: &SseFrame) -> Option<RunStreamEvent> {
    let payload = serde_json::from_str::<Value>(&frame.data).ok();
    let payload = payload.as_ref();

    match frame.event.as_str() {
        "token" => Some(RunStreamEvent::Token {
            text: text_field(payload),
        }),
        "final" => Some(RunStreamEvent::Final {
            text: text_field(payload),
            sources: sources_field(payload),
        }),
        "done" => Some(RunStreamEvent::Done),
        "tool_start" => Some(RunStreamEvent::ToolStart {
            tool: tool_field(payload),
            input: payload_field(payload, "input"),
        }),
        "tool_end" => Some(RunStreamEvent::ToolEnd {
            tool: tool_field(payload),
            output: payload_field(payload, "output"),
        }),
        _ => None,
    }
}

fn text_field(payload: Option<&Value>) -> String {
    payload
        .and_then(|value| value.get("text"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned()
}

fn sources_field(payload: Option<&Value>) -> Vec<String> {
    payload
        .and_then(|value| value.get("sources"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn tool_field(payload: Option<&Value>) -> Option<String> {
    payload
        .and_then(|value| value.get("tool"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn payload_field(payload: Option<&Value>, field: &str) -> Option<Value> {
    payload.and_then(|value| value.get(field)).cloned()
}

#[cfg(test)]
mod tests {
    use crate::sse::SseFrame;

    use super::{interpret_frame, RunStreamEvent};

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn token_frame_carries_text() {
        let event = interpret_frame(&frame("token", r#"{"text":"ab"}"#));
        assert_eq!(
            event,
            Some(RunStreamEvent::Token {
                text: "ab".to_string(),
            })
        );
    }

    #[test]
    fn malformed_payload_degrades_to_empty_text() {
        let event = interpret_frame(&frame("token", "{not json"));
        assert_eq!(
            event,
            Some(RunStreamEvent::Token {
                text: String::new(),
            })
        );
    }

    #[test]
    fn unknown_event_names_are_skipped() {
        assert_eq!(interpret_frame(&frame("error", r#"{"error":"gone"}"#)), None);
        assert_eq!(interpret_frame(&frame("", "")), None);
    }
}
