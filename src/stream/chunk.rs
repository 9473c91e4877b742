//! The normalized stream chunk delivered to consumers.
//!
//! Contract:
//! - A request produces zero or more [`StreamChunk::Text`] chunks followed by
//!   exactly one terminal chunk ([`StreamChunk::Done`] or
//!   [`StreamChunk::Error`]).
//! - After the terminal chunk, no further chunks are produced.
//! - Cancellation terminates with `Done`, never `Error`.

use serde::{Deserialize, Serialize};

/// One unit of a streamed response.
///
/// The serialized shape (`{"type": "text", "text": ...}` /
/// `{"type": "done"}` / `{"type": "error", "error": ...}`) is the format
/// relayed verbatim to the UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// A text fragment, forwarded with the granularity the remote produced.
    Text {
        /// The fragment.
        text: String,
    },
    /// Terminal: the stream completed (naturally or by cancellation).
    Done,
    /// Terminal: the stream failed. Carries only a classified message
    /// string; no fault objects cross the boundary.
    Error {
        /// Human-readable classified message.
        #[serde(rename = "error")]
        message: String,
    },
}

impl StreamChunk {
    /// Create a text chunk.
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    /// Create an error chunk.
    pub fn error(message: impl Into<String>) -> Self {
        StreamChunk::Error {
            message: message.into(),
        }
    }

    /// Returns true if this chunk terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamChunk::Done | StreamChunk::Error { .. })
    }

    /// Convenience accessor for text contents.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let text = StreamChunk::text("hi");
        assert!(!text.is_terminal());
        assert_eq!(text.as_text(), Some("hi"));

        assert!(StreamChunk::Done.is_terminal());
        assert_eq!(StreamChunk::Done.as_text(), None);

        let err = StreamChunk::error("Network error");
        assert!(err.is_terminal());
        assert_eq!(err.as_text(), None);
    }

    #[test]
    fn serialized_shape_matches_the_relay_format() {
        assert_eq!(
            serde_json::to_string(&StreamChunk::text("Hi")).unwrap(),
            r#"{"type":"text","text":"Hi"}"#
        );
        assert_eq!(
            serde_json::to_string(&StreamChunk::Done).unwrap(),
            r#"{"type":"done"}"#
        );
        assert_eq!(
            serde_json::to_string(&StreamChunk::error("boom")).unwrap(),
            r#"{"type":"error","error":"boom"}"#
        );
    }

    #[test]
    fn deserializes_from_the_relay_format() {
        let chunk: StreamChunk = serde_json::from_str(r#"{"type":"text","text":"Hi"}"#).unwrap();
        assert_eq!(chunk, StreamChunk::text("Hi"));
        let chunk: StreamChunk = serde_json::from_str(r#"{"type":"done"}"#).unwrap();
        assert_eq!(chunk, StreamChunk::Done);
    }
}
