//! Streaming event types from the Messages API.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sse::SseRecord;

/// Event names this client recognizes. Records with any other name are
/// ignored without error.
const RECOGNIZED_EVENTS: [&str; 6] = [
    "message_start",
    "content_block_start",
    "content_block_delta",
    "content_block_stop",
    "message_stop",
    "error",
];

/// A typed streaming event from the Messages API.
///
/// These mirror the `data:` payloads of the recognized SSE records. The
/// payload's own `type` field always matches the record's event name, so a
/// single tagged enum covers both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Start of a new assistant message.
    MessageStart {
        /// Metadata about the message being started.
        message: MessageMeta,
    },
    /// Start of a content block.
    ContentBlockStart {
        /// Index of this block in the message.
        index: usize,
        /// The content block being started.
        content_block: ContentBlockInfo,
    },
    /// Delta update to a content block.
    ContentBlockDelta {
        /// Index of the block being updated.
        index: usize,
        /// The delta update.
        delta: ContentDelta,
    },
    /// End of a content block.
    ContentBlockStop {
        /// Index of the completed block.
        index: usize,
    },
    /// End of the message.
    MessageStop,
    /// In-band error from the remote (e.g., overloaded).
    Error {
        /// Error details.
        error: ErrorInfo,
    },
}

/// Metadata at the start of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Message ID.
    pub id: String,
    /// Model producing the response.
    pub model: String,
    /// Role (always "assistant").
    #[serde(default)]
    pub role: String,
}

/// Information about a content block being started.
///
/// Only text blocks carry meaning for this client; other block kinds
/// (tool use, thinking) fold into `Other` and produce no chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockInfo {
    /// Text block starting.
    Text {
        /// Initial text (usually empty).
        #[serde(default)]
        text: String,
    },
    /// Any block kind this client does not act on.
    #[serde(other)]
    Other,
}

/// A delta update to a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDelta {
    /// Text delta, the only delta kind that produces chunks.
    TextDelta {
        /// The text fragment.
        text: String,
    },
    /// Any delta kind this client does not act on.
    #[serde(other)]
    Other,
}

/// Error information carried by an in-band `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error type reported by the remote (e.g., "overloaded_error").
    #[serde(rename = "type")]
    pub kind: String,
    /// Error message.
    pub message: String,
}

impl ErrorInfo {
    /// Classify an in-band error event into the fault taxonomy, by the
    /// remote's error type string.
    pub fn classify(&self) -> Error {
        match self.kind.as_str() {
            "authentication_error" | "permission_error" => Error::ApiKey,
            "rate_limit_error" => Error::RateLimit,
            _ => Error::Unknown {
                detail: format!("{}: {}", self.kind, self.message),
            },
        }
    }
}

impl ServerEvent {
    /// Parse a framed SSE record into a typed event.
    ///
    /// Returns `Ok(None)` for records whose event name is not in the
    /// recognized set. Malformed JSON in a recognized record is a decode
    /// fault, not a silent drop; the caller decides whether to abort.
    pub fn parse(record: &SseRecord) -> Result<Option<Self>> {
        let Some(name) = record.event.as_deref() else {
            return Ok(None);
        };
        if !RECOGNIZED_EVENTS.contains(&name) {
            return Ok(None);
        }
        serde_json::from_str(&record.data)
            .map(Some)
            .map_err(|e| Error::decode(name, &record.data, e))
    }

    /// Check if this is a text delta event.
    pub fn is_text_delta(&self) -> bool {
        self.text_delta().is_some()
    }

    /// Extract text from a text delta event.
    pub fn text_delta(&self) -> Option<&str> {
        match self {
            ServerEvent::ContentBlockDelta {
                delta: ContentDelta::TextDelta { text },
                ..
            } => Some(text),
            _ => None,
        }
    }

    /// Check if this is the end of the message.
    pub fn is_message_stop(&self) -> bool {
        matches!(self, ServerEvent::MessageStop)
    }
}
