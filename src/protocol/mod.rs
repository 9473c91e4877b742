//! Wire protocol types for the Messages API.
//!
//! This module defines the JSON types exchanged with the remote API:
//!
//! - [`MessagesRequest`] / [`ApiMessage`]: the outbound request body
//! - [`ServerEvent`] and friends: the typed streaming events parsed from
//!   SSE records
//! - [`ApiErrorBody`]: the error shape of non-success responses
//!
//! # Example
//!
//! ```
//! use claudechat::protocol::ServerEvent;
//! use claudechat::sse::SseRecord;
//!
//! let record = SseRecord {
//!     event: Some("content_block_delta".to_string()),
//!     data: r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#.to_string(),
//! };
//! let event = ServerEvent::parse(&record).unwrap().unwrap();
//! assert_eq!(event.text_delta(), Some("Hi"));
//! ```

mod events;
mod messages;

pub use events::{ContentBlockInfo, ContentDelta, ErrorInfo, MessageMeta, ServerEvent};
pub use messages::{ApiErrorBody, ApiErrorDetail, ApiMessage, MessagesRequest};
