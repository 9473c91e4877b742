//! # claudechat
//!
//! Async backend core for a desktop Claude chat client.
//!
//! This crate implements everything between the chat UI and the Anthropic
//! Messages API:
//!
//! - Streaming responses over SSE with token-by-token delivery
//! - Out-of-band cancellation of the in-flight request
//! - A closed error taxonomy with stable user-facing messages
//! - A relay that carries chunks across the backend/UI boundary
//! - JSON-file conversation storage and API key management
//!
//! ## Quick Start
//!
//! ```ignore
//! use claudechat::{ChatClient, ChatMessage, ClientConfig, StreamChunk};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> claudechat::Result<()> {
//!     let config = ClientConfig::builder().api_key("sk-ant-...").build()?;
//!     let client = ChatClient::new(config);
//!
//!     let history = vec![ChatMessage::user("What is 2+2?")];
//!     let mut stream = client.send(&history, None).await?;
//!     while let Some(chunk) = stream.next().await {
//!         match chunk {
//!             StreamChunk::Text { text } => print!("{}", text),
//!             StreamChunk::Done => break,
//!             StreamChunk::Error { message } => {
//!                 eprintln!("stream failed: {}", message);
//!                 break;
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Stopping generation
//!
//! ```ignore
//! // From a different task or callback:
//! client.cancel();
//! // The in-flight stream finishes with StreamChunk::Done, not an error.
//! ```
//!
//! ## Full application wiring
//!
//! ```ignore
//! use claudechat::{ChatService, ConfigStore, ConversationStore};
//!
//! let service = ChatService::new(ConfigStore::default(), ConversationStore::default());
//! let mut ui_chunks = service.attach_ui();
//! // Hand `service` to the window layer; it calls send_message /
//! // stop_generation / conversation CRUD, and renders from `ui_chunks`.
//! ```

mod client;
pub mod config;
pub mod conversation;
mod error;
pub mod protocol;
mod relay;
mod service;
pub mod sse;
pub mod storage;
pub mod stream;
mod transport;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::ChatClient;
pub use service::{ChatService, SendMessageRequest};

// Re-export commonly used config types at crate root
pub use config::{ApiKeyStatus, ClientConfig, ClientConfigBuilder, ConfigStore};

// Re-export the conversation model and its store at crate root
pub use conversation::{ChatMessage, Conversation, ConversationMeta, Role};
pub use storage::ConversationStore;

// Re-export commonly used streaming types at crate root
pub use relay::ChunkRelay;
pub use stream::{CancelSignal, ChunkStream, StreamChunk};
pub use transport::{EventSource, HttpEventSource};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}
    fn assert_send<T: Send>() {}

    /// All major public types must be Send + Sync for use across async tasks.
    #[test]
    fn public_types_are_send_sync() {
        // Client and service
        assert_send_sync::<ChatClient>();
        assert_send_sync::<ChatService>();
        assert_send_sync::<SendMessageRequest>();

        // Configuration types
        assert_send_sync::<ClientConfig>();
        assert_send_sync::<ClientConfigBuilder>();
        assert_send_sync::<ConfigStore>();
        assert_send_sync::<ApiKeyStatus>();
        assert_send_sync::<ConversationStore>();

        // Domain types
        assert_send_sync::<ChatMessage>();
        assert_send_sync::<Conversation>();
        assert_send_sync::<ConversationMeta>();
        assert_send_sync::<Role>();

        // Streaming types
        assert_send_sync::<StreamChunk>();
        assert_send_sync::<CancelSignal>();
        assert_send_sync::<ChunkRelay>();

        // Error type
        assert_send_sync::<Error>();
    }

    /// Streams are moved into a consuming task; Send is what matters.
    #[test]
    fn stream_types_are_send() {
        assert_send::<ChunkStream>();
        assert_send::<HttpEventSource>();
    }
}
