//! Streaming API client.
//!
//! This module provides [`ChatClient`], which owns at most one in-flight
//! streaming request at a time and exposes out-of-band cancellation.
//!
//! # Single-flight
//!
//! Requests are serialized: a second [`send`](ChatClient::send) on the same
//! client only begins once the previous request has emitted its terminal
//! chunk. Chunk sequences from two requests therefore never interleave on
//! the surface this client feeds.
//!
//! # Example
//!
//! ```ignore
//! use claudechat::{ChatClient, ChatMessage, ClientConfig, StreamChunk};
//! use futures::StreamExt;
//!
//! let config = ClientConfig::builder().api_key("sk-ant-...").build()?;
//! let client = ChatClient::new(config);
//!
//! let history = vec![ChatMessage::user("Hello!")];
//! let mut stream = client.send(&history, None).await?;
//! while let Some(chunk) = stream.next().await {
//!     if let StreamChunk::Text { text } = &chunk {
//!         print!("{}", text);
//!     }
//! }
//! ```

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;

use crate::config::ClientConfig;
use crate::conversation::ChatMessage;
use crate::error::{Error, Result};
use crate::protocol::MessagesRequest;
use crate::stream::{read_loop, CancelSignal, ChunkStream, StreamChunk, CHANNEL_CAPACITY};
use crate::transport::HttpEventSource;

/// A client for streaming chat completions from the Messages API.
///
/// The client holds the one piece of shared mutable state in the streaming
/// core: the cancellation handle of the current in-flight request. The
/// handle is installed when a request starts and cleared when it ends
/// (success, error, or cancel); both [`cancel`](Self::cancel) and the
/// clearing step tolerate an empty slot.
pub struct ChatClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    /// Cancellation handle of the in-flight request, if any.
    cancel_slot: Arc<Mutex<Option<Arc<CancelSignal>>>>,
    /// Serializes requests; the owned guard is held by the request task
    /// until its terminal chunk has been emitted.
    send_lock: Arc<AsyncMutex<()>>,
}

impl ChatClient {
    /// Create a client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            cancel_slot: Arc::new(Mutex::new(None)),
            send_lock: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Send a message history and stream back the response.
    ///
    /// `max_tokens` falls back to the configured default when `None`.
    ///
    /// The returned stream yields chunks in arrival order: zero or more
    /// text chunks, then exactly one terminal chunk. All transport and
    /// protocol faults surface as a terminal error chunk, not as an `Err`
    /// from this method; `Err` is returned only for requests rejected
    /// before any network activity (empty history, invalid `max_tokens`).
    ///
    /// If a request is already in flight, the new one waits for its
    /// terminal chunk before starting.
    pub async fn send(
        &self,
        messages: &[ChatMessage],
        max_tokens: Option<u32>,
    ) -> Result<ChunkStream> {
        if messages.is_empty() {
            return Err(Error::invalid_request("message history must not be empty"));
        }
        let max_tokens = max_tokens.unwrap_or(self.config.max_tokens());
        if max_tokens == 0 {
            return Err(Error::invalid_request("max_tokens must be positive"));
        }

        tracing::debug!(
            messages = messages.len(),
            max_tokens,
            "queueing streaming request"
        );

        // Serialize requests. The owned guard moves into the request task
        // and is released only after the terminal chunk.
        let guard = Arc::clone(&self.send_lock).lock_owned().await;

        let cancel = Arc::new(CancelSignal::default());
        *self
            .cancel_slot
            .lock()
            .expect("cancel slot lock poisoned") = Some(Arc::clone(&cancel));

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let http = self.http.clone();
        let config = Arc::clone(&self.config);
        let body = MessagesRequest::new(config.model(), max_tokens, messages);
        let reset = SlotReset {
            slot: Arc::clone(&self.cancel_slot),
            signal: Arc::clone(&cancel),
        };

        let handle = tokio::spawn(async move {
            let _reset = reset;
            run_request(http, config, body, tx, cancel).await;
            drop(guard);
        });

        Ok(ChunkStream::from_parts(rx, handle))
    }

    /// Cancel the in-flight request, if any.
    ///
    /// Idempotent and callable from any context. The in-flight stream then
    /// terminates with a single `Done` chunk; cancellation is never
    /// reported as an error. With nothing in flight this is a no-op.
    pub fn cancel(&self) {
        let slot = self.cancel_slot.lock().expect("cancel slot lock poisoned");
        if let Some(signal) = slot.as_ref() {
            tracing::debug!("cancelling in-flight request");
            signal.cancel();
        }
    }

    /// Whether a request is currently in flight.
    pub fn is_streaming(&self) -> bool {
        self.cancel_slot
            .lock()
            .expect("cancel slot lock poisoned")
            .is_some()
    }

    /// Get a reference to the client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Clears the client's cancel slot when its request ends, including when
/// the consumer drops the stream mid-flight and the task is aborted. Only
/// removes its own handle: a newer request's handle is left in place.
struct SlotReset {
    slot: Arc<Mutex<Option<Arc<CancelSignal>>>>,
    signal: Arc<CancelSignal>,
}

impl Drop for SlotReset {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().expect("cancel slot lock poisoned");
        if slot
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &self.signal))
        {
            slot.take();
        }
    }
}

/// Open the connection and pump it through the chunk pipeline.
///
/// Pre-response faults are classified and emitted as the terminal chunk
/// here; once the stream is open, `read_loop` owns the contract. A cancel
/// observed at any point wins over a fault and terminates with `Done`.
async fn run_request(
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    body: MessagesRequest,
    tx: mpsc::Sender<StreamChunk>,
    cancel: Arc<CancelSignal>,
) {
    let source = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            let _ = tx.send(StreamChunk::Done).await;
            return;
        }
        opened = HttpEventSource::open(&http, &config, &body) => match opened {
            Ok(source) => source,
            Err(err) => {
                let terminal = if cancel.is_cancelled() {
                    StreamChunk::Done
                } else {
                    tracing::warn!(error = %err, "failed to open message stream");
                    StreamChunk::error(err.to_string())
                };
                let _ = tx.send(terminal).await;
                return;
            }
        }
    };

    read_loop(source, tx, cancel).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ChatClient {
        let config = ClientConfig::builder()
            .api_key("test-key")
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        ChatClient::new(config)
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatClient>();
    }

    #[tokio::test]
    async fn empty_history_is_rejected_before_any_network_call() {
        let client = test_client();
        let err = client.send(&[], None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn zero_max_tokens_is_rejected() {
        let client = test_client();
        let history = vec![ChatMessage::user("hi")];
        let err = client.send(&history, Some(0)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn cancel_with_nothing_in_flight_is_a_no_op() {
        let client = test_client();
        assert!(!client.is_streaming());
        client.cancel();
        client.cancel();
        assert!(!client.is_streaming());
    }

    #[tokio::test]
    async fn cancel_before_any_response_yields_done_only() {
        // Port 9 (discard) is unroutable-fast or refuses; either way the
        // cancel lands first because it is issued before polling the stream.
        let client = test_client();
        let history = vec![ChatMessage::user("hi")];
        let stream = client.send(&history, None).await.unwrap();
        client.cancel();
        let chunks = stream.collect_chunks().await;
        assert_eq!(chunks, vec![StreamChunk::Done]);
    }

    #[tokio::test]
    async fn slot_is_cleared_after_the_stream_ends() {
        let client = test_client();
        let history = vec![ChatMessage::user("hi")];
        let stream = client.send(&history, None).await.unwrap();
        client.cancel();
        let _ = stream.collect_chunks().await;
        assert!(!client.is_streaming());
    }
}
