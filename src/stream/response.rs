//! Chunk stream implementation.
//!
//! This module provides [`ChunkStream`], which implements [`futures::Stream`]
//! to yield [`StreamChunk`]s from an in-flight request, and [`CancelSignal`],
//! the out-of-band cancellation handle shared with the owning client.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::sync::Notify;

use super::chunk::StreamChunk;
use crate::protocol::{ContentDelta, ServerEvent};
use crate::transport::EventSource;

/// Capacity of the channel between the reader task and the stream consumer.
pub(crate) const CHANNEL_CAPACITY: usize = 64;

/// Cancellation signal shared between a client and its in-flight request task.
///
/// `cancel` may be called from any context, any number of times, including
/// when nothing is in flight. The signal is one-shot per request: each
/// `send` gets a fresh signal.
#[derive(Debug, Default)]
pub struct CancelSignal {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // notify_one stores a permit when no task is waiting yet, so a
        // cancel that races with the reader registering its waiter is
        // never lost.
        self.notify.notify_one();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation has been requested.
    pub(crate) async fn cancelled(&self) {
        while !self.is_cancelled() {
            self.notify.notified().await;
        }
    }
}

/// A stream of [`StreamChunk`]s from one request.
///
/// Yields zero or more text chunks followed by exactly one terminal chunk,
/// in the order the remote produced them. The stream itself never yields
/// `Result`s: faults arrive as a terminal [`StreamChunk::Error`].
///
/// # Cancellation
///
/// Dropping a `ChunkStream` aborts the background reader task, which closes
/// the network connection. Out-of-band cancellation (keeping the stream
/// alive and receiving a final `Done`) goes through [`CancelSignal`].
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
///
/// let mut stream = client.send(&messages, None).await?;
/// while let Some(chunk) = stream.next().await {
///     match chunk {
///         StreamChunk::Text { text } => print!("{}", text),
///         StreamChunk::Done => break,
///         StreamChunk::Error { message } => { eprintln!("{}", message); break }
///     }
/// }
/// ```
#[derive(Debug)]
pub struct ChunkStream {
    rx: mpsc::Receiver<StreamChunk>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ChunkStream {
    /// Create a stream over an already-running reader task.
    pub(crate) fn from_parts(
        rx: mpsc::Receiver<StreamChunk>,
        task_handle: tokio::task::JoinHandle<()>,
    ) -> Self {
        Self {
            rx,
            task_handle: Some(task_handle),
        }
    }

    /// Stream chunks from an event source, without a cancellation handle.
    pub fn from_source<S: EventSource>(source: S) -> Self {
        Self::from_source_cancellable(source).0
    }

    /// Stream chunks from an event source, returning the cancellation
    /// handle alongside the stream.
    pub fn from_source_cancellable<S: EventSource>(source: S) -> (Self, Arc<CancelSignal>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = Arc::new(CancelSignal::default());
        let task_cancel = Arc::clone(&cancel);
        let task_handle = tokio::spawn(async move {
            read_loop(source, tx, task_cancel).await;
        });
        (Self::from_parts(rx, task_handle), cancel)
    }

    /// Collect every chunk until the stream ends.
    ///
    /// Convenience for consumers (and tests) that do not need incremental
    /// delivery.
    pub async fn collect_chunks(mut self) -> Vec<StreamChunk> {
        use futures::StreamExt;

        let mut chunks = Vec::new();
        while let Some(chunk) = self.next().await {
            chunks.push(chunk);
        }
        chunks
    }
}

impl Stream for ChunkStream {
    type Item = StreamChunk;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for ChunkStream {
    fn drop(&mut self) {
        // Abort the reader task; dropping its event source closes the
        // underlying connection.
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

/// Read events from the source and emit normalized chunks until the stream
/// ends, a fault occurs, or cancellation is observed.
///
/// Emits exactly one terminal chunk. The cancellation signal is consulted on
/// every received event; a cancel that races with a fault or with natural
/// completion resolves to a single `Done`.
pub(crate) async fn read_loop<S: EventSource>(
    mut source: S,
    tx: mpsc::Sender<StreamChunk>,
    cancel: Arc<CancelSignal>,
) {
    let mut fault = None;

    loop {
        if cancel.is_cancelled() {
            break;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = source.next_event() => match next {
                Ok(Some(event)) => match event {
                    ServerEvent::ContentBlockDelta {
                        delta: ContentDelta::TextDelta { text },
                        ..
                    } => {
                        // Forward deltas as received; no re-buffering or
                        // coalescing.
                        if tx.send(StreamChunk::text(text)).await.is_err() {
                            // Consumer dropped the stream; nothing left to
                            // deliver.
                            return;
                        }
                    }
                    ServerEvent::Error { error } => {
                        fault = Some(error.classify());
                        break;
                    }
                    _ => {}
                },
                // Server closed the stream after its own stop events.
                Ok(None) => break,
                Err(err) => {
                    fault = Some(err);
                    break;
                }
            }
        }
    }

    // Close the connection before signalling the terminal chunk.
    drop(source);

    let terminal = if cancel.is_cancelled() {
        StreamChunk::Done
    } else if let Some(err) = fault {
        tracing::warn!(error = %err, source = ?std::error::Error::source(&err), "stream failed");
        StreamChunk::error(err.to_string())
    } else {
        StreamChunk::Done
    };
    let _ = tx.send(terminal).await;
}
