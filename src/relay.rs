//! Cross-boundary chunk relay.
//!
//! The streaming backend and the UI rendering context live on different
//! sides of a process/thread boundary. [`ChunkRelay`] carries each
//! [`StreamChunk`] across it, in production order, to whichever UI surface
//! is currently attached.
//!
//! Delivery is best-effort: with no surface attached, chunks are dropped.
//! A human is the ultimate consumer and a dropped partial stream is
//! recoverable by resending, so there is no buffering or backpressure.
//! Because the client upstream is single-flight, chunks from two requests
//! never interleave on one surface.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::stream::StreamChunk;

/// Forwards stream chunks to the attached UI surface.
#[derive(Debug, Default)]
pub struct ChunkRelay {
    surface: Mutex<Option<mpsc::UnboundedSender<StreamChunk>>>,
}

impl ChunkRelay {
    /// Create a relay with no surface attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a UI surface, replacing any previous one.
    ///
    /// Returns the receiving end for the UI to consume. The previous
    /// surface, if any, stops receiving chunks immediately.
    pub fn attach(&self) -> mpsc::UnboundedReceiver<StreamChunk> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.surface.lock().expect("relay lock poisoned") = Some(tx);
        rx
    }

    /// Detach the current surface, if any.
    pub fn detach(&self) {
        self.surface.lock().expect("relay lock poisoned").take();
    }

    /// Whether a live surface is attached.
    pub fn is_attached(&self) -> bool {
        self.surface
            .lock()
            .expect("relay lock poisoned")
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Forward one chunk to the attached surface, best-effort.
    ///
    /// A surface whose receiver has been dropped is detached on the first
    /// failed send; subsequent chunks are dropped silently.
    pub fn forward(&self, chunk: StreamChunk) {
        let mut surface = self.surface.lock().expect("relay lock poisoned");
        if let Some(tx) = surface.as_ref() {
            if tx.send(chunk).is_err() {
                tracing::debug!("UI surface went away; dropping stream chunks");
                surface.take();
            }
        }
    }
}
