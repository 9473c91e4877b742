//! Streaming response handling.
//!
//! This module turns the wire-level event stream into the normalized chunk
//! sequence consumers see:
//!
//! - [`StreamChunk`] - text fragment or terminal signal
//! - [`ChunkStream`] - an async stream of chunks from one request
//! - [`CancelSignal`] - the out-of-band cancellation handle
//!
//! # Contract
//!
//! Chunks arrive in the exact order the remote produced them: zero or more
//! `Text` chunks, then exactly one terminal chunk (`Done` or `Error`).
//! Cancellation terminates the sequence with `Done` (it is not an error),
//! and a cancel racing natural completion still produces a single terminal.
//!
//! # Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use claudechat::StreamChunk;
//!
//! let mut stream = client.send(&messages, None).await?;
//! while let Some(chunk) = stream.next().await {
//!     if let StreamChunk::Text { text } = &chunk {
//!         print!("{}", text);
//!     }
//!     if chunk.is_terminal() {
//!         break;
//!     }
//! }
//! ```

mod chunk;
mod response;

pub use chunk::StreamChunk;
pub use response::{CancelSignal, ChunkStream};

pub(crate) use response::{read_loop, CHANNEL_CAPACITY};
