//! Server-sent event record framing.
//!
//! The Messages API streams its response as `text/event-stream`:
//!
//! ```text
//! event: content_block_delta
//! data: {"type":"content_block_delta","index":0,"delta":{...}}
//!
//! ```
//!
//! [`SseDecoder`] turns an arbitrary sequence of byte chunks into complete
//! [`SseRecord`]s. Network reads can split a record anywhere, even inside
//! a UTF-8 sequence, so bytes are buffered until a blank-line record
//! boundary has been seen. The decoder is stateless across requests: one
//! decoder per stream.
//!
//! Framing only. Interpreting a record's event name and JSON payload is the
//! protocol layer's job ([`crate::protocol::ServerEvent::parse`]).

/// A complete server-sent event record: an optional event name and the
/// payload assembled from its `data:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseRecord {
    /// The SSE event type (e.g., "content_block_delta"), if present.
    pub event: Option<String>,
    /// The data payload. Multiple `data:` lines are joined with newlines.
    pub data: String,
}

/// Incremental decoder from raw bytes to [`SseRecord`]s.
///
/// Feed network chunks with [`push`](Self::push) and drain completed records
/// with [`next_record`](Self::next_record). Bytes after the last complete
/// record stay buffered until the rest of the record arrives; a truncated
/// trailing record at end-of-stream is never yielded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Create a new decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the transport.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete record, if one is buffered.
    ///
    /// Records containing only comments or blank lines are skipped.
    pub fn next_record(&mut self) -> Option<SseRecord> {
        loop {
            let (end, skip) = find_record_boundary(&self.buf)?;
            let raw: Vec<u8> = self.buf.drain(..end + skip).collect();
            // The boundary is ASCII, so a record always holds whole UTF-8
            // sequences; lossy conversion only matters for invalid input.
            let text = String::from_utf8_lossy(&raw[..end]);
            if let Some(record) = parse_record(&text) {
                return Some(record);
            }
        }
    }

    /// Number of bytes currently buffered (incomplete trailing record).
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

/// Find the first record boundary (blank line) in `buf`.
///
/// Returns `(record_end, separator_len)` where the record occupies
/// `buf[..record_end]`. Handles both `\n\n` and `\r\n\r\n` framing.
fn find_record_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == b'\n' {
            if buf.get(i + 1) == Some(&b'\n') {
                return Some((i, 2));
            }
            if buf.get(i + 1) == Some(&b'\r') && buf.get(i + 2) == Some(&b'\n') {
                return Some((i, 3));
            }
        }
        i += 1;
    }
    None
}

/// Parse the lines of one record into an [`SseRecord`].
///
/// Per the SSE format: `:` lines are comments, an optional single space
/// after the field colon is stripped, unknown field names (`id:`, `retry:`)
/// are ignored. Returns `None` for records with no event name and no data.
fn parse_record(raw: &str) -> Option<SseRecord> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(name) = line.strip_prefix("event:") {
            event = Some(name.strip_prefix(' ').unwrap_or(name).to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }
    Some(SseRecord {
        event,
        data: data.join("\n"),
    })
}
