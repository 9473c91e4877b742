//! HTTP transport for the streaming Messages API.
//!
//! [`EventSource`] is the seam between the chunk pipeline and whatever
//! produces protocol events: in production that is [`HttpEventSource`]
//! (a reqwest SSE response), in tests a scripted mock.
//!
//! Exactly one connection is opened per request; dropping the source closes
//! it.

use std::future::Future;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::protocol::{ApiErrorBody, MessagesRequest, ServerEvent};
use crate::sse::SseDecoder;

/// API version header value sent with every request.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// An ordered source of protocol events for one request.
///
/// `next_event` is the single suspension point of the streaming pipeline:
/// it resolves with `Ok(Some(event))` for each recognized event,
/// `Ok(None)` when the remote closes the stream, or `Err` on a transport
/// or decode fault.
pub trait EventSource: Send + 'static {
    /// Read the next recognized event from the stream.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<ServerEvent>>> + Send;
}

/// Events decoded from a live `text/event-stream` HTTP response.
pub struct HttpEventSource {
    bytes: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
}

impl HttpEventSource {
    /// Open the streaming request and validate the response status.
    ///
    /// Non-success statuses are classified here (401 is an API key error,
    /// 429 a rate limit, the rest unknown) after a best-effort read of the
    /// error body for logging.
    pub async fn open(
        http: &reqwest::Client,
        config: &ClientConfig,
        body: &MessagesRequest,
    ) -> Result<Self> {
        let url = format!("{}/v1/messages", config.base_url());
        tracing::debug!(%url, model = %body.model, messages = body.messages.len(), "opening message stream");

        let response = http
            .post(&url)
            .header("x-api-key", config.api_key())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(Error::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let detail = ApiErrorBody::message_from(&raw);
            tracing::warn!(status = status.as_u16(), detail = detail.as_deref(), "request rejected");
            return Err(Error::from_status(status, detail));
        }

        Ok(Self {
            bytes: response.bytes_stream().boxed(),
            decoder: SseDecoder::new(),
        })
    }
}

impl EventSource for HttpEventSource {
    fn next_event(&mut self) -> impl Future<Output = Result<Option<ServerEvent>>> + Send {
        async move {
            loop {
                // Drain buffered records first; unrecognized event names
                // parse to None and are skipped.
                while let Some(record) = self.decoder.next_record() {
                    if let Some(event) = ServerEvent::parse(&record)? {
                        return Ok(Some(event));
                    }
                }

                match self.bytes.next().await {
                    Some(Ok(chunk)) => self.decoder.push(&chunk),
                    Some(Err(err)) => return Err(Error::from_transport(err)),
                    // End of data: any truncated trailing record is dropped.
                    None => return Ok(None),
                }
            }
        }
    }
}
