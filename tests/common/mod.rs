//! Test utilities for claudechat integration tests.

use std::collections::VecDeque;
use std::future::Future;

use claudechat::protocol::{ContentBlockInfo, ContentDelta, ErrorInfo, MessageMeta, ServerEvent};
use claudechat::{Error, EventSource, Result};

/// One scripted step of a mock event source.
pub enum SourceStep {
    /// Yield a protocol event.
    Event(ServerEvent),
    /// Fail with a classified error.
    Fault(Error),
    /// Never resolve; only cancellation (or dropping the stream) ends it.
    Hang,
}

/// A mock event source that replays pre-defined steps.
///
/// Steps are consumed in order; after the last one, `Ok(None)` is returned
/// to signal end of stream.
pub struct MockSource {
    steps: VecDeque<SourceStep>,
}

impl MockSource {
    /// Create a mock source from explicit steps.
    pub fn new(steps: Vec<SourceStep>) -> Self {
        Self {
            steps: steps.into(),
        }
    }
}

impl EventSource for MockSource {
    fn next_event(&mut self) -> impl Future<Output = Result<Option<ServerEvent>>> + Send {
        async move {
            match self.steps.pop_front() {
                Some(SourceStep::Event(event)) => Ok(Some(event)),
                Some(SourceStep::Fault(err)) => Err(err),
                Some(SourceStep::Hang) => {
                    futures::future::pending::<()>().await;
                    unreachable!("pending future resolved")
                }
                None => Ok(None),
            }
        }
    }
}

/// Builder for realistic event sequences.
pub struct ScenarioBuilder {
    steps: Vec<SourceStep>,
}

impl ScenarioBuilder {
    /// Create an empty scenario.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a message_start event.
    pub fn message_start(mut self) -> Self {
        self.steps
            .push(SourceStep::Event(ServerEvent::MessageStart {
                message: MessageMeta {
                    id: "msg_test_123".to_string(),
                    model: "claude-sonnet-4-5-20250929".to_string(),
                    role: "assistant".to_string(),
                },
            }));
        self
    }

    /// Add a single text delta.
    pub fn text_delta(mut self, text: &str) -> Self {
        self.steps
            .push(SourceStep::Event(ServerEvent::ContentBlockDelta {
                index: 0,
                delta: ContentDelta::TextDelta {
                    text: text.to_string(),
                },
            }));
        self
    }

    /// Add a full text content block: start, chunked deltas (respecting
    /// UTF-8 boundaries), stop.
    pub fn text_block(mut self, text: &str) -> Self {
        self.steps
            .push(SourceStep::Event(ServerEvent::ContentBlockStart {
                index: 0,
                content_block: ContentBlockInfo::Text {
                    text: String::new(),
                },
            }));

        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(10) {
            let chunk_text: String = chunk.iter().collect();
            self = self.text_delta(&chunk_text);
        }

        self.steps
            .push(SourceStep::Event(ServerEvent::ContentBlockStop { index: 0 }));
        self
    }

    /// Add a message_stop event.
    pub fn message_stop(mut self) -> Self {
        self.steps.push(SourceStep::Event(ServerEvent::MessageStop));
        self
    }

    /// Add a complete text response: message_start, one text block,
    /// message_stop.
    pub fn text_response(self, text: &str) -> Self {
        self.message_start().text_block(text).message_stop()
    }

    /// Add an in-band error event.
    pub fn error_event(mut self, kind: &str, message: &str) -> Self {
        self.steps.push(SourceStep::Event(ServerEvent::Error {
            error: ErrorInfo {
                kind: kind.to_string(),
                message: message.to_string(),
            },
        }));
        self
    }

    /// Add a transport/decode fault.
    pub fn fault(mut self, err: Error) -> Self {
        self.steps.push(SourceStep::Fault(err));
        self
    }

    /// Add a step that never resolves.
    pub fn hang(mut self) -> Self {
        self.steps.push(SourceStep::Hang);
        self
    }

    /// Build the mock source.
    pub fn build(self) -> MockSource {
        MockSource::new(self.steps)
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}
