//! Conversation domain model.
//!
//! A [`Conversation`] is an append-only sequence of [`ChatMessage`]s with a
//! title derived from the first user message. Conversations are owned by the
//! UI-side controller during a session and persisted as whole snapshots by
//! [`crate::storage::ConversationStore`]; the on-disk field names are
//! camelCase to match the persisted JSON format.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a conversation before its first user message.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum length, in characters, of a derived conversation title.
pub const TITLE_MAX_CHARS: usize = 50;

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message typed by the user.
    User,
    /// A message generated by the model.
    Assistant,
}

/// One message in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ChatMessage {
    /// Create a user message timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: now_ms(),
        }
    }

    /// Create an assistant message timestamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: now_ms(),
        }
    }
}

/// A persisted conversation: id, derived title, and ordered messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Opaque unique id (a v4 UUID for conversations created here).
    pub id: String,
    /// Display title, derived from the first user message.
    pub title: String,
    /// Ordered message sequence, append-only during a session.
    pub messages: Vec<ChatMessage>,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Last modification time in milliseconds since the Unix epoch.
    pub updated_at: u64,
}

impl Conversation {
    /// Create a new, empty conversation with a fresh id.
    pub fn new() -> Self {
        let now = now_ms();
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a user message.
    ///
    /// The text is trimmed; empty input appends nothing and returns `false`.
    /// The first user message also sets the conversation title.
    pub fn push_user(&mut self, content: &str) -> bool {
        let text = content.trim();
        if text.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::user(text));
        if self.messages.len() == 1 {
            self.title = derive_title(text);
        }
        self.updated_at = now_ms();
        true
    }

    /// Append an assistant message.
    ///
    /// A stream can validly end with no text at all; such empty turns are
    /// not persisted. Returns `false` when nothing was appended.
    pub fn push_assistant(&mut self, content: String) -> bool {
        if content.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::assistant(content));
        self.updated_at = now_ms();
        true
    }

    /// Summary metadata for sidebar listings.
    pub fn meta(&self) -> ConversationMeta {
        ConversationMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.messages.len(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversation metadata without the message bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMeta {
    /// Conversation id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Last modification time in milliseconds since the Unix epoch.
    pub updated_at: u64,
    /// Number of messages in the conversation.
    pub message_count: usize,
}

/// Derive a conversation title from its first user message: trimmed and
/// truncated to [`TITLE_MAX_CHARS`] characters.
pub fn derive_title(text: &str) -> String {
    text.trim().chars().take(TITLE_MAX_CHARS).collect()
}

/// Current time in milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
