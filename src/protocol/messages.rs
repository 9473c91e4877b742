//! Request and error body types for the Messages API.

use serde::{Deserialize, Serialize};

use crate::conversation::{ChatMessage, Role};

/// Request body for `POST /v1/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    /// Model identifier.
    pub model: String,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Ordered message history.
    pub messages: Vec<ApiMessage>,
    /// Always true: this client only speaks the streaming protocol.
    pub stream: bool,
}

impl MessagesRequest {
    /// Build a streaming request from a message history snapshot.
    pub fn new(model: impl Into<String>, max_tokens: u32, messages: &[ChatMessage]) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages: messages.iter().map(ApiMessage::from).collect(),
            stream: true,
        }
    }
}

/// One message as the wire protocol sees it: role and content only,
/// no local timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl From<&ChatMessage> for ApiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Error body returned on non-success responses:
/// `{"type":"error","error":{"type":"...","message":"..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// The nested error detail.
    pub error: ApiErrorDetail,
}

/// Detail of an API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type (e.g., "authentication_error").
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable message from the remote.
    pub message: String,
}

impl ApiErrorBody {
    /// Best-effort extraction of the error message from a response body.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .map(|parsed| parsed.error.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let messages = vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there"),
            ChatMessage::user("how are you?"),
        ];
        let request = MessagesRequest::new("claude-sonnet-4-5-20250929", 4096, &messages);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"].as_array().unwrap().len(), 3);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["messages"][1]["role"], "assistant");
        // Local timestamps never cross the wire.
        assert!(json["messages"][0].get("timestamp").is_none());
    }

    #[test]
    fn api_message_from_chat_message() {
        let msg = ChatMessage::assistant("answer");
        let api = ApiMessage::from(&msg);
        assert_eq!(api.role, Role::Assistant);
        assert_eq!(api.content, "answer");
    }

    #[test]
    fn error_body_message_extraction() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(
            ApiErrorBody::message_from(body),
            Some("invalid x-api-key".to_string())
        );
    }

    #[test]
    fn error_body_extraction_tolerates_garbage() {
        assert_eq!(ApiErrorBody::message_from("<html>502</html>"), None);
        assert_eq!(ApiErrorBody::message_from(""), None);
    }
}
