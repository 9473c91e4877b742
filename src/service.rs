//! The boundary API consumed by the UI layer.
//!
//! [`ChatService`] wires the pieces together: it owns the (optional)
//! [`ChatClient`], the conversation and config stores, and the
//! [`ChunkRelay`] the UI listens on. The method set mirrors what a desktop
//! front end needs: send/stop for generation, credential status/update, and
//! conversation CRUD.
//!
//! The client exists only while a usable API key is configured; setting a
//! new key re-creates it.

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::client::ChatClient;
use crate::config::{ApiKeyStatus, ClientConfig, ConfigStore};
use crate::conversation::{ChatMessage, Conversation, ConversationMeta};
use crate::error::{Error, Result};
use crate::relay::ChunkRelay;
use crate::storage::ConversationStore;

/// A request to generate the next assistant turn.
///
/// Carries the full ordered message history as it stood at send time; the
/// conversation itself stays owned by the UI-side controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Id of the conversation this request belongs to.
    pub conversation_id: String,
    /// Message history snapshot.
    pub messages: Vec<ChatMessage>,
}

/// Backend facade for a chat UI.
pub struct ChatService {
    client: Mutex<Option<Arc<ChatClient>>>,
    conversations: ConversationStore,
    config: ConfigStore,
    relay: ChunkRelay,
}

impl ChatService {
    /// Create a service over the given stores.
    ///
    /// Runs the one-time environment key migration, then constructs the
    /// streaming client if a usable key is available.
    pub fn new(config: ConfigStore, conversations: ConversationStore) -> Self {
        if let Err(err) = config.migrate_from_env() {
            tracing::warn!(error = %err, "API key migration failed");
        }

        let client = config.api_key().and_then(|key| match build_client(&key) {
            Ok(client) => Some(Arc::new(client)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to build chat client from stored key");
                None
            }
        });
        if client.is_some() {
            tracing::info!("chat client initialized from stored API key");
        }

        Self {
            client: Mutex::new(client),
            conversations,
            config,
            relay: ChunkRelay::new(),
        }
    }

    fn current_client(&self) -> Option<Arc<ChatClient>> {
        self.client.lock().expect("client lock poisoned").clone()
    }

    /// The relay chunks are forwarded through.
    pub fn relay(&self) -> &ChunkRelay {
        &self.relay
    }

    /// Attach a UI surface and return its chunk receiver.
    pub fn attach_ui(&self) -> tokio::sync::mpsc::UnboundedReceiver<crate::stream::StreamChunk> {
        self.relay.attach()
    }

    /// Stream the next assistant turn, forwarding every chunk to the
    /// attached UI surface.
    ///
    /// Resolves once the terminal chunk has been relayed. With no API key
    /// configured this returns [`Error::ApiKey`] before any network
    /// activity; the caller synthesizes the error chunk in that case.
    pub async fn send_message(&self, request: SendMessageRequest) -> Result<()> {
        let Some(client) = self.current_client() else {
            tracing::warn!("send_message called without a configured API key");
            return Err(Error::ApiKey);
        };

        tracing::debug!(
            conversation_id = %request.conversation_id,
            messages = request.messages.len(),
            "sending message"
        );

        let mut stream = client.send(&request.messages, None).await?;
        while let Some(chunk) = stream.next().await {
            self.relay.forward(chunk);
        }
        Ok(())
    }

    /// Stop the in-flight generation, if any.
    pub fn stop_generation(&self) {
        tracing::debug!("stop generation requested");
        if let Some(client) = self.current_client() {
            client.cancel();
        }
    }

    /// Credential status for the settings UI.
    pub fn api_key_status(&self) -> ApiKeyStatus {
        let status = self.config.api_key_status();
        tracing::debug!(is_set = status.is_set, "API key status check");
        status
    }

    /// Persist a new API key and re-create the streaming client with it.
    pub fn set_api_key(&self, key: &str) -> Result<()> {
        self.config.set_api_key(key)?;
        let client = build_client(key)?;
        *self.client.lock().expect("client lock poisoned") = Some(Arc::new(client));
        tracing::info!("chat client re-created with new API key");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Conversation store passthroughs
    // -------------------------------------------------------------------------

    /// List stored conversations, most recently updated first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationMeta>> {
        self.conversations.list().await
    }

    /// Load a conversation by id.
    pub async fn load_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        self.conversations.load(id).await
    }

    /// Save a conversation snapshot.
    pub async fn save_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.conversations.save(conversation).await
    }

    /// Delete a conversation by id.
    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        self.conversations.delete(id).await
    }
}

fn build_client(key: &str) -> Result<ChatClient> {
    let config = ClientConfig::builder().api_key(key).build()?;
    Ok(ChatClient::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::storage::CHATS_DIR_NAME;

    fn temp_service() -> (tempfile::TempDir, ChatService) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        // An existing (empty) config file keeps the env-key migration from
        // picking up ambient ANTHROPIC_API_KEY values on dev machines.
        std::fs::write(&config_path, "{}").unwrap();
        let config = ConfigStore::new(config_path);
        let conversations = ConversationStore::new(dir.path().join(CHATS_DIR_NAME));
        let service = ChatService::new(config, conversations);
        (dir, service)
    }

    #[test]
    fn service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatService>();
        assert_send_sync::<SendMessageRequest>();
    }

    #[tokio::test]
    async fn send_without_key_is_an_auth_error_before_any_chunk() {
        let (_dir, service) = temp_service();
        let mut rx = service.attach_ui();

        let request = SendMessageRequest {
            conversation_id: "conv-1".into(),
            messages: vec![ChatMessage::user("hi")],
        };
        let err = service.send_message(request).await.unwrap_err();
        assert!(err.is_auth_error());

        // Nothing was relayed.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stop_generation_without_client_is_a_no_op() {
        let (_dir, service) = temp_service();
        service.stop_generation();
    }

    #[test]
    fn set_api_key_builds_the_client_and_updates_status() {
        let (_dir, service) = temp_service();
        assert!(!service.api_key_status().is_set);

        service.set_api_key("sk-ant-test").unwrap();
        assert!(service.api_key_status().is_set);
        assert!(service.current_client().is_some());
    }

    #[test]
    fn rejected_key_leaves_the_client_unset() {
        let (_dir, service) = temp_service();
        assert!(service.set_api_key("").is_err());
        assert!(service.current_client().is_none());
    }

    #[tokio::test]
    async fn conversation_passthroughs_hit_the_store() {
        let (_dir, service) = temp_service();

        let mut conv = Conversation::new();
        conv.push_user("hello there");
        service.save_conversation(&conv).await.unwrap();

        let metas = service.list_conversations().await.unwrap();
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].id, conv.id);

        let loaded = service.load_conversation(&conv.id).await.unwrap();
        assert_eq!(loaded, Some(conv.clone()));

        service.delete_conversation(&conv.id).await.unwrap();
        assert!(service.load_conversation(&conv.id).await.unwrap().is_none());
    }

    #[test]
    fn service_picks_up_a_stored_key_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigStore::new(dir.path().join(CONFIG_FILE_NAME));
        config.set_api_key("sk-ant-preexisting").unwrap();

        let conversations = ConversationStore::new(dir.path().join(CHATS_DIR_NAME));
        let service = ChatService::new(config, conversations);
        assert!(service.current_client().is_some());
    }
}
