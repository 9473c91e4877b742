//! JSON-file conversation store.
//!
//! Each conversation is persisted as one pretty-printed JSON file named
//! `<id>.json` under the chats directory. Saves overwrite the whole
//! snapshot (last-write-wins per conversation id). Unreadable files are
//! skipped when listing, not fatal.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::conversation::{Conversation, ConversationMeta};
use crate::error::{Error, Result};

/// Directory name for conversation files under the app data directory.
pub const CHATS_DIR_NAME: &str = "chats";

/// Stores conversations as JSON files on disk.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    base: PathBuf,
}

impl ConversationStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created lazily on first write or list.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The default chats directory under the platform data dir.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("claudechat")
            .join(CHATS_DIR_NAME)
    }

    /// The directory this store reads and writes.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base).await.map_err(Error::Io)
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.base.join(format!("{id}.json")))
    }

    /// List metadata for all stored conversations, most recently updated
    /// first. Files that fail to read or parse are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<ConversationMeta>> {
        self.ensure_dir().await?;

        let mut entries = fs::read_dir(&self.base).await.map_err(Error::Io)?;
        let mut metas = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(Error::Io)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_conversation(&path).await {
                Ok(conversation) => metas.push(conversation.meta()),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable conversation file");
                }
            }
        }

        metas.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        tracing::debug!(count = metas.len(), "listed conversations");
        Ok(metas)
    }

    /// Load a conversation by id. Returns `None` when no file exists.
    pub async fn load(&self, id: &str) -> Result<Option<Conversation>> {
        let path = self.path_for(id)?;
        match fs::read_to_string(&path).await {
            Ok(data) => {
                let conversation = serde_json::from_str(&data)?;
                Ok(Some(conversation))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    /// Save a conversation, overwriting any existing snapshot with the
    /// same id.
    pub async fn save(&self, conversation: &Conversation) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.path_for(&conversation.id)?;
        let data = serde_json::to_string_pretty(conversation)?;
        fs::write(&path, data).await.map_err(Error::Io)?;
        tracing::debug!(id = %conversation.id, "saved conversation");
        Ok(())
    }

    /// Delete a conversation by id. A missing file is not an error.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(%id, "deleted conversation");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

async fn read_conversation(path: &Path) -> Result<Conversation> {
    let data = fs::read_to_string(path).await.map_err(Error::Io)?;
    Ok(serde_json::from_str(&data)?)
}

/// Ids become file names; reject anything that could escape the chats
/// directory.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return Err(Error::invalid_request(format!(
            "invalid conversation id: {id:?}"
        )));
    }
    Ok(())
}
