use crate::error::{ReplyError, StorageError};
use crate::post::SavedReply;
use crate::storage::Storage;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const CREDENTIAL_KEY: &str = "openaiApiKey";
pub const SAVED_REPLIES_KEY: &str = "savedReplies";

type ReplyMap = HashMap<String, Vec<SavedReply>>;

/// The API key, stored as a single string value.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Empty string when nothing is stored or the value cannot be read.
    pub async fn get(&self) -> String {
        match self.storage.get(CREDENTIAL_KEY).await {
            Ok(Some(Value::String(key))) => key,
            Ok(_) => String::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read API key");
                String::new()
            }
        }
    }

    pub async fn set(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .set(CREDENTIAL_KEY, Value::String(key.to_string()))
            .await
    }

    /// First-install bootstrap: store an empty key if none exists yet.
    pub async fn ensure_initialized(&self) -> Result<(), StorageError> {
        match self.storage.get(CREDENTIAL_KEY).await? {
            Some(Value::String(key)) if !key.is_empty() => Ok(()),
            _ => self.set("").await,
        }
    }
}

/// Accepted replies per post, oldest first. Append-only.
#[derive(Clone)]
pub struct ReplyStore {
    storage: Arc<dyn Storage>,
    write_lock: Arc<Mutex<()>>,
}

impl ReplyStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> Result<ReplyMap, StorageError> {
        match self.storage.get(SAVED_REPLIES_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(ReplyMap::new()),
        }
    }

    /// Record `content` as a new reply to `post_id` and persist the whole
    /// mapping before returning it.
    pub async fn append(&self, post_id: &str, content: &str) -> Result<SavedReply, ReplyError> {
        let _guard = self.write_lock.lock().await;

        let mut replies = self.load().await.map_err(ReplyError::Persistence)?;
        let saved = SavedReply {
            id: Uuid::new_v4(),
            content: content.to_string(),
            post_id: post_id.to_string(),
            created_at_millis: chrono::Utc::now().timestamp_millis(),
        };
        replies
            .entry(post_id.to_string())
            .or_default()
            .push(saved.clone());

        let value = serde_json::to_value(&replies)
            .map_err(|e| ReplyError::Persistence(StorageError::Json(e)))?;
        self.storage
            .set(SAVED_REPLIES_KEY, value)
            .await
            .map_err(|e| {
                tracing::warn!(post_id, error = %e, "failed to persist reply");
                ReplyError::Persistence(e)
            })?;

        tracing::info!(post_id, reply_id = %saved.id, "saved reply");
        Ok(saved)
    }

    /// Saved replies for `post_id`; empty for unknown posts or unreadable
    /// storage.
    pub async fn list(&self, post_id: &str) -> Vec<SavedReply> {
        match self.load().await {
            Ok(mut replies) => replies.remove(post_id).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(post_id, error = %e, "failed to read saved replies");
                Vec::new()
            }
        }
    }
}
