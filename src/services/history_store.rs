// src/services/history_store.rs
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::DEFAULT_MODEL;
use crate::message::{Message, Sender};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

/// Per-user chat history, keyed by user id.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Vec<Message>>, StoreError>;

    async fn put(&self, user_id: &str, messages: Vec<Message>) -> Result<(), StoreError>;

    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Read-only store that answers every user with the same three-message
/// conversation. Writes are accepted and dropped.
#[derive(Debug, Clone, Default)]
pub struct SampleHistoryStore;

impl SampleHistoryStore {
    pub fn conversation() -> Vec<Message> {
        let now = Utc::now();
        let at = |ago: i64| (now - Duration::seconds(ago)).to_rfc3339_opts(SecondsFormat::Millis, true);
        vec![
            Message {
                id: "1".to_owned(),
                content: "Hello! I'm your AI assistant. How can I help you?".to_owned(),
                sender: Sender::Ai,
                timestamp: at(3600),
                model: Some(DEFAULT_MODEL.to_owned()),
            },
            Message {
                id: "2".to_owned(),
                content: "What's the weather like today?".to_owned(),
                sender: Sender::User,
                timestamp: at(3000),
                model: None,
            },
            Message {
                id: "3".to_owned(),
                content: "Sorry, I can't access real-time weather information. Please check a \
                          weather forecast app or website for accurate conditions."
                    .to_owned(),
                sender: Sender::Ai,
                timestamp: at(2900),
                model: Some(DEFAULT_MODEL.to_owned()),
            },
        ]
    }
}

#[async_trait]
impl HistoryStore for SampleHistoryStore {
    async fn get(&self, _user_id: &str) -> Result<Option<Vec<Message>>, StoreError> {
        Ok(Some(Self::conversation()))
    }

    async fn put(&self, _user_id: &str, _messages: Vec<Message>) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete(&self, _user_id: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-local store.
///
/// Each call takes the lock on its own, so callers doing get, modify, put
/// (appending an exchange, removing one message) are not atomic: two
/// concurrent writers for the same user can lose one update. The
/// [`HistoryStore`] interface has no compare-and-swap to prevent it.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    inner: Arc<RwLock<HashMap<String, Vec<Message>>>>,
}

impl Debug for InMemoryHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHistoryStore").finish_non_exhaustive()
    }
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with stored history
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<Vec<Message>>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, messages: Vec<Message>) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.insert(user_id.to_owned(), messages);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.remove(user_id);
        Ok(())
    }
}
