// src/state.rs
use std::sync::Arc;

use crate::config::{Config, HistoryBackend};
use crate::services::chat_client::{ChatClient, DeepSeekClient};
use crate::services::history_store::{HistoryStore, InMemoryHistoryStore, SampleHistoryStore};

pub type SharedState = Arc<AppState>;

/// Context handed to every resolver: configuration plus the two external
/// collaborators.
pub struct AppState {
    pub config: Config,
    pub chat: Arc<dyn ChatClient>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let chat: Arc<dyn ChatClient> = Arc::new(DeepSeekClient::new(config.api_url.clone()));
        let history: Arc<dyn HistoryStore> = match config.history_backend {
            HistoryBackend::Sample => Arc::new(SampleHistoryStore),
            HistoryBackend::Memory => Arc::new(InMemoryHistoryStore::new()),
        };
        Self::with_collaborators(config, chat, history)
    }

    pub fn with_collaborators(
        config: Config,
        chat: Arc<dyn ChatClient>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self { config, chat, history }
    }
}
