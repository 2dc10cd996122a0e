#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use deepseek_gateway::config::Config;
use deepseek_gateway::message::Message;
use deepseek_gateway::services::chat_client::{
    ChatClient, Choice, ChoiceMessage, Completion, CompletionRequest, TransportError,
};
use deepseek_gateway::services::history_store::{HistoryStore, SampleHistoryStore, StoreError};
use deepseek_gateway::state::AppState;

pub const TEST_KEY: &str = "sk-test";

#[derive(Debug, Clone)]
pub enum Upstream {
    Reply(String),
    NoContent,
    Status(u16),
    Transport,
}

/// Chat client stub that records every call.
pub struct FakeChatClient {
    upstream: Upstream,
    calls: AtomicUsize,
    last: Mutex<Option<(CompletionRequest, String)>>,
}

impl FakeChatClient {
    pub fn new(upstream: Upstream) -> Arc<Self> {
        Arc::new(Self {
            upstream,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Upstream::Reply(text.to_owned()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<(CompletionRequest, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((request.clone(), api_key.to_owned()));

        match &self.upstream {
            Upstream::Reply(text) => Ok(Completion {
                status: 200,
                choices: vec![Choice {
                    message: Some(ChoiceMessage {
                        content: Some(text.clone()),
                    }),
                }],
                error_body: None,
            }),
            Upstream::NoContent => Ok(Completion {
                status: 200,
                choices: Vec::new(),
                error_body: None,
            }),
            Upstream::Status(status) => Ok(Completion {
                status: *status,
                choices: Vec::new(),
                error_body: Some(r#"{"error":{"message":"nope"}}"#.to_owned()),
            }),
            Upstream::Transport => {
                let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
                Err(TransportError::from(err))
            }
        }
    }
}

/// Store whose every call fails.
pub struct FailingStore;

#[async_trait]
impl HistoryStore for FailingStore {
    async fn get(&self, _user_id: &str) -> Result<Option<Vec<Message>>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn put(&self, _user_id: &str, _messages: Vec<Message>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _user_id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

pub fn state_with(
    config: Config,
    chat: Arc<dyn ChatClient>,
    history: Arc<dyn HistoryStore>,
) -> AppState {
    AppState::with_collaborators(config, chat, history)
}

/// Sample history and a configured provider key.
pub fn keyed_state(chat: Arc<FakeChatClient>) -> AppState {
    state_with(
        Config::default().with_api_key(TEST_KEY),
        chat,
        Arc::new(SampleHistoryStore),
    )
}
