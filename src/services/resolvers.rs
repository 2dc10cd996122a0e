//! The four operations exposed through `/graphql`.
//!
//! Every resolver returns its envelope directly. Validation, configuration,
//! upstream and transport failures are recovered here into `success: false`
//! envelopes and never reach the HTTP layer.

use thiserror::Error;
use tracing::{error, info, warn};

use crate::message::{
    ChatInput, ChatResponse, DeleteHistoryInput, DeleteResponse, HistoryResponse, Message, Sender,
};
use crate::services::chat_client::{
    ChatMessage, CompletionRequest, ROLE_SYSTEM, ROLE_USER, TransportError,
};
use crate::services::history_store::StoreError;
use crate::state::AppState;

pub const HEALTH_MESSAGE: &str = "DeepSeek GraphQL API is running";
pub const DEFAULT_USER: &str = "anonymous";

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;
const FALLBACK_REPLY: &str = "Sorry, I didn't understand your question.";
const PLACEHOLDER_REPLY: &str = "Internal server error, please try again later";
const UNAVAILABLE: &str = "AI service is temporarily unavailable, please try again later";

/// Domain failures of `sendMessage`. The display text is what the client sees.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Message is required")]
    Validation,

    #[error("DeepSeek API key is not configured")]
    Configuration,

    #[error("{}", upstream_message(.0))]
    UpstreamStatus(u16),

    #[error("{}", UNAVAILABLE)]
    Transport(#[from] TransportError),
}

fn upstream_message(status: &u16) -> &'static str {
    match *status {
        401 => "API key is invalid or has expired",
        429 => "Too many requests, please try again later",
        400 => "Invalid request parameters",
        _ => UNAVAILABLE,
    }
}

pub fn health() -> &'static str {
    HEALTH_MESSAGE
}

pub async fn get_chat_history(state: &AppState, user_id: Option<&str>) -> HistoryResponse {
    let user_id = user_id.unwrap_or(DEFAULT_USER);
    match state.history.get(user_id).await {
        Ok(messages) => HistoryResponse {
            messages: messages.unwrap_or_default(),
            success: true,
            error: None,
        },
        Err(e) => {
            warn!(user_id, error = %e, "failed to load chat history");
            HistoryResponse {
                messages: Vec::new(),
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}

pub async fn send_message(state: &AppState, input: ChatInput) -> ChatResponse {
    match complete_chat(state, &input).await {
        Ok(message) => ChatResponse {
            message,
            success: true,
            error: None,
        },
        Err(e) => {
            error!(user_id = %input.user_id, error = ?e, "sendMessage failed");
            ChatResponse {
                message: Message::new(Sender::Ai, PLACEHOLDER_REPLY, None),
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}

async fn complete_chat(state: &AppState, input: &ChatInput) -> Result<Message, ChatError> {
    let text = input
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or(ChatError::Validation)?;

    let api_key = state.config.api_key.as_deref().ok_or(ChatError::Configuration)?;

    let request = CompletionRequest {
        model: state.config.model.clone(),
        messages: vec![
            ChatMessage {
                role: ROLE_SYSTEM,
                content: system_prompt(&state.config.reply_language),
            },
            ChatMessage {
                role: ROLE_USER,
                content: text.to_owned(),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        stream: false,
    };

    let completion = state.chat.complete(&request, api_key).await?;
    if !completion.ok() {
        error!(
            status = completion.status,
            body = completion.error_body.as_deref().unwrap_or(""),
            "DeepSeek API error"
        );
        return Err(ChatError::UpstreamStatus(completion.status));
    }

    let reply = Message::new(
        Sender::Ai,
        completion.reply().unwrap_or(FALLBACK_REPLY),
        Some(state.config.model.clone()),
    );

    record_exchange(state, &input.user_id, text, &reply).await;
    info!(user_id = %input.user_id, message_id = %reply.id, "reply generated");
    Ok(reply)
}

fn system_prompt(language: &str) -> String {
    format!("You are a helpful AI assistant. Please answer the user's questions in {language}.")
}

// Storage failures are logged only; the reply has already been produced.
async fn record_exchange(state: &AppState, user_id: &str, text: &str, reply: &Message) {
    let mut history = match state.history.get(user_id).await {
        Ok(history) => history.unwrap_or_default(),
        Err(e) => {
            warn!(user_id, error = %e, "could not load history to append to");
            return;
        }
    };
    history.push(Message::new(Sender::User, text, None));
    history.push(reply.clone());
    if let Err(e) = state.history.put(user_id, history).await {
        warn!(user_id, error = %e, "could not save chat history");
    }
}

pub async fn delete_history(state: &AppState, input: DeleteHistoryInput) -> DeleteResponse {
    let user_id = input.user_id.as_deref().unwrap_or(DEFAULT_USER);

    let outcome = match input.message_id.as_deref() {
        Some(message_id) => delete_one(state, user_id, message_id)
            .await
            .map(|()| (format!("Message {message_id} deleted"), "1")),
        None => state
            .history
            .delete(user_id)
            .await
            .map(|()| ("All chat history cleared".to_owned(), "all")),
    };

    match outcome {
        Ok((message, count)) => DeleteResponse {
            success: true,
            message,
            deleted_count: count.to_owned(),
        },
        Err(e) => {
            error!(user_id, error = %e, "deleteHistory failed");
            DeleteResponse {
                success: false,
                message: format!("Failed to delete: {e}"),
                deleted_count: "0".to_owned(),
            }
        }
    }
}

async fn delete_one(
    state: &AppState,
    user_id: &str,
    message_id: &str,
) -> Result<(), StoreError> {
    if let Some(mut history) = state.history.get(user_id).await? {
        history.retain(|m| m.id != message_id);
        state.history.put(user_id, history).await?;
    }
    Ok(())
}
