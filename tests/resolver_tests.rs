mod common;

use std::sync::Arc;

use common::{FailingStore, FakeChatClient, TEST_KEY, Upstream, keyed_state, state_with};
use deepseek_gateway::config::Config;
use deepseek_gateway::message::{ChatInput, DeleteHistoryInput, Sender};
use deepseek_gateway::services::chat_client::{ROLE_SYSTEM, ROLE_USER};
use deepseek_gateway::services::history_store::{HistoryStore, InMemoryHistoryStore, SampleHistoryStore};
use deepseek_gateway::services::resolvers::{
    delete_history, get_chat_history, health, send_message,
};

fn input(message: &str) -> ChatInput {
    ChatInput {
        message: Some(message.to_owned()),
        user_id: "anonymous".to_owned(),
    }
}

#[test]
fn health_is_constant() {
    assert_eq!(health(), "DeepSeek GraphQL API is running");
}

#[tokio::test]
async fn empty_message_never_reaches_the_client() {
    let chat = FakeChatClient::replying("unused");
    let state = keyed_state(chat.clone());

    for message in [Some(""), Some("   "), None] {
        let resp = send_message(
            &state,
            ChatInput {
                message: message.map(str::to_owned),
                user_id: "anonymous".into(),
            },
        )
        .await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Message is required"));
        assert_eq!(resp.message.sender, Sender::Ai);
    }
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn missing_key_is_a_configuration_failure() {
    let chat = FakeChatClient::replying("unused");
    let state = state_with(Config::default(), chat.clone(), Arc::new(SampleHistoryStore));

    let resp = send_message(&state, input("hello")).await;
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("DeepSeek API key is not configured"));
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn upstream_statuses_map_to_user_messages() {
    let cases = [
        (401, "API key is invalid or has expired"),
        (429, "Too many requests, please try again later"),
        (400, "Invalid request parameters"),
        (503, "AI service is temporarily unavailable, please try again later"),
        (500, "AI service is temporarily unavailable, please try again later"),
    ];
    for (status, expected) in cases {
        let chat = FakeChatClient::new(Upstream::Status(status));
        let state = keyed_state(chat.clone());

        let resp = send_message(&state, input("hello")).await;
        assert!(!resp.success, "status {status}");
        assert_eq!(resp.error.as_deref(), Some(expected));
        assert_eq!(resp.message.content, "Internal server error, please try again later");
        assert_eq!(resp.message.model, None);
        assert_eq!(chat.calls(), 1);
    }
}

#[tokio::test]
async fn transport_failure_is_recovered() {
    let chat = FakeChatClient::new(Upstream::Transport);
    let state = keyed_state(chat.clone());

    let resp = send_message(&state, input("hello")).await;
    assert!(!resp.success);
    assert_eq!(
        resp.error.as_deref(),
        Some("AI service is temporarily unavailable, please try again later")
    );
}

#[tokio::test]
async fn successful_reply_builds_ai_message() {
    let chat = FakeChatClient::replying("Paris.");
    let state = keyed_state(chat.clone());

    let resp = send_message(&state, input("Capital of France?")).await;
    assert!(resp.success);
    assert_eq!(resp.error, None);
    assert_eq!(resp.message.content, "Paris.");
    assert_eq!(resp.message.sender, Sender::Ai);
    assert_eq!(resp.message.model.as_deref(), Some("deepseek-chat"));
    assert!(resp.message.timestamp.ends_with('Z'));
    assert!(!resp.message.id.is_empty());

    let (request, key) = chat.last_call().unwrap();
    assert_eq!(key, TEST_KEY);
    assert_eq!(request.model, "deepseek-chat");
    assert_eq!(request.max_tokens, 2000);
    assert_eq!(request.temperature, 0.7);
    assert!(!request.stream);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, ROLE_SYSTEM);
    assert!(request.messages[0].content.contains("Chinese"));
    assert_eq!(request.messages[1].role, ROLE_USER);
    assert_eq!(request.messages[1].content, "Capital of France?");
}

#[tokio::test]
async fn message_ids_are_unique() {
    let state = keyed_state(FakeChatClient::replying("ok"));
    let a = send_message(&state, input("one")).await;
    let b = send_message(&state, input("two")).await;
    assert_ne!(a.message.id, b.message.id);
}

#[tokio::test]
async fn missing_reply_falls_back() {
    let state = keyed_state(FakeChatClient::new(Upstream::NoContent));

    let resp = send_message(&state, input("hello")).await;
    assert!(resp.success);
    assert_eq!(resp.message.content, "Sorry, I didn't understand your question.");
}

#[tokio::test]
async fn sample_history_ignores_user() {
    let state = keyed_state(FakeChatClient::replying("ok"));

    for user in [None, Some("alice")] {
        let resp = get_chat_history(&state, user).await;
        assert!(resp.success);
        assert_eq!(resp.error, None);
        assert_eq!(resp.messages.len(), 3);
    }
}

#[tokio::test]
async fn history_store_failure_is_an_envelope() {
    let state = state_with(
        Config::default(),
        FakeChatClient::replying("ok"),
        Arc::new(FailingStore),
    );

    let resp = get_chat_history(&state, Some("alice")).await;
    assert!(!resp.success);
    assert!(resp.messages.is_empty());
    assert!(resp.error.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn delete_stub_semantics() {
    let state = keyed_state(FakeChatClient::replying("ok"));

    let one = delete_history(
        &state,
        DeleteHistoryInput {
            user_id: None,
            message_id: Some("7".into()),
        },
    )
    .await;
    assert!(one.success);
    assert_eq!(one.deleted_count, "1");
    assert!(one.message.contains('7'));

    let all = delete_history(&state, DeleteHistoryInput::default()).await;
    assert!(all.success);
    assert_eq!(all.deleted_count, "all");
}

#[tokio::test]
async fn delete_storage_failure_keeps_shape() {
    let state = state_with(
        Config::default(),
        FakeChatClient::replying("ok"),
        Arc::new(FailingStore),
    );

    let resp = delete_history(&state, DeleteHistoryInput::default()).await;
    assert!(!resp.success);
    assert_eq!(resp.deleted_count, "0");
    assert!(resp.message.starts_with("Failed to delete"));
}

#[tokio::test]
async fn send_message_survives_storage_failure() {
    let state = state_with(
        Config::default().with_api_key(TEST_KEY),
        FakeChatClient::replying("still here"),
        Arc::new(FailingStore),
    );

    let resp = send_message(&state, input("hello")).await;
    assert!(resp.success);
    assert_eq!(resp.message.content, "still here");
}

#[tokio::test]
async fn in_memory_history_tracks_exchanges() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let state = state_with(
        Config::default().with_api_key(TEST_KEY),
        FakeChatClient::replying("hi there"),
        store.clone(),
    );

    let empty = get_chat_history(&state, Some("alice")).await;
    assert!(empty.success);
    assert!(empty.messages.is_empty());

    let reply = send_message(
        &state,
        ChatInput {
            message: Some("hello".into()),
            user_id: "alice".into(),
        },
    )
    .await;
    assert!(reply.success);

    let history = get_chat_history(&state, Some("alice")).await.messages;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender, Sender::User);
    assert_eq!(history[0].content, "hello");
    assert_eq!(history[1], reply.message);
    assert!(get_chat_history(&state, None).await.messages.is_empty());

    let resp = delete_history(
        &state,
        DeleteHistoryInput {
            user_id: Some("alice".into()),
            message_id: Some(reply.message.id.clone()),
        },
    )
    .await;
    assert_eq!(resp.deleted_count, "1");
    let history = store.get("alice").await.unwrap().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "hello");

    let resp = delete_history(
        &state,
        DeleteHistoryInput {
            user_id: Some("alice".into()),
            message_id: None,
        },
    )
    .await;
    assert_eq!(resp.deleted_count, "all");
    assert!(store.get("alice").await.unwrap().is_none());
}
