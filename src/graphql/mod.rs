//! Operation dispatch for `POST /graphql`.
//!
//! The document is parsed, its root field looked up in [`OPERATIONS`] by
//! operation kind and field name, and the matching resolver invoked. A
//! resolver always hands back an envelope; only documents that cannot be
//! dispatched produce a [`DispatchError`].

pub mod document;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::message::{ChatInput, ChatResponse, DeleteHistoryInput, DeleteResponse, HistoryResponse};
use crate::services::resolvers::{self, DEFAULT_USER};
use crate::state::AppState;
use document::{DocumentError, OperationKind};

/// Body of a `POST /graphql` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlRequest {
    /// Left untyped so a non-string `query` can be answered as a GraphQL
    /// error rather than a body parse failure.
    #[serde(default)]
    pub query: Value,
    #[serde(default)]
    pub variables: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `{ "data": ... }` on success, `{ "errors": [...] }` otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<OperationResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
}

impl GraphQlResponse {
    pub fn data(result: OperationResult) -> Self {
        Self {
            data: Some(result),
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![GraphQlError {
                message: message.into(),
            }],
        }
    }
}

/// The envelope an executed operation produced. Domain failures live inside
/// the envelope (`success: false`), not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Health(String),
    History(HistoryResponse),
    Chat(ChatResponse),
    Delete(DeleteResponse),
}

/// The operation document could not be mapped to a resolver.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Unsupported GraphQL operation")]
    UnsupportedOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetChatHistory,
    Health,
    SendMessage,
    DeleteHistory,
}

pub const OPERATIONS: &[(OperationKind, &str, Operation)] = &[
    (OperationKind::Query, "getChatHistory", Operation::GetChatHistory),
    (OperationKind::Query, "health", Operation::Health),
    (OperationKind::Mutation, "sendMessage", Operation::SendMessage),
    (OperationKind::Mutation, "deleteHistory", Operation::DeleteHistory),
];

impl Operation {
    pub fn lookup(kind: OperationKind, field: &str) -> Option<Self> {
        OPERATIONS
            .iter()
            .find(|(k, name, _)| *k == kind && *name == field)
            .map(|(_, _, op)| *op)
    }
}

pub async fn execute(
    state: &AppState,
    query: &str,
    variables: &Value,
) -> Result<OperationResult, DispatchError> {
    let operation = document::parse(query)?;

    if operation.subscription {
        warn!(field = %operation.field.name, "subscription documents are executed as queries");
    }

    let op = Operation::lookup(operation.kind, &operation.field.name)
        .ok_or(DispatchError::UnsupportedOperation)?;
    debug!(?op, name = ?operation.name, "dispatching operation");

    let result = match op {
        Operation::Health => OperationResult::Health(resolvers::health().to_owned()),
        Operation::GetChatHistory => {
            let user_id = operation.argument("userId", variables);
            let user_id = user_id.as_ref().and_then(Value::as_str);
            OperationResult::History(resolvers::get_chat_history(state, user_id).await)
        }
        Operation::SendMessage => {
            let input = chat_input(operation.argument("input", variables).as_ref());
            OperationResult::Chat(resolvers::send_message(state, input).await)
        }
        Operation::DeleteHistory => {
            let input = delete_input(operation.argument("input", variables).as_ref());
            OperationResult::Delete(resolvers::delete_history(state, input).await)
        }
    };
    Ok(result)
}

fn chat_input(input: Option<&Value>) -> ChatInput {
    ChatInput {
        message: input
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        user_id: input
            .and_then(|v| v.get("userId"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_USER)
            .to_owned(),
    }
}

fn delete_input(input: Option<&Value>) -> DeleteHistoryInput {
    let field = |name: &str| match input.and_then(|v| v.get(name)) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    DeleteHistoryInput {
        user_id: field("userId"),
        message_id: field("messageId"),
    }
}
