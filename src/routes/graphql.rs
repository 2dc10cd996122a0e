use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::Html,
};

use serde_json::Value;

use crate::{
    error::AppError,
    graphql::{GraphQlRequest, GraphQlResponse, execute},
    state::SharedState,
};

// The body is taken as `Bytes` so it is read to the end before any
// validation runs, whichever way the handler exits.
pub async fn graphql_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<GraphQlResponse>, AppError> {
    let request: GraphQlRequest = serde_json::from_slice(&body)?;

    let query = match &request.query {
        Value::Null => return Err(AppError::MissingQuery),
        Value::String(q) if q.is_empty() => return Err(AppError::MissingQuery),
        Value::String(q) => q.as_str(),
        _ => return Err(AppError::QueryNotString),
    };

    let result = execute(&state, query, &request.variables).await?;
    Ok(Json(GraphQlResponse::data(result)))
}

pub async fn playground_handler() -> Html<&'static str> {
    Html(PLAYGROUND_HTML)
}

const PLAYGROUND_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>GraphQL API</title>
  <style>
    body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; }
    .page { display: flex; justify-content: center; align-items: center; height: 100vh; background: #f8f9fa; }
    .card { text-align: center; padding: 40px; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
    .endpoints { background: #f8f9fa; padding: 15px; border-radius: 4px; text-align: left; font-family: monospace; }
    .muted { color: #666; }
  </style>
</head>
<body>
  <div class="page">
    <div class="card">
      <h1>GraphQL API</h1>
      <p class="muted">DeepSeek Chat GraphQL API is running</p>
      <div class="endpoints">
        <div>POST /graphql</div>
        <div class="muted">Queries: getChatHistory, health</div>
        <div class="muted">Mutations: sendMessage, deleteHistory</div>
      </div>
    </div>
  </div>
</body>
</html>
"#;
