use axum::Json;
use serde_json::{Value, json};

use crate::message::iso_now;
use crate::services::resolvers::HEALTH_MESSAGE;

pub async fn status_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": HEALTH_MESSAGE,
        "timestamp": iso_now(),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "graphql": "/graphql",
            "playground": "/graphql (GET)",
        },
    }))
}
