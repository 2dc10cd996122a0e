// src/routes/mod.rs
pub mod cors;
pub mod graphql;
pub mod status;

use std::any::Any;

use crate::error::internal_server_error;
use crate::state::SharedState;
use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::Response,
    routing::get,
};
use graphql::{graphql_handler, playground_handler};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub fn create_router(state: SharedState) -> Router {
    let cors = cors::CorsHeaders::new(&state.config.cors_allow_origin);

    Router::new()
        .route(
            "/graphql",
            get(playground_handler).post(graphql_handler).fallback(not_found),
        )
        .route("/", get(status::status_handler).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(cors, cors::cors_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    internal_server_error()
}
