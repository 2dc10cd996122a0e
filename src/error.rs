//! HTTP-level failures of the `/graphql` endpoint.
//!
//! These are the errors the front end sees as a non-200 status. Domain
//! failures never get here: resolvers fold them into `success: false`
//! envelopes that travel with a 200.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::graphql::{DispatchError, GraphQlResponse};

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Query is required")]
    MissingQuery,

    #[error("Query must be a string")]
    QueryNotString,

    /// The document could not be dispatched to a resolver.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                Json(GraphQlResponse::error(self.to_string())),
            )
                .into_response(),
            AppError::QueryNotString => {
                warn!("GraphQL request with a non-string query");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(GraphQlResponse::error(self.to_string())),
                )
                    .into_response()
            }
            AppError::Dispatch(ref e) => {
                warn!(error = %e, "GraphQL dispatch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(GraphQlResponse::error(e.to_string())),
                )
                    .into_response()
            }
            AppError::MalformedBody(_) | AppError::Internal(_) => {
                error!(error = %self, "request failed");
                internal_server_error()
            }
        }
    }
}

/// Plain-text 500 used for every failure that is not a GraphQL error.
pub fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR).into_response()
}
