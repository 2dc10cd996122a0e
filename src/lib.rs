pub mod config;
pub mod error;
pub mod graphql;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
