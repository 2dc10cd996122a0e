pub mod chat_client;
pub mod history_store;
pub mod resolvers;
