//! Headless core of a to-do app: tasks and categories in an embedded
//! SQLite store, pure derivations (ordering, filtering, calendar buckets),
//! screen view-states, and clients for the identity provider and the chat
//! assistant. The UI on top is someone else's problem.

pub mod auth;
pub mod chat;
pub mod config;
pub mod core;
pub mod error;
pub mod store;
pub mod view;

pub use config::DodoConfig;
pub use store::SqliteStore;
