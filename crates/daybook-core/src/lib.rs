//! Daybook core - the client side of the daybook tasks, expenses and notes API.
//!
//! The pieces, leaf first:
//!
//! - [`storage`]: durable key-value backends (file, OS keychain, memory)
//! - [`auth`]: the [`TokenStore`](auth::TokenStore) holding the session credential
//! - [`api`]: the [`ApiClient`](api::ApiClient) request pipeline and named operations
//! - [`models`]: request and response types
//!
//! ```no_run
//! use std::sync::Arc;
//! use daybook_core::api::ApiClient;
//! use daybook_core::auth::{NoopNavigator, TokenStore};
//! use daybook_core::storage::MemoryStore;
//!
//! # async fn run() -> Result<(), daybook_core::api::ApiError> {
//! let tokens = Arc::new(TokenStore::new(Arc::new(MemoryStore::new()), Arc::new(NoopNavigator)));
//! let client = ApiClient::new("https://example.com/api", tokens)?;
//! client.login("me@example.com", "secret").await?;
//! let tasks = client.get_tasks().await?;
//! # let _ = tasks;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;
pub mod utils;

pub use api::{ApiClient, ApiError, ErrorKind};
pub use auth::TokenStore;
pub use config::Config;
