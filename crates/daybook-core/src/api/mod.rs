//! REST API client module for the daybook service.
//!
//! This module provides the `ApiClient` for authenticated calls against the
//! tasks, expenses and notes API, and the `ApiError` failure taxonomy.
//!
//! The API uses bearer token authentication; tokens come from `/login` or
//! `/register` and live in the [`TokenStore`](crate::auth::TokenStore).

pub mod client;
pub mod error;
pub mod request;
mod resources;

pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};
pub use request::{Outcome, RequestOptions, Resource};
