//! Conversational property search over an Elasticsearch index.
//!
//! A request flows through four stages:
//!
//! 1. [`search::ParameterNormalizer`] turns a [`search::SearchIntent`] into
//!    [`search::CanonicalParameters`], geocoding a text location if needed.
//! 2. [`search::render::render`] builds a typed query with one clause per present filter.
//! 3. [`search::SearchBackend::execute`] runs it against the index.
//! 4. [`search::format::format`] reshapes the hits into a [`models::SearchResult`].
//!
//! [`server::ToolServer`] exposes the pipeline as tools over stdio.

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod server;

pub use config::ConnectorConfig;
pub use error::{ConnectorError, Result};
