//! thesaurus-api - HTTP surface for concepts, concept schemes and sets.
//!
//! Handlers resolve a [`context::ResponseContext`] from the request, delegate
//! to a per-kind [`services::ResourceApi`] and render JSON, JSON-P or RDF/XML.

pub mod config;
pub mod context;
pub mod error;
pub mod render;
pub mod routes;
pub mod services;

pub use config::{ServerConfig, StoreBackend};
pub use context::ResponseContext;
pub use error::{ApiError, ApiResult};
pub use routes::{build_router, AppState};
pub use services::{ResourceApi, ResultSet};
