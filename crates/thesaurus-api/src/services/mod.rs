//! Service layer for business logic.

pub mod resource_api;

pub use resource_api::{ResourceApi, ResultSet};
