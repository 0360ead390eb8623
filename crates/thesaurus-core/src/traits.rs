//! Collaborator interfaces.
//!
//! The resource API never talks to a concrete store or index; it receives
//! implementations of these traits at construction.

use async_trait::async_trait;

use crate::error::Result;
use crate::rdf::{Resource, Term};
use crate::search::{SearchOptions, SearchResults};
use crate::tenant::{Tenant, User};

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Triple store holding resources.
///
/// Implementations store a resource as a whole: `store` either accepts the
/// full resource or fails without partial writes.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch a resource by its URI.
    async fn fetch_by_uri(&self, uri: &str) -> Result<Option<Resource>>;

    /// Fetch a resource by its openskos:uuid.
    async fn fetch_by_uuid(&self, uuid: &str) -> Result<Option<Resource>>;

    /// Resources of `expected_type` having `value` among their `property` values.
    ///
    /// Values are compared by lexical value, ignoring language and datatype.
    async fn fetch_subjects_with_property(
        &self,
        property: &str,
        value: &Term,
        expected_type: &str,
    ) -> Result<Vec<Resource>>;

    /// All resources of `rdf_type`, including soft-deleted ones.
    async fn fetch_by_type(&self, rdf_type: &str) -> Result<Vec<Resource>>;

    /// Insert or replace a resource.
    async fn store(&self, resource: &Resource) -> Result<()>;

    /// Persist a resource already marked as deleted.
    async fn soft_delete(&self, resource: &Resource) -> Result<()>;
}

// =============================================================================
// SEARCH
// =============================================================================

/// Search index answering translated search requests.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, options: &SearchOptions) -> Result<SearchResults>;
}

// =============================================================================
// TENANTS
// =============================================================================

/// Directory of tenants and their users, used for authorization.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Tenant record with its users.
    async fn fetch_tenant(&self, code: &str) -> Result<Option<Tenant>>;

    /// User owning the given API key.
    async fn fetch_user_by_key(&self, api_key: &str) -> Result<Option<User>>;
}
