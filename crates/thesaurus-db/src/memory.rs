//! In-memory store for tests and local development.
//!
//! Implements every collaborator trait over two maps guarded by async
//! read-write locks. Search semantics follow the PostgreSQL store: exact
//! filter matching, substring text search over labels, soft-deleted
//! resources hidden unless the status filter asks for them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use thesaurus_db::memory::MemoryStore;
//!
//! let store = MemoryStore::new()
//!     .with_tenant(tenant)
//!     .with_resource(scheme);
//! let found = store.fetch_by_uri("http://example.com/scheme").await?;
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use thesaurus_core::namespaces::{openskos, org, rdf, skos};
use thesaurus_core::{
    status_of, ConceptStatus, Error, Resource, ResourceStore, Result, SearchBackend,
    SearchOptions, SearchResults, SortOrder, Tenant, TenantDirectory, Term, User,
};

use crate::{resolve_sorts, ResolvedSort, TEXT_PROPERTIES};

/// Seed document accepted by [`MemoryStore::from_seed_json`].
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Store, search backend and tenant directory held in process memory.
#[derive(Default)]
pub struct MemoryStore {
    resources: RwLock<BTreeMap<String, Resource>>,
    tenants: RwLock<BTreeMap<String, Tenant>>,
}

/// Organization record a tenant is validated against.
pub fn organization_resource(tenant: &Tenant) -> Resource {
    let mut resource = Resource::new(format!("urn:tenant:{}", tenant.code));
    resource.add_property(rdf::TYPE, Term::uri(org::FORMAL_ORGANIZATION));
    resource.add_property(openskos::CODE, Term::literal(&tenant.code));
    resource.add_property(thesaurus_core::namespaces::dcterms::TITLE, Term::literal(&tenant.name));
    resource
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource. Blank resources are ignored.
    pub fn with_resource(mut self, resource: impl Into<Resource>) -> Self {
        let resource = resource.into();
        if let Some(uri) = resource.uri() {
            self.resources.get_mut().insert(uri.to_string(), resource);
        }
        self
    }

    /// Add a tenant and, unless one exists, its organization record.
    pub fn with_tenant(mut self, tenant: Tenant) -> Self {
        let resources = self.resources.get_mut();
        let has_org = resources
            .values()
            .any(|r| is_organization_of(r, &tenant.code));
        if !has_org {
            let org = organization_resource(&tenant);
            if let Some(uri) = org.uri() {
                resources.insert(uri.to_string(), org.clone());
            }
        }
        self.tenants.get_mut().insert(tenant.code.clone(), tenant);
        self
    }

    /// Build a store from a JSON seed document.
    pub fn from_seed_json(json: &str) -> Result<Self> {
        let seed: Seed = serde_json::from_str(json)?;
        let store = seed
            .tenants
            .into_iter()
            .fold(Self::new(), |store, tenant| store.with_tenant(tenant));
        let store = seed
            .resources
            .into_iter()
            .fold(store, |store, resource| store.with_resource(resource));
        Ok(store)
    }

    /// Build a store from a JSON seed file.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("Cannot read seed file {}: {}", path.display(), e)))?;
        let store = Self::from_seed_json(&json)?;
        info!(
            subsystem = "db",
            component = "memory",
            resource_count = store.resources.read().await.len(),
            "Memory store seeded"
        );
        Ok(store)
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

fn is_organization_of(resource: &Resource, code: &str) -> bool {
    resource.has_type(org::FORMAL_ORGANIZATION)
        && resource
            .get_property(openskos::CODE)
            .iter()
            .any(|t| t.value() == code)
}

fn any_value_in(resource: &Resource, property: &str, values: &[String]) -> bool {
    resource
        .get_property(property)
        .iter()
        .any(|t| values.iter().any(|v| v == t.value()))
}

fn matches(
    resource: &Resource,
    options: &SearchOptions,
    all: &BTreeMap<String, Resource>,
    needle: Option<&str>,
) -> bool {
    if let Some(rdf_type) = &options.rdf_type {
        if !resource.has_type(rdf_type) {
            return false;
        }
    }

    if let Some(tenants) = options.tenants.as_ref().filter(|t| !t.is_empty()) {
        if !resource.tenant().is_some_and(|t| tenants.iter().any(|x| x == t)) {
            return false;
        }
    }

    if let Some(sets) = options.sets.as_ref().filter(|s| !s.is_empty()) {
        let in_set = resource.get_property(openskos::SET).iter().any(|set| {
            sets.iter().any(|s| s == set.value())
                || all
                    .get(set.value())
                    .is_some_and(|target| any_value_in(target, openskos::CODE, sets))
        });
        if !in_set {
            return false;
        }
    }

    if let Some(schemes) = options.concept_scheme.as_ref().filter(|s| !s.is_empty()) {
        if !any_value_in(resource, skos::IN_SCHEME, schemes) {
            return false;
        }
    }

    if let Some(collections) = options.skos_collection.as_ref().filter(|c| !c.is_empty()) {
        if !any_value_in(resource, openskos::IN_SKOS_COLLECTION, collections) {
            return false;
        }
    }

    let status = status_of(resource);
    match options.status.as_ref().filter(|s| !s.is_empty()) {
        Some(statuses) => {
            if !status.is_some_and(|s| statuses.contains(&s)) {
                return false;
            }
        }
        None => {
            if status == Some(ConceptStatus::Deleted) {
                return false;
            }
        }
    }

    if let Some(needle) = needle {
        let found = TEXT_PROPERTIES.iter().any(|property| {
            resource
                .get_property(property)
                .iter()
                .any(|t| t.value().to_lowercase().contains(needle))
        });
        if !found {
            return false;
        }
    }

    true
}

fn sort_key(resource: &Resource, property: &str, language: Option<&str>) -> Option<String> {
    resource
        .get_property(property)
        .iter()
        .filter(|t| language.is_none() || t.language() == language)
        .map(|t| t.value().to_string())
        .min()
}

fn compare(a: &Resource, b: &Resource, sorts: &[ResolvedSort<'_>]) -> Ordering {
    for sort in sorts {
        let ordering = match (
            sort_key(a, sort.property, sort.language),
            sort_key(b, sort.property, sort.language),
        ) {
            (Some(x), Some(y)) => match sort.order {
                SortOrder::Asc => x.cmp(&y),
                SortOrder::Desc => y.cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.uri().cmp(&b.uri())
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn fetch_by_uri(&self, uri: &str) -> Result<Option<Resource>> {
        Ok(self.resources.read().await.get(uri).cloned())
    }

    async fn fetch_by_uuid(&self, uuid: &str) -> Result<Option<Resource>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .find(|r| r.uuid() == Some(uuid))
            .cloned())
    }

    async fn fetch_subjects_with_property(
        &self,
        property: &str,
        value: &Term,
        expected_type: &str,
    ) -> Result<Vec<Resource>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.has_type(expected_type))
            .filter(|r| r.get_property(property).iter().any(|t| t.value() == value.value()))
            .cloned()
            .collect())
    }

    async fn fetch_by_type(&self, rdf_type: &str) -> Result<Vec<Resource>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.has_type(rdf_type))
            .cloned()
            .collect())
    }

    async fn store(&self, resource: &Resource) -> Result<()> {
        let uri = resource.require_uri()?.to_string();
        self.resources.write().await.insert(uri, resource.clone());
        Ok(())
    }

    async fn soft_delete(&self, resource: &Resource) -> Result<()> {
        let uri = resource.require_uri()?;
        let mut resources = self.resources.write().await;
        if !resources.contains_key(uri) {
            return Err(Error::NotFound(format!("Resource {} is not stored.", uri)));
        }
        resources.insert(uri.to_string(), resource.clone());
        debug!(subsystem = "db", component = "memory", resource_uri = uri, "Resource soft-deleted");
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for MemoryStore {
    async fn search(&self, options: &SearchOptions) -> Result<SearchResults> {
        let sorts = resolve_sorts(options)?;
        let resources = self.resources.read().await;
        let needle = options.text_needle();

        let mut hits: Vec<&Resource> = resources
            .values()
            .filter(|r| matches(r, options, &resources, needle.as_deref()))
            .collect();
        hits.sort_by(|a, b| compare(a, b, &sorts));

        let total = hits.len() as i64;
        let resources = hits
            .into_iter()
            .skip(options.start.max(0) as usize)
            .take(options.rows.max(0) as usize)
            .cloned()
            .collect();

        Ok(SearchResults { resources, total })
    }
}

#[async_trait]
impl TenantDirectory for MemoryStore {
    async fn fetch_tenant(&self, code: &str) -> Result<Option<Tenant>> {
        Ok(self.tenants.read().await.get(code).cloned())
    }

    async fn fetch_user_by_key(&self, api_key: &str) -> Result<Option<User>> {
        Ok(self
            .tenants
            .read()
            .await
            .values()
            .flat_map(|t| t.users.iter())
            .find(|u| u.api_key.as_deref() == Some(api_key))
            .cloned())
    }
}
