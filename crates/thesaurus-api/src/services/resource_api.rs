//! Resource API facade.
//!
//! One [`ResourceApi`] serves one [`ResourceKind`]. It orchestrates the
//! query translator, the validation chains and the metadata engine against
//! the injected collaborators:
//!
//! - **find**: raw parameters → search options → result set
//! - **get_by_id**: URI or uuid lookup; deleted resources are gone
//! - **create/update**: authorize → validate → stamp metadata → store
//! - **delete**: authorize → mark deleted → soft delete, returning the
//!   resource as it was before
//!
//! Authorization always runs before any write.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use thesaurus_core::namespaces::{dcterms, openskos};
use thesaurus_core::{
    ensure_metadata, status_of, ConceptStatus, Error, MetadataContext, Resource, ResourceKind,
    ResourceStore, Result, SearchBackend, SearchOptions, TenantDirectory, Term, User, Validator,
};
use thesaurus_search::translate_search_params;

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub resources: Vec<Resource>,
    /// Total hits across all pages.
    pub total: i64,
    pub start: i64,
    pub limit: i64,
}

/// System-managed properties an update keeps from the stored version when
/// the submitted document leaves them out.
const CARRIED_ON_UPDATE: &[&str] = &[
    openskos::UUID,
    openskos::TENANT,
    openskos::SET,
    dcterms::CREATOR,
    dcterms::DATE_SUBMITTED,
    dcterms::CONTRIBUTOR,
    dcterms::DATE_ACCEPTED,
    openskos::ACCEPTED_BY,
    openskos::DATE_DELETED,
    openskos::DELETED_BY,
];

/// Facade over the collaborators for one resource kind.
pub struct ResourceApi {
    kind: ResourceKind,
    validator: Validator,
    store: Arc<dyn ResourceStore>,
    search: Arc<dyn SearchBackend>,
    directory: Arc<dyn TenantDirectory>,
}

impl ResourceApi {
    /// Facade with the standard rule chains for `kind`.
    pub fn new(
        kind: ResourceKind,
        store: Arc<dyn ResourceStore>,
        search: Arc<dyn SearchBackend>,
        directory: Arc<dyn TenantDirectory>,
    ) -> Self {
        Self::with_validator(Validator::for_kind(kind), store, search, directory)
    }

    pub fn with_validator(
        validator: Validator,
        store: Arc<dyn ResourceStore>,
        search: Arc<dyn SearchBackend>,
        directory: Arc<dyn TenantDirectory>,
    ) -> Self {
        Self {
            kind: validator.kind(),
            validator,
            store,
            search,
            directory,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn label(&self) -> &'static str {
        match self.kind {
            ResourceKind::Concept => "Concept",
            ResourceKind::ConceptScheme => "Concept scheme",
            ResourceKind::Set => "Set",
        }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Translate raw query parameters and search resources of this kind.
    pub fn translate(&self, params: &HashMap<String, String>) -> Result<SearchOptions> {
        let mut options = translate_search_params(params)?;
        options.rdf_type = Some(self.kind.rdf_type().to_string());
        Ok(options)
    }

    /// Run a translated search.
    pub async fn search(&self, options: &SearchOptions) -> Result<ResultSet> {
        let start = Instant::now();
        let results = self.search.search(options).await?;

        info!(
            subsystem = "api",
            component = "resource_api",
            op = "find",
            resource_kind = %self.kind,
            result_count = results.resources.len(),
            total = results.total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(ResultSet {
            resources: results.resources,
            total: results.total,
            start: options.start,
            limit: options.rows,
        })
    }

    /// Search with raw query parameters.
    pub async fn find(&self, params: &HashMap<String, String>) -> Result<ResultSet> {
        let options = self.translate(params)?;
        self.search(&options).await
    }

    /// Fetch by URI (ids starting with `http`) or by uuid.
    pub async fn get_by_id(&self, id: &str) -> Result<Resource> {
        let found = if id.starts_with("http://") || id.starts_with("https://") {
            self.store.fetch_by_uri(id).await?
        } else {
            self.store.fetch_by_uuid(id).await?
        };

        let resource = found
            .filter(|r| r.has_type(self.kind.rdf_type()))
            .ok_or_else(|| Error::NotFound(format!("{} not found by id: {}", self.label(), id)))?;

        if status_of(&resource) == Some(ConceptStatus::Deleted) {
            return Err(Error::Gone(format!("{} {} is deleted", self.label(), id)));
        }
        Ok(resource)
    }

    /// `uri → caption` of every resource of this kind that is not deleted.
    pub async fn list(&self) -> Result<BTreeMap<String, String>> {
        let resources = self.store.fetch_by_type(self.kind.rdf_type()).await?;
        Ok(resources
            .iter()
            .filter(|r| status_of(r) != Some(ConceptStatus::Deleted))
            .filter_map(|r| {
                let uri = r.uri()?;
                let caption = self
                    .kind
                    .caption(r, None)
                    .unwrap_or_else(|_| uri.to_string());
                Some((uri.to_string(), caption))
            })
            .collect())
    }

    // =========================================================================
    // IDENTITY
    // =========================================================================

    /// User owning API key `key`.
    pub async fn resolve_user(&self, key: Option<&str>) -> Result<User> {
        let key = key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::precondition("No user key specified"))?;

        self.directory
            .fetch_user_by_key(key)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid key specified".to_string()))
    }

    fn authorize_edit(
        &self,
        user: &User,
        tenant_code: &str,
        resource: Option<&Resource>,
    ) -> Result<()> {
        if user.tenant != tenant_code {
            return Err(Error::Unauthorized("Tenant does not match user given".to_string()));
        }
        if let Some(resource) = resource {
            let owner = resource.tenant().unwrap_or_default();
            if owner != tenant_code {
                return Err(Error::Unauthorized(format!(
                    "Resource has tenant {} which differs from the given {}",
                    owner, tenant_code
                )));
            }
        }
        Ok(())
    }

    /// A submitted document may only name the tenant it is written for.
    fn authorize_declared_tenant(&self, resource: &Resource, tenant_code: &str) -> Result<()> {
        match resource.tenant() {
            Some(declared) if declared != tenant_code => Err(Error::Unauthorized(format!(
                "Resource declares tenant {} which differs from the given {}",
                declared, tenant_code
            ))),
            _ => Ok(()),
        }
    }

    fn authorize_delete(&self, user: &User, tenant_code: &str, resource: &Resource) -> Result<()> {
        self.authorize_edit(user, tenant_code, Some(resource))?;
        if !user.is_admin() {
            return Err(Error::Unauthorized(format!(
                "You do not have permission to delete this {}",
                self.kind
            )));
        }
        Ok(())
    }

    fn metadata_context(
        &self,
        resource: &Resource,
        tenant_code: &str,
        user: &User,
    ) -> MetadataContext {
        MetadataContext::new(tenant_code, &user.uri).with_set(resource.set_reference())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Stored resource of this kind at `uri`, deleted or not.
    pub async fn fetch_existing(&self, uri: &str) -> Result<Resource> {
        self.store
            .fetch_by_uri(uri)
            .await?
            .filter(|r| r.has_type(self.kind.rdf_type()))
            .ok_or_else(|| Error::NotFound(format!("{} not found by id: {}", self.label(), uri)))
    }

    /// Validate, stamp and store a new resource.
    ///
    /// Blank resources get a URI generated from their set and notation.
    pub async fn create(
        &self,
        mut resource: Resource,
        tenant_code: &str,
        user: &User,
    ) -> Result<Resource> {
        let authorized = self
            .authorize_edit(user, tenant_code, None)
            .and_then(|_| self.authorize_declared_tenant(&resource, tenant_code));
        if let Err(e) = authorized {
            warn!(
                subsystem = "api",
                op = "create",
                actor = %user.uri,
                tenant = tenant_code,
                "Create denied"
            );
            return Err(e);
        }

        if resource.is_blank() {
            resource.self_generate_uri()?;
        }
        let uri = resource.require_uri()?.to_string();
        if self.store.fetch_by_uri(&uri).await?.is_some() {
            return Err(Error::invalid_argument(format!(
                "The resource with uri {} already exists.",
                uri
            )));
        }

        self.validator
            .validate(&resource, tenant_code, self.store.as_ref())
            .await?;

        let ctx = self.metadata_context(&resource, tenant_code, user);
        ensure_metadata(&mut resource, self.kind, &ctx);
        self.store.store(&resource).await?;

        info!(
            subsystem = "api",
            component = "resource_api",
            op = "create",
            resource_kind = %self.kind,
            resource_uri = %uri,
            tenant = tenant_code,
            actor = %user.uri,
            "Resource created"
        );
        Ok(resource)
    }

    /// Validate, stamp and store a new version of an existing resource.
    pub async fn update(
        &self,
        mut resource: Resource,
        tenant_code: &str,
        user: &User,
    ) -> Result<Resource> {
        let uri = resource
            .uri()
            .ok_or_else(|| Error::invalid_argument("Missing uri for update"))?
            .to_string();
        let existing = self.fetch_existing(&uri).await?;

        let authorized = self
            .authorize_edit(user, tenant_code, Some(&existing))
            .and_then(|_| self.authorize_declared_tenant(&resource, tenant_code));
        if let Err(e) = authorized {
            warn!(
                subsystem = "api",
                op = "update",
                actor = %user.uri,
                resource_uri = %uri,
                "Update denied"
            );
            return Err(e);
        }

        for property in CARRIED_ON_UPDATE {
            if !resource.has_property(property) && existing.has_property(property) {
                resource.set_properties(*property, existing.get_property(property).to_vec());
            }
        }

        self.validator
            .validate_for_update(&resource, tenant_code, &existing, self.store.as_ref())
            .await?;

        let ctx = self
            .metadata_context(&resource, tenant_code, user)
            .with_previous_status(status_of(&existing));
        ensure_metadata(&mut resource, self.kind, &ctx);
        self.store.store(&resource).await?;

        info!(
            subsystem = "api",
            component = "resource_api",
            op = "update",
            resource_kind = %self.kind,
            resource_uri = %uri,
            tenant = tenant_code,
            actor = %user.uri,
            "Resource updated"
        );
        Ok(resource)
    }

    /// Soft-delete the resource at `uri`, returning it as it was before.
    pub async fn delete(&self, uri: &str, tenant_code: &str, user: &User) -> Result<Resource> {
        let existing = self.fetch_existing(uri).await?;

        if let Err(e) = self.authorize_delete(user, tenant_code, &existing) {
            warn!(
                subsystem = "api",
                op = "delete",
                actor = %user.uri,
                resource_uri = uri,
                error = %e,
                "Delete denied"
            );
            return Err(e);
        }

        let mut deleted = existing.clone();
        deleted.set_property(openskos::STATUS, Term::literal(ConceptStatus::Deleted.as_str()));
        let ctx = self
            .metadata_context(&deleted, tenant_code, user)
            .with_previous_status(status_of(&existing));
        ensure_metadata(&mut deleted, self.kind, &ctx);
        if !self.kind.has_status() {
            deleted.set_property(openskos::DATE_DELETED, ctx.now_literal());
            deleted.set_property(openskos::DELETED_BY, Term::uri(&user.uri));
        }
        self.store.soft_delete(&deleted).await?;

        debug!(subsystem = "api", op = "delete", resource_uri = uri, "Soft delete stored");
        info!(
            subsystem = "api",
            component = "resource_api",
            op = "delete",
            resource_kind = %self.kind,
            resource_uri = uri,
            tenant = tenant_code,
            actor = %user.uri,
            "Resource deleted"
        );
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesaurus_core::UserRole;
    use thesaurus_db::test_fixtures::{fixture_store, fixture_tenant, TENANT_CODE};

    fn api(kind: ResourceKind) -> ResourceApi {
        let store = Arc::new(fixture_store());
        ResourceApi::new(kind, store.clone(), store.clone(), store)
    }

    fn user(role: UserRole) -> User {
        fixture_tenant()
            .users
            .into_iter()
            .find(|u| u.role == role)
            .unwrap()
    }

    #[test]
    fn test_edit_requires_matching_tenant() {
        let api = api(ResourceKind::Concept);
        let err = api
            .authorize_edit(&user(UserRole::Editor), "other", None)
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(api.authorize_edit(&user(UserRole::Editor), TENANT_CODE, None).is_ok());
    }

    #[test]
    fn test_delete_requires_admin() {
        let api = api(ResourceKind::ConceptScheme);
        let scheme = thesaurus_db::test_fixtures::fixture_scheme();
        assert!(api
            .authorize_delete(&user(UserRole::Editor), TENANT_CODE, &scheme)
            .is_err());
        assert!(api
            .authorize_delete(&user(UserRole::Admin), TENANT_CODE, &scheme)
            .is_ok());
    }

    #[test]
    fn test_translate_pins_rdf_type() {
        let api = api(ResourceKind::Set);
        let options = api.translate(&HashMap::new()).unwrap();
        assert_eq!(options.rdf_type.as_deref(), Some(ResourceKind::Set.rdf_type()));
    }

    #[tokio::test]
    async fn test_resolve_user() {
        let api = api(ResourceKind::Concept);
        let err = api.resolve_user(None).await.unwrap_err();
        assert_eq!(err.status_code(), 412);
        let err = api.resolve_user(Some("nope")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(api
            .resolve_user(Some(thesaurus_db::test_fixtures::ADMIN_KEY))
            .await
            .unwrap()
            .is_admin());
    }
}
