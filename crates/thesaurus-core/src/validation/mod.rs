//! Validation engine.
//!
//! A [`Validator`] holds the ordered rule chains of one resource kind: one
//! for creation and one for update. Every rule of a chain runs, and the
//! violations of all rules are reported together as [`Error::Validation`].
//! A rule that cannot evaluate (store failure) aborts the chain with that
//! error instead.

mod rules;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::kind::ResourceKind;
use crate::namespaces::{dcmitype, dcterms, openskos, skos};
use crate::rdf::Resource;
use crate::traits::ResourceStore;

pub use rules::{InScheme, RdfType, ReferencedResources, TenantExists, UniqueProperty, ValidStatus};

/// What a rule may consult while checking a resource.
pub struct ValidationContext<'a> {
    /// Tenant declared by the request.
    pub tenant_code: &'a str,
    pub store: &'a dyn ResourceStore,
    /// Stored version of the resource, set on update.
    pub existing: Option<&'a Resource>,
}

/// A single check over a resource.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Short rule name used in logs.
    fn name(&self) -> &'static str;

    /// Human-readable violations; empty when the resource passes.
    async fn check(&self, resource: &Resource, ctx: &ValidationContext<'_>) -> Result<Vec<String>>;
}

/// Create and update rule chains for one resource kind.
pub struct Validator {
    kind: ResourceKind,
    create_rules: Vec<Box<dyn Rule>>,
    update_rules: Vec<Box<dyn Rule>>,
}

impl Validator {
    pub fn new(
        kind: ResourceKind,
        create_rules: Vec<Box<dyn Rule>>,
        update_rules: Vec<Box<dyn Rule>>,
    ) -> Self {
        Self {
            kind,
            create_rules,
            update_rules,
        }
    }

    /// Standard chains for `kind`.
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Concept => {
                let chain = || -> Vec<Box<dyn Rule>> {
                    vec![
                        Box::new(RdfType::new(kind.rdf_type())),
                        Box::new(InScheme),
                        Box::new(ValidStatus),
                        Box::new(ReferencedResources::new(openskos::SET, dcmitype::DATASET)),
                        Box::new(ReferencedResources::new(
                            openskos::IN_SKOS_COLLECTION,
                            skos::COLLECTION,
                        )),
                        Box::new(ReferencedResources::new(skos::IN_SCHEME, skos::CONCEPT_SCHEME)),
                        Box::new(TenantExists),
                    ]
                };
                Self::new(kind, chain(), chain())
            }
            ResourceKind::ConceptScheme => {
                let chain = || -> Vec<Box<dyn Rule>> {
                    vec![
                        Box::new(RdfType::new(kind.rdf_type())),
                        Box::new(ReferencedResources::new(openskos::SET, dcmitype::DATASET)),
                        Box::new(TenantExists),
                    ]
                };
                Self::new(kind, chain(), chain())
            }
            ResourceKind::Set => Self::new(
                kind,
                vec![
                    Box::new(RdfType::new(kind.rdf_type())),
                    Box::new(UniqueProperty::required(dcterms::TITLE, kind.rdf_type())),
                    Box::new(UniqueProperty::required(openskos::CODE, kind.rdf_type())),
                    Box::new(TenantExists),
                ],
                vec![
                    Box::new(RdfType::new(kind.rdf_type())),
                    Box::new(UniqueProperty::when_changed(dcterms::TITLE, kind.rdf_type())),
                    Box::new(UniqueProperty::when_changed(openskos::CODE, kind.rdf_type())),
                    Box::new(TenantExists),
                ],
            ),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Run the creation chain.
    pub async fn validate(
        &self,
        resource: &Resource,
        tenant_code: &str,
        store: &dyn ResourceStore,
    ) -> Result<()> {
        let ctx = ValidationContext {
            tenant_code,
            store,
            existing: None,
        };
        self.run(&self.create_rules, resource, &ctx).await
    }

    /// Run the update chain against the stored version.
    pub async fn validate_for_update(
        &self,
        resource: &Resource,
        tenant_code: &str,
        existing: &Resource,
        store: &dyn ResourceStore,
    ) -> Result<()> {
        let ctx = ValidationContext {
            tenant_code,
            store,
            existing: Some(existing),
        };
        self.run(&self.update_rules, resource, &ctx).await
    }

    async fn run(
        &self,
        rules: &[Box<dyn Rule>],
        resource: &Resource,
        ctx: &ValidationContext<'_>,
    ) -> Result<()> {
        let mut violations = Vec::new();
        for rule in rules {
            let found = rule.check(resource, ctx).await?;
            trace!(rule = rule.name(), violation_count = found.len(), "Rule checked");
            violations.extend(found);
        }

        debug!(
            subsystem = "validation",
            resource_kind = %self.kind,
            resource_uri = resource.uri().unwrap_or_default(),
            violation_count = violations.len(),
            "Validation finished"
        );

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(violations))
        }
    }
}
