//! Rule implementations.

use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::concept::ConceptStatus;
use crate::error::Result;
use crate::namespaces::{openskos, org, shorten, skos};
use crate::rdf::{Resource, Term};

/// Short `prefix:local` form for messages, the full URI otherwise.
fn display_name(uri: &str) -> String {
    match shorten(uri) {
        Some((prefix, local)) => format!("{}:{}", prefix, local),
        None => uri.to_string(),
    }
}

/// The resource must carry the expected rdf:type.
pub struct RdfType {
    expected: &'static str,
}

impl RdfType {
    pub fn new(expected: &'static str) -> Self {
        Self { expected }
    }
}

#[async_trait]
impl Rule for RdfType {
    fn name(&self) -> &'static str {
        "RdfType"
    }

    async fn check(&self, resource: &Resource, _ctx: &ValidationContext<'_>) -> Result<Vec<String>> {
        if resource.has_type(self.expected) {
            Ok(vec![])
        } else {
            Ok(vec![format!(
                "The resource must be of type {}.",
                display_name(self.expected)
            )])
        }
    }
}

/// A concept must belong to at least one scheme.
pub struct InScheme;

#[async_trait]
impl Rule for InScheme {
    fn name(&self) -> &'static str {
        "InScheme"
    }

    async fn check(&self, resource: &Resource, _ctx: &ValidationContext<'_>) -> Result<Vec<String>> {
        if resource.is_property_empty(skos::IN_SCHEME) {
            Ok(vec![
                "The concept must be included in at least one scheme.".to_string(),
            ])
        } else {
            Ok(vec![])
        }
    }
}

/// openskos:status, when present, must be a known status.
pub struct ValidStatus;

#[async_trait]
impl Rule for ValidStatus {
    fn name(&self) -> &'static str {
        "ValidStatus"
    }

    async fn check(&self, resource: &Resource, _ctx: &ValidationContext<'_>) -> Result<Vec<String>> {
        let values = resource.get_property(openskos::STATUS);
        if values.len() > 1 {
            return Ok(vec!["The concept can have only one status.".to_string()]);
        }
        Ok(values
            .iter()
            .filter(|term| term.value().parse::<ConceptStatus>().is_err())
            .map(|term| format!("The status \"{}\" is not valid.", term.value()))
            .collect())
    }
}

/// Every value of `property` must reference an existing resource of `expected_type`.
pub struct ReferencedResources {
    property: &'static str,
    expected_type: &'static str,
}

impl ReferencedResources {
    pub fn new(property: &'static str, expected_type: &'static str) -> Self {
        Self {
            property,
            expected_type,
        }
    }
}

#[async_trait]
impl Rule for ReferencedResources {
    fn name(&self) -> &'static str {
        "ReferencedResources"
    }

    async fn check(&self, resource: &Resource, ctx: &ValidationContext<'_>) -> Result<Vec<String>> {
        let mut violations = Vec::new();
        for term in resource.get_property(self.property) {
            let Some(uri) = term.as_uri() else {
                violations.push(format!(
                    "The value \"{}\" of {} must be a uri.",
                    term.value(),
                    display_name(self.property)
                ));
                continue;
            };

            let resolved = ctx
                .store
                .fetch_by_uri(uri)
                .await?
                .is_some_and(|target| target.has_type(self.expected_type));
            if !resolved {
                violations.push(format!(
                    "The resource <{}> referenced by {} was not found as {}.",
                    uri,
                    display_name(self.property),
                    display_name(self.expected_type)
                ));
            }
        }
        Ok(violations)
    }
}

/// The owning tenant must resolve to exactly one organization record.
///
/// The resource's own openskos:tenant wins over the tenant declared by the
/// request.
pub struct TenantExists;

#[async_trait]
impl Rule for TenantExists {
    fn name(&self) -> &'static str {
        "TenantExists"
    }

    async fn check(&self, resource: &Resource, ctx: &ValidationContext<'_>) -> Result<Vec<String>> {
        let code = resource.tenant().unwrap_or(ctx.tenant_code);
        if code.is_empty() {
            return Ok(vec!["No tenant specified.".to_string()]);
        }

        let matches = ctx
            .store
            .fetch_subjects_with_property(
                openskos::CODE,
                &Term::literal(code),
                org::FORMAL_ORGANIZATION,
            )
            .await?;
        match matches.len() {
            1 => Ok(vec![]),
            0 => Ok(vec![format!("No tenant found with code \"{}\".", code)]),
            n => Ok(vec![format!(
                "Found {} tenants with code \"{}\", expected exactly one.",
                n, code
            )]),
        }
    }
}

/// `property` is required and its values unique among resources of `rdf_type`.
///
/// In `when_changed` mode the check is skipped while the values equal those
/// of the stored version.
pub struct UniqueProperty {
    property: &'static str,
    rdf_type: &'static str,
    only_when_changed: bool,
}

impl UniqueProperty {
    pub fn required(property: &'static str, rdf_type: &'static str) -> Self {
        Self {
            property,
            rdf_type,
            only_when_changed: false,
        }
    }

    pub fn when_changed(property: &'static str, rdf_type: &'static str) -> Self {
        Self {
            property,
            rdf_type,
            only_when_changed: true,
        }
    }
}

#[async_trait]
impl Rule for UniqueProperty {
    fn name(&self) -> &'static str {
        if self.only_when_changed {
            "ChangedUniqueProperty"
        } else {
            "RequiredUniqueProperty"
        }
    }

    async fn check(&self, resource: &Resource, ctx: &ValidationContext<'_>) -> Result<Vec<String>> {
        let values = resource.get_property(self.property);

        if self.only_when_changed {
            if let Some(existing) = ctx.existing {
                if existing.get_property(self.property) == values {
                    return Ok(vec![]);
                }
            }
        }

        if values.is_empty() {
            return Ok(vec![format!(
                "The property {} is required.",
                display_name(self.property)
            )]);
        }

        let mut violations = Vec::new();
        for value in values {
            let clash = ctx
                .store
                .fetch_subjects_with_property(self.property, value, self.rdf_type)
                .await?
                .iter()
                .any(|other| other.uri() != resource.uri());
            if clash {
                violations.push(format!(
                    "A resource with {} \"{}\" already exists.",
                    display_name(self.property),
                    value.value()
                ));
            }
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::dcterms;
    use crate::validation::test_store::VecStore;

    #[test]
    fn test_display_name_shortens_known_namespaces() {
        assert_eq!(display_name(skos::IN_SCHEME), "skos:inScheme");
        assert_eq!(display_name("http://unknown/x"), "http://unknown/x");
    }

    #[tokio::test]
    async fn test_literal_reference_is_violation() {
        let store = VecStore::default();
        let ctx = ValidationContext {
            tenant_code: "beng",
            store: &store,
            existing: None,
        };
        let mut r = Resource::new("http://x/1");
        r.add_property(skos::IN_SCHEME, Term::literal("scheme"));

        let rule = ReferencedResources::new(skos::IN_SCHEME, skos::CONCEPT_SCHEME);
        let found = rule.check(&r, &ctx).await.unwrap();
        assert_eq!(found, vec!["The value \"scheme\" of skos:inScheme must be a uri."]);
    }

    #[tokio::test]
    async fn test_reference_of_wrong_type_is_violation() {
        let target = Resource::new("http://x/scheme");
        let store = VecStore::with(vec![target]);
        let ctx = ValidationContext {
            tenant_code: "beng",
            store: &store,
            existing: None,
        };
        let mut r = Resource::new("http://x/1");
        r.add_property(skos::IN_SCHEME, Term::uri("http://x/scheme"));

        let rule = ReferencedResources::new(skos::IN_SCHEME, skos::CONCEPT_SCHEME);
        let found = rule.check(&r, &ctx).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("skos:ConceptScheme"));
    }

    #[tokio::test]
    async fn test_duplicate_tenant_records_rejected() {
        let org_record = |uri: &str| {
            let mut r = Resource::new(uri);
            r.add_property(crate::namespaces::rdf::TYPE, Term::uri(org::FORMAL_ORGANIZATION));
            r.add_property(openskos::CODE, Term::literal("beng"));
            r
        };
        let store = VecStore::with(vec![org_record("http://x/t1"), org_record("http://x/t2")]);
        let ctx = ValidationContext {
            tenant_code: "beng",
            store: &store,
            existing: None,
        };

        let found = TenantExists.check(&Resource::new("http://x/1"), &ctx).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("Found 2 tenants"));
    }

    #[tokio::test]
    async fn test_unique_property_ignores_own_uri() {
        let mut own = Resource::new("http://x/set");
        own.add_property(crate::namespaces::rdf::TYPE, Term::uri("http://t"));
        own.add_property(dcterms::TITLE, Term::literal("Title"));
        let store = VecStore::with(vec![own.clone()]);
        let ctx = ValidationContext {
            tenant_code: "beng",
            store: &store,
            existing: None,
        };

        let rule = UniqueProperty::required(dcterms::TITLE, "http://t");
        assert!(rule.check(&own, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changed_property_cleared_is_required() {
        let mut existing = Resource::new("http://x/set");
        existing.add_property(openskos::CODE, Term::literal("a"));
        let store = VecStore::default();
        let ctx = ValidationContext {
            tenant_code: "beng",
            store: &store,
            existing: Some(&existing),
        };

        let cleared = Resource::new("http://x/set");
        let rule = UniqueProperty::when_changed(openskos::CODE, "http://t");
        let found = rule.check(&cleared, &ctx).await.unwrap();
        assert_eq!(found, vec!["The property openskos:code is required."]);
    }
}
