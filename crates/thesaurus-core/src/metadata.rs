//! System-managed metadata stamped on every create and update.
//!
//! [`ensure_metadata`] is called exactly once per write, after validation
//! and before the resource reaches the store.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::trace;
use uuid::Uuid;

use crate::concept::{status_of, ConceptStatus};
use crate::defaults::DEFAULT_NOTATION_TYPE;
use crate::kind::ResourceKind;
use crate::namespaces::{dc, dcterms, openskos, skos, xsd};
use crate::rdf::{Resource, Term};

/// Inputs of a metadata pass.
#[derive(Debug, Clone)]
pub struct MetadataContext {
    /// Code of the tenant performing the write.
    pub tenant_code: String,
    /// Set the resource is filed under; ignored for sets themselves.
    pub set: Option<String>,
    /// URI of the acting user.
    pub actor: String,
    /// Status before this write, `None` on create.
    pub previous_status: Option<ConceptStatus>,
    /// Timestamp written into every date field of this pass.
    pub now: DateTime<Utc>,
}

impl MetadataContext {
    pub fn new(tenant_code: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            tenant_code: tenant_code.into(),
            set: None,
            actor: actor.into(),
            previous_status: None,
            now: Utc::now(),
        }
    }

    pub fn with_set(mut self, set: Option<impl Into<String>>) -> Self {
        self.set = set.map(Into::into);
        self
    }

    pub fn with_previous_status(mut self, status: Option<ConceptStatus>) -> Self {
        self.previous_status = status;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// `now` as an xsd:dateTime literal.
    pub fn now_literal(&self) -> Term {
        Term::typed_literal(
            self.now.to_rfc3339_opts(SecondsFormat::Millis, true),
            xsd::DATE_TIME,
        )
    }
}

/// Stamp system metadata on `resource` according to its kind.
///
/// First-time fields (uuid, tenant, set, creator, dateSubmitted) are only
/// written when absent. `modified` is always overwritten.
pub fn ensure_metadata(resource: &mut Resource, kind: ResourceKind, ctx: &MetadataContext) {
    let actor = Term::uri(&ctx.actor);

    let mut first_time: Vec<(&str, Term)> = vec![
        (openskos::UUID, Term::literal(Uuid::new_v4().to_string())),
        (openskos::TENANT, Term::literal(&ctx.tenant_code)),
    ];
    if kind.belongs_to_set() {
        if let Some(set) = &ctx.set {
            first_time.push((openskos::SET, Term::uri(set)));
        }
    }
    // A scheme imported with dc:creator keeps it as its only creator.
    if kind != ResourceKind::ConceptScheme || !resource.has_property(dc::CREATOR) {
        first_time.push((dcterms::CREATOR, actor.clone()));
    }
    first_time.push((dcterms::DATE_SUBMITTED, ctx.now_literal()));

    for (property, default) in first_time {
        if !resource.has_property(property) {
            resource.set_property(property, default);
        }
    }

    resource.set_property(dcterms::MODIFIED, ctx.now_literal());

    match kind {
        ResourceKind::ConceptScheme => {
            resource.set_property(openskos::MODIFIED_BY, actor);
        }
        ResourceKind::Concept | ResourceKind::Set => {
            resource.add_unique_property(dcterms::CONTRIBUTOR, actor.clone());
        }
    }

    if kind.has_status() {
        apply_status_transition(resource, ctx);
        type_notations(resource);
    }

    trace!(
        resource_uri = resource.uri().unwrap_or_default(),
        resource_kind = %kind,
        "Metadata ensured"
    );
}

fn apply_status_transition(resource: &mut Resource, ctx: &MetadataContext) {
    let current = status_of(resource);
    if ctx.previous_status == current {
        return;
    }

    for property in [
        dcterms::DATE_ACCEPTED,
        openskos::ACCEPTED_BY,
        openskos::DATE_DELETED,
        openskos::DELETED_BY,
    ] {
        resource.unset_property(property);
    }

    let (date, by) = match current {
        Some(ConceptStatus::Approved) => (dcterms::DATE_ACCEPTED, openskos::ACCEPTED_BY),
        Some(ConceptStatus::Deleted) => (openskos::DATE_DELETED, openskos::DELETED_BY),
        _ => return,
    };
    resource.add_property(date, ctx.now_literal());
    resource.add_property(by, Term::uri(&ctx.actor));
}

fn type_notations(resource: &mut Resource) {
    if let Some(notations) = resource.property_mut(skos::NOTATION) {
        for term in notations.iter_mut() {
            if let Term::Literal(lit) = term {
                if lit.datatype.is_none() {
                    lit.datatype = Some(DEFAULT_NOTATION_TYPE.to_string());
                }
            }
        }
    }
}
