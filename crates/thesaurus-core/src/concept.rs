//! SKOS concepts: status workflow, property classes and the typed wrapper.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::namespaces::{openskos, rdf, skos};
use crate::rdf::{Resource, Term};

// =============================================================================
// STATUS
// =============================================================================

/// Workflow status of a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConceptStatus {
    /// Proposed but not yet approved.
    #[default]
    Candidate,
    Approved,
    /// Superseded by another concept.
    Redirected,
    NotCompliant,
    Rejected,
    Obsolete,
    /// Soft-deleted; hidden from normal retrieval.
    Deleted,
}

impl ConceptStatus {
    pub const ALL: [ConceptStatus; 7] = [
        Self::Candidate,
        Self::Approved,
        Self::Redirected,
        Self::NotCompliant,
        Self::Rejected,
        Self::Obsolete,
        Self::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Approved => "approved",
            Self::Redirected => "redirected",
            Self::NotCompliant => "not_compliant",
            Self::Rejected => "rejected",
            Self::Obsolete => "obsolete",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ConceptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConceptStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid concept status: {}", s))
    }
}

// =============================================================================
// PROPERTY CLASSES
// =============================================================================

/// Semantic grouping of SKOS properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyClass {
    ConceptSchemes,
    LexicalLabels,
    Notations,
    DocumentationProperties,
    SemanticRelations,
    ConceptCollections,
    MappingProperties,
}

pub const CONCEPT_SCHEMES: &[&str] = &[
    skos::CONCEPT_SCHEME,
    skos::IN_SCHEME,
    skos::HAS_TOP_CONCEPT,
    skos::TOP_CONCEPT_OF,
];

pub const LEXICAL_LABELS: &[&str] = &[skos::ALT_LABEL, skos::HIDDEN_LABEL, skos::PREF_LABEL];

pub const NOTATIONS: &[&str] = &[skos::NOTATION];

pub const DOCUMENTATION_PROPERTIES: &[&str] = &[
    skos::CHANGE_NOTE,
    skos::DEFINITION,
    skos::EDITORIAL_NOTE,
    skos::EXAMPLE,
    skos::HISTORY_NOTE,
    skos::NOTE,
    skos::SCOPE_NOTE,
];

pub const SEMANTIC_RELATIONS: &[&str] = &[
    skos::BROADER,
    skos::BROADER_TRANSITIVE,
    skos::NARROWER,
    skos::NARROWER_TRANSITIVE,
    skos::RELATED,
    skos::SEMANTIC_RELATION,
];

pub const CONCEPT_COLLECTIONS: &[&str] = &[
    skos::COLLECTION,
    skos::ORDERED_COLLECTION,
    skos::MEMBER,
    skos::MEMBER_LIST,
];

pub const MAPPING_PROPERTIES: &[&str] = &[
    skos::BROAD_MATCH,
    skos::CLOSE_MATCH,
    skos::EXACT_MATCH,
    skos::MAPPING_RELATION,
    skos::NARROW_MATCH,
    skos::RELATED_MATCH,
];

impl PropertyClass {
    pub const ALL: [PropertyClass; 7] = [
        Self::ConceptSchemes,
        Self::LexicalLabels,
        Self::Notations,
        Self::DocumentationProperties,
        Self::SemanticRelations,
        Self::ConceptCollections,
        Self::MappingProperties,
    ];

    pub fn properties(&self) -> &'static [&'static str] {
        match self {
            Self::ConceptSchemes => CONCEPT_SCHEMES,
            Self::LexicalLabels => LEXICAL_LABELS,
            Self::Notations => NOTATIONS,
            Self::DocumentationProperties => DOCUMENTATION_PROPERTIES,
            Self::SemanticRelations => SEMANTIC_RELATIONS,
            Self::ConceptCollections => CONCEPT_COLLECTIONS,
            Self::MappingProperties => MAPPING_PROPERTIES,
        }
    }

    /// Class a property URI belongs to, if any.
    pub fn of(property: &str) -> Option<PropertyClass> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.properties().contains(&property))
    }
}

// =============================================================================
// CONCEPT
// =============================================================================

/// A thesaurus term. Always carries rdf:type skos:Concept.
#[derive(Debug, Clone, PartialEq)]
pub struct Concept(Resource);

impl Concept {
    pub const TYPE: &'static str = skos::CONCEPT;

    /// Create a concept, blank when `uri` is `None`.
    pub fn new(uri: Option<&str>) -> Self {
        let mut resource = match uri {
            Some(uri) => Resource::new(uri),
            None => Resource::blank(),
        };
        resource.add_unique_property(rdf::TYPE, Term::uri(Self::TYPE));
        Self(resource)
    }

    /// Wrap an existing resource, adding the concept type when missing.
    pub fn from_resource(mut resource: Resource) -> Self {
        resource.add_unique_property(rdf::TYPE, Term::uri(Self::TYPE));
        Self(resource)
    }

    pub fn into_resource(self) -> Resource {
        self.0
    }

    pub fn status(&self) -> Option<ConceptStatus> {
        status_of(&self.0)
    }

    pub fn set_status(&mut self, status: ConceptStatus) {
        self.0
            .set_property(openskos::STATUS, Term::literal(status.as_str()));
    }

    pub fn is_deleted(&self) -> bool {
        self.status() == Some(ConceptStatus::Deleted)
    }

    /// Preferred label in `language`, falling back to the untagged label.
    pub fn caption(&self, language: Option<&str>) -> Result<String> {
        if self.0.has_property_in_language(skos::PREF_LABEL, language) {
            self.0.get_property_flat_value(skos::PREF_LABEL, language)
        } else {
            self.0.get_property_flat_value(skos::PREF_LABEL, None)
        }
    }

    pub fn is_top_concept_of(&self, scheme_uri: &str) -> bool {
        self.0
            .get_property(skos::TOP_CONCEPT_OF)
            .iter()
            .any(|term| term.value() == scheme_uri)
    }

    /// Whether any semantic or mapping relation is set.
    pub fn has_any_relations(&self) -> bool {
        SEMANTIC_RELATIONS
            .iter()
            .chain(MAPPING_PROPERTIES)
            .any(|property| !self.0.is_property_empty(property))
    }
}

impl Deref for Concept {
    type Target = Resource;

    fn deref(&self) -> &Resource {
        &self.0
    }
}

impl DerefMut for Concept {
    fn deref_mut(&mut self) -> &mut Resource {
        &mut self.0
    }
}

impl From<Concept> for Resource {
    fn from(concept: Concept) -> Self {
        concept.0
    }
}

/// Parsed openskos:status of any resource; `None` when unset or unknown.
pub fn status_of(resource: &Resource) -> Option<ConceptStatus> {
    resource
        .get_property_single_value(openskos::STATUS)
        .and_then(|term| term.value().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_strings() {
        for status in ConceptStatus::ALL {
            assert_eq!(status.as_str().parse::<ConceptStatus>().unwrap(), status);
        }
        assert!("pending".parse::<ConceptStatus>().is_err());
        assert_eq!(
            serde_json::to_value(ConceptStatus::NotCompliant).unwrap(),
            serde_json::json!("not_compliant")
        );
    }

    #[test]
    fn test_new_concept_has_type() {
        let c = Concept::new(None);
        assert!(c.is_blank());
        assert!(c.has_type(skos::CONCEPT));
        assert_eq!(c.get_property(rdf::TYPE).len(), 1);
    }

    #[test]
    fn test_from_resource_does_not_duplicate_type() {
        let c = Concept::from_resource(Concept::new(Some("http://x/1")).into_resource());
        assert_eq!(c.get_property(rdf::TYPE).len(), 1);
    }

    #[test]
    fn test_is_deleted() {
        let mut c = Concept::new(Some("http://x/1"));
        assert_eq!(c.status(), None);
        assert!(!c.is_deleted());
        c.set_status(ConceptStatus::Deleted);
        assert!(c.is_deleted());
    }

    #[test]
    fn test_caption_language_fallback() {
        let mut c = Concept::new(Some("http://x/1"));
        c.add_property(skos::PREF_LABEL, Term::literal("plain"));
        c.add_property(skos::PREF_LABEL, Term::lang_literal("Fiets", "nl"));

        assert_eq!(c.caption(Some("nl")).unwrap(), "Fiets");
        assert_eq!(c.caption(Some("fr")).unwrap(), "plain");
        assert_eq!(c.caption(None).unwrap(), "plain");
    }

    #[test]
    fn test_is_top_concept_of() {
        let mut c = Concept::new(Some("http://x/1"));
        assert!(!c.is_top_concept_of("http://x/scheme"));
        c.add_property(skos::TOP_CONCEPT_OF, Term::uri("http://x/scheme"));
        assert!(c.is_top_concept_of("http://x/scheme"));
        assert!(!c.is_top_concept_of("http://x/other"));
    }

    #[test]
    fn test_has_any_relations() {
        let mut c = Concept::new(Some("http://x/1"));
        c.add_property(skos::IN_SCHEME, Term::uri("http://x/scheme"));
        assert!(!c.has_any_relations());

        c.add_property(skos::EXACT_MATCH, Term::uri("http://y/1"));
        assert!(c.has_any_relations());
    }

    #[test]
    fn test_property_class_lookup() {
        assert_eq!(
            PropertyClass::of(skos::BROADER),
            Some(PropertyClass::SemanticRelations)
        );
        assert_eq!(
            PropertyClass::of(skos::SCOPE_NOTE),
            Some(PropertyClass::DocumentationProperties)
        );
        assert_eq!(PropertyClass::of(openskos::STATUS), None);
    }
}
