//! Resource kinds served by the API.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::namespaces::{dcmitype, dcterms, skos};
use crate::rdf::Resource;

/// Kind of resource managed by a resource API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Concept,
    ConceptScheme,
    Set,
}

impl ResourceKind {
    /// rdf:type every resource of this kind carries.
    pub const fn rdf_type(&self) -> &'static str {
        match self {
            Self::Concept => skos::CONCEPT,
            Self::ConceptScheme => skos::CONCEPT_SCHEME,
            Self::Set => dcmitype::DATASET,
        }
    }

    /// Path segment under `/api`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::ConceptScheme => "conceptscheme",
            Self::Set => "set",
        }
    }

    /// Whether the kind carries the openskos:status workflow.
    pub fn has_status(&self) -> bool {
        matches!(self, Self::Concept)
    }

    /// Whether resources of this kind belong to a set.
    pub fn belongs_to_set(&self) -> bool {
        !matches!(self, Self::Set)
    }

    /// Property holding the human-readable caption.
    pub fn caption_property(&self) -> &'static str {
        match self {
            Self::Concept => skos::PREF_LABEL,
            Self::ConceptScheme | Self::Set => dcterms::TITLE,
        }
    }

    /// Caption of `resource` in `language`, falling back to the untagged value.
    pub fn caption(&self, resource: &Resource, language: Option<&str>) -> Result<String> {
        let property = self.caption_property();
        if resource.has_property_in_language(property, language) {
            resource.get_property_flat_value(property, language)
        } else {
            resource.get_property_flat_value(property, None)
        }
    }

    /// Kind of a resource judged by its rdf:type.
    pub fn of(resource: &Resource) -> Option<ResourceKind> {
        [Self::Concept, Self::ConceptScheme, Self::Set]
            .into_iter()
            .find(|kind| resource.has_type(kind.rdf_type()))
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "concept" => Ok(Self::Concept),
            "conceptscheme" => Ok(Self::ConceptScheme),
            "set" => Ok(Self::Set),
            _ => Err(format!("Unknown resource kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::Concept;
    use crate::rdf::Term;
    use crate::scheme::{ConceptScheme, Set};

    #[test]
    fn test_kind_of_resource() {
        assert_eq!(
            ResourceKind::of(&Concept::new(Some("http://x/c"))),
            Some(ResourceKind::Concept)
        );
        assert_eq!(
            ResourceKind::of(&ConceptScheme::new(Some("http://x/s"))),
            Some(ResourceKind::ConceptScheme)
        );
        assert_eq!(
            ResourceKind::of(&Set::new(Some("http://x/set"))),
            Some(ResourceKind::Set)
        );
        assert_eq!(ResourceKind::of(&Resource::new("http://x/r")), None);
    }

    #[test]
    fn test_caption_uses_title_for_sets() {
        let mut set = Set::new(Some("http://x/set"));
        set.add_property(dcterms::TITLE, Term::lang_literal("Beeld", "nl"));
        assert_eq!(
            ResourceKind::Set.caption(&set, Some("en")).unwrap(),
            "Beeld"
        );
    }

    #[test]
    fn test_path_segment_parses_back() {
        for kind in [
            ResourceKind::Concept,
            ResourceKind::ConceptScheme,
            ResourceKind::Set,
        ] {
            assert_eq!(kind.path_segment().parse::<ResourceKind>().unwrap(), kind);
        }
    }
}
