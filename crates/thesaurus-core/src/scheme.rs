//! Concept schemes and sets.

use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::kind::ResourceKind;
use crate::namespaces::{dcterms, openskos, rdf};
use crate::rdf::{Resource, Term};

macro_rules! typed_resource {
    ($name:ident, $kind:expr) => {
        impl $name {
            pub const TYPE: &'static str = $kind.rdf_type();

            /// Create the resource, blank when `uri` is `None`.
            pub fn new(uri: Option<&str>) -> Self {
                let resource = match uri {
                    Some(uri) => Resource::new(uri),
                    None => Resource::blank(),
                };
                Self::from_resource(resource)
            }

            /// Wrap an existing resource, adding the rdf:type when missing.
            pub fn from_resource(mut resource: Resource) -> Self {
                resource.add_unique_property(rdf::TYPE, Term::uri(Self::TYPE));
                Self(resource)
            }

            pub fn into_resource(self) -> Resource {
                self.0
            }

            /// Title in `language`, falling back to the untagged title.
            pub fn caption(&self, language: Option<&str>) -> Result<String> {
                $kind.caption(&self.0, language)
            }
        }

        impl Deref for $name {
            type Target = Resource;

            fn deref(&self) -> &Resource {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Resource {
                &mut self.0
            }
        }

        impl From<$name> for Resource {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

/// A named grouping of concepts.
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptScheme(Resource);

typed_resource!(ConceptScheme, ResourceKind::ConceptScheme);

impl ConceptScheme {
    /// URI of the set the scheme belongs to.
    pub fn set(&self) -> Option<&str> {
        self.0.set_reference()
    }
}

/// A tenant-owned dataset grouping schemes and concepts.
#[derive(Debug, Clone, PartialEq)]
pub struct Set(Resource);

typed_resource!(Set, ResourceKind::Set);

impl Set {
    /// Unique short code of the set.
    pub fn code(&self) -> Option<&str> {
        self.0
            .get_property_single_value(openskos::CODE)
            .map(Term::value)
    }

    pub fn title(&self) -> Option<&str> {
        self.0
            .get_property_single_value(dcterms::TITLE)
            .map(Term::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::{dcmitype, skos};

    #[test]
    fn test_scheme_type_and_set() {
        let mut scheme = ConceptScheme::new(Some("http://x/scheme"));
        assert!(scheme.has_type(skos::CONCEPT_SCHEME));
        assert_eq!(scheme.set(), None);

        scheme.add_property(openskos::SET, Term::uri("http://x/set"));
        assert_eq!(scheme.set(), Some("http://x/set"));
    }

    #[test]
    fn test_set_code_and_title() {
        let mut set = Set::new(None);
        assert!(set.has_type(dcmitype::DATASET));
        set.add_property(openskos::CODE, Term::literal("gtaa"));
        set.add_property(dcterms::TITLE, Term::literal("GTAA"));
        assert_eq!(set.code(), Some("gtaa"));
        assert_eq!(set.title(), Some("GTAA"));
        assert_eq!(set.caption(None).unwrap(), "GTAA");
    }
}
