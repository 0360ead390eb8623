//! RDF vocabulary constants and namespace prefix handling.
//!
//! Constants are grouped by vocabulary. The prefix table drives both
//! expansion of short property names (`skos:prefLabel`) coming from request
//! parameters and qualified-name generation in the RDF/XML writer.

/// RDF vocabulary
pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// SKOS core vocabulary
pub mod skos {
    pub const NS: &str = "http://www.w3.org/2004/02/skos/core#";

    pub const CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
    pub const CONCEPT_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";
    pub const COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#Collection";
    pub const ORDERED_COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#OrderedCollection";

    pub const IN_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#inScheme";
    pub const HAS_TOP_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#hasTopConcept";
    pub const TOP_CONCEPT_OF: &str = "http://www.w3.org/2004/02/skos/core#topConceptOf";

    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
    pub const ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
    pub const HIDDEN_LABEL: &str = "http://www.w3.org/2004/02/skos/core#hiddenLabel";

    pub const NOTATION: &str = "http://www.w3.org/2004/02/skos/core#notation";

    pub const CHANGE_NOTE: &str = "http://www.w3.org/2004/02/skos/core#changeNote";
    pub const DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
    pub const EDITORIAL_NOTE: &str = "http://www.w3.org/2004/02/skos/core#editorialNote";
    pub const EXAMPLE: &str = "http://www.w3.org/2004/02/skos/core#example";
    pub const HISTORY_NOTE: &str = "http://www.w3.org/2004/02/skos/core#historyNote";
    pub const NOTE: &str = "http://www.w3.org/2004/02/skos/core#note";
    pub const SCOPE_NOTE: &str = "http://www.w3.org/2004/02/skos/core#scopeNote";

    pub const BROADER: &str = "http://www.w3.org/2004/02/skos/core#broader";
    pub const BROADER_TRANSITIVE: &str = "http://www.w3.org/2004/02/skos/core#broaderTransitive";
    pub const NARROWER: &str = "http://www.w3.org/2004/02/skos/core#narrower";
    pub const NARROWER_TRANSITIVE: &str =
        "http://www.w3.org/2004/02/skos/core#narrowerTransitive";
    pub const RELATED: &str = "http://www.w3.org/2004/02/skos/core#related";
    pub const SEMANTIC_RELATION: &str = "http://www.w3.org/2004/02/skos/core#semanticRelation";

    pub const MEMBER: &str = "http://www.w3.org/2004/02/skos/core#member";
    pub const MEMBER_LIST: &str = "http://www.w3.org/2004/02/skos/core#memberList";

    pub const BROAD_MATCH: &str = "http://www.w3.org/2004/02/skos/core#broadMatch";
    pub const CLOSE_MATCH: &str = "http://www.w3.org/2004/02/skos/core#closeMatch";
    pub const EXACT_MATCH: &str = "http://www.w3.org/2004/02/skos/core#exactMatch";
    pub const MAPPING_RELATION: &str = "http://www.w3.org/2004/02/skos/core#mappingRelation";
    pub const NARROW_MATCH: &str = "http://www.w3.org/2004/02/skos/core#narrowMatch";
    pub const RELATED_MATCH: &str = "http://www.w3.org/2004/02/skos/core#relatedMatch";
}

/// OpenSKOS system vocabulary
pub mod openskos {
    pub const NS: &str = "http://openskos.org/xmlns#";

    pub const UUID: &str = "http://openskos.org/xmlns#uuid";
    pub const TENANT: &str = "http://openskos.org/xmlns#tenant";
    pub const SET: &str = "http://openskos.org/xmlns#set";
    pub const STATUS: &str = "http://openskos.org/xmlns#status";
    pub const CODE: &str = "http://openskos.org/xmlns#code";
    pub const IN_SKOS_COLLECTION: &str = "http://openskos.org/xmlns#inSkosCollection";
    pub const ACCEPTED_BY: &str = "http://openskos.org/xmlns#acceptedBy";
    pub const DELETED_BY: &str = "http://openskos.org/xmlns#deletedBy";
    pub const DATE_DELETED: &str = "http://openskos.org/xmlns#dateDeleted";
    pub const MODIFIED_BY: &str = "http://openskos.org/xmlns#modifiedBy";
}

/// Dublin Core terms
pub mod dcterms {
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const CONTRIBUTOR: &str = "http://purl.org/dc/terms/contributor";
    pub const DATE_SUBMITTED: &str = "http://purl.org/dc/terms/dateSubmitted";
    pub const DATE_ACCEPTED: &str = "http://purl.org/dc/terms/dateAccepted";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const PUBLISHER: &str = "http://purl.org/dc/terms/publisher";
}

/// Dublin Core elements
pub mod dc {
    pub const NS: &str = "http://purl.org/dc/elements/1.1/";

    pub const CREATOR: &str = "http://purl.org/dc/elements/1.1/creator";
}

/// DCMI type vocabulary
pub mod dcmitype {
    pub const NS: &str = "http://purl.org/dc/dcmitype/";

    pub const DATASET: &str = "http://purl.org/dc/dcmitype/Dataset";
}

/// W3C organization ontology
pub mod org {
    pub const NS: &str = "http://www.w3.org/ns/org#";

    pub const FORMAL_ORGANIZATION: &str = "http://www.w3.org/ns/org#FormalOrganization";
}

/// XSD datatypes
pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// Known prefix → namespace pairs.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", rdf::NS),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("skos", skos::NS),
    ("skosxl", "http://www.w3.org/2008/05/skos-xl#"),
    ("openskos", openskos::NS),
    ("dcterms", dcterms::NS),
    ("dc", dc::NS),
    ("dcmitype", dcmitype::NS),
    ("org", org::NS),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", xsd::NS),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("vcard", "http://www.w3.org/2006/vcard/ns#"),
];

/// Namespace URI registered for `prefix`.
pub fn namespace_for(prefix: &str) -> Option<&'static str> {
    PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| *ns)
}

/// Expand a `prefix:local` property name to its full URI.
///
/// Unknown prefixes and tokens without a prefix are returned unchanged.
pub fn expand_property(short: &str) -> String {
    if let Some((prefix, local)) = short.split_once(':') {
        if let Some(ns) = namespace_for(prefix) {
            return format!("{}{}", ns, local);
        }
    }
    short.to_string()
}

/// Split a URI into a registered `(prefix, local)` pair.
///
/// The longest matching namespace wins; `None` when no namespace matches
/// or the local part is empty.
pub fn shorten(uri: &str) -> Option<(&'static str, &str)> {
    PREFIXES
        .iter()
        .filter(|(_, ns)| uri.starts_with(ns))
        .max_by_key(|(_, ns)| ns.len())
        .and_then(|(prefix, ns)| {
            let local = &uri[ns.len()..];
            (!local.is_empty()).then_some((*prefix, local))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_prefix() {
        assert_eq!(expand_property("skos:prefLabel"), skos::PREF_LABEL);
        assert_eq!(expand_property("dcterms:title"), dcterms::TITLE);
    }

    #[test]
    fn test_expand_unknown_prefix_passes_through() {
        assert_eq!(expand_property("foo:bar"), "foo:bar");
        assert_eq!(expand_property("prefLabel"), "prefLabel");
    }

    #[test]
    fn test_expand_full_uri_unchanged() {
        // "http" is not a registered prefix
        assert_eq!(expand_property(skos::NOTATION), skos::NOTATION);
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten(skos::PREF_LABEL), Some(("skos", "prefLabel")));
        assert_eq!(shorten(dc::CREATOR), Some(("dc", "creator")));
        assert_eq!(shorten("http://example.com/x"), None);
        assert_eq!(shorten(skos::NS), None);
    }
}
