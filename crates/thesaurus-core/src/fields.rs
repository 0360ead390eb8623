//! Short field names accepted by the HTTP surface and their property URIs.

use crate::defaults::{SORT_DATE_PREFIX, SORT_STRING_PREFIX};
use crate::namespaces::{dcterms, openskos, rdf, skos};

/// Short name → property URI.
pub const FIELD_MAP: &[(&str, &str)] = &[
    ("uuid", openskos::UUID),
    ("tenant", openskos::TENANT),
    ("set", openskos::SET),
    ("status", openskos::STATUS),
    ("code", openskos::CODE),
    ("inSkosCollection", openskos::IN_SKOS_COLLECTION),
    ("acceptedBy", openskos::ACCEPTED_BY),
    ("deletedBy", openskos::DELETED_BY),
    ("dateDeleted", openskos::DATE_DELETED),
    ("modifiedBy", openskos::MODIFIED_BY),
    ("type", rdf::TYPE),
    ("prefLabel", skos::PREF_LABEL),
    ("altLabel", skos::ALT_LABEL),
    ("hiddenLabel", skos::HIDDEN_LABEL),
    ("notation", skos::NOTATION),
    ("inScheme", skos::IN_SCHEME),
    ("topConceptOf", skos::TOP_CONCEPT_OF),
    ("hasTopConcept", skos::HAS_TOP_CONCEPT),
    ("broader", skos::BROADER),
    ("narrower", skos::NARROWER),
    ("related", skos::RELATED),
    ("broaderTransitive", skos::BROADER_TRANSITIVE),
    ("narrowerTransitive", skos::NARROWER_TRANSITIVE),
    ("broadMatch", skos::BROAD_MATCH),
    ("narrowMatch", skos::NARROW_MATCH),
    ("closeMatch", skos::CLOSE_MATCH),
    ("exactMatch", skos::EXACT_MATCH),
    ("relatedMatch", skos::RELATED_MATCH),
    ("definition", skos::DEFINITION),
    ("example", skos::EXAMPLE),
    ("note", skos::NOTE),
    ("scopeNote", skos::SCOPE_NOTE),
    ("changeNote", skos::CHANGE_NOTE),
    ("editorialNote", skos::EDITORIAL_NOTE),
    ("historyNote", skos::HISTORY_NOTE),
    ("creator", dcterms::CREATOR),
    ("contributor", dcterms::CONTRIBUTOR),
    ("dateSubmitted", dcterms::DATE_SUBMITTED),
    ("dateAccepted", dcterms::DATE_ACCEPTED),
    ("modified", dcterms::MODIFIED),
    ("title", dcterms::TITLE),
    ("description", dcterms::DESCRIPTION),
];

/// Property URI for a short field name.
pub fn property_for(field: &str) -> Option<&'static str> {
    FIELD_MAP
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, property)| *property)
}

/// Short field name for a property URI.
pub fn field_for(property: &str) -> Option<&'static str> {
    FIELD_MAP
        .iter()
        .find(|(_, p)| *p == property)
        .map(|(name, _)| *name)
}

/// Property and optional language behind an internal sort field.
///
/// Understands `sort_s_<field>`, `sort_d_<field>` and `<field>_<lang>`.
pub fn sort_property(sort_field: &str) -> Option<(&'static str, Option<&str>)> {
    if let Some(field) = sort_field
        .strip_prefix(SORT_STRING_PREFIX)
        .or_else(|| sort_field.strip_prefix(SORT_DATE_PREFIX))
    {
        return property_for(field).map(|p| (p, None));
    }
    let (field, language) = sort_field.rsplit_once('_')?;
    (language.len() == 2)
        .then(|| property_for(field))
        .flatten()
        .map(|p| (p, Some(language)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_directions() {
        assert_eq!(property_for("prefLabel"), Some(skos::PREF_LABEL));
        assert_eq!(field_for(dcterms::MODIFIED), Some("modified"));
        assert_eq!(property_for("skos:prefLabel"), None);
    }

    #[test]
    fn test_sort_property() {
        assert_eq!(sort_property("sort_s_prefLabel"), Some((skos::PREF_LABEL, None)));
        assert_eq!(sort_property("sort_d_modified"), Some((dcterms::MODIFIED, None)));
        assert_eq!(sort_property("prefLabel_nl"), Some((skos::PREF_LABEL, Some("nl"))));
        assert_eq!(sort_property("sort_s_unknown"), None);
        assert_eq!(sort_property("score"), None);
    }

    #[test]
    fn test_field_names_unique() {
        let mut names: Vec<_> = FIELD_MAP.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FIELD_MAP.len());
    }
}
