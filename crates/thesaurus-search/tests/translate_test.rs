//! Query translation through the public API, as the find endpoint uses it.

use std::collections::HashMap;

use thesaurus_core::namespaces::skos;
use thesaurus_core::{ConceptStatus, Error, SortOrder};
use thesaurus_search::translate_search_params;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_rows_bound() {
    let cases = [
        ("5000", 20),
        ("1001", 20),
        ("1000", 1000),
        ("999", 999),
        ("ten", 20),
    ];
    for (requested, expected) in cases {
        let options = translate_search_params(&params(&[("rows", requested)])).unwrap();
        assert_eq!(options.rows, expected, "rows={}", requested);
    }
}

#[test]
fn test_full_query_string() {
    let options = translate_search_params(&params(&[
        ("q", "fiets"),
        ("start", "-5"),
        ("sorts", "dateAccepted desc prefLabel"),
        ("conceptScheme", "http://a.example/s1 http://a.example/s2"),
        ("status", "approved candidate"),
        ("fl", "uri,prefLabel"),
    ]))
    .unwrap();

    assert_eq!(options.start, 0);
    assert!(options.direct_query);
    assert_eq!(options.search_text.as_deref(), Some("fiets"));

    let sorts: Vec<(&str, SortOrder)> = options.sorts.as_ref().unwrap().iter().collect();
    assert_eq!(
        sorts,
        vec![
            ("sort_d_dateAccepted", SortOrder::Desc),
            ("sort_s_prefLabel", SortOrder::Asc),
        ]
    );

    assert_eq!(options.concept_scheme.as_ref().map(Vec::len), Some(2));
    assert_eq!(
        options.status,
        Some(vec![ConceptStatus::Approved, ConceptStatus::Candidate])
    );

    let fields = options.fields.unwrap();
    assert!(fields.include_uri);
    assert_eq!(fields.properties, vec![skos::PREF_LABEL.to_string()]);

    assert!(options.tenants.is_none());
    assert!(options.sets.is_none());
}

#[test]
fn test_tenants_override_tenant() {
    let options =
        translate_search_params(&params(&[("tenant", "beng"), ("tenants", "a b")])).unwrap();
    assert_eq!(options.tenants, Some(vec!["a".to_string(), "b".to_string()]));
}

#[test]
fn test_rejections() {
    let err = translate_search_params(&params(&[("tenant", "")])).unwrap_err();
    assert_eq!(err.status_code(), 412);

    let err = translate_search_params(&params(&[("status", "pending")])).unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = translate_search_params(&params(&[("fl", "uri,bogus")])).unwrap_err();
    assert!(matches!(err, Error::InvalidField(_)));
    assert!(err.message().contains("bogus"));
}
