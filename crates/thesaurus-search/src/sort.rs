//! Sort specification parsing.
//!
//! A sort string alternates field names and optional `asc`/`desc` tokens:
//! `"dateAccepted desc prefLabel@nl"`. Field names are mapped to the
//! internal sort fields of the index.

use thesaurus_core::defaults::{
    DATE_SORT_FIELDS, SORT_DATE_PREFIX, SORT_INTERNAL_PREFIX, SORT_STRING_PREFIX,
};
use thesaurus_core::{SortOrder, SortSpec};

/// Parse a space-delimited sort string.
///
/// A field token is always consumed; the next token is taken as its order
/// only when it is exactly `asc` or `desc`. The last token, when it is a
/// field, sorts ascending. Later duplicates overwrite earlier ones.
pub fn parse_sorts(input: &str) -> SortSpec {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let mut spec = SortSpec::new();
    let Some(last) = tokens.last() else {
        return spec;
    };

    let len = tokens.len();
    let mut i = 0;
    // The last token is handled after the loop.
    while i + 1 < len {
        let field = sort_field(tokens[i]);
        i += 1;
        let order = match SortOrder::from_token(tokens[i]) {
            Some(order) => {
                i += 1;
                order
            }
            None => SortOrder::Asc,
        };
        spec.insert(field, order);
    }

    if SortOrder::from_token(last).is_none() {
        spec.insert(sort_field(last), SortOrder::Asc);
    }

    spec
}

/// Internal sort field for a user-facing field name.
///
/// Names already internal (`sort_*` or ending in `_xx` language suffix)
/// pass through. Date fields get the date prefix, `field@lang` becomes
/// `field_lang`, and anything else gets the string prefix.
pub fn sort_field(term: &str) -> String {
    if term.starts_with(SORT_INTERNAL_PREFIX) || has_language_suffix(term) {
        return term.to_string();
    }
    if DATE_SORT_FIELDS.contains(&term) {
        return format!("{}{}", SORT_DATE_PREFIX, term);
    }
    if term.contains('@') {
        return term.replace('@', "_");
    }
    format!("{}{}", SORT_STRING_PREFIX, term)
}

/// Third character from the end is `_`, as in `prefLabel_nl`.
fn has_language_suffix(term: &str) -> bool {
    let bytes = term.as_bytes();
    bytes.len() >= 3 && bytes[bytes.len() - 3] == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(spec: &SortSpec) -> Vec<(String, SortOrder)> {
        spec.iter().map(|(f, o)| (f.to_string(), o)).collect()
    }

    #[test]
    fn test_date_field_with_order_then_bare_field() {
        let spec = parse_sorts("dateAccepted desc prefLabel");
        assert_eq!(
            pairs(&spec),
            vec![
                ("sort_d_dateAccepted".to_string(), SortOrder::Desc),
                ("sort_s_prefLabel".to_string(), SortOrder::Asc),
            ]
        );
    }

    #[test]
    fn test_language_marker_replaced() {
        let spec = parse_sorts("prefLabel@nl");
        assert_eq!(pairs(&spec), vec![("prefLabel_nl".to_string(), SortOrder::Asc)]);
    }

    #[test]
    fn test_consecutive_fields_default_to_asc() {
        let spec = parse_sorts("notation prefLabel desc");
        assert_eq!(
            pairs(&spec),
            vec![
                ("sort_s_notation".to_string(), SortOrder::Asc),
                ("sort_s_prefLabel".to_string(), SortOrder::Desc),
            ]
        );
    }

    #[test]
    fn test_internal_names_pass_through() {
        assert_eq!(sort_field("sort_s_prefLabel"), "sort_s_prefLabel");
        assert_eq!(sort_field("prefLabel_nl"), "prefLabel_nl");
        assert_eq!(sort_field("modified"), "sort_d_modified");
    }

    #[test]
    fn test_duplicate_field_overwrites() {
        let spec = parse_sorts("modified asc prefLabel modified desc");
        assert_eq!(
            pairs(&spec),
            vec![
                ("sort_d_modified".to_string(), SortOrder::Desc),
                ("sort_s_prefLabel".to_string(), SortOrder::Asc),
            ]
        );
    }

    #[test]
    fn test_empty_and_order_only_inputs() {
        assert!(parse_sorts("").is_empty());
        assert!(parse_sorts("   ").is_empty());
        assert!(parse_sorts("desc").is_empty());
    }
}
