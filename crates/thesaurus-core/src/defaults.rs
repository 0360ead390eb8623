//! Centralized default constants for the thesaurus API.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default number of rows returned by a search.
pub const PAGE_ROWS: i64 = 20;

/// Requested rows take effect only when strictly below this bound.
pub const ROWS_UPPER_BOUND: i64 = 1001;

/// Default search offset.
pub const PAGE_START: i64 = 0;

// =============================================================================
// RESOURCE IDENTIFIERS
// =============================================================================

/// Separator between a set URI and the generated local part of a concept URI.
pub const URI_SEPARATOR: char = '/';

/// Datatype assigned to notation literals that arrive without one.
pub const DEFAULT_NOTATION_TYPE: &str = "http://openskos.org/notations-system";

// =============================================================================
// SEARCH
// =============================================================================

/// Sentinel field name in projections meaning "include the resource URI".
pub const URI_FIELD: &str = "uri";

/// Prefix for internal string sort fields.
pub const SORT_STRING_PREFIX: &str = "sort_s_";

/// Prefix for internal date sort fields.
pub const SORT_DATE_PREFIX: &str = "sort_d_";

/// Prefix shared by every internal sort field.
pub const SORT_INTERNAL_PREFIX: &str = "sort_";

/// Field names indexed as dates for sorting.
pub const DATE_SORT_FIELDS: &[&str] = &["dateAccepted", "dateSubmitted", "modified"];

/// Default timeout for requests to the search index.
pub const SEARCH_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP listen port.
pub const SERVER_PORT: u16 = 3000;

/// Default HTTP listen host.
pub const SERVER_HOST: &str = "0.0.0.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_bound_admits_page_rows() {
        assert!(PAGE_ROWS < ROWS_UPPER_BOUND);
    }

    #[test]
    fn test_sort_prefixes_are_internal() {
        assert!(SORT_STRING_PREFIX.starts_with(SORT_INTERNAL_PREFIX));
        assert!(SORT_DATE_PREFIX.starts_with(SORT_INTERNAL_PREFIX));
    }
}
