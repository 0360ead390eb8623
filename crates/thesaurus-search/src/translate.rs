//! Query parameter translation for the find endpoint.

use std::collections::HashMap;

use thesaurus_core::defaults::{PAGE_ROWS, PAGE_START, ROWS_UPPER_BOUND};
use thesaurus_core::{ConceptStatus, Error, Result, SearchOptions};
use tracing::debug;

use crate::fields::fields_list_to_properties;
use crate::sort::parse_sorts;

/// Build [`SearchOptions`] from raw query parameters.
///
/// Recognized parameters: `start`, `rows`, `tenant`, `tenants`, `q`,
/// `sorts`, `skosCollection`, `sets`, `conceptScheme`, `status`, `fl`.
/// Multi-value filters are space-delimited. Absent parameters leave the
/// corresponding option unset.
pub fn translate_search_params(params: &HashMap<String, String>) -> Result<SearchOptions> {
    let mut options = SearchOptions {
        start: parse_start(params.get("start")),
        rows: parse_rows(params.get("rows")),
        direct_query: true,
        ..SearchOptions::default()
    };

    if let Some(tenant) = params.get("tenant") {
        let tenant = tenant.trim();
        if tenant.is_empty() {
            return Err(Error::precondition("No tenant specified"));
        }
        options.tenants = Some(vec![tenant.to_string()]);
    }

    if let Some(q) = params.get("q") {
        options.search_text = Some(q.clone());
    }

    if let Some(sorts) = params.get("sorts") {
        options.sorts = Some(parse_sorts(sorts));
    }

    if let Some(values) = multi_value(params, "skosCollection") {
        options.skos_collection = Some(values);
    }
    if let Some(values) = multi_value(params, "sets") {
        options.sets = Some(values);
    }
    if let Some(values) = multi_value(params, "tenants") {
        options.tenants = Some(values);
    }
    if let Some(values) = multi_value(params, "conceptScheme") {
        options.concept_scheme = Some(values);
    }

    if let Some(values) = multi_value(params, "status") {
        let statuses = values
            .iter()
            .map(|s| s.parse::<ConceptStatus>().map_err(Error::invalid_argument))
            .collect::<Result<Vec<_>>>()?;
        options.status = Some(statuses);
    }

    if let Some(fl) = params.get("fl") {
        let projection = fields_list_to_properties(fl)?;
        if projection.include_uri || !projection.properties.is_empty() {
            options.fields = Some(projection);
        }
    }

    debug!(
        subsystem = "search",
        component = "translator",
        start = options.start,
        rows = options.rows,
        "Search parameters translated"
    );

    Ok(options)
}

/// Offset; empty or non-numeric input yields the default, negatives clamp to 0.
fn parse_start(value: Option<&String>) -> i64 {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<i64>().ok())
        .map(|v| v.max(0))
        .unwrap_or(PAGE_START)
}

/// Page size; takes effect only when numeric, non-negative and below the bound.
fn parse_rows(value: Option<&String>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|rows| (0..ROWS_UPPER_BOUND).contains(rows))
        .unwrap_or(PAGE_ROWS)
}

/// Space-delimited list; `None` when absent or blank.
fn multi_value(params: &HashMap<String, String>, key: &str) -> Option<Vec<String>> {
    let values: Vec<String> = params
        .get(key)?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}
