//! Search request and result types shared by the translator and backends.

use serde::{Deserialize, Serialize};

use crate::concept::ConceptStatus;
use crate::defaults::{PAGE_ROWS, PAGE_START};
use crate::rdf::Resource;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse an exact `asc`/`desc` token.
    pub fn from_token(token: &str) -> Option<SortOrder> {
        match token {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered mapping of internal sort field to direction.
///
/// Inserting an existing field overwrites its direction in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec(Vec<(String, SortOrder)>);

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, order: SortOrder) {
        let field = field.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = order,
            None => self.0.push((field, order)),
        }
    }

    pub fn get(&self, field: &str) -> Option<SortOrder> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, o)| *o)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.0.iter().map(|(f, o)| (f.as_str(), *o))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SortOrder)> for SortSpec {
    fn from_iter<I: IntoIterator<Item = (S, SortOrder)>>(iter: I) -> Self {
        let mut spec = SortSpec::new();
        for (field, order) in iter {
            spec.insert(field, order);
        }
        spec
    }
}

/// Which parts of a resource a response includes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProjection {
    /// The `uri` sentinel was requested.
    pub include_uri: bool,
    /// Property URIs to include, in request order.
    pub properties: Vec<String>,
}

impl FieldProjection {
    pub fn includes_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// Normalized search request handed to a [`crate::SearchBackend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub start: i64,
    pub rows: i64,
    /// The search text is passed to the index verbatim.
    pub direct_query: bool,
    /// Restrict hits to resources of this rdf:type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdf_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenants: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_scheme: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skos_collection: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<ConceptStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<SortSpec>,
    /// Response projection; `None` means every property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldProjection>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            start: PAGE_START,
            rows: PAGE_ROWS,
            direct_query: true,
            rdf_type: None,
            search_text: None,
            tenants: None,
            sets: None,
            concept_scheme: None,
            skos_collection: None,
            status: None,
            sorts: None,
            fields: None,
        }
    }
}

impl SearchOptions {
    /// Plain lowercase search term for backends without a query parser.
    ///
    /// Strips a leading `field:` qualifier and wildcards; `None` when the
    /// text matches everything.
    pub fn text_needle(&self) -> Option<String> {
        let text = self.search_text.as_deref()?.trim();
        let text = match text.split_once(':') {
            Some((field, rest)) if !field.is_empty() && field.chars().all(char::is_alphanumeric) => {
                rest
            }
            Some((field, rest)) if field == "*" => rest,
            _ => text,
        };
        let needle = text.trim_matches(|c: char| c == '*' || c.is_whitespace() || c == '"');
        (!needle.is_empty()).then(|| needle.to_lowercase())
    }
}

/// Hits for one page plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub resources: Vec<Resource>,
    pub total: i64,
}
