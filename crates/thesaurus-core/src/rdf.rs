//! RDF resource model: terms, literals and property-bag resources.
//!
//! A [`Resource`] maps property URIs to ordered, non-empty value lists.
//! Its JSON form follows RDF/JSON term objects:
//!
//! ```json
//! {
//!   "uri": "http://example.com/set/42",
//!   "properties": {
//!     "http://www.w3.org/2004/02/skos/core#prefLabel": [
//!       { "type": "literal", "value": "Rivier", "lang": "nl" }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::URI_SEPARATOR;
use crate::error::{Error, Result};
use crate::namespaces::{openskos, rdf, skos};

// =============================================================================
// TERMS
// =============================================================================

/// Literal value with optional language tag and datatype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    #[serde(rename = "lang", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }
}

/// A property value: a reference to another resource or an inline literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "TermRepr", into = "TermRepr")]
pub enum Term {
    Uri(String),
    Literal(Literal),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TermRepr {
    Uri { value: String },
    Literal(Literal),
}

impl From<TermRepr> for Term {
    fn from(repr: TermRepr) -> Self {
        match repr {
            TermRepr::Uri { value } => Term::Uri(value),
            TermRepr::Literal(lit) => Term::Literal(lit),
        }
    }
}

impl From<Term> for TermRepr {
    fn from(term: Term) -> Self {
        match term {
            Term::Uri(value) => TermRepr::Uri { value },
            Term::Literal(lit) => TermRepr::Literal(lit),
        }
    }
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Term::Uri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::new(value))
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal(Literal::new(value).with_language(language))
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal::new(value).with_datatype(datatype))
    }

    /// Lexical value: the URI for references, the string for literals.
    pub fn value(&self) -> &str {
        match self {
            Term::Uri(uri) => uri,
            Term::Literal(lit) => &lit.value,
        }
    }

    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Term::Uri(uri) => Some(uri),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Uri(_) => None,
            Term::Literal(lit) => Some(lit),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.as_literal().and_then(|lit| lit.language.as_deref())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

// =============================================================================
// RESOURCE
// =============================================================================

/// An RDF subject with its properties.
///
/// A resource without a URI is blank: it is awaiting URI generation and
/// cannot be persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResourceRepr")]
pub struct Resource {
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    properties: BTreeMap<String, Vec<Term>>,
}

#[derive(Deserialize)]
struct ResourceRepr {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, Vec<Term>>,
}

impl From<ResourceRepr> for Resource {
    fn from(repr: ResourceRepr) -> Self {
        let uri = repr.uri.filter(|u| !u.trim().is_empty());
        let properties = repr
            .properties
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .collect();
        Self { uri, properties }
    }
}

impl Resource {
    /// Create a resource identified by `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            properties: BTreeMap::new(),
        }
    }

    /// Create a blank resource awaiting URI generation.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn is_blank(&self) -> bool {
        self.uri.is_none()
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = Some(uri.into());
    }

    /// URI or an error naming the operation that needed it.
    pub fn require_uri(&self) -> Result<&str> {
        self.uri()
            .ok_or_else(|| Error::InvalidState("The resource has no uri.".to_string()))
    }

    /// All properties in property-URI order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &[Term])> {
        self.properties
            .iter()
            .map(|(p, values)| (p.as_str(), values.as_slice()))
    }

    /// Values of `property`, empty when absent.
    pub fn get_property(&self, property: &str) -> &[Term] {
        self.properties
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    pub fn is_property_empty(&self, property: &str) -> bool {
        self.get_property(property).is_empty()
    }

    /// Whether `property` has a literal in `language` (untagged when `None`).
    pub fn has_property_in_language(&self, property: &str, language: Option<&str>) -> bool {
        self.get_property(property)
            .iter()
            .any(|term| term.as_literal().is_some() && term.language() == language)
    }

    /// Replace all values of `property` with `value`.
    pub fn set_property(&mut self, property: impl Into<String>, value: Term) {
        self.properties.insert(property.into(), vec![value]);
    }

    /// Replace all values of `property`; an empty list unsets it.
    pub fn set_properties(&mut self, property: impl Into<String>, values: Vec<Term>) {
        let property = property.into();
        if values.is_empty() {
            self.properties.remove(&property);
        } else {
            self.properties.insert(property, values);
        }
    }

    /// Append `value` to `property`.
    pub fn add_property(&mut self, property: impl Into<String>, value: Term) {
        self.properties
            .entry(property.into())
            .or_default()
            .push(value);
    }

    /// Append `value` unless an equal value is already present.
    pub fn add_unique_property(&mut self, property: impl Into<String>, value: Term) {
        let values = self.properties.entry(property.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    pub fn unset_property(&mut self, property: &str) {
        self.properties.remove(property);
    }

    pub(crate) fn property_mut(&mut self, property: &str) -> Option<&mut Vec<Term>> {
        self.properties.get_mut(property)
    }

    /// First value of `property`.
    pub fn get_property_single_value(&self, property: &str) -> Option<&Term> {
        self.get_property(property).first()
    }

    /// Single value of `property`, preferring a literal in `language`.
    ///
    /// Falls back to the first value when no value matches the language.
    pub fn get_property_flat_value(&self, property: &str, language: Option<&str>) -> Result<String> {
        let values = self.get_property(property);
        let first = values.first().ok_or_else(|| {
            Error::NotFound(format!("Property {} is not set on the resource.", property))
        })?;

        let preferred = language
            .and_then(|lang| values.iter().find(|term| term.language() == Some(lang)))
            .unwrap_or(first);

        Ok(preferred.value().to_string())
    }

    /// URIs listed under rdf:type.
    pub fn rdf_types(&self) -> impl Iterator<Item = &str> {
        self.get_property(rdf::TYPE).iter().filter_map(Term::as_uri)
    }

    pub fn has_type(&self, rdf_type: &str) -> bool {
        self.rdf_types().any(|t| t == rdf_type)
    }

    /// Tenant code stored under openskos:tenant.
    pub fn tenant(&self) -> Option<&str> {
        self.get_property_single_value(openskos::TENANT)
            .map(Term::value)
    }

    /// Secondary identifier stored under openskos:uuid.
    pub fn uuid(&self) -> Option<&str> {
        self.get_property_single_value(openskos::UUID)
            .map(Term::value)
    }

    /// URI of the first openskos:set value.
    pub fn set_reference(&self) -> Option<&str> {
        self.get_property(openskos::SET)
            .iter()
            .find_map(Term::as_uri)
    }

    /// Assign a URI derived from the resource's set and first notation.
    ///
    /// Only legal on blank resources with an openskos:set reference.
    pub fn self_generate_uri(&mut self) -> Result<String> {
        if !self.is_blank() {
            return Err(Error::InvalidState(
                "The resource already has an uri. Can not generate new one.".to_string(),
            ));
        }

        let set_uri = self.set_reference().ok_or_else(|| {
            Error::InvalidState(
                "Property openskos:set is required to generate the resource uri.".to_string(),
            )
        })?;

        let notation = self
            .get_property_single_value(skos::NOTATION)
            .map(Term::value);
        let uri = generate_uri(set_uri, notation);

        self.uri = Some(uri.clone());
        Ok(uri)
    }
}

/// Build `<set>/<notation>`, or `<set>/<fresh uuid>` without a notation.
pub fn generate_uri(set_uri: &str, notation: Option<&str>) -> String {
    let base = set_uri.trim_end_matches(URI_SEPARATOR);
    match notation.filter(|n| !n.is_empty()) {
        Some(notation) => format!("{}{}{}", base, URI_SEPARATOR, notation),
        None => format!("{}{}{}", base, URI_SEPARATOR, Uuid::new_v4()),
    }
}
