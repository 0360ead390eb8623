//! Response bodies for each [`ResponseContext`].
//!
//! JSON documents are flat objects keyed by short field names, with
//! language-tagged literals keyed `field@lang`. RDF/XML output describes
//! every resource as an `rdf:Description` under a single `rdf:RDF` root.

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};
use tracing::trace;

use thesaurus_core::defaults::URI_FIELD;
use thesaurus_core::fields::field_for;
use thesaurus_core::namespaces::{dcterms, namespace_for, openskos, shorten};
use thesaurus_core::{FieldProjection, Resource, Term};

use crate::context::ResponseContext;
use crate::services::ResultSet;

/// Properties rendered as a single JSON value instead of a list.
const SINGLE_VALUED: &[&str] = &[
    openskos::UUID,
    openskos::TENANT,
    openskos::SET,
    openskos::STATUS,
    dcterms::MODIFIED,
];

fn includes_property(projection: Option<&FieldProjection>, property: &str) -> bool {
    projection.map_or(true, |p| p.includes_property(property))
}

fn includes_uri(projection: Option<&FieldProjection>) -> bool {
    projection.map_or(true, |p| p.include_uri)
}

// =============================================================================
// JSON
// =============================================================================

/// Flat JSON document for one resource.
pub fn resource_document(resource: &Resource, projection: Option<&FieldProjection>) -> Value {
    let mut doc = Map::new();

    if includes_uri(projection) {
        if let Some(uri) = resource.uri() {
            doc.insert(URI_FIELD.to_string(), Value::String(uri.to_string()));
        }
    }

    for (property, values) in resource.properties() {
        if !includes_property(projection, property) {
            continue;
        }
        let field = field_for(property).unwrap_or(property);
        let single = SINGLE_VALUED.contains(&property);

        for term in values.iter().filter(|t| !t.value().is_empty()) {
            let key = match term.language() {
                Some(lang) => format!("{}@{}", field, lang),
                None => field.to_string(),
            };
            let value = Value::String(term.value().to_string());
            if single {
                doc.insert(key, value);
            } else if let Value::Array(items) = doc.entry(key).or_insert_with(|| json!([])) {
                items.push(value);
            }
        }
    }

    Value::Object(doc)
}

/// `{"response": {"numFound", "start", "rows", "docs"}}` for a result set.
pub fn result_set_document(results: &ResultSet, projection: Option<&FieldProjection>) -> Value {
    let docs: Vec<Value> = results
        .resources
        .iter()
        .map(|r| resource_document(r, projection))
        .collect();

    json!({
        "response": {
            "numFound": results.total,
            "start": results.start,
            "rows": results.limit,
            "docs": docs,
        }
    })
}

// =============================================================================
// RDF/XML
// =============================================================================

/// Escape text for XML content and attribute values.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn is_xml_name(local: &str) -> bool {
    let mut chars = local.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Prefixes declared on the document root.
#[derive(Default)]
struct XmlNamespaces {
    /// prefix → namespace URI
    declared: BTreeMap<String, String>,
    generated: usize,
}

impl XmlNamespaces {
    fn declare(&mut self, prefix: &str) {
        if let Some(ns) = namespace_for(prefix) {
            self.declared.insert(prefix.to_string(), ns.to_string());
        }
    }

    /// Qualified element name for `property`, declaring its namespace.
    fn qname(&mut self, property: &str) -> Option<String> {
        if let Some((prefix, local)) = shorten(property).filter(|(_, l)| is_xml_name(l)) {
            self.declare(prefix);
            return Some(format!("{}:{}", prefix, local));
        }

        let split = property.rfind(|c| c == '#' || c == '/')? + 1;
        let (ns, local) = property.split_at(split);
        if !is_xml_name(local) {
            return None;
        }

        let prefix = match self.declared.iter().find(|(_, uri)| uri.as_str() == ns) {
            Some((prefix, _)) => prefix.clone(),
            None => {
                let prefix = format!("ns{}", self.generated);
                self.generated += 1;
                self.declared.insert(prefix.clone(), ns.to_string());
                prefix
            }
        };
        Some(format!("{}:{}", prefix, local))
    }
}

fn write_description(
    out: &mut String,
    resource: &Resource,
    projection: Option<&FieldProjection>,
    namespaces: &mut XmlNamespaces,
) {
    match resource.uri() {
        Some(uri) => out.push_str(&format!(
            "  <rdf:Description rdf:about=\"{}\">\n",
            escape_xml(uri)
        )),
        None => out.push_str("  <rdf:Description>\n"),
    }

    for (property, values) in resource.properties() {
        if !includes_property(projection, property) {
            continue;
        }
        let Some(qname) = namespaces.qname(property) else {
            trace!(subsystem = "api", property, "Property has no XML name, skipped");
            continue;
        };

        for term in values {
            match term {
                Term::Uri(uri) => out.push_str(&format!(
                    "    <{} rdf:resource=\"{}\"/>\n",
                    qname,
                    escape_xml(uri)
                )),
                Term::Literal(literal) => {
                    let mut attributes = String::new();
                    if let Some(lang) = &literal.language {
                        attributes.push_str(&format!(" xml:lang=\"{}\"", escape_xml(lang)));
                    }
                    if let Some(datatype) = &literal.datatype {
                        attributes.push_str(&format!(
                            " rdf:datatype=\"{}\"",
                            escape_xml(datatype)
                        ));
                    }
                    out.push_str(&format!(
                        "    <{}{}>{}</{}>\n",
                        qname,
                        attributes,
                        escape_xml(&literal.value),
                        qname
                    ));
                }
            }
        }
    }

    out.push_str("  </rdf:Description>\n");
}

/// RDF/XML document describing `resources`.
///
/// `root_attributes` are written as `openskos:` attributes on `rdf:RDF`.
pub fn rdf_xml(
    resources: &[Resource],
    projection: Option<&FieldProjection>,
    root_attributes: &[(&str, String)],
) -> String {
    let mut namespaces = XmlNamespaces::default();
    namespaces.declare("rdf");
    if !root_attributes.is_empty() {
        namespaces.declare("openskos");
    }

    let mut body = String::new();
    for resource in resources {
        write_description(&mut body, resource, projection, &mut namespaces);
    }

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rdf:RDF");
    for (prefix, ns) in &namespaces.declared {
        out.push_str(&format!(" xmlns:{}=\"{}\"", prefix, escape_xml(ns)));
    }
    for (name, value) in root_attributes {
        out.push_str(&format!(" openskos:{}=\"{}\"", name, escape_xml(value)));
    }
    out.push_str(">\n");
    out.push_str(&body);
    out.push_str("</rdf:RDF>\n");
    out
}

// =============================================================================
// RESPONSES
// =============================================================================

fn respond_json(context: &ResponseContext, status: StatusCode, value: Value) -> Response {
    match context.callback() {
        Some(callback) => (
            status,
            [(header::CONTENT_TYPE, "application/javascript")],
            format!("{}({});", callback, value),
        )
            .into_response(),
        None => (status, axum::Json(value)).into_response(),
    }
}

fn respond_rdf(status: StatusCode, xml: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/rdf+xml")], xml).into_response()
}

/// Render a single resource.
pub fn render_resource(
    context: &ResponseContext,
    status: StatusCode,
    resource: &Resource,
    projection: Option<&FieldProjection>,
) -> Response {
    match context {
        ResponseContext::Rdf => respond_rdf(
            status,
            rdf_xml(std::slice::from_ref(resource), projection, &[]),
        ),
        _ => respond_json(context, status, resource_document(resource, projection)),
    }
}

/// Render a page of search results.
pub fn render_result_set(
    context: &ResponseContext,
    results: &ResultSet,
    projection: Option<&FieldProjection>,
) -> Response {
    match context {
        ResponseContext::Rdf => {
            let attributes = [
                ("numFound", results.total.to_string()),
                ("start", results.start.to_string()),
                ("rows", results.limit.to_string()),
            ];
            respond_rdf(
                StatusCode::OK,
                rdf_xml(&results.resources, projection, &attributes),
            )
        }
        _ => respond_json(
            context,
            StatusCode::OK,
            result_set_document(results, projection),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesaurus_core::namespaces::{rdf, skos};

    fn concept() -> Resource {
        let mut r = Resource::new("http://example.com/c/1");
        r.add_property(rdf::TYPE, Term::uri(skos::CONCEPT));
        r.add_property(skos::PREF_LABEL, Term::lang_literal("Fiets", "nl"));
        r.add_property(skos::ALT_LABEL, Term::lang_literal("Rijwiel", "nl"));
        r.add_property(skos::ALT_LABEL, Term::lang_literal("Bike", "en"));
        r.add_property(openskos::STATUS, Term::literal("approved"));
        r.add_property("http://example.com/vocab#rating", Term::literal("5 < 6"));
        r
    }

    #[test]
    fn test_document_shape() {
        let doc = resource_document(&concept(), None);
        assert_eq!(doc["uri"], "http://example.com/c/1");
        assert_eq!(doc["status"], "approved");
        assert_eq!(doc["prefLabel@nl"], json!(["Fiets"]));
        assert_eq!(doc["altLabel@en"], json!(["Bike"]));
        assert_eq!(doc["type"], json!([skos::CONCEPT]));
    }

    #[test]
    fn test_projection_limits_document() {
        let projection = FieldProjection {
            include_uri: false,
            properties: vec![skos::PREF_LABEL.to_string()],
        };
        let doc = resource_document(&concept(), Some(&projection));
        let object = doc.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("prefLabel@nl"));
    }

    #[test]
    fn test_result_set_document() {
        let results = ResultSet {
            resources: vec![concept()],
            total: 42,
            start: 20,
            limit: 1,
        };
        let doc = result_set_document(&results, None);
        assert_eq!(doc["response"]["numFound"], 42);
        assert_eq!(doc["response"]["start"], 20);
        assert_eq!(doc["response"]["rows"], 1);
        assert_eq!(doc["response"]["docs"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_rdf_xml_output() {
        let xml = rdf_xml(&[concept()], None, &[("numFound", "1".to_string())]);
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("xmlns:skos=\"http://www.w3.org/2004/02/skos/core#\""));
        assert!(xml.contains("xmlns:ns0=\"http://example.com/vocab#\""));
        assert!(xml.contains("openskos:numFound=\"1\""));
        assert!(xml.contains("<rdf:Description rdf:about=\"http://example.com/c/1\">"));
        assert!(xml.contains("<skos:prefLabel xml:lang=\"nl\">Fiets</skos:prefLabel>"));
        assert!(xml.contains("<rdf:type rdf:resource=\"http://www.w3.org/2004/02/skos/core#Concept\"/>"));
        assert!(xml.contains("<ns0:rating>5 &lt; 6</ns0:rating>"));
        assert!(xml.trim_end().ends_with("</rdf:RDF>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & \"b\""), "a &amp; &quot;b&quot;");
    }
}
