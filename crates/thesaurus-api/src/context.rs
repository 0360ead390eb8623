//! Response contexts selected by the `format` parameter or a path suffix.

use thesaurus_core::{Error, Result};

/// Output format of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseContext {
    Json,
    /// JSON wrapped in a call to `callback`.
    Jsonp { callback: String },
    /// RDF/XML.
    Rdf,
}

/// Suffixes accepted on detail paths such as `/api/concept/<uuid>.rdf`.
const PATH_SUFFIXES: &[&str] = &["json", "jsonp", "rdf"];

impl ResponseContext {
    /// Resolve a context name. JSON when `format` is absent.
    pub fn resolve(format: Option<&str>, callback: Option<&str>) -> Result<Self> {
        match format.map(str::trim).filter(|f| !f.is_empty()).unwrap_or("json") {
            "json" => Ok(Self::Json),
            "jsonp" => {
                let callback = callback
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| Error::invalid_argument("No callback specified for jsonp"))?;
                if !is_safe_callback(callback) {
                    return Err(Error::invalid_argument(format!(
                        "Invalid callback: {}",
                        callback
                    )));
                }
                Ok(Self::Jsonp {
                    callback: callback.to_string(),
                })
            }
            "rdf" => Ok(Self::Rdf),
            other => Err(Error::invalid_argument(format!("Invalid context: {}", other))),
        }
    }

    /// Callback to wrap errors in, when this is a JSON-P context.
    pub fn callback(&self) -> Option<&str> {
        match self {
            Self::Jsonp { callback } => Some(callback),
            _ => None,
        }
    }
}

// Callbacks end up in executable JavaScript.
fn is_safe_callback(callback: &str) -> bool {
    callback
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// Split a trailing `.json`, `.jsonp` or `.rdf` off a path id.
pub fn split_context_suffix(id: &str) -> (&str, Option<&str>) {
    match id.rsplit_once('.') {
        Some((base, suffix)) if !base.is_empty() && PATH_SUFFIXES.contains(&suffix) => {
            (base, Some(suffix))
        }
        _ => (id, None),
    }
}
