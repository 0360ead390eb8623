//! Field projection (`fl`) resolution.

use thesaurus_core::defaults::URI_FIELD;
use thesaurus_core::fields::property_for;
use thesaurus_core::namespaces::expand_property;
use thesaurus_core::{Error, FieldProjection, Result};
use url::Url;

/// Resolve a comma-delimited field list into a projection.
///
/// Each token is looked up in the short-name map, else prefix-expanded,
/// else kept as is. Apart from the `uri` sentinel, every resolved token must
/// be an absolute URL.
pub fn fields_list_to_properties(fields_list: &str) -> Result<FieldProjection> {
    let mut projection = FieldProjection::default();

    for field in fields_list.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        let property = match property_for(field) {
            Some(property) => property.to_string(),
            None => expand_property(field),
        };

        if property == URI_FIELD {
            projection.include_uri = true;
            continue;
        }

        if !is_absolute_url(&property) {
            return Err(Error::InvalidField(format!(
                "The field \"{}\" from fields list is not recognised.",
                property
            )));
        }

        if !projection.includes_property(&property) {
            projection.properties.push(property);
        }
    }

    Ok(projection)
}

fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.has_host())
}
