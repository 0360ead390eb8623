//! # thesaurus-search
//!
//! Turns the loosely-typed query string of the find endpoint into
//! [`SearchOptions`](thesaurus_core::SearchOptions) and answers them
//! against a Solr index.
//!
//! ## Example
//!
//! ```ignore
//! use std::collections::HashMap;
//! use thesaurus_search::translate_search_params;
//!
//! let params: HashMap<String, String> = [
//!     ("q".to_string(), "prefLabel:fiets*".to_string()),
//!     ("sorts".to_string(), "dateAccepted desc prefLabel".to_string()),
//!     ("rows".to_string(), "50".to_string()),
//! ]
//! .into();
//! let options = translate_search_params(&params)?;
//! let results = backend.search(&options).await?;
//! ```

pub mod fields;
pub mod solr;
pub mod sort;
pub mod translate;

pub use fields::fields_list_to_properties;
pub use solr::{SolrConfig, SolrSearch};
pub use sort::{parse_sorts, sort_field};
pub use translate::translate_search_params;
