//! # thesaurus-core
//!
//! Core types, traits, and engines for the thesaurus API.
//!
//! This crate holds the RDF resource model, the metadata lifecycle engine,
//! the validation engine and the collaborator traits the other thesaurus
//! crates implement.

pub mod concept;
pub mod defaults;
pub mod error;
pub mod fields;
pub mod kind;
pub mod logging;
pub mod metadata;
pub mod namespaces;
pub mod rdf;
pub mod scheme;
pub mod search;
pub mod tenant;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use concept::{status_of, Concept, ConceptStatus, PropertyClass};
pub use error::{Error, Result};
pub use kind::ResourceKind;
pub use metadata::{ensure_metadata, MetadataContext};
pub use rdf::{generate_uri, Literal, Resource, Term};
pub use scheme::{ConceptScheme, Set};
pub use search::*;
pub use tenant::{Tenant, User, UserRole};
pub use traits::*;
pub use validation::{Rule, ValidationContext, Validator};
