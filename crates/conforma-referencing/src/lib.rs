//! # conforma-referencing
//!
//! JSON reference resolution for the `conforma` JSON Schema validator:
//! a URI model for schema identifiers, per-draft metaschema knowledge,
//! JSON Pointer evaluation, and a registry of documents with an identifier
//! pre-scan.
mod drafts;
mod error;
pub mod pointer;
mod registry;
mod retriever;
mod uri;
mod vocabularies;

pub use drafts::Draft;
pub use error::Error;
pub use registry::{Registry, Resolved, DEFAULT_ROOT_URI};
pub use retriever::{DefaultRetriever, Retrieve};
pub use uri::Uri;
pub use vocabularies::{Vocabulary, VocabularySet};
