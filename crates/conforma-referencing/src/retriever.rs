use serde_json::Value;

use crate::Uri;

/// A way to retrieve schema documents that are not present in a registry.
///
/// Implementations map URIs to documents however they like (filesystem,
/// in-memory stores, HTTP). They must not assume anything about call order
/// and must be safe to call from multiple threads.
pub trait Retrieve: Send + Sync {
    /// Retrieve the document identified by `uri`.
    ///
    /// # Errors
    ///
    /// Any error marks the URI as unretrievable; the caller degrades the
    /// referring schema node instead of failing validation.
    fn retrieve(&self, uri: &Uri) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// A retriever that considers every URI unretrievable.
///
/// Remote references are a deliberate integration point; embedders opt in by
/// providing their own [`Retrieve`] implementation.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRetriever;

impl Retrieve for DefaultRetriever {
    fn retrieve(&self, uri: &Uri) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("retrieval is not enabled for '{uri}'").into())
    }
}
