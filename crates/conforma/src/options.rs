//! Configuration options for building a validator.
use std::{fmt, sync::Arc};

use ahash::AHashMap;
use referencing::{DefaultRetriever, Draft, Retrieve};
use serde_json::Value;

use crate::{compiler, error::ValidationError, keywords::format::Format, Validator};

/// Configuration options for JSON Schema validation.
#[derive(Clone)]
pub struct ValidationOptions {
    pub(crate) draft: Option<Draft>,
    strict_format: bool,
    strict_integer: bool,
    exhaustive: bool,
    trace: bool,
    pub(crate) retriever: Arc<dyn Retrieve>,
    pub(crate) resources: AHashMap<String, Value>,
    formats: AHashMap<String, Arc<dyn Format>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            draft: None,
            strict_format: true,
            strict_integer: false,
            exhaustive: false,
            trace: false,
            retriever: Arc::new(DefaultRetriever),
            resources: AHashMap::default(),
            formats: AHashMap::default(),
        }
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("draft", &self.draft)
            .field("strict_format", &self.strict_format)
            .field("strict_integer", &self.strict_integer)
            .field("exhaustive", &self.exhaustive)
            .field("trace", &self.trace)
            .finish_non_exhaustive()
    }
}

impl ValidationOptions {
    /// Return the draft version, or the default if not set.
    pub(crate) fn draft(&self) -> Draft {
        self.draft.unwrap_or_default()
    }

    /// The draft governing `contents`: explicitly set, autodetected from
    /// `$schema`, or the default. Unrecognised `$schema` values fall back to
    /// the default here; the compiler resolves them as custom metaschemas.
    pub(crate) fn draft_for(&self, contents: &Value) -> Draft {
        if let Some(draft) = self.draft {
            return draft;
        }
        Draft::default().detect(contents).unwrap_or_default()
    }

    /// Build a JSON Schema validator using the current options.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the malformation when the
    /// schema itself is invalid.
    pub fn build(&self, schema: &Value) -> Result<Validator, ValidationError> {
        compiler::build_validator(self.clone(), schema)
    }

    /// Set the JSON Schema draft to use when the schema carries no `$schema`.
    #[inline]
    pub fn with_draft(&mut self, draft: Draft) -> &mut Self {
        self.draft = Some(draft);
        self
    }

    /// Treat format violations as errors (on by default).
    ///
    /// When off, violations outside drafts 4-7 are demoted to logged
    /// warnings; drafts 4-7 define `format` as an assertion and keep
    /// erroring.
    pub fn strict_format(&mut self, yes: bool) -> &mut Self {
        self.strict_format = yes;
        self
    }

    /// Reject numbers with a zero fractional part (like `1.0`) where
    /// `"type": "integer"` is required.
    pub fn strict_integer(&mut self, yes: bool) -> &mut Self {
        self.strict_integer = yes;
        self
    }

    /// Keep evaluating after the first failure and collect every error.
    pub fn exhaustive(&mut self, yes: bool) -> &mut Self {
        self.exhaustive = yes;
        self
    }

    /// Emit per-node trace output through `log::trace!`.
    pub fn trace(&mut self, yes: bool) -> &mut Self {
        self.trace = yes;
        self
    }

    /// Set a retriever for schema documents referenced but not registered.
    pub fn with_retriever(&mut self, retriever: impl Retrieve + 'static) -> &mut Self {
        self.retriever = Arc::new(retriever);
        self
    }

    /// Register a document addressable under `uri` during validation.
    pub fn with_resource(&mut self, uri: impl Into<String>, resource: Value) -> &mut Self {
        self.resources.insert(uri.into(), resource);
        self
    }

    /// Override or add a named format predicate.
    ///
    /// ```rust
    /// let mut options = conforma::options();
    /// options.with_format("even-length", |value: &str| value.len() % 2 == 0);
    /// ```
    pub fn with_format<F>(&mut self, name: impl Into<String>, format: F) -> &mut Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.into(), Arc::new(format));
        self
    }

    pub(crate) fn is_strict_format(&self) -> bool {
        self.strict_format
    }
    pub(crate) fn is_strict_integer(&self) -> bool {
        self.strict_integer
    }
    pub(crate) fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }
    pub(crate) fn is_tracing(&self) -> bool {
        self.trace
    }
    pub(crate) fn get_format(&self, name: &str) -> Option<&Arc<dyn Format>> {
        self.formats.get(name)
    }
}

#[cfg(test)]
mod tests {
    use referencing::Draft;
    use serde_json::json;

    #[test]
    fn explicit_draft_wins_over_detection() {
        let mut options = crate::options();
        options.with_draft(Draft::Draft4);
        let schema = json!({"$schema": "http://json-schema.org/draft-07/schema"});
        assert_eq!(options.draft_for(&schema), Draft::Draft4);
    }

    #[test]
    fn unknown_metaschema_is_a_build_error() {
        let schema = json!({"$schema": "http://example.com/unknown"});
        assert!(crate::options().build(&schema).is_err());
    }

    #[test]
    fn custom_formats_participate() {
        let schema = json!({"format": "even-length"});
        let mut options = crate::options();
        options.with_format("even-length", |value: &str| value.len() % 2 == 0);
        let validator = options.build(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!("ab")));
        assert!(!validator.is_valid(&json!("abc")));
    }
}
