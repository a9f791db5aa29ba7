//! The runtime side of a compiled schema: the `Validate` trait implemented
//! by every compiled check, and the `Validator` owning the compiled tree.
use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::ValidationError,
    evaluation::EvalState,
    node::SchemaNode,
    options::ValidationOptions,
    paths::LazyLocation,
    Draft,
};

/// A compiled check over one JSON value.
///
/// `validate` threads the evaluation state through the check and reports the
/// first (or, in exhaustive mode, every) constraint violation. `is_valid` is
/// the allocation-free fast path; simple keywords override it, composed ones
/// inherit the default.
pub(crate) trait Validate: Send + Sync {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError>;

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        self.validate(state, location, instance).is_ok()
    }
}

pub(crate) type BoxedCheck = Box<dyn Validate>;

/// The outcome of validating one instance.
#[derive(Debug)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub(crate) fn success() -> ValidationResult {
        ValidationResult {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub(crate) fn failure(errors: Vec<ValidationError>) -> ValidationResult {
        ValidationResult {
            valid: false,
            errors,
        }
    }

    /// Whether the instance conforms to the schema.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The top-level errors; each may carry nested `children`.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consume the result, keeping the errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

/// A compiled JSON Schema validator.
///
/// Building one is comparatively expensive; the validator itself is cheap to
/// use, immutable, and can be shared between threads. Every call constructs
/// its own evaluation state.
#[derive(Debug)]
pub struct Validator {
    pub(crate) root: SchemaNode,
    pub(crate) config: Arc<ValidationOptions>,
}

impl Validator {
    /// Create a validator using the default options.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the malformation when the
    /// schema itself is invalid.
    pub fn new(schema: &Value) -> Result<Validator, ValidationError> {
        crate::options().build(schema)
    }

    /// Validate `instance` and collect structured errors.
    #[must_use]
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        let mut state = EvalState::new();
        let location = LazyLocation::new();
        match self.root.validate(&mut state, &location, instance) {
            Ok(()) => ValidationResult::success(),
            Err(error) => ValidationResult::failure(error.into_top_level()),
        }
    }

    /// Validate `instance` without constructing any errors.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        let mut state = EvalState::new();
        let location = LazyLocation::new();
        self.root.is_valid(&mut state, &location, instance)
    }

    /// The draft this validator was built against.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.config.draft()
    }
}

#[cfg(test)]
mod tests {
    use crate::Validator;
    use serde_json::json;

    #[test]
    fn validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test]
    fn repeated_validation_is_stable() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        let validator = Validator::new(&schema).expect("valid schema");
        let instance = json!({"a": 1});
        assert!(validator.validate(&instance).is_valid());
        assert!(validator.validate(&instance).is_valid());
        let bad = json!({"a": "x"});
        assert!(!validator.validate(&bad).is_valid());
        assert!(!validator.validate(&bad).is_valid());
    }
}
