//! A JSON Schema validator covering drafts 3 through draft-next.
//!
//! # Validation
//!
//! For a one-off check, use [`validate`] or [`is_valid`]:
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({"type": "string"});
//! assert!(conforma::is_valid(&schema, &json!("Hello, world!")));
//!
//! let result = conforma::validate(&schema, &json!(42));
//! assert!(!result.is_valid());
//! assert_eq!(result.errors()[0].to_string(), "type: not a string - 42");
//! ```
//!
//! When the same schema applies to many instances, build a [`Validator`]
//! once and reuse it:
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({"type": "array", "items": {"type": "integer"}});
//! let validator = conforma::validator_for(&schema).expect("valid schema");
//! assert!(validator.is_valid(&json!([1, 2, 3])));
//! assert!(!validator.is_valid(&json!([1, "two"])));
//! ```
//!
//! # Configuration
//!
//! [`options`] returns a builder for draft selection, strictness toggles,
//! format overrides and remote-reference handling:
//!
//! ```rust
//! use conforma::Draft;
//! use serde_json::json;
//!
//! let schema = json!({"type": "integer"});
//! let validator = conforma::options()
//!     .with_draft(Draft::Draft7)
//!     .strict_integer(true)
//!     .build(&schema)
//!     .expect("valid schema");
//! assert!(!validator.is_valid(&json!(1.0)));
//! ```
//!
//! # Remote references
//!
//! The crate performs no IO. Schemas referenced by `$ref` are either
//! pre-registered with [`ValidationOptions::with_resource`] or fetched
//! through a [`Retrieve`] implementation supplied by the embedder;
//! unresolvable references degrade to no-ops with a logged warning.
pub(crate) mod compiler;
mod content_encoding;
mod content_media_type;
pub(crate) mod dialect;
pub(crate) mod ecma;
mod error;
pub(crate) mod evaluation;
pub(crate) mod keywords;
mod node;
mod options;
pub mod paths;
mod primitive_type;
mod validator;

pub use error::{TypeKind, ValidationError, ValidationErrorKind};
pub use keywords::format::Format;
pub use options::ValidationOptions;
pub use primitive_type::{PrimitiveType, PrimitiveTypesBitMap};
pub use referencing::{Draft, Retrieve, Uri};
pub use validator::{ValidationResult, Validator};

use serde_json::Value;

/// Validate `instance` against `schema` with the default options and
/// collect structured errors.
///
/// A malformed schema surfaces as an invalid result carrying the build
/// error; nothing panics across this boundary.
#[must_use]
pub fn validate(schema: &Value, instance: &Value) -> ValidationResult {
    match validator_for(schema) {
        Ok(validator) => validator.validate(instance),
        Err(error) => ValidationResult::failure(vec![error]),
    }
}

/// Validate `instance` against `schema` with the default options.
#[must_use]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    match validator_for(schema) {
        Ok(validator) => validator.is_valid(instance),
        Err(_) => false,
    }
}

/// Build a reusable validator for `schema` with the default options.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the malformation when the
/// schema itself is invalid.
pub fn validator_for(schema: &Value) -> Result<Validator, ValidationError> {
    Validator::new(schema)
}

/// Create a builder for configuring JSON Schema validation.
#[must_use]
pub fn options() -> ValidationOptions {
    ValidationOptions::default()
}

#[cfg(test)]
pub(crate) mod tests_util {
    use super::ValidationError;
    use serde_json::Value;

    #[track_caller]
    pub(crate) fn is_valid(schema: &Value, instance: &Value) {
        let validator = crate::validator_for(schema).expect("Invalid schema");
        assert!(
            validator.is_valid(instance),
            "{instance} should be valid under {schema}"
        );
        assert!(
            validator.validate(instance).is_valid(),
            "validate() disagrees with is_valid() for {instance}"
        );
    }

    #[track_caller]
    pub(crate) fn is_not_valid(schema: &Value, instance: &Value) {
        let validator = crate::validator_for(schema).expect("Invalid schema");
        assert!(
            !validator.is_valid(instance),
            "{instance} should not be valid under {schema}"
        );
        assert!(
            !validator.validate(instance).is_valid(),
            "validate() disagrees with is_valid() for {instance}"
        );
    }

    /// Assert that the first leaf error carries the expected message.
    #[track_caller]
    pub(crate) fn expect_message(schema: &Value, instance: &Value, expected: &str) {
        let result = crate::validate(schema, instance);
        assert!(!result.is_valid(), "{instance} should fail under {schema}");
        let errors = result.errors();
        let leaves: Vec<&ValidationError> =
            errors.iter().flat_map(ValidationError::leaves).collect();
        assert_eq!(leaves[0].to_string(), expected);
    }

    /// Assert schema and instance paths of the first leaf error.
    #[track_caller]
    pub(crate) fn assert_leaf_paths(
        schema: &Value,
        instance: &Value,
        schema_path: &str,
        instance_path: &str,
    ) {
        let result = crate::validate(schema, instance);
        assert!(!result.is_valid(), "{instance} should fail under {schema}");
        let errors = result.errors();
        let leaves: Vec<&ValidationError> =
            errors.iter().flat_map(ValidationError::leaves).collect();
        assert_eq!(leaves[0].schema_path.as_str(), schema_path);
        assert_eq!(leaves[0].instance_path.as_str(), instance_path);
    }
}
