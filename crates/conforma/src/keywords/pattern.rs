use std::sync::Arc;

use fancy_regex::Regex;
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    ecma,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{format::Format, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct PatternValidator {
    original: String,
    pattern: Regex,
    location: Location,
}

impl PatternValidator {
    #[inline]
    pub(crate) fn compile(original: &str, pattern: Regex, location: Location) -> CompilationResult {
        Ok(Box::new(PatternValidator {
            original: original.to_string(),
            pattern,
            location,
        }))
    }
}

impl Validate for PatternValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            self.pattern.is_match(item).unwrap_or(false)
        } else {
            true
        }
    }

    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if self.is_valid(state, location, instance) {
            Ok(())
        } else {
            Err(ValidationError::pattern(
                self.location.clone(),
                location.into(),
                instance,
                self.original.clone(),
            ))
        }
    }
}

/// The `"$format:<name>"` extension: such a pattern delegates to the format
/// registry instead of compiling a regex.
struct FormatDelegate {
    name: String,
    format: Arc<dyn Format>,
    location: Location,
}

impl Validate for FormatDelegate {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            self.format.is_valid(item)
        } else {
            true
        }
    }

    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if self.is_valid(state, location, instance) {
            Ok(())
        } else {
            Err(ValidationError::format(
                self.location.clone(),
                location.into(),
                instance,
                self.name.clone(),
            ))
        }
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("pattern");
    match schema {
        Value::String(pattern) => {
            if let Some(name) = pattern.strip_prefix("$format:") {
                return Some(match crate::keywords::format::lookup(ctx, name) {
                    Some(format) => Ok(Box::new(FormatDelegate {
                        name: name.to_string(),
                        format,
                        location,
                    })),
                    None => Err(ValidationError::malformed(
                        location,
                        schema,
                        "pattern",
                        format!("unknown format '{name}'"),
                    )),
                });
            }
            match ecma::compile(pattern) {
                Ok(regex) => Some(PatternValidator::compile(pattern, regex, location)),
                Err(()) => Some(Err(ValidationError::malformed(
                    location,
                    schema,
                    "pattern",
                    format!("the pattern {schema} does not compile"),
                ))),
            }
        }
        _ => Some(Err(ValidationError::malformed(
            location,
            schema,
            "pattern",
            format!("expected a string, got {schema}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"pattern": "^a*$"}), &json!("aaa"))]
    #[test_case(&json!({"pattern": "a+"}), &json!("xxaxx"); "unanchored patterns search")]
    #[test_case(&json!({"pattern": "^\\d+$"}), &json!("123"))]
    #[test_case(&json!({"pattern": "^a*$"}), &json!(5); "non-strings pass")]
    fn pattern_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"pattern": "^a*$"}), &json!("abc"))]
    #[test_case(&json!({"pattern": "^\\d+$"}), &json!("١٢٣"); "ecma digits are ascii")]
    fn pattern_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn format_delegation() {
        let schema = json!({"pattern": "$format:ipv4"});
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!("127.0.0.1")));
        assert!(!validator.is_valid(&json!("999.0.0.1")));
    }

    #[test]
    fn uncompilable_patterns_fail_the_build() {
        assert!(crate::validator_for(&json!({"pattern": "a("})).is_err());
    }
}
