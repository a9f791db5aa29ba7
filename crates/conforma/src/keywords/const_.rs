use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct ConstValidator {
    expected: Value,
    location: Location,
}

impl ConstValidator {
    #[inline]
    pub(crate) fn compile(expected: &Value, location: Location) -> CompilationResult {
        Ok(Box::new(ConstValidator {
            expected: expected.clone(),
            location,
        }))
    }
}

impl Validate for ConstValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        helpers::equal(instance, &self.expected)
    }

    fn validate(
        &self,
        _: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if helpers::equal(instance, &self.expected) {
            Ok(())
        } else {
            Err(ValidationError::constant(
                self.location.clone(),
                location.into(),
                instance,
                self.expected.clone(),
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
    Some(ConstValidator::compile(schema, ctx.location().join("const")))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"const": 2}), &json!(2))]
    #[test_case(&json!({"const": 0.0}), &json!(0); "numeric coercion")]
    #[test_case(&json!({"const": [1.0]}), &json!([1]))]
    #[test_case(&json!({"const": {"a": 1.0}}), &json!({"a": 1}))]
    #[test_case(&json!({"const": null}), &json!(null))]
    fn const_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"const": 2}), &json!(5))]
    #[test_case(&json!({"const": "a"}), &json!("b"))]
    #[test_case(&json!({"const": {"a": 1}}), &json!({"a": 1, "b": 2}))]
    fn const_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
