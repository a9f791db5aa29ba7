use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct MinLengthValidator {
    limit: u64,
    location: Location,
}

impl MinLengthValidator {
    #[inline]
    pub(crate) fn compile(limit: u64, location: Location) -> CompilationResult {
        Ok(Box::new(MinLengthValidator { limit, location }))
    }
}

impl Validate for MinLengthValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            // A character is at most four bytes long.
            if (item.len() as u64) / 4 >= self.limit {
                return true;
            }
            (bytecount::num_chars(item.as_bytes()) as u64) >= self.limit
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
            Err(ValidationError::min_length(
                self.location.clone(),
                location.into(),
                instance,
                self.limit,
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
    match helpers::expect_limit(ctx, "minLength", schema) {
        Ok(limit) => Some(MinLengthValidator::compile(
            limit,
            ctx.location().join("minLength"),
        )),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minLength": 2}), &json!("ab"))]
    #[test_case(&json!({"minLength": 2}), &json!("😀a"); "astral characters count once")]
    #[test_case(&json!({"minLength": 2}), &json!(5); "non-strings pass")]
    #[test_case(&json!({"minLength": 0}), &json!(""))]
    fn min_length_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"minLength": 2}), &json!("f"))]
    #[test_case(&json!({"minLength": 2}), &json!("😀"); "one astral character")]
    fn min_length_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn negative_limits_fail_the_build() {
        assert!(crate::validator_for(&json!({"minLength": -1})).is_err());
    }
}
