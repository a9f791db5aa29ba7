use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct MaxLengthValidator {
    limit: u64,
    location: Location,
}

impl MaxLengthValidator {
    #[inline]
    pub(crate) fn compile(limit: u64, location: Location) -> CompilationResult {
        Ok(Box::new(MaxLengthValidator { limit, location }))
    }
}

impl Validate for MaxLengthValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            // The character count never exceeds the byte length.
            if (item.len() as u64) <= self.limit {
                return true;
            }
            (bytecount::num_chars(item.as_bytes()) as u64) <= self.limit
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
            Err(ValidationError::max_length(
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
    match helpers::expect_limit(ctx, "maxLength", schema) {
        Ok(limit) => Some(MaxLengthValidator::compile(
            limit,
            ctx.location().join("maxLength"),
        )),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxLength": 2}), &json!("ab"))]
    #[test_case(&json!({"maxLength": 2}), &json!("😀😀"); "astral characters count once")]
    #[test_case(&json!({"maxLength": 2}), &json!([1, 2, 3]); "non-strings pass")]
    fn max_length_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"maxLength": 2}), &json!("foo"))]
    #[test_case(&json!({"maxLength": 0}), &json!("a"))]
    fn max_length_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
