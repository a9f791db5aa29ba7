use serde_json::{Map, Number, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct ExclusiveMaximumValidator {
    limit: Number,
    location: Location,
}

impl ExclusiveMaximumValidator {
    #[inline]
    pub(crate) fn compile(limit: Number, location: Location) -> CompilationResult {
        Ok(Box::new(ExclusiveMaximumValidator { limit, location }))
    }
}

impl Validate for ExclusiveMaximumValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Number(number) = instance {
            helpers::num_lt(number, &self.limit)
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
            Err(ValidationError::exclusive_maximum(
                self.location.clone(),
                location.into(),
                instance,
                Value::Number(self.limit.clone()),
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
    match helpers::expect_number(ctx, "exclusiveMaximum", schema) {
        Ok(limit) => Some(ExclusiveMaximumValidator::compile(
            limit.clone(),
            ctx.location().join("exclusiveMaximum"),
        )),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(2.9))]
    #[test_case(&json!({"exclusiveMaximum": 3.0}), &json!(2))]
    fn exclusive_maximum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(3.0))]
    #[test_case(&json!({"exclusiveMaximum": 3.0}), &json!(3))]
    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(4))]
    fn exclusive_maximum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
