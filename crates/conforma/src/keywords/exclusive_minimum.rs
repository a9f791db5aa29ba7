use serde_json::{Map, Number, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct ExclusiveMinimumValidator {
    limit: Number,
    location: Location,
}

impl ExclusiveMinimumValidator {
    #[inline]
    pub(crate) fn compile(limit: Number, location: Location) -> CompilationResult {
        Ok(Box::new(ExclusiveMinimumValidator { limit, location }))
    }
}

impl Validate for ExclusiveMinimumValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Number(number) = instance {
            helpers::num_gt(number, &self.limit)
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
            Err(ValidationError::exclusive_minimum(
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
    match helpers::expect_number(ctx, "exclusiveMinimum", schema) {
        Ok(limit) => Some(ExclusiveMinimumValidator::compile(
            limit.clone(),
            ctx.location().join("exclusiveMinimum"),
        )),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"exclusiveMinimum": 1}), &json!(1.1))]
    #[test_case(&json!({"exclusiveMinimum": 1.0}), &json!(2))]
    #[test_case(&json!({"exclusiveMinimum": 5}), &json!([]); "non-numbers pass")]
    fn exclusive_minimum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"exclusiveMinimum": 1}), &json!(1.0))]
    #[test_case(&json!({"exclusiveMinimum": 1.0}), &json!(1))]
    #[test_case(&json!({"exclusiveMinimum": 1}), &json!(0))]
    fn exclusive_minimum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
