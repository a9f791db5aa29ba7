use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct MaxItemsValidator {
    limit: u64,
    location: Location,
}

impl MaxItemsValidator {
    #[inline]
    pub(crate) fn compile(limit: u64, location: Location) -> CompilationResult {
        Ok(Box::new(MaxItemsValidator { limit, location }))
    }
}

impl Validate for MaxItemsValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            (items.len() as u64) <= self.limit
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
            Err(ValidationError::max_items(
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
    match helpers::expect_limit(ctx, "maxItems", schema) {
        Ok(limit) => Some(MaxItemsValidator::compile(
            limit,
            ctx.location().join("maxItems"),
        )),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxItems": 2}), &json!([1, 2]))]
    #[test_case(&json!({"maxItems": 0}), &json!([]))]
    #[test_case(&json!({"maxItems": 2}), &json!({"a": 1}); "non-arrays pass")]
    fn max_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn max_items_is_not_valid() {
        tests_util::is_not_valid(&json!({"maxItems": 2}), &json!([1, 2, 3]));
    }
}
