use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct MinPropertiesValidator {
    limit: u64,
    location: Location,
}

impl MinPropertiesValidator {
    #[inline]
    pub(crate) fn compile(limit: u64, location: Location) -> CompilationResult {
        Ok(Box::new(MinPropertiesValidator { limit, location }))
    }
}

impl Validate for MinPropertiesValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Object(object) = instance {
            (object.len() as u64) >= self.limit
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
            Err(ValidationError::min_properties(
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
    match helpers::expect_limit(ctx, "minProperties", schema) {
        Ok(limit) => Some(MinPropertiesValidator::compile(
            limit,
            ctx.location().join("minProperties"),
        )),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minProperties": 1}), &json!({"a": 1}))]
    #[test_case(&json!({"minProperties": 1}), &json!([]); "non-objects pass")]
    fn min_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn min_properties_is_not_valid() {
        tests_util::is_not_valid(&json!({"minProperties": 1}), &json!({}));
    }
}
