use referencing::Draft;
use serde_json::{Map, Number, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct MaximumValidator {
    limit: Number,
    /// Draft 3/4 spell exclusivity as a sibling boolean modifier.
    exclusive: bool,
    location: Location,
}

impl MaximumValidator {
    #[inline]
    pub(crate) fn compile(limit: Number, exclusive: bool, location: Location) -> CompilationResult {
        Ok(Box::new(MaximumValidator {
            limit,
            exclusive,
            location,
        }))
    }
}

impl Validate for MaximumValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Number(number) = instance {
            if self.exclusive {
                helpers::num_lt(number, &self.limit)
            } else {
                helpers::num_le(number, &self.limit)
            }
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
        } else if self.exclusive {
            Err(ValidationError::exclusive_maximum(
                self.location.clone(),
                location.into(),
                instance,
                Value::Number(self.limit.clone()),
            ))
        } else {
            Err(ValidationError::maximum(
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
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let limit = match helpers::expect_number(ctx, "maximum", schema) {
        Ok(limit) => limit.clone(),
        Err(error) => return Some(Err(error)),
    };
    let exclusive = ctx.draft() <= Draft::Draft4
        && parent.get("exclusiveMaximum").and_then(Value::as_bool) == Some(true);
    Some(MaximumValidator::compile(
        limit,
        exclusive,
        ctx.location().join("maximum"),
    ))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maximum": 3}), &json!(3))]
    #[test_case(&json!({"maximum": 3.0}), &json!(3))]
    #[test_case(&json!({"maximum": 3}), &json!("three"); "non-numbers pass")]
    fn maximum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"maximum": 3}), &json!(3.5))]
    #[test_case(&json!({"maximum": 3.0}), &json!(4))]
    fn maximum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn draft3_boolean_modifier_makes_the_bound_exclusive() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-03/schema",
            "maximum": 10,
            "exclusiveMaximum": true
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(!validator.is_valid(&json!(10)));
        assert!(validator.is_valid(&json!(9.9)));
    }
}
