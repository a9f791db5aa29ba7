use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct UniqueItemsValidator {
    location: Location,
}

impl UniqueItemsValidator {
    #[inline]
    pub(crate) fn compile(location: Location) -> CompilationResult {
        Ok(Box::new(UniqueItemsValidator { location }))
    }
}

/// Pairwise JSON equality; `[1, 1.0]` is not unique.
pub(crate) fn is_unique(items: &[Value]) -> bool {
    for (position, item) in items.iter().enumerate() {
        for other in &items[position + 1..] {
            if helpers::equal(item, other) {
                return false;
            }
        }
    }
    true
}

impl Validate for UniqueItemsValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            is_unique(items)
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
            Err(ValidationError::unique_items(
                self.location.clone(),
                location.into(),
                instance,
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
    match schema.as_bool() {
        Some(true) => Some(UniqueItemsValidator::compile(
            ctx.location().join("uniqueItems"),
        )),
        Some(false) => None,
        None => Some(Err(ValidationError::malformed(
            ctx.location().join("uniqueItems"),
            schema,
            "uniqueItems",
            format!("expected a boolean, got {schema}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 2, 3]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 2}]))]
    #[test_case(&json!({"uniqueItems": false}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!("aa"); "non-arrays pass")]
    fn unique_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1.0]); "numeric coercion")]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 1.0}]))]
    fn unique_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
