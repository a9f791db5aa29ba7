use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::{EvalState, ItemKey, SlotKey},
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

/// Applies to array indices that the positional `items` form did not match;
/// the matched indices flow in through the evaluation state.
pub(crate) struct AdditionalItemsValidator {
    node: SchemaNode,
    is_false: bool,
    limit: usize,
    parent_location: Location,
    location: Location,
}

impl Validate for AdditionalItemsValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Array(items) = instance else {
            return Ok(());
        };
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        };
        let mut errors = Vec::new();
        let mut evaluated = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if state.is_matched(&slot, &ItemKey::Index(index)) {
                continue;
            }
            if self.is_false {
                return Err(ValidationError::additional_items(
                    self.location.clone(),
                    location.into(),
                    instance,
                    self.limit,
                ));
            }
            match helpers::validate_child(&self.node, state, location, index, item) {
                Ok(()) => evaluated.push(ItemKey::Index(index)),
                Err(error) => errors.push(error),
            }
        }
        if errors.is_empty() {
            helpers::mark_all(state, location, evaluated);
            Ok(())
        } else {
            Err(helpers::composite_error(
                self.location.clone(),
                location,
                instance,
                errors,
            ))
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let Value::Array(items) = instance else {
            return true;
        };
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        };
        let mut valid = true;
        let mut evaluated = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if state.is_matched(&slot, &ItemKey::Index(index)) {
                continue;
            }
            if self.is_false {
                return false;
            }
            if helpers::is_valid_child(&self.node, state, location, index, item) {
                evaluated.push(ItemKey::Index(index));
            } else {
                valid = false;
            }
        }
        if valid {
            helpers::mark_all(state, location, evaluated);
        }
        valid
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    // Without a positional sibling `items` every index is already matched by
    // the schema form, so `additionalItems` is an annotation only.
    let limit = match parent.get("items") {
        Some(Value::Array(subschemas)) => subschemas.len(),
        _ => return None,
    };
    let keyword_ctx = ctx.with_path("additionalItems");
    match keyword_ctx.compile(schema) {
        Ok(node) => Some(Ok(Box::new(AdditionalItemsValidator {
            node,
            is_false: schema == &Value::Bool(false),
            limit,
            parent_location: ctx.location().clone(),
            location: ctx.location().join("additionalItems"),
        }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": [{}], "additionalItems": false}), &json!([1]))]
    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!([null, 2]))]
    #[test_case(&json!({"additionalItems": false}), &json!([1, 2]); "ignored without positional items")]
    #[test_case(&json!({"items": {}, "additionalItems": false}), &json!([1, 2]); "ignored with schema items")]
    fn additional_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"items": [{}], "additionalItems": false}), &json!([1, 2]))]
    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!([null, "x"]))]
    fn additional_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
