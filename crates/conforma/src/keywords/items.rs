use referencing::Draft;
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

/// The schema form of `items`: one subschema applied to every element from
/// `skip` onwards. `skip` is zero before 2020-12 and the `prefixItems`
/// length from 2020-12 on.
pub(crate) struct ItemsSchemaValidator {
    node: SchemaNode,
    skip: usize,
    location: Location,
}

impl Validate for ItemsSchemaValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Array(items) = instance else {
            return Ok(());
        };
        let mut errors = Vec::new();
        let mut evaluated = Vec::new();
        for (index, item) in items.iter().enumerate().skip(self.skip) {
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
        let mut valid = true;
        let mut evaluated = Vec::new();
        for (index, item) in items.iter().enumerate().skip(self.skip) {
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

/// The positional array form of `items` (drafts ≤ 2019-09): element `i`
/// against schema `i`. Matched indices drive the sibling `additionalItems`.
pub(crate) struct ItemsArrayValidator {
    nodes: Vec<SchemaNode>,
    parent_location: Location,
    location: Location,
}

impl Validate for ItemsArrayValidator {
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
        for (index, (node, item)) in self.nodes.iter().zip(items).enumerate() {
            state.add_matched(slot.clone(), ItemKey::Index(index));
            match helpers::validate_child(node, state, location, index, item) {
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
        for (index, (node, item)) in self.nodes.iter().zip(items).enumerate() {
            state.add_matched(slot.clone(), ItemKey::Index(index));
            if helpers::is_valid_child(node, state, location, index, item) {
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
    let location = ctx.location().join("items");
    match schema {
        Value::Array(subschemas) if ctx.draft() <= Draft::Draft201909 => {
            let keyword_ctx = ctx.with_path("items");
            let mut nodes = Vec::with_capacity(subschemas.len());
            for (index, subschema) in subschemas.iter().enumerate() {
                let ctx = keyword_ctx.with_path(index);
                match ctx.compile(subschema) {
                    Ok(node) => nodes.push(node),
                    Err(error) => return Some(Err(error)),
                }
            }
            Some(Ok(Box::new(ItemsArrayValidator {
                nodes,
                parent_location: ctx.location().clone(),
                location,
            })))
        }
        Value::Object(_) | Value::Bool(_) => {
            let skip = if ctx.draft() >= Draft::Draft202012 {
                parent
                    .get("prefixItems")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len)
            } else {
                0
            };
            let keyword_ctx = ctx.with_path("items");
            match keyword_ctx.compile(schema) {
                Ok(node) => Some(Ok(Box::new(ItemsSchemaValidator {
                    node,
                    skip,
                    location,
                }))),
                Err(error) => Some(Err(error)),
            }
        }
        _ => Some(Err(ValidationError::malformed(
            location,
            schema,
            "items",
            format!("expected a schema, got {schema}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, 2, 3]))]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!([]))]
    #[test_case(&json!({"items": false}), &json!([]))]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!("not an array"); "non-arrays pass")]
    #[test_case(
        &json!({"prefixItems": [{"type": "string"}], "items": {"type": "integer"}}),
        &json!(["x", 1, 2]);
        "items starts after the prefix"
    )]
    fn items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"items": {"type": "string"}}), &json!(["hello", 0]))]
    #[test_case(&json!({"items": false}), &json!([1]))]
    #[test_case(
        &json!({"prefixItems": [{}], "items": {"type": "integer"}}),
        &json!([null, 2, 3, "foo"])
    )]
    fn items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn offending_element_paths() {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        let instance = json!(["hello", 0]);
        tests_util::assert_leaf_paths(&schema, &instance, "/items/type", "/1");
    }

    #[test]
    fn positional_form_in_draft7() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema",
            "items": [{"type": "integer"}, {"type": "string"}]
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!([1, "two"])));
        assert!(validator.is_valid(&json!([1])));
        assert!(validator.is_valid(&json!([1, "two", null])));
        assert!(!validator.is_valid(&json!(["one", "two"])));
    }
}
