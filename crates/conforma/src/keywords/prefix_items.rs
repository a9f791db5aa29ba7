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

pub(crate) struct PrefixItemsValidator {
    nodes: Vec<SchemaNode>,
    parent_location: Location,
    location: Location,
}

impl PrefixItemsValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let location = ctx.location().join("prefixItems");
        let Value::Array(subschemas) = schema else {
            return Err(ValidationError::malformed(
                location,
                schema,
                "prefixItems",
                format!("expected an array of schemas, got {schema}"),
            ));
        };
        let keyword_ctx = ctx.with_path("prefixItems");
        let mut nodes = Vec::with_capacity(subschemas.len());
        for (index, subschema) in subschemas.iter().enumerate() {
            let ctx = keyword_ctx.with_path(index);
            nodes.push(ctx.compile(subschema)?);
        }
        Ok(Box::new(PrefixItemsValidator {
            nodes,
            parent_location: ctx.location().clone(),
            location,
        }))
    }
}

impl Validate for PrefixItemsValidator {
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
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(PrefixItemsValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"prefixItems": [{"type": "integer"}, {"type": "string"}]}), &json!([1, "x"]))]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}]}), &json!([]); "shorter arrays pass")]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}]}), &json!([1, "anything"]); "extra elements are unconstrained")]
    fn prefix_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"prefixItems": [{"type": "integer"}]}), &json!(["x"]))]
    #[test_case(&json!({"prefixItems": [{}, {"type": "string"}]}), &json!([1, 2]))]
    fn prefix_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
