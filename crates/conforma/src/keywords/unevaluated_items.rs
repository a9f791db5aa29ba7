use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::{EvalState, ItemKey},
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

/// Applies a subschema to every index that no in-place applicator
/// evaluated. Runs last in dialect order.
pub(crate) struct UnevaluatedItemsValidator {
    node: SchemaNode,
    is_false: bool,
    location: Location,
}

impl UnevaluatedItemsValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let keyword_ctx = ctx.with_path("unevaluatedItems");
        Ok(Box::new(UnevaluatedItemsValidator {
            node: keyword_ctx.compile(schema)?,
            is_false: schema == &Value::Bool(false),
            location: ctx.location().join("unevaluatedItems"),
        }))
    }
}

impl Validate for UnevaluatedItemsValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Array(items) = instance else {
            return Ok(());
        };
        let instance_location = Location::from(location);
        let mut unexpected = Vec::new();
        let mut errors = Vec::new();
        let mut evaluated = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if state.is_evaluated(&instance_location, &ItemKey::Index(index)) {
                continue;
            }
            match helpers::validate_child(&self.node, state, location, index, item) {
                Ok(()) => evaluated.push(ItemKey::Index(index)),
                Err(error) => {
                    unexpected.push(index);
                    errors.push(error);
                }
            }
        }
        if errors.is_empty() {
            helpers::mark_all(state, location, evaluated);
            Ok(())
        } else if self.is_false {
            Err(ValidationError::unevaluated_items(
                self.location.clone(),
                location.into(),
                instance,
                unexpected,
            ))
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
        let instance_location = Location::from(location);
        let mut valid = true;
        let mut evaluated = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if state.is_evaluated(&instance_location, &ItemKey::Index(index)) {
                continue;
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
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(UnevaluatedItemsValidator::compile(ctx, schema))
}
