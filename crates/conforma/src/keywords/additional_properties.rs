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

/// Applies a subschema to every property that neither `properties` nor
/// `patternProperties` matched. The matched set flows in through the
/// evaluation state, written by the sibling keywords that run earlier in
/// dialect order.
pub(crate) struct AdditionalPropertiesValidator {
    node: SchemaNode,
    /// A `false` subschema reports the offending keys instead of nesting
    /// per-key errors.
    is_false: bool,
    parent_location: Location,
    location: Location,
}

impl AdditionalPropertiesValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let ctx_keyword = ctx.with_path("additionalProperties");
        Ok(Box::new(AdditionalPropertiesValidator {
            node: ctx_keyword.compile(schema)?,
            is_false: schema == &Value::Bool(false),
            parent_location: ctx.location().clone(),
            location: ctx.location().join("additionalProperties"),
        }))
    }

    fn slot(&self, location: &LazyLocation) -> SlotKey {
        SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        }
    }
}

impl Validate for AdditionalPropertiesValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        let slot = self.slot(location);
        let mut unexpected = Vec::new();
        let mut errors = Vec::new();
        let mut evaluated = Vec::new();
        for (name, value) in object {
            if state.is_matched(&slot, &ItemKey::Property(name.clone())) {
                continue;
            }
            match helpers::validate_child(&self.node, state, location, name, value) {
                Ok(()) => evaluated.push(ItemKey::Property(name.clone())),
                Err(error) => {
                    unexpected.push(name.clone());
                    errors.push(error);
                }
            }
        }
        if errors.is_empty() {
            helpers::mark_all(state, location, evaluated);
            Ok(())
        } else if self.is_false {
            Err(ValidationError::additional_properties(
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
        let Value::Object(object) = instance else {
            return true;
        };
        let slot = self.slot(location);
        let mut valid = true;
        let mut evaluated = Vec::new();
        for (name, value) in object {
            if state.is_matched(&slot, &ItemKey::Property(name.clone())) {
                continue;
            }
            if helpers::is_valid_child(&self.node, state, location, name, value) {
                evaluated.push(ItemKey::Property(name.clone()));
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
    Some(AdditionalPropertiesValidator::compile(ctx, schema))
}
