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

pub(crate) struct PropertiesValidator {
    properties: Vec<(String, SchemaNode)>,
    /// Draft 3 spells `required` as a boolean inside the property subschema.
    required: Vec<String>,
    parent_location: Location,
    location: Location,
}

impl PropertiesValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let location = ctx.location().join("properties");
        let Value::Object(map) = schema else {
            return Err(ValidationError::malformed(
                location,
                schema,
                "properties",
                format!("expected an object of subschemas, got {schema}"),
            ));
        };
        let keyword_ctx = ctx.with_path("properties");
        let mut properties = Vec::with_capacity(map.len());
        let mut required = Vec::new();
        for (name, subschema) in map {
            if ctx.draft() == Draft::Draft3
                && subschema.get("required").and_then(Value::as_bool) == Some(true)
            {
                required.push(name.clone());
            }
            let ctx = keyword_ctx.with_path(name.as_str());
            properties.push((name.clone(), ctx.compile(subschema)?));
        }
        Ok(Box::new(PropertiesValidator {
            properties,
            required,
            parent_location: ctx.location().clone(),
            location,
        }))
    }
}

impl Validate for PropertiesValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        let instance_location = Location::from(location);
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: instance_location,
        };
        let mut errors = Vec::new();
        let mut evaluated = Vec::new();
        for (name, node) in &self.properties {
            if let Some(value) = object.get(name) {
                state.add_matched(slot.clone(), ItemKey::Property(name.clone()));
                match helpers::validate_child(node, state, location, name, value) {
                    Ok(()) => evaluated.push(ItemKey::Property(name.clone())),
                    Err(error) => errors.push(error),
                }
            }
        }
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !object.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            errors.push(ValidationError::required(
                self.location.clone(),
                location.into(),
                instance,
                missing,
            ));
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
        let Value::Object(object) = instance else {
            return true;
        };
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        };
        let mut valid = true;
        let mut evaluated = Vec::new();
        for (name, node) in &self.properties {
            if let Some(value) = object.get(name) {
                state.add_matched(slot.clone(), ItemKey::Property(name.clone()));
                if helpers::is_valid_child(node, state, location, name, value) {
                    evaluated.push(ItemKey::Property(name.clone()));
                } else {
                    valid = false;
                }
            }
        }
        if valid && self.required.iter().any(|name| !object.contains_key(name)) {
            valid = false;
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
    Some(PropertiesValidator::compile(ctx, schema))
}
