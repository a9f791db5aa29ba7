use fancy_regex::Regex;
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    ecma,
    error::ValidationError,
    evaluation::{EvalState, ItemKey, SlotKey},
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct PatternPropertiesValidator {
    patterns: Vec<(Regex, SchemaNode)>,
    parent_location: Location,
    location: Location,
}

impl PatternPropertiesValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let location = ctx.location().join("patternProperties");
        let Value::Object(map) = schema else {
            return Err(ValidationError::malformed(
                location,
                schema,
                "patternProperties",
                format!("expected an object of subschemas, got {schema}"),
            ));
        };
        let keyword_ctx = ctx.with_path("patternProperties");
        let mut patterns = Vec::with_capacity(map.len());
        for (pattern, subschema) in map {
            let Ok(regex) = ecma::compile(pattern) else {
                return Err(ValidationError::malformed(
                    location,
                    schema,
                    "patternProperties",
                    format!("the pattern \"{pattern}\" does not compile"),
                ));
            };
            let ctx = keyword_ctx.with_path(pattern.as_str());
            patterns.push((regex, ctx.compile(subschema)?));
        }
        Ok(Box::new(PatternPropertiesValidator {
            patterns,
            parent_location: ctx.location().clone(),
            location,
        }))
    }
}

impl Validate for PatternPropertiesValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        };
        let mut errors = Vec::new();
        let mut evaluated = Vec::new();
        for (name, value) in object {
            for (regex, node) in &self.patterns {
                if regex.is_match(name).unwrap_or(false) {
                    state.add_matched(slot.clone(), ItemKey::Property(name.clone()));
                    match helpers::validate_child(node, state, location, name, value) {
                        Ok(()) => evaluated.push(ItemKey::Property(name.clone())),
                        Err(error) => errors.push(error),
                    }
                }
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
        let Value::Object(object) = instance else {
            return true;
        };
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        };
        let mut valid = true;
        let mut evaluated = Vec::new();
        for (name, value) in object {
            for (regex, node) in &self.patterns {
                if regex.is_match(name).unwrap_or(false) {
                    state.add_matched(slot.clone(), ItemKey::Property(name.clone()));
                    if helpers::is_valid_child(node, state, location, name, value) {
                        evaluated.push(ItemKey::Property(name.clone()));
                    } else {
                        valid = false;
                    }
                }
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
    Some(PatternPropertiesValidator::compile(ctx, schema))
}
