use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct PropertyNamesValidator {
    node: SchemaNode,
    location: Location,
}

impl PropertyNamesValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let keyword_ctx = ctx.with_path("propertyNames");
        Ok(Box::new(PropertyNamesValidator {
            node: keyword_ctx.compile(schema)?,
            location: ctx.location().join("propertyNames"),
        }))
    }
}

impl Validate for PropertyNamesValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        let mut errors = Vec::new();
        for name in object.keys() {
            // Names are not instance nodes; annotations made while checking
            // them must not escape.
            let snapshot = state.snapshot();
            let name_value = Value::String(name.clone());
            if let Err(error) = self.node.validate(state, location, &name_value) {
                errors.push(error);
            }
            state.rollback(snapshot);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::property_names(
                self.location.clone(),
                location.into(),
                instance,
                errors,
            ))
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let Value::Object(object) = instance else {
            return true;
        };
        object.keys().all(|name| {
            let snapshot = state.snapshot();
            let name_value = Value::String(name.clone());
            let valid = self.node.is_valid(state, location, &name_value);
            state.rollback(snapshot);
            valid
        })
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(PropertyNamesValidator::compile(ctx, schema))
}
