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

pub(crate) struct NotValidator {
    node: SchemaNode,
    original: Value,
    location: Location,
}

impl NotValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let keyword_ctx = ctx.with_path("not");
        Ok(Box::new(NotValidator {
            node: keyword_ctx.compile(schema)?,
            original: schema.clone(),
            location: ctx.location().join("not"),
        }))
    }
}

impl Validate for NotValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        // `not` contributes no annotations either way.
        let snapshot = state.snapshot();
        let valid = self.node.is_valid(state, location, instance);
        state.rollback(snapshot);
        if valid {
            Err(ValidationError::not(
                self.location.clone(),
                location.into(),
                instance,
                self.original.clone(),
            ))
        } else {
            Ok(())
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let snapshot = state.snapshot();
        let valid = self.node.is_valid(state, location, instance);
        state.rollback(snapshot);
        !valid
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(NotValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"not": {"type": "integer"}}), &json!("x"))]
    #[test_case(&json!({"not": false}), &json!(null))]
    fn not_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"not": {"type": "integer"}}), &json!(1))]
    #[test_case(&json!({"not": {}}), &json!(null))]
    fn not_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
