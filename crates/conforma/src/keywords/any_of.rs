use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{all_of::compile_subschemas, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct AnyOfValidator {
    nodes: Vec<SchemaNode>,
    location: Location,
}

impl AnyOfValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let location = ctx.location().join("anyOf");
        let nodes = compile_subschemas(ctx, schema, "anyOf")?;
        Ok(Box::new(AnyOfValidator { nodes, location }))
    }
}

impl Validate for AnyOfValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let instance_location = Location::from(location);
        let start = state.snapshot();
        let outer = state.take_evaluated(&instance_location);
        // Every branch runs: annotations of each passing branch count, so a
        // short-circuit would starve adjacent `unevaluated*` keywords.
        let mut contributions = ahash::AHashSet::new();
        let mut passed = false;
        let mut errors = Vec::new();
        for node in &self.nodes {
            let snapshot = state.snapshot();
            match node.validate(state, location, instance) {
                Ok(()) => {
                    passed = true;
                    contributions.extend(state.take_evaluated(&instance_location));
                }
                Err(error) => {
                    state.rollback(snapshot);
                    errors.push(error);
                }
            }
        }
        if passed {
            state.merge_evaluated(&instance_location, outer);
            state.merge_evaluated(&instance_location, contributions);
            Ok(())
        } else {
            state.rollback(start);
            Err(ValidationError::any_of(
                self.location.clone(),
                location.into(),
                instance,
            )
            .with_children(errors))
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let instance_location = Location::from(location);
        let start = state.snapshot();
        let outer = state.take_evaluated(&instance_location);
        let mut contributions = ahash::AHashSet::new();
        let mut passed = false;
        for node in &self.nodes {
            let snapshot = state.snapshot();
            if node.is_valid(state, location, instance) {
                passed = true;
                contributions.extend(state.take_evaluated(&instance_location));
            } else {
                state.rollback(snapshot);
            }
        }
        if passed {
            state.merge_evaluated(&instance_location, outer);
            state.merge_evaluated(&instance_location, contributions);
            true
        } else {
            state.rollback(start);
            false
        }
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(AnyOfValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    fn any_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5))]
    #[test_case(&json!({"anyOf": []}), &json!(null); "empty anyOf rejects")]
    fn any_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
