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

pub(crate) struct OneOfValidator {
    nodes: Vec<SchemaNode>,
    location: Location,
}

impl OneOfValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let location = ctx.location().join("oneOf");
        let nodes = compile_subschemas(ctx, schema, "oneOf")?;
        Ok(Box::new(OneOfValidator { nodes, location }))
    }
}

impl Validate for OneOfValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let instance_location = Location::from(location);
        let start = state.snapshot();
        let outer = state.take_evaluated(&instance_location);
        let mut contributions = ahash::AHashSet::new();
        let mut passed = 0_usize;
        let mut errors = Vec::new();
        for node in &self.nodes {
            let snapshot = state.snapshot();
            match node.validate(state, location, instance) {
                Ok(()) => {
                    passed += 1;
                    contributions.extend(state.take_evaluated(&instance_location));
                }
                Err(error) => {
                    state.rollback(snapshot);
                    errors.push(error);
                }
            }
        }
        match passed {
            1 => {
                state.merge_evaluated(&instance_location, outer);
                state.merge_evaluated(&instance_location, contributions);
                Ok(())
            }
            0 => {
                state.rollback(start);
                Err(ValidationError::one_of_not_valid(
                    self.location.clone(),
                    location.into(),
                    instance,
                )
                .with_children(errors))
            }
            _ => {
                state.rollback(start);
                Err(ValidationError::one_of_multiple_valid(
                    self.location.clone(),
                    location.into(),
                    instance,
                ))
            }
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let instance_location = Location::from(location);
        let start = state.snapshot();
        let outer = state.take_evaluated(&instance_location);
        let mut contributions = ahash::AHashSet::new();
        let mut passed = 0_usize;
        for node in &self.nodes {
            let snapshot = state.snapshot();
            if node.is_valid(state, location, instance) {
                passed += 1;
                if passed > 1 {
                    state.rollback(start);
                    return false;
                }
                contributions.extend(state.take_evaluated(&instance_location));
            } else {
                state.rollback(snapshot);
            }
        }
        if passed == 1 {
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
    Some(OneOfValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    #[test_case(
        &json!({"oneOf": [{"type": "string", "format": "date"}, {"type": "integer"}, {"type": "array"}, {"type": "boolean"}]}),
        &json!(false)
    )]
    fn one_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5); "no match")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3); "two matches")]
    fn one_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
