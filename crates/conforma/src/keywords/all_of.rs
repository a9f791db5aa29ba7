use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct AllOfValidator {
    nodes: Vec<SchemaNode>,
    location: Location,
}

impl AllOfValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let location = ctx.location().join("allOf");
        let nodes = compile_subschemas(ctx, schema, "allOf")?;
        Ok(Box::new(AllOfValidator { nodes, location }))
    }
}

/// Shared by `allOf` / `anyOf` / `oneOf` / draft 3 `extends`.
pub(crate) fn compile_subschemas(
    ctx: &Context,
    schema: &Value,
    keyword: &'static str,
) -> Result<Vec<SchemaNode>, ValidationError> {
    let Value::Array(subschemas) = schema else {
        return Err(ValidationError::malformed(
            ctx.location().join(keyword),
            schema,
            keyword,
            format!("expected an array of schemas, got {schema}"),
        ));
    };
    let keyword_ctx = ctx.with_path(keyword);
    let mut nodes = Vec::with_capacity(subschemas.len());
    for (index, subschema) in subschemas.iter().enumerate() {
        let ctx = keyword_ctx.with_path(index);
        nodes.push(ctx.compile(subschema)?);
    }
    Ok(nodes)
}

impl Validate for AllOfValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let result = helpers::in_place(state, location, |state| {
            let mut errors = Vec::new();
            for node in &self.nodes {
                if let Err(error) = node.validate(state, location, instance) {
                    errors.push(error);
                }
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(helpers::composite_error(
                    self.location.clone(),
                    location,
                    instance,
                    errors,
                ))
            }
        });
        result
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        helpers::in_place_valid(state, location, |state| {
            self.nodes
                .iter()
                .all(|node| node.is_valid(state, location, instance))
        })
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(AllOfValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3))]
    #[test_case(&json!({"allOf": [{}, {}]}), &json!(null))]
    fn all_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!("x"))]
    #[test_case(&json!({"allOf": [false]}), &json!(null))]
    fn all_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn nested_failure_paths() {
        let schema = json!({"allOf": [{"minimum": 2}]});
        tests_util::assert_leaf_paths(&schema, &json!(1), "/allOf/0/minimum", "");
    }
}
