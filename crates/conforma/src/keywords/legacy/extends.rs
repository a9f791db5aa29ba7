//! Draft 3 `extends`: conjunction with one schema or a list of schemas.
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

pub(crate) struct ExtendsValidator {
    nodes: Vec<SchemaNode>,
    location: Location,
}

impl Validate for ExtendsValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        helpers::in_place(state, location, |state| {
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
        })
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
    let location = ctx.location().join("extends");
    let keyword_ctx = ctx.with_path("extends");
    let mut nodes = Vec::new();
    match schema {
        Value::Object(_) => match keyword_ctx.compile(schema) {
            Ok(node) => nodes.push(node),
            Err(error) => return Some(Err(error)),
        },
        Value::Array(subschemas) => {
            for (index, subschema) in subschemas.iter().enumerate() {
                let ctx = keyword_ctx.with_path(index);
                match ctx.compile(subschema) {
                    Ok(node) => nodes.push(node),
                    Err(error) => return Some(Err(error)),
                }
            }
        }
        _ => {
            return Some(Err(ValidationError::malformed(
                location,
                schema,
                "extends",
                format!("expected a schema or an array of schemas, got {schema}"),
            )))
        }
    }
    Some(Ok(Box::new(ExtendsValidator { nodes, location })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    fn draft3(mut schema: Value) -> Value {
        schema["$schema"] = json!("http://json-schema.org/draft-03/schema");
        schema
    }

    #[test_case(json!({"minimum": 1, "extends": {"maximum": 10}}), json!(5), true)]
    #[test_case(json!({"minimum": 1, "extends": {"maximum": 10}}), json!(11), false)]
    #[test_case(json!({"extends": [{"minimum": 1}, {"maximum": 10}]}), json!(0), false)]
    fn extends(schema: Value, instance: Value, expected: bool) {
        let validator = crate::validator_for(&draft3(schema)).expect("valid schema");
        assert_eq!(validator.is_valid(&instance), expected);
    }
}
