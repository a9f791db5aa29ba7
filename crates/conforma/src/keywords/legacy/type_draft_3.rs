//! Draft 3 `type`: type names, `"any"`, and nested schemas may be mixed in
//! a union.
use serde_json::{Map, Value};
use std::convert::TryFrom;

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{type_::matches_type, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    validator::Validate,
};

pub(crate) enum TypeOption {
    Name(PrimitiveType),
    Any,
    Schema(SchemaNode),
}

pub(crate) struct TypeDraft3Validator {
    options: Vec<TypeOption>,
    location: Location,
}

impl TypeDraft3Validator {
    fn matches(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> bool {
        self.options.iter().any(|option| match option {
            TypeOption::Any => true,
            TypeOption::Name(type_name) => matches_type(*type_name, true, instance),
            TypeOption::Schema(node) => {
                let snapshot = state.snapshot();
                let valid = node.is_valid(state, location, instance);
                state.rollback(snapshot);
                valid
            }
        })
    }
}

impl Validate for TypeDraft3Validator {
    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        self.matches(state, location, instance)
    }

    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if self.matches(state, location, instance) {
            Ok(())
        } else {
            let mut types = PrimitiveTypesBitMap::new();
            for option in &self.options {
                if let TypeOption::Name(type_name) = option {
                    types = types.add_type(*type_name);
                }
            }
            Err(ValidationError::multiple_type_error(
                self.location.clone(),
                location.into(),
                instance,
                types,
            ))
        }
    }
}

fn compile_option(ctx: &Context, index: usize, value: &Value) -> Result<TypeOption, ValidationError> {
    match value {
        Value::String(name) if name == "any" => Ok(TypeOption::Any),
        Value::String(name) => match PrimitiveType::try_from(name.as_str()) {
            Ok(type_name) => Ok(TypeOption::Name(type_name)),
            Err(()) => Err(malformed(ctx, value)),
        },
        Value::Object(_) => {
            let ctx = ctx.with_path("type").with_path(index);
            Ok(TypeOption::Schema(ctx.compile(value)?))
        }
        _ => Err(malformed(ctx, value)),
    }
}

fn malformed(ctx: &Context, schema: &Value) -> ValidationError {
    ValidationError::malformed(
        ctx.location().join("type"),
        schema,
        "type",
        format!("expected type names or schemas, got {schema}"),
    )
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("type");
    let options = match schema {
        Value::Array(entries) => {
            let mut options = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                match compile_option(ctx, index, entry) {
                    Ok(option) => options.push(option),
                    Err(error) => return Some(Err(error)),
                }
            }
            options
        }
        single => match compile_option(ctx, 0, single) {
            Ok(option) => vec![option],
            Err(error) => return Some(Err(error)),
        },
    };
    Some(Ok(Box::new(TypeDraft3Validator { options, location })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    fn draft3(mut schema: Value) -> Value {
        schema["$schema"] = json!("http://json-schema.org/draft-03/schema");
        schema
    }

    #[test_case(json!({"type": "any"}), json!({"a": 1}), true)]
    #[test_case(json!({"type": "string"}), json!("x"), true)]
    #[test_case(json!({"type": ["string", "integer"]}), json!(3), true)]
    #[test_case(json!({"type": ["string", {"minimum": 5}]}), json!(7), true; "schemas in the union")]
    #[test_case(json!({"type": ["string", {"minimum": 5}]}), json!(3), false)]
    #[test_case(json!({"type": "integer"}), json!(1.0), false; "draft3 integers are strict")]
    fn draft3_type(schema: Value, instance: Value, expected: bool) {
        let validator = crate::validator_for(&draft3(schema)).expect("valid schema");
        assert_eq!(validator.is_valid(&instance), expected);
    }
}
