//! Draft 3 `disallow`: a negated type union.
use serde_json::{Map, Value};
use std::convert::TryFrom;

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{type_::matches_type, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};

enum DisallowOption {
    Name(PrimitiveType),
    Any,
    Schema(SchemaNode),
}

pub(crate) struct DisallowValidator {
    options: Vec<DisallowOption>,
    original: Value,
    location: Location,
}

impl DisallowValidator {
    fn matches(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        self.options.iter().any(|option| match option {
            DisallowOption::Any => true,
            DisallowOption::Name(type_name) => matches_type(*type_name, true, instance),
            DisallowOption::Schema(node) => {
                let snapshot = state.snapshot();
                let valid = node.is_valid(state, location, instance);
                state.rollback(snapshot);
                valid
            }
        })
    }
}

impl Validate for DisallowValidator {
    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        !self.matches(state, location, instance)
    }

    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if self.matches(state, location, instance) {
            Err(ValidationError::disallow(
                self.location.clone(),
                location.into(),
                instance,
                self.original.clone(),
            ))
        } else {
            Ok(())
        }
    }
}

fn compile_option(
    ctx: &Context,
    index: usize,
    value: &Value,
) -> Result<DisallowOption, ValidationError> {
    match value {
        Value::String(name) if name == "any" => Ok(DisallowOption::Any),
        Value::String(name) => match PrimitiveType::try_from(name.as_str()) {
            Ok(type_name) => Ok(DisallowOption::Name(type_name)),
            Err(()) => Err(ValidationError::malformed(
                ctx.location().join("disallow"),
                value,
                "disallow",
                format!("expected type names or schemas, got {value}"),
            )),
        },
        Value::Object(_) => {
            let ctx = ctx.with_path("disallow").with_path(index);
            Ok(DisallowOption::Schema(ctx.compile(value)?))
        }
        _ => Err(ValidationError::malformed(
            ctx.location().join("disallow"),
            value,
            "disallow",
            format!("expected type names or schemas, got {value}"),
        )),
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("disallow");
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
    Some(Ok(Box::new(DisallowValidator {
        options,
        original: schema.clone(),
        location,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    fn draft3(mut schema: Value) -> Value {
        schema["$schema"] = json!("http://json-schema.org/draft-03/schema");
        schema
    }

    #[test_case(json!({"disallow": "integer"}), json!("x"), true)]
    #[test_case(json!({"disallow": "integer"}), json!(1), false)]
    #[test_case(json!({"disallow": ["integer", "string"]}), json!(null), true)]
    #[test_case(json!({"disallow": ["integer", "string"]}), json!("x"), false)]
    #[test_case(json!({"disallow": [{"minimum": 5}]}), json!(3), true)]
    #[test_case(json!({"disallow": [{"minimum": 5}]}), json!(7), false)]
    fn disallow(schema: Value, instance: Value, expected: bool) {
        let validator = crate::validator_for(&draft3(schema)).expect("valid schema");
        assert_eq!(validator.is_valid(&instance), expected);
    }
}
