use serde_json::{Map, Number, Value};
use std::convert::TryFrom;

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    validator::Validate,
};

pub(crate) struct SingleTypeValidator {
    type_name: PrimitiveType,
    strict_integer: bool,
    location: Location,
}

impl SingleTypeValidator {
    #[inline]
    pub(crate) fn compile(
        type_name: PrimitiveType,
        strict_integer: bool,
        location: Location,
    ) -> CompilationResult {
        Ok(Box::new(SingleTypeValidator {
            type_name,
            strict_integer,
            location,
        }))
    }
}

impl Validate for SingleTypeValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        matches_type(self.type_name, self.strict_integer, instance)
    }

    fn validate(
        &self,
        _: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if matches_type(self.type_name, self.strict_integer, instance) {
            Ok(())
        } else {
            Err(ValidationError::single_type_error(
                self.location.clone(),
                location.into(),
                instance,
                self.type_name,
            ))
        }
    }
}

pub(crate) struct MultipleTypesValidator {
    types: PrimitiveTypesBitMap,
    strict_integer: bool,
    location: Location,
}

impl MultipleTypesValidator {
    #[inline]
    pub(crate) fn compile(
        types: PrimitiveTypesBitMap,
        strict_integer: bool,
        location: Location,
    ) -> CompilationResult {
        Ok(Box::new(MultipleTypesValidator {
            types,
            strict_integer,
            location,
        }))
    }
}

impl Validate for MultipleTypesValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        self.types
            .iter()
            .any(|type_name| matches_type(type_name, self.strict_integer, instance))
    }

    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if self.is_valid(state, location, instance) {
            Ok(())
        } else {
            Err(ValidationError::multiple_type_error(
                self.location.clone(),
                location.into(),
                instance,
                self.types,
            ))
        }
    }
}

/// Whether `instance` matches one type name.
///
/// The integer name passes on numbers with a zero fractional part unless
/// strictness is requested (explicitly, or implicitly by drafts ≤ 4).
pub(crate) fn matches_type(
    type_name: PrimitiveType,
    strict_integer: bool,
    instance: &Value,
) -> bool {
    match (type_name, instance) {
        (PrimitiveType::Array, Value::Array(_))
        | (PrimitiveType::Boolean, Value::Bool(_))
        | (PrimitiveType::Null, Value::Null)
        | (PrimitiveType::Number, Value::Number(_))
        | (PrimitiveType::Object, Value::Object(_))
        | (PrimitiveType::String, Value::String(_)) => true,
        (PrimitiveType::Integer, Value::Number(number)) => is_integer(number, strict_integer),
        _ => false,
    }
}

#[inline]
pub(crate) fn is_integer(number: &Number, strict: bool) -> bool {
    if number.is_u64() || number.is_i64() {
        return true;
    }
    !strict && number.as_f64().expect("Always valid").fract() == 0.0
}

pub(crate) fn strictness(ctx: &Context) -> bool {
    ctx.config().is_strict_integer() || ctx.draft() <= referencing::Draft::Draft4
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("type");
    let strict_integer = strictness(ctx);
    match schema {
        Value::String(name) => Some(compile_single(ctx, schema, name, strict_integer, location)),
        Value::Array(names) => {
            let mut types = PrimitiveTypesBitMap::new();
            for name in names {
                let Some(name) = name.as_str() else {
                    return Some(Err(malformed(ctx, schema)));
                };
                match PrimitiveType::try_from(name) {
                    Ok(type_name) => types |= type_name,
                    Err(()) => return Some(Err(malformed(ctx, schema))),
                }
            }
            if types.len() == 1 {
                let type_name = types.iter().next().expect("Exactly one type");
                Some(SingleTypeValidator::compile(
                    type_name,
                    strict_integer,
                    location,
                ))
            } else {
                Some(MultipleTypesValidator::compile(
                    types,
                    strict_integer,
                    location,
                ))
            }
        }
        _ => Some(Err(malformed(ctx, schema))),
    }
}

pub(crate) fn compile_single(
    ctx: &Context,
    schema: &Value,
    name: &str,
    strict_integer: bool,
    location: Location,
) -> CompilationResult {
    match PrimitiveType::try_from(name) {
        Ok(type_name) => SingleTypeValidator::compile(type_name, strict_integer, location),
        Err(()) => Err(malformed(ctx, schema)),
    }
}

fn malformed(ctx: &Context, schema: &Value) -> ValidationError {
    ValidationError::malformed(
        ctx.location().join("type"),
        schema,
        "type",
        format!("expected a type name or an array of type names, got {schema}"),
    )
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"type": "string"}), &json!("hello"))]
    #[test_case(&json!({"type": "integer"}), &json!(7))]
    #[test_case(&json!({"type": "integer"}), &json!(1.0); "integral float is an integer")]
    #[test_case(&json!({"type": "number"}), &json!(7); "integer is a number")]
    #[test_case(&json!({"type": ["integer", "string"]}), &json!("x"))]
    #[test_case(&json!({"type": "null"}), &json!(null))]
    fn type_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"type": "string"}), &json!(0))]
    #[test_case(&json!({"type": "integer"}), &json!(1.5))]
    #[test_case(&json!({"type": ["integer", "string"]}), &json!(null))]
    #[test_case(&json!({"type": "boolean"}), &json!(0); "zero is not false")]
    fn type_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn strict_integer_rejects_integral_floats() {
        let schema = json!({"type": "integer"});
        let validator = crate::options()
            .strict_integer(true)
            .build(&schema)
            .expect("valid schema");
        assert!(validator.is_valid(&json!(1)));
        assert!(!validator.is_valid(&json!(1.0)));
    }

    #[test]
    fn draft4_is_always_strict_about_integers() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-04/schema",
            "type": "integer"
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(!validator.is_valid(&json!(1.0)));
    }

    #[test_case(&json!({"type": 12}))]
    #[test_case(&json!({"type": "unicorn"}))]
    #[test_case(&json!({"type": ["string", 5]}))]
    fn malformed_type_values_fail_the_build(schema: &Value) {
        assert!(crate::validator_for(schema).is_err());
    }

    #[test]
    fn error_message_names_the_expected_type() {
        tests_util::expect_message(&json!({"type": "string"}), &json!(0), "type: not a string - 0");
    }
}
