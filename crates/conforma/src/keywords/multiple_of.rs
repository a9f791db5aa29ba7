use fraction::{BigFraction, BigUint};
use serde_json::{Map, Number, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct MultipleOfValidator {
    keyword: &'static str,
    multiple_of: Number,
    location: Location,
}

impl MultipleOfValidator {
    #[inline]
    pub(crate) fn compile(
        keyword: &'static str,
        multiple_of: Number,
        location: Location,
    ) -> CompilationResult {
        Ok(Box::new(MultipleOfValidator {
            keyword,
            multiple_of,
            location,
        }))
    }
}

/// Whether `value` is a whole multiple of `multiple_of`.
///
/// The float remainder is only trusted when it is exact; otherwise the
/// quotient is recomputed with arbitrary-precision fractions, so cases like
/// `0.0075 % 0.0001` do not fail on binary rounding noise.
fn is_multiple_of(value: f64, multiple_of: f64) -> bool {
    if value.fract() == 0.0 && multiple_of.fract() == 0.0 {
        return value % multiple_of == 0.0;
    }
    let remainder = (value / multiple_of) % 1.0;
    if remainder == 0.0 {
        return true;
    }
    // `BigFraction` converts through the decimal rendering of the floats,
    // so 0.0075 / 0.0001 divides out exactly.
    let fraction = BigFraction::from(value) / BigFraction::from(multiple_of);
    match fraction.denom() {
        Some(denom) => denom == &BigUint::from(1_u8),
        None => false,
    }
}

impl Validate for MultipleOfValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Number(number) = instance {
            let value = number.as_f64().expect("Always valid");
            let multiple_of = self.multiple_of.as_f64().expect("Always valid");
            is_multiple_of(value, multiple_of)
        } else {
            true
        }
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
            Err(ValidationError::multiple_of(
                self.location.clone(),
                location.into(),
                instance,
                self.keyword,
                Value::Number(self.multiple_of.clone()),
            ))
        }
    }
}

fn compile_with_keyword(
    ctx: &Context,
    schema: &Value,
    keyword: &'static str,
) -> Option<CompilationResult> {
    let Some(multiple_of) = schema.as_number() else {
        return Some(Err(ValidationError::malformed(
            ctx.location().join(keyword),
            schema,
            keyword,
            format!("expected a number, got {schema}"),
        )));
    };
    if multiple_of.as_f64().expect("Always valid") <= 0.0 {
        return Some(Err(ValidationError::malformed(
            ctx.location().join(keyword),
            schema,
            keyword,
            format!("the divisor must be positive, got {schema}"),
        )));
    }
    Some(MultipleOfValidator::compile(
        keyword,
        multiple_of.clone(),
        ctx.location().join(keyword),
    ))
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    compile_with_keyword(ctx, schema, "multipleOf")
}

/// The draft 3 spelling.
#[inline]
pub(crate) fn compile_divisible_by(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    compile_with_keyword(ctx, schema, "divisibleBy")
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"multipleOf": 2}), &json!(4))]
    #[test_case(&json!({"multipleOf": 1.0}), &json!(4.0))]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(3.0))]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.0001}), &json!(0.0075); "needs exact arithmetic")]
    #[test_case(&json!({"multipleOf": 2}), &json!("four"); "non-numbers pass")]
    fn multiple_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"multipleOf": 2}), &json!(7))]
    #[test_case(&json!({"multipleOf": 1.0}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.01}), &json!(0.00751))]
    fn multiple_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"multipleOf": 0}); "zero divisor")]
    #[test_case(&json!({"multipleOf": -2}); "negative divisor")]
    #[test_case(&json!({"multipleOf": "2"}); "string divisor")]
    fn invalid_divisors_fail_the_build(schema: &Value) {
        assert!(crate::validator_for(schema).is_err());
    }

    #[test]
    fn divisible_by_is_the_draft3_spelling() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-03/schema",
            "divisibleBy": 3
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!(9)));
        assert!(!validator.is_valid(&json!(10)));
    }
}
