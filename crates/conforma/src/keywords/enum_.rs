use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct EnumValidator {
    options: Value,
    items: Vec<Value>,
    location: Location,
}

impl EnumValidator {
    #[inline]
    pub(crate) fn compile(schema: &Value, items: &[Value], location: Location) -> CompilationResult {
        Ok(Box::new(EnumValidator {
            options: schema.clone(),
            items: items.to_vec(),
            location,
        }))
    }
}

impl Validate for EnumValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        self.items.iter().any(|item| helpers::equal(instance, item))
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
            Err(ValidationError::enumeration(
                self.location.clone(),
                location.into(),
                instance,
                self.options.clone(),
            ))
        }
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    if let Value::Array(items) = schema {
        Some(EnumValidator::compile(
            schema,
            items,
            ctx.location().join("enum"),
        ))
    } else {
        Some(Err(ValidationError::malformed(
            ctx.location().join("enum"),
            schema,
            "enum",
            format!("expected an array of options, got {schema}"),
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(2))]
    #[test_case(&json!({"enum": [1.0]}), &json!(1); "numeric coercion")]
    #[test_case(&json!({"enum": [[{"b": 1.0}]]}), &json!([{"b": 1}]))]
    fn enum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(4))]
    #[test_case(&json!({"enum": []}), &json!(null); "empty enum rejects everything")]
    #[test_case(&json!({"enum": ["red", "green", "blue"]}), &json!("yellow"))]
    fn enum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn malformed_enum_fails_the_build() {
        assert!(crate::validator_for(&json!({"enum": 12})).is_err());
    }
}
