use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct RequiredValidator {
    required: Vec<String>,
    location: Location,
}

impl RequiredValidator {
    #[inline]
    pub(crate) fn compile(required: Vec<String>, location: Location) -> CompilationResult {
        Ok(Box::new(RequiredValidator { required, location }))
    }
}

impl Validate for RequiredValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Object(object) = instance {
            self.required.iter().all(|name| object.contains_key(name))
        } else {
            true
        }
    }

    fn validate(
        &self,
        _: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if let Value::Object(object) = instance {
            let missing: Vec<String> = self
                .required
                .iter()
                .filter(|name| !object.contains_key(*name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(ValidationError::required(
                    self.location.clone(),
                    location.into(),
                    instance,
                    missing,
                ));
            }
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("required");
    match schema {
        Value::Array(names) => {
            let mut required = Vec::with_capacity(names.len());
            for name in names {
                match name.as_str() {
                    Some(name) => required.push(name.to_string()),
                    None => {
                        return Some(Err(ValidationError::malformed(
                            location,
                            schema,
                            "required",
                            format!("expected an array of property names, got {schema}"),
                        )))
                    }
                }
            }
            Some(RequiredValidator::compile(required, location))
        }
        _ => Some(Err(ValidationError::malformed(
            location,
            schema,
            "required",
            format!("expected an array of property names, got {schema}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"required": ["name"]}), &json!({"name": "x"}))]
    #[test_case(&json!({"required": []}), &json!({}))]
    #[test_case(&json!({"required": ["name"]}), &json!([]); "non-objects pass")]
    fn required_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn missing_properties_are_listed_together() {
        tests_util::expect_message(
            &json!({"required": ["name"]}),
            &json!({"age": 30}),
            "required: missing properties (at least): [name]",
        );
        tests_util::expect_message(
            &json!({"required": ["foo", "bar"]}),
            &json!({}),
            "required: missing properties (at least): [foo, bar]",
        );
    }
}
