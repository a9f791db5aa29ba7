use serde_json::Value;

use crate::{
    error::ValidationError,
    evaluation::EvalState,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    validator::Validate,
};

/// The `false` schema: no instance is valid.
pub(crate) struct FalseValidator {
    location: Location,
}

impl FalseValidator {
    #[inline]
    pub(crate) fn compile(location: Location) -> CompilationResult {
        Ok(Box::new(FalseValidator { location }))
    }
}

impl Validate for FalseValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, _: &Value) -> bool {
        false
    }

    fn validate(
        &self,
        _: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        Err(ValidationError::false_schema(
            self.location.clone(),
            location.into(),
            instance,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::json;

    #[test]
    fn false_schema_rejects_everything() {
        tests_util::is_not_valid(&json!(false), &json!(1));
        tests_util::is_not_valid(&json!(false), &json!(null));
        tests_util::is_valid(&json!(true), &json!(null));
    }
}
