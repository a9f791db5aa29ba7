use referencing::Draft;
use serde_json::{Map, Number, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct MinimumValidator {
    limit: Number,
    /// Draft 3/4 spell exclusivity as a sibling boolean modifier.
    exclusive: bool,
    location: Location,
}

impl MinimumValidator {
    #[inline]
    pub(crate) fn compile(limit: Number, exclusive: bool, location: Location) -> CompilationResult {
        Ok(Box::new(MinimumValidator {
            limit,
            exclusive,
            location,
        }))
    }
}

impl Validate for MinimumValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Number(number) = instance {
            if self.exclusive {
                helpers::num_gt(number, &self.limit)
            } else {
                helpers::num_ge(number, &self.limit)
            }
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
        } else if self.exclusive {
            Err(ValidationError::exclusive_minimum(
                self.location.clone(),
                location.into(),
                instance,
                Value::Number(self.limit.clone()),
            ))
        } else {
            Err(ValidationError::minimum(
                self.location.clone(),
                location.into(),
                instance,
                Value::Number(self.limit.clone()),
            ))
        }
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let limit = match helpers::expect_number(ctx, "minimum", schema) {
        Ok(limit) => limit.clone(),
        Err(error) => return Some(Err(error)),
    };
    let exclusive = ctx.draft() <= Draft::Draft4
        && parent.get("exclusiveMinimum").and_then(Value::as_bool) == Some(true);
    Some(MinimumValidator::compile(
        limit,
        exclusive,
        ctx.location().join("minimum"),
    ))
}
