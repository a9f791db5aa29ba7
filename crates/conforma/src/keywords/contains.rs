use referencing::Draft;
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::{EvalState, ItemKey},
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

/// `contains` with its 2019-09 companions `minContains` / `maxContains`
/// folded in; the companions are consumed here and have no standalone
/// compiled form.
pub(crate) struct ContainsValidator {
    node: SchemaNode,
    min: u64,
    /// Whether `minContains` was spelled out, for error selection.
    explicit_min: bool,
    max: Option<u64>,
    location: Location,
}

impl ContainsValidator {
    fn count_matches(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        items: &[Value],
    ) -> Vec<usize> {
        let mut matched = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let snapshot = state.snapshot();
            if helpers::is_valid_child(&self.node, state, location, index, item) {
                matched.push(index);
            } else {
                state.rollback(snapshot);
            }
        }
        matched
    }
}

impl Validate for ContainsValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Array(items) = instance else {
            return Ok(());
        };
        let matched = self.count_matches(state, location, items);
        let count = matched.len() as u64;
        if let Some(max) = self.max {
            if count > max {
                return Err(ValidationError::max_contains(
                    self.location.clone(),
                    location.into(),
                    instance,
                    max,
                ));
            }
        }
        if count < self.min {
            return Err(if self.explicit_min {
                ValidationError::min_contains(
                    self.location.clone(),
                    location.into(),
                    instance,
                    self.min,
                )
            } else {
                ValidationError::contains(self.location.clone(), location.into(), instance)
            });
        }
        helpers::mark_all(
            state,
            location,
            matched.into_iter().map(ItemKey::Index).collect(),
        );
        Ok(())
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let Value::Array(items) = instance else {
            return true;
        };
        let matched = self.count_matches(state, location, items);
        let count = matched.len() as u64;
        if count < self.min || self.max.map_or(false, |max| count > max) {
            return false;
        }
        helpers::mark_all(
            state,
            location,
            matched.into_iter().map(ItemKey::Index).collect(),
        );
        true
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("contains");
    let keyword_ctx = ctx.with_path("contains");
    let node = match keyword_ctx.compile(schema) {
        Ok(node) => node,
        Err(error) => return Some(Err(error)),
    };
    let mut min = 1;
    let mut explicit_min = false;
    let mut max = None;
    if ctx.draft() >= Draft::Draft201909 {
        if let Some(value) = parent.get("minContains") {
            match helpers::expect_limit(ctx, "minContains", value) {
                Ok(limit) => {
                    min = limit;
                    explicit_min = true;
                }
                Err(error) => return Some(Err(error)),
            }
        }
        if let Some(value) = parent.get("maxContains") {
            match helpers::expect_limit(ctx, "maxContains", value) {
                Ok(limit) => max = Some(limit),
                Err(error) => return Some(Err(error)),
            }
        }
    }
    Some(Ok(Box::new(ContainsValidator {
        node,
        min,
        explicit_min,
        max,
        location,
    })))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([2, 5, 3]))]
    #[test_case(&json!({"contains": {"minimum": 5}}), &json!("no items"); "non-arrays pass")]
    #[test_case(&json!({"contains": {"minimum": 5}, "minContains": 0}), &json!([]); "minContains zero relaxes contains")]
    #[test_case(&json!({"contains": {"minimum": 5}, "minContains": 2}), &json!([5, 6]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "maxContains": 2}), &json!([5, 1, 6]))]
    fn contains_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([2, 3, 4]))]
    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "minContains": 2}), &json!([5]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "maxContains": 1}), &json!([5, 6]))]
    #[test_case(&json!({"contains": {"type": "integer"}, "maxContains": 0}), &json!([1]); "maxContains zero rejects any match")]
    fn contains_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn min_contains_zero_still_honours_max_contains() {
        let schema = json!({"contains": {"type": "integer"}, "minContains": 0, "maxContains": 1});
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!([])));
        assert!(validator.is_valid(&json!([1])));
        assert!(!validator.is_valid(&json!([1, 2])));
    }
}
