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

/// Applies a subschema to every property that no in-place applicator
/// evaluated. Runs last in dialect order, after every keyword that can
/// contribute to the evaluated set.
pub(crate) struct UnevaluatedPropertiesValidator {
    node: SchemaNode,
    is_false: bool,
    location: Location,
}

impl UnevaluatedPropertiesValidator {
    #[inline]
    pub(crate) fn compile(ctx: &Context, schema: &Value) -> CompilationResult {
        let keyword_ctx = ctx.with_path("unevaluatedProperties");
        Ok(Box::new(UnevaluatedPropertiesValidator {
            node: keyword_ctx.compile(schema)?,
            is_false: schema == &Value::Bool(false),
            location: ctx.location().join("unevaluatedProperties"),
        }))
    }

    fn pending(
        &self,
        state: &EvalState,
        instance_location: &Location,
        object: &Map<String, Value>,
    ) -> Vec<String> {
        object
            .keys()
            .filter(|name| {
                !state.is_evaluated(instance_location, &ItemKey::Property((*name).clone()))
            })
            .cloned()
            .collect()
    }
}

impl Validate for UnevaluatedPropertiesValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        let instance_location = Location::from(location);
        let mut unexpected = Vec::new();
        let mut errors = Vec::new();
        let mut evaluated = Vec::new();
        for name in self.pending(state, &instance_location, object) {
            let value = &object[&name];
            match helpers::validate_child(&self.node, state, location, &name, value) {
                Ok(()) => evaluated.push(ItemKey::Property(name)),
                Err(error) => {
                    unexpected.push(name);
                    errors.push(error);
                }
            }
        }
        if errors.is_empty() {
            helpers::mark_all(state, location, evaluated);
            Ok(())
        } else if self.is_false {
            Err(ValidationError::unevaluated_properties(
                self.location.clone(),
                location.into(),
                instance,
                unexpected,
            ))
        } else {
            Err(helpers::composite_error(
                self.location.clone(),
                location,
                instance,
                errors,
            ))
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let Value::Object(object) = instance else {
            return true;
        };
        let instance_location = Location::from(location);
        let mut valid = true;
        let mut evaluated = Vec::new();
        for name in self.pending(state, &instance_location, object) {
            let value = &object[&name];
            if helpers::is_valid_child(&self.node, state, location, &name, value) {
                evaluated.push(ItemKey::Property(name));
            } else {
                valid = false;
            }
        }
        if valid {
            helpers::mark_all(state, location, evaluated);
        }
        valid
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(UnevaluatedPropertiesValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(
        &json!({"properties": {"a": {}}, "unevaluatedProperties": false}),
        &json!({"a": 1})
    )]
    #[test_case(
        &json!({"allOf": [{"properties": {"a": {}}}], "unevaluatedProperties": false}),
        &json!({"a": 1});
        "marks flow out of allOf"
    )]
    #[test_case(
        &json!({"anyOf": [{"properties": {"a": {}}}, {"properties": {"b": {}}}], "unevaluatedProperties": false}),
        &json!({"a": 1});
        "marks flow out of passing anyOf branches"
    )]
    #[test_case(
        &json!({
            "if": {"properties": {"kind": {"const": "x"}}, "required": ["kind"]},
            "then": {"properties": {"payload": {}}},
            "unevaluatedProperties": false
        }),
        &json!({"kind": "x", "payload": 1});
        "if and then both contribute"
    )]
    #[test_case(
        &json!({"patternProperties": {"^a": {}}, "unevaluatedProperties": {"type": "integer"}}),
        &json!({"abc": null, "xyz": 3})
    )]
    fn unevaluated_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(
        &json!({"properties": {"a": {}}, "unevaluatedProperties": false}),
        &json!({"a": 1, "b": 2})
    )]
    #[test_case(
        &json!({"not": {"properties": {"a": {}}, "required": ["a"], "type": "null"}, "unevaluatedProperties": false}),
        &json!({"a": 1});
        "not contributes nothing"
    )]
    #[test_case(
        &json!({
            "if": {"properties": {"kind": {"const": "x"}}, "required": ["kind"]},
            "unevaluatedProperties": false
        }),
        &json!({"kind": "other"});
        "a failed if contributes nothing"
    )]
    fn unevaluated_properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn cousin_marks_stay_invisible() {
        // The inner unevaluatedProperties cannot see marks made by the
        // sibling branch of the outer allOf.
        let schema = json!({
            "allOf": [
                {"properties": {"a": {"properties": {"x": {}}}}},
                {"properties": {"a": {"unevaluatedProperties": false}}}
            ]
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(!validator.is_valid(&json!({"a": {"x": 1}})));
        assert!(validator.is_valid(&json!({"a": {}})));
    }

    #[test]
    fn rejected_keys_are_listed() {
        tests_util::expect_message(
            &json!({"properties": {"a": {}}, "unevaluatedProperties": false}),
            &json!({"a": 1, "b": 2}),
            "unevaluatedProperties: properties not allowed: [b]",
        );
    }
}
