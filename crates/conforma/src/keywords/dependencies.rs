//! The dependency family: draft ≤ 7 `dependencies`, its 2019-09 split into
//! `dependentRequired` / `dependentSchemas`, and draft-next
//! `propertyDependencies`.
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct DependentRequiredValidator {
    keyword: &'static str,
    requirements: Vec<(String, Vec<String>)>,
    location: Location,
}

impl Validate for DependentRequiredValidator {
    fn validate(
        &self,
        _: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        for (property, required) in &self.requirements {
            if !object.contains_key(property) {
                continue;
            }
            let missing: Vec<String> = required
                .iter()
                .filter(|name| !object.contains_key(*name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(ValidationError::dependent_required(
                    self.location.clone(),
                    location.into(),
                    instance,
                    self.keyword,
                    property.clone(),
                    missing,
                ));
            }
        }
        Ok(())
    }

    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::Object(object) = instance {
            self.requirements.iter().all(|(property, required)| {
                !object.contains_key(property)
                    || required.iter().all(|name| object.contains_key(name))
            })
        } else {
            true
        }
    }
}

pub(crate) struct DependentSchemasValidator {
    dependencies: Vec<(String, SchemaNode)>,
    location: Location,
}

impl Validate for DependentSchemasValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        let mut errors = Vec::new();
        for (property, node) in &self.dependencies {
            if !object.contains_key(property) {
                continue;
            }
            if let Err(error) = helpers::in_place(state, location, |state| {
                node.validate(state, location, instance)
            }) {
                errors.push(error);
            }
        }
        if errors.is_empty() {
            Ok(())
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
        self.dependencies.iter().all(|(property, node)| {
            !object.contains_key(property)
                || helpers::in_place_valid(state, location, |state| {
                    node.is_valid(state, location, instance)
                })
        })
    }
}

/// Draft-next `propertyDependencies`: selected by the string value of a
/// property instead of its presence.
pub(crate) struct PropertyDependenciesValidator {
    dependencies: Vec<(String, Vec<(String, SchemaNode)>)>,
    location: Location,
}

impl Validate for PropertyDependenciesValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(object) = instance else {
            return Ok(());
        };
        let mut errors = Vec::new();
        for (property, variants) in &self.dependencies {
            let Some(Value::String(actual)) = object.get(property) else {
                continue;
            };
            for (expected, node) in variants {
                if actual == expected {
                    if let Err(error) = helpers::in_place(state, location, |state| {
                        node.validate(state, location, instance)
                    }) {
                        errors.push(error);
                    }
                }
            }
        }
        if errors.is_empty() {
            Ok(())
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
        self.dependencies.iter().all(|(property, variants)| {
            let Some(Value::String(actual)) = object.get(property) else {
                return true;
            };
            variants.iter().all(|(expected, node)| {
                actual != expected
                    || helpers::in_place_valid(state, location, |state| {
                        node.is_valid(state, location, instance)
                    })
            })
        })
    }
}

fn requirement_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(name) => Some(vec![name.clone()]),
        Value::Array(names) => names
            .iter()
            .map(|name| name.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Draft ≤ 7 `dependencies`: strings and arrays are requirements, anything
/// schema-shaped is a conditional schema.
#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("dependencies");
    let Value::Object(map) = schema else {
        return Some(Err(ValidationError::malformed(
            location,
            schema,
            "dependencies",
            format!("expected an object, got {schema}"),
        )));
    };
    let keyword_ctx = ctx.with_path("dependencies");
    let mut requirements = Vec::new();
    let mut schemas = Vec::new();
    for (property, dependency) in map {
        match dependency {
            Value::String(_) | Value::Array(_) => match requirement_list(dependency) {
                Some(required) => requirements.push((property.clone(), required)),
                None => {
                    return Some(Err(ValidationError::malformed(
                        location,
                        schema,
                        "dependencies",
                        format!("expected property names for \"{property}\""),
                    )))
                }
            },
            _ => {
                let ctx = keyword_ctx.with_path(property.as_str());
                match ctx.compile(dependency) {
                    Ok(node) => schemas.push((property.clone(), node)),
                    Err(error) => return Some(Err(error)),
                }
            }
        }
    }
    let requirement_check = DependentRequiredValidator {
        keyword: "dependencies",
        requirements,
        location: location.clone(),
    };
    let schema_check = DependentSchemasValidator {
        dependencies: schemas,
        location,
    };
    Some(Ok(Box::new(CombinedDependenciesValidator {
        requirement_check,
        schema_check,
    })))
}

pub(crate) struct CombinedDependenciesValidator {
    requirement_check: DependentRequiredValidator,
    schema_check: DependentSchemasValidator,
}

impl Validate for CombinedDependenciesValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        self.requirement_check.validate(state, location, instance)?;
        self.schema_check.validate(state, location, instance)
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        self.requirement_check.is_valid(state, location, instance)
            && self.schema_check.is_valid(state, location, instance)
    }
}

#[inline]
pub(crate) fn compile_dependent_required(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("dependentRequired");
    let Value::Object(map) = schema else {
        return Some(Err(ValidationError::malformed(
            location,
            schema,
            "dependentRequired",
            format!("expected an object, got {schema}"),
        )));
    };
    let mut requirements = Vec::with_capacity(map.len());
    for (property, dependency) in map {
        match requirement_list(dependency) {
            Some(required) => requirements.push((property.clone(), required)),
            None => {
                return Some(Err(ValidationError::malformed(
                    location,
                    schema,
                    "dependentRequired",
                    format!("expected property names for \"{property}\""),
                )))
            }
        }
    }
    Some(Ok(Box::new(DependentRequiredValidator {
        keyword: "dependentRequired",
        requirements,
        location,
    })))
}

#[inline]
pub(crate) fn compile_dependent_schemas(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("dependentSchemas");
    let Value::Object(map) = schema else {
        return Some(Err(ValidationError::malformed(
            location,
            schema,
            "dependentSchemas",
            format!("expected an object of schemas, got {schema}"),
        )));
    };
    let keyword_ctx = ctx.with_path("dependentSchemas");
    let mut dependencies = Vec::with_capacity(map.len());
    for (property, subschema) in map {
        let ctx = keyword_ctx.with_path(property.as_str());
        match ctx.compile(subschema) {
            Ok(node) => dependencies.push((property.clone(), node)),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(DependentSchemasValidator {
        dependencies,
        location,
    })))
}

#[inline]
pub(crate) fn compile_property_dependencies(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("propertyDependencies");
    let Value::Object(map) = schema else {
        return Some(Err(ValidationError::malformed(
            location,
            schema,
            "propertyDependencies",
            format!("expected an object, got {schema}"),
        )));
    };
    let keyword_ctx = ctx.with_path("propertyDependencies");
    let mut dependencies = Vec::with_capacity(map.len());
    for (property, variants) in map {
        let Value::Object(variants) = variants else {
            return Some(Err(ValidationError::malformed(
                location,
                schema,
                "propertyDependencies",
                format!("expected an object of schemas for \"{property}\""),
            )));
        };
        let property_ctx = keyword_ctx.with_path(property.as_str());
        let mut compiled = Vec::with_capacity(variants.len());
        for (expected, subschema) in variants {
            let ctx = property_ctx.with_path(expected.as_str());
            match ctx.compile(subschema) {
                Ok(node) => compiled.push((expected.clone(), node)),
                Err(error) => return Some(Err(error)),
            }
        }
        dependencies.push((property.clone(), compiled));
    }
    Some(Ok(Box::new(PropertyDependenciesValidator {
        dependencies,
        location,
    })))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!({"bar": 1, "foo": 2}))]
    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!({"foo": 1}); "absent trigger")]
    #[test_case(&json!({"dependencies": {"bar": {"minProperties": 2}}}), &json!({"bar": 1, "x": 2}))]
    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!(12); "non-objects pass")]
    fn dependencies_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!({"bar": 1}))]
    #[test_case(&json!({"dependencies": {"bar": {"minProperties": 2}}}), &json!({"bar": 1}))]
    fn dependencies_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"bar": 1, "foo": 2}))]
    #[test_case(&json!({"dependentSchemas": {"bar": {"minProperties": 2}}}), &json!({"bar": 1, "x": 2}))]
    fn split_forms_are_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"bar": 1}))]
    #[test_case(&json!({"dependentSchemas": {"bar": {"minProperties": 2}}}), &json!({"bar": 1}))]
    fn split_forms_are_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn draft3_string_form() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-03/schema",
            "dependencies": {"bar": "foo"}
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!({"bar": 1, "foo": 2})));
        assert!(!validator.is_valid(&json!({"bar": 1})));
    }

    #[test]
    fn property_dependencies_select_by_value() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/next/schema",
            "propertyDependencies": {
                "kind": {"file": {"required": ["path"]}}
            }
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!({"kind": "file", "path": "/x"})));
        assert!(validator.is_valid(&json!({"kind": "dir"})));
        assert!(!validator.is_valid(&json!({"kind": "file"})));
    }
}
