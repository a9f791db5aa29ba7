use ahash::AHashSet;
use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::{EvalState, ItemKey},
    node::SchemaNode,
    paths::{LazyLocation, Location, LocationSegment},
    primitive_type::PrimitiveType,
    validator::Validate,
};

macro_rules! num_cmp {
    ($method:ident, $left:expr, $right:expr) => {
        if let Some(b) = $right.as_u64() {
            NumCmp::$method($left, b)
        } else if let Some(b) = $right.as_i64() {
            NumCmp::$method($left, b)
        } else {
            NumCmp::$method($left, $right.as_f64().expect("Always valid"))
        }
    };
}

macro_rules! compare {
    ($name:ident, $method:ident) => {
        #[inline]
        pub(crate) fn $name(left: &Number, right: &Number) -> bool {
            if let Some(a) = left.as_u64() {
                num_cmp!($method, a, right)
            } else if let Some(a) = left.as_i64() {
                num_cmp!($method, a, right)
            } else {
                let a = left.as_f64().expect("Always valid");
                num_cmp!($method, a, right)
            }
        }
    };
}

compare!(num_eq, num_eq);
compare!(num_lt, num_lt);
compare!(num_le, num_le);
compare!(num_gt, num_gt);
compare!(num_ge, num_ge);

/// JSON equality with number coercion: `1 == 1.0`, arrays elementwise,
/// objects by key set.
#[inline]
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => num_eq(left, right),
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[inline]
pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| equal(a, b))
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, a)| right.get(key).map_or(false, |b| equal(a, b)))
}

/// Read a keyword that must hold a non-negative integer limit.
pub(crate) fn expect_limit(
    ctx: &Context,
    keyword: &'static str,
    schema: &Value,
) -> Result<u64, ValidationError> {
    match schema.as_u64() {
        Some(limit) => Ok(limit),
        None => {
            if let Some(value) = schema.as_f64() {
                if value.trunc() == value && value >= 0.0 {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    return Ok(value as u64);
                }
            }
            Err(ValidationError::malformed(
                ctx.location().join(keyword),
                schema,
                keyword,
                format!("expected a non-negative integer, got {schema}"),
            ))
        }
    }
}

/// Read a keyword that must hold a number.
pub(crate) fn expect_number<'s>(
    ctx: &Context,
    keyword: &'static str,
    schema: &'s Value,
) -> Result<&'s Number, ValidationError> {
    schema.as_number().ok_or_else(|| {
        ValidationError::malformed(
            ctx.location().join(keyword),
            schema,
            keyword,
            format!("expected a {}, got {schema}", PrimitiveType::Number),
        )
    })
}

/// Fold several subschema errors into a single error value.
pub(crate) fn composite_error(
    schema_path: Location,
    location: &LazyLocation,
    instance: &Value,
    mut errors: Vec<ValidationError>,
) -> ValidationError {
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        ValidationError::schema(schema_path, location.into(), instance, errors)
    }
}

/// Validate `child_instance` one segment below `location`.
///
/// Annotations produced at the child location are dropped afterwards: they
/// are only consumed by `unevaluated*` keywords inside the child subschema
/// itself, and keeping them would leak marks between cousin subschemas.
pub(crate) fn validate_child<'a>(
    node: &SchemaNode,
    state: &mut EvalState,
    location: &'a LazyLocation<'a, 'a>,
    segment: impl Into<LocationSegment<'a>>,
    child_instance: &Value,
) -> Result<(), ValidationError> {
    let child_location = location.push(segment);
    let result = node.validate(state, &child_location, child_instance);
    state.take_evaluated(&Location::from(&child_location));
    result
}

pub(crate) fn is_valid_child<'a>(
    node: &SchemaNode,
    state: &mut EvalState,
    location: &'a LazyLocation<'a, 'a>,
    segment: impl Into<LocationSegment<'a>>,
    child_instance: &Value,
) -> bool {
    let child_location = location.push(segment);
    let valid = node.is_valid(state, &child_location, child_instance);
    state.take_evaluated(&Location::from(&child_location));
    valid
}

/// Run an in-place application of a subschema at the current instance
/// location with transactional annotation semantics: the outer evaluated set
/// is hidden from the subschema, contributions merge back on success, and
/// failure restores the prior state.
pub(crate) fn in_place<F>(
    state: &mut EvalState,
    location: &LazyLocation,
    run: F,
) -> Result<(), ValidationError>
where
    F: FnOnce(&mut EvalState) -> Result<(), ValidationError>,
{
    let instance_location = Location::from(location);
    let snapshot = state.snapshot();
    let outer = state.take_evaluated(&instance_location);
    match run(state) {
        Ok(()) => {
            state.merge_evaluated(&instance_location, outer);
            Ok(())
        }
        Err(error) => {
            state.rollback(snapshot);
            Err(error)
        }
    }
}

/// The boolean fast-path twin of [`in_place`].
pub(crate) fn in_place_valid<F>(state: &mut EvalState, location: &LazyLocation, run: F) -> bool
where
    F: FnOnce(&mut EvalState) -> bool,
{
    let instance_location = Location::from(location);
    let snapshot = state.snapshot();
    let outer = state.take_evaluated(&instance_location);
    if run(state) {
        state.merge_evaluated(&instance_location, outer);
        true
    } else {
        state.rollback(snapshot);
        false
    }
}

/// Mark a batch of keys as evaluated at the current instance location.
pub(crate) fn mark_all(state: &mut EvalState, location: &LazyLocation, keys: Vec<ItemKey>) {
    if keys.is_empty() {
        return;
    }
    let instance_location = Location::from(location);
    state.merge_evaluated(&instance_location, AHashSet::from_iter(keys));
}

#[cfg(test)]
mod tests {
    use super::equal;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!(1), &json!(1.0))]
    #[test_case(&json!([2]), &json!([2.0]))]
    #[test_case(&json!([-3]), &json!([-3.0]))]
    #[test_case(&json!({"a": 1}), &json!({"a": 1.0}))]
    fn are_equal(left: &Value, right: &Value) {
        assert!(equal(left, right));
    }

    #[test_case(&json!(1), &json!(2.0))]
    #[test_case(&json!([]), &json!(["foo"]))]
    #[test_case(&json!([-3]), &json!([-4.0]))]
    #[test_case(&json!({"a": 1}), &json!({"a": 1.0, "b": 2}))]
    #[test_case(&json!("1"), &json!(1))]
    fn are_not_equal(left: &Value, right: &Value) {
        assert!(!equal(left, right));
    }
}
