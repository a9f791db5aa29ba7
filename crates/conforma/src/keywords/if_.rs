//! `if` / `then` / `else`, linked through the evaluation state.
//!
//! `if` runs silently and records its outcome in the slot owned by the
//! enclosing schema object; `then` and `else` read that slot and apply
//! their subschema in place when the recorded outcome selects them.
//! Dialect order guarantees the writer runs before the readers.
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::{EvalState, SlotKey},
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct IfValidator {
    node: SchemaNode,
    parent_location: Location,
}

impl Validate for IfValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let instance_location = Location::from(location);
        let snapshot = state.snapshot();
        let outer = state.take_evaluated(&instance_location);
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: instance_location.clone(),
        };
        match self.node.validate(state, location, instance) {
            Ok(()) => {
                state.merge_evaluated(&instance_location, outer);
                state.set_if_result(slot, true);
            }
            Err(_) => {
                state.rollback(snapshot);
                state.set_if_result(slot, false);
            }
        }
        Ok(())
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let instance_location = Location::from(location);
        let snapshot = state.snapshot();
        let outer = state.take_evaluated(&instance_location);
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: instance_location.clone(),
        };
        if self.node.is_valid(state, location, instance) {
            state.merge_evaluated(&instance_location, outer);
            state.set_if_result(slot, true);
        } else {
            state.rollback(snapshot);
            state.set_if_result(slot, false);
        }
        true
    }
}

/// Runs its subschema when the sibling `if` recorded the selecting outcome.
pub(crate) struct BranchValidator {
    node: SchemaNode,
    runs_on: bool,
    parent_location: Location,
}

impl Validate for BranchValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        };
        if state.if_result(&slot) != Some(self.runs_on) {
            return Ok(());
        }
        helpers::in_place(state, location, |state| {
            self.node.validate(state, location, instance)
        })
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: Location::from(location),
        };
        if state.if_result(&slot) != Some(self.runs_on) {
            return true;
        }
        helpers::in_place_valid(state, location, |state| {
            self.node.is_valid(state, location, instance)
        })
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let keyword_ctx = ctx.with_path("if");
    match keyword_ctx.compile(schema) {
        Ok(node) => Some(Ok(Box::new(IfValidator {
            node,
            parent_location: ctx.location().clone(),
        }))),
        Err(error) => Some(Err(error)),
    }
}

#[inline]
pub(crate) fn compile_then(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    compile_branch(ctx, parent, schema, "then", true)
}

#[inline]
pub(crate) fn compile_else(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    compile_branch(ctx, parent, schema, "else", false)
}

fn compile_branch(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
    keyword: &'static str,
    runs_on: bool,
) -> Option<CompilationResult> {
    // Without a sibling `if` the branch keywords are annotations.
    parent.get("if")?;
    let keyword_ctx = ctx.with_path(keyword);
    match keyword_ctx.compile(schema) {
        Ok(node) => Some(Ok(Box::new(BranchValidator {
            node,
            runs_on,
            parent_location: ctx.location().clone(),
        }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(4))]
    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(-3); "failed if skips then")]
    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(3); "passed if skips else")]
    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(-2))]
    #[test_case(&json!({"then": {"multipleOf": 2}}), &json!(3); "then without if is ignored")]
    #[test_case(&json!({"else": {"multipleOf": 2}}), &json!(3); "else without if is ignored")]
    fn conditional_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(3))]
    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(-3))]
    #[test_case(
        &json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}, "else": {"multipleOf": 3}}),
        &json!(-2)
    )]
    fn conditional_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn branch_failure_paths() {
        let schema = json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}});
        tests_util::assert_leaf_paths(&schema, &json!(3), "/then/multipleOf", "");
    }
}
