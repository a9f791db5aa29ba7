//! Draft 3/4 `exclusiveMinimum` / `exclusiveMaximum` boolean modifiers.
//!
//! The numeric keyword reads its modifier directly; these factories only
//! exist to warn when a modifier appears without its partner, where it has
//! no effect at all.
use serde_json::{Map, Value};

use crate::{compiler::Context, keywords::CompilationResult};

#[inline]
pub(crate) fn compile_exclusive_minimum(
    ctx: &Context,
    parent: &Map<String, Value>,
    _: &Value,
) -> Option<CompilationResult> {
    if !parent.contains_key("minimum") {
        log::warn!(
            "'exclusiveMinimum' without a sibling 'minimum' at '{}' has no effect",
            ctx.location()
        );
    }
    None
}

#[inline]
pub(crate) fn compile_exclusive_maximum(
    ctx: &Context,
    parent: &Map<String, Value>,
    _: &Value,
) -> Option<CompilationResult> {
    if !parent.contains_key("maximum") {
        log::warn!(
            "'exclusiveMaximum' without a sibling 'maximum' at '{}' has no effect",
            ctx.location()
        );
    }
    None
}
