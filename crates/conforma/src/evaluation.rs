//! Run-time evaluation state threaded through a validation call.
//!
//! The state carries the annotations that later keywords consume:
//! which properties and indices were evaluated by in-place applicators
//! (for `unevaluatedProperties` / `unevaluatedItems`), which were matched by
//! positional or name-based keywords (for `additionalProperties` /
//! `additionalItems`), the outcome of a sibling `if`, staged content
//! decoding results, and the stack of schema resources entered so far
//! (for `$dynamicRef` / `$recursiveRef`).
use ahash::{AHashMap, AHashSet};
use referencing::Uri;
use serde_json::Value;

use crate::paths::Location;

/// A property name or array index recorded in an annotation set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ItemKey {
    Property(String),
    Index(usize),
}

/// Annotation slot owned by one object schema applied at one instance node.
///
/// Keyed by the pair: the same schema node can be applied at several
/// instance locations re-entrantly through `$ref`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SlotKey {
    pub(crate) schema: Location,
    pub(crate) instance: Location,
}

#[derive(Debug, Default)]
pub(crate) struct EvalState {
    evaluated: AHashMap<Location, AHashSet<ItemKey>>,
    matched: AHashMap<SlotKey, AHashSet<ItemKey>>,
    if_results: AHashMap<SlotKey, bool>,
    content: AHashMap<SlotKey, Value>,
    scope: Vec<Uri>,
}

/// A transactional copy of the annotation maps.
///
/// In-place applicators take a snapshot before running a branch and roll
/// back on failure, so annotations of failed branches never leak to
/// siblings.
#[derive(Debug)]
pub(crate) struct Snapshot {
    evaluated: AHashMap<Location, AHashSet<ItemKey>>,
    matched: AHashMap<SlotKey, AHashSet<ItemKey>>,
    if_results: AHashMap<SlotKey, bool>,
    content: AHashMap<SlotKey, Value>,
}

impl EvalState {
    pub(crate) fn new() -> EvalState {
        EvalState::default()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            evaluated: self.evaluated.clone(),
            matched: self.matched.clone(),
            if_results: self.if_results.clone(),
            content: self.content.clone(),
        }
    }

    pub(crate) fn rollback(&mut self, snapshot: Snapshot) {
        self.evaluated = snapshot.evaluated;
        self.matched = snapshot.matched;
        self.if_results = snapshot.if_results;
        self.content = snapshot.content;
    }

    /// Remove and return the evaluated set for `instance`, leaving it empty.
    ///
    /// In-place applicators hide the outer set from their subschemas, so a
    /// nested `unevaluated*` keyword never sees marks made by cousins.
    pub(crate) fn take_evaluated(&mut self, instance: &Location) -> AHashSet<ItemKey> {
        self.evaluated.remove(instance).unwrap_or_default()
    }

    /// Merge `keys` into the evaluated set for `instance`.
    pub(crate) fn merge_evaluated(&mut self, instance: &Location, keys: AHashSet<ItemKey>) {
        if keys.is_empty() {
            return;
        }
        self.evaluated
            .entry(instance.clone())
            .or_default()
            .extend(keys);
    }

    pub(crate) fn mark_evaluated(&mut self, instance: &Location, key: ItemKey) {
        self.evaluated
            .entry(instance.clone())
            .or_default()
            .insert(key);
    }

    pub(crate) fn is_evaluated(&self, instance: &Location, key: &ItemKey) -> bool {
        self.evaluated
            .get(instance)
            .map_or(false, |keys| keys.contains(key))
    }

    pub(crate) fn add_matched(&mut self, slot: SlotKey, key: ItemKey) {
        self.matched.entry(slot).or_default().insert(key);
    }

    pub(crate) fn is_matched(&self, slot: &SlotKey, key: &ItemKey) -> bool {
        self.matched
            .get(slot)
            .map_or(false, |keys| keys.contains(key))
    }

    pub(crate) fn set_if_result(&mut self, slot: SlotKey, outcome: bool) {
        self.if_results.insert(slot, outcome);
    }

    pub(crate) fn if_result(&self, slot: &SlotKey) -> Option<bool> {
        self.if_results.get(slot).copied()
    }

    pub(crate) fn stage_content(&mut self, slot: SlotKey, decoded: Value) {
        self.content.insert(slot, decoded);
    }

    pub(crate) fn staged_content(&self, slot: &SlotKey) -> Option<&Value> {
        self.content.get(slot)
    }

    pub(crate) fn push_scope(&mut self, resource: Uri) {
        self.scope.push(resource);
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scope.pop();
    }

    pub(crate) fn scope(&self) -> &[Uri] {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::{EvalState, ItemKey, SlotKey};
    use crate::paths::Location;

    fn key(name: &str) -> ItemKey {
        ItemKey::Property(name.to_string())
    }

    #[test]
    fn rollback_discards_branch_annotations() {
        let mut state = EvalState::new();
        let root = Location::new();
        state.mark_evaluated(&root, key("kept"));
        let snapshot = state.snapshot();
        state.mark_evaluated(&root, key("dropped"));
        state.rollback(snapshot);
        assert!(state.is_evaluated(&root, &key("kept")));
        assert!(!state.is_evaluated(&root, &key("dropped")));
    }

    #[test]
    fn take_hides_outer_marks_until_merged_back() {
        let mut state = EvalState::new();
        let root = Location::new();
        state.mark_evaluated(&root, key("outer"));
        let outer = state.take_evaluated(&root);
        assert!(!state.is_evaluated(&root, &key("outer")));
        state.mark_evaluated(&root, key("inner"));
        state.merge_evaluated(&root, outer);
        assert!(state.is_evaluated(&root, &key("outer")));
        assert!(state.is_evaluated(&root, &key("inner")));
    }

    #[test]
    fn matched_slots_are_scoped_per_schema_and_instance() {
        let mut state = EvalState::new();
        let slot = SlotKey {
            schema: Location::new(),
            instance: Location::new().join("a"),
        };
        let other = SlotKey {
            schema: Location::new().join("items"),
            instance: Location::new().join("a"),
        };
        state.add_matched(slot.clone(), key("x"));
        assert!(state.is_matched(&slot, &key("x")));
        assert!(!state.is_matched(&other, &key("x")));
    }
}
