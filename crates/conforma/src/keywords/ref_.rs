//! Reference keywords: `$ref`, `$recursiveRef` and `$dynamicRef`.
//!
//! References are in-place applicators. Targets reachable without cycles
//! compile eagerly; a reference seen a second time during compilation
//! defers resolution and compilation to the first validation, memoised per
//! node. `$recursiveRef` and `$dynamicRef` always defer, because their
//! target depends on the dynamic scope accumulated at run time.
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use once_cell::sync::OnceCell;
use referencing::{Draft, Registry, Resolved, Uri};
use serde_json::{Map, Value};

use crate::{
    compiler::{self, Context},
    error::ValidationError,
    evaluation::EvalState,
    keywords::{helpers, CompilationResult},
    node::SchemaNode,
    options::ValidationOptions,
    paths::{LazyLocation, Location},
    validator::Validate,
};

/// An eagerly compiled reference target.
pub(crate) struct RefValidator {
    inner: SchemaNode,
    /// The resource the target lives in; entering it extends the dynamic
    /// scope.
    resource: Uri,
}

impl Validate for RefValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        state.push_scope(self.resource.clone());
        let result = helpers::in_place(state, location, |state| {
            self.inner.validate(state, location, instance)
        });
        state.pop_scope();
        result
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        state.push_scope(self.resource.clone());
        let valid = helpers::in_place_valid(state, location, |state| {
            self.inner.is_valid(state, location, instance)
        });
        state.pop_scope();
        valid
    }
}

/// A reference that resolves and compiles its target on first use.
///
/// The compiled tree cannot hold cycles, so recursive references cache the
/// next unrolling of the cycle here instead.
pub(crate) struct LazyRefValidator {
    reference: String,
    base_uri: Uri,
    draft: Draft,
    config: Arc<ValidationOptions>,
    registry: Arc<Registry>,
    location: Location,
    inner: OnceCell<Option<(SchemaNode, Uri)>>,
}

impl LazyRefValidator {
    fn resolved(&self) -> &Option<(SchemaNode, Uri)> {
        self.inner.get_or_init(|| {
            let resolved = self
                .registry
                .resolve(&self.base_uri, self.draft, &self.reference)?;
            let resource = resolved.base_uri().clone();
            match compiler::compile_resolved(
                &self.config,
                &self.registry,
                &resolved,
                self.location.clone(),
            ) {
                Ok(node) => Some((node, resource)),
                Err(error) => {
                    log::warn!(
                        "reference '{}' resolved to an uncompilable schema: {error}",
                        self.reference
                    );
                    None
                }
            }
        })
    }
}

impl Validate for LazyRefValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        // An unresolvable reference degrades to an identity check.
        let Some((inner, resource)) = self.resolved() else {
            return Ok(());
        };
        state.push_scope(resource.clone());
        let result = helpers::in_place(state, location, |state| {
            inner.validate(state, location, instance)
        });
        state.pop_scope();
        result
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let Some((inner, resource)) = self.resolved() else {
            return true;
        };
        state.push_scope(resource.clone());
        let valid = helpers::in_place_valid(state, location, |state| {
            inner.is_valid(state, location, instance)
        });
        state.pop_scope();
        valid
    }
}

/// `$ref` to a target that could not be resolved: logged and ignored.
struct UnresolvedValidator;

impl Validate for UnresolvedValidator {
    fn validate(&self, _: &mut EvalState, _: &LazyLocation, _: &Value) -> Result<(), ValidationError> {
        Ok(())
    }
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, _: &Value) -> bool {
        true
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let Some(reference) = schema.as_str() else {
        return Some(Err(ValidationError::malformed(
            ctx.location().join("$ref"),
            schema,
            "$ref",
            format!("expected a string reference, got {schema}"),
        )));
    };
    let uri = ctx.reference_uri(reference);
    if ctx.is_seen(&uri) {
        return Some(Ok(Box::new(LazyRefValidator {
            reference: reference.to_string(),
            base_uri: ctx.base_uri().clone(),
            draft: ctx.draft(),
            config: Arc::clone(ctx.config()),
            registry: Arc::clone(ctx.registry()),
            location: ctx.location().clone(),
            inner: OnceCell::new(),
        })));
    }
    ctx.mark_seen(&uri);
    match ctx.resolve(reference) {
        Some(resolved) => {
            let target_ctx = ctx.in_resolved(&resolved);
            let contents = match resolved.contents() {
                Ok(contents) => contents,
                Err(error) => {
                    return Some(Err(ValidationError::malformed(
                        ctx.location().join("$ref"),
                        schema,
                        "$ref",
                        error.to_string(),
                    )))
                }
            };
            match target_ctx.compile(contents) {
                Ok(inner) => Some(Ok(Box::new(RefValidator {
                    inner,
                    resource: resolved.base_uri().clone(),
                }))),
                Err(error) => Some(Err(error)),
            }
        }
        None => Some(Ok(Box::new(UnresolvedValidator))),
    }
}

/// `$recursiveRef "#"` (2019-09): targets the outermost in-scope resource
/// carrying `$recursiveAnchor: true`, provided the current resource carries
/// it too; otherwise it is a plain reference to the current resource root.
pub(crate) struct RecursiveRefValidator {
    base_uri: Uri,
    config: Arc<ValidationOptions>,
    registry: Arc<Registry>,
    location: Location,
    cache: RwLock<AHashMap<Uri, Arc<SchemaNode>>>,
}

impl RecursiveRefValidator {
    fn target_resource(&self, state: &EvalState) -> Uri {
        if self.registry.has_recursive_anchor(&self.base_uri) {
            for uri in state.scope() {
                if self.registry.has_recursive_anchor(uri) {
                    return uri.clone();
                }
            }
        }
        self.base_uri.clone()
    }

    fn node_for(&self, resource: &Uri) -> Option<Arc<SchemaNode>> {
        if let Some(node) = self
            .cache
            .read()
            .expect("cache lock poisoned")
            .get(resource)
        {
            return Some(Arc::clone(node));
        }
        let resolved = self.registry.resource_root(resource)?;
        let node = match compiler::compile_resolved(
            &self.config,
            &self.registry,
            &resolved,
            self.location.clone(),
        ) {
            Ok(node) => Arc::new(node),
            Err(error) => {
                log::warn!("'$recursiveRef' target '{resource}' does not compile: {error}");
                return None;
            }
        };
        self.cache
            .write()
            .expect("cache lock poisoned")
            .insert(resource.clone(), Arc::clone(&node));
        Some(node)
    }
}

impl Validate for RecursiveRefValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let resource = self.target_resource(state);
        let Some(inner) = self.node_for(&resource) else {
            return Ok(());
        };
        state.push_scope(resource);
        let result = helpers::in_place(state, location, |state| {
            inner.validate(state, location, instance)
        });
        state.pop_scope();
        result
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let resource = self.target_resource(state);
        let Some(inner) = self.node_for(&resource) else {
            return true;
        };
        state.push_scope(resource);
        let valid = helpers::in_place_valid(state, location, |state| {
            inner.is_valid(state, location, instance)
        });
        state.pop_scope();
        valid
    }
}

#[inline]
pub(crate) fn compile_recursive_ref(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    if schema.as_str() != Some("#") {
        return Some(Err(ValidationError::malformed(
            ctx.location().join("$recursiveRef"),
            schema,
            "$recursiveRef",
            format!("expected \"#\", got {schema}"),
        )));
    }
    Some(Ok(Box::new(RecursiveRefValidator {
        base_uri: ctx.base_uri().clone(),
        config: Arc::clone(ctx.config()),
        registry: Arc::clone(ctx.registry()),
        location: ctx.location().clone(),
        cache: RwLock::new(AHashMap::new()),
    })))
}

/// `$dynamicRef` (2020-12 and draft-next).
pub(crate) struct DynamicRefValidator {
    reference: String,
    base_uri: Uri,
    draft: Draft,
    config: Arc<ValidationOptions>,
    registry: Arc<Registry>,
    location: Location,
    cache: RwLock<AHashMap<String, Arc<SchemaNode>>>,
}

impl DynamicRefValidator {
    fn resolve_target(&self, state: &EvalState) -> Option<Resolved> {
        let uri = Uri::inherit(&self.base_uri, Uri::parse(&self.reference));
        let fragment = uri.fragment().unwrap_or("");
        if !fragment.is_empty() && !fragment.starts_with('/') {
            // 2020-12 requires the initially resolved target to carry the
            // matching `$dynamicAnchor` before the dynamic scope is
            // consulted; draft-next drops that bookending requirement.
            let initial = uri.base();
            let bookended = self.draft >= Draft::DraftNext
                || self.registry.dynamic_anchor(&initial, fragment).is_some();
            if bookended {
                for scope_uri in state.scope() {
                    if let Some(resolved) = self.registry.dynamic_anchor(scope_uri, fragment) {
                        return Some(resolved);
                    }
                }
            }
        }
        self.registry
            .resolve(&self.base_uri, self.draft, &self.reference)
    }

    fn node_for(&self, resolved: &Resolved) -> Option<Arc<SchemaNode>> {
        let key = format!("{}#{}", resolved.base_uri(), resolved_pointer(resolved));
        if let Some(node) = self.cache.read().expect("cache lock poisoned").get(&key) {
            return Some(Arc::clone(node));
        }
        let node = match compiler::compile_resolved(
            &self.config,
            &self.registry,
            resolved,
            self.location.clone(),
        ) {
            Ok(node) => Arc::new(node),
            Err(error) => {
                log::warn!(
                    "'$dynamicRef' target '{}' does not compile: {error}",
                    self.reference
                );
                return None;
            }
        };
        self.cache
            .write()
            .expect("cache lock poisoned")
            .insert(key, Arc::clone(&node));
        Some(node)
    }
}

fn resolved_pointer(resolved: &Resolved) -> String {
    // The contents pointer is not exposed; the schema value itself is the
    // identity for caching purposes.
    resolved
        .contents()
        .map(|contents| format!("{:p}", contents as *const Value))
        .unwrap_or_default()
}

impl Validate for DynamicRefValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Some(resolved) = self.resolve_target(state) else {
            log::warn!("cannot resolve '$dynamicRef' '{}'", self.reference);
            return Ok(());
        };
        let Some(inner) = self.node_for(&resolved) else {
            return Ok(());
        };
        state.push_scope(resolved.base_uri().clone());
        let result = helpers::in_place(state, location, |state| {
            inner.validate(state, location, instance)
        });
        state.pop_scope();
        result
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        let Some(resolved) = self.resolve_target(state) else {
            return true;
        };
        let Some(inner) = self.node_for(&resolved) else {
            return true;
        };
        state.push_scope(resolved.base_uri().clone());
        let valid = helpers::in_place_valid(state, location, |state| {
            inner.is_valid(state, location, instance)
        });
        state.pop_scope();
        valid
    }
}

#[inline]
pub(crate) fn compile_dynamic_ref(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let Some(reference) = schema.as_str() else {
        return Some(Err(ValidationError::malformed(
            ctx.location().join("$dynamicRef"),
            schema,
            "$dynamicRef",
            format!("expected a string reference, got {schema}"),
        )));
    };
    Some(Ok(Box::new(DynamicRefValidator {
        reference: reference.to_string(),
        base_uri: ctx.base_uri().clone(),
        draft: ctx.draft(),
        config: Arc::clone(ctx.config()),
        registry: Arc::clone(ctx.registry()),
        location: ctx.location().clone(),
        cache: RwLock::new(AHashMap::new()),
    })))
}
