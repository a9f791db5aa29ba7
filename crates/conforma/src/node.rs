//! A compiled schema node: the dialect-ordered checks of one schema object.
use referencing::Uri;
use serde_json::Value;

use crate::{
    compiler::Context,
    error::ValidationError,
    evaluation::EvalState,
    paths::{LazyLocation, Location},
    validator::{BoxedCheck, Validate},
};

/// A node in the compiled schema tree.
pub(crate) struct SchemaNode {
    checks: Vec<(&'static str, BoxedCheck)>,
    location: Location,
    /// Set when this node is the root of a schema resource; entering it
    /// pushes the resource onto the dynamic scope.
    resource: Option<Uri>,
    /// Boolean schemas surface their single check directly instead of
    /// wrapping it into a schema-level error.
    wrap_errors: bool,
    exhaustive: bool,
    trace: bool,
}

impl std::fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaNode")
            .field("location", &self.location)
            .field(
                "checks",
                &self.checks.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl SchemaNode {
    pub(crate) fn from_checks(
        ctx: &Context,
        mut checks: Vec<(&'static str, BoxedCheck)>,
        resource: Option<Uri>,
    ) -> SchemaNode {
        checks.shrink_to_fit();
        SchemaNode {
            checks,
            location: ctx.location().clone(),
            resource,
            wrap_errors: true,
            exhaustive: ctx.config().is_exhaustive(),
            trace: ctx.config().is_tracing(),
        }
    }

    pub(crate) fn from_boolean(ctx: &Context, check: Option<BoxedCheck>) -> SchemaNode {
        SchemaNode {
            checks: check.map(|check| ("false", check)).into_iter().collect(),
            location: ctx.location().clone(),
            resource: None,
            wrap_errors: false,
            exhaustive: ctx.config().is_exhaustive(),
            trace: ctx.config().is_tracing(),
        }
    }

    /// Mark this node as a resource root if compilation did not already.
    /// The root schema is a resource even without an identifier.
    pub(crate) fn ensure_resource(&mut self, uri: Uri) {
        if self.resource.is_none() {
            self.resource = Some(uri);
        }
    }

    fn enter(&self, state: &mut EvalState) {
        if let Some(resource) = &self.resource {
            state.push_scope(resource.clone());
        }
    }

    fn leave(&self, state: &mut EvalState) {
        if self.resource.is_some() {
            state.pop_scope();
        }
    }
}

impl Validate for SchemaNode {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        self.enter(state);
        let mut errors = Vec::new();
        for (keyword, check) in &self.checks {
            if self.trace {
                log::trace!(
                    "validating '{keyword}' at schema location '{}'",
                    self.location
                );
            }
            if let Err(error) = check.validate(state, location, instance) {
                errors.push(error);
                if !self.exhaustive {
                    break;
                }
            }
        }
        self.leave(state);
        if errors.is_empty() {
            Ok(())
        } else if self.wrap_errors {
            Err(ValidationError::schema(
                self.location.clone(),
                location.into(),
                instance,
                errors,
            ))
        } else {
            // A boolean node has exactly one check.
            Err(errors.remove(0))
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        self.enter(state);
        let valid = self
            .checks
            .iter()
            .all(|(_, check)| check.is_valid(state, location, instance));
        self.leave(state);
        valid
    }
}
