//! Compile a schema value into a tree of runtime checks.
use std::{cell::RefCell, rc::Rc, sync::Arc};

use ahash::AHashSet;
use referencing::{Draft, Registry, Resolved, Uri, VocabularySet};
use serde_json::Value;

use crate::{
    dialect::{self, Dialect},
    error::ValidationError,
    keywords::boolean::FalseValidator,
    node::SchemaNode,
    options::ValidationOptions,
    paths::{Location, LocationSegment},
    validator::Validator,
};

/// Compile-time context: tracks the current location, base URI, draft and
/// dialect while walking the schema tree.
#[derive(Clone)]
pub(crate) struct Context {
    config: Arc<ValidationOptions>,
    registry: Arc<Registry>,
    dialect: Arc<Dialect>,
    draft: Draft,
    base_uri: Uri,
    location: Location,
    /// References already visited during this compilation; a second visit
    /// compiles lazily to break the cycle.
    seen: Rc<RefCell<AHashSet<Uri>>>,
}

impl Context {
    pub(crate) fn draft(&self) -> Draft {
        self.draft
    }
    pub(crate) fn config(&self) -> &Arc<ValidationOptions> {
        &self.config
    }
    pub(crate) fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
    pub(crate) fn location(&self) -> &Location {
        &self.location
    }
    pub(crate) fn base_uri(&self) -> &Uri {
        &self.base_uri
    }

    #[inline]
    pub(crate) fn with_path<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Context {
        let mut ctx = self.clone();
        ctx.location = self.location.join(segment);
        ctx
    }

    /// The fully resolved URI of a reference in the current scope.
    pub(crate) fn reference_uri(&self, reference: &str) -> Uri {
        Uri::inherit(&self.base_uri, Uri::parse(reference))
    }

    pub(crate) fn resolve(&self, reference: &str) -> Option<Resolved> {
        self.registry.resolve(&self.base_uri, self.draft, reference)
    }

    pub(crate) fn is_seen(&self, uri: &Uri) -> bool {
        self.seen.borrow().contains(uri)
    }
    pub(crate) fn mark_seen(&self, uri: &Uri) {
        self.seen.borrow_mut().insert(uri.clone());
    }

    /// A context positioned at a resolved reference target, sharing the
    /// cycle-detection state of this compilation.
    pub(crate) fn in_resolved(&self, resolved: &Resolved) -> Context {
        let mut ctx = self.clone();
        ctx.base_uri = resolved.base_uri().clone();
        if resolved.draft() != self.draft {
            ctx.draft = resolved.draft();
            ctx.dialect = Arc::new(dialect::dialect_for(
                resolved.draft(),
                &resolved.draft().default_vocabularies(),
            ));
        }
        ctx
    }

    /// Compile a subschema at the current location.
    pub(crate) fn compile(&self, schema: &Value) -> Result<SchemaNode, ValidationError> {
        compile_schema(self, schema)
    }
}

fn root_context(config: Arc<ValidationOptions>, registry: Arc<Registry>, draft: Draft) -> Context {
    let dialect = Arc::new(dialect::dialect_for(draft, &draft.default_vocabularies()));
    let base_uri = registry.root_base_uri();
    Context {
        config,
        registry,
        dialect,
        draft,
        base_uri,
        location: Location::new(),
        seen: Rc::new(RefCell::new(AHashSet::new())),
    }
}

pub(crate) fn build_validator(
    config: ValidationOptions,
    schema: &Value,
) -> Result<Validator, ValidationError> {
    let draft = config.draft_for(schema);
    let config = Arc::new(config);
    let registry = Arc::new(Registry::new(
        schema.clone(),
        draft,
        Arc::clone(&config.retriever),
    ));
    for (uri, resource) in &config.resources {
        registry.add_resource(uri, draft, resource.clone());
    }
    let ctx = root_context(Arc::clone(&config), Arc::clone(&registry), draft);
    let mut root = compile_schema(&ctx, schema)?;
    root.ensure_resource(registry.root_base_uri());
    Ok(Validator { root, config })
}

/// Compile a schema node lazily resolved at run time. Uses the default
/// dialect of the target's draft.
pub(crate) fn compile_resolved(
    config: &Arc<ValidationOptions>,
    registry: &Arc<Registry>,
    resolved: &Resolved,
    location: Location,
) -> Result<SchemaNode, ValidationError> {
    let mut ctx = root_context(Arc::clone(config), Arc::clone(registry), resolved.draft());
    ctx.base_uri = resolved.base_uri().clone();
    ctx.location = location;
    let contents = resolved.contents().map_err(|error| {
        ValidationError::malformed(
            ctx.location().clone(),
            &Value::Null,
            "$ref",
            error.to_string(),
        )
    })?;
    compile_schema(&ctx, contents)
}

/// Compile one schema value into a [`SchemaNode`].
pub(crate) fn compile_schema(ctx: &Context, schema: &Value) -> Result<SchemaNode, ValidationError> {
    match schema {
        Value::Bool(true) => Ok(SchemaNode::from_boolean(ctx, None)),
        Value::Bool(false) => Ok(SchemaNode::from_boolean(
            ctx,
            Some(FalseValidator::compile(ctx.location().clone())?),
        )),
        Value::Object(object) => {
            // Enter the subresource: a `$schema` switches draft and dialect,
            // an identifier moves the base URI and marks a dynamic-scope
            // boundary.
            let mut ctx = ctx.clone();
            let mut resource = None;
            if let Some(declared) = object.get("$schema").and_then(Value::as_str) {
                if let Some(draft) = Draft::from_meta_uri(declared) {
                    if draft != ctx.draft {
                        ctx.draft = draft;
                        ctx.dialect = Arc::new(dialect::dialect_for(
                            draft,
                            &draft.default_vocabularies(),
                        ));
                    }
                } else if let Some((draft, vocabularies)) = custom_metaschema(&ctx, declared) {
                    ctx.draft = draft;
                    ctx.dialect = Arc::new(dialect::dialect_for(draft, &vocabularies));
                } else {
                    return Err(ValidationError::malformed(
                        ctx.location().join("$schema"),
                        schema,
                        "$schema",
                        format!("unknown metaschema \"{declared}\""),
                    ));
                }
            }
            if let Some(id) = ctx.draft.id_of(schema) {
                ctx.base_uri = Uri::inherit(&ctx.base_uri, Uri::parse(id)).base();
                resource = Some(ctx.base_uri.clone());
            }

            // Older drafts ignore every sibling of `$ref`.
            if ctx.draft <= Draft::Draft7 {
                if let Some(reference) = object.get("$ref") {
                    let check = crate::keywords::ref_::compile(&ctx, object, reference)
                        .expect("$ref always compiles to a check")?;
                    return Ok(SchemaNode::from_checks(
                        &ctx,
                        vec![("$ref", check)],
                        resource,
                    ));
                }
            }

            let mut checks = Vec::with_capacity(object.len());
            for (keyword, func) in ctx.dialect.entries() {
                if let Some(value) = object.get(*keyword) {
                    if let Some(result) = func(&ctx, object, value) {
                        checks.push((*keyword, result?));
                    }
                }
            }
            for keyword in object.keys() {
                if !ctx.draft.is_known_keyword(keyword) && !is_annotation_keyword(keyword) {
                    log::warn!(
                        "unrecognised keyword '{keyword}' at '{}' is ignored",
                        ctx.location()
                    );
                }
            }
            Ok(SchemaNode::from_checks(&ctx, checks, resource))
        }
        _ => Err(ValidationError::malformed(
            ctx.location().clone(),
            schema,
            "schema",
            format!("a schema must be an object or a boolean, got {schema}"),
        )),
    }
}

/// Resolve a custom metaschema and read its dialect: the draft comes from
/// the metaschema's own `$schema`, the keyword selection from its
/// `$vocabulary` declaration.
fn custom_metaschema(ctx: &Context, declared: &str) -> Option<(Draft, VocabularySet)> {
    let resolved = ctx.resolve(declared)?;
    let metaschema = resolved.contents().ok()?;
    let draft = ctx.draft.detect(metaschema).ok()?;
    let vocabularies = metaschema.get("$vocabulary").map_or_else(
        || draft.default_vocabularies(),
        |declaration| VocabularySet::from_declaration(declaration, draft),
    );
    Some((draft, vocabularies))
}

fn is_annotation_keyword(keyword: &str) -> bool {
    matches!(
        keyword,
        "title"
            | "description"
            | "default"
            | "examples"
            | "$comment"
            | "deprecated"
            | "readOnly"
            | "writeOnly"
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn non_schema_values_fail_the_build() {
        assert!(crate::validator_for(&json!([1])).is_err());
        assert!(crate::validator_for(&json!("x")).is_err());
        assert!(crate::validator_for(&json!(true)).is_ok());
        assert!(crate::validator_for(&json!(false)).is_ok());
    }

    #[test]
    fn draft_switching_per_subtree() {
        // The root is 2020-12, the subschema validates with draft 4
        // semantics where exclusiveMinimum is a boolean modifier.
        let schema = json!({
            "properties": {
                "old": {
                    "$schema": "http://json-schema.org/draft-04/schema",
                    "$id": "http://example.com/old",
                    "minimum": 1,
                    "exclusiveMinimum": true
                }
            }
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(!validator.is_valid(&json!({"old": 1})));
        assert!(validator.is_valid(&json!({"old": 2})));
    }
}
