//! `contentEncoding` / `contentMediaType` / `contentSchema`.
//!
//! The three keywords form a staged pipeline: the encoding check decodes
//! the string and stages the result, the media-type check parses the staged
//! (or raw) string and stages the parsed value, and the content schema
//! validates whatever reached it. Decoded values travel between stages
//! through the evaluation state, keyed by the owning schema object.
//!
//! Drafts 6 and 7 define the keywords as assertions; from 2019-09 they are
//! annotations and failures are only logged. `contentSchema` asserts under
//! strict formats.
use referencing::Draft;
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    content_encoding::{self, ContentEncodingCheck, ContentEncodingConverter},
    content_media_type::{self, ContentMediaTypeCheck, ContentMediaTypeParser},
    error::ValidationError,
    evaluation::{EvalState, SlotKey},
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};

pub(crate) struct ContentEncodingValidator {
    encoding: String,
    check: ContentEncodingCheck,
    convert: ContentEncodingConverter,
    assertive: bool,
    parent_location: Location,
    location: Location,
}

impl Validate for ContentEncodingValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::String(item) = instance else {
            return Ok(());
        };
        if (self.check)(item) {
            if let Some(decoded) = (self.convert)(item) {
                let slot = SlotKey {
                    schema: self.parent_location.clone(),
                    instance: location.into(),
                };
                state.stage_content(slot, Value::String(decoded));
            }
            Ok(())
        } else if self.assertive {
            Err(ValidationError::content_encoding(
                self.location.clone(),
                location.into(),
                instance,
                self.encoding.clone(),
            ))
        } else {
            log::warn!("content is not {} encoded at '{}'", self.encoding, self.location);
            Ok(())
        }
    }

    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            !self.assertive || (self.check)(item)
        } else {
            true
        }
    }
}

pub(crate) struct ContentMediaTypeValidator {
    media_type: String,
    check: ContentMediaTypeCheck,
    parse: ContentMediaTypeParser,
    assertive: bool,
    /// Whether a sibling `contentEncoding` stages decoded input for us.
    staged: bool,
    parent_location: Location,
    location: Location,
}

impl Validate for ContentMediaTypeValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::String(item) = instance else {
            return Ok(());
        };
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: location.into(),
        };
        let staged = if self.staged {
            match state.staged_content(&slot) {
                Some(Value::String(decoded)) => Some(decoded.clone()),
                // The encoding stage could not decode; skip quietly.
                _ => return Ok(()),
            }
        } else {
            None
        };
        let content = staged.as_deref().unwrap_or(item);
        if (self.check)(content) {
            if let Some(parsed) = (self.parse)(content) {
                state.stage_content(slot, parsed);
            }
            Ok(())
        } else if self.assertive {
            Err(ValidationError::content_media_type(
                self.location.clone(),
                location.into(),
                instance,
                self.media_type.clone(),
            ))
        } else {
            log::warn!("content is not {} at '{}'", self.media_type, self.location);
            Ok(())
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        self.validate(state, location, instance).is_ok()
    }
}

pub(crate) struct ContentSchemaValidator {
    node: SchemaNode,
    assertive: bool,
    parent_location: Location,
    location: Location,
}

impl Validate for ContentSchemaValidator {
    fn validate(
        &self,
        state: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        if !matches!(instance, Value::String(_)) {
            return Ok(());
        }
        let slot = SlotKey {
            schema: self.parent_location.clone(),
            instance: location.into(),
        };
        // Only a successfully decoded and parsed document reaches the
        // nested schema.
        let Some(decoded) = state.staged_content(&slot).cloned() else {
            return Ok(());
        };
        let snapshot = state.snapshot();
        let result = self.node.validate(state, location, &decoded);
        state.rollback(snapshot);
        match result {
            Ok(()) => Ok(()),
            Err(error) if self.assertive => Err(error),
            Err(error) => {
                log::warn!("decoded content is invalid at '{}': {error}", self.location);
                Ok(())
            }
        }
    }

    fn is_valid(&self, state: &mut EvalState, location: &LazyLocation, instance: &Value) -> bool {
        self.validate(state, location, instance).is_ok()
    }
}

#[inline]
pub(crate) fn compile_content_encoding(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("contentEncoding");
    let Some(encoding) = schema.as_str() else {
        return Some(Err(ValidationError::malformed(
            location,
            schema,
            "contentEncoding",
            format!("expected a string, got {schema}"),
        )));
    };
    let (Some(check), Some(convert)) = (
        content_encoding::check_of(encoding),
        content_encoding::converter_of(encoding),
    ) else {
        log::warn!("unsupported content encoding '{encoding}' is ignored");
        return None;
    };
    Some(Ok(Box::new(ContentEncodingValidator {
        encoding: encoding.to_string(),
        check,
        convert,
        assertive: assertive_content(ctx),
        parent_location: ctx.location().clone(),
        location,
    })))
}

#[inline]
pub(crate) fn compile_content_media_type(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("contentMediaType");
    let Some(media_type) = schema.as_str() else {
        return Some(Err(ValidationError::malformed(
            location,
            schema,
            "contentMediaType",
            format!("expected a string, got {schema}"),
        )));
    };
    let (Some(check), Some(parse)) = (
        content_media_type::check_of(media_type),
        content_media_type::parser_of(media_type),
    ) else {
        log::warn!("unsupported content media type '{media_type}' is ignored");
        return None;
    };
    let staged = parent
        .get("contentEncoding")
        .and_then(Value::as_str)
        .map_or(false, |encoding| {
            content_encoding::check_of(encoding).is_some()
        });
    Some(Ok(Box::new(ContentMediaTypeValidator {
        media_type: media_type.to_string(),
        check,
        parse,
        assertive: assertive_content(ctx),
        staged,
        parent_location: ctx.location().clone(),
        location,
    })))
}

#[inline]
pub(crate) fn compile_content_schema(
    ctx: &Context,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    // Without a media type there is nothing parsed to validate.
    parent.get("contentMediaType")?;
    let keyword_ctx = ctx.with_path("contentSchema");
    match keyword_ctx.compile(schema) {
        Ok(node) => Some(Ok(Box::new(ContentSchemaValidator {
            node,
            assertive: ctx.config().is_strict_format(),
            parent_location: ctx.location().clone(),
            location: ctx.location().join("contentSchema"),
        }))),
        Err(error) => Some(Err(error)),
    }
}

fn assertive_content(ctx: &Context) -> bool {
    ctx.draft() <= Draft::Draft7 && ctx.config().is_strict_format()
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    fn draft7(schema: Value) -> Value {
        let mut schema = schema;
        schema["$schema"] = json!("http://json-schema.org/draft-07/schema");
        schema
    }

    #[test_case(json!({"contentEncoding": "base64"}), json!("eyJmb28iOiAiYmFyIn0="))]
    #[test_case(json!({"contentEncoding": "base64"}), json!(12); "non-strings pass")]
    #[test_case(json!({"contentMediaType": "application/json"}), json!("{\"a\": 1}"))]
    #[test_case(
        json!({"contentEncoding": "base64", "contentMediaType": "application/json"}),
        json!("eyJmb28iOiAiYmFyIn0=")
    )]
    fn content_is_valid(schema: Value, instance: Value) {
        tests_util::is_valid(&draft7(schema), &instance);
    }

    #[test_case(json!({"contentEncoding": "base64"}), json!("not base64!!"))]
    #[test_case(json!({"contentMediaType": "application/json"}), json!("{"))]
    #[test_case(
        json!({"contentEncoding": "base64", "contentMediaType": "application/json"}),
        json!("e30=x")
    )]
    fn content_is_not_valid_in_draft7(schema: Value, instance: Value) {
        tests_util::is_not_valid(&draft7(schema), &instance);
    }

    #[test]
    fn annotation_only_from_2019() {
        // 2020-12 treats content keywords as annotations.
        let schema = json!({"contentEncoding": "base64"});
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!("not base64!!")));
    }

    #[test]
    fn content_schema_validates_the_decoded_document() {
        let schema = json!({
            "contentEncoding": "base64",
            "contentMediaType": "application/json",
            "contentSchema": {"required": ["foo"]}
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        // {"foo": "bar"}
        assert!(validator.is_valid(&json!("eyJmb28iOiAiYmFyIn0=")));
        // {}
        assert!(!validator.is_valid(&json!("e30=")));
    }
}
