use serde_json::Value;

use crate::{vocabularies::VocabularySet, Error};

/// JSON Schema specification versions.
#[non_exhaustive]
#[derive(Debug, Default, PartialEq, Copy, Clone, Hash, Eq, PartialOrd, Ord)]
pub enum Draft {
    /// JSON Schema Draft 3
    Draft3,
    /// JSON Schema Draft 4
    Draft4,
    /// JSON Schema Draft 6
    Draft6,
    /// JSON Schema Draft 7
    Draft7,
    /// JSON Schema Draft 2019-09
    Draft201909,
    /// JSON Schema Draft 2020-12
    #[default]
    Draft202012,
    /// The in-progress draft following 2020-12.
    DraftNext,
}

impl Draft {
    /// The most recent published draft ("latest").
    #[must_use]
    pub fn latest() -> Draft {
        Draft::Draft202012
    }

    /// The well-known metaschema URI of this draft.
    #[must_use]
    pub fn meta_uri(self) -> &'static str {
        match self {
            Draft::Draft3 => "http://json-schema.org/draft-03/schema",
            Draft::Draft4 => "http://json-schema.org/draft-04/schema",
            Draft::Draft6 => "http://json-schema.org/draft-06/schema",
            Draft::Draft7 => "http://json-schema.org/draft-07/schema",
            Draft::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            Draft::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
            Draft::DraftNext => "https://json-schema.org/draft/next/schema",
        }
    }

    /// Map a metaschema URI to a draft.
    #[must_use]
    pub fn from_meta_uri(uri: &str) -> Option<Draft> {
        let uri = uri.trim_end_matches('#');
        let tail = uri
            .strip_prefix("http://")
            .or_else(|| uri.strip_prefix("https://"))?;
        match tail {
            "json-schema.org/draft-03/schema" => Some(Draft::Draft3),
            "json-schema.org/draft-04/schema" => Some(Draft::Draft4),
            "json-schema.org/draft-06/schema" => Some(Draft::Draft6),
            "json-schema.org/draft-07/schema" => Some(Draft::Draft7),
            "json-schema.org/draft/2019-09/schema" => Some(Draft::Draft201909),
            "json-schema.org/draft/2020-12/schema" => Some(Draft::Draft202012),
            "json-schema.org/draft/next/schema" => Some(Draft::DraftNext),
            _ => None,
        }
    }

    /// Detect what specification applies to the given contents.
    ///
    /// # Errors
    ///
    /// On unknown `$schema` value it returns [`Error::UnknownSpecification`].
    pub fn detect(self, contents: &Value) -> Result<Draft, Error> {
        if let Some(schema) = contents
            .as_object()
            .and_then(|contents| contents.get("$schema"))
            .and_then(Value::as_str)
        {
            Draft::from_meta_uri(schema).ok_or_else(|| Error::unknown_specification(schema))
        } else {
            Ok(self)
        }
    }

    /// The identifier keyword of this draft.
    #[must_use]
    pub fn id_key(self) -> &'static str {
        match self {
            Draft::Draft3 | Draft::Draft4 => "id",
            _ => "$id",
        }
    }

    /// The identifier of `contents` under this draft, ignoring non-string and
    /// (for drafts ≤ 7) fragment-only values, which are anchors there.
    #[must_use]
    pub fn id_of(self, contents: &Value) -> Option<&str> {
        let id = contents
            .as_object()
            .and_then(|schema| schema.get(self.id_key()))
            .and_then(Value::as_str)?;
        if self <= Draft::Draft7 && id.starts_with('#') {
            return None;
        }
        Some(id)
    }

    /// Identifies known JSON Schema keywords per draft.
    #[must_use]
    pub fn is_known_keyword(&self, keyword: &str) -> bool {
        match keyword {
            "$ref"
            | "$schema"
            | "additionalItems"
            | "additionalProperties"
            | "dependencies"
            | "enum"
            | "exclusiveMaximum"
            | "exclusiveMinimum"
            | "format"
            | "items"
            | "maxItems"
            | "maxLength"
            | "maxProperties"
            | "maximum"
            | "minItems"
            | "minLength"
            | "minProperties"
            | "minimum"
            | "pattern"
            | "patternProperties"
            | "properties"
            | "required"
            | "type"
            | "uniqueItems" => true,

            "divisibleBy" | "disallow" | "extends" if *self == Draft::Draft3 => true,
            "id" if *self <= Draft::Draft4 => true,
            "allOf" | "anyOf" | "oneOf" | "not" | "definitions" | "multipleOf"
                if *self >= Draft::Draft4 =>
            {
                true
            }

            "$id" | "const" | "contains" | "propertyNames" if *self >= Draft::Draft6 => true,

            "contentEncoding" | "contentMediaType"
                if matches!(self, Draft::Draft6 | Draft::Draft7) =>
            {
                true
            }

            "else" | "if" | "then" if *self >= Draft::Draft7 => true,

            "$anchor"
            | "$defs"
            | "$recursiveAnchor"
            | "$recursiveRef"
            | "$vocabulary"
            | "contentSchema"
            | "dependentRequired"
            | "dependentSchemas"
            | "maxContains"
            | "minContains"
            | "unevaluatedItems"
            | "unevaluatedProperties"
                if *self >= Draft::Draft201909 =>
            {
                true
            }

            "prefixItems" | "$dynamicAnchor" | "$dynamicRef" if *self >= Draft::Draft202012 => {
                true
            }

            "propertyDependencies" if *self == Draft::DraftNext => true,

            _ => false,
        }
    }

    /// The vocabularies active by default when no `$vocabulary` is given.
    #[must_use]
    pub fn default_vocabularies(self) -> VocabularySet {
        VocabularySet::default_for(self)
    }
}
