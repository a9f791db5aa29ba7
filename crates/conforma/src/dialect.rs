//! The dialect: the ordered list of keyword factories active for one
//! (draft, vocabulary selection) pair.
//!
//! The order is load-bearing. Keywords that post-process the annotations of
//! their siblings must run after the keywords that produce them:
//! `properties` and `patternProperties` before `additionalProperties`,
//! the positional `items` before `additionalItems`, `if` before `then` and
//! `else`, the content pipeline in encode → media-type → schema order, and
//! every in-place applicator before `unevaluatedItems` /
//! `unevaluatedProperties`, which always run last.
use referencing::{Draft, Vocabulary, VocabularySet};

use crate::keywords::{self, CompileFunc};

pub(crate) struct Dialect {
    entries: Vec<(&'static str, CompileFunc)>,
}

impl Dialect {
    pub(crate) fn entries(&self) -> &[(&'static str, CompileFunc)] {
        &self.entries
    }
}

pub(crate) fn dialect_for(draft: Draft, vocabularies: &VocabularySet) -> Dialect {
    let mut entries: Vec<(&'static str, CompileFunc)> = Vec::new();
    let applicator = vocabularies.contains(Vocabulary::Applicator);
    let validation = vocabularies.contains(Vocabulary::Validation);
    let content = vocabularies.contains(Vocabulary::Content);
    let format = vocabularies.contains(Vocabulary::FormatAnnotation)
        || vocabularies.contains(Vocabulary::FormatAssertion);
    let unevaluated = match draft {
        Draft::Draft201909 => applicator,
        _ => vocabularies.contains(Vocabulary::Unevaluated),
    };

    // References. Drafts up to 7 never reach the dialect for `$ref`: the
    // compiler short-circuits the whole schema object there.
    if draft >= Draft::Draft201909 {
        entries.push(("$ref", keywords::ref_::compile as CompileFunc));
    }
    if draft == Draft::Draft201909 {
        entries.push(("$recursiveRef", keywords::ref_::compile_recursive_ref));
    }
    if draft >= Draft::Draft202012 {
        entries.push(("$dynamicRef", keywords::ref_::compile_dynamic_ref));
    }

    // Types and values.
    if validation {
        if draft == Draft::Draft3 {
            entries.push(("type", keywords::legacy::type_draft_3::compile));
            entries.push(("disallow", keywords::legacy::disallow::compile));
        } else {
            entries.push(("type", keywords::type_::compile));
        }
        entries.push(("enum", keywords::enum_::compile));
        if draft >= Draft::Draft6 {
            entries.push(("const", keywords::const_::compile));
        }
    }

    // Numbers.
    if validation {
        entries.push(("minimum", keywords::minimum::compile));
        entries.push(("maximum", keywords::maximum::compile));
        if draft >= Draft::Draft6 {
            entries.push(("exclusiveMinimum", keywords::exclusive_minimum::compile));
            entries.push(("exclusiveMaximum", keywords::exclusive_maximum::compile));
        } else {
            entries.push((
                "exclusiveMinimum",
                keywords::legacy::exclusive_modifiers::compile_exclusive_minimum,
            ));
            entries.push((
                "exclusiveMaximum",
                keywords::legacy::exclusive_modifiers::compile_exclusive_maximum,
            ));
        }
        if draft == Draft::Draft3 {
            entries.push(("divisibleBy", keywords::multiple_of::compile_divisible_by));
        } else {
            entries.push(("multipleOf", keywords::multiple_of::compile));
        }
    }

    // Strings.
    if validation {
        entries.push(("minLength", keywords::min_length::compile));
        entries.push(("maxLength", keywords::max_length::compile));
        entries.push(("pattern", keywords::pattern::compile));
    }
    if format {
        entries.push(("format", keywords::format::compile));
    }

    // Content, in pipeline order.
    if content && draft >= Draft::Draft6 {
        entries.push((
            "contentEncoding",
            keywords::content::compile_content_encoding,
        ));
        entries.push((
            "contentMediaType",
            keywords::content::compile_content_media_type,
        ));
        if draft >= Draft::Draft201909 {
            entries.push(("contentSchema", keywords::content::compile_content_schema));
        }
    }

    // Arrays.
    if validation {
        entries.push(("minItems", keywords::min_items::compile));
        entries.push(("maxItems", keywords::max_items::compile));
        entries.push(("uniqueItems", keywords::unique_items::compile));
    }
    if applicator {
        if draft >= Draft::Draft202012 {
            entries.push(("prefixItems", keywords::prefix_items::compile));
        }
        entries.push(("items", keywords::items::compile));
        if draft <= Draft::Draft201909 {
            entries.push(("additionalItems", keywords::additional_items::compile));
        }
        if draft >= Draft::Draft6 {
            entries.push(("contains", keywords::contains::compile));
        }
    }

    // Objects.
    if validation {
        if draft >= Draft::Draft4 {
            entries.push(("required", keywords::required::compile));
            entries.push(("minProperties", keywords::min_properties::compile));
            entries.push(("maxProperties", keywords::max_properties::compile));
        }
        if draft >= Draft::Draft201909 {
            entries.push((
                "dependentRequired",
                keywords::dependencies::compile_dependent_required,
            ));
        }
    }
    if applicator {
        if draft >= Draft::Draft6 {
            entries.push(("propertyNames", keywords::property_names::compile));
        }
        entries.push(("properties", keywords::properties::compile));
        entries.push(("patternProperties", keywords::pattern_properties::compile));
        entries.push((
            "additionalProperties",
            keywords::additional_properties::compile,
        ));
        if draft <= Draft::Draft7 {
            entries.push(("dependencies", keywords::dependencies::compile));
        }
        if draft >= Draft::Draft201909 {
            entries.push((
                "dependentSchemas",
                keywords::dependencies::compile_dependent_schemas,
            ));
        }
        if draft >= Draft::DraftNext {
            entries.push((
                "propertyDependencies",
                keywords::dependencies::compile_property_dependencies,
            ));
        }
    }

    // In-place applicators.
    if applicator {
        if draft == Draft::Draft3 {
            entries.push(("extends", keywords::legacy::extends::compile));
        }
        if draft >= Draft::Draft4 {
            entries.push(("allOf", keywords::all_of::compile));
            entries.push(("anyOf", keywords::any_of::compile));
            entries.push(("oneOf", keywords::one_of::compile));
            entries.push(("not", keywords::not::compile));
        }
        if draft >= Draft::Draft7 {
            entries.push(("if", keywords::if_::compile));
            entries.push(("then", keywords::if_::compile_then));
            entries.push(("else", keywords::if_::compile_else));
        }
    }

    // The unevaluated pair runs after everything that can mark.
    if unevaluated && draft >= Draft::Draft201909 {
        entries.push(("unevaluatedItems", keywords::unevaluated_items::compile));
        entries.push((
            "unevaluatedProperties",
            keywords::unevaluated_properties::compile,
        ));
    }

    Dialect { entries }
}
