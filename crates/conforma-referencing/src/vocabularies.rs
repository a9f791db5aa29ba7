//! Vocabulary sets parsed from `$vocabulary` metaschema declarations.
use serde_json::Value;

use crate::Draft;

/// A named set of keywords that a dialect can opt in or out of.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Vocabulary {
    Core,
    Applicator,
    Validation,
    MetaData,
    FormatAnnotation,
    FormatAssertion,
    Content,
    Unevaluated,
}

impl Vocabulary {
    fn bit(self) -> u8 {
        match self {
            Vocabulary::Core => 1,
            Vocabulary::Applicator => 1 << 1,
            Vocabulary::Validation => 1 << 2,
            Vocabulary::MetaData => 1 << 3,
            Vocabulary::FormatAnnotation => 1 << 4,
            Vocabulary::FormatAssertion => 1 << 5,
            Vocabulary::Content => 1 << 6,
            Vocabulary::Unevaluated => 1 << 7,
        }
    }

    /// Map a vocabulary URI to the vocabulary it names.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Vocabulary> {
        let tail = uri
            .strip_prefix("https://json-schema.org/draft/")
            .and_then(|tail| {
                tail.strip_prefix("2019-09/vocab/")
                    .or_else(|| tail.strip_prefix("2020-12/vocab/"))
                    .or_else(|| tail.strip_prefix("next/vocab/"))
            })?;
        match tail {
            "core" => Some(Vocabulary::Core),
            "applicator" => Some(Vocabulary::Applicator),
            "validation" => Some(Vocabulary::Validation),
            "meta-data" => Some(Vocabulary::MetaData),
            "format" | "format-annotation" => Some(Vocabulary::FormatAnnotation),
            "format-assertion" => Some(Vocabulary::FormatAssertion),
            "content" => Some(Vocabulary::Content),
            "unevaluated" => Some(Vocabulary::Unevaluated),
            _ => None,
        }
    }
}

/// The vocabularies active for one dialect.
///
/// Drafts before 2019-09 have no vocabulary mechanism; for them every
/// keyword is active and `contains` always answers `true`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VocabularySet {
    mask: Option<u8>,
}

impl VocabularySet {
    /// The default set for a draft when no `$vocabulary` is declared.
    #[must_use]
    pub fn default_for(draft: Draft) -> VocabularySet {
        match draft {
            Draft::Draft3 | Draft::Draft4 | Draft::Draft6 | Draft::Draft7 => {
                VocabularySet { mask: None }
            }
            Draft::Draft201909 => VocabularySet::from_known(&[
                Vocabulary::Core,
                Vocabulary::Applicator,
                Vocabulary::Validation,
                Vocabulary::MetaData,
                Vocabulary::FormatAnnotation,
                Vocabulary::Content,
            ]),
            Draft::Draft202012 | Draft::DraftNext => VocabularySet::from_known(&[
                Vocabulary::Core,
                Vocabulary::Applicator,
                Vocabulary::Validation,
                Vocabulary::MetaData,
                Vocabulary::FormatAnnotation,
                Vocabulary::Content,
                Vocabulary::Unevaluated,
            ]),
        }
    }

    #[must_use]
    pub fn from_known(vocabularies: &[Vocabulary]) -> VocabularySet {
        let mut mask = 0;
        for vocabulary in vocabularies {
            mask |= vocabulary.bit();
        }
        VocabularySet { mask: Some(mask) }
    }

    /// Build a set from a `$vocabulary` object of a metaschema.
    ///
    /// Unknown vocabulary URIs are ignored; the core vocabulary is always
    /// kept active.
    #[must_use]
    pub fn from_declaration(declaration: &Value, draft: Draft) -> VocabularySet {
        let Some(map) = declaration.as_object() else {
            return draft.default_vocabularies();
        };
        let mut mask = Vocabulary::Core.bit();
        for (uri, enabled) in map {
            if enabled.as_bool() != Some(false) {
                if let Some(vocabulary) = Vocabulary::from_uri(uri) {
                    mask |= vocabulary.bit();
                }
            }
        }
        VocabularySet { mask: Some(mask) }
    }

    #[must_use]
    pub fn contains(&self, vocabulary: Vocabulary) -> bool {
        match self.mask {
            Some(mask) => mask & vocabulary.bit() != 0,
            None => true,
        }
    }
}
