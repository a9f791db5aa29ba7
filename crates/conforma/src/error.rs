//! Error types
use crate::{
    paths::Location,
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
};
use serde_json::Value;
use std::fmt::{self, Write};

/// An error that occurred during validation, or a schema malformation
/// discovered while building a validator.
///
/// Errors nest: a composite keyword wraps the errors of its subschemas in
/// `children`, so the full failure tree is preserved down to the leaf
/// keyword that rejected the instance.
#[derive(Debug)]
pub struct ValidationError {
    /// Type of validation error.
    pub kind: ValidationErrorKind,
    /// Value of the instance that failed validation.
    pub instance: Value,
    /// Path to the JSON Schema keyword that failed validation.
    pub schema_path: Location,
    /// Path to the value that failed validation.
    pub instance_path: Location,
    /// Errors of the subschemas this error aggregates.
    pub children: Vec<ValidationError>,
}

/// Kinds of errors that may happen during validation
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ValidationErrorKind {
    /// The input array contains more items than the positional schemas allow.
    AdditionalItems { limit: usize },
    /// Unexpected properties.
    AdditionalProperties { unexpected: Vec<String> },
    /// The input value is not valid under any of the subschemas of `anyOf`.
    AnyOf,
    /// The input value doesn't match the expected constant.
    Constant { expected: Value },
    /// The input array doesn't contain items conforming to the specified schema.
    Contains,
    /// The input value does not respect the defined contentEncoding.
    ContentEncoding { encoding: String },
    /// The input value does not respect the defined contentMediaType.
    ContentMediaType { media_type: String },
    /// A property is present that the dependency keyword requires more for.
    DependentRequired {
        keyword: &'static str,
        property: String,
        missing: Vec<String>,
    },
    /// The input value matches a disallowed type (draft 3).
    Disallow { disallowed: Value },
    /// The input value doesn't match any of the specified options.
    Enum { options: Value },
    /// Value is too large.
    ExclusiveMaximum { limit: Value },
    /// Value is too small.
    ExclusiveMinimum { limit: Value },
    /// Everything is invalid for the `false` schema.
    FalseSchema,
    /// The input doesn't match the specified format.
    Format { format: String },
    /// The schema itself is malformed at the point of use.
    Malformed {
        keyword: &'static str,
        detail: String,
    },
    /// Too many items match the `contains` schema.
    MaxContains { limit: u64 },
    /// Too few items match the `contains` schema.
    MinContains { limit: u64 },
    /// Too many items in an array.
    MaxItems { limit: u64 },
    /// Value is too large.
    Maximum { limit: Value },
    /// String is too long.
    MaxLength { limit: u64 },
    /// Too many properties in an object.
    MaxProperties { limit: u64 },
    /// Too few items in an array.
    MinItems { limit: u64 },
    /// Value is too small.
    Minimum { limit: Value },
    /// String is too short.
    MinLength { limit: u64 },
    /// Not enough properties in an object.
    MinProperties { limit: u64 },
    /// A number is not a multiple of another number.
    MultipleOf {
        keyword: &'static str,
        multiple_of: Value,
    },
    /// Negated schema matched.
    Not { schema: Value },
    /// The input is valid under more than one of the `oneOf` subschemas.
    OneOfMultipleValid,
    /// The input is not valid under any of the `oneOf` subschemas.
    OneOfNotValid,
    /// The input doesn't match the given pattern.
    Pattern { pattern: String },
    /// Object property names are invalid.
    PropertyNames,
    /// Required properties are missing.
    Required { missing: Vec<String> },
    /// An object schema failed; the per-keyword errors are in `children`.
    Schema,
    /// The input value doesn't match one or multiple required types.
    Type { kind: TypeKind },
    /// Array indices that no applicator evaluated and `unevaluatedItems` rejects.
    UnevaluatedItems { unexpected: Vec<usize> },
    /// Properties that no applicator evaluated and `unevaluatedProperties` rejects.
    UnevaluatedProperties { unexpected: Vec<String> },
    /// The input array has non-unique elements.
    UniqueItems,
}

#[derive(Debug)]
#[allow(missing_docs)]
pub enum TypeKind {
    Single(PrimitiveType),
    Multiple(PrimitiveTypesBitMap),
}

macro_rules! constructor {
    ($name:ident, $kind:expr $(, $field:ident : $ty:ty)*) => {
        pub(crate) fn $name(
            schema_path: Location,
            instance_path: Location,
            instance: &Value
            $(, $field: $ty)*
        ) -> ValidationError {
            ValidationError {
                kind: $kind,
                instance: instance.clone(),
                schema_path,
                instance_path,
                children: Vec::new(),
            }
        }
    };
}

impl ValidationError {
    constructor!(additional_items, ValidationErrorKind::AdditionalItems { limit }, limit: usize);
    constructor!(
        additional_properties,
        ValidationErrorKind::AdditionalProperties { unexpected },
        unexpected: Vec<String>
    );
    constructor!(any_of, ValidationErrorKind::AnyOf);
    constructor!(constant, ValidationErrorKind::Constant { expected }, expected: Value);
    constructor!(contains, ValidationErrorKind::Contains);
    constructor!(
        content_encoding,
        ValidationErrorKind::ContentEncoding { encoding },
        encoding: String
    );
    constructor!(
        content_media_type,
        ValidationErrorKind::ContentMediaType { media_type },
        media_type: String
    );
    constructor!(
        dependent_required,
        ValidationErrorKind::DependentRequired { keyword, property, missing },
        keyword: &'static str,
        property: String,
        missing: Vec<String>
    );
    constructor!(disallow, ValidationErrorKind::Disallow { disallowed }, disallowed: Value);
    constructor!(enumeration, ValidationErrorKind::Enum { options }, options: Value);
    constructor!(
        exclusive_maximum,
        ValidationErrorKind::ExclusiveMaximum { limit },
        limit: Value
    );
    constructor!(
        exclusive_minimum,
        ValidationErrorKind::ExclusiveMinimum { limit },
        limit: Value
    );
    constructor!(false_schema, ValidationErrorKind::FalseSchema);
    constructor!(format, ValidationErrorKind::Format { format }, format: String);
    constructor!(max_contains, ValidationErrorKind::MaxContains { limit }, limit: u64);
    constructor!(min_contains, ValidationErrorKind::MinContains { limit }, limit: u64);
    constructor!(max_items, ValidationErrorKind::MaxItems { limit }, limit: u64);
    constructor!(maximum, ValidationErrorKind::Maximum { limit }, limit: Value);
    constructor!(max_length, ValidationErrorKind::MaxLength { limit }, limit: u64);
    constructor!(max_properties, ValidationErrorKind::MaxProperties { limit }, limit: u64);
    constructor!(min_items, ValidationErrorKind::MinItems { limit }, limit: u64);
    constructor!(minimum, ValidationErrorKind::Minimum { limit }, limit: Value);
    constructor!(min_length, ValidationErrorKind::MinLength { limit }, limit: u64);
    constructor!(min_properties, ValidationErrorKind::MinProperties { limit }, limit: u64);
    constructor!(
        multiple_of,
        ValidationErrorKind::MultipleOf { keyword, multiple_of },
        keyword: &'static str,
        multiple_of: Value
    );
    constructor!(one_of_multiple_valid, ValidationErrorKind::OneOfMultipleValid);
    constructor!(one_of_not_valid, ValidationErrorKind::OneOfNotValid);
    constructor!(pattern, ValidationErrorKind::Pattern { pattern }, pattern: String);
    constructor!(required, ValidationErrorKind::Required { missing }, missing: Vec<String>);
    constructor!(unique_items, ValidationErrorKind::UniqueItems);
    constructor!(
        unevaluated_items,
        ValidationErrorKind::UnevaluatedItems { unexpected },
        unexpected: Vec<usize>
    );
    constructor!(
        unevaluated_properties,
        ValidationErrorKind::UnevaluatedProperties { unexpected },
        unexpected: Vec<String>
    );

    pub(crate) fn not(
        schema_path: Location,
        instance_path: Location,
        instance: &Value,
        schema: Value,
    ) -> ValidationError {
        ValidationError {
            kind: ValidationErrorKind::Not { schema },
            instance: instance.clone(),
            schema_path,
            instance_path,
            children: Vec::new(),
        }
    }

    pub(crate) fn single_type_error(
        schema_path: Location,
        instance_path: Location,
        instance: &Value,
        type_name: PrimitiveType,
    ) -> ValidationError {
        ValidationError {
            kind: ValidationErrorKind::Type {
                kind: TypeKind::Single(type_name),
            },
            instance: instance.clone(),
            schema_path,
            instance_path,
            children: Vec::new(),
        }
    }

    pub(crate) fn multiple_type_error(
        schema_path: Location,
        instance_path: Location,
        instance: &Value,
        types: PrimitiveTypesBitMap,
    ) -> ValidationError {
        ValidationError {
            kind: ValidationErrorKind::Type {
                kind: TypeKind::Multiple(types),
            },
            instance: instance.clone(),
            schema_path,
            instance_path,
            children: Vec::new(),
        }
    }

    pub(crate) fn property_names(
        schema_path: Location,
        instance_path: Location,
        instance: &Value,
        children: Vec<ValidationError>,
    ) -> ValidationError {
        ValidationError {
            kind: ValidationErrorKind::PropertyNames,
            instance: instance.clone(),
            schema_path,
            instance_path,
            children,
        }
    }

    pub(crate) fn malformed(
        schema_path: Location,
        schema: &Value,
        keyword: &'static str,
        detail: impl Into<String>,
    ) -> ValidationError {
        ValidationError {
            kind: ValidationErrorKind::Malformed {
                keyword,
                detail: detail.into(),
            },
            instance: schema.clone(),
            schema_path,
            instance_path: Location::new(),
            children: Vec::new(),
        }
    }

    /// The wrapper produced by an object schema whose keywords failed.
    pub(crate) fn schema(
        schema_path: Location,
        instance_path: Location,
        instance: &Value,
        children: Vec<ValidationError>,
    ) -> ValidationError {
        ValidationError {
            kind: ValidationErrorKind::Schema,
            instance: instance.clone(),
            schema_path,
            instance_path,
            children,
        }
    }

    /// Attach `children` to this error.
    #[must_use]
    pub(crate) fn with_children(mut self, children: Vec<ValidationError>) -> ValidationError {
        self.children = children;
        self
    }

    /// Unwrap the top-level schema wrapper into the list of keyword errors.
    pub(crate) fn into_top_level(self) -> Vec<ValidationError> {
        if matches!(self.kind, ValidationErrorKind::Schema) {
            self.children
        } else {
            vec![self]
        }
    }

    /// Iterate over the leaf errors of this error tree in depth-first order.
    pub fn leaves(&self) -> Vec<&ValidationError> {
        let mut output = Vec::new();
        collect_leaves(self, &mut output);
        output
    }
}

fn collect_leaves<'e>(error: &'e ValidationError, output: &mut Vec<&'e ValidationError>) {
    if error.children.is_empty() {
        output.push(error);
    } else {
        for child in &error.children {
            collect_leaves(child, output);
        }
    }
}

fn article(type_name: PrimitiveType) -> &'static str {
    match type_name {
        PrimitiveType::Array | PrimitiveType::Integer | PrimitiveType::Object => "an",
        _ => "a",
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_char('[')?;
    let mut first = true;
    for item in items {
        if !first {
            f.write_str(", ")?;
        }
        first = false;
        write!(f, "{item}")?;
    }
    f.write_char(']')
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::AdditionalItems { limit } => {
                write!(
                    f,
                    "additionalItems: no more than {limit} item(s) allowed - {}",
                    self.instance
                )
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                f.write_str("additionalProperties: properties not allowed: ")?;
                write_list(f, unexpected)
            }
            ValidationErrorKind::AnyOf => {
                write!(f, "anyOf: no subschema matched - {}", self.instance)
            }
            ValidationErrorKind::Constant { expected } => {
                write!(f, "const: expected {expected} - {}", self.instance)
            }
            ValidationErrorKind::Contains => {
                write!(f, "contains: no items match - {}", self.instance)
            }
            ValidationErrorKind::ContentEncoding { encoding } => {
                write!(f, "contentEncoding: not {encoding} - {}", self.instance)
            }
            ValidationErrorKind::ContentMediaType { media_type } => {
                write!(f, "contentMediaType: not {media_type} - {}", self.instance)
            }
            ValidationErrorKind::DependentRequired {
                keyword,
                property,
                missing,
            } => {
                write!(f, "{keyword}: missing properties ")?;
                write_list(f, missing)?;
                write!(f, " required by \"{property}\"")
            }
            ValidationErrorKind::Disallow { disallowed } => {
                write!(f, "disallow: matched {disallowed} - {}", self.instance)
            }
            ValidationErrorKind::Enum { options } => {
                write!(f, "enum: not one of {options} - {}", self.instance)
            }
            ValidationErrorKind::ExclusiveMaximum { limit } => {
                write!(f, "exclusiveMaximum: not less than {limit} - {}", self.instance)
            }
            ValidationErrorKind::ExclusiveMinimum { limit } => {
                write!(
                    f,
                    "exclusiveMinimum: not greater than {limit} - {}",
                    self.instance
                )
            }
            ValidationErrorKind::FalseSchema => {
                write!(f, "false: no instance is valid - {}", self.instance)
            }
            ValidationErrorKind::Format { format } => {
                write!(f, "format: not a valid {format} - {}", self.instance)
            }
            ValidationErrorKind::Malformed { keyword, detail } => {
                write!(f, "{keyword}: malformed schema - {detail}")
            }
            ValidationErrorKind::MaxContains { limit } => {
                write!(
                    f,
                    "maxContains: more than {limit} item(s) match - {}",
                    self.instance
                )
            }
            ValidationErrorKind::MinContains { limit } => {
                write!(
                    f,
                    "minContains: fewer than {limit} item(s) match - {}",
                    self.instance
                )
            }
            ValidationErrorKind::MaxItems { limit } => {
                write!(f, "maxItems: more than {limit} item(s) - {}", self.instance)
            }
            ValidationErrorKind::Maximum { limit } => {
                write!(f, "maximum: greater than {limit} - {}", self.instance)
            }
            ValidationErrorKind::MaxLength { limit } => {
                write!(
                    f,
                    "maxLength: longer than {limit} character(s) - {}",
                    self.instance
                )
            }
            ValidationErrorKind::MaxProperties { limit } => {
                write!(
                    f,
                    "maxProperties: more than {limit} propert(ies) - {}",
                    self.instance
                )
            }
            ValidationErrorKind::MinItems { limit } => {
                write!(f, "minItems: fewer than {limit} item(s) - {}", self.instance)
            }
            ValidationErrorKind::Minimum { limit } => {
                write!(f, "minimum: less than {limit} - {}", self.instance)
            }
            ValidationErrorKind::MinLength { limit } => {
                write!(
                    f,
                    "minLength: shorter than {limit} character(s) - {}",
                    self.instance
                )
            }
            ValidationErrorKind::MinProperties { limit } => {
                write!(
                    f,
                    "minProperties: fewer than {limit} propert(ies) - {}",
                    self.instance
                )
            }
            ValidationErrorKind::MultipleOf {
                keyword,
                multiple_of,
            } => {
                write!(
                    f,
                    "{keyword}: not a multiple of {multiple_of} - {}",
                    self.instance
                )
            }
            ValidationErrorKind::Not { schema } => {
                write!(f, "not: schema matched {schema} - {}", self.instance)
            }
            ValidationErrorKind::OneOfMultipleValid => {
                write!(f, "oneOf: more than one subschema matched - {}", self.instance)
            }
            ValidationErrorKind::OneOfNotValid => {
                write!(f, "oneOf: no subschema matched - {}", self.instance)
            }
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, "pattern: does not match \"{pattern}\" - {}", self.instance)
            }
            ValidationErrorKind::PropertyNames => {
                write!(f, "propertyNames: invalid property name(s) - {}", self.instance)
            }
            ValidationErrorKind::Required { missing } => {
                f.write_str("required: missing properties (at least): ")?;
                write_list(f, missing)
            }
            ValidationErrorKind::Schema => {
                write!(f, "schema: {} error(s)", self.children.len())
            }
            ValidationErrorKind::Type { kind } => match kind {
                TypeKind::Single(type_name) => {
                    write!(
                        f,
                        "type: not {} {type_name} - {}",
                        article(*type_name),
                        self.instance
                    )
                }
                TypeKind::Multiple(types) => {
                    f.write_str("type: not one of ")?;
                    write_list(f, &types.iter().collect::<Vec<_>>())?;
                    write!(f, " - {}", self.instance)
                }
            },
            ValidationErrorKind::UnevaluatedItems { unexpected } => {
                f.write_str("unevaluatedItems: item(s) not allowed at ")?;
                write_list(f, unexpected)
            }
            ValidationErrorKind::UniqueItems => {
                write!(f, "uniqueItems: non-unique elements - {}", self.instance)
            }
            ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                f.write_str("unevaluatedProperties: properties not allowed: ")?;
                write_list(f, unexpected)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
