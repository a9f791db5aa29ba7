//! End-to-end behavior across the public API.
use conforma::{Draft, Retrieve, Uri, ValidationError};
use serde_json::{json, Value};
use test_case::test_case;

#[test]
fn string_schema_accepts_strings() {
    let result = conforma::validate(&json!({"type": "string"}), &json!("hello"));
    assert!(result.is_valid());
    assert!(result.errors().is_empty());
}

#[test]
fn string_schema_rejects_numbers_with_a_typed_error() {
    let result = conforma::validate(&json!({"type": "string"}), &json!(0));
    assert!(!result.is_valid());
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "type: not a string - 0");
    assert_eq!(errors[0].schema_path.as_str(), "/type");
    assert_eq!(errors[0].instance_path.as_str(), "");
}

#[test]
fn offending_array_elements_are_located() {
    let schema = json!({"type": "array", "items": {"type": "string"}});
    let result = conforma::validate(&schema, &json!(["hello", 0]));
    assert!(!result.is_valid());
    let leaves: Vec<&ValidationError> = result
        .errors()
        .iter()
        .flat_map(ValidationError::leaves)
        .collect();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].instance_path.as_str(), "/1");
    assert_eq!(leaves[0].schema_path.as_str(), "/items/type");
}

#[test]
fn date_format_asserts_by_default_and_warns_when_relaxed() {
    let schema = json!({"type": "string", "format": "date"});
    let result = conforma::validate(&schema, &json!("2025/01/01"));
    assert!(!result.is_valid());
    let relaxed = conforma::options()
        .strict_format(false)
        .build(&schema)
        .expect("valid schema");
    assert!(relaxed.validate(&json!("2025/01/01")).is_valid());
}

#[test]
fn one_of_picks_the_boolean_branch() {
    let schema = json!({
        "oneOf": [
            {"type": "string", "format": "date"},
            {"type": "integer"},
            {"type": "array"},
            {"type": "boolean"}
        ]
    });
    assert!(conforma::is_valid(&schema, &json!(false)));
}

#[test]
fn missing_required_properties_are_reported() {
    let schema = json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "required": ["name"]
    });
    let result = conforma::validate(&schema, &json!({"age": 30}));
    assert!(!result.is_valid());
    let messages: Vec<String> = result
        .errors()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(messages
        .contains(&"required: missing properties (at least): [name]".to_string()));
}

#[test]
fn refs_into_defs_constrain_properties() {
    let schema = json!({
        "$defs": {"c": {"type": "string", "enum": ["red", "green", "blue"]}},
        "type": "object",
        "properties": {"primary": {"$ref": "#/$defs/c"}}
    });
    assert!(conforma::is_valid(&schema, &json!({"primary": "blue"})));
    assert!(!conforma::is_valid(&schema, &json!({"primary": "yellow"})));
}

// Universal properties.

#[test]
fn validation_is_deterministic_and_does_not_leak_state() {
    let schema = json!({
        "allOf": [{"properties": {"a": {"type": "integer"}}}],
        "unevaluatedProperties": false
    });
    let validator = conforma::validator_for(&schema).expect("valid schema");
    let valid = json!({"a": 1});
    let invalid = json!({"a": 1, "b": 2});
    for _ in 0..3 {
        assert!(validator.validate(&valid).is_valid());
        assert!(!validator.validate(&invalid).is_valid());
    }
}

#[test]
fn annotations_from_all_branches_union() {
    let schema = json!({
        "allOf": [
            {"properties": {"a": true}},
            {"properties": {"b": true}}
        ],
        "unevaluatedProperties": false
    });
    let validator = conforma::validator_for(&schema).expect("valid schema");
    assert!(validator.is_valid(&json!({"a": 1, "b": 2})));
    assert!(!validator.is_valid(&json!({"a": 1, "c": 2})));
}

#[test]
fn ref_is_transparent() {
    let by_ref = json!({
        "$defs": {"x": {"minimum": 5}},
        "$ref": "#/$defs/x"
    });
    let direct = json!({"minimum": 5});
    for instance in [json!(4), json!(5), json!("five")] {
        assert_eq!(
            conforma::is_valid(&by_ref, &instance),
            conforma::is_valid(&direct, &instance)
        );
    }
}

#[test]
fn later_draft_keywords_are_inert_in_older_drafts() {
    // `if`/`then` arrived in draft 7; draft 6 treats them as annotations.
    let schema = json!({
        "$schema": "http://json-schema.org/draft-06/schema",
        "if": {"type": "integer"},
        "then": {"minimum": 100}
    });
    let validator = conforma::validator_for(&schema).expect("valid schema");
    assert!(validator.is_valid(&json!(1)));
}

#[test_case(false, true; "lenient integers accept one point zero")]
#[test_case(true, false; "strict integers reject one point zero")]
fn integer_compatibility(strict: bool, expected: bool) {
    let schema = json!({"type": "integer"});
    let validator = conforma::options()
        .strict_integer(strict)
        .build(&schema)
        .expect("valid schema");
    assert_eq!(validator.is_valid(&json!(1.0)), expected);
}

// Remote references through a retriever.

struct InMemory;

impl Retrieve for InMemory {
    fn retrieve(&self, uri: &Uri) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        match uri.to_string().as_str() {
            "http://example.com/integer.json" => Ok(json!({"type": "integer"})),
            "http://example.com/tree.json" => Ok(json!({
                "$id": "http://example.com/tree.json",
                "type": "object",
                "properties": {
                    "value": {"$ref": "integer.json"},
                    "next": {"$ref": "#"}
                }
            })),
            _ => Err(format!("unknown document: {uri}").into()),
        }
    }
}

#[test]
fn remote_references_are_fetched_once_and_followed() {
    let schema = json!({"$ref": "http://example.com/tree.json"});
    let validator = conforma::options()
        .with_retriever(InMemory)
        .build(&schema)
        .expect("valid schema");
    assert!(validator.is_valid(&json!({"value": 1, "next": {"value": 2}})));
    assert!(!validator.is_valid(&json!({"value": 1, "next": {"value": "x"}})));
}

#[test]
fn unresolvable_remote_references_are_no_ops() {
    let schema = json!({"$ref": "http://example.com/missing.json"});
    let validator = conforma::options()
        .with_retriever(InMemory)
        .build(&schema)
        .expect("valid schema");
    assert!(validator.is_valid(&json!(42)));
}

// Error collection modes.

#[test]
fn default_mode_stops_at_the_first_error() {
    let schema = json!({"minProperties": 2, "propertyNames": {"minLength": 3}});
    let result = conforma::validate(&schema, &json!({"a": 3}));
    assert_eq!(result.errors().len(), 1);
}

#[test]
fn exhaustive_mode_collects_every_error() {
    let schema = json!({"minProperties": 2, "propertyNames": {"minLength": 3}});
    let validator = conforma::options()
        .exhaustive(true)
        .build(&schema)
        .expect("valid schema");
    let result = validator.validate(&json!({"a": 3}));
    assert_eq!(result.errors().len(), 2);
}

// Draft mixing inside one schema.

#[test]
fn drafts_mix_per_resource() {
    let schema = json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "properties": {
            "modern": {"prefixItems": [{"type": "integer"}]},
            "legacy": {
                "$schema": "http://json-schema.org/draft-04/schema",
                "id": "http://example.com/legacy",
                "minimum": 10,
                "exclusiveMinimum": true
            }
        }
    });
    let validator = conforma::validator_for(&schema).expect("valid schema");
    assert!(validator.is_valid(&json!({"modern": [1], "legacy": 11})));
    assert!(!validator.is_valid(&json!({"modern": ["x"]})));
    assert!(!validator.is_valid(&json!({"legacy": 10})));
}

#[test]
fn boolean_schemas_validate_everything_or_nothing() {
    assert!(conforma::is_valid(&json!(true), &json!({"any": "thing"})));
    let result = conforma::validate(&json!(false), &json!(1));
    assert!(!result.is_valid());
    assert_eq!(result.errors()[0].to_string(), "false: no instance is valid - 1");
}

#[test]
fn malformed_schemas_become_build_errors_not_panics() {
    let result = conforma::validate(&json!({"type": "unicorn"}), &json!(1));
    assert!(!result.is_valid());
    assert!(result.errors()[0].to_string().contains("malformed schema"));
}

#[test]
fn validator_reports_its_draft() {
    let validator = conforma::options()
        .with_draft(Draft::Draft7)
        .build(&json!({}))
        .expect("valid schema");
    assert_eq!(validator.draft(), Draft::Draft7);
    assert_eq!(Draft::latest(), Draft::Draft202012);
}
