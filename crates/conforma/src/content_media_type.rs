//! Checks and parsers for `contentMediaType` values.
use serde_json::Value;

pub(crate) type ContentMediaTypeCheck = fn(&str) -> bool;
/// Parse a decoded string into a JSON value for `contentSchema`.
pub(crate) type ContentMediaTypeParser = fn(&str) -> Option<Value>;

pub(crate) fn is_json(instance_string: &str) -> bool {
    serde_json::from_str::<Value>(instance_string).is_ok()
}

pub(crate) fn parse_json(instance_string: &str) -> Option<Value> {
    serde_json::from_str(instance_string).ok()
}

pub(crate) fn check_of(media_type: &str) -> Option<ContentMediaTypeCheck> {
    match media_type {
        "application/json" => Some(is_json),
        _ => None,
    }
}

pub(crate) fn parser_of(media_type: &str) -> Option<ContentMediaTypeParser> {
    match media_type {
        "application/json" => Some(parse_json),
        _ => None,
    }
}
