//! JSON Pointer evaluation over `serde_json` documents.
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::Error;

/// Walk a JSON Pointer (without the leading `#`) through a document.
///
/// Tokens are percent-decoded, then `~1` and `~0` are unescaped. Integer
/// tokens index arrays; everything else is an object key.
///
/// # Errors
///
/// Returns an error when the pointer leads outside the document or contains
/// invalid percent-encoding or array indices.
pub fn walk<'a>(document: &'a Value, pointer: &str) -> Result<&'a Value, Error> {
    let mut target = document;
    if pointer.is_empty() {
        return Ok(target);
    }
    for token in pointer.split('/').skip(1) {
        let token = decode_token(pointer, token)?;
        target = step(pointer, target, &token)?;
    }
    Ok(target)
}

/// A single pointer step into an object or array.
pub(crate) fn step<'a>(pointer: &str, target: &'a Value, token: &str) -> Result<&'a Value, Error> {
    match target {
        Value::Object(map) => map
            .get(token)
            .ok_or_else(|| Error::pointer_to_nowhere(pointer)),
        Value::Array(items) => {
            let index: usize = token
                .parse()
                .map_err(|err| Error::invalid_array_index(pointer, token, err))?;
            items
                .get(index)
                .ok_or_else(|| Error::pointer_to_nowhere(pointer))
        }
        _ => Err(Error::pointer_to_nowhere(pointer)),
    }
}

pub(crate) fn decode_token(pointer: &str, token: &str) -> Result<String, Error> {
    let decoded = if token.contains('%') {
        percent_decode_str(token)
            .decode_utf8()
            .map_err(|_| Error::invalid_percent_encoding(pointer))?
            .into_owned()
    } else {
        token.to_string()
    };
    if decoded.contains('~') {
        Ok(decoded.replace("~1", "/").replace("~0", "~"))
    } else {
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::walk;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("", json!({"a": 1}))]
    #[test_case("/a", json!(1))]
    #[test_case("/b/1", json!("two"))]
    #[test_case("/c/a~1b", json!(3))]
    #[test_case("/c/d~0e", json!(4))]
    #[test_case("/%61", json!(1); "percent encoded key")]
    fn walks(pointer: &str, expected: serde_json::Value) {
        let document = json!({
            "a": 1,
            "b": ["one", "two"],
            "c": {"a/b": 3, "d~e": 4},
        });
        assert_eq!(walk(&document, pointer).expect("valid pointer"), &expected);
    }

    #[test_case("/missing")]
    #[test_case("/b/5")]
    #[test_case("/b/not-an-index")]
    #[test_case("/a/deeper")]
    fn fails(pointer: &str) {
        let document = json!({"a": 1, "b": []});
        assert!(walk(&document, pointer).is_err());
    }
}
