//! Checks and decoders for `contentEncoding` values.
use base64::{engine::general_purpose::STANDARD, Engine};

pub(crate) type ContentEncodingCheck = fn(&str) -> bool;
/// Decode an encoded string; `None` means the input is not decodable.
pub(crate) type ContentEncodingConverter = fn(&str) -> Option<String>;

pub(crate) fn is_base64(instance_string: &str) -> bool {
    STANDARD.decode(instance_string).is_ok()
}

pub(crate) fn from_base64(instance_string: &str) -> Option<String> {
    let bytes = STANDARD.decode(instance_string).ok()?;
    String::from_utf8(bytes).ok()
}

/// RFC 2045 quoted-printable: printable ASCII, `=HH` escapes and soft line
/// breaks.
pub(crate) fn is_quoted_printable(instance_string: &str) -> bool {
    from_quoted_printable(instance_string).is_some()
}

pub(crate) fn from_quoted_printable(instance_string: &str) -> Option<String> {
    let bytes = instance_string.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut position = 0;
    while position < bytes.len() {
        match bytes[position] {
            b'=' => match bytes.get(position + 1) {
                // Soft line breaks.
                Some(b'\n') => position += 2,
                Some(b'\r') if bytes.get(position + 2) == Some(&b'\n') => position += 3,
                Some(high) => {
                    let low = bytes.get(position + 2)?;
                    let high = char::from(*high).to_digit(16)?;
                    let low = char::from(*low).to_digit(16)?;
                    decoded.push((high * 16 + low) as u8);
                    position += 3;
                }
                None => return None,
            },
            byte @ (b'\t' | b'\r' | b'\n' | b' '..=b'~') => {
                decoded.push(byte);
                position += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(decoded).ok()
}

fn accept(_: &str) -> bool {
    true
}

fn passthrough(instance_string: &str) -> Option<String> {
    Some(instance_string.to_string())
}

/// The check for one encoding name, if the encoding is known.
///
/// `base16` and `base32` are accepted but not verified; `identity` passes
/// everything through.
pub(crate) fn check_of(encoding: &str) -> Option<ContentEncodingCheck> {
    match encoding {
        "base64" => Some(is_base64),
        "quoted-printable" => Some(is_quoted_printable),
        "base16" | "base32" | "identity" => Some(accept),
        _ => None,
    }
}

pub(crate) fn converter_of(encoding: &str) -> Option<ContentEncodingConverter> {
    match encoding {
        "base64" => Some(from_base64),
        "quoted-printable" => Some(from_quoted_printable),
        "base16" | "base32" | "identity" => Some(passthrough),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{from_base64, from_quoted_printable, is_base64, is_quoted_printable};
    use test_case::test_case;

    #[test_case("eyJmb28iOiAiYmFyIn0=", Some(r#"{"foo": "bar"}"#))]
    #[test_case("not-base64!!", None)]
    fn base64(input: &str, expected: Option<&str>) {
        assert_eq!(is_base64(input), expected.is_some());
        assert_eq!(from_base64(input).as_deref(), expected);
    }

    #[test_case("plain text", Some("plain text"))]
    #[test_case("caf=C3=A9", Some("café"))]
    #[test_case("soft=\r\nbreak", Some("softbreak"))]
    #[test_case("truncated=4", None)]
    #[test_case("bad escape=ZZ", None)]
    fn quoted_printable(input: &str, expected: Option<&str>) {
        assert_eq!(is_quoted_printable(input), expected.is_some());
        assert_eq!(from_quoted_printable(input).as_deref(), expected);
    }
}
