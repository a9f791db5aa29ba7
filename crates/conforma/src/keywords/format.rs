//! Validator for the `format` keyword: a draft-indexed registry of named
//! string predicates.
//!
//! Non-string instances always pass; type errors are the business of
//! `type`. Formats assert by default (strict formats); with strict formats
//! off, violations outside drafts 4-7 only log a warning, since those
//! drafts define `format` as an assertion.
use std::{
    net::{Ipv4Addr, Ipv6Addr},
    sync::Arc,
};

use fancy_regex::Regex;
use once_cell::sync::Lazy;
use referencing::Draft;
use serde_json::{Map, Value};

use crate::{
    compiler::Context,
    ecma,
    error::ValidationError,
    evaluation::EvalState,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    validator::Validate,
};

/// A named format predicate.
pub trait Format: Send + Sync {
    /// Whether the string conforms to the format.
    fn is_valid(&self, value: &str) -> bool;
}

impl<F> Format for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

struct FormatValidator {
    name: String,
    format: Arc<dyn Format>,
    assertive: bool,
    location: Location,
}

impl Validate for FormatValidator {
    fn is_valid(&self, _: &mut EvalState, _: &LazyLocation, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            !self.assertive || self.format.is_valid(item)
        } else {
            true
        }
    }

    fn validate(
        &self,
        _: &mut EvalState,
        location: &LazyLocation,
        instance: &Value,
    ) -> Result<(), ValidationError> {
        let Value::String(item) = instance else {
            return Ok(());
        };
        if self.format.is_valid(item) {
            Ok(())
        } else if self.assertive {
            Err(ValidationError::format(
                self.location.clone(),
                location.into(),
                instance,
                self.name.clone(),
            ))
        } else {
            log::warn!("{instance} is not a valid {} at '{}'", self.name, self.location);
            Ok(())
        }
    }
}

/// Resolve a format by name: per-call overrides first, then the per-draft
/// builtin table.
pub(crate) fn lookup(ctx: &Context, name: &str) -> Option<Arc<dyn Format>> {
    if let Some(format) = ctx.config().get_format(name) {
        return Some(Arc::clone(format));
    }
    builtin(ctx.draft(), name).map(|func| {
        let format: Arc<dyn Format> = Arc::new(func);
        format
    })
}

#[inline]
pub(crate) fn compile(
    ctx: &Context,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let location = ctx.location().join("format");
    let Some(name) = schema.as_str() else {
        return Some(Err(ValidationError::malformed(
            location,
            schema,
            "format",
            format!("expected a format name, got {schema}"),
        )));
    };
    let Some(format) = lookup(ctx, name) else {
        if ctx.config().is_strict_format() {
            return Some(Err(ValidationError::malformed(
                location,
                schema,
                "format",
                format!("unknown format \"{name}\""),
            )));
        }
        log::warn!("unknown format \"{name}\" is ignored");
        return None;
    };
    let assertive = ctx.config().is_strict_format()
        || matches!(ctx.draft(), Draft::Draft4 | Draft::Draft6 | Draft::Draft7);
    Some(Ok(Box::new(FormatValidator {
        name: name.to_string(),
        format,
        assertive,
        location,
    })))
}

fn builtin(draft: Draft, name: &str) -> Option<fn(&str) -> bool> {
    match name {
        "date-time" => Some(is_valid_datetime),
        "email" => Some(is_valid_email),
        "ipv6" => Some(is_valid_ipv6),
        "uri" => Some(is_valid_uri),
        "date" if draft == Draft::Draft3 || draft >= Draft::Draft7 => Some(is_valid_date),
        "time" if draft == Draft::Draft3 || draft >= Draft::Draft7 => Some(is_valid_time),
        "regex" if draft == Draft::Draft3 || draft >= Draft::Draft7 => Some(is_valid_regex),
        "hostname" if draft >= Draft::Draft4 => Some(is_valid_hostname),
        "host-name" if draft == Draft::Draft3 => Some(is_valid_hostname),
        "ipv4" if draft >= Draft::Draft4 => Some(is_valid_ipv4),
        "ip-address" if draft == Draft::Draft3 => Some(is_valid_ipv4),
        "uri-reference" if draft >= Draft::Draft6 => Some(is_valid_uri_reference),
        "uri-template" if draft >= Draft::Draft6 => Some(is_valid_uri_template),
        "json-pointer" if draft >= Draft::Draft6 => Some(is_valid_json_pointer),
        "iri" if draft >= Draft::Draft7 => Some(is_valid_iri),
        "iri-reference" if draft >= Draft::Draft7 => Some(is_valid_iri_reference),
        "idn-email" if draft >= Draft::Draft7 => Some(is_valid_idn_email),
        "idn-hostname" if draft >= Draft::Draft7 => Some(is_valid_idn_hostname),
        "relative-json-pointer" if draft >= Draft::Draft7 => Some(is_valid_relative_json_pointer),
        "duration" if draft >= Draft::Draft201909 => Some(is_valid_duration),
        "uuid" if draft >= Draft::Draft201909 => Some(is_valid_uuid),
        "color" if draft == Draft::Draft3 => Some(is_valid_color),
        // Informative draft 3 leftovers with no checkable grammar.
        "style" | "phone" | "utc-millisec" if draft == Draft::Draft3 => Some(accept_all),
        _ => None,
    }
}

fn accept_all(_: &str) -> bool {
    true
}

fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn is_valid_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    for index in [0, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    let year = (bytes[0] - b'0') as u16 * 1000
        + (bytes[1] - b'0') as u16 * 100
        + (bytes[2] - b'0') as u16 * 10
        + (bytes[3] - b'0') as u16;
    let month = (bytes[5] - b'0') * 10 + (bytes[6] - b'0');
    let day = (bytes[8] - b'0') * 10 + (bytes[9] - b'0');
    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }
    let limit = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    };
    day <= limit
}

/// RFC 3339 full-time: `HH:MM:SS(.fff)?` with a mandatory offset. A leap
/// second is only allowed at 23:59 UTC after offset adjustment.
fn is_valid_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    if bytes.len() < 9 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    for index in [0, 1, 3, 4, 6, 7] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    let second = (bytes[6] - b'0') * 10 + (bytes[7] - b'0');
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let mut rest = &time[8..];
    if rest.as_bytes().first() == Some(&b'.') {
        let fraction = &rest[1..];
        let digits = fraction
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return false;
        }
        rest = &fraction[digits..];
    }
    let offset_minutes: i32 = match rest.as_bytes() {
        [b'z' | b'Z'] => 0,
        [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] => {
            if ![h1, h2, m1, m2].iter().all(|byte| byte.is_ascii_digit()) {
                return false;
            }
            let hours = i32::from((*h1 - b'0') * 10 + (*h2 - b'0'));
            let minutes = i32::from((*m1 - b'0') * 10 + (*m2 - b'0'));
            if hours > 23 || minutes > 59 {
                return false;
            }
            let total = hours * 60 + minutes;
            if *sign == b'-' {
                -total
            } else {
                total
            }
        }
        _ => return false,
    };
    if second == 60 {
        let utc = (i32::from(hour) * 60 + i32::from(minute) - offset_minutes).rem_euclid(24 * 60);
        return utc == 23 * 60 + 59;
    }
    true
}

fn is_valid_datetime(value: &str) -> bool {
    let Some(split) = value
        .bytes()
        .position(|byte| matches!(byte, b'T' | b't'))
    else {
        return false;
    };
    is_valid_date(&value[..split]) && is_valid_time(&value[split + 1..])
}

/// ISO 8601 duration: `PnYnMnD`, `PTnHnMnS`, combinations, or `PnW`.
fn is_valid_duration(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('P') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    fn units(mut input: &str, order: &[u8]) -> Option<usize> {
        let mut seen = 0;
        let mut position = 0;
        while !input.is_empty() {
            let digits = input.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                break;
            }
            let unit = input.as_bytes().get(digits)?;
            let rank = order[seen..].iter().position(|known| known == unit)?;
            seen += rank + 1;
            position += digits + 1;
            input = &input[digits + 1..];
        }
        Some(position)
    }
    if rest.ends_with('W') {
        let digits = &rest[..rest.len() - 1];
        return !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit());
    }
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date_part, time_part)) => (date_part, Some(time_part)),
        None => (rest, None),
    };
    match units(date_part, b"YMD") {
        Some(consumed) if consumed == date_part.len() => {}
        _ => return false,
    }
    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return false;
        }
        match units(time_part, b"HMS") {
            Some(consumed) if consumed == time_part.len() => {}
            _ => return false,
        }
    } else if date_part.is_empty() {
        return false;
    }
    true
}

fn is_valid_email(value: &str) -> bool {
    value.parse::<email_address::EmailAddress>().is_ok()
}

fn is_valid_idn_email(value: &str) -> bool {
    if is_valid_email(value) {
        return true;
    }
    // Internationalised mailboxes: a non-empty local part and an IDN domain.
    match value.rsplit_once('@') {
        Some((local, domain)) => !local.is_empty() && is_valid_idn_hostname(domain),
        None => false,
    }
}

fn is_valid_hostname(value: &str) -> bool {
    if value.is_empty() || value.len() > 253 {
        return false;
    }
    value.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
    })
}

fn is_valid_idn_hostname(value: &str) -> bool {
    match idna::domain_to_ascii_strict(value) {
        Ok(ascii) => is_valid_hostname(&ascii),
        Err(_) => false,
    }
}

fn is_valid_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok()
}

fn is_valid_ipv6(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

fn is_valid_uuid(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(index, byte)| {
        if matches!(index, 8 | 13 | 18 | 23) {
            *byte == b'-'
        } else {
            byte.is_ascii_hexdigit()
        }
    })
}

static JSON_POINTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/(([^/~])|(~[01]))*)*\z").expect("Is a valid regex"));
static RELATIVE_JSON_POINTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/(?:[^~/]|~0|~1)*)*)\z").expect("Is a valid regex")
});
static URI_TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:(?:[^\x00-\x20"'<>%\\^`{|}]|%[0-9a-f]{2})|\{[+#./;?&=,!@|]?(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?(?:,(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?)*})*\z"#,
    )
    .expect("Is a valid regex")
});

fn is_valid_json_pointer(value: &str) -> bool {
    JSON_POINTER_RE.is_match(value).unwrap_or(false)
}

fn is_valid_relative_json_pointer(value: &str) -> bool {
    RELATIVE_JSON_POINTER_RE.is_match(value).unwrap_or(false)
}

fn is_valid_uri_template(value: &str) -> bool {
    URI_TEMPLATE_RE.is_match(value).unwrap_or(false)
}

fn is_valid_regex(value: &str) -> bool {
    ecma::compile(value).is_ok()
}

/// Character-level RFC 3986 / 3987 shape check.
fn uri_shape(value: &str, require_scheme: bool, allow_unicode: bool) -> bool {
    if value.is_empty() {
        return !require_scheme;
    }
    for (index, ch) in value.char_indices() {
        match ch {
            '%' => {
                let hex: String = value[index + 1..].chars().take(2).collect();
                if hex.len() != 2 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
                    return false;
                }
            }
            'a'..='z' | 'A'..='Z' | '0'..='9' => {}
            '-' | '.' | '_' | '~' | ':' | '/' | '?' | '#' | '[' | ']' | '@' | '!' | '$' | '&'
            | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' => {}
            _ if !ch.is_ascii() && allow_unicode => {}
            _ => return false,
        }
    }
    if require_scheme {
        let Some(colon) = value.find(':') else {
            return false;
        };
        let scheme = &value[..colon];
        let mut chars = scheme.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !first.is_ascii_alphabetic() {
            return false;
        }
        if !chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.')) {
            return false;
        }
        // The fragment, if any, must come after the scheme.
        if value.find('#').map_or(false, |hash| hash < colon) {
            return false;
        }
    }
    true
}

fn is_valid_uri(value: &str) -> bool {
    uri_shape(value, true, false)
}

fn is_valid_uri_reference(value: &str) -> bool {
    uri_shape(value, false, false)
}

fn is_valid_iri(value: &str) -> bool {
    uri_shape(value, true, true)
}

fn is_valid_iri_reference(value: &str) -> bool {
    uri_shape(value, false, true)
}

/// CSS 2.1 color: a hex triplet or one of the named colors.
fn is_valid_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.bytes().all(|byte| byte.is_ascii_hexdigit());
    }
    matches!(
        value.to_ascii_lowercase().as_str(),
        "maroon"
            | "red"
            | "orange"
            | "yellow"
            | "olive"
            | "purple"
            | "fuchsia"
            | "white"
            | "lime"
            | "green"
            | "navy"
            | "blue"
            | "aqua"
            | "teal"
            | "black"
            | "silver"
            | "gray"
    )
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case("date", "1963-06-19", true)]
    #[test_case("date", "2025-02-29", false; "not a leap year")]
    #[test_case("date", "2024-02-29", true; "leap year")]
    #[test_case("date", "2025/01/01", false)]
    #[test_case("date", "2025-13-01", false)]
    #[test_case("time", "08:30:06Z", true)]
    #[test_case("time", "08:30:06.283185Z", true)]
    #[test_case("time", "08:30:06+01:00", true)]
    #[test_case("time", "23:59:60Z", true; "leap second utc")]
    #[test_case("time", "12:00:60Z", false; "leap second not at midnight utc")]
    #[test_case("time", "08:30:06", false; "offset is mandatory")]
    #[test_case("date-time", "1963-06-19T08:30:06.283185Z", true)]
    #[test_case("date-time", "1963-06-19t08:30:06z", true; "lowercase separators")]
    #[test_case("date-time", "06/19/1963 08:30:06 PST", false)]
    #[test_case("duration", "P4DT12H30M5S", true)]
    #[test_case("duration", "PT1H", true)]
    #[test_case("duration", "P3W", true)]
    #[test_case("duration", "P", false)]
    #[test_case("duration", "PT", false)]
    #[test_case("duration", "P1D2H", false; "time units need the T")]
    #[test_case("email", "joe.bloggs@example.com", true)]
    #[test_case("email", "not-an-email", false)]
    #[test_case("hostname", "www.example.com", true)]
    #[test_case("hostname", "-starts-with-hyphen", false)]
    #[test_case("hostname", "a".repeat(64).as_str(), false; "label too long")]
    #[test_case("ipv4", "127.0.0.1", true)]
    #[test_case("ipv4", "192.168.001.1", false; "leading zeroes are octal")]
    #[test_case("ipv4", "256.0.0.1", false)]
    #[test_case("ipv6", "::1", true)]
    #[test_case("ipv6", "12345::", false)]
    #[test_case("uuid", "2eb8aa08-aa98-11ea-b4aa-73b441d16380", true)]
    #[test_case("uuid", "2eb8aa08-aa98-11ea-b4aa-73b441d1638", false; "one digit short")]
    #[test_case("json-pointer", "/foo/bar~0/baz~1/%a", true)]
    #[test_case("json-pointer", "/foo/bar~", false)]
    #[test_case("relative-json-pointer", "1/foo", true)]
    #[test_case("relative-json-pointer", "/foo", false)]
    #[test_case("uri", "http://example.com/path?query#frag", true)]
    #[test_case("uri", "//example.com", false; "scheme is mandatory")]
    #[test_case("uri", "http://example.com/\\path", false)]
    #[test_case("uri-reference", "/relative/path", true)]
    #[test_case("uri-reference", "rel ative", false)]
    #[test_case("iri", "http://ƒøø.ßår/?∂éœ=πîx#πîüx", true)]
    #[test_case("uri-template", "http://example.com/dictionary/{term:1}/{term}", true)]
    #[test_case("uri-template", "http://example.com/dictionary/{term:1}/{term", false)]
    #[test_case("regex", "^a*$", true)]
    #[test_case("regex", "a(", false)]
    #[test_case("idn-hostname", "example.com", true)]
    #[test_case("idn-hostname", "실례.테스트", true)]
    #[test_case("idn-email", "실례@실례.테스트", true)]
    fn format_checks(format: &str, instance: &str, expected: bool) {
        let schema = json!({"format": format});
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert_eq!(validator.is_valid(&json!(instance)), expected);
    }

    #[test_case(&json!({"format": "ipv4"}), &json!(12))]
    #[test_case(&json!({"format": "date"}), &json!(["2025/01/01"]))]
    fn non_strings_short_circuit(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn strict_format_is_the_default() {
        let schema = json!({"type": "string", "format": "date"});
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(!validator.is_valid(&json!("2025/01/01")));
        let relaxed = crate::options()
            .strict_format(false)
            .build(&schema)
            .expect("valid schema");
        assert!(relaxed.is_valid(&json!("2025/01/01")));
    }

    #[test]
    fn drafts_4_to_7_assert_even_without_strict_format() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema",
            "format": "date"
        });
        let validator = crate::options()
            .strict_format(false)
            .build(&schema)
            .expect("valid schema");
        assert!(!validator.is_valid(&json!("2025/01/01")));
    }

    #[test]
    fn unknown_formats_fail_strict_builds_only() {
        let schema = json!({"format": "unseen"});
        assert!(crate::validator_for(&schema).is_err());
        let relaxed = crate::options()
            .strict_format(false)
            .build(&schema)
            .expect("valid schema");
        assert!(relaxed.is_valid(&json!("anything")));
    }

    #[test]
    fn draft3_leftovers() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-03/schema",
            "format": "color"
        });
        let validator = crate::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&json!("red")));
        assert!(validator.is_valid(&json!("#ff0000")));
        assert!(!validator.is_valid(&json!("not-a-color")));
    }
}
