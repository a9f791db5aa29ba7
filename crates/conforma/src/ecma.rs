//! Convert ECMA 262 regex patterns to `fancy-regex` syntax on a best effort
//! basis.
//!
//! ECMA character classes are ASCII-only (`\d` is `[0-9]`, `\w` is
//! `[A-Za-z0-9_]`), while Rust regex classes default to Unicode, so the
//! shorthand classes are rewritten. Control escapes (`\cX`) are replaced
//! with the control character they denote. Look-arounds and backreferences
//! pass through untouched; `fancy-regex` supports them natively.
use std::borrow::Cow;

pub(crate) fn to_rust_regex(pattern: &str) -> Result<Cow<'_, str>, ()> {
    if !pattern
        .bytes()
        .any(|byte| matches!(byte, b'\\' | b'$' | b'^'))
    {
        return Ok(Cow::Borrowed(pattern));
    }
    let mut output = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    // A trailing backslash is a syntax error in both worlds.
                    return Err(());
                };
                match escaped {
                    'd' => output.push_str(if in_class { "0-9" } else { "[0-9]" }),
                    'D' => {
                        if in_class {
                            // `[^...]` cannot be expressed inside a class
                            // without lossy set arithmetic.
                            return Err(());
                        }
                        output.push_str("[^0-9]");
                    }
                    'w' => output.push_str(if in_class {
                        "A-Za-z0-9_"
                    } else {
                        "[A-Za-z0-9_]"
                    }),
                    'W' => {
                        if in_class {
                            return Err(());
                        }
                        output.push_str("[^A-Za-z0-9_]");
                    }
                    'c' => {
                        // `\cA` through `\cZ` (case-insensitive) denote
                        // control characters.
                        match chars.next() {
                            Some(letter) if letter.is_ascii_alphabetic() => {
                                output.push(((letter as u8) % 32) as char);
                            }
                            _ => return Err(()),
                        }
                    }
                    other => {
                        output.push('\\');
                        output.push(other);
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                output.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                output.push(ch);
            }
            // ECMA anchors match only at the very ends of the string.
            '^' if !in_class => output.push_str("\\A"),
            '$' if !in_class => output.push_str("\\z"),
            _ => output.push(ch),
        }
    }
    Ok(Cow::Owned(output))
}

/// Compile an ECMA 262 pattern with the translation applied.
pub(crate) fn compile(pattern: &str) -> Result<fancy_regex::Regex, ()> {
    let translated = to_rust_regex(pattern)?;
    fancy_regex::Regex::new(&translated).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::{compile, to_rust_regex};
    use test_case::test_case;

    #[test_case("abc", "abc"; "plain patterns are untouched")]
    #[test_case(r"\d+", "[0-9]+"; "d shorthand outside class")]
    #[test_case(r"[\d]", "[0-9]"; "d shorthand inside class")]
    #[test_case(r"[\w-]", "[A-Za-z0-9_-]"; "w shorthand inside class")]
    #[test_case(r"\W", "[^A-Za-z0-9_]"; "w shorthand negated outside class")]
    #[test_case("^a$", r"\Aa\z")]
    #[test_case(r"[^b]", "[^b]"; "negated classes are preserved")]
    #[test_case(r"\cC", "\u{3}")]
    #[test_case(r"\.", r"\."; "other escapes are preserved")]
    fn translation(pattern: &str, expected: &str) {
        assert_eq!(to_rust_regex(pattern).expect("translatable"), expected);
    }

    #[test]
    fn anchors_do_not_match_before_a_trailing_newline() {
        let regex = compile("^abc$").expect("compilable");
        assert!(regex.is_match("abc").unwrap_or(false));
        assert!(!regex.is_match("abc\n").unwrap_or(true));
    }

    #[test]
    fn lookarounds_pass_through() {
        let regex = compile(r"(?=a)a").expect("compilable");
        assert!(regex.is_match("a").unwrap_or(false));
    }

    #[test]
    fn trailing_backslash_is_rejected() {
        assert!(to_rust_regex("abc\\").is_err());
    }
}
