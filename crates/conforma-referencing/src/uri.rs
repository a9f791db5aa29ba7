//! A small URI-reference model tailored to JSON Schema identifiers.
//!
//! Schema identifiers come in four practical shapes: URNs, absolute URLs,
//! relative paths, and bare fragments. Resolution against a base follows the
//! RFC 3986 precedence rules for those shapes.
use std::fmt;

/// A parsed URI reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Uri {
    /// `urn:<nid>:<nss>[#fragment]`
    Urn {
        /// `urn:<nid>`, e.g. `urn:uuid`.
        origin: String,
        /// The namespace-specific string.
        nss: String,
        fragment: Option<String>,
    },
    /// `scheme://authority/path[#fragment]`
    Url {
        /// `scheme://authority` (or `scheme:` for rare authority-less URLs).
        origin: String,
        path: String,
        fragment: Option<String>,
    },
    /// A relative reference with or without a leading slash.
    Path { path: String, fragment: Option<String> },
    /// A bare `#fragment` reference.
    Fragment { fragment: String },
}

impl Uri {
    /// Parse a URI reference.
    ///
    /// Recognises `scheme:rest` (URL, or URN when the scheme is `urn`),
    /// `/path[#frag]`, `path[#frag]` and `#frag`.
    pub fn parse(input: &str) -> Uri {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (input, None),
        };
        if rest.is_empty() {
            return Uri::Fragment {
                fragment: fragment.unwrap_or_default(),
            };
        }
        if let Some(scheme) = scheme_of(rest) {
            let tail = &rest[scheme.len() + 1..];
            if scheme.eq_ignore_ascii_case("urn") {
                let (nid, nss) = tail.split_once(':').unwrap_or((tail, ""));
                return Uri::Urn {
                    origin: format!("urn:{nid}"),
                    nss: nss.to_string(),
                    fragment,
                };
            }
            if let Some(tail) = tail.strip_prefix("//") {
                let (authority, path) = match tail.find('/') {
                    Some(idx) => (&tail[..idx], &tail[idx..]),
                    None => (tail, ""),
                };
                return Uri::Url {
                    origin: format!("{scheme}://{authority}"),
                    path: path.to_string(),
                    fragment,
                };
            }
            // Authority-less URL, e.g. `mailto:user@example.com`.
            return Uri::Url {
                origin: format!("{scheme}:"),
                path: tail.to_string(),
                fragment,
            };
        }
        Uri::Path {
            path: rest.to_string(),
            fragment,
        }
    }

    /// The fragment, if any.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Uri::Urn { fragment, .. } | Uri::Url { fragment, .. } | Uri::Path { fragment, .. } => {
                fragment.as_deref()
            }
            Uri::Fragment { fragment } => Some(fragment),
        }
    }

    /// A copy of this URI without its fragment.
    #[must_use]
    pub fn base(&self) -> Uri {
        match self {
            Uri::Urn { origin, nss, .. } => Uri::Urn {
                origin: origin.clone(),
                nss: nss.clone(),
                fragment: None,
            },
            Uri::Url { origin, path, .. } => Uri::Url {
                origin: origin.clone(),
                path: path.clone(),
                fragment: None,
            },
            Uri::Path { path, .. } => Uri::Path {
                path: path.clone(),
                fragment: None,
            },
            Uri::Fragment { .. } => Uri::Fragment {
                fragment: String::new(),
            },
        }
    }

    /// A copy of this URI with the fragment replaced.
    #[must_use]
    pub fn with_fragment(&self, fragment: impl Into<String>) -> Uri {
        let fragment = fragment.into();
        match self.base() {
            Uri::Urn { origin, nss, .. } => Uri::Urn {
                origin,
                nss,
                fragment: Some(fragment),
            },
            Uri::Url { origin, path, .. } => Uri::Url {
                origin,
                path,
                fragment: Some(fragment),
            },
            Uri::Path { path, .. } => Uri::Path {
                path,
                fragment: Some(fragment),
            },
            Uri::Fragment { .. } => Uri::Fragment { fragment },
        }
    }

    /// Whether this reference carries its own origin.
    pub fn is_absolute(&self) -> bool {
        matches!(self, Uri::Urn { .. } | Uri::Url { .. })
    }

    /// Resolve `child` against `parent`.
    ///
    /// Fragment-only children inherit everything but the fragment; relative
    /// paths replace the last segment of the parent path; rooted paths keep
    /// only the parent origin; absolute URLs and URNs discard the parent.
    #[must_use]
    pub fn inherit(parent: &Uri, child: Uri) -> Uri {
        match child {
            Uri::Urn { .. } | Uri::Url { .. } => child,
            Uri::Fragment { fragment } => parent.with_fragment(fragment),
            Uri::Path { path, fragment } => {
                let merged = if path.starts_with('/') {
                    normalize_path(&path)
                } else {
                    let parent_path = match parent {
                        Uri::Url { path, .. } | Uri::Path { path, .. } => path.as_str(),
                        Uri::Urn { .. } | Uri::Fragment { .. } => "",
                    };
                    let prefix = match parent_path.rfind('/') {
                        Some(idx) => &parent_path[..=idx],
                        None => "",
                    };
                    normalize_path(&format!("{prefix}{path}"))
                };
                match parent {
                    Uri::Url { origin, .. } => {
                        // A URL with an authority always has a rooted path.
                        let path = if origin.ends_with("//") || origin.contains("://") {
                            rooted(merged)
                        } else {
                            merged
                        };
                        Uri::Url {
                            origin: origin.clone(),
                            path,
                            fragment,
                        }
                    }
                    Uri::Urn { origin, .. } => {
                        // A relative path against a URN replaces the nss tail.
                        Uri::Urn {
                            origin: origin.clone(),
                            nss: merged.trim_start_matches('/').to_string(),
                            fragment,
                        }
                    }
                    Uri::Path { .. } | Uri::Fragment { .. } => Uri::Path {
                        path: merged,
                        fragment,
                    },
                }
            }
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uri::Urn {
                origin,
                nss,
                fragment,
            } => {
                write!(f, "{origin}:{nss}")?;
                write_fragment(f, fragment.as_deref())
            }
            Uri::Url {
                origin,
                path,
                fragment,
            } => {
                write!(f, "{origin}{path}")?;
                write_fragment(f, fragment.as_deref())
            }
            Uri::Path { path, fragment } => {
                f.write_str(path)?;
                write_fragment(f, fragment.as_deref())
            }
            Uri::Fragment { fragment } => write!(f, "#{fragment}"),
        }
    }
}

fn write_fragment(f: &mut fmt::Formatter<'_>, fragment: Option<&str>) -> fmt::Result {
    match fragment {
        Some(fragment) => write!(f, "#{fragment}"),
        None => Ok(()),
    }
}

fn scheme_of(input: &str) -> Option<&str> {
    let colon = input.find(':')?;
    let candidate = &input[..colon];
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.')) {
        Some(candidate)
    } else {
        None
    }
}

fn rooted(path: String) -> String {
    if path.starts_with('/') || path.is_empty() {
        path
    } else {
        format!("/{path}")
    }
}

/// Remove `.` and `..` segments, RFC 3986 section 5.2.4.
fn normalize_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let trailing_slash = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    let mut output: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                output.pop();
            }
            other => output.push(other),
        }
    }
    let mut merged = String::with_capacity(path.len());
    if rooted {
        merged.push('/');
    }
    merged.push_str(&output.join("/"));
    if trailing_slash && !merged.ends_with('/') {
        merged.push('/');
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::Uri;
    use test_case::test_case;

    #[test_case("http://example.com/schema.json", "http://example.com", "/schema.json")]
    #[test_case("https://example.com/a/b/", "https://example.com", "/a/b/")]
    #[test_case("http://example.com", "http://example.com", "")]
    fn parses_urls(input: &str, origin: &str, path: &str) {
        match Uri::parse(input) {
            Uri::Url {
                origin: o, path: p, ..
            } => {
                assert_eq!(o, origin);
                assert_eq!(p, path);
            }
            other => panic!("expected a URL, got {other:?}"),
        }
    }

    #[test]
    fn parses_urns() {
        let uri = Uri::parse("urn:uuid:deadbeef-1234-0000-0000-4321feebdaed#frag");
        assert_eq!(
            uri,
            Uri::Urn {
                origin: "urn:uuid".into(),
                nss: "deadbeef-1234-0000-0000-4321feebdaed".into(),
                fragment: Some("frag".into()),
            }
        );
    }

    #[test_case("#/definitions/a", "/definitions/a")]
    #[test_case("#", "")]
    fn parses_fragments(input: &str, fragment: &str) {
        assert_eq!(
            Uri::parse(input),
            Uri::Fragment {
                fragment: fragment.into()
            }
        );
    }

    #[test_case(
        "http://example.com/a/b/c.json",
        "d.json",
        "http://example.com/a/b/d.json"
    )]
    #[test_case("http://example.com/a/b/c.json", "/d.json", "http://example.com/d.json")]
    #[test_case("http://example.com/a/b/", "../other.json", "http://example.com/a/other.json")]
    #[test_case("http://example.com/a/b/c.json", "#frag", "http://example.com/a/b/c.json#frag")]
    #[test_case("http://example.com/a", "urn:uuid:beef", "urn:uuid:beef")]
    #[test_case("http://example.com/a", "https://other.org/x", "https://other.org/x")]
    #[test_case("http://example.com/a/b/", "folder/", "http://example.com/a/b/folder/")]
    #[test_case("http://example.com", "x.json", "http://example.com/x.json"; "authority only base")]
    fn inherits(parent: &str, child: &str, expected: &str) {
        let resolved = Uri::inherit(&Uri::parse(parent), Uri::parse(child));
        assert_eq!(resolved.to_string(), expected);
    }

    #[test]
    fn base_strips_the_fragment() {
        let uri = Uri::parse("http://example.com/s.json#/a/b");
        assert_eq!(uri.base().to_string(), "http://example.com/s.json");
        assert_eq!(uri.fragment(), Some("/a/b"));
    }
}
