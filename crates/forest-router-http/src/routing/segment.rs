//! Path segment classification and path normalization.
//!
//! A route is split on `/` into segments, and each segment is one of four
//! kinds:
//!
//! | Kind       | Example            | Matches                                     |
//! |------------|--------------------|---------------------------------------------|
//! | `Literal`  | `users`            | exactly the same text                       |
//! | `Param`    | `:id`              | any non-empty token, bound to `id`          |
//! | `Wildcard` | `*`, `img*`        | the rest of the path, bound to `*`          |
//! | `Regex`    | `v(1\|2)`, `a-b`   | tokens matching the segment as a regex      |
//!
//! A trailing `*` makes a wildcard before any other rule applies; the text in
//! front of it is kept as a regex, so `v(1|2)*` matches `v2beta`. Otherwise a
//! segment is a regex if it contains any of `? ( + * -` or more than one `:`.
//! The regex rule wins over the param rule, so `:a:b` and `:id(\d+)` are
//! regex segments.

use percent_encoding::percent_decode_str;
use regex::Regex;

use forest_router_core::{RouterError, RouterResult};

/// Characters whose presence turns a segment into a regex.
const REGEX_CHARS: &[char] = &['?', '(', '+', '*', '-'];

/// Key under which a wildcard segment's capture is bound.
pub const WILDCARD_PARAM: &str = "*";

/// The kind of a route segment, derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Matched by exact string equality.
    Literal,
    /// `:name`, binds any non-empty token.
    Param,
    /// `*` or `prefix*`, consumes the remainder of the path.
    Wildcard,
    /// Matched as an anchored regular expression.
    Regex,
}

/// Classifies one route segment.
///
/// # Examples
///
/// ```
/// use forest_router_http::routing::segment::{classify, SegmentKind};
///
/// assert_eq!(classify("users"), SegmentKind::Literal);
/// assert_eq!(classify(":id"), SegmentKind::Param);
/// assert_eq!(classify("*"), SegmentKind::Wildcard);
/// assert_eq!(classify("files*"), SegmentKind::Wildcard);
/// assert_eq!(classify("v(1|2)"), SegmentKind::Regex);
/// assert_eq!(classify(":id:extra"), SegmentKind::Regex);
/// ```
pub fn classify(segment: &str) -> SegmentKind {
    if is_wildcard(segment) {
        SegmentKind::Wildcard
    } else if is_regex(segment) {
        SegmentKind::Regex
    } else if segment.starts_with(':') {
        SegmentKind::Param
    } else {
        SegmentKind::Literal
    }
}

fn is_wildcard(segment: &str) -> bool {
    segment.ends_with('*')
}

/// Returns `true` if the text contains a regex trigger character or more
/// than one `:`.
pub fn is_regex(path: &str) -> bool {
    path.contains(REGEX_CHARS) || path.matches(':').nth(1).is_some()
}

/// Returns `true` if a normalized route has no dynamic segment at all and
/// can be served by exact string lookup.
pub fn is_static_route(path: &str) -> bool {
    !is_regex(path) && !path.contains(':')
}

/// Removes exactly one leading and one trailing `/`, if present.
///
/// Internal repeated separators are left alone.
pub fn normalize(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Splits a normalized route into segments. The empty route has none.
pub fn split_normalized(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// Splits a raw request path for matching.
///
/// A single leading `/` is ignored and a single trailing empty segment (from
/// a trailing `/`) is dropped, so `"/"` and `""` both yield no segments.
pub fn split_lookup(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let mut parts: Vec<&str> = path.split('/').collect();
    if parts.last().is_some_and(|last| last.is_empty()) {
        parts.pop();
    }
    parts
}

/// Joins `segments[index..]` with `/`.
pub fn join_from(index: usize, segments: &[&str]) -> String {
    segments.get(index..).unwrap_or_default().join("/")
}

/// Rewrites wildcard stars as capture groups: `*` becomes `(.*)` and a
/// trailing `*` becomes `(.*)`. Other text is returned unchanged.
pub fn convert_wildcard(segment: &str) -> String {
    if segment == "*" {
        return "(.*)".to_string();
    }
    segment
        .strip_suffix('*')
        .map_or_else(|| segment.to_string(), |prefix| format!("{prefix}(.*)"))
}

/// Produces the value bound for a captured token.
pub fn bind_value(raw: &str, decode: bool) -> String {
    if decode {
        percent_decode_str(raw).decode_utf8_lossy().into_owned()
    } else {
        raw.to_string()
    }
}

/// How a pattern segment reports its captures.
#[derive(Debug, Clone)]
enum Capture {
    /// The trailing group is bound under [`WILDCARD_PARAM`], along with
    /// any named groups in the prefix.
    Wildcard,
    /// `:name(...)`: the whole token is bound under `name`.
    Named(String),
    /// Every named group that participated is bound under its own name.
    Groups,
}

/// A compiled wildcard or regex segment.
#[derive(Debug, Clone)]
pub struct SegmentPattern {
    source: String,
    regex: Regex,
    kind: SegmentKind,
    capture: Capture,
}

impl SegmentPattern {
    /// Compiles a wildcard or regex segment into an anchored matcher.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if the resulting regex does not
    /// compile.
    pub fn compile(segment: &str) -> RouterResult<Self> {
        let kind = classify(segment);
        let (body, capture) = match kind {
            SegmentKind::Wildcard => (convert_wildcard(segment), Capture::Wildcard),
            _ => match named_param_pattern(segment) {
                Some((name, pattern)) => (convert_wildcard(pattern), Capture::Named(name.to_string())),
                None => (convert_wildcard(segment), Capture::Groups),
            },
        };

        let regex = Regex::new(&format!("^(?:{body})$")).map_err(|source| {
            RouterError::InvalidPattern {
                segment: segment.to_string(),
                source,
            }
        })?;

        Ok(Self {
            source: segment.to_string(),
            regex,
            kind,
            capture,
        })
    }

    /// Returns the segment text this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if this pattern may consume the rest of a path.
    pub const fn is_wildcard(&self) -> bool {
        matches!(self.kind, SegmentKind::Wildcard)
    }

    /// Matches `text` as a whole and returns the bindings it produces, or
    /// `None` if it does not match.
    pub fn captures(&self, text: &str, decode: bool) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(text)?;
        let bindings = match &self.capture {
            Capture::Wildcard => {
                let mut bindings = self.named_groups(&caps, decode);
                // The `(.*)` appended for the star is always the last group.
                if let Some(m) = caps.get(caps.len() - 1) {
                    bindings.push((WILDCARD_PARAM.to_string(), bind_value(m.as_str(), decode)));
                }
                bindings
            }
            Capture::Named(name) => vec![(name.clone(), bind_value(text, decode))],
            Capture::Groups => self.named_groups(&caps, decode),
        };
        Some(bindings)
    }

    fn named_groups(&self, caps: &regex::Captures<'_>, decode: bool) -> Vec<(String, String)> {
        self.regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), bind_value(m.as_str(), decode)))
            })
            .collect()
    }
}

/// Splits `:name(pattern)` into its name and pattern.
fn named_param_pattern(segment: &str) -> Option<(&str, &str)> {
    let rest = segment.strip_prefix(':')?;
    let open = rest.find('(')?;
    let name = &rest[..open];
    let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some((name, &rest[open..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Classification ──────────────────────────────────────────────

    #[test]
    fn test_classify_literal() {
        assert_eq!(classify("users"), SegmentKind::Literal);
        assert_eq!(classify("a:b"), SegmentKind::Literal);
        assert_eq!(classify(""), SegmentKind::Literal);
    }

    #[test]
    fn test_classify_param() {
        assert_eq!(classify(":id"), SegmentKind::Param);
        assert_eq!(classify(":user_id"), SegmentKind::Param);
    }

    #[test]
    fn test_classify_wildcard() {
        assert_eq!(classify("*"), SegmentKind::Wildcard);
        assert_eq!(classify("files*"), SegmentKind::Wildcard);
        assert_eq!(classify("file.*"), SegmentKind::Wildcard);
        // The trailing star is checked before the regex characters.
        assert_eq!(classify("a-*"), SegmentKind::Wildcard);
        assert_eq!(classify("v(1|2)*"), SegmentKind::Wildcard);
    }

    #[test]
    fn test_classify_regex() {
        assert_eq!(classify("colou?r"), SegmentKind::Regex);
        assert_eq!(classify("v(1|2)"), SegmentKind::Regex);
        assert_eq!(classify("a+"), SegmentKind::Regex);
        assert_eq!(classify("my-page"), SegmentKind::Regex);
        assert_eq!(classify("a*b"), SegmentKind::Regex);
    }

    #[test]
    fn test_classify_multiple_colons_is_regex() {
        assert_eq!(classify(":id:extra"), SegmentKind::Regex);
        assert_eq!(classify(":id(\\d+)"), SegmentKind::Regex);
    }

    #[test]
    fn test_is_static_route() {
        assert!(is_static_route("users/list"));
        assert!(is_static_route(""));
        assert!(!is_static_route("users/:id"));
        assert!(!is_static_route("files/*"));
        assert!(!is_static_route("my-page"));
    }

    // ── Normalization ───────────────────────────────────────────────

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/users/"), "users");
        assert_eq!(normalize("/users"), "users");
        assert_eq!(normalize("users"), "users");
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("//a//"), "/a/");
    }

    #[test]
    fn test_split_normalized() {
        assert!(split_normalized("").is_empty());
        assert_eq!(split_normalized("a/b"), vec!["a", "b"]);
        assert_eq!(split_normalized("a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_lookup() {
        assert!(split_lookup("/").is_empty());
        assert!(split_lookup("").is_empty());
        assert_eq!(split_lookup("/users/42"), vec!["users", "42"]);
        assert_eq!(split_lookup("/users/"), vec!["users"]);
        assert_eq!(split_lookup("users"), vec!["users"]);
        assert_eq!(split_lookup("/users//"), vec!["users", ""]);
    }

    #[test]
    fn test_join_from() {
        let segments = ["a", "b", "c"];
        assert_eq!(join_from(0, &segments), "a/b/c");
        assert_eq!(join_from(2, &segments), "c");
        assert_eq!(join_from(3, &segments), "");
        assert_eq!(join_from(9, &segments), "");
    }

    #[test]
    fn test_convert_wildcard() {
        assert_eq!(convert_wildcard("*"), "(.*)");
        assert_eq!(convert_wildcard("files*"), "files(.*)");
        assert_eq!(convert_wildcard("files"), "files");
    }

    #[test]
    fn test_bind_value_decoding() {
        assert_eq!(bind_value("a%20b", false), "a%20b");
        assert_eq!(bind_value("a%20b", true), "a b");
        assert_eq!(bind_value("caf%C3%A9", true), "café");
    }

    // ── Patterns ────────────────────────────────────────────────────

    #[test]
    fn test_wildcard_pattern_captures_remainder() {
        let p = SegmentPattern::compile("files*").unwrap();
        assert!(p.is_wildcard());
        let caps = p.captures("filesxyz", false).unwrap();
        assert_eq!(caps, vec![("*".to_string(), "xyz".to_string())]);
        assert!(p.captures("other", false).is_none());
    }

    #[test]
    fn test_wildcard_prefix_keeps_regex_meaning() {
        let p = SegmentPattern::compile("file.*").unwrap();
        assert_eq!(
            p.captures("fileXtxt", false),
            Some(vec![("*".to_string(), "txt".to_string())])
        );
        assert!(p.captures("file.txt", false).is_some());
        assert!(p.captures("fil", false).is_none());

        let p = SegmentPattern::compile("v(1|2)*").unwrap();
        assert!(p.is_wildcard());
        assert_eq!(
            p.captures("v2beta", false),
            Some(vec![("*".to_string(), "beta".to_string())])
        );
        assert!(p.captures("v3beta", false).is_none());
    }

    #[test]
    fn test_wildcard_with_dash_prefix() {
        let p = SegmentPattern::compile("a-*").unwrap();
        assert!(p.is_wildcard());
        assert_eq!(
            p.captures("a-b/c", false),
            Some(vec![("*".to_string(), "b/c".to_string())])
        );
        assert!(p.captures("ab", false).is_none());
    }

    #[test]
    fn test_wildcard_prefix_named_groups_bind() {
        let p = SegmentPattern::compile("(?P<lang>[a-z]{2})-*").unwrap();
        let caps = p.captures("en-docs/intro", false).unwrap();
        assert!(caps.contains(&("lang".to_string(), "en".to_string())));
        assert!(caps.contains(&("*".to_string(), "docs/intro".to_string())));
    }

    #[test]
    fn test_regex_pattern_is_anchored() {
        let p = SegmentPattern::compile("colou?r").unwrap();
        assert!(!p.is_wildcard());
        assert_eq!(p.captures("color", false), Some(Vec::new()));
        assert!(p.captures("colour", false).is_some());
        assert!(p.captures("colors", false).is_none());
    }

    #[test]
    fn test_regex_named_groups_bind() {
        let p = SegmentPattern::compile("(?P<year>[0-9]{4})-(?P<month>[0-9]{2})").unwrap();
        let caps = p.captures("2024-06", false).unwrap();
        assert!(caps.contains(&("year".to_string(), "2024".to_string())));
        assert!(caps.contains(&("month".to_string(), "06".to_string())));
    }

    #[test]
    fn test_named_param_pattern_binds_token() {
        let p = SegmentPattern::compile(r":id(\d+)").unwrap();
        assert_eq!(
            p.captures("42", false),
            Some(vec![("id".to_string(), "42".to_string())])
        );
        assert!(p.captures("abc", false).is_none());
    }

    #[test]
    fn test_double_colon_matches_literally() {
        let p = SegmentPattern::compile(":id:extra").unwrap();
        assert!(p.captures(":id:extra", false).is_some());
        assert!(p.captures("42", false).is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = SegmentPattern::compile("a(b").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { ref segment, .. } if segment == "a(b"));
    }
}
