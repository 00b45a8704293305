//! Heuristic source-line lookup for diagnostics.
//!
//! Walks the raw text top to bottom, matching one path segment at a time
//! against mapping keys. A segment matches a line when the line's key equals
//! it and the line is indented at least as deep as the previous match. This
//! is not a YAML position tracker: documents that repeat a key at the same
//! depth can resolve to the wrong occurrence.

use serde_json::Value;

/// 1-based line of the node at `segments`, or `None` unless every segment
/// matched. Sequence indices are skipped.
pub fn locate_line(text: &str, segments: &[String]) -> Option<usize> {
    let root: Option<Value> = serde_yaml::from_str(text).ok();
    locate_in(text, root.as_ref(), segments)
}

/// [`locate_line`] against an already parsed document.
///
/// `root` decides which segments are sequence indices: a numeric segment
/// under a mapping (a status code, say) is matched as a key. Without a
/// document every segment is matched as a key.
pub fn locate_in(text: &str, root: Option<&Value>, segments: &[String]) -> Option<usize> {
    let wanted = mapping_keys(root, segments);
    if wanted.is_empty() {
        return None;
    }

    let mut next = 0;
    let mut min_indent = 0;
    for (number, line) in text.lines().enumerate() {
        let Some((indent, key)) = line_key(line) else {
            continue;
        };
        if indent < min_indent || key != wanted[next] {
            continue;
        }
        min_indent = indent;
        next += 1;
        if next == wanted.len() {
            return Some(number + 1);
        }
    }
    None
}

/// The segments that name mapping keys, in order.
fn mapping_keys<'a>(root: Option<&Value>, segments: &'a [String]) -> Vec<&'a str> {
    let mut node = root;
    let mut keys = Vec::with_capacity(segments.len());
    for segment in segments {
        match node {
            Some(Value::Array(items)) => {
                node = segment.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            Some(value) => {
                node = value.get(segment.as_str());
                keys.push(segment.as_str());
            }
            None => keys.push(segment.as_str()),
        }
    }
    keys
}

/// Indentation and unquoted key of a `key: ...` line. Sequence dashes count
/// as indentation.
fn line_key(line: &str) -> Option<(usize, String)> {
    let mut rest = line.trim_start_matches(' ');
    let mut indent = line.len() - rest.len();
    while let Some(item) = rest.strip_prefix("- ") {
        let trimmed = item.trim_start_matches(' ');
        indent += rest.len() - trimmed.len();
        rest = trimmed;
    }
    if rest.is_empty() || rest.starts_with('#') {
        return None;
    }

    let key = match rest.chars().next() {
        Some('\'') => {
            let (key, tail) = single_quoted_key(&rest[1..])?;
            tail.starts_with(':').then_some(key)?
        }
        Some('"') => {
            let end = rest[1..].find('"')?;
            let tail = &rest[end + 2..];
            tail.starts_with(':').then(|| rest[1..end + 1].to_string())?
        }
        _ => {
            let end = rest
                .find(": ")
                .or_else(|| rest.ends_with(':').then(|| rest.len() - 1))?;
            rest[..end].trim_end().to_string()
        }
    };
    Some((indent, key))
}

/// Parse `key'...` (after the opening quote) with `''` escapes; returns the
/// key and the text after the closing quote.
fn single_quoted_key(body: &str) -> Option<(String, &str)> {
    let mut key = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            key.push(c);
            continue;
        }
        if chars.peek().is_some_and(|(_, next)| *next == '\'') {
            chars.next();
            key.push('\'');
            continue;
        }
        return Some((key, &body[i + 1..]));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"openapi: 3.0.0
info:
  title: Test
  version: 1.0.0
paths:
  /users:
    get:
      responses:
        '200':
          description: ok
  "/items/{id}":
    get:
      parameters:
        - name: id
          in: path
      responses: {}
components:
  schemas:
    User:
      type: object
"#;

    fn segs(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn locates_nested_keys() {
        assert_eq!(locate_line(SPEC, &segs(&["openapi"])), Some(1));
        assert_eq!(locate_line(SPEC, &segs(&["info", "version"])), Some(4));
        assert_eq!(locate_line(SPEC, &segs(&["paths", "/users", "get", "responses", "200"])), Some(9));
        assert_eq!(locate_line(SPEC, &segs(&["components", "schemas", "User", "type"])), Some(20));
    }

    #[test]
    fn quoted_keys_match_unquoted_segments() {
        assert_eq!(
            locate_line(SPEC, &segs(&["paths", "/items/{id}", "get", "responses"])),
            Some(16)
        );
    }

    #[test]
    fn sequence_indices_are_skipped() {
        assert_eq!(
            locate_line(SPEC, &segs(&["paths", "/items/{id}", "get", "parameters", "0", "in"])),
            Some(15)
        );
    }

    #[test]
    fn numeric_keys_are_not_indices() {
        let text = "paths:\n  /a:\n    get:\n      responses:\n        200:\n          description: ok\n        '404':\n          content: {}\n";
        assert_eq!(
            locate_line(text, &segs(&["paths", "/a", "get", "responses", "200"])),
            Some(5)
        );
        assert_eq!(
            locate_line(text, &segs(&["paths", "/a", "get", "responses", "404", "content"])),
            Some(8)
        );
    }

    #[test]
    fn without_a_document_segments_are_keys() {
        assert_eq!(
            locate_in(SPEC, None, &segs(&["paths", "/users", "get", "responses", "200"])),
            Some(9)
        );
        assert_eq!(
            locate_in(SPEC, None, &segs(&["paths", "/items/{id}", "get", "parameters", "0"])),
            None
        );
    }

    #[test]
    fn partial_match_is_unknown() {
        assert_eq!(locate_line(SPEC, &segs(&["info", "contact"])), None);
        assert_eq!(locate_line(SPEC, &segs(&["servers"])), None);
        assert_eq!(locate_line(SPEC, &[]), None);
    }

    #[test]
    fn line_keys() {
        assert_eq!(line_key("  title: Test"), Some((2, "title".to_string())));
        assert_eq!(line_key("  - name: id"), Some((4, "name".to_string())));
        assert_eq!(line_key("  'It''s': x"), Some((2, "It's".to_string())));
        assert_eq!(line_key("    - plain item"), None);
        assert_eq!(line_key("# comment: here"), None);
        assert_eq!(line_key("paths:"), Some((0, "paths".to_string())));
    }
}
