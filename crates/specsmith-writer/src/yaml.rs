//! Line-oriented YAML emitter used by the serializer.
//!
//! Only the handful of constructs the OpenAPI output needs: mapping keys,
//! scalars (single-quoted, literal block or bare) and block sequences.

use std::borrow::Cow;

/// Spaces per nesting level.
pub const INDENT: usize = 2;

/// Accumulates YAML text.
#[derive(Debug, Default)]
pub struct YamlWriter {
    out: String,
    /// Set by [`YamlWriter::item`]; the next line starts a sequence entry.
    pending_dash: bool,
}

impl YamlWriter {
    pub fn finish(self) -> String {
        self.out
    }

    /// Write one line at `indent`.
    fn line(&mut self, indent: usize, text: &str) {
        if self.pending_dash {
            self.pending_dash = false;
            self.pad(indent.saturating_sub(INDENT));
            self.out.push_str("- ");
        } else {
            self.pad(indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn pad(&mut self, width: usize) {
        self.out.extend(std::iter::repeat_n(' ', width));
    }

    /// Start a sequence entry whose mapping fields sit at `indent + INDENT`.
    pub fn item(&mut self) {
        self.pending_dash = true;
    }

    /// `key:` opening a nested block.
    pub fn open(&mut self, indent: usize, key: &str) {
        self.line(indent, &format!("{}:", mapping_key(key)));
    }

    /// `'key':` for keys that are quoted regardless of content
    /// (path templates, status codes).
    pub fn open_quoted(&mut self, indent: usize, key: &str) {
        self.line(indent, &format!("{}:", single_quoted(key)));
    }

    /// `key: value` with `value` written verbatim.
    pub fn bare(&mut self, indent: usize, key: &str, value: &str) {
        self.line(indent, &format!("{}: {}", mapping_key(key), value));
    }

    /// `key: value` with `value` quoted as a string scalar.
    pub fn string(&mut self, indent: usize, key: &str, value: &str) {
        let key = mapping_key(key);
        match block_scalar(value) {
            Some((header, lines)) => {
                self.line(indent, &format!("{key}: {header}"));
                for text in lines {
                    if text.is_empty() {
                        self.out.push('\n');
                    } else {
                        self.line(indent + INDENT, text);
                    }
                }
            }
            None => self.line(indent, &format!("{key}: {}", inline_string(value))),
        }
    }

    /// `key: value`, skipped when `value` is empty.
    pub fn string_if_present(&mut self, indent: usize, key: &str, value: &str) {
        if !value.is_empty() {
            self.string(indent, key, value);
        }
    }

    /// `key: true`, skipped when `flag` is false.
    pub fn flag(&mut self, indent: usize, key: &str, flag: bool) {
        if flag {
            self.bare(indent, key, "true");
        }
    }

    /// `- value` with `value` written verbatim.
    pub fn bare_item(&mut self, indent: usize, value: &str) {
        self.line(indent, &format!("- {value}"));
    }
}

/// Quote a single-line string: `'...'` with inner quotes doubled.
pub fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote a string that cannot go in a block scalar.
fn inline_string(value: &str) -> String {
    if value.chars().any(|c| c.is_control() && c != '\t') {
        // JSON string syntax is valid YAML double-quoted syntax.
        serde_json::Value::String(value.to_string()).to_string()
    } else {
        single_quoted(value)
    }
}

/// Literal block form of a multi-line string: header (`|`, `|-` or `|+`)
/// and the content lines. `None` when the value must stay inline.
fn block_scalar(value: &str) -> Option<(&'static str, Vec<&str>)> {
    if !value.contains('\n') {
        return None;
    }

    let content = value.trim_end_matches('\n');
    let trailing = value.len() - content.len();
    if content.is_empty()
        || content.starts_with([' ', '\t'])
        || content.chars().any(|c| c.is_control() && c != '\n' && c != '\t')
    {
        return None;
    }

    let header = match trailing {
        0 => "|-",
        1 => "|",
        _ => "|+",
    };
    let mut lines: Vec<&str> = content.split('\n').collect();
    lines.extend(std::iter::repeat_n("", trailing.saturating_sub(1)));
    Some((header, lines))
}

/// Render a mapping key, quoting it unless it is a plain identifier.
pub fn mapping_key(key: &str) -> Cow<'_, str> {
    let plain = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '$' | '/' | '+'))
        && !is_reserved_word(key);

    if plain {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(single_quoted(key))
    }
}

fn is_reserved_word(word: &str) -> bool {
    matches!(
        word.to_lowercase().as_str(),
        "true" | "false" | "null" | "yes" | "no" | "on" | "off" | "y" | "n"
    )
}

/// Format a number without a trailing `.0` for whole values.
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
