use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Dotted location, e.g. `paths./items/{id}.get.responses`. Empty for
    /// document-level problems.
    pub path: String,
    /// The unjoined location; keys may themselves contain dots.
    #[serde(skip)]
    pub segments: Vec<String>,
    pub message: String,
    pub severity: Severity,
    /// 1-based line in the source text, when it could be located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn error<S: Into<String>>(segments: Vec<S>, message: impl Into<String>) -> Self {
        Self::new(segments, message, Severity::Error)
    }

    pub fn warning<S: Into<String>>(segments: Vec<S>, message: impl Into<String>) -> Self {
        Self::new(segments, message, Severity::Warning)
    }

    /// An error about the document as a whole (empty path).
    pub fn document_error(message: impl Into<String>) -> Self {
        Self::new(Vec::<String>::new(), message, Severity::Error)
    }

    fn new<S: Into<String>>(segments: Vec<S>, message: impl Into<String>, severity: Severity) -> Self {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        Self {
            path: segments.join("."),
            segments,
            message: message.into(),
            severity,
            line: None,
        }
    }

    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_dotted_join() {
        let d = Diagnostic::error(vec!["paths", "/a.b", "get"], "boom");
        assert_eq!(d.path, "paths./a.b.get");
        assert_eq!(d.segments.len(), 3);
        assert_eq!(d.severity, Severity::Error);
    }

    #[test]
    fn serializes_without_segments_or_missing_line() {
        let d = Diagnostic::warning(vec!["info"], "note");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"path": "info", "message": "note", "severity": "warning"})
        );
        let json = serde_json::to_value(d.at_line(Some(3))).unwrap();
        assert_eq!(json["line"], 3);
    }
}
