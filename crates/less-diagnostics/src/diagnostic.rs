//! Diagnostic types.

use crate::highlight::Highlight;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// The diagnostic type tag for less compile errors.
pub const LESS_KIND: &str = "less";

/// A compile problem reported to the build host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// The severity level.
    pub level: Level,
    /// The compiler type that produced this diagnostic.
    #[serde(rename = "type")]
    pub kind: String,
    /// The source language.
    pub language: String,
    /// Human summary, e.g. `less: src/app.less, line: 4`.
    pub header: String,
    /// Stringified compiler status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Absolute path of the failing file.
    pub abs_file_path: Option<Utf8PathBuf>,
    /// Path relative to the project root.
    pub rel_file_path: Option<String>,
    /// The raw compiler message.
    pub message_text: String,
    /// Context lines: previous, error, next. Only those that exist.
    pub lines: Vec<SourceLine>,
}

impl Diagnostic {
    /// Creates an error diagnostic with no file information.
    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            kind: kind.to_string(),
            language: kind.to_string(),
            header: format!("{kind} error"),
            code: None,
            abs_file_path: None,
            rel_file_path: None,
            message_text: message.into(),
            lines: Vec::new(),
        }
    }

    /// Returns the line carrying the highlight, if any.
    pub fn error_line(&self) -> Option<&SourceLine> {
        self.lines.iter().find(|line| line.is_error_line())
    }
}

/// The severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Log,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Returns the level as a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Log => "Log",
            Level::Info => "Info",
            Level::Warn => "Warning",
            Level::Error => "Error",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of source context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLine {
    /// 0-based line index.
    pub line_index: u32,
    /// 1-based line number.
    pub line_number: u32,
    /// Raw line content.
    pub text: Option<String>,
    /// Character offset where the highlight begins, `-1` for context lines.
    pub error_char_start: i32,
    /// Number of highlighted characters, `-1` for context lines.
    pub error_length: i32,
}

impl SourceLine {
    /// Creates a context line without a highlight.
    pub fn context(line_number: u32, text: Option<String>) -> Self {
        Self {
            line_index: line_number.saturating_sub(1),
            line_number,
            text,
            error_char_start: -1,
            error_length: -1,
        }
    }

    /// Creates the error line with its highlight.
    pub fn highlighted(line_number: u32, text: Option<String>, highlight: Highlight) -> Self {
        Self {
            line_index: line_number.saturating_sub(1),
            line_number,
            text,
            error_char_start: clamp_i32(highlight.start),
            error_length: clamp_i32(highlight.len),
        }
    }

    /// Returns true if this line carries the error highlight.
    pub fn is_error_line(&self) -> bool {
        self.error_char_start >= 0 && self.error_length >= 0
    }

    /// Returns the highlight of the error line.
    pub fn highlight(&self) -> Option<Highlight> {
        if !self.is_error_line() {
            return None;
        }
        Some(Highlight {
            start: self.error_char_start as usize,
            len: self.error_length as usize,
        })
    }
}

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// What the diagnostic builder needs from the build host.
pub trait DiagnosticContext {
    /// The absolute project root.
    fn root_dir(&self) -> &Utf8Path;

    /// Reads a source file in full.
    fn read_file_sync(&self, path: &Utf8Path) -> std::io::Result<String>;

    /// Appends a diagnostic to the build-wide sink.
    fn push_diagnostic(&self, diagnostic: Diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_defaults() {
        let diagnostic = Diagnostic::error(LESS_KIND, "boom");
        assert_eq!(diagnostic.level, Level::Error);
        assert_eq!(diagnostic.header, "less error");
        assert_eq!(diagnostic.language, "less");
        assert!(diagnostic.lines.is_empty());
        assert!(diagnostic.error_line().is_none());
    }

    #[test]
    fn test_context_line_has_no_highlight() {
        let line = SourceLine::context(4, Some("a {".into()));
        assert_eq!(line.line_index, 3);
        assert_eq!(line.error_char_start, -1);
        assert_eq!(line.error_length, -1);
        assert!(line.highlight().is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let mut diagnostic = Diagnostic::error(LESS_KIND, "boom");
        diagnostic.code = Some("2".into());
        diagnostic.lines.push(SourceLine::highlighted(
            1,
            Some("x".into()),
            Highlight { start: 0, len: 1 },
        ));
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["type"], "less");
        assert_eq!(json["messageText"], "boom");
        assert_eq!(json["code"], "2");
        assert_eq!(json["absFilePath"], serde_json::Value::Null);
        assert_eq!(json["lines"][0]["lineNumber"], 1);
        assert_eq!(json["lines"][0]["errorCharStart"], 0);
        assert_eq!(json["lines"][0]["errorLength"], 1);
    }
}
