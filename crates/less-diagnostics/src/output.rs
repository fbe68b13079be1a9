//! Output formatting.

use crate::diagnostic::{Diagnostic, SourceLine};
use serde::Deserialize;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Human-readable with the source context lines
    HumanVerbose,
    /// JSON output
    Json,
    /// Machine-readable (one line per diagnostic)
    Machine,
}

/// Formats diagnostics for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a collection of diagnostics.
    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(diagnostics),
            OutputFormat::HumanVerbose => self.format_human_verbose(diagnostics),
            OutputFormat::Json => self.format_json(diagnostics),
            OutputFormat::Machine => self.format_machine(diagnostics),
        }
    }

    fn format_human(&self, diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();

        for diag in diagnostics {
            output.push_str(&format!(
                "{}\n{}: {}{}\n\n",
                location(diag),
                diag.level,
                diag.message_text,
                code_suffix(diag)
            ));
        }

        output
    }

    fn format_human_verbose(&self, diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();

        for diag in diagnostics {
            output.push_str(&format!(
                "{}\n{}: {}{}\n",
                diag.header,
                diag.level,
                diag.message_text,
                code_suffix(diag)
            ));

            let width = diag
                .lines
                .iter()
                .map(|line| line.line_number.to_string().len())
                .max()
                .unwrap_or(1);

            for line in &diag.lines {
                let text = line.text.as_deref().unwrap_or("");
                output.push_str(&format!("  {:>width$} | {}\n", line.line_number, text));
                if let Some(marker) = underline(line) {
                    output.push_str(&format!("  {:width$} | {}\n", "", marker));
                }
            }

            output.push('\n');
        }

        output
    }

    fn format_json(&self, diagnostics: &[Diagnostic]) -> String {
        serde_json::to_string_pretty(diagnostics).unwrap_or_default()
    }

    fn format_machine(&self, diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();

        for diag in diagnostics {
            output.push_str(&format!(
                "{} {} {}{}\n",
                diag.level.as_str().to_uppercase(),
                location(diag),
                diag.message_text.replace(['\r', '\n'], " "),
                code_suffix(diag)
            ));
        }

        output
    }
}

/// `path:line:column` when the error line is known, the header otherwise.
fn location(diag: &Diagnostic) -> String {
    match (&diag.rel_file_path, diag.error_line()) {
        (Some(path), Some(line)) => format!(
            "{}:{}:{}",
            path,
            line.line_number,
            line.error_char_start + 1
        ),
        _ => diag.header.clone(),
    }
}

fn code_suffix(diag: &Diagnostic) -> String {
    diag.code
        .as_ref()
        .map(|code| format!(" ({code})"))
        .unwrap_or_default()
}

/// Builds the `^~~` marker under a highlighted line. Tabs before the
/// highlight are kept so the marker lines up.
fn underline(line: &SourceLine) -> Option<String> {
    let highlight = line.highlight()?;
    let text = line.text.as_deref().unwrap_or("");
    let padding: String = text
        .chars()
        .chain(std::iter::repeat(' '))
        .take(highlight.start)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let tail = "~".repeat(highlight.len.saturating_sub(1));
    Some(format!("{padding}^{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Highlight;
    use crate::LESS_KIND;
    use pretty_assertions::assert_eq;

    fn located() -> Diagnostic {
        let mut diag = Diagnostic::error(LESS_KIND, "Unrecognised input");
        diag.header = "less: a.less, line: 2".into();
        diag.rel_file_path = Some("a.less".into());
        diag.lines = vec![
            SourceLine::context(1, Some("a {".into())),
            SourceLine::highlighted(2, Some("\tb: c".into()), Highlight { start: 1, len: 1 }),
        ];
        diag
    }

    #[test]
    fn test_format_human() {
        let output = Formatter::new(OutputFormat::Human).format(&[located()]);
        assert_eq!(output, "a.less:2:2\nError: Unrecognised input\n\n");
    }

    #[test]
    fn test_format_human_without_location() {
        let mut diag = Diagnostic::error(LESS_KIND, "boom");
        diag.code = Some("1".into());
        let output = Formatter::new(OutputFormat::Human).format(&[diag]);
        assert_eq!(output, "less error\nError: boom (1)\n\n");
    }

    #[test]
    fn test_format_verbose_keeps_tabs() {
        let output = Formatter::new(OutputFormat::HumanVerbose).format(&[located()]);
        assert_eq!(
            output,
            "less: a.less, line: 2\nError: Unrecognised input\n  1 | a {\n  2 | \tb: c\n    | \t^\n\n"
        );
    }

    #[test]
    fn test_format_machine() {
        let mut diag = located();
        diag.message_text = "two\nlines".into();
        let output = Formatter::new(OutputFormat::Machine).format(&[diag]);
        assert_eq!(output, "ERROR a.less:2:2 two lines\n");
    }

    #[test]
    fn test_format_json() {
        let output = Formatter::new(OutputFormat::Json).format(&[located()]);
        assert!(output.contains("\"relFilePath\": \"a.less\""));
        assert!(output.contains("\"errorCharStart\": 1"));
    }

    #[test]
    fn test_output_format_from_config() {
        let format: OutputFormat = serde_json::from_str("\"human-verbose\"").unwrap();
        assert_eq!(format, OutputFormat::HumanVerbose);
    }
}
