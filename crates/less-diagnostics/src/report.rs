//! miette reports for diagnostics.

use crate::diagnostic::{Diagnostic, Level};
use miette::{LabeledSpan, MietteDiagnostic, NamedSource, Report, Severity};

impl Diagnostic {
    /// Builds a [`miette::Report`] over the context lines.
    ///
    /// The report source holds blank lines up to the first context line so
    /// that rendered line numbers match the file.
    pub fn to_report(&self) -> Report {
        let first_index = self.lines.first().map_or(0, |line| line.line_index);
        let mut source = "\n".repeat(first_index as usize);
        let mut labels = Vec::new();

        for line in &self.lines {
            let text = line.text.as_deref().unwrap_or("");
            if let Some(highlight) = line.highlight() {
                let start = source.len() + byte_offset(text, highlight.start);
                let end = source.len() + byte_offset(text, highlight.end());
                labels.push(LabeledSpan::at(start..end, "here"));
            }
            source.push_str(text);
            source.push('\n');
        }

        let severity = match self.level {
            Level::Error => Severity::Error,
            Level::Warn => Severity::Warning,
            Level::Info | Level::Log | Level::Debug => Severity::Advice,
        };

        let mut diagnostic = MietteDiagnostic::new(self.message_text.clone())
            .with_severity(severity)
            .with_help(self.header.clone())
            .with_labels(labels);
        if let Some(code) = &self.code {
            diagnostic = diagnostic.with_code(format!("{}::{}", self.kind, code));
        }

        let name = self
            .rel_file_path
            .clone()
            .unwrap_or_else(|| self.kind.clone());
        Report::new(diagnostic).with_source_code(NamedSource::new(name, source))
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::{Diagnostic, SourceLine};
    use crate::highlight::Highlight;
    use crate::LESS_KIND;
    use miette::{Diagnostic as _, GraphicalReportHandler, GraphicalTheme};
    use pretty_assertions::assert_eq;

    fn located() -> Diagnostic {
        let mut diag = Diagnostic::error(LESS_KIND, "variable @tone is undefined");
        diag.header = "less: a.less, line: 8".into();
        diag.rel_file_path = Some("a.less".into());
        diag.code = Some("2".into());
        diag.lines = vec![
            SourceLine::context(7, Some("p {".into())),
            SourceLine::highlighted(
                8,
                Some("  color: @tone;".into()),
                Highlight { start: 10, len: 4 },
            ),
            SourceLine::context(9, Some("}".into())),
        ];
        diag
    }

    #[test]
    fn test_label_covers_highlight() {
        let report = located().to_report();
        let labels: Vec<_> = report.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        // 6 padding newlines, "p {\n", then two spaces and "color: @".
        assert_eq!(labels[0].offset(), 6 + 4 + 10);
        assert_eq!(labels[0].len(), 4);
        assert_eq!(report.code().unwrap().to_string(), "less::2");
    }

    #[test]
    fn test_rendered_report() {
        let report = located().to_report();
        let mut out = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .render_report(&mut out, report.as_ref())
            .unwrap();
        assert!(out.contains("variable @tone is undefined"));
        assert!(out.contains("color: @tone;"));
        assert!(out.contains("a.less:8:11"));
    }

    #[test]
    fn test_report_without_lines() {
        let report = Diagnostic::error(LESS_KIND, "boom").to_report();
        assert!(report.labels().map_or(true, |mut labels| labels.next().is_none()));
    }
}
