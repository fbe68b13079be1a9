//! Building diagnostics from compile errors.

use crate::diagnostic::{Diagnostic, DiagnosticContext, SourceLine, LESS_KIND};
use crate::highlight::highlight_span;
use crate::path::{format_file_name, format_header};
use camino::Utf8Path;
use less_runner::CompileError;
use source_lines::SourceLines;
use thiserror::Error;

/// Why source context could not be attached to a diagnostic.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The reported line does not exist in the file.
    #[error("line {line} is outside {path} ({line_count} lines)")]
    LineOutOfRange {
        path: String,
        line: i64,
        line_count: usize,
    },
}

/// Builds a diagnostic for `error` and appends it to the context's sink.
///
/// Does nothing when either the context or the error is missing.
pub fn load_diagnostic<C>(
    context: Option<&C>,
    error: Option<&CompileError>,
    file_path: Option<&Utf8Path>,
) where
    C: DiagnosticContext + ?Sized,
{
    let (Some(context), Some(error)) = (context, error) else {
        return;
    };
    context.push_diagnostic(build_diagnostic(context, error, file_path));
}

/// Builds a diagnostic for `error` without appending it anywhere.
///
/// Failing to read source context is logged and leaves `lines` empty.
pub fn build_diagnostic<C>(
    context: &C,
    error: &CompileError,
    file_path: Option<&Utf8Path>,
) -> Diagnostic
where
    C: DiagnosticContext + ?Sized,
{
    let mut diagnostic = Diagnostic::error(LESS_KIND, error.message.clone());
    diagnostic.code = error
        .status
        .filter(|status| *status != 0)
        .map(|status| status.to_string());

    let Some(file_path) = file_path else {
        return diagnostic;
    };

    let root_dir = context.root_dir();
    let line = error.located_line();
    diagnostic.abs_file_path = Some(file_path.to_owned());
    diagnostic.rel_file_path = Some(format_file_name(root_dir, file_path));
    diagnostic.header = format_header(LESS_KIND, file_path, root_dir, line, None);

    if let Some(line) = line {
        let column = error.column.unwrap_or(0).max(0) as usize;
        match context_lines(context, file_path, line, column) {
            Ok(lines) => diagnostic.lines = lines,
            Err(e) => tracing::warn!(path = %file_path, "less diagnostic context unavailable: {e}"),
        }
    }

    diagnostic
}

/// Reads the previous, error and next lines around a 1-based `line`.
fn context_lines<C>(
    context: &C,
    file_path: &Utf8Path,
    line: i64,
    column: usize,
) -> Result<Vec<SourceLine>, ContextError>
where
    C: DiagnosticContext + ?Sized,
{
    let source = context
        .read_file_sync(file_path)
        .map_err(|source| ContextError::Read {
            path: file_path.to_string(),
            source,
        })?;
    let src_lines = SourceLines::new(&source);

    let out_of_range = || ContextError::LineOutOfRange {
        path: file_path.to_string(),
        line,
        line_count: src_lines.len(),
    };
    let line_number = u32::try_from(line).map_err(|_| out_of_range())?;
    let text = src_lines.get(line_number).ok_or_else(out_of_range)?;

    let mut lines = Vec::with_capacity(3);
    if line_number > 1 {
        let previous = line_number - 1;
        lines.push(SourceLine::context(
            previous,
            src_lines.get(previous).map(str::to_string),
        ));
    }

    lines.push(SourceLine::highlighted(
        line_number,
        Some(text.to_string()),
        highlight_span(text, column),
    ));

    let next = line_number + 1;
    if src_lines.has_line(next) {
        lines.push(SourceLine::context(next, src_lines.get(next).map(str::to_string)));
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct TestContext {
        root: Utf8PathBuf,
        files: HashMap<Utf8PathBuf, String>,
        diagnostics: RefCell<Vec<Diagnostic>>,
    }

    impl TestContext {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                root: Utf8PathBuf::from("/work"),
                files: files
                    .iter()
                    .map(|(path, text)| (Utf8PathBuf::from(*path), text.to_string()))
                    .collect(),
                diagnostics: RefCell::new(Vec::new()),
            }
        }
    }

    impl DiagnosticContext for TestContext {
        fn root_dir(&self) -> &Utf8Path {
            &self.root
        }

        fn read_file_sync(&self, path: &Utf8Path) -> std::io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        fn push_diagnostic(&self, diagnostic: Diagnostic) {
            self.diagnostics.borrow_mut().push(diagnostic);
        }
    }

    const SIX_LINES: &str = "a {\n  b: c;\n}\nd {\n  color: red-ish;\n}\n";

    #[test]
    fn test_missing_context_or_error_is_noop() {
        let ctx = TestContext::new(&[]);
        load_diagnostic::<TestContext>(None, Some(&CompileError::new("x")), None);
        load_diagnostic(Some(&ctx), None, Some(Utf8Path::new("/work/a.less")));
        assert!(ctx.diagnostics.borrow().is_empty());
    }

    #[test]
    fn test_without_file_path() {
        let ctx = TestContext::new(&[]);
        let error = CompileError::new("boom").with_location(3, 1);
        load_diagnostic(Some(&ctx), Some(&error), None);

        let diagnostics = ctx.diagnostics.borrow();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].header, "less error");
        assert_eq!(diagnostics[0].abs_file_path, None);
        assert_eq!(diagnostics[0].rel_file_path, None);
        assert!(diagnostics[0].lines.is_empty());
    }

    #[test]
    fn test_middle_line_gets_three_lines() {
        let ctx = TestContext::new(&[("/work/src/a.less", SIX_LINES)]);
        let error = CompileError::new("bad value").with_location(5, 11);
        let diagnostic = build_diagnostic(&ctx, &error, Some(Utf8Path::new("/work/src/a.less")));

        assert_eq!(diagnostic.header, "less: src/a.less, line: 5");
        assert_eq!(diagnostic.rel_file_path.as_deref(), Some("src/a.less"));
        let numbers: Vec<u32> = diagnostic.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![4, 5, 6]);

        let error_line = &diagnostic.lines[1];
        assert_eq!(error_line.line_index, 4);
        assert_eq!(error_line.text.as_deref(), Some("  color: red-ish;"));
        assert_eq!((error_line.error_char_start, error_line.error_length), (9, 7));
        assert_eq!(diagnostic.lines[0].text.as_deref(), Some("d {"));
        assert_eq!(diagnostic.lines[0].error_char_start, -1);
        assert_eq!(diagnostic.lines[2].text.as_deref(), Some("}"));
        assert_eq!(diagnostic.lines[2].error_length, -1);
    }

    #[test]
    fn test_first_and_last_lines_get_two_lines() {
        let ctx = TestContext::new(&[("/work/a.less", SIX_LINES)]);
        let path = Some(Utf8Path::new("/work/a.less"));

        let first = build_diagnostic(&ctx, &CompileError::new("x").with_location(1, 0), path);
        let numbers: Vec<u32> = first.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 2]);

        let last = build_diagnostic(&ctx, &CompileError::new("x").with_location(6, 0), path);
        let numbers: Vec<u32> = last.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![5, 6]);
    }

    #[test]
    fn test_crlf_file() {
        let ctx = TestContext::new(&[("/work/a.less", "a {\r\n  b: @c;\r\n}\r\n")]);
        let error = CompileError::new("undefined").with_location(2, 6);
        let diagnostic = build_diagnostic(&ctx, &error, Some(Utf8Path::new("/work/a.less")));
        let error_line = diagnostic.error_line().unwrap();
        assert_eq!(error_line.text.as_deref(), Some("  b: @c;"));
        assert_eq!((error_line.error_char_start, error_line.error_length), (6, 1));
        assert_eq!(diagnostic.lines.len(), 3);
    }

    #[test]
    fn test_no_location_leaves_lines_empty() {
        let ctx = TestContext::new(&[("/work/a.less", SIX_LINES)]);
        let mut error = CompileError::new("import failed");
        error.line = Some(-1);
        let diagnostic = build_diagnostic(&ctx, &error, Some(Utf8Path::new("/work/a.less")));
        assert_eq!(diagnostic.header, "less: a.less");
        assert_eq!(diagnostic.message_text, "import failed");
        assert!(diagnostic.lines.is_empty());
    }

    #[test]
    fn test_unreadable_file_still_reports() {
        let ctx = TestContext::new(&[]);
        let error = CompileError::new("x").with_location(2, 0);
        load_diagnostic(Some(&ctx), Some(&error), Some(Utf8Path::new("/work/gone.less")));

        let diagnostics = ctx.diagnostics.borrow();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].header, "less: gone.less, line: 2");
        assert!(diagnostics[0].lines.is_empty());
    }

    #[test]
    fn test_line_out_of_range() {
        let ctx = TestContext::new(&[("/work/a.less", "a {}\n")]);
        let path = Some(Utf8Path::new("/work/a.less"));
        let past_end = build_diagnostic(&ctx, &CompileError::new("x").with_location(9, 0), path);
        assert!(past_end.lines.is_empty());
        let zero = build_diagnostic(&ctx, &CompileError::new("x").with_location(0, 0), path);
        assert!(zero.lines.is_empty());
        assert_eq!(zero.header, "less: a.less");
    }

    #[test]
    fn test_status_becomes_code() {
        let ctx = TestContext::new(&[]);
        let with_status = build_diagnostic(&ctx, &CompileError::new("x").with_status(2), None);
        assert_eq!(with_status.code.as_deref(), Some("2"));
        let zero = build_diagnostic(&ctx, &CompileError::new("x").with_status(0), None);
        assert_eq!(zero.code, None);
    }
}
