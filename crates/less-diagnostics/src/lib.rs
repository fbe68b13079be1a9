//! less compile diagnostics for stencil-less.
//!
//! Turns a [`CompileError`](less_runner::CompileError) (message, line, column)
//! into a [`Diagnostic`] carrying a readable header, a path relative to the
//! project root, and up to three [`SourceLine`]s: the line before the error,
//! the error line with its highlighted word, and the line after.
//!
//! # Example
//!
//! ```
//! use less_diagnostics::highlight_span;
//!
//! let span = highlight_span("  color: red-ish;", 12);
//! assert_eq!((span.start, span.len), (9, 7));
//! ```

mod diagnostic;
mod highlight;
mod load;
pub mod output;
mod path;
mod report;

pub use diagnostic::{Diagnostic, DiagnosticContext, Level, SourceLine, LESS_KIND};
pub use highlight::{highlight_span, is_stop_char, Highlight, STOP_CHARS};
pub use load::{build_diagnostic, load_diagnostic, ContextError};
pub use path::{format_file_name, format_header, MAX_RELATIVE_PATH_CHARS};
