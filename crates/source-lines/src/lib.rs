//! Physical line lookup for stylesheet diagnostics.
//!
//! Compilers report errors as a 1-based line number plus a column. This crate
//! splits a source file into its physical lines, remembering how each line was
//! terminated, so that the line a compiler points at can be recovered exactly.

mod line_index;

pub use line_index::{LineEnding, LineIndex, LineRange, SourceLines};
