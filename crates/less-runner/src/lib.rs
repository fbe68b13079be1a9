//! less compiler seam and node process runner.
//!
//! [`LessCompiler`] is the contract the transform depends on: source text in,
//! compiled CSS or a located [`CompileError`] out. [`NodeLessRunner`] fulfils it
//! by driving the `less` package inside a persistent `node` process.
//!
//! # Example
//!
//! ```ignore
//! use less_runner::{LessCompiler, NodeLessRunner, RenderOptions};
//! use camino::Utf8PathBuf;
//!
//! #[tokio::main]
//! async fn main() {
//!     let root = Utf8PathBuf::from("/path/to/project");
//!     let node = NodeLessRunner::find_node(Some(&root)).unwrap();
//!     let runner = NodeLessRunner::new(node, root).unwrap();
//!
//!     let options = RenderOptions::new("src/app.less");
//!     match runner.render("a { b: c }", &options).await {
//!         Ok(output) => println!("{}", output.css),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

mod compiler;
mod runner;

pub use compiler::{CompileError, LessCompiler, RenderError, RenderOptions, RenderOutput};
pub use runner::{NodeLessRunner, RunnerError};
