//! less stylesheet transform for the stencil build pipeline.
//!
//! [`LessPlugin::transform`] takes a `.less` file handed over by the host
//! pipeline, compiles it through a [`LessCompiler`], and returns the CSS under
//! the derived `.css` id. Compile errors never abort the build: they become a
//! [`Diagnostic`] in the build-wide sink and the file's output is replaced by
//! an inert comment.
//!
//! # Example
//!
//! ```ignore
//! use stencil_less::{BuildConfig, InMemoryFs, LessPlugin, PluginContext, PluginOptions};
//! use less_runner::NodeLessRunner;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = BuildConfig::new("/path/to/project");
//!     let node = NodeLessRunner::find_node(Some(&config.root_dir)).unwrap();
//!     let runner = NodeLessRunner::new(node, config.root_dir.clone()).unwrap();
//!     let plugin = LessPlugin::new(PluginOptions::load(&config.root_dir), runner);
//!
//!     let context = PluginContext::new(config, Arc::new(InMemoryFs::new()));
//!     let source = std::fs::read_to_string("/path/to/project/src/app.less").unwrap();
//!     let result = plugin
//!         .transform(&source, "/path/to/project/src/app.less", Some(&context))
//!         .await
//!         .unwrap();
//!     println!("{:?}", result);
//! }
//! ```

mod context;
mod fs;
mod options;
mod transform;
mod util;

pub use context::{BuildConfig, DiagnosticSink, PluginContext};
pub use fs::{BuildFs, FsError, InMemoryFs, WriteOptions};
pub use less_diagnostics::Diagnostic;
pub use less_runner::LessCompiler;
pub use options::{ConfigError, PluginOptions, CONFIG_FILE_NAME};
pub use transform::{LessPlugin, PluginError, TransformResult};
pub use util::{create_results_id, render_input, use_plugin};
