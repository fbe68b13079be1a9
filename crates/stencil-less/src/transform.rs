//! The less transform.

use crate::context::PluginContext;
use crate::fs::{FsError, WriteOptions};
use crate::options::PluginOptions;
use crate::util::{create_results_id, render_input, use_plugin};
use camino::Utf8Path;
use less_diagnostics::load_diagnostic;
use less_runner::{CompileError, LessCompiler, RenderError, RenderOptions, RunnerError};
use thiserror::Error;

/// Transform errors. Compile errors are not among them; they are reported as
/// diagnostics.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The compiled CSS could not be stored.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The compiler could not be driven.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// What the transform hands back to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// The output id, the input name with its extension swapped for `.css`.
    pub id: String,
    /// The compiled CSS, or a comment carrying the compile error.
    pub code: String,
}

/// The less transform plugin.
#[derive(Debug)]
pub struct LessPlugin<C> {
    options: PluginOptions,
    compiler: C,
}

impl<C: LessCompiler> LessPlugin<C> {
    /// The plugin name reported to the pipeline.
    pub const NAME: &'static str = "less";

    /// Creates a plugin around a compiler.
    pub fn new(options: PluginOptions, compiler: C) -> Self {
        Self { options, compiler }
    }

    /// Returns the plugin name.
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Compiles one stylesheet.
    ///
    /// Returns `Ok(None)` when there is no context or `file_name` is not a
    /// `.less` file. A compile error is pushed onto the context's diagnostics
    /// and yields a result whose code is a comment; the build keeps going.
    /// Failing to store the CSS, or to reach the compiler, is an error.
    pub async fn transform(
        &self,
        source_text: &str,
        file_name: &str,
        context: Option<&PluginContext>,
    ) -> Result<Option<TransformResult>, PluginError> {
        let Some(context) = context else {
            return Ok(None);
        };
        if !use_plugin(file_name) {
            return Ok(None);
        }

        let input = render_input(&self.options, source_text, &context.config.root_dir);
        let mut results = TransformResult {
            id: create_results_id(file_name),
            code: String::new(),
        };

        if source_text.trim().is_empty() {
            return Ok(Some(results));
        }

        let render_options = RenderOptions {
            plugins: self.options.plugins.clone(),
            filename: file_name.to_string(),
        };

        tracing::debug!(file = file_name, id = %results.id, "compiling less");
        match self.compiler.render(&input, &render_options).await {
            Ok(output) => {
                results.code = output.css;
                context
                    .fs
                    .write_file(
                        Utf8Path::new(&results.id),
                        &results.code,
                        WriteOptions::in_memory(),
                    )
                    .await?;
                Ok(Some(results))
            }
            Err(RenderError::Compile(error)) => {
                load_diagnostic(Some(context), Some(&error), Some(Utf8Path::new(file_name)));
                results.code = fallback_code(&error);
                Ok(Some(results))
            }
            Err(RenderError::Runner(e)) => Err(PluginError::Runner(e)),
        }
    }
}

/// Inert replacement output for a stylesheet that failed to compile.
fn fallback_code(error: &CompileError) -> String {
    if error.message.is_empty() {
        "/**  less error  **/".to_string()
    } else {
        format!("/**  less error: {}  **/", error.message)
    }
}
