//! The compiler contract.

use crate::runner::RunnerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// A compile error reported by less.
///
/// `line` is 1-based and `column` is a 0-based offset into that line. A
/// missing or negative `line` means the compiler could not locate the error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct CompileError {
    /// The raw compiler message.
    #[serde(default)]
    pub message: String,
    /// Numeric status code, if the compiler supplied one.
    #[serde(default)]
    pub status: Option<i64>,
    /// 1-based line number.
    #[serde(default)]
    pub line: Option<i64>,
    /// 0-based column.
    #[serde(default)]
    pub column: Option<i64>,
}

impl CompileError {
    /// Creates an error without a location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Sets the line and column.
    pub fn with_location(mut self, line: i64, column: i64) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Sets the status code.
    pub fn with_status(mut self, status: i64) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the reported line, or `None` when it is absent or negative.
    pub fn located_line(&self) -> Option<i64> {
        self.line.filter(|line| *line > -1)
    }
}

/// Options forwarded to the compiler with each request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderOptions {
    /// Compiler plugins. Forwarded verbatim.
    pub plugins: Vec<Value>,
    /// The file being compiled. Used for relative `@import` resolution and
    /// for error locations.
    pub filename: String,
}

impl RenderOptions {
    /// Creates options for a file with no plugins.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            plugins: Vec::new(),
            filename: filename.into(),
        }
    }

    /// Sets the plugin list.
    pub fn with_plugins(mut self, plugins: Vec<Value>) -> Self {
        self.plugins = plugins;
        self
    }
}

/// Successful compiler output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// The compiled CSS.
    pub css: String,
}

/// Why a render did not produce CSS.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The stylesheet did not compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The compiler itself could not be driven.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// A stylesheet compiler.
#[async_trait]
pub trait LessCompiler: Send + Sync {
    /// Compiles `source` to CSS.
    async fn render(
        &self,
        source: &str,
        options: &RenderOptions,
    ) -> Result<RenderOutput, RenderError>;
}

#[async_trait]
impl<T: LessCompiler + ?Sized> LessCompiler for Arc<T> {
    async fn render(
        &self,
        source: &str,
        options: &RenderOptions,
    ) -> Result<RenderOutput, RenderError> {
        (**self).render(source, options).await
    }
}
