//! The build context handed to each transform.

use crate::fs::BuildFs;
use camino::{Utf8Path, Utf8PathBuf};
use less_diagnostics::{Diagnostic, DiagnosticContext};
use std::sync::{Arc, Mutex, PoisonError};

/// Project layout supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// Absolute project root.
    pub root_dir: Utf8PathBuf,
    /// Source directory.
    pub src_dir: Utf8PathBuf,
}

impl BuildConfig {
    /// Creates a config with `src_dir` at `<root>/src`.
    pub fn new(root_dir: impl Into<Utf8PathBuf>) -> Self {
        let root_dir = root_dir.into();
        let src_dir = root_dir.join("src");
        Self { root_dir, src_dir }
    }
}

/// The build-wide, append-only diagnostics collection.
///
/// Clones share the same collection.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    inner: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    /// Returns a copy of everything collected so far, in append order.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a transform may touch outside its own arguments.
#[derive(Clone)]
pub struct PluginContext {
    /// Project layout.
    pub config: BuildConfig,
    /// The host's file store.
    pub fs: Arc<dyn BuildFs>,
    /// The build's diagnostics.
    pub diagnostics: DiagnosticSink,
}

impl PluginContext {
    /// Creates a context with an empty diagnostics sink.
    pub fn new(config: BuildConfig, fs: Arc<dyn BuildFs>) -> Self {
        Self {
            config,
            fs,
            diagnostics: DiagnosticSink::new(),
        }
    }
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

impl DiagnosticContext for PluginContext {
    fn root_dir(&self) -> &Utf8Path {
        &self.config.root_dir
    }

    fn read_file_sync(&self, path: &Utf8Path) -> std::io::Result<String> {
        self.fs.read_file_sync(path)
    }

    fn push_diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
