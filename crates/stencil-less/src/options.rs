//! Plugin options.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use thiserror::Error;

/// Options file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "less.config.json";

/// Option loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The options file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The options document is not valid.
    #[error("invalid less options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Options for the less transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// less plugins, forwarded to the compiler untouched.
    pub plugins: Vec<Value>,
    /// Files imported ahead of every stylesheet, in order. Relative paths
    /// resolve against the project root.
    pub inject_global_paths: Vec<String>,
}

impl PluginOptions {
    /// Parses an options document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads options from a file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Loads `less.config.json` from the project root.
    ///
    /// A missing file gives the defaults. A broken one is reported as a
    /// warning and also gives the defaults.
    pub fn load(project_root: &Utf8Path) -> Self {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Self::default();
        }

        match Self::from_file(&config_path) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(path = %config_path, "failed to load less options: {e}");
                Self::default()
            }
        }
    }

    /// Sets the injected global paths.
    pub fn with_inject_global_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inject_global_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the plugin list.
    pub fn with_plugins(mut self, plugins: Vec<Value>) -> Self {
        self.plugins = plugins;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_camel_case() {
        let options = PluginOptions::from_json_str(
            r#"{ "injectGlobalPaths": ["src/vars.less"], "plugins": ["less-plugin-glob"] }"#,
        )
        .unwrap();
        assert_eq!(options.inject_global_paths, vec!["src/vars.less"]);
        assert_eq!(options.plugins, vec![json!("less-plugin-glob")]);
    }

    #[test]
    fn test_defaults() {
        let options = PluginOptions::from_json_str("{}").unwrap();
        assert_eq!(options, PluginOptions::default());
    }

    #[test]
    fn test_invalid_document() {
        let err = PluginOptions::from_json_str(r#"{ "injectGlobalPaths": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

        assert_eq!(PluginOptions::load(&root), PluginOptions::default());

        fs::write(
            root.join(CONFIG_FILE_NAME),
            r#"{ "injectGlobalPaths": ["a.less", "b.less"] }"#,
        )
        .unwrap();
        let options = PluginOptions::load(&root);
        assert_eq!(options.inject_global_paths, vec!["a.less", "b.less"]);

        fs::write(root.join(CONFIG_FILE_NAME), "not json").unwrap();
        assert_eq!(PluginOptions::load(&root), PluginOptions::default());
    }
}
