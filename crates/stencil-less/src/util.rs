//! File name and input helpers.

use crate::options::PluginOptions;
use camino::Utf8Path;

/// Returns true for `.less` files, ignoring case.
pub fn use_plugin(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".less")
}

/// Prepends one `@import` per injected global path to `source_text`.
///
/// Paths keep their configured order. Relative paths are joined onto
/// `root_dir`; nothing is deduplicated or checked for existence.
pub fn render_input(options: &PluginOptions, source_text: &str, root_dir: &Utf8Path) -> String {
    let inject_text: String = options
        .inject_global_paths
        .iter()
        .map(|inject_path| {
            let path = Utf8Path::new(inject_path);
            if path.is_absolute() {
                format!("@import \"{path}\";")
            } else {
                format!("@import \"{}\";", root_dir.join(path))
            }
        })
        .collect();

    format!("{inject_text}{source_text}")
}

/// Derives the output id: the last `.`-separated segment becomes `css`.
///
/// Only the final segment changes, so `archive.tar.less` becomes
/// `archive.tar.css`. A name without any dot is replaced outright by `css`.
pub fn create_results_id(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) => format!("{}.css", &file_name[..dot]),
        None => "css".to_string(),
    }
}
