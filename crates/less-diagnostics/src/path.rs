//! Relative path and header formatting.

use camino::Utf8Path;

/// Relative paths longer than this keep only their tail.
pub const MAX_RELATIVE_PATH_CHARS: usize = 80;

/// Formats `file_name` relative to `root_dir` for display.
///
/// Strips the root prefix and then one leading separator. A result longer
/// than [`MAX_RELATIVE_PATH_CHARS`] characters keeps only its last 80
/// characters behind a `...` marker. Returns an empty string when either path
/// is empty.
pub fn format_file_name(root_dir: &Utf8Path, file_name: &Utf8Path) -> String {
    let root = root_dir.as_str();
    let file = file_name.as_str();
    if root.is_empty() || file.is_empty() {
        return String::new();
    }

    let relative = file.strip_prefix(root).unwrap_or(file);
    let relative = relative
        .strip_prefix(['/', '\\'])
        .unwrap_or(relative);

    let count = relative.chars().count();
    if count > MAX_RELATIVE_PATH_CHARS {
        let tail: String = relative.chars().skip(count - MAX_RELATIVE_PATH_CHARS).collect();
        return format!("...{tail}");
    }

    relative.to_string()
}

/// Formats a diagnostic header, e.g. `less: src/app.less, line: 4`.
///
/// The line suffix appears only for a positive `start_line`; an `end_line`
/// past it switches to the `lines: <start> - <end>` form.
pub fn format_header(
    kind: &str,
    file_name: &Utf8Path,
    root_dir: &Utf8Path,
    start_line: Option<i64>,
    end_line: Option<i64>,
) -> String {
    let mut header = format!("{kind}: {}", format_file_name(root_dir, file_name));

    if let Some(start) = start_line.filter(|line| *line > 0) {
        match end_line.filter(|end| *end > start) {
            Some(end) => header.push_str(&format!(", lines: {start} - {end}")),
            None => header.push_str(&format!(", line: {start}")),
        }
    }

    header
}
