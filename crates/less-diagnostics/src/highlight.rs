//! Word-bounded highlight spans.

/// Characters that end a highlighted word.
pub const STOP_CHARS: &[char] = &[
    '\n', '\r', '\t', ' ', ':', ';', ',', '{', '}', '.', '#', '@', '!', '[', ']', '(', ')', '&',
    '+', '~', '^', '*', '$',
];

/// Returns true if `c` bounds a highlighted word.
#[inline]
pub fn is_stop_char(c: char) -> bool {
    STOP_CHARS.contains(&c)
}

/// A highlighted character range within one line.
///
/// Offsets count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Highlight {
    /// First highlighted character.
    pub start: usize,
    /// Number of highlighted characters.
    pub len: usize,
}

impl Highlight {
    /// Returns the exclusive end offset.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Returns the highlighted text of `line`.
    #[cfg(test)]
    fn slice<'a>(&self, line: &'a str) -> &'a str {
        let start = char_to_byte(line, self.start);
        let end = char_to_byte(line, self.end());
        &line[start..end]
    }
}

/// Expands `column` into the word touching it.
///
/// Scans back from `column` to the first stop character (or the start of the
/// line), then forward to the next one. Positions past the end of the line
/// count as stop characters. A column past the end is clamped to the line
/// length. An empty result is widened to the single character before it,
/// unless it sits at offset 0.
pub fn highlight_span(line: &str, column: usize) -> Highlight {
    let chars: Vec<char> = line.chars().collect();
    let is_stop_at = |i: usize| chars.get(i).map_or(true, |c| is_stop_char(*c));

    let column = column.min(chars.len());
    let mut start = column;
    for i in (0..=column).rev() {
        if is_stop_at(i) {
            break;
        }
        start = i;
    }

    let len = chars[start..]
        .iter()
        .take_while(|c| !is_stop_char(**c))
        .count();

    if len == 0 && start > 0 {
        return Highlight {
            start: start - 1,
            len: 1,
        };
    }

    Highlight { start, len }
}

#[cfg(test)]
fn char_to_byte(line: &str, offset: usize) -> usize {
    line.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}
