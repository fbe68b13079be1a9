//! Line index for 1-based physical line lookups.

use text_size::{TextRange, TextSize};

/// The terminator that ended a physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineEnding {
    /// The last line of a file without a trailing newline.
    #[default]
    None,
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Returns the terminator text.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::None => "",
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// The byte range of one physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineRange {
    /// Line content, excluding the terminator.
    pub content: TextRange,
    /// How the line was terminated.
    pub ending: LineEnding,
}

impl LineRange {
    fn new(start: usize, end: usize, ending: LineEnding) -> Self {
        Self {
            content: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            ending,
        }
    }
}

/// An index of the physical lines of a source text.
///
/// Both `\n` and `\r\n` end a line. A lone `\r` does not. A terminator at the
/// very end of the text does not open an extra empty line, so `"a\nb\n"` has
/// two lines.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    lines: Vec<LineRange>,
}

impl LineIndex {
    /// Creates a new line index from source text.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0usize;

        for (offset, c) in text.char_indices() {
            if c != '\n' {
                continue;
            }
            let (end, ending) = if offset > start && bytes[offset - 1] == b'\r' {
                (offset - 1, LineEnding::CrLf)
            } else {
                (offset, LineEnding::Lf)
            };
            lines.push(LineRange::new(start, end, ending));
            start = offset + 1;
        }

        if start < text.len() {
            lines.push(LineRange::new(start, text.len(), LineEnding::None));
        }

        Self { lines }
    }

    /// Returns the number of physical lines.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the range of a 1-based line number.
    ///
    /// Returns `None` for line 0 and for lines past the end of the text.
    pub fn range(&self, line_number: u32) -> Option<LineRange> {
        let index = (line_number as usize).checked_sub(1)?;
        self.lines.get(index).copied()
    }
}

/// Source text paired with its line index.
#[derive(Debug, Clone)]
pub struct SourceLines<'a> {
    text: &'a str,
    index: LineIndex,
}

impl<'a> SourceLines<'a> {
    /// Indexes the lines of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            index: LineIndex::new(text),
        }
    }

    /// Returns the number of physical lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.line_count()
    }

    /// Returns true if the text has no lines at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.line_count() == 0
    }

    /// Returns the content of a 1-based line, without its terminator.
    pub fn get(&self, line_number: u32) -> Option<&'a str> {
        let range = self.index.range(line_number)?;
        self.text.get(std::ops::Range::<usize>::from(range.content))
    }

    /// Returns true if the 1-based line exists.
    #[inline]
    pub fn has_line(&self, line_number: u32) -> bool {
        self.index.range(line_number).is_some()
    }
}
