//! Internal helpers shared across modules.

/// The line terminator used by a mapping file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Picks the terminator of the first line, `\n` if there is none.
    ///
    /// Only used for lines that were read without a terminator.
    pub(crate) fn detect(source: &str) -> Self {
        match source.find('\n') {
            Some(pos) if source[..pos].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Iterates over the lines of `source` with their 1-based line number.
///
/// Each line is split into its text and its `\n` or `\r\n` terminator, which
/// is empty for a last line without one.
pub(crate) fn numbered_lines(source: &str) -> impl Iterator<Item = (usize, &str, &str)> {
    source
        .split_inclusive('\n')
        .enumerate()
        .map(|(idx, raw)| {
            let text = match raw.strip_suffix('\n') {
                Some(text) => text.strip_suffix('\r').unwrap_or(text),
                None => raw,
            };
            (idx + 1, text, &raw[text.len()..])
        })
}

/// Finds `pattern` in `haystack`, starting the search at byte offset `from`.
pub(crate) fn find_from(haystack: &str, pattern: char, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .find(pattern)
        .map(|pos| pos + from)
}
