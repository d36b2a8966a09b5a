//! A block-level Parser for Proguard Mapping Files.
//!
//! The mapping file format is described
//! [here](https://www.guardsquare.com/en/products/proguard/manual/retrace).
//!
//! Unlike a record parser, this one only splits the file into class blocks and
//! keeps every line verbatim, so that a [`MappingFile`] with some classes or
//! members removed can be written back without reformatting anything.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::str;

use thiserror::Error;
use tracing::debug;

use crate::signature::MemberSignature;
use crate::utils::{numbered_lines, LineEnding};

/// The specific parse Error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The line is not valid UTF-8.
    #[error("{0}")]
    Utf8Error(str::Utf8Error),
    /// An indented member line appeared before the first class line.
    #[error("member line appears before any class")]
    MemberBeforeClass,
    /// A class line has no `->` between original and obfuscated name.
    #[error("class line is missing `->`")]
    MissingClassArrow,
    /// A class line does not end with `:`.
    #[error("class line does not end with `:`")]
    MissingClassTerminator,
    /// A class line has an empty original or obfuscated name.
    #[error("class line has an empty class name")]
    EmptyClassName,
    /// The same original class name is declared twice.
    #[error("class is declared more than once")]
    DuplicateClass,
    /// A member line has no `->` rename arrow.
    #[error("member line is missing `->`")]
    MissingMemberArrow,
    /// A member line has no space between its type and its name.
    #[error("member line has no type separator")]
    MissingTypeSeparator,
    /// A method line opens an argument list that is never closed.
    #[error("member line has an unclosed argument list")]
    UnclosedArguments,
    /// A warning line does not start with `Warning:`.
    #[error("warning line does not start with `Warning:`")]
    MissingWarningPrefix,
    /// A warning line has no `:` after its class name.
    #[error("warning line has no `:` after the class name")]
    MissingClassSeparator,
    /// A warning line does not quote both the original and obfuscated member.
    #[error("warning line does not quote the conflicting member")]
    MissingQuotedMember,
}

/// Error when parsing a proguard mapping or warning line.
///
/// Since the files are parsed line-by-line, an error will also contain
/// the offending line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} (line {line_number}: {line:?})")]
pub struct ParseError {
    line_number: usize,
    line: String,
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line: Line<'_>, kind: ParseErrorKind) -> Self {
        Self {
            line_number: line.number,
            line: line.text.to_owned(),
            kind,
        }
    }

    /// Locates the line containing the first invalid UTF-8 sequence of `source`.
    pub(crate) fn invalid_utf8(source: &[u8], error: str::Utf8Error) -> Self {
        let valid = &source[..error.valid_up_to()];
        let start = valid
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        let end = source[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(source.len(), |pos| start + pos);
        let line = String::from_utf8_lossy(&source[start..end]);

        Self {
            line_number: valid.iter().filter(|&&b| b == b'\n').count() + 1,
            line: line.trim_end_matches('\r').to_owned(),
            kind: ParseErrorKind::Utf8Error(error),
        }
    }

    /// The 1-based number of the offending line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The offending line that caused the error.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The specific parse Error.
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

/// A single raw line of an input file.
///
/// The text and its line terminator are kept apart, so that the line can be
/// inspected without the terminator and written back exactly as it was read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Line<'s> {
    number: usize,
    text: &'s str,
    terminator: &'s str,
}

impl<'s> Line<'s> {
    pub(crate) fn new(number: usize, text: &'s str, terminator: &'s str) -> Self {
        Self {
            number,
            text,
            terminator,
        }
    }

    /// The 1-based line number within the file this line was read from.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The verbatim text of the line, without its terminator.
    pub fn as_str(&self) -> &'s str {
        self.text
    }

    /// The `\n` or `\r\n` that ended the line, empty for a last line without one.
    pub fn terminator(&self) -> &'s str {
        self.terminator
    }

    /// Whether this line is a `#` comment, indented or not.
    pub fn is_comment(&self) -> bool {
        self.text.trim_start().starts_with('#')
    }

    /// Parses this line as a field or method line.
    pub fn signature(&self) -> Result<MemberSignature<'s>, ParseError> {
        MemberSignature::parse(self.text).map_err(|kind| ParseError::new(*self, kind))
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// A class block: the class line and every line that belongs to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassBlock<'s> {
    /// Original class name, the correlation key across mappings.
    pub(crate) key: &'s str,
    /// Obfuscated class name as declared on `declaration`.
    pub(crate) obfuscated: &'s str,
    /// The verbatim `original -> obfuscated:` line.
    pub(crate) declaration: Line<'s>,
    /// `#` lines following the class line, e.g. R8 `sourceFile` headers.
    pub(crate) metadata: Vec<Line<'s>>,
    /// Indented field and method lines, in file order.
    pub(crate) members: Vec<Line<'s>>,
}

impl<'s> ClassBlock<'s> {
    fn from_declaration(line: Line<'s>) -> Result<Self, ParseError> {
        // class line:
        // `originalclassname -> obfuscatedclassname:`
        let body = line
            .text
            .trim_end()
            .strip_suffix(':')
            .ok_or_else(|| ParseError::new(line, ParseErrorKind::MissingClassTerminator))?;
        let (original, obfuscated) = body
            .split_once("->")
            .ok_or_else(|| ParseError::new(line, ParseErrorKind::MissingClassArrow))?;

        let (key, obfuscated) = (original.trim(), obfuscated.trim());
        if key.is_empty() || obfuscated.is_empty() {
            return Err(ParseError::new(line, ParseErrorKind::EmptyClassName));
        }

        Ok(Self {
            key,
            obfuscated,
            declaration: line,
            metadata: Vec::new(),
            members: Vec::new(),
        })
    }

    /// The original (pre-obfuscation) class name.
    pub fn key(&self) -> &'s str {
        self.key
    }

    /// The obfuscated class name.
    pub fn obfuscated_name(&self) -> &'s str {
        self.obfuscated
    }

    /// Whether the class line maps the class to a different name.
    pub fn is_renamed(&self) -> bool {
        self.key != self.obfuscated
    }

    /// The verbatim class line.
    pub fn declaration(&self) -> Line<'s> {
        self.declaration
    }

    /// The `#` lines attached to the class line.
    pub fn metadata(&self) -> &[Line<'s>] {
        &self.metadata
    }

    /// The member lines of this class, in file order.
    pub fn members(&self) -> &[Line<'s>] {
        &self.members
    }

    /// All lines of this block in the order they are written.
    pub fn lines(&self) -> impl Iterator<Item = Line<'s>> + '_ {
        std::iter::once(self.declaration)
            .chain(self.metadata.iter().copied())
            .chain(self.members.iter().copied())
    }
}

/// A parsed Proguard Mapping file.
///
/// Classes are kept in the order they appear in the file and can be looked
/// up by their original name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingFile<'s> {
    pub(crate) preamble: Vec<Line<'s>>,
    pub(crate) classes: Vec<ClassBlock<'s>>,
    index: HashMap<&'s str, usize>,
    pub(crate) line_ending: LineEnding,
    pub(crate) trailing_newline: bool,
}

impl<'s> MappingFile<'s> {
    /// Parses a mapping file into its class blocks.
    ///
    /// Empty lines carry no information and are discarded, so they are not
    /// part of the written mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use proguard_reconcile::MappingFile;
    ///
    /// let mapping = MappingFile::parse(
    ///     "android.arch.core.executor.ArchTaskExecutor -> a.a.a.a.c:
    ///     android.arch.core.executor.ArchTaskExecutor sInstance -> a
    ///     13:13:void executeOnDiskIO(java.lang.Runnable):64:64 -> a
    /// ",
    /// )
    /// .unwrap();
    ///
    /// let class = mapping.get("android.arch.core.executor.ArchTaskExecutor").unwrap();
    /// assert_eq!(class.obfuscated_name(), "a.a.a.a.c");
    /// assert_eq!(class.members().len(), 2);
    /// ```
    pub fn parse(source: &'s str) -> Result<Self, ParseError> {
        let mut mapping = MappingFile {
            line_ending: LineEnding::detect(source),
            trailing_newline: source.ends_with('\n'),
            ..Default::default()
        };
        let mut current_class: Option<ClassBlock<'s>> = None;

        for (number, text, terminator) in numbered_lines(source) {
            let line = Line::new(number, text, terminator);

            if text.is_empty() {
                debug!(line = number, "discarding empty line");
                continue;
            } else if text.starts_with([' ', '\t']) {
                match current_class {
                    Some(ref mut class) => class.members.push(line),
                    None => return Err(ParseError::new(line, ParseErrorKind::MemberBeforeClass)),
                }
            } else if text.starts_with('#') {
                match current_class {
                    Some(ref mut class) => class.metadata.push(line),
                    None => mapping.preamble.push(line),
                }
            } else {
                // Flush the previous class if there is one.
                if let Some(class) = current_class.take() {
                    mapping.push_class(class)?;
                }
                current_class = Some(ClassBlock::from_declaration(line)?);
            }
        }

        // Flush the last class
        if let Some(class) = current_class {
            mapping.push_class(class)?;
        }

        Ok(mapping)
    }

    /// Assembles a mapping from classes with unique keys, keeping their order.
    pub(crate) fn from_parts(
        preamble: Vec<Line<'s>>,
        classes: Vec<ClassBlock<'s>>,
        line_ending: LineEnding,
        trailing_newline: bool,
    ) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.key, idx))
            .collect();
        Self {
            preamble,
            classes,
            index,
            line_ending,
            trailing_newline,
        }
    }

    fn push_class(&mut self, class: ClassBlock<'s>) -> Result<(), ParseError> {
        if self.index.contains_key(class.key) {
            return Err(ParseError::new(
                class.declaration,
                ParseErrorKind::DuplicateClass,
            ));
        }
        self.index.insert(class.key, self.classes.len());
        self.classes.push(class);
        Ok(())
    }

    /// Looks up a class by its original name.
    pub fn get(&self, key: &str) -> Option<&ClassBlock<'s>> {
        self.index.get(key).map(|&idx| &self.classes[idx])
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// All classes in file order.
    pub fn classes(&self) -> &[ClassBlock<'s>] {
        &self.classes
    }

    /// The original class names in file order.
    pub fn keys(&self) -> impl Iterator<Item = &'s str> + '_ {
        self.classes.iter().map(|class| class.key)
    }

    /// The `#` lines preceding the first class.
    pub fn preamble(&self) -> &[Line<'s>] {
        &self.preamble
    }

    /// The number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the mapping has no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The total number of member lines over all classes.
    pub fn member_count(&self) -> usize {
        self.classes.iter().map(|class| class.members.len()).sum()
    }

    /// All lines of the mapping in the order they are written.
    pub fn lines(&self) -> impl Iterator<Item = Line<'s>> + '_ {
        self.preamble
            .iter()
            .copied()
            .chain(self.classes.iter().flat_map(ClassBlock::lines))
    }

    /// Writes the mapping, reusing every stored line verbatim.
    pub fn write<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    /// Calculates the UUID of the mapping as it would be written.
    #[cfg(feature = "uuid")]
    pub fn uuid(&self) -> uuid::Uuid {
        crate::mapping_uuid(self.to_string().as_bytes())
    }
}

impl fmt::Display for MappingFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lines read without a terminator get the mapping's line ending when
        // another line follows them.
        let fallback = self.line_ending.as_str();
        let mut lines = self.lines().peekable();

        while let Some(line) = lines.next() {
            f.write_str(line.as_str())?;
            if lines.peek().is_some() || self.trailing_newline {
                match line.terminator() {
                    "" => f.write_str(fallback)?,
                    terminator => f.write_str(terminator)?,
                }
            }
        }
        Ok(())
    }
}
