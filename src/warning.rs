//! A Parser for proguard mapping conflict warnings.
//!
//! When a reused mapping conflicts with the keep rules of a project, proguard
//! reports each offending member on its own line:
//!
//! ```text
//! Warning: com.example.Main: field 'int count' is not being kept as 'a', but remapped to 'b'
//! ```

use std::fmt;
use std::iter::Enumerate;
use std::str::Lines;

use crate::mapping::{Line, ParseError, ParseErrorKind};

const WARNING_PREFIX: &str = "Warning:";

/// A single warning naming one conflicting member of a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Warning<'s> {
    line_number: usize,
    class: &'s str,
    member: &'s str,
    obfuscated: &'s str,
}

impl<'s> Warning<'s> {
    /// Parses a single warning line.
    ///
    /// The free text after the class name is split at `'`; the segments at
    /// index 1 and 5 are the original member and its obfuscated name.
    ///
    /// # Examples
    ///
    /// ```
    /// use proguard_reconcile::Warning;
    ///
    /// let warning = Warning::try_parse(
    ///     "Warning: com.example.Main: field 'int count' is not being kept as 'a', but remapped to 'b'",
    /// )
    /// .unwrap();
    /// assert_eq!(warning.class(), "com.example.Main");
    /// assert_eq!(warning.search_pattern(), "int count -> b");
    /// ```
    pub fn try_parse(line: &'s str) -> Result<Self, ParseError> {
        Self::parse_line(Line::new(1, line, ""))
    }

    fn parse_line(line: Line<'s>) -> Result<Self, ParseError> {
        let error = |kind| ParseError::new(line, kind);

        let rest = line
            .as_str()
            .strip_prefix(WARNING_PREFIX)
            .ok_or_else(|| error(ParseErrorKind::MissingWarningPrefix))?;
        let (class, text) = rest
            .split_once(':')
            .ok_or_else(|| error(ParseErrorKind::MissingClassSeparator))?;

        let mut segments = text.split('\'');
        let member = segments
            .nth(1)
            .ok_or_else(|| error(ParseErrorKind::MissingQuotedMember))?;
        let obfuscated = segments
            .nth(3)
            .ok_or_else(|| error(ParseErrorKind::MissingQuotedMember))?;

        Ok(Self {
            line_number: line.number(),
            class: class.trim(),
            member,
            obfuscated,
        })
    }

    /// The 1-based line number within the warning log.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The original name of the class the warning is about.
    pub fn class(&self) -> &'s str {
        self.class
    }

    /// The original member description, e.g. `int count`.
    pub fn member(&self) -> &'s str {
        self.member
    }

    /// The obfuscated name the member was remapped to.
    pub fn obfuscated_name(&self) -> &'s str {
        self.obfuscated
    }

    /// The text a member line of [`class`](Self::class) has to contain to be removed.
    pub fn search_pattern(&self) -> String {
        format!("{} -> {}", self.member, self.obfuscated)
    }
}

impl fmt::Display for Warning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.class, self.member, self.obfuscated)
    }
}

/// A proguard warning log.
#[derive(Clone, Default)]
pub struct WarningLog<'s> {
    source: &'s str,
}

impl fmt::Debug for WarningLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningLog").finish()
    }
}

impl<'s> WarningLog<'s> {
    /// Create a new warning log.
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Create an Iterator over the [`Warning`]s of the log, one per line.
    pub fn iter(&self) -> WarningIter<'s> {
        WarningIter {
            lines: self.source.lines().enumerate(),
        }
    }

    /// Parses every warning, failing on the first malformed line.
    pub fn parse(&self) -> Result<Vec<Warning<'s>>, ParseError> {
        self.iter().collect()
    }
}

/// An Iterator yielding [`Warning`]s, created by [`WarningLog::iter`].
#[derive(Clone)]
pub struct WarningIter<'s> {
    lines: Enumerate<Lines<'s>>,
}

impl fmt::Debug for WarningIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningIter").finish()
    }
}

impl<'s> Iterator for WarningIter<'s> {
    type Item = Result<Warning<'s>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, text) = self.lines.next()?;
        Some(Warning::parse_line(Line::new(idx + 1, text, "")))
    }
}
