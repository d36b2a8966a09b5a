//! Extraction of the correlation key of a single field or method line.

use crate::mapping::ParseErrorKind;
use crate::utils::find_from;

/// The names of a field or method line, used to correlate members across mappings.
///
/// The line is split with plain offsets, in this order:
///
/// ```text
/// [startline:endline:]type name[(arguments)[:originalstart[:originalend]]] -> obfuscated
/// ```
///
/// The full signature covers everything after the leading line range up to
/// the arrow. Two overloads of a method share their short name but never their
/// full signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberSignature<'s> {
    line_range: Option<&'s str>,
    short_name: &'s str,
    full_signature: &'s str,
    arguments: Option<&'s str>,
    original_lines: Option<&'s str>,
    obfuscated_name: &'s str,
}

impl<'s> MemberSignature<'s> {
    /// Parses a field or method line, with or without its indentation.
    ///
    /// # Examples
    ///
    /// ```
    /// use proguard_reconcile::MemberSignature;
    ///
    /// let field = MemberSignature::parse("    android.app.Activity mActivity -> a").unwrap();
    /// assert_eq!(field.short_name(), "mActivity");
    /// assert_eq!(field.full_signature(), "android.app.Activity mActivity");
    /// assert_eq!(field.obfuscated_name(), "a");
    ///
    /// let method =
    ///     MemberSignature::parse("    1:4:void onBackPressed(int):184:187 -> c").unwrap();
    /// assert_eq!(method.short_name(), "onBackPressed");
    /// assert_eq!(method.full_signature(), "void onBackPressed(int):184:187");
    /// assert_eq!(method.obfuscated_name(), "c");
    /// ```
    pub fn parse(line: &'s str) -> Result<Self, ParseErrorKind> {
        let line = line.trim();

        let arrow = line.find("->").ok_or(ParseErrorKind::MissingMemberArrow)?;

        // The `startline:endline:` prefix only counts when both colons come
        // before the first space, i.e. they are part of the type token.
        let type_token_end = line.find(' ').unwrap_or(line.len());
        let range_end = line_range_end(&line[..type_token_end]);
        let signature_start = range_end.map_or(0, |colon| colon + 1);

        // The type is never empty, so the separator search skips one char.
        let type_start = line[signature_start..]
            .chars()
            .next()
            .map_or(signature_start, |c| signature_start + c.len_utf8());
        let type_space = find_from(line, ' ', type_start)
            .filter(|&space| space < arrow && !line[space + 1..arrow].trim().is_empty())
            .ok_or(ParseErrorKind::MissingTypeSeparator)?;

        let name_start = type_space + 1;
        let open_paren = find_from(&line[..arrow], '(', name_start);
        let close_paren = match open_paren {
            Some(open) => Some(
                find_from(&line[..arrow], ')', open + 1)
                    .ok_or(ParseErrorKind::UnclosedArguments)?,
            ),
            None => None,
        };
        let name_end = open_paren.unwrap_or(arrow);

        let original_lines = close_paren
            .and_then(|close| line[close + 1..arrow].trim().strip_prefix(':'))
            .filter(|lines| !lines.is_empty());

        Ok(Self {
            line_range: range_end.map(|colon| &line[..colon]),
            short_name: line[name_start..name_end].trim(),
            full_signature: line[signature_start..arrow].trim(),
            arguments: open_paren
                .zip(close_paren)
                .map(|(open, close)| &line[open + 1..close]),
            original_lines,
            obfuscated_name: line[arrow + 2..].trim(),
        })
    }

    /// The bare member name, without type or arguments.
    pub fn short_name(&self) -> &'s str {
        self.short_name
    }

    /// Type, name, arguments and original line suffix, without the leading line range.
    pub fn full_signature(&self) -> &'s str {
        self.full_signature
    }

    /// The name after the rename arrow.
    pub fn obfuscated_name(&self) -> &'s str {
        self.obfuscated_name
    }

    /// The leading `startline:endline` range of a method, if present.
    pub fn line_range(&self) -> Option<&'s str> {
        self.line_range
    }

    /// The raw argument list of a method, `None` for fields.
    pub fn arguments(&self) -> Option<&'s str> {
        self.arguments
    }

    /// The trailing `originalstart[:originalend]` suffix of a method, if present.
    pub fn original_lines(&self) -> Option<&'s str> {
        self.original_lines
    }

    /// Returns `true` if this is a method.
    pub fn is_method(&self) -> bool {
        self.arguments.is_some()
    }

    /// Whether the obfuscator gave this member a new name.
    pub fn is_renamed(&self) -> bool {
        self.short_name != self.obfuscated_name
    }
}

/// Offset of the second colon of a `startline:endline:` prefix.
fn line_range_end(type_token: &str) -> Option<usize> {
    let first = type_token.find(':')?;
    find_from(type_token, ':', first + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field() {
        let parsed = MemberSignature::parse("    java.util.ArrayDeque mOnBackPressedCallbacks -> b");
        assert_eq!(
            parsed,
            Ok(MemberSignature {
                line_range: None,
                short_name: "mOnBackPressedCallbacks",
                full_signature: "java.util.ArrayDeque mOnBackPressedCallbacks",
                arguments: None,
                original_lines: None,
                obfuscated_name: "b",
            })
        );
        assert!(!parsed.unwrap().is_method());
    }

    #[test]
    fn parse_method_simple() {
        let parsed =
            MemberSignature::parse("    boolean equals(java.lang.Object,java.lang.Object) -> a");
        assert_eq!(
            parsed,
            Ok(MemberSignature {
                line_range: None,
                short_name: "equals",
                full_signature: "boolean equals(java.lang.Object,java.lang.Object)",
                arguments: Some("java.lang.Object,java.lang.Object"),
                original_lines: None,
                obfuscated_name: "a",
            })
        );
    }

    #[test]
    fn parse_method_with_start_end_lines() {
        let parsed = MemberSignature::parse("    14:15:void setSupportActionBar(androidx.appcompat.widget.Toolbar) -> onCreate");
        assert_eq!(
            parsed,
            Ok(MemberSignature {
                line_range: Some("14:15"),
                short_name: "setSupportActionBar",
                full_signature: "void setSupportActionBar(androidx.appcompat.widget.Toolbar)",
                arguments: Some("androidx.appcompat.widget.Toolbar"),
                original_lines: None,
                obfuscated_name: "onCreate",
            })
        );
    }

    #[test]
    fn parse_method_with_original_lines() {
        let parsed = MemberSignature::parse("    1:4:void onBackPressed():184:187 -> c").unwrap();
        assert_eq!(parsed.line_range(), Some("1:4"));
        assert_eq!(parsed.short_name(), "onBackPressed");
        assert_eq!(parsed.full_signature(), "void onBackPressed():184:187");
        assert_eq!(parsed.arguments(), Some(""));
        assert_eq!(parsed.original_lines(), Some("184:187"));

        let parsed = MemberSignature::parse("    14:15:void a.B.c(int):436 -> d").unwrap();
        assert_eq!(parsed.short_name(), "a.B.c");
        assert_eq!(parsed.full_signature(), "void a.B.c(int):436");
        assert_eq!(parsed.original_lines(), Some("436"));
    }

    #[test]
    fn parse_overloads_differ_in_full_signature() {
        let first = MemberSignature::parse("    1:1:void render(int):35:35 -> a").unwrap();
        let second = MemberSignature::parse("    1:1:void render(long):35:35 -> a").unwrap();
        assert_eq!(first.short_name(), second.short_name());
        assert_ne!(first.full_signature(), second.full_signature());
    }

    #[test]
    fn parse_unrenamed_member() {
        let parsed = MemberSignature::parse("    11:11:void <init>() -> <init>").unwrap();
        assert!(!parsed.is_renamed());

        let parsed = MemberSignature::parse("    int count -> count").unwrap();
        assert!(!parsed.is_renamed());

        let parsed = MemberSignature::parse("    int count -> a").unwrap();
        assert!(parsed.is_renamed());
    }

    #[test]
    fn parse_single_colon_is_not_a_line_range() {
        let parsed = MemberSignature::parse("    14:void a() -> b").unwrap();
        assert_eq!(parsed.line_range(), None);
        assert_eq!(parsed.full_signature(), "14:void a()");
        assert_eq!(parsed.short_name(), "a");
    }

    #[test]
    fn parse_missing_arrow() {
        assert_eq!(
            MemberSignature::parse("    int count"),
            Err(ParseErrorKind::MissingMemberArrow)
        );
        assert_eq!(
            MemberSignature::parse("    int count => a"),
            Err(ParseErrorKind::MissingMemberArrow)
        );
    }

    #[test]
    fn parse_missing_type_separator() {
        assert_eq!(
            MemberSignature::parse("    count->a"),
            Err(ParseErrorKind::MissingTypeSeparator)
        );
        assert_eq!(
            MemberSignature::parse("    count -> a"),
            Err(ParseErrorKind::MissingTypeSeparator)
        );
    }

    #[test]
    fn parse_unclosed_arguments() {
        assert_eq!(
            MemberSignature::parse("    void run(int -> a"),
            Err(ParseErrorKind::UnclosedArguments)
        );
    }
}
