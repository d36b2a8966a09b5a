//! Removal of the members named by proguard warnings from a mapping.

use serde::Serialize;
use tracing::{info, warn};

use crate::mapping::{ClassBlock, Line, MappingFile};
use crate::warning::Warning;

/// A warning that could not be applied to the mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedWarning {
    /// The class of the warning is not (or no longer) part of the mapping.
    UnknownClass {
        /// Line of the warning in the warning log.
        line_number: usize,
        /// Original name of the class.
        class: String,
    },
    /// No member line of the class contains the warning's member.
    MemberNotFound {
        /// Line of the warning in the warning log.
        line_number: usize,
        /// Original name of the class.
        class: String,
        /// The searched `member -> obfuscated` text.
        member: String,
    },
}

/// What a [`prune`] removed and which warnings it could not apply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Number of warnings processed.
    pub warnings: usize,
    /// Number of member lines removed.
    pub members_removed: usize,
    /// Classes removed because they lost their last member, in removal order.
    pub classes_dropped: Vec<String>,
    /// Warnings that did not match the mapping.
    pub unresolved: Vec<UnresolvedWarning>,
}

/// The outcome of a [`prune`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pruned<'s> {
    /// The pruned mapping, ready to be written.
    pub mapping: MappingFile<'s>,
    /// What was removed.
    pub report: PruneReport,
}

/// Removes the member named by each warning from `mapping`.
///
/// Every warning removes at most one line: the first member line of its class
/// containing `member -> obfuscated`. A class that loses its last member is
/// dropped right away, so later warnings for it are reported as unresolved.
/// Unresolved warnings never abort pruning.
///
/// # Examples
///
/// ```
/// use proguard_reconcile::{prune, MappingFile, WarningLog};
///
/// let mapping = MappingFile::parse("a.B -> x.Y:\n    int f -> a\n    int g -> b\n").unwrap();
/// let warnings = WarningLog::new(
///     "Warning: a.B: field 'int f' is not being kept as 'c', but remapped to 'a'",
/// )
/// .parse()
/// .unwrap();
///
/// let pruned = prune(&mapping, &warnings);
/// assert_eq!(pruned.mapping.to_string(), "a.B -> x.Y:\n    int g -> b\n");
/// assert_eq!(pruned.report.members_removed, 1);
/// ```
pub fn prune<'s>(mapping: &MappingFile<'s>, warnings: &[Warning<'_>]) -> Pruned<'s> {
    let mut report = PruneReport {
        warnings: warnings.len(),
        ..Default::default()
    };
    // `None` marks a class that has been dropped.
    let mut members: Vec<Option<Vec<Line<'s>>>> = mapping
        .classes()
        .iter()
        .map(|class| Some(class.members().to_vec()))
        .collect();

    for warning in warnings {
        let slot = match mapping.position(warning.class()) {
            Some(idx) => members[idx].as_mut().map(|class_members| (idx, class_members)),
            None => None,
        };
        let Some((idx, class_members)) = slot else {
            warn!(
                class = warning.class(),
                line = warning.line_number(),
                "can't find warning class in the mapping file"
            );
            report.unresolved.push(UnresolvedWarning::UnknownClass {
                line_number: warning.line_number(),
                class: warning.class().to_owned(),
            });
            continue;
        };

        let pattern = warning.search_pattern();
        match class_members
            .iter()
            .position(|line| line.as_str().contains(&pattern))
        {
            Some(pos) => {
                class_members.remove(pos);
                report.members_removed += 1;
            }
            None => {
                warn!(
                    class = warning.class(),
                    member = %pattern,
                    line = warning.line_number(),
                    "can't find warning field or method in the mapping file"
                );
                report.unresolved.push(UnresolvedWarning::MemberNotFound {
                    line_number: warning.line_number(),
                    class: warning.class().to_owned(),
                    member: pattern,
                });
            }
        }

        if class_members.is_empty() {
            members[idx] = None;
            report.classes_dropped.push(warning.class().to_owned());
        }
    }

    let classes = mapping
        .classes()
        .iter()
        .zip(members)
        .filter_map(|(class, members)| {
            Some(ClassBlock {
                key: class.key,
                obfuscated: class.obfuscated,
                declaration: class.declaration,
                metadata: class.metadata.clone(),
                members: members?,
            })
        })
        .collect();

    info!(
        removed = report.members_removed,
        unresolved = report.unresolved.len(),
        "pruned mapping"
    );

    let mapping = MappingFile::from_parts(
        mapping.preamble.clone(),
        classes,
        mapping.line_ending,
        mapping.trailing_newline,
    );
    Pruned { mapping, report }
}
