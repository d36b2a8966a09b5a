//! Reconciliation of a previous build's mapping with the current build's mapping.
//!
//! When a project applies a previous mapping, classes and members whose keep
//! state changed between versions conflict with it. The merge keeps only what
//! both mappings agree should be obfuscated, and always takes the obfuscated
//! member names of the previous mapping, so the result is a subset of it that
//! can be applied to the current project.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::mapping::{ClassBlock, Line, MappingFile, ParseError};

/// Counts describing what a [`merge`] kept and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Classes in the previous mapping.
    pub old_classes: usize,
    /// Classes in the current mapping.
    pub current_classes: usize,
    /// Classes written to the merged mapping.
    pub classes_kept: usize,
    /// Current classes that do not exist in the previous mapping.
    pub classes_dropped_new: usize,
    /// Classes left without members.
    pub classes_dropped_empty: usize,
    /// Kept classes whose class line was taken from the previous mapping.
    pub class_names_reused: usize,
    /// Members written to the merged mapping.
    pub members_kept: usize,
    /// Members the current build did not rename.
    pub members_dropped_unobfuscated: usize,
    /// Members without a counterpart in the previous mapping.
    pub members_dropped_unmatched: usize,
}

/// The outcome of a [`merge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciled<'s> {
    /// The merged mapping, ready to be written.
    pub mapping: MappingFile<'s>,
    /// What was kept and dropped.
    pub summary: MergeSummary,
}

/// Merges the `current` mapping into the `old` one.
///
/// For every class of `current`, in order:
///
/// - classes missing from `old` are dropped,
/// - a class line that does not rename the class is replaced by the class line of `old`,
/// - members that are not renamed in `current` are dropped,
/// - other members are replaced by the `old` member line with the same full
///   signature, or dropped if there is none,
/// - classes left without members are dropped.
///
/// Fails if a member line of a class present in both mappings is malformed.
///
/// # Examples
///
/// ```
/// use proguard_reconcile::{merge, MappingFile};
///
/// let old = MappingFile::parse("a.B -> x.Y:\n    int f() -> g\n").unwrap();
/// let current = MappingFile::parse("a.B -> a.B:\n    int f() -> h\n").unwrap();
///
/// let merged = merge(&old, &current).unwrap();
/// assert_eq!(merged.mapping.to_string(), "a.B -> x.Y:\n    int f() -> g\n");
/// ```
pub fn merge<'s>(
    old: &MappingFile<'s>,
    current: &MappingFile<'s>,
) -> Result<Reconciled<'s>, ParseError> {
    let mut summary = MergeSummary {
        old_classes: old.len(),
        current_classes: current.len(),
        ..Default::default()
    };
    let mut classes = Vec::with_capacity(current.len().min(old.len()));

    for current_class in current.classes() {
        let Some(old_class) = old.get(current_class.key()) else {
            debug!(class = current_class.key(), "dropping class missing from the old mapping");
            summary.classes_dropped_new += 1;
            continue;
        };

        let members = merge_members(old_class, current_class, &mut summary)?;
        if members.is_empty() {
            debug!(class = current_class.key(), "dropping class without remaining members");
            summary.classes_dropped_empty += 1;
            continue;
        }

        // A class the current build did not rename takes its name from the old mapping.
        let header = if current_class.is_renamed() {
            current_class
        } else {
            summary.class_names_reused += 1;
            old_class
        };

        summary.classes_kept += 1;
        summary.members_kept += members.len();
        classes.push(ClassBlock {
            key: current_class.key,
            obfuscated: header.obfuscated,
            declaration: header.declaration,
            metadata: current_class.metadata.clone(),
            members,
        });
    }

    info!(
        classes = summary.classes_kept,
        members = summary.members_kept,
        "merged mappings"
    );

    let mapping = MappingFile::from_parts(
        current.preamble.clone(),
        classes,
        current.line_ending,
        current.trailing_newline,
    );
    Ok(Reconciled { mapping, summary })
}

/// Picks the old member lines for the renamed members of `current_class`.
fn merge_members<'s>(
    old_class: &ClassBlock<'s>,
    current_class: &ClassBlock<'s>,
    summary: &mut MergeSummary,
) -> Result<Vec<Line<'s>>, ParseError> {
    let old_members = index_members(old_class)?;
    let mut members = Vec::with_capacity(current_class.members().len());

    for line in current_class.members() {
        if line.is_comment() {
            continue;
        }

        let signature = line.signature()?;
        // Members the current build keeps stay under its own configuration,
        // even when the old mapping renamed them.
        if !signature.is_renamed() {
            summary.members_dropped_unobfuscated += 1;
            continue;
        }

        match old_members.get(signature.full_signature()) {
            Some(old_line) => members.push(*old_line),
            None => {
                debug!(
                    class = current_class.key(),
                    member = signature.full_signature(),
                    "dropping member missing from the old mapping"
                );
                summary.members_dropped_unmatched += 1;
            }
        }
    }

    Ok(members)
}

/// Indexes the member lines of a class by full signature, keeping the first line.
fn index_members<'s>(class: &ClassBlock<'s>) -> Result<HashMap<&'s str, Line<'s>>, ParseError> {
    let mut index = HashMap::with_capacity(class.members().len());
    for line in class.members() {
        if line.is_comment() {
            continue;
        }
        let signature = line.signature()?;
        index.entry(signature.full_signature()).or_insert(*line);
    }
    Ok(index)
}
