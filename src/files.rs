//! Running a merge or prune from files on disk.
//!
//! Both inputs are read and processed completely before the output file is
//! created, so a malformed input never leaves a partial output behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::mapping::{MappingFile, ParseError};
use crate::merge::{merge, MergeSummary};
use crate::prune::{prune, PruneReport};
use crate::warning::WarningLog;

/// File name of the mapping written by a merge.
pub const MERGED_MAPPING_FILE_NAME: &str = "new_mapping.txt";

/// File name of the mapping written by a prune.
pub const PRUNED_MAPPING_FILE_NAME: &str = "mapping_edit.txt";

/// An error running a merge or prune on files.
#[derive(Debug, Error)]
pub enum Error {
    /// An input file does not exist.
    #[error("file does not exist: {}", .path.display())]
    MissingFile {
        /// The missing path.
        path: PathBuf,
    },
    /// Reading an input or writing the output failed.
    #[error("failed to access {}", .path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// An input file is malformed.
    #[error("malformed input {}", .path.display())]
    Parse {
        /// The malformed file.
        path: PathBuf,
        /// The offending line.
        #[source]
        source: ParseError,
    },
    /// A member line of a class present in both mappings is malformed.
    #[error("malformed member while merging {} into {}", .current.display(), .old.display())]
    Merge {
        /// The previous build's mapping.
        old: PathBuf,
        /// The current build's mapping.
        current: PathBuf,
        /// The offending line.
        #[source]
        source: ParseError,
    },
}

/// Merges the mapping at `current` into the one at `old` and writes the result to `output`.
///
/// See [`merge`](crate::merge()) for the rules.
pub fn merge_files(old: &Path, current: &Path, output: &Path) -> Result<MergeSummary, Error> {
    ensure_exists(old)?;
    ensure_exists(current)?;

    let old_source = read(old)?;
    let current_source = read(current)?;
    let old_mapping = parse_mapping(old, &old_source)?;
    let current_mapping = parse_mapping(current, &current_source)?;

    let merged = merge(&old_mapping, &current_mapping).map_err(|source| Error::Merge {
        old: old.to_owned(),
        current: current.to_owned(),
        source,
    })?;

    write(output, &merged.mapping)?;
    Ok(merged.summary)
}

/// Removes the members named in the warning log at `warnings` from the mapping
/// at `mapping` and writes the result to `output`.
///
/// See [`prune`](crate::prune()) for the rules.
pub fn prune_files(mapping: &Path, warnings: &Path, output: &Path) -> Result<PruneReport, Error> {
    ensure_exists(mapping)?;
    ensure_exists(warnings)?;

    let mapping_source = read(mapping)?;
    let warnings_source = read(warnings)?;
    let parsed = parse_mapping(mapping, &mapping_source)?;
    let warning_log = WarningLog::new(&warnings_source)
        .parse()
        .map_err(|source| Error::Parse {
            path: warnings.to_owned(),
            source,
        })?;

    let pruned = prune(&parsed, &warning_log);

    write(output, &pruned.mapping)?;
    Ok(pruned.report)
}

fn ensure_exists(path: &Path) -> Result<(), Error> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::MissingFile {
            path: path.to_owned(),
        })
    }
}

fn read(path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|err| Error::Parse {
        path: path.to_owned(),
        source: ParseError::invalid_utf8(err.as_bytes(), err.utf8_error()),
    })
}

fn parse_mapping<'s>(path: &Path, source: &'s str) -> Result<MappingFile<'s>, Error> {
    let mapping = MappingFile::parse(source).map_err(|source| Error::Parse {
        path: path.to_owned(),
        source,
    })?;
    info!(
        path = %path.display(),
        classes = mapping.len(),
        members = mapping.member_count(),
        "parsed mapping"
    );
    Ok(mapping)
}

fn write(path: &Path, mapping: &MappingFile<'_>) -> Result<(), Error> {
    let rendered = mapping.to_string();
    fs::write(path, rendered).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    info!(path = %path.display(), classes = mapping.len(), "wrote mapping");
    Ok(())
}
