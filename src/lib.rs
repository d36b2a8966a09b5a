//! This crate reconciles proguard mapping files across builds.
//!
//! When a project reuses the mapping of a previous build (`-applymapping`),
//! classes and members whose keep state changed between the two versions
//! conflict with the reused mapping. This crate offers two ways out:
//!
//! - [`merge`] the previous mapping with the mapping of a fresh build, keeping
//!   only what both agree should be obfuscated, under the previous names;
//! - [`prune`] the members that proguard reported as conflicting from a mapping.
//!
//! Both operate on class blocks parsed by [`MappingFile`] and write every
//! surviving line back verbatim.
//!
//! # Examples
//!
//! ```
//! use proguard_reconcile::{merge, MappingFile};
//!
//! let old = MappingFile::parse(
//!     "\
//! com.example.Main -> a.a:
//!     int count -> a
//!     1:1:void render(int):35:35 -> b
//!     1:1:void render(long):40:40 -> c
//! ",
//! )
//! .unwrap();
//! let current = MappingFile::parse(
//!     "\
//! com.example.Main -> com.example.Main:
//!     int count -> count
//!     1:1:void render(long):40:40 -> a
//!     1:1:void render(int):35:35 -> b
//! ",
//! )
//! .unwrap();
//!
//! let merged = merge(&old, &current).unwrap();
//! assert_eq!(
//!     merged.mapping.to_string(),
//!     "\
//! com.example.Main -> a.a:
//!     1:1:void render(long):40:40 -> c
//!     1:1:void render(int):35:35 -> b
//! "
//! );
//! ```

#![warn(missing_docs)]

mod files;
mod mapping;
mod merge;
mod prune;
mod signature;
mod utils;
mod warning;

pub use files::{
    merge_files, prune_files, Error, MERGED_MAPPING_FILE_NAME, PRUNED_MAPPING_FILE_NAME,
};
pub use mapping::{ClassBlock, Line, MappingFile, ParseError, ParseErrorKind};
pub use merge::{merge, MergeSummary, Reconciled};
pub use prune::{prune, PruneReport, Pruned, UnresolvedWarning};
pub use signature::MemberSignature;
pub use warning::{Warning, WarningIter, WarningLog};

#[cfg(feature = "uuid")]
use uuid::Uuid;

/// Calculates the UUID of the mapping file.
#[cfg(feature = "uuid")]
pub fn mapping_uuid(mapping: &[u8]) -> Uuid {
    lazy_static::lazy_static! {
        static ref NAMESPACE: Uuid = Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"guardsquare.com");
    }
    // this internally only operates on bytes, so this is safe to do
    Uuid::new_v5(&NAMESPACE, mapping)
}
