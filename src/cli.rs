use std::path::PathBuf;

use clap::{Parser, Subcommand};

use proguard_reconcile::{MERGED_MAPPING_FILE_NAME, PRUNED_MAPPING_FILE_NAME};

/// Reconcile proguard mapping files for mapping reuse across builds
#[derive(Parser, Debug)]
#[command(name = "proguard-reconcile", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Directory the output mapping is written to
    #[arg(long, global = true, env = "PROGUARD_RECONCILE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path of the output mapping, overrides --output-dir
    #[arg(long, short, global = true)]
    pub output: Option<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the current build's mapping into the previous build's mapping (new_mapping.txt)
    Merge {
        /// Mapping of the previous version
        old_mapping: PathBuf,
        /// Mapping of the current project, built without applymapping
        current_mapping: PathBuf,
    },
    /// Remove the members named by proguard warnings from a mapping (mapping_edit.txt)
    Prune {
        /// Mapping to prune
        mapping: PathBuf,
        /// Proguard output containing the `Warning:` lines
        warnings: PathBuf,
    },
}

impl Args {
    pub fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }

        let file_name = match self.command {
            Command::Merge { .. } => MERGED_MAPPING_FILE_NAME,
            Command::Prune { .. } => PRUNED_MAPPING_FILE_NAME,
        };
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_paths() {
        let args = Args::parse_from(["proguard-reconcile", "merge", "old.txt", "current.txt"]);
        assert_eq!(args.output_path(), PathBuf::from("./new_mapping.txt"));

        let args = Args::parse_from(["proguard-reconcile", "prune", "mapping.txt", "warn.txt"]);
        assert_eq!(args.output_path(), PathBuf::from("./mapping_edit.txt"));
    }

    #[test]
    fn output_overrides() {
        let args = Args::parse_from([
            "proguard-reconcile",
            "merge",
            "old.txt",
            "current.txt",
            "--output-dir",
            "build",
        ]);
        assert_eq!(args.output_path(), PathBuf::from("build/new_mapping.txt"));

        let args = Args::parse_from([
            "proguard-reconcile",
            "prune",
            "mapping.txt",
            "warn.txt",
            "-o",
            "out.txt",
            "--output-dir",
            "build",
        ]);
        assert_eq!(args.output_path(), PathBuf::from("out.txt"));
    }

    #[test]
    fn missing_arguments() {
        assert!(Args::try_parse_from(["proguard-reconcile", "merge", "old.txt"]).is_err());
        assert!(Args::try_parse_from(["proguard-reconcile"]).is_err());
    }
}
