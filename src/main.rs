mod cli;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, the mapping is always written to a file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output = args.output_path();

    match &args.command {
        Command::Merge {
            old_mapping,
            current_mapping,
        } => {
            let summary = proguard_reconcile::merge_files(old_mapping, current_mapping, &output)
                .context("failed to merge mappings")?;
            info!(
                kept = summary.classes_kept,
                new = summary.classes_dropped_new,
                empty = summary.classes_dropped_empty,
                "merged classes"
            );
            write_report(args.report.as_deref(), &summary)?;
        }
        Command::Prune { mapping, warnings } => {
            let report = proguard_reconcile::prune_files(mapping, warnings, &output)
                .context("failed to prune mapping")?;
            info!(
                removed = report.members_removed,
                unresolved = report.unresolved.len(),
                "pruned members"
            );
            write_report(args.report.as_deref(), &report)?;
        }
    }

    #[cfg(feature = "uuid")]
    {
        let written = std::fs::read(&output)
            .with_context(|| format!("failed to read back {}", output.display()))?;
        info!(uuid = %proguard_reconcile::mapping_uuid(&written), "mapping uuid");
    }

    println!("{}", output.display());
    Ok(())
}

fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("failed to create report {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
