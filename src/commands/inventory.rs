use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{InventoryArgs, manifest_dir_for};
use crate::model::{DocumentFailure, SourceEntry, SourceInventory, SourceKind};
use crate::util::{ensure_directory, now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let (inventory, failures) = build_inventory(&args.input_dir)?;

    if args.dry_run {
        for entry in &inventory.documents {
            info!(filename = %entry.filename, kind = entry.kind.as_str(), "would process");
        }
        info!(
            document_count = inventory.document_count,
            unreadable = failures.len(),
            source = %inventory.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| inventory_path_for(&args.work_root));

    write_json_pretty(&manifest_path, &inventory)?;
    info!(path = %manifest_path.display(), "wrote source inventory");
    info!(
        document_count = inventory.document_count,
        unreadable = failures.len(),
        "inventory completed"
    );

    Ok(())
}

pub fn inventory_path_for(work_root: &Path) -> PathBuf {
    manifest_dir_for(work_root).join("source_inventory.json")
}

/// Lists supported documents in `input_dir`, sorted by filename. Files that
/// cannot be hashed are reported as failures and left out of the inventory.
pub fn build_inventory(input_dir: &Path) -> Result<(SourceInventory, Vec<DocumentFailure>)> {
    if !input_dir.exists() {
        ensure_directory(input_dir)?;
        warn!(path = %input_dir.display(), "input directory was missing and has been created");
    }

    let mut paths = discover_documents(input_dir)?;
    paths.sort_by(|a, b| a.0.cmp(&b.0));

    if paths.is_empty() {
        warn!(
            path = %input_dir.display(),
            "no .pdf, .html or .txt documents found; copy study material into this directory and rerun"
        );
    }

    let mut documents = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for (path, kind) in paths {
        let filename = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_string(),
            None => {
                warn!(path = %path.display(), "skipping document with non UTF-8 filename");
                failures.push(DocumentFailure {
                    filename: path.display().to_string(),
                    reason: "non UTF-8 filename".to_string(),
                });
                continue;
            }
        };

        match sha256_file(&path) {
            Ok(sha256) => documents.push(SourceEntry {
                filename,
                kind,
                sha256,
            }),
            Err(error) => {
                warn!(filename = %filename, error = %error, "skipping unreadable document");
                failures.push(DocumentFailure {
                    filename,
                    reason: format!("{error:#}"),
                });
            }
        }
    }

    documents.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok((
        SourceInventory {
            manifest_version: 1,
            generated_at: now_utc_string(),
            source_directory: input_dir.display().to_string(),
            document_count: documents.len(),
            documents,
        },
        failures,
    ))
}

fn discover_documents(input_dir: &Path) -> Result<Vec<(PathBuf, SourceKind)>> {
    let mut documents = Vec::new();

    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read {}", input_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let kind = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(SourceKind::from_filename);

        if let Some(kind) = kind {
            documents.push((path, kind));
        }
    }

    Ok(documents)
}
