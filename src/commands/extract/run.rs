use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use tracing::{info, warn};

use super::cleanup::clean_text;
use super::html_text::HtmlStripper;
use super::pdf_text::extract_pdf_text;
use crate::cli::{ExtractArgs, manifest_dir_for, raw_text_path_for};
use crate::commands::inventory::{build_inventory, inventory_path_for};
use crate::error::PipelineError;
use crate::model::{
    DocumentFailure, ExtractCounts, ExtractPaths, ExtractRunManifest, SourceEntry, SourceKind,
    SourceText,
};
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

#[derive(Debug)]
pub(super) struct AcquiredText {
    pub text: String,
    pub pdf_pages: usize,
    pub running_lines_removed: usize,
    pub dehyphenation_merges: usize,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("extract-{}", utc_compact_string(started_ts));

    let inventory_path = inventory_path_for(&args.work_root);
    let raw_text_path = raw_text_path_for(&args.work_root, args.raw_text_path.as_ref());
    let manifest_path = manifest_dir_for(&args.work_root).join(format!(
        "extract_run_{}.json",
        utc_compact_string(started_ts)
    ));

    info!(input_dir = %args.input_dir.display(), run_id = %run_id, "starting extract");

    let (inventory, mut failures) = build_inventory(&args.input_dir)?;
    write_json_pretty(&inventory_path, &inventory)?;

    let stripper = HtmlStripper::new()?;
    let outcomes = inventory
        .documents
        .par_iter()
        .map(|entry| {
            let outcome = acquire(&args.input_dir, entry, args.max_pages_per_doc, &stripper);
            (entry, outcome)
        })
        .collect::<Vec<_>>();

    let mut counts = ExtractCounts {
        documents_discovered: inventory.document_count + failures.len(),
        ..ExtractCounts::default()
    };
    let mut documents = Vec::with_capacity(outcomes.len());

    for (entry, outcome) in outcomes {
        match outcome {
            Ok(acquired) => {
                info!(
                    filename = %entry.filename,
                    kind = entry.kind.as_str(),
                    chars = acquired.text.chars().count(),
                    "extracted document text"
                );
                counts.pdf_pages += acquired.pdf_pages;
                counts.running_lines_removed += acquired.running_lines_removed;
                counts.dehyphenation_merges += acquired.dehyphenation_merges;
                documents.push(SourceText {
                    filename: entry.filename.clone(),
                    text: acquired.text,
                    sha256: Some(entry.sha256.clone()),
                });
            }
            Err(error) => {
                warn!(error = %error, "document skipped");
                failures.push(DocumentFailure {
                    filename: entry.filename.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    counts.documents_extracted = documents.len();
    counts.documents_failed = failures.len();

    write_json_pretty(&raw_text_path, &documents)?;
    info!(path = %raw_text_path.display(), documents = documents.len(), "wrote raw text dump");

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        started_at,
        updated_at: now_utc_string(),
        paths: ExtractPaths {
            input_dir: args.input_dir.display().to_string(),
            inventory_path: inventory_path.display().to_string(),
            raw_text_path: raw_text_path.display().to_string(),
        },
        counts,
        failures,
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        extracted = manifest.counts.documents_extracted,
        failed = manifest.counts.documents_failed,
        path = %manifest_path.display(),
        "extract completed"
    );

    Ok(())
}

pub(super) fn acquire(
    input_dir: &Path,
    entry: &SourceEntry,
    max_pages: Option<usize>,
    stripper: &HtmlStripper,
) -> Result<AcquiredText, PipelineError> {
    decode(&input_dir.join(&entry.filename), entry.kind, max_pages, stripper).map_err(|error| {
        PipelineError::Acquisition {
            filename: entry.filename.clone(),
            reason: format!("{error:#}"),
        }
    })
}

fn decode(
    path: &Path,
    kind: SourceKind,
    max_pages: Option<usize>,
    stripper: &HtmlStripper,
) -> Result<AcquiredText> {
    match kind {
        SourceKind::Pdf => {
            let pdf = extract_pdf_text(path, max_pages)?;
            Ok(AcquiredText {
                text: clean_text(&pdf.text),
                pdf_pages: pdf.page_count,
                running_lines_removed: pdf.running_lines_removed,
                dehyphenation_merges: pdf.dehyphenation_merges,
            })
        }
        SourceKind::Html => {
            let raw = read_lossy(path)?;
            Ok(plain(clean_text(&stripper.strip(&raw))))
        }
        SourceKind::Text => {
            let raw = read_lossy(path)?;
            Ok(plain(clean_text(&raw)))
        }
    }
}

fn plain(text: String) -> AcquiredText {
    AcquiredText {
        text,
        pdf_pages: 0,
        running_lines_removed: 0,
        dehyphenation_merges: 0,
    }
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
