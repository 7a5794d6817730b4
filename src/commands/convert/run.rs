use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info};

use super::assemble::{
    Dataset, DocumentChapters, MASTER_INDEX_FILE, NormalizedChapter, assemble, chapter_file_name,
};
use super::classify::LineClassifier;
use super::normalize::normalize;
use super::segment::segment_lines;
use crate::cli::{ConvertArgs, manifest_dir_for, raw_text_path_for};
use crate::error::PipelineError;
use crate::model::{
    ConvertCounts, ConvertPaths, ConvertRunManifest, GuessedAnswer, RejectedQuestion, SourceText,
};
use crate::util::{ensure_directory, now_utc_string, read_json, utc_compact_string, write_json_pretty};

#[derive(Debug)]
pub(super) struct DocumentConversion {
    pub chapters: DocumentChapters,
    pub chapters_segmented: usize,
    pub questions_segmented: usize,
    pub orphan_questions: usize,
    pub rejections: Vec<RejectedQuestion>,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    let started_ts = Utc::now();
    let raw_text_path = raw_text_path_for(&args.work_root, args.raw_text_path.as_ref());
    let manifest_path = manifest_dir_for(&args.work_root).join(format!(
        "convert_run_{}.json",
        utc_compact_string(started_ts)
    ));

    info!(raw_text = %raw_text_path.display(), output_dir = %args.output_dir.display(), "starting convert");

    let manifest = convert_to_directory(
        &raw_text_path,
        &args.output_dir,
        format!("convert-{}", utc_compact_string(started_ts)),
    )?;
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        chapters = manifest.counts.chapters_retained,
        questions = manifest.counts.questions_retained,
        rejected = manifest.counts.questions_rejected,
        guessed_answers = manifest.counts.guessed_answers,
        path = %manifest_path.display(),
        "convert completed"
    );

    Ok(())
}

/// Reads the raw text dump, runs the extraction pipeline and writes the
/// chapter files plus the master index into `output_dir`. Nothing is written
/// when the dump is missing or unreadable.
pub(super) fn convert_to_directory(
    raw_text_path: &Path,
    output_dir: &Path,
    run_id: String,
) -> Result<ConvertRunManifest> {
    let started_at = now_utc_string();

    if !raw_text_path.exists() {
        return Err(PipelineError::MissingInput {
            artifact: raw_text_path.display().to_string(),
            stage: "extract",
        }
        .into());
    }

    let documents: Vec<SourceText> = read_json(raw_text_path)?;
    info!(documents = documents.len(), "loaded raw text dump");

    let classifier = LineClassifier::new()?;
    let conversions = convert_documents(&classifier, documents);

    let mut counts = ConvertCounts {
        documents: conversions.len(),
        ..ConvertCounts::default()
    };
    let mut rejections = Vec::new();
    let mut per_document = Vec::with_capacity(conversions.len());
    for conversion in conversions {
        counts.chapters_segmented += conversion.chapters_segmented;
        counts.questions_segmented += conversion.questions_segmented;
        counts.orphan_questions += conversion.orphan_questions;
        rejections.extend(conversion.rejections);
        per_document.push(conversion.chapters);
    }

    let dataset = assemble(per_document, now_utc_string());
    let guessed_answers = guessed_answers(&dataset);

    counts.chapters_retained = dataset.index.total_chapters;
    counts.empty_chapters_dropped = dataset.empty_chapters_dropped;
    counts.questions_retained = dataset.index.total_questions;
    counts.questions_rejected = rejections.len();
    counts.guessed_answers = guessed_answers.len();

    let master_index_path = write_dataset(output_dir, &dataset)?;

    Ok(ConvertRunManifest {
        manifest_version: 1,
        run_id,
        started_at,
        updated_at: now_utc_string(),
        paths: ConvertPaths {
            raw_text_path: raw_text_path.display().to_string(),
            output_dir: output_dir.display().to_string(),
            master_index_path: master_index_path.display().to_string(),
        },
        counts,
        rejections,
        guessed_answers,
    })
}

/// Segments and normalizes each document independently. Output order
/// matches input order regardless of which worker finishes first.
pub(super) fn convert_documents(
    classifier: &LineClassifier,
    documents: Vec<SourceText>,
) -> Vec<DocumentConversion> {
    documents
        .into_par_iter()
        .map(|document| convert_document(classifier, document))
        .collect()
}

pub(super) fn convert_document(
    classifier: &LineClassifier,
    document: SourceText,
) -> DocumentConversion {
    let segmentation = segment_lines(classifier, document.text.split('\n'));

    let chapters_segmented = segmentation.chapters.len();
    let mut questions_segmented = 0usize;
    let mut rejections = Vec::new();
    let mut chapters = Vec::with_capacity(chapters_segmented);

    for chapter in segmentation.chapters {
        questions_segmented += chapter.questions.len();
        let mut questions = Vec::with_capacity(chapter.questions.len());

        for (index, raw) in chapter.questions.into_iter().enumerate() {
            let ordinal = raw.ordinal;
            match normalize(raw, &chapter.title, index + 1) {
                Ok(question) => questions.push(question),
                Err(reason) => {
                    debug!(
                        source = %document.filename,
                        chapter = %chapter.title,
                        ordinal,
                        reason = %reason,
                        "question rejected"
                    );
                    rejections.push(RejectedQuestion {
                        source: document.filename.clone(),
                        chapter: chapter.title.clone(),
                        ordinal,
                        reason: reason.to_string(),
                    });
                }
            }
        }

        chapters.push(NormalizedChapter {
            title: chapter.title,
            questions,
        });
    }

    info!(
        source = %document.filename,
        chapters = chapters_segmented,
        questions = questions_segmented,
        rejected = rejections.len(),
        "segmented document"
    );

    DocumentConversion {
        chapters: DocumentChapters {
            source: document.filename,
            chapters,
        },
        chapters_segmented,
        questions_segmented,
        orphan_questions: segmentation.orphan_questions,
        rejections,
    }
}

fn guessed_answers(dataset: &Dataset) -> Vec<GuessedAnswer> {
    dataset
        .chapters
        .iter()
        .flat_map(|chapter| {
            chapter
                .dataset
                .questions
                .iter()
                .filter(|question| question.correct_is_guessed)
                .map(move |question| GuessedAnswer {
                    chapter_id: chapter.id,
                    question_id: question.id,
                })
        })
        .inspect(|guess| {
            debug!(
                chapter_id = guess.chapter_id,
                question_id = guess.question_id,
                "correct answer defaulted to first option"
            )
        })
        .collect()
}

/// Replaces the chapter files in `output_dir` with this run's chapters and
/// writes the master index last.
pub(super) fn write_dataset(output_dir: &Path, dataset: &Dataset) -> Result<PathBuf> {
    ensure_directory(output_dir)?;
    let removed = remove_stale_chapter_files(output_dir)?;
    if removed > 0 {
        debug!(removed, "removed chapter files from previous run");
    }

    for chapter in &dataset.chapters {
        let path = output_dir.join(chapter_file_name(chapter.id));
        write_json_pretty(&path, &chapter.dataset)?;
        info!(
            id = chapter.id,
            title = %chapter.dataset.chapter,
            questions = chapter.dataset.total_questions,
            "wrote chapter"
        );
    }

    let master_index_path = output_dir.join(MASTER_INDEX_FILE);
    write_json_pretty(&master_index_path, &dataset.index)?;
    info!(
        path = %master_index_path.display(),
        chapters = dataset.index.total_chapters,
        questions = dataset.index.total_questions,
        "wrote master index"
    );

    Ok(master_index_path)
}

fn remove_stale_chapter_files(output_dir: &Path) -> Result<usize> {
    let mut removed = 0usize;
    let entries = fs::read_dir(output_dir)
        .with_context(|| format!("failed to read {}", output_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", output_dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_chapter_file_name(name) {
            let path = entry.path();
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            removed += 1;
        }
    }

    Ok(removed)
}

fn is_chapter_file_name(name: &str) -> bool {
    name.strip_prefix("chapter")
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|id| !id.is_empty() && id.chars().all(|character| character.is_ascii_digit()))
}
