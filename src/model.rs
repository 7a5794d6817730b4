use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Pdf,
    Html,
    Text,
}

impl SourceKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "html" | "htm" => Some(Self::Html),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    pub filename: String,
    pub kind: SourceKind,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInventory {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub document_count: usize,
    pub documents: Vec<SourceEntry>,
}

/// One decoded document as handed from `extract` to `convert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceText {
    pub filename: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedQuestion {
    pub id: usize,
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct: String,
    pub correct_is_guessed: bool,
    pub explanation: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDataset {
    pub chapter: String,
    pub description: String,
    pub total_questions: usize,
    pub questions: Vec<NormalizedQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterIndexEntry {
    pub id: usize,
    pub title: String,
    pub description: String,
    pub total_questions: usize,
    pub source: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterIndex {
    pub generated_at: String,
    pub total_chapters: usize,
    pub total_questions: usize,
    pub chapters: Vec<MasterIndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPaths {
    pub input_dir: String,
    pub inventory_path: String,
    pub raw_text_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractCounts {
    pub documents_discovered: usize,
    pub documents_extracted: usize,
    pub documents_failed: usize,
    pub pdf_pages: usize,
    pub running_lines_removed: usize,
    pub dehyphenation_merges: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFailure {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub updated_at: String,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub failures: Vec<DocumentFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertPaths {
    pub raw_text_path: String,
    pub output_dir: String,
    pub master_index_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertCounts {
    pub documents: usize,
    pub chapters_segmented: usize,
    pub chapters_retained: usize,
    pub empty_chapters_dropped: usize,
    pub questions_segmented: usize,
    pub questions_retained: usize,
    pub questions_rejected: usize,
    pub guessed_answers: usize,
    pub orphan_questions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedQuestion {
    pub source: String,
    pub chapter: String,
    pub ordinal: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessedAnswer {
    pub chapter_id: usize,
    pub question_id: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub updated_at: String,
    pub paths: ConvertPaths,
    pub counts: ConvertCounts,
    pub rejections: Vec<RejectedQuestion>,
    pub guessed_answers: Vec<GuessedAnswer>,
}
