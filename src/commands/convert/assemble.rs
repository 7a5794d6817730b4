use crate::model::{ChapterDataset, MasterIndex, MasterIndexEntry, NormalizedQuestion};

pub const MASTER_INDEX_FILE: &str = "MASTER_INDEX.json";

const DESCRIPTION_POOL: &[&str] = &[
    "Comprehensive questions and explanations",
    "Detailed MCQs with answer explanations",
    "Practice questions with detailed solutions",
    "MCQ bank with comprehensive coverage",
    "Question bank with explanatory answers",
];

#[derive(Debug, Clone)]
pub struct NormalizedChapter {
    pub title: String,
    pub questions: Vec<NormalizedQuestion>,
}

/// Normalized chapters of one source document, in document order.
#[derive(Debug, Clone)]
pub struct DocumentChapters {
    pub source: String,
    pub chapters: Vec<NormalizedChapter>,
}

#[derive(Debug, Clone)]
pub struct AssembledChapter {
    pub id: usize,
    pub source: String,
    pub dataset: ChapterDataset,
}

#[derive(Debug)]
pub struct Dataset {
    pub chapters: Vec<AssembledChapter>,
    pub index: MasterIndex,
    pub empty_chapters_dropped: usize,
}

/// Hands out global chapter ids: 1, 2, 3, ... with no reuse.
#[derive(Debug)]
struct ChapterIdAllocator {
    next: usize,
}

impl ChapterIdAllocator {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn allocate(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }
}

pub fn chapter_file_name(id: usize) -> String {
    format!("chapter{id}.json")
}

pub fn chapter_link(id: usize) -> String {
    format!("quiz.html?chapter={id}")
}

pub fn description_for(id: usize) -> &'static str {
    DESCRIPTION_POOL[id.saturating_sub(1) % DESCRIPTION_POOL.len()]
}

/// Builds the chapter datasets and the master index. Documents are ordered
/// by source filename before ids are assigned, so ids do not depend on the
/// order documents finished decoding. Chapters without questions get no id.
pub fn assemble(mut documents: Vec<DocumentChapters>, generated_at: String) -> Dataset {
    documents.sort_by(|a, b| a.source.cmp(&b.source));

    let mut allocator = ChapterIdAllocator::new();
    let mut chapters = Vec::<AssembledChapter>::new();
    let mut empty_chapters_dropped = 0usize;

    for document in documents {
        for chapter in document.chapters {
            if chapter.questions.is_empty() {
                empty_chapters_dropped += 1;
                continue;
            }

            let id = allocator.allocate();
            chapters.push(AssembledChapter {
                id,
                source: document.source.clone(),
                dataset: ChapterDataset {
                    chapter: chapter.title,
                    description: description_for(id).to_string(),
                    total_questions: chapter.questions.len(),
                    questions: chapter.questions,
                },
            });
        }
    }

    let entries = chapters
        .iter()
        .map(|chapter| MasterIndexEntry {
            id: chapter.id,
            title: chapter.dataset.chapter.clone(),
            description: chapter.dataset.description.clone(),
            total_questions: chapter.dataset.total_questions,
            source: chapter.source.clone(),
            link: chapter_link(chapter.id),
        })
        .collect::<Vec<MasterIndexEntry>>();

    let index = MasterIndex {
        generated_at,
        total_chapters: entries.len(),
        total_questions: entries.iter().map(|entry| entry.total_questions).sum(),
        chapters: entries,
    };

    Dataset {
        chapters,
        index,
        empty_chapters_dropped,
    }
}
