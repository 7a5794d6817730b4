use std::collections::BTreeMap;

use thiserror::Error;

use super::segment::RawQuestion;
use crate::model::NormalizedQuestion;

pub const REQUIRED_OPTION_COUNT: usize = 4;
pub const DEFAULT_EXPLANATION: &str = "Explanation not extracted";
pub const TAG_VOCABULARY: &[&str] = &["diagnosis", "treatment", "symptoms", "management", "etiology"];
const MAX_TAGS: usize = 3;

/// Why a raw question did not make it into the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("question text is empty")]
    EmptyQuestion,
    #[error("only {found} options present, {} required", REQUIRED_OPTION_COUNT)]
    TooFewOptions { found: usize },
    #[error("option {letter} has no text")]
    EmptyOption { letter: char },
}

/// Turns a segmented question into a dataset record. Every field has a
/// fallback; only the final validation of text and options can reject.
pub fn normalize(
    raw: RawQuestion,
    chapter_title: &str,
    fallback_ordinal: usize,
) -> Result<NormalizedQuestion, Rejection> {
    let question = raw.body_text.trim().to_string();

    let options = raw
        .options
        .into_iter()
        .map(|(letter, text)| (letter.to_ascii_lowercase(), text.trim().to_string()))
        .collect::<BTreeMap<char, String>>();

    if question.is_empty() {
        return Err(Rejection::EmptyQuestion);
    }
    if options.len() < REQUIRED_OPTION_COUNT {
        return Err(Rejection::TooFewOptions {
            found: options.len(),
        });
    }
    if let Some((letter, _)) = options.iter().find(|(_, text)| text.is_empty()) {
        return Err(Rejection::EmptyOption { letter: *letter });
    }

    let explicit = raw
        .correct_letter
        .map(|letter| letter.to_ascii_lowercase())
        .filter(|letter| options.contains_key(letter));
    let (correct, correct_is_guessed) = match explicit {
        Some(letter) => (letter, false),
        // Known-weak default: first option key, flagged as guessed.
        None => match options.keys().next() {
            Some(letter) => (*letter, true),
            None => return Err(Rejection::TooFewOptions { found: 0 }),
        },
    };

    let explanation = raw
        .explanation
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

    let tags = derive_tags(&question, chapter_title);
    let id = if raw.ordinal >= 1 {
        raw.ordinal
    } else {
        fallback_ordinal
    };

    Ok(NormalizedQuestion {
        id,
        question,
        options: options
            .into_iter()
            .map(|(letter, text)| (letter.to_string(), text))
            .collect(),
        correct: correct.to_string(),
        correct_is_guessed,
        explanation,
        image: None,
        tags,
    })
}

/// First word of the chapter title, then vocabulary terms found in the
/// question, in vocabulary order; deduplicated and capped at three.
pub fn derive_tags(question: &str, chapter_title: &str) -> Vec<String> {
    let mut tags = Vec::<String>::new();

    if let Some(token) = chapter_title.split_whitespace().next() {
        tags.push(token.to_lowercase());
    }

    let lowered = question.to_lowercase();
    for term in TAG_VOCABULARY {
        if lowered.contains(term) && !tags.iter().any(|tag| tag == term) {
            tags.push((*term).to_string());
        }
    }

    tags.truncate(MAX_TAGS);
    tags
}
