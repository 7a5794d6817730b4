use std::collections::BTreeMap;
use std::iter::Peekable;

use super::classify::{LineClassifier, LineKind};

pub const UNTITLED_CHAPTER: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuestion {
    pub ordinal: usize,
    /// Number printed in the question marker, if any.
    pub number: Option<usize>,
    pub body_text: String,
    pub options: BTreeMap<char, String>,
    pub correct_letter: Option<char>,
    pub explanation: Option<String>,
}

impl RawQuestion {
    fn open(ordinal: usize, number: Option<usize>, body_text: String) -> Self {
        Self {
            ordinal,
            number,
            body_text,
            options: BTreeMap::new(),
            correct_letter: None,
            explanation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub questions: Vec<RawQuestion>,
}

/// What a single (possibly lookahead-extended) line contributes to the
/// segmentation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEvent {
    Chapter(String),
    Question(Option<usize>, String),
    Choice(char, String),
    Answer(Option<char>),
    /// `(question number, letter)` rows following an `Answer Key` heading.
    AnswerKey(Vec<(usize, char)>),
    Explanation(String),
    /// `Solution to Question N` block, routed by number instead of to the
    /// open question.
    KeyedExplanation(usize, String),
    Plain,
}

/// Segmentation state. Each event consumes the state and returns the next
/// one; `finish` is the explicit end-of-input flush.
#[derive(Debug, Default)]
pub struct Segmenter {
    closed: Vec<Chapter>,
    chapter: Option<Chapter>,
    question: Option<RawQuestion>,
    /// Questions seen before the first chapter header.
    orphans: Vec<RawQuestion>,
    orphan_count: usize,
    /// Answer key and keyed solutions for the chapter being built; applied
    /// when it closes.
    answer_key: BTreeMap<usize, char>,
    keyed_explanations: BTreeMap<usize, String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub chapters: Vec<Chapter>,
    pub orphan_questions: usize,
}

impl Segmenter {
    pub fn apply(mut self, event: SegmentEvent) -> Self {
        match event {
            SegmentEvent::Chapter(title) => {
                self.close_question();
                self.close_chapter();
                let title = if title.is_empty() {
                    format!("Chapter {}", self.closed.len() + 1)
                } else {
                    title
                };
                self.chapter = Some(Chapter {
                    title,
                    questions: std::mem::take(&mut self.orphans),
                });
            }
            SegmentEvent::Question(number, body) => {
                self.close_question();
                let ordinal = match &self.chapter {
                    Some(chapter) => chapter.questions.len() + 1,
                    None => {
                        self.orphan_count += 1;
                        self.orphans.len() + 1
                    }
                };
                self.question = Some(RawQuestion::open(ordinal, number, body));
            }
            SegmentEvent::Choice(letter, text) => {
                if let Some(question) = self.question.as_mut() {
                    question.options.insert(letter.to_ascii_lowercase(), text);
                }
            }
            SegmentEvent::Answer(letter) => {
                if let (Some(question), Some(letter)) = (self.question.as_mut(), letter) {
                    question.correct_letter = Some(letter.to_ascii_lowercase());
                }
            }
            SegmentEvent::AnswerKey(entries) => {
                self.answer_key.extend(entries);
            }
            SegmentEvent::Explanation(text) => {
                if let Some(question) = self.question.as_mut() {
                    question.explanation = Some(text);
                }
            }
            SegmentEvent::KeyedExplanation(number, text) => {
                if !text.is_empty() {
                    let entry = self.keyed_explanations.entry(number).or_default();
                    append_sentence(entry, &text);
                }
            }
            SegmentEvent::Plain => {}
        }
        self
    }

    pub fn has_open_question(&self) -> bool {
        self.question.is_some()
    }

    pub fn finish(mut self) -> Segmentation {
        self.close_question();
        self.close_chapter();
        if !self.orphans.is_empty() {
            self.chapter = Some(Chapter {
                title: UNTITLED_CHAPTER.to_string(),
                questions: std::mem::take(&mut self.orphans),
            });
            self.close_chapter();
        }

        Segmentation {
            chapters: self.closed,
            orphan_questions: self.orphan_count,
        }
    }

    /// Moves the open chapter to the output after filling unanswered
    /// questions from the answer key and attaching keyed solutions. With no
    /// open chapter the keys stay pending for the questions still orphaned.
    fn close_chapter(&mut self) {
        let Some(mut chapter) = self.chapter.take() else {
            return;
        };
        let answer_key = std::mem::take(&mut self.answer_key);
        let mut keyed_explanations = std::mem::take(&mut self.keyed_explanations);

        for question in &mut chapter.questions {
            let number = question.number.unwrap_or(question.ordinal);
            if question.correct_letter.is_none() {
                question.correct_letter = answer_key.get(&number).copied();
            }
            if let Some(text) = keyed_explanations.remove(&number) {
                let explanation = question.explanation.get_or_insert_with(String::new);
                append_sentence(explanation, &text);
            }
        }

        self.closed.push(chapter);
    }

    fn close_question(&mut self) {
        let Some(question) = self.question.take() else {
            return;
        };
        match self.chapter.as_mut() {
            Some(chapter) => chapter.questions.push(question),
            None => self.orphans.push(question),
        }
    }
}

/// Runs one document's lines through the classifier and the state machine.
/// Blank lines carry no structure and are skipped.
pub fn segment_lines<'a, I>(classifier: &LineClassifier, lines: I) -> Segmentation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lines = lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| (classifier.classify(line), line))
        .peekable();

    let mut state = Segmenter::default();
    while let Some((kind, line)) = lines.next() {
        let keyed = matches!(kind, LineKind::AnswerLine | LineKind::ExplanationLine)
            .then(|| classifier.keyed_solution(line))
            .flatten();
        if let Some((number, text)) = keyed {
            let text = absorb_continuation(text, &mut lines);
            state = state.apply(SegmentEvent::KeyedExplanation(number, text));
            continue;
        }

        let event = match kind {
            LineKind::ChapterHeader => SegmentEvent::Chapter(classifier.chapter_title(line)),
            LineKind::QuestionStart => SegmentEvent::Question(
                classifier.question_number(line),
                classifier.question_body(line),
            ),
            LineKind::OptionLine => match classifier.option(line) {
                Some((letter, text)) => SegmentEvent::Choice(letter, text),
                None => SegmentEvent::Plain,
            },
            LineKind::AnswerLine => match classifier.answer_key_heading(line) {
                Some(inline) => {
                    let mut entries = classifier.answer_key_entries(inline);
                    entries.extend(absorb_answer_key(classifier, &mut lines));
                    SegmentEvent::AnswerKey(entries)
                }
                None => SegmentEvent::Answer(classifier.answer_letter(line)),
            },
            LineKind::ExplanationLine if state.has_open_question() => SegmentEvent::Explanation(
                absorb_continuation(classifier.explanation_text(line), &mut lines),
            ),
            LineKind::ExplanationLine => SegmentEvent::Plain,
            LineKind::Plain => SegmentEvent::Plain,
        };
        state = state.apply(event);
    }

    state.finish()
}

/// Appends every immediately following Plain line to `first`, space-joined.
/// The first non-Plain line is left in the stream for normal processing.
pub fn absorb_continuation<'a, I>(first: String, lines: &mut Peekable<I>) -> String
where
    I: Iterator<Item = (LineKind, &'a str)>,
{
    std::iter::from_fn(|| lines.next_if(|(kind, _)| *kind == LineKind::Plain))
        .fold(first, |mut text, (_, line)| {
            append_sentence(&mut text, line);
            text
        })
}

/// Consumes the answer key table rows that follow an `Answer Key` heading.
pub fn absorb_answer_key<'a, I>(
    classifier: &LineClassifier,
    lines: &mut Peekable<I>,
) -> Vec<(usize, char)>
where
    I: Iterator<Item = (LineKind, &'a str)>,
{
    std::iter::from_fn(|| {
        lines.next_if(|(kind, line)| {
            *kind == LineKind::Plain && classifier.is_answer_key_row(line)
        })
    })
    .flat_map(|(_, line)| classifier.answer_key_entries(line))
    .collect()
}

fn append_sentence(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}
