use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    ChapterHeader,
    QuestionStart,
    OptionLine,
    AnswerLine,
    ExplanationLine,
    Plain,
}

impl LineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LineKind::ChapterHeader => "chapter_header",
            LineKind::QuestionStart => "question_start",
            LineKind::OptionLine => "option_line",
            LineKind::AnswerLine => "answer_line",
            LineKind::ExplanationLine => "explanation_line",
            LineKind::Plain => "plain",
        }
    }
}

/// Classification rules in precedence order; the first matching pattern wins.
/// A header must never be mistaken for a question, and a question stem such
/// as "1. Which is correct?" must never reach the answer rule.
pub const CLASSIFIER_RULES: &[(LineKind, &str)] = &[
    (LineKind::ChapterHeader, r"^#{1,6}\s+"),
    (LineKind::ChapterHeader, r"(?i)^chapter\s+\d+"),
    (LineKind::ChapterHeader, r"^[A-Z][A-Z\s]{10,}"),
    (LineKind::QuestionStart, r"^Question\s*\d+"),
    (LineKind::QuestionStart, r"^Q\.?\s*\d+"),
    (LineKind::QuestionStart, r"^\d+\.\s+[A-Z]"),
    (LineKind::OptionLine, r"(?i)^[a-d][).]\s+"),
    (LineKind::AnswerLine, r"(?i)\b(?:answers?|correct)\b"),
    (LineKind::ExplanationLine, r"(?i)explanation|solution|detailed"),
];

#[derive(Debug)]
struct ClassifierRule {
    kind: LineKind,
    pattern: Regex,
}

/// Pure, per-line classifier plus the field extractors that go with each
/// line kind. Holds only compiled patterns, so one instance is shared across
/// documents and threads.
#[derive(Debug)]
pub struct LineClassifier {
    rules: Vec<ClassifierRule>,
    chapter_prefix: Regex,
    question_prefix: Regex,
    question_number: Regex,
    option_capture: Regex,
    answer_letter: Regex,
    answer_key_heading: Regex,
    answer_key_row: Regex,
    answer_key_entry: Regex,
    explanation_label: Regex,
    keyed_solution: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self> {
        let rules = CLASSIFIER_RULES
            .iter()
            .map(|(kind, pattern)| {
                Ok(ClassifierRule {
                    kind: *kind,
                    pattern: Regex::new(pattern).with_context(|| {
                        format!("failed to compile {} rule: {pattern}", kind.as_str())
                    })?,
                })
            })
            .collect::<Result<Vec<ClassifierRule>>>()?;

        Ok(Self {
            rules,
            chapter_prefix: Regex::new(r"(?i)^(?:#{1,6}\s+|chapter\s+\d+\s*[:.\-]?\s*)")
                .context("failed to compile chapter prefix regex")?,
            question_prefix: Regex::new(
                r"(?i)^(?:question\s*\d+\s*[:.]?\s*|q\.?\s*\d+\s*[:.]?\s*|\d+\.\s*)",
            )
            .context("failed to compile question prefix regex")?,
            question_number: Regex::new(r"(?i)^(?:question\s*|q\.?\s*)?(?P<number>\d+)")
                .context("failed to compile question number regex")?,
            option_capture: Regex::new(r"(?i)^(?P<letter>[a-d])[).]\s*(?P<text>.*)$")
                .context("failed to compile option capture regex")?,
            answer_letter: Regex::new(r"(?i)\b(?P<letter>[a-d])\b")
                .context("failed to compile answer letter regex")?,
            answer_key_heading: Regex::new(r"(?i)\banswers?\s+keys?\b\s*[:.\-]?")
                .context("failed to compile answer key heading regex")?,
            answer_key_row: Regex::new(r"(?i)^(?:\d{1,4}\s*[-.):]?\s*[a-d]\b\s*)+$")
                .context("failed to compile answer key row regex")?,
            answer_key_entry: Regex::new(
                r"(?i)(?P<number>\d{1,4})\s*[-.):]?\s*(?P<letter>[a-d])\b",
            )
            .context("failed to compile answer key entry regex")?,
            explanation_label: Regex::new(
                r"(?i)^(?:detailed\s+(?:explanation|solution)|explanation|solution|detailed)\s*[:.\-]?\s*",
            )
            .context("failed to compile explanation label regex")?,
            keyed_solution: Regex::new(
                r"(?i)^solution\s+to\s+question\s+(?P<number>\d+)\s*[:.\-]?\s*",
            )
            .context("failed to compile keyed solution regex")?,
        })
    }

    pub fn classify(&self, line: &str) -> LineKind {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(line))
            .map(|rule| rule.kind)
            .unwrap_or(LineKind::Plain)
    }

    pub fn chapter_title(&self, line: &str) -> String {
        self.chapter_prefix.replace(line.trim(), "").trim().to_string()
    }

    pub fn question_body(&self, line: &str) -> String {
        self.question_prefix.replace(line.trim(), "").trim().to_string()
    }

    /// Number printed in the question marker (`Q.12`, `Question 12:`, `12.`).
    pub fn question_number(&self, line: &str) -> Option<usize> {
        self.question_number
            .captures(line.trim())
            .and_then(|captures| captures.name("number"))
            .and_then(|value| value.as_str().parse().ok())
    }

    /// Splits `"b) Serotonin"` into `('b', "Serotonin")`.
    pub fn option(&self, line: &str) -> Option<(char, String)> {
        let captures = self.option_capture.captures(line.trim())?;
        let letter = captures
            .name("letter")?
            .as_str()
            .chars()
            .next()?
            .to_ascii_lowercase();
        let text = captures
            .name("text")
            .map(|value| value.as_str().trim().to_string())
            .unwrap_or_default();
        Some((letter, text))
    }

    /// First standalone a-d letter on an answer line, lower-cased.
    pub fn answer_letter(&self, line: &str) -> Option<char> {
        self.answer_letter
            .captures(line)
            .and_then(|captures| captures.name("letter"))
            .and_then(|value| value.as_str().chars().next())
            .map(|letter| letter.to_ascii_lowercase())
    }

    pub fn explanation_text(&self, line: &str) -> String {
        self.explanation_label.replace(line.trim(), "").trim().to_string()
    }

    /// Text after an `Answer Key` heading, if the line is one.
    pub fn answer_key_heading<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.answer_key_heading
            .find(line)
            .map(|heading| line[heading.end()..].trim())
    }

    /// True for answer key table rows such as `12 c` or `1 a  2 d  3 b`.
    pub fn is_answer_key_row(&self, line: &str) -> bool {
        self.answer_key_row.is_match(line.trim())
    }

    pub fn answer_key_entries(&self, text: &str) -> Vec<(usize, char)> {
        self.answer_key_entry
            .captures_iter(text)
            .filter_map(|captures| {
                let number = captures.name("number")?.as_str().parse().ok()?;
                let letter = captures.name("letter")?.as_str().chars().next()?;
                Some((number, letter.to_ascii_lowercase()))
            })
            .collect()
    }

    /// Splits `"Solution to Question 7: ..."` into the question number and
    /// the remaining text.
    pub fn keyed_solution(&self, line: &str) -> Option<(usize, String)> {
        let line = line.trim();
        let captures = self.keyed_solution.captures(line)?;
        let number = captures.name("number")?.as_str().parse().ok()?;
        let rest = captures.get(0).map_or(line, |label| &line[label.end()..]);
        Some((number, rest.trim().to_string()))
    }
}
