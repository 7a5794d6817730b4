use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Minimum number of pages a first/last line must repeat on before it is
/// treated as a running header or footer.
const RUNNING_LINE_MIN_PAGES: usize = 3;
const RUNNING_LINE_MAX_CHARS: usize = 120;

#[derive(Debug, Default)]
pub(super) struct PdfText {
    pub text: String,
    pub page_count: usize,
    pub running_lines_removed: usize,
    pub dehyphenation_merges: usize,
}

pub(super) fn extract_pdf_text(pdf_path: &Path, max_pages: Option<usize>) -> Result<PdfText> {
    let pages = run_pdftotext(pdf_path, max_pages)?;
    Ok(linearize_pages(pages))
}

fn run_pdftotext(pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<String>> {
    let mut command = Command::new("pdftotext");
    command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    Ok(pages)
}

/// Drops repeated running headers/footers, rejoins hyphenated breaks and concatenates
/// the pages without any page marker.
pub(super) fn linearize_pages(pages: Vec<String>) -> PdfText {
    let header_candidates = detect_repeated_edge_lines(&pages, true);
    let footer_candidates = detect_repeated_edge_lines(&pages, false);

    let mut result = PdfText {
        page_count: pages.len(),
        ..PdfText::default()
    };
    let mut linearized = Vec::with_capacity(pages.len());
    // First copy of each running line is kept (it may be the chapter title).
    let mut first_seen = HashSet::<String>::new();

    for page in pages {
        let mut lines = page.lines().map(str::to_string).collect::<Vec<String>>();

        if let Some(index) = lines.iter().position(|line| !line.trim().is_empty()) {
            let candidate = normalize_edge_line(&lines[index]);
            if header_candidates.contains(&candidate) && !first_seen.insert(candidate) {
                lines.remove(index);
                result.running_lines_removed += 1;
            }
        }

        if let Some(index) = lines.iter().rposition(|line| !line.trim().is_empty()) {
            let candidate = normalize_edge_line(&lines[index]);
            if footer_candidates.contains(&candidate) && !first_seen.insert(candidate) {
                lines.remove(index);
                result.running_lines_removed += 1;
            }
        }

        let (merged, merges) = merge_hyphenated_lines(lines);
        result.dehyphenation_merges += merges;
        linearized.push(merged.join("\n"));
    }

    result.text = linearized.join("\n");
    result
}

fn detect_repeated_edge_lines(pages: &[String], header: bool) -> HashSet<String> {
    let mut counts = HashMap::<String, usize>::new();
    for page in pages {
        let mut lines = page.lines().map(str::trim).filter(|line| !line.is_empty());
        let candidate = if header { lines.next() } else { lines.last() };

        let Some(candidate) = candidate else {
            continue;
        };

        let normalized = normalize_edge_line(candidate);
        if normalized.is_empty() || normalized.len() > RUNNING_LINE_MAX_CHARS {
            continue;
        }
        *counts.entry(normalized).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter_map(|(candidate, count)| (count >= RUNNING_LINE_MIN_PAGES).then_some(candidate))
        .collect()
}

fn normalize_edge_line(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_ascii_lowercase()
}

pub(super) fn merge_hyphenated_lines(lines: Vec<String>) -> (Vec<String>, usize) {
    let mut merged = Vec::<String>::with_capacity(lines.len());
    let mut merges = 0usize;
    let mut lines = lines.into_iter().peekable();

    while let Some(current) = lines.next() {
        match lines.next_if(|next| should_merge_hyphenated_pair(&current, next)) {
            Some(next) => {
                merged.push(format!(
                    "{}{}",
                    current.trim_end().trim_end_matches('-'),
                    next.trim_start()
                ));
                merges += 1;
            }
            None => merged.push(current),
        }
    }

    (merged, merges)
}

fn should_merge_hyphenated_pair(current: &str, next: &str) -> bool {
    let left = current.trim_end();
    if !left.ends_with('-') {
        return false;
    }

    let starts_with_lowercase = next
        .trim_start()
        .chars()
        .next()
        .is_some_and(|character| character.is_ascii_lowercase());
    if !starts_with_lowercase {
        return false;
    }

    left.trim_end_matches('-')
        .chars()
        .last()
        .is_some_and(|character| character.is_ascii_alphabetic())
}
