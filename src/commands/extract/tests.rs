use std::fs;

use super::cleanup::clean_text;
use super::html_text::HtmlStripper;
use super::pdf_text::{linearize_pages, merge_hyphenated_lines};
use super::run::acquire;
use crate::error::PipelineError;
use crate::model::{SourceEntry, SourceKind};

#[test]
fn clean_text_strips_nul_and_replacement_characters() {
    let raw = "Q.1 Which\u{0000} drug\u{00A0}is\u{FFFD} used?\r\na) Lithium\u{0007}";
    assert_eq!(clean_text(raw), "Q.1 Which drug is used?\na) Lithium");
}

#[test]
fn clean_text_keeps_tabs_and_newlines() {
    assert_eq!(clean_text("a)\tOne\nb)\tTwo"), "a)\tOne\nb)\tTwo");
}

#[test]
fn html_stripper_drops_chrome_and_keeps_body_lines() {
    let stripper = HtmlStripper::new().expect("selector should parse");
    let html = r#"
        <html><head><title>Bank</title><style>p { color: red; }</style></head>
        <body>
          <nav>Home | About</nav>
          <header><h1>Site banner</h1></header>
          <h2>Chapter 1: Mood Disorders</h2>
          <p>Q.1 Which drug is first line?</p>
          <ul><li>a) Lithium</li><li>b) Haloperidol</li></ul>
          <p>Answer: a<br>Explanation: Lithium &amp; valproate are mood stabilizers.</p>
          <script>console.log("Answer: d")</script>
          <footer>Copyright</footer>
        </body></html>
    "#;

    let text = stripper.strip(html);
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>();

    assert_eq!(
        lines,
        vec![
            "Chapter 1: Mood Disorders",
            "Q.1 Which drug is first line?",
            "a) Lithium",
            "b) Haloperidol",
            "Answer: a",
            "Explanation: Lithium & valproate are mood stabilizers.",
        ]
    );
}

#[test]
fn html_stripper_decodes_numeric_entities() {
    let stripper = HtmlStripper::new().expect("selector should parse");
    assert_eq!(stripper.strip("<p>5&#x2013;HT &#8805; 2</p>"), "5\u{2013}HT \u{2265} 2");
}

#[test]
fn html_stripper_decodes_named_entities_and_ignores_attribute_text() {
    let stripper = HtmlStripper::new().expect("selector should parse");
    let html = "<body><p>Freud&rsquo;s caf&eacute; &hellip;</p>\
                <p><img alt=\"a > b\">Q.1 Which?</p></body>";

    assert_eq!(stripper.strip(html), "Freud\u{2019}s caf\u{e9} \u{2026}\nQ.1 Which?");
}

#[test]
fn html_stripper_without_body_keeps_head_text_out() {
    let stripper = HtmlStripper::new().expect("selector should parse");
    let html = "<title>Psychiatry Bank</title><meta name=\"x\" content=\"y\">\
                <h2>Chapter 1: Mood</h2><b>Q.1</b> Which\n   drug?<table><tr><td>a) One</td><td>b) Two</td></tr></table>";

    assert_eq!(
        stripper.strip(html),
        "Chapter 1: Mood\nQ.1 Which drug?\na) One b) Two"
    );
}

#[test]
fn html_stripper_keeps_preformatted_line_breaks() {
    let stripper = HtmlStripper::new().expect("selector should parse");
    let html = "<body><pre>a) Lithium\nb) Valproate</pre></body>";

    assert_eq!(stripper.strip(html), "a) Lithium\nb) Valproate");
}

#[test]
fn merge_hyphenated_lines_joins_lowercase_continuations_only() {
    let lines = vec![
        "Selective serotonin re-".to_string(),
        "uptake inhibitors".to_string(),
        "Anti-".to_string(),
        "Depressant".to_string(),
    ];

    let (merged, merges) = merge_hyphenated_lines(lines);
    assert_eq!(merges, 1);
    assert_eq!(
        merged,
        vec![
            "Selective serotonin reuptake inhibitors".to_string(),
            "Anti-".to_string(),
            "Depressant".to_string(),
        ]
    );
}

#[test]
fn linearize_pages_removes_repeated_running_lines_but_keeps_first_copy() {
    let pages = vec![
        "PSYCHIATRY REVIEW\nChapter 1: Mood\nQ.1 First?\n1".to_string(),
        "PSYCHIATRY REVIEW\na) One\nb) Two\nMedTrix Press".to_string(),
        "PSYCHIATRY REVIEW\nc) Three\nd) Four\nMedTrix Press".to_string(),
        "PSYCHIATRY REVIEW\nAnswer: b\nMedTrix Press".to_string(),
    ];

    let linearized = linearize_pages(pages);
    assert_eq!(linearized.page_count, 4);
    assert_eq!(linearized.running_lines_removed, 5);
    assert_eq!(linearized.text.matches("PSYCHIATRY REVIEW").count(), 1);
    assert_eq!(linearized.text.matches("MedTrix Press").count(), 1);
    assert!(!linearized.text.contains("\u{000C}"));
    assert!(linearized.text.contains("Chapter 1: Mood\nQ.1 First?"));
}

#[test]
fn acquire_reports_unreadable_document_as_acquisition_error() {
    let dir = std::env::temp_dir().join(format!("mcqbank_extract_missing_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");

    let stripper = HtmlStripper::new().expect("selector should parse");
    let entry = SourceEntry {
        filename: "vanished.txt".to_string(),
        kind: SourceKind::Text,
        sha256: String::new(),
    };

    let error = acquire(&dir, &entry, None, &stripper).expect_err("missing file must fail");
    match error {
        PipelineError::Acquisition { filename, .. } => assert_eq!(filename, "vanished.txt"),
        other => panic!("unexpected error: {other}"),
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn acquire_reads_plain_text_documents() {
    let dir = std::env::temp_dir().join(format!("mcqbank_extract_text_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");
    fs::write(dir.join("bank.txt"), "Chapter 1: Mood\u{0000}\r\nQ.1 First?").expect("write");

    let stripper = HtmlStripper::new().expect("selector should parse");
    let entry = SourceEntry {
        filename: "bank.txt".to_string(),
        kind: SourceKind::Text,
        sha256: String::new(),
    };

    let acquired = acquire(&dir, &entry, None, &stripper).expect("text file should decode");
    assert_eq!(acquired.text, "Chapter 1: Mood\nQ.1 First?");
    assert_eq!(acquired.pdf_pages, 0);

    let _ = fs::remove_dir_all(&dir);
}
