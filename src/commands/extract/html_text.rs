use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Node, Selector};

/// Page chrome whose text never belongs to the question stream.
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "noscript", "template"];

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "dl", "dt", "dd", "tr", "table", "h1", "h2", "h3", "h4", "h5",
    "h6", "section", "article", "main", "aside", "blockquote", "pre", "figure", "figcaption",
    "form", "fieldset", "hr",
];

const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Renders the `<body>` of a saved study page as the line stream a browser's
/// `innerText` would give: block elements and `<br>` end lines, entities are
/// decoded by the parser, attribute values never appear.
#[derive(Debug)]
pub(super) struct HtmlStripper {
    body: Selector,
}

impl HtmlStripper {
    pub(super) fn new() -> Result<Self> {
        let body =
            Selector::parse("body").map_err(|error| anyhow!("invalid body selector: {error}"))?;
        Ok(Self { body })
    }

    pub(super) fn strip(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let root = document
            .select(&self.body)
            .next()
            .unwrap_or_else(|| document.root_element());

        let mut text = String::new();
        collect_text(root, false, &mut text);

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

fn collect_text(element: ElementRef<'_>, preformatted: bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) if preformatted => out.push_str(text),
            Node::Text(text) => push_collapsed(text, out),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if DROPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let block = BLOCK_ELEMENTS.contains(&name);
                let cell = CELL_ELEMENTS.contains(&name);

                if block {
                    out.push('\n');
                } else if cell {
                    push_space(out);
                }
                collect_text(child, preformatted || name == "pre", out);
                if block {
                    out.push('\n');
                } else if cell {
                    push_space(out);
                }
            }
            _ => {}
        }
    }
}

fn push_collapsed(text: &str, out: &mut String) {
    for character in text.chars() {
        if character.is_whitespace() {
            push_space(out);
        } else {
            out.push(character);
        }
    }
}

fn push_space(out: &mut String) {
    if !out.ends_with([' ', '\n']) {
        out.push(' ');
    }
}
