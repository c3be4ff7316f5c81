//! Converts LLM output between markdown, HTML and plain text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainKind;
use crate::models::OutputFormat;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\*\s+").unwrap());
static BULLET_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\*\s+(.*)$").unwrap());
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s*").unwrap());
static LIST_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)(<li>.*</li>)").unwrap());

/// Shapes remote output for the requested format.
///
/// Clinical prompts always ask for markdown, which is converted here.
/// Veterinary prompts ask for the target format directly, so only line breaks
/// are adjusted.
pub fn render(kind: DomainKind, text: &str, format: OutputFormat) -> String {
    match kind {
        DomainKind::Clinical => match format {
            OutputFormat::Text => strip_markdown(text),
            OutputFormat::Html => markdown_to_html(text),
            OutputFormat::Markdown => text.to_string(),
        },
        DomainKind::Veterinary => line_breaks(text, format),
    }
}

pub fn strip_markdown(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = BULLET.replace_all(&text, "• ");
    let text = HEADER.replace_all(&text, "");
    text.trim().to_string()
}

pub fn markdown_to_html(text: &str) -> String {
    let text = BOLD.replace_all(text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = BULLET_ITEM.replace_all(&text, "<li>$1</li>");
    let text = LIST_BLOCK.replace_all(&text, "<ul>$1</ul>");
    nl2br(&text)
}

/// Plain text stays as is, HTML gets `<br />` tags, markdown gets paragraph breaks.
pub fn line_breaks(text: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => text.to_string(),
        OutputFormat::Html => nl2br(text),
        OutputFormat::Markdown => text.replace('\n', "\n\n"),
    }
}

pub fn nl2br(text: &str) -> String {
    text.replace('\n', "<br />\n")
}
