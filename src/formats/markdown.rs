use super::book::{Book, BookFile, BookModel};
use super::FormatPlugin;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use tracing::info;

static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.*?)\s*#*\s*$").unwrap());
static RE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\*\*|\*|`)").unwrap());
// `_` and `__` only delimit emphasis at a word edge; `snake_case` stays intact.
static RE_UNDERSCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\p{L}\p{N}_])_{1,2}|_{1,2}([^\p{L}\p{N}_]|$)").unwrap()
});
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").unwrap());

/// Markdown files read as plain paragraphs with inline markup removed.
#[derive(Debug, Default)]
pub struct MarkdownPlugin;

impl MarkdownPlugin {
    pub fn new() -> Self {
        Self
    }
}

fn strip_inline(line: &str) -> String {
    let line = RE_LINK.replace_all(line, "$1");
    let line = RE_EMPHASIS.replace_all(&line, "");
    RE_UNDERSCORE.replace_all(&line, "${1}${2}").into_owned()
}

pub(crate) fn markdown_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut buffer: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join(" "));
                buffer.clear();
            }
            continue;
        }
        if let Some(caps) = RE_HEADING.captures(line) {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join(" "));
                buffer.clear();
            }
            paragraphs.push(strip_inline(&caps[2]));
            continue;
        }
        buffer.push(strip_inline(line.trim()));
    }
    if !buffer.is_empty() {
        paragraphs.push(buffer.join(" "));
    }
    paragraphs
}

impl FormatPlugin for MarkdownPlugin {
    fn name(&self) -> &str {
        "markdown"
    }

    fn provides_meta_info(&self) -> bool {
        false
    }

    fn accepts_file(&self, file: &BookFile) -> bool {
        file.has_extension(&["md", "markdown"])
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<()> {
        let text = fs::read_to_string(&book.path)
            .with_context(|| format!("Failed to read markdown file at {}", book.path.display()))?;
        let title = text
            .lines()
            .filter_map(|line| RE_HEADING.captures(line))
            .find(|caps| &caps[1] == "#")
            .map(|caps| strip_inline(&caps[2]));
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            book.title = title;
        }
        book.encoding = super::detect::UTF8.to_string();
        Ok(())
    }

    fn read_model(&self, model: &mut BookModel) -> Result<()> {
        let path = model.book.path.clone();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read markdown file at {}", path.display()))?;
        for paragraph in markdown_paragraphs(&text) {
            model.add_paragraph(&paragraph);
        }
        if model.paragraphs.is_empty() {
            model.add_paragraph("No textual content found in this file.");
        }
        info!(
            path = %path.display(),
            paragraphs = model.paragraphs.len(),
            "Finished loading markdown content"
        );
        Ok(())
    }
}
