//! Plain text books.
//!
//! Text files carry no metadata, so the title comes from the file name and the
//! encoding and language are guessed. How lines group into paragraphs is a
//! per-file setting exposed through the format's info page.

use super::book::{Book, BookFile, BookModel};
use super::detect::{self, KNOWN_ENCODINGS};
use super::{FormatInfoPage, FormatOptions, FormatPlugin};
use crate::dialog::{
    ComboEntry, EntryBase, EntryWidget, OptionEntry, OptionKind, OptionsDialog, SimpleChoiceEntry,
};
use crate::options::{FORMATS_CATEGORY, IntegerRangeOption, OptionStore, StringOption};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const INFO_TAB: &str = "Text";

/// Where a new paragraph starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakType {
    NewLine,
    EmptyLine,
    LineWithIndent,
}

impl BreakType {
    const ALL: [BreakType; 3] = [
        BreakType::NewLine,
        BreakType::EmptyLine,
        BreakType::LineWithIndent,
    ];

    fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(BreakType::EmptyLine)
    }
}

/// Per-file options, grouped under the file's path.
#[derive(Debug, Clone)]
pub struct PlainTextFormat {
    pub break_type: IntegerRangeOption,
    pub encoding: StringOption,
}

impl PlainTextFormat {
    pub fn new(store: &OptionStore, path: &Path) -> Self {
        let group = path.to_string_lossy();
        Self {
            break_type: IntegerRangeOption::new(
                store,
                FORMATS_CATEGORY,
                &group,
                "BreakType",
                0,
                2,
                1,
            ),
            encoding: StringOption::new(store, FORMATS_CATEGORY, &group, "Encoding", ""),
        }
    }

    pub fn break_type(&self) -> BreakType {
        BreakType::from_index(self.break_type.value())
    }
}

/// Combo value standing for "detect the encoding", stored as an empty string.
pub const AUTO_ENCODING: &str = "auto";

/// Encoding combo of the info page; `auto` clears a forced encoding.
struct EncodingComboEntry {
    base: EntryBase,
    name: String,
    option: StringOption,
    values: Vec<String>,
}

impl EncodingComboEntry {
    fn new(name: &str, option: StringOption) -> Self {
        let values = std::iter::once(AUTO_ENCODING)
            .chain(KNOWN_ENCODINGS)
            .map(str::to_string)
            .collect();
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
            values,
        }
    }
}

impl OptionEntry for EncodingComboEntry {
    fn kind(&self) -> OptionKind {
        OptionKind::Combo
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> &EntryBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntryBase {
        &mut self.base
    }

    fn widget(&mut self) -> EntryWidget<'_> {
        EntryWidget::Combo(self)
    }
}

impl ComboEntry for EncodingComboEntry {
    fn initial_value(&self) -> String {
        let value = self.option.value();
        if value.is_empty() {
            AUTO_ENCODING.to_string()
        } else {
            value
        }
    }

    fn values(&self) -> &[String] {
        &self.values
    }

    fn on_accept(&mut self, value: &str) {
        let value = if value == AUTO_ENCODING { "" } else { value };
        self.option.set_value(value);
    }
}

pub struct PlainTextPlugin {
    store: OptionStore,
    options: FormatOptions,
}

impl PlainTextPlugin {
    pub fn new(store: &OptionStore, options: FormatOptions) -> Self {
        Self {
            store: store.clone(),
            options,
        }
    }
}

impl FormatPlugin for PlainTextPlugin {
    fn name(&self) -> &str {
        "plain text"
    }

    fn provides_meta_info(&self) -> bool {
        false
    }

    fn accepts_file(&self, file: &BookFile) -> bool {
        file.has_extension(&["txt"])
    }

    fn create_info_page(&self, dialog: &mut OptionsDialog, path: &Path) -> Option<FormatInfoPage> {
        let format = PlainTextFormat::new(&self.store, path);
        let tab = dialog.create_tab(INFO_TAB);
        let texts = ["breakNewLine", "breakEmptyLine", "breakLineWithIndent"]
            .iter()
            .map(|key| tab.value(key))
            .collect();
        let break_label = tab.value("breakType");
        let encoding_label = tab.value("encoding");
        let break_id = tab.add_option(
            &break_label,
            "",
            Box::new(SimpleChoiceEntry::new(&break_label, format.break_type, texts)),
        );
        let encoding_id = tab.add_option(
            &encoding_label,
            "",
            Box::new(EncodingComboEntry::new(&encoding_label, format.encoding)),
        );
        Some(FormatInfoPage {
            tab: INFO_TAB.to_string(),
            entries: vec![break_id, encoding_id],
        })
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<()> {
        let file = book.file();
        let mut stream = file.open()?;
        let format = PlainTextFormat::new(&self.store, &book.path);
        let forced = format.encoding.value();
        if forced.is_empty() {
            detect::detect_encoding_and_language(book, &mut stream, &self.options)?;
        } else {
            book.encoding = forced;
            detect::detect_language(book, &mut stream, &self.options)?;
        }
        debug!(
            path = %book.path.display(),
            encoding = %book.encoding,
            language = %book.language,
            "Read plain text meta info"
        );
        Ok(())
    }

    fn read_model(&self, model: &mut BookModel) -> Result<()> {
        let path = model.book.path.clone();
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let encoding = if model.book.encoding.is_empty() {
            self.options.default_encoding.value()
        } else {
            model.book.encoding.clone()
        };
        let text = detect::decode(&bytes, &encoding);
        let break_type = PlainTextFormat::new(&self.store, &path).break_type();
        for paragraph in split_paragraphs(&text, break_type) {
            model.add_paragraph(&paragraph);
        }
        if model.paragraphs.is_empty() {
            model.add_paragraph("No textual content found in this file.");
        }
        info!(
            path = %path.display(),
            paragraphs = model.paragraphs.len(),
            ?break_type,
            "Finished loading plain text content"
        );
        Ok(())
    }
}

pub(crate) fn split_paragraphs(text: &str, break_type: BreakType) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    let flush = |buffer: &mut Vec<&str>, paragraphs: &mut Vec<String>| {
        if !buffer.is_empty() {
            paragraphs.push(buffer.join("\n"));
            buffer.clear();
        }
    };

    for line in text.lines() {
        let blank = line.trim().is_empty();
        match break_type {
            BreakType::NewLine => {
                if !blank {
                    paragraphs.push(line.to_string());
                }
            }
            BreakType::EmptyLine => {
                if blank {
                    flush(&mut buffer, &mut paragraphs);
                } else {
                    buffer.push(line);
                }
            }
            BreakType::LineWithIndent => {
                if blank {
                    flush(&mut buffer, &mut paragraphs);
                } else {
                    if line.starts_with(char::is_whitespace) {
                        flush(&mut buffer, &mut paragraphs);
                    }
                    buffer.push(line.trim());
                }
            }
        }
    }
    flush(&mut buffer, &mut paragraphs);

    paragraphs
}
