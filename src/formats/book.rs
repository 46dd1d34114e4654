use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A file on disk as seen by the format plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFile {
    path: PathBuf,
    extension: String,
}

impl BookFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self { path, extension }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased extension without the dot; empty when there is none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn has_extension(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|ext| *ext == self.extension)
    }

    pub fn open(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        Ok(BufReader::new(file))
    }
}

/// Bibliographic description of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Book {
    pub path: PathBuf,
    pub title: String,
    pub authors: Vec<String>,
    pub language: String,
    pub encoding: String,
}

impl Book {
    /// A book whose title defaults to the file stem until meta info is read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            title,
            ..Self::default()
        }
    }

    pub fn file(&self) -> BookFile {
        BookFile::new(self.path.clone())
    }
}

/// In-memory text of a book, one entry per paragraph.
#[derive(Debug, Clone, Default)]
pub struct BookModel {
    pub book: Book,
    pub paragraphs: Vec<String>,
}

impl BookModel {
    pub fn new(book: Book) -> Self {
        Self {
            book,
            paragraphs: Vec::new(),
        }
    }

    pub fn add_paragraph(&mut self, text: &str) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.paragraphs.push(trimmed.to_string());
        }
    }

    pub fn char_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.chars().count()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub mime: String,
    pub data: Vec<u8>,
}

impl CoverImage {
    /// Wrap raw image bytes, sniffing the MIME type from the data. Falls back
    /// to `declared` when the format is not recognized.
    pub fn from_bytes(data: Vec<u8>, declared: Option<&str>) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let mime = match image::guess_format(&data) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(_) => declared?.to_string(),
        };
        Some(Self { mime, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        let file = BookFile::new("/books/Moby Dick.EPUB");
        assert_eq!(file.extension(), "epub");
        assert!(file.has_extension(&["fb2", "epub"]));
        assert_eq!(BookFile::new("/books/README").extension(), "");
    }

    #[test]
    fn new_book_uses_file_stem_as_title() {
        let book = Book::new("/books/moby-dick.txt");
        assert_eq!(book.title, "moby-dick");
        assert!(book.authors.is_empty());
    }

    #[test]
    fn cover_mime_is_sniffed_from_bytes() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let cover = CoverImage::from_bytes(png, Some("image/jpeg")).expect("cover");
        assert_eq!(cover.mime, "image/png");

        let unknown = CoverImage::from_bytes(vec![1, 2, 3], Some("image/gif")).expect("cover");
        assert_eq!(unknown.mime, "image/gif");
        assert!(CoverImage::from_bytes(vec![1, 2, 3], None).is_none());
        assert!(CoverImage::from_bytes(Vec::new(), Some("image/png")).is_none());
    }
}
