//! EPUB books via the `epub` crate.
//!
//! Chapters are walked in spine order and stripped of markup with
//! `html2text`; each line of the plain text becomes a paragraph.

use super::book::{Book, BookFile, BookModel, CoverImage};
use super::{FormatOptions, FormatPlugin, detect};
use ::epub::doc::EpubDoc;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

/// Very wide so html2text does not bake in hard line breaks.
const TEXT_WIDTH: usize = 10_000;

pub struct EpubPlugin {
    options: FormatOptions,
}

impl EpubPlugin {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    fn open(path: &Path) -> Result<EpubDoc<std::io::BufReader<std::fs::File>>> {
        EpubDoc::new(path).with_context(|| format!("Failed to open EPUB at {}", path.display()))
    }
}

fn normalized(text: &str) -> String {
    text.trim().nfc().collect()
}

fn chapter_text(chapter: String, index: usize) -> String {
    match html2text::from_read(chapter.as_bytes(), TEXT_WIDTH) {
        Ok(clean) => clean,
        Err(err) => {
            warn!(chapter = index, "html2text failed: {err}");
            chapter
        }
    }
}

impl FormatPlugin for EpubPlugin {
    fn name(&self) -> &str {
        "epub"
    }

    fn provides_meta_info(&self) -> bool {
        true
    }

    fn accepts_file(&self, file: &BookFile) -> bool {
        file.has_extension(&["epub"])
    }

    fn try_open(&self, path: &Path) -> Result<()> {
        Self::open(path).map(|_| ())
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<()> {
        let mut doc = Self::open(&book.path)?;

        if let Some(title) = doc.mdata("title").map(|item| normalized(&item.value)) {
            if !title.is_empty() {
                book.title = title;
            }
        }
        book.authors = doc
            .metadata
            .iter()
            .filter(|item| item.property == "creator")
            .map(|item| normalized(&item.value))
            .filter(|author| !author.is_empty())
            .collect();
        book.encoding = detect::UTF8.to_string();

        let declared = doc
            .mdata("language")
            .map(|item| item.value.trim().to_ascii_lowercase())
            .unwrap_or_default();
        book.language = if declared.is_empty() {
            // No declared language: guess from the first chapter.
            let sample = doc
                .get_current_str()
                .map(|(chapter, _mime)| chapter_text(chapter, 0))
                .unwrap_or_default();
            detect::language_from_text(&sample, &self.options)
        } else {
            declared
        };

        debug!(
            path = %book.path.display(),
            title = %book.title,
            authors = book.authors.len(),
            language = %book.language,
            "Read EPUB meta info"
        );
        Ok(())
    }

    fn read_model(&self, model: &mut BookModel) -> Result<()> {
        let path = model.book.path.clone();
        info!(path = %path.display(), "Loading EPUB content");
        let mut doc = Self::open(&path)?;

        let mut chapters = 0usize;
        loop {
            match doc.get_current_str() {
                Some((chapter, _mime)) => {
                    chapters += 1;
                    let plain = chapter_text(chapter, chapters);
                    let before = model.paragraphs.len();
                    for line in plain.lines() {
                        model.add_paragraph(line);
                    }
                    debug!(
                        chapter = chapters,
                        added_paragraphs = model.paragraphs.len() - before,
                        "Parsed chapter"
                    );
                }
                None => break,
            }

            if !doc.go_next() {
                break;
            }
        }

        if model.paragraphs.is_empty() {
            model.add_paragraph("No textual content found in this EPUB.");
        }

        info!(
            chapters,
            total_chars = model.char_count(),
            "Finished loading EPUB content"
        );
        Ok(())
    }

    fn cover_image(&self, book: &Book) -> Option<CoverImage> {
        let mut doc = match Self::open(&book.path) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(path = %book.path.display(), "Cannot read cover: {err:#}");
                return None;
            }
        };
        let (data, mime) = doc.get_cover()?;
        CoverImage::from_bytes(data, Some(&mime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatsConfig;
    use crate::formats::PluginCollection;
    use crate::options::OptionStore;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const PNG_COVER: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    fn plugin() -> EpubPlugin {
        EpubPlugin::new(FormatOptions::new(&OptionStore::in_memory(), "en", detect::UTF8))
    }

    fn chapter(paragraphs: &[&str]) -> String {
        let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head></head><body>{body}</body></html>"#
        )
    }

    /// Write a two-chapter EPUB with a PNG cover; `language` is omitted when empty.
    fn write_epub(name: &str, language: &str, chapters: [&[&str]; 2]) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = std::env::temp_dir().join(format!("leaf_options_test_{name}_{nanos}.epub"));

        let language = if language.is_empty() {
            String::new()
        } else {
            format!("<dc:language>{language}</dc:language>")
        };
        let opf = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">urn:uuid:leaf-options-fixture</dc:identifier>
    <dc:title>  Vingt mille lieues sous les mers </dc:title>
    <dc:creator>Jules Verne</dc:creator>
    <dc:creator>Pierre-Jules Hetzel</dc:creator>
    {language}
    <meta name="cover" content="cover-image"/>
  </metadata>
  <manifest>
    <item id="cover-image" href="cover.png" media-type="image/png" properties="cover-image"/>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="ch2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
  </spine>
</package>"#
        );

        let file = File::create(&path).expect("create fixture");
        let mut zip = ZipWriter::new(file);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let entries: [(&str, Vec<u8>); 6] = [
            ("mimetype", b"application/epub+zip".to_vec()),
            ("META-INF/container.xml", CONTAINER.as_bytes().to_vec()),
            ("OEBPS/content.opf", opf.into_bytes()),
            ("OEBPS/cover.png", PNG_COVER.to_vec()),
            ("OEBPS/ch1.xhtml", chapter(chapters[0]).into_bytes()),
            ("OEBPS/ch2.xhtml", chapter(chapters[1]).into_bytes()),
        ];
        for (name, data) in entries {
            zip.start_file(name, stored).expect("start entry");
            zip.write_all(&data).expect("write entry");
        }
        zip.finish().expect("finish fixture");
        path
    }

    #[test]
    fn reads_declared_meta_info_text_and_cover() {
        let path = write_epub(
            "meta",
            "FR",
            [
                &["Nous étions en 1866.", "Un événement bizarre."],
                &["Le capitaine Nemo."],
            ],
        );
        let plugin = plugin();
        plugin.try_open(&path).expect("fixture opens");

        let mut book = Book::new(&path);
        plugin.read_meta_info(&mut book).expect("meta info");
        assert_eq!(book.title, "Vingt mille lieues sous les mers");
        assert_eq!(book.authors, vec!["Jules Verne", "Pierre-Jules Hetzel"]);
        assert_eq!(book.language, "fr");
        assert_eq!(book.encoding, detect::UTF8);

        let cover = plugin.cover_image(&book).expect("cover");
        assert_eq!(cover.mime, "image/png");
        assert_eq!(cover.data, PNG_COVER.to_vec());

        let mut model = BookModel::new(book);
        plugin.read_model(&mut model).expect("model");
        assert_eq!(
            model.paragraphs,
            vec!["Nous étions en 1866.", "Un événement bizarre.", "Le capitaine Nemo."]
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn undeclared_language_is_guessed_from_the_first_chapter() {
        let path = write_epub(
            "guess",
            "",
            [
                &["Все счастливые семьи похожи друг на друга, каждая несчастливая семья."],
                &["Конец."],
            ],
        );
        let mut book = Book::new(&path);
        plugin().read_meta_info(&mut book).expect("meta info");
        assert_eq!(book.language, "ru");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn strong_lookup_picks_the_epub_plugin() {
        let path = write_epub("strong", "en", [&["One."], &["Two."]]);
        let store = OptionStore::in_memory();
        let plugins = PluginCollection::new(&store, &FormatsConfig::default());
        let found = plugins
            .plugin(&BookFile::new(path.clone()), true)
            .expect("epub plugin");
        assert_eq!(found.name(), "epub");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn accepts_only_epub_files() {
        let plugin = plugin();
        assert!(plugin.accepts_file(&BookFile::new("/books/a.EPUB")));
        assert!(!plugin.accepts_file(&BookFile::new("/books/a.txt")));
        assert!(plugin.provides_meta_info());
    }

    #[test]
    fn missing_file_is_an_error() {
        let plugin = plugin();
        let mut book = Book::new("/nonexistent/leaf-options/missing.epub");
        let err = plugin.read_meta_info(&mut book).expect_err("missing file");
        assert!(format!("{err:#}").contains("Failed to open EPUB"));
        assert!(plugin.try_open(&book.path).is_err());
        assert!(plugin.cover_image(&book).is_none());
        assert_eq!(book.title, "missing");
    }

    #[test]
    fn strips_markup_from_chapters() {
        let text = chapter_text("<p>Call me <b>Ishmael</b>.</p>".to_string(), 1);
        assert!(text.contains("Call me"));
        assert!(!text.contains("<b>"));
    }

    #[test]
    fn titles_are_nfc_normalized() {
        assert_eq!(normalized("  Cafe\u{301} "), "Caf\u{e9}");
    }
}
