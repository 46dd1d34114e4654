//! Encoding and language guessing for formats that do not declare them.

use super::FormatOptions;
use super::book::Book;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use tracing::debug;

const SAMPLE_BYTES: u64 = 64 * 1024;
const MIN_LETTERS_FOR_GUESS: usize = 20;

pub const UTF8: &str = "utf-8";
pub const UTF16LE: &str = "utf-16le";
pub const UTF16BE: &str = "utf-16be";
pub const LATIN1: &str = "iso-8859-1";

/// Encodings the text decoders understand, in menu order.
pub const KNOWN_ENCODINGS: [&str; 4] = [UTF8, UTF16LE, UTF16BE, LATIN1];

static RE_CYRILLIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Cyrillic}").unwrap());
static RE_GREEK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Greek}").unwrap());
static RE_HAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Han}").unwrap());
static RE_KANA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{Hiragana}\p{Katakana}]").unwrap());
static RE_HANGUL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Hangul}").unwrap());
static RE_HEBREW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Hebrew}").unwrap());
static RE_ARABIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Arabic}").unwrap());
static RE_LATIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Latin}").unwrap());

/// Sniff the encoding of `stream`, then guess the language of its text.
pub fn detect_encoding_and_language(
    book: &mut Book,
    stream: &mut dyn Read,
    options: &FormatOptions,
) -> Result<()> {
    let sample = read_sample(stream)?;
    let truncated = sample.len() as u64 == SAMPLE_BYTES;
    let encoding = sniff_encoding(&sample, truncated)
        .map(str::to_string)
        .unwrap_or_else(|| options.default_encoding.value());
    debug!(path = %book.path.display(), %encoding, "Detected encoding");
    book.encoding = encoding;
    book.language = language_from_text(&decode(&sample, &book.encoding), options);
    Ok(())
}

/// Guess the language of `stream`, assuming it is in `book.encoding`.
pub fn detect_language(
    book: &mut Book,
    stream: &mut dyn Read,
    options: &FormatOptions,
) -> Result<()> {
    let sample = read_sample(stream)?;
    let encoding = if book.encoding.is_empty() {
        options.default_encoding.value()
    } else {
        book.encoding.clone()
    };
    book.language = language_from_text(&decode(&sample, &encoding), options);
    Ok(())
}

fn read_sample(stream: &mut dyn Read) -> Result<Vec<u8>> {
    let mut sample = Vec::new();
    stream
        .take(SAMPLE_BYTES)
        .read_to_end(&mut sample)
        .context("Failed to read text sample")?;
    Ok(sample)
}

/// Recognize byte-order marks and valid UTF-8. `None` means "unknown".
///
/// An incomplete trailing sequence only counts as UTF-8 when `truncated` says
/// the sample stops before the end of the file.
pub fn sniff_encoding(sample: &[u8], truncated: bool) -> Option<&'static str> {
    if sample.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(UTF8);
    }
    if sample.starts_with(&[0xFF, 0xFE]) {
        return Some(UTF16LE);
    }
    if sample.starts_with(&[0xFE, 0xFF]) {
        return Some(UTF16BE);
    }
    match std::str::from_utf8(sample) {
        Ok(_) => Some(UTF8),
        Err(err) if truncated && err.error_len().is_none() => Some(UTF8),
        Err(_) => None,
    }
}

/// Decode `bytes` in one of [`KNOWN_ENCODINGS`]; anything else is read as
/// lossy UTF-8. A leading byte-order mark is dropped.
pub fn decode(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_ascii_lowercase().as_str() {
        UTF16LE | UTF16BE => {
            let big_endian = encoding.eq_ignore_ascii_case(UTF16BE);
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| {
                    if big_endian {
                        u16::from_be_bytes([pair[0], pair[1]])
                    } else {
                        u16::from_le_bytes([pair[0], pair[1]])
                    }
                })
                .collect();
            let text = String::from_utf16_lossy(&units);
            text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text)
        }
        LATIN1 | "latin1" | "windows-1252" => bytes.iter().map(|b| char::from(*b)).collect(),
        _ => {
            let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Language code from the dominant script of `text`.
///
/// Latin script text keeps the configured default language since the script
/// alone does not tell English from French.
pub fn language_from_text(text: &str, options: &FormatOptions) -> String {
    let default_language = options.default_language.value();
    if !options.language_auto_detect.value() {
        return default_language;
    }

    let kana = RE_KANA.find_iter(text).count();
    let han = RE_HAN.find_iter(text).count();
    let counts = [
        ("ru", RE_CYRILLIC.find_iter(text).count()),
        ("el", RE_GREEK.find_iter(text).count()),
        (if kana > 0 { "ja" } else { "zh" }, han + kana),
        ("ko", RE_HANGUL.find_iter(text).count()),
        ("he", RE_HEBREW.find_iter(text).count()),
        ("ar", RE_ARABIC.find_iter(text).count()),
        ("", RE_LATIN.find_iter(text).count()),
    ];
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    if total < MIN_LETTERS_FOR_GUESS {
        return default_language;
    }
    match counts.iter().max_by_key(|(_, count)| *count) {
        Some((code, _)) if !code.is_empty() => code.to_string(),
        _ => default_language,
    }
}
