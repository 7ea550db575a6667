//! Loading of the tab-delimited frequency corpus.
//!
//! The corpus file is HTML-entity encoded (`caf&eacute;`), so entities are decoded before the
//! text is split into rows. Every row is data; there is no header.

use crate::error::{Result, WordFreqError};
use log::{debug, info};
use quick_xml::escape::resolve_html5_entity;
use std::borrow::Cow;
use std::path::Path;
use tokio::task;

/// Longest entity name we try to resolve (`&CounterClockwiseContourIntegral;` is 31).
const MAX_ENTITY_LEN: usize = 32;

/// One row of the corpus, as read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the decoded text.
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        RawRecord { line, fields }
    }

    /// Field at `index`, or `""` if the row is shorter.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn any_field_contains(&self, marker: char) -> bool {
        self.fields.iter().any(|f| f.contains(marker))
    }
}

/// Reads, decodes and parses the corpus at `path`.
pub async fn load_corpus(path: &Path) -> Result<Vec<RawRecord>> {
    info!("Reading corpus file: {:?}", path);
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| WordFreqError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let text = String::from_utf8(bytes).map_err(|e| WordFreqError::DecodeError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let records = task::spawn_blocking(move || -> Result<Vec<RawRecord>> {
        let decoded = decode_entities(&text);
        parse_records(&decoded)
    })
    .await??;

    info!("Parsed {} corpus rows.", records.len());
    Ok(records)
}

/// Replaces HTML character references with the characters they stand for.
///
/// Named references are resolved against the HTML5 table; numeric ones (`&#233;`, `&#xE9;`)
/// directly. Anything that does not resolve is kept as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let resolved = tail
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| resolve_entity(&tail[..end]).map(|r| (r, end)));
        match resolved {
            Some((replacement, end)) => {
                decoded.push_str(&replacement);
                rest = &tail[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = tail;
            }
        }
    }
    decoded.push_str(rest);
    Cow::Owned(decoded)
}

fn resolve_entity(name: &str) -> Option<Cow<'static, str>> {
    match name.strip_prefix('#') {
        Some(number) => {
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            let ch = char::from_u32(code)
                .filter(|&c| c != '\0')
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            Some(Cow::Owned(ch.to_string()))
        }
        None => resolve_html5_entity(name).map(Cow::Borrowed),
    }
}

/// Splits decoded corpus text into tab-delimited records.
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut last_start = None;
    for result in reader.records() {
        let row = result.map_err(|e| WordFreqError::ParseError(e.to_string()))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        last_start = row.position().map(|p| (p.byte(), line));
        records.push(RawRecord::new(line, row.iter().map(String::from).collect()));
    }

    // csv reads an unclosed quote through to the end of input, so only the last row can hold one.
    if let Some((byte, line)) = last_start {
        let tail = usize::try_from(byte).ok().and_then(|b| text.get(b..));
        if tail.is_some_and(has_unterminated_quote) {
            return Err(WordFreqError::ParseError(format!(
                "unterminated quoted field in row at line {}",
                line
            )));
        }
    }
    debug!("Split corpus text into {} records.", records.len());
    Ok(records)
}

/// Whether `raw` ends inside a quoted field. Quotes only open a field at its start and `""`
/// inside one is an escaped quote.
fn has_unterminated_quote(raw: &str) -> bool {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            '\t' | '\n' | '\r' => at_field_start = true,
            _ => at_field_start = false,
        }
    }
    in_quotes
}
