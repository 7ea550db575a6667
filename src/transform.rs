//! Filtering, projection, ranking and tag remapping of corpus rows.

use crate::corpus::RawRecord;
use crate::error::{Result, WordFreqError};
use crate::tags::{GrammaticalClass, TagTables};
use log::{debug, info};
use serde::Serialize;
use std::cmp::Ordering;

/// Marks inflected/alternate word forms in the corpus; those rows are skipped.
pub const ALTERNATE_FORM_MARKER: char = '@';

const WORD_FIELD: usize = 1;
const TAG_FIELD: usize = 2;
const FREQ_FIELD: usize = 4;
const RANK_FIELD: usize = 5;
const DISP_FIELD: usize = 6;

/// How unparseable numeric fields are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// Use the longest numeric prefix; no prefix becomes a missing value.
    #[default]
    Lenient,
    /// The whole field must be a number, otherwise the run fails.
    Strict,
}

/// A projected corpus row, still carrying its corpus tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub word: String,
    pub tag: String,
    pub freq: Option<i64>,
    pub disp: Option<f64>,
    pub ra: Option<i64>,
}

/// A ranked word with its grammatical class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordEntry {
    pub word: String,
    pub pos: GrammaticalClass,
    pub freq: Option<i64>,
    pub disp: Option<f64>,
    pub ra: Option<i64>,
}

pub fn is_alternate_form(record: &RawRecord) -> bool {
    record.any_field_contains(ALTERNATE_FORM_MARKER)
}

/// Maps a raw row onto a [`CorpusEntry`] using the fixed column positions.
pub fn project(record: &RawRecord, policy: NumericPolicy) -> Result<CorpusEntry> {
    Ok(CorpusEntry {
        word: record.field(WORD_FIELD).to_string(),
        tag: record.field(TAG_FIELD).to_string(),
        freq: numeric_field(record, FREQ_FIELD, "freq", policy, parse_integer)?,
        disp: numeric_field(record, DISP_FIELD, "disp", policy, parse_float)?,
        ra: numeric_field(record, RANK_FIELD, "ra", policy, parse_integer)?,
    })
}

fn numeric_field<T>(
    record: &RawRecord,
    index: usize,
    name: &str,
    policy: NumericPolicy,
    parse: fn(&str, NumericPolicy) -> Option<T>,
) -> Result<Option<T>> {
    let raw = record.field(index);
    match (parse(raw, policy), policy) {
        (None, NumericPolicy::Strict) => Err(WordFreqError::ParseError(format!(
            "line {}: field '{}' is not a valid number: {:?}",
            record.line, name, raw
        ))),
        (value, _) => Ok(value),
    }
}

fn parse_integer(field: &str, policy: NumericPolicy) -> Option<i64> {
    match policy {
        NumericPolicy::Strict => field.trim().parse().ok(),
        NumericPolicy::Lenient => {
            let s = field.trim_start();
            let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
            let sign_len = s.len() - unsigned.len();
            let digits = count_digits(unsigned.as_bytes());
            if digits == 0 {
                return None;
            }
            s[..sign_len + digits].parse().ok()
        }
    }
}

fn parse_float(field: &str, policy: NumericPolicy) -> Option<f64> {
    let value = match policy {
        NumericPolicy::Strict => field.trim().parse::<f64>().ok(),
        NumericPolicy::Lenient => leading_float(field.trim_start()),
    };
    value.filter(|v| !v.is_nan())
}

/// Longest prefix of `s` that reads as a decimal float (`12`, `-.5`, `3.2e-4`).
fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    s[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Ranking order: frequency, then dispersion, then rank, all ascending.
///
/// A missing value sorts before any number; two missing values tie and defer to the next key.
/// The JavaScript word list let a missing value fall through to the next key on any comparison,
/// which is not a total order, so rows with missing numbers can land elsewhere than they did there.
pub fn compare_entries(a: &CorpusEntry, b: &CorpusEntry) -> Ordering {
    a.freq
        .cmp(&b.freq)
        .then_with(|| compare_dispersion(a.disp, b.disp))
        .then_with(|| a.ra.cmp(&b.ra))
}

fn compare_dispersion(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Stable sort by [`compare_entries`].
pub fn sort_entries(entries: &mut [CorpusEntry]) {
    entries.sort_by(compare_entries);
}

/// Swaps the corpus tag for its grammatical class.
pub fn remap(entry: CorpusEntry, tables: &TagTables) -> Result<WordEntry> {
    let pos = tables.class_for(&entry.tag).ok_or_else(|| {
        WordFreqError::Internal(format!(
            "Allowed tag '{}' (word '{}') has no grammatical class",
            entry.tag, entry.word
        ))
    })?;
    Ok(WordEntry {
        word: entry.word,
        pos,
        freq: entry.freq,
        disp: entry.disp,
        ra: entry.ra,
    })
}

/// Runs the whole filter/transform stage over the parsed corpus.
pub fn transform(
    records: Vec<RawRecord>,
    tables: &TagTables,
    policy: NumericPolicy,
) -> Result<Vec<WordEntry>> {
    let total = records.len();
    let relevant: Vec<RawRecord> = records
        .into_iter()
        .filter(|r| !is_alternate_form(r))
        .collect();
    info!(
        "Skipped {} alternate-form rows, {} rows remain.",
        total - relevant.len(),
        relevant.len()
    );

    let mut entries = Vec::with_capacity(relevant.len());
    let mut disallowed = 0usize;
    for record in &relevant {
        let entry = project(record, policy)?;
        if tables.is_allowed(&entry.tag) {
            entries.push(entry);
        } else {
            if !tables.is_known(&entry.tag) {
                debug!("Line {}: unknown corpus tag '{}'", record.line, entry.tag);
            }
            disallowed += 1;
        }
    }
    info!(
        "Dropped {} rows with disallowed parts of speech, {} words remain.",
        disallowed,
        entries.len()
    );

    sort_entries(&mut entries);
    entries
        .into_iter()
        .map(|entry| remap(entry, tables))
        .collect()
}
