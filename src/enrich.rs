//! Definition lookup for ranked words.
//!
//! Lookups run on the blocking thread pool with a bounded number in flight. Results are
//! gathered in input order, so the ranking from [`crate::transform`] survives enrichment.

use crate::config::EnrichOptions;
use crate::error::{Result, WordFreqError};
use crate::progress::{ProgressReporter, ProgressUpdate, report_progress};
use crate::tags::GrammaticalClass;
use crate::transform::WordEntry;
use futures::stream::{self, StreamExt};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::{task, time};

/// One definition offered by the lexical database for a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionCandidate {
    /// Identifier of the sense group the definition belongs to.
    pub synset_id: String,
    pub definition: String,
}

/// A read-only source of definitions, one lookup per grammatical class.
///
/// Candidates come back most common sense first. An empty result means the database does not
/// know the word in that class; an `Err` means the database itself failed.
pub trait LexicalDatabase: Send + Sync + 'static {
    fn lookup_noun(&self, word: &str) -> Result<Vec<DefinitionCandidate>>;
    fn lookup_verb(&self, word: &str) -> Result<Vec<DefinitionCandidate>>;
    fn lookup_adjective(&self, word: &str) -> Result<Vec<DefinitionCandidate>>;
    fn lookup_adverb(&self, word: &str) -> Result<Vec<DefinitionCandidate>>;
}

pub type LookupFn<D> = fn(&D, &str) -> Result<Vec<DefinitionCandidate>>;

/// The database operation serving `class`.
pub fn lookup_operation<D: LexicalDatabase>(class: GrammaticalClass) -> LookupFn<D> {
    match class {
        GrammaticalClass::Noun => D::lookup_noun,
        GrammaticalClass::Verb => D::lookup_verb,
        GrammaticalClass::Adjective => D::lookup_adjective,
        GrammaticalClass::Adverb => D::lookup_adverb,
    }
}

/// The first candidate's definition, trimmed. Blank definitions count as none.
pub fn select_definition(candidates: &[DefinitionCandidate]) -> Option<String> {
    candidates
        .first()
        .map(|c| c.definition.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// A ranked word with its definition; the shape written to the word list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedWordEntry {
    pub word: String,
    pub pos: GrammaticalClass,
    pub freq: Option<i64>,
    pub disp: Option<f64>,
    pub ra: Option<i64>,
    pub definition: String,
}

impl EnrichedWordEntry {
    pub fn new(entry: WordEntry, definition: String) -> Self {
        EnrichedWordEntry {
            word: entry.word,
            pos: entry.pos,
            freq: entry.freq,
            disp: entry.disp,
            ra: entry.ra,
            definition,
        }
    }
}

/// Attaches definitions to `entries`, dropping words the database cannot define.
///
/// The first failed or timed-out lookup aborts the whole stage.
pub async fn enrich<D: LexicalDatabase>(
    entries: Vec<WordEntry>,
    database: Arc<D>,
    options: &EnrichOptions,
    reporter: Option<&ProgressReporter>,
) -> Result<Vec<EnrichedWordEntry>> {
    options.validate()?;
    let start_time = Instant::now();
    let total = entries.len() as u64;
    let stage_desc = "Looking up definitions".to_string();
    info!(
        "Looking up definitions for {} words (up to {} at a time)...",
        total, options.concurrency
    );
    report_progress(reporter, ProgressUpdate::new_stage(stage_desc.clone(), Some(total)));

    let lookup_timeout = options.lookup_timeout;
    let mut lookups = stream::iter(entries)
        .map(|entry| lookup_entry(Arc::clone(&database), entry, lookup_timeout))
        .buffered(options.concurrency);

    let mut enriched = Vec::new();
    let mut completed = 0u64;
    while let Some(result) = lookups.next().await {
        let (entry, definition) = result?;
        completed += 1;
        report_progress(
            reporter,
            ProgressUpdate::new(
                stage_desc.clone(),
                completed,
                Some(total),
                Some(entry.word.clone()),
            ),
        );
        match definition {
            Some(definition) => enriched.push(EnrichedWordEntry::new(entry, definition)),
            None => debug!("No {} definition for '{}', dropping it.", entry.pos, entry.word),
        }
    }

    info!(
        "Found definitions for {} of {} words. Took {:.2?}",
        enriched.len(),
        total,
        start_time.elapsed()
    );
    Ok(enriched)
}

async fn lookup_entry<D: LexicalDatabase>(
    database: Arc<D>,
    entry: WordEntry,
    limit: Duration,
) -> Result<(WordEntry, Option<String>)> {
    let lookup = lookup_operation::<D>(entry.pos);
    let word = entry.word.clone();
    let handle = task::spawn_blocking(move || lookup(&*database, &word));

    let candidates = match time::timeout(limit, handle).await {
        Ok(joined) => joined?.map_err(|e| lookup_error(&entry, e.to_string()))?,
        Err(_) => {
            return Err(lookup_error(&entry, format!("timed out after {:?}", limit)));
        }
    };
    let definition = select_definition(&candidates);
    Ok((entry, definition))
}

fn lookup_error(entry: &WordEntry, reason: String) -> WordFreqError {
    WordFreqError::LookupError {
        word: entry.word.clone(),
        class: entry.pos,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory database; words listed in `slow` sleep before answering.
    #[derive(Default)]
    struct FakeDatabase {
        definitions: HashMap<(GrammaticalClass, String), Vec<String>>,
        slow: HashMap<String, Duration>,
        broken: Option<String>,
        calls: Mutex<Vec<(GrammaticalClass, String)>>,
    }

    impl FakeDatabase {
        fn define(mut self, class: GrammaticalClass, word: &str, definitions: &[&str]) -> Self {
            self.definitions.insert(
                (class, word.to_string()),
                definitions.iter().map(|d| d.to_string()).collect(),
            );
            self
        }

        fn lookup(&self, class: GrammaticalClass, word: &str) -> Result<Vec<DefinitionCandidate>> {
            self.calls.lock().unwrap().push((class, word.to_string()));
            if let Some(delay) = self.slow.get(word) {
                std::thread::sleep(*delay);
            }
            if self.broken.as_deref() == Some(word) {
                return Err(WordFreqError::Internal("database unavailable".to_string()));
            }
            Ok(self
                .definitions
                .get(&(class, word.to_string()))
                .map(|defs| {
                    defs.iter()
                        .enumerate()
                        .map(|(i, d)| DefinitionCandidate {
                            synset_id: format!("{}-{}", word, i),
                            definition: d.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    impl LexicalDatabase for FakeDatabase {
        fn lookup_noun(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
            self.lookup(GrammaticalClass::Noun, word)
        }
        fn lookup_verb(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
            self.lookup(GrammaticalClass::Verb, word)
        }
        fn lookup_adjective(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
            self.lookup(GrammaticalClass::Adjective, word)
        }
        fn lookup_adverb(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
            self.lookup(GrammaticalClass::Adverb, word)
        }
    }

    fn word(word: &str, pos: GrammaticalClass, freq: i64) -> WordEntry {
        WordEntry {
            word: word.to_string(),
            pos,
            freq: Some(freq),
            disp: Some(0.5),
            ra: Some(freq),
        }
    }

    #[test]
    fn test_select_definition_trims_first_candidate() {
        let candidates = vec![
            DefinitionCandidate {
                synset_id: "s1".into(),
                definition: "  a piece of furniture  ".into(),
            },
            DefinitionCandidate {
                synset_id: "s2".into(),
                definition: "something else".into(),
            },
        ];
        assert_eq!(
            select_definition(&candidates),
            Some("a piece of furniture".to_string())
        );
        assert_eq!(select_definition(&[]), None);
        let blank = vec![DefinitionCandidate {
            synset_id: "s3".into(),
            definition: " \t ".into(),
        }];
        assert_eq!(select_definition(&blank), None);
    }

    #[test]
    fn test_lookup_operation_dispatches_by_class() {
        let db = FakeDatabase::default();
        for class in GrammaticalClass::ALL {
            lookup_operation::<FakeDatabase>(class)(&db, "probe").unwrap();
        }
        let calls = db.calls.lock().unwrap();
        let classes: Vec<_> = calls.iter().map(|(c, _)| *c).collect();
        assert_eq!(classes, GrammaticalClass::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_enrich_desk_and_drops_unknown_words() {
        let db = FakeDatabase::default()
            .define(GrammaticalClass::Noun, "desk", &["  a piece of furniture  "])
            // Defined as a verb only, so a noun lookup finds nothing.
            .define(GrammaticalClass::Verb, "zorb", &["to roll downhill in a ball"]);
        let entries = vec![
            word("desk", GrammaticalClass::Noun, 120),
            word("zorb", GrammaticalClass::Noun, 130),
        ];

        let enriched = enrich(entries, Arc::new(db), &EnrichOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].word, "desk");
        assert_eq!(enriched[0].pos, GrammaticalClass::Noun);
        assert_eq!(enriched[0].definition, "a piece of furniture");
        assert_eq!(enriched[0].freq, Some(120));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_enrich_preserves_order_when_lookups_finish_out_of_order() {
        let mut db = FakeDatabase::default();
        let mut entries = Vec::new();
        for i in 0..20u64 {
            let w = format!("word{}", i);
            db = db.define(GrammaticalClass::Adjective, &w, &["def"]);
            // Earlier words take longer.
            db.slow.insert(w.clone(), Duration::from_millis((20 - i) * 5));
            entries.push(word(&w, GrammaticalClass::Adjective, i as i64));
        }
        let expected: Vec<_> = entries.iter().map(|e| e.word.clone()).collect();

        let options = EnrichOptions {
            concurrency: 8,
            ..EnrichOptions::default()
        };
        let enriched = enrich(entries, Arc::new(db), &options, None).await.unwrap();
        let words: Vec<_> = enriched.into_iter().map(|e| e.word).collect();
        assert_eq!(words, expected);
    }

    #[tokio::test]
    async fn test_enrich_lookup_failure_is_fatal() {
        let db = FakeDatabase {
            broken: Some("desk".to_string()),
            ..FakeDatabase::default()
        };
        let entries = vec![word("desk", GrammaticalClass::Noun, 1)];
        match enrich(entries, Arc::new(db), &EnrichOptions::default(), None).await {
            Err(WordFreqError::LookupError { word, class, reason }) => {
                assert_eq!(word, "desk");
                assert_eq!(class, GrammaticalClass::Noun);
                assert!(reason.contains("database unavailable"));
            }
            other => panic!("expected lookup error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrich_lookup_timeout_is_fatal() {
        let mut db = FakeDatabase::default().define(GrammaticalClass::Verb, "wait", &["to stay"]);
        db.slow.insert("wait".to_string(), Duration::from_millis(300));
        let options = EnrichOptions {
            concurrency: 1,
            lookup_timeout: Duration::from_millis(20),
        };
        let entries = vec![word("wait", GrammaticalClass::Verb, 1)];
        let result = enrich(entries, Arc::new(db), &options, None).await;
        assert!(matches!(result, Err(WordFreqError::LookupError { .. })));
    }

    #[tokio::test]
    async fn test_enrich_reports_progress_per_word() {
        let db = FakeDatabase::default().define(GrammaticalClass::Adverb, "well", &["in a good way"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(Box::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push((update.current_item, update.total_items));
            true
        }));
        let entries = vec![
            word("well", GrammaticalClass::Adverb, 1),
            word("unknown", GrammaticalClass::Adverb, 2),
        ];
        enrich(entries, Arc::new(db), &EnrichOptions::default(), Some(&reporter))
            .await
            .unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(0, Some(2)), (1, Some(2)), (2, Some(2))]
        );
    }
}
