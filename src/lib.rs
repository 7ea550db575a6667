//! Builds a ranked, definition-annotated word list from the BNC word-frequency corpus.
//!
//! The pipeline has four stages:
//!
//! 1. [`corpus`] reads the tab-delimited, HTML-entity-encoded corpus;
//! 2. [`transform`] drops alternate forms and unwanted parts of speech, ranks the words by
//!    (frequency, dispersion, rank) and maps corpus tags to [`GrammaticalClass`]es;
//! 3. [`enrich`] looks up a definition for every word in a [`LexicalDatabase`] (by default
//!    Open English WordNet, see [`WordNet`]);
//! 4. [`writer`] writes the result as an indented JSON array.
//!
//! Any [`LexicalDatabase`] can drive enrichment:
//!
//! ```
//! use std::sync::Arc;
//! use wordfreq_rs::enrich::{DefinitionCandidate, LexicalDatabase, enrich};
//! use wordfreq_rs::{EnrichOptions, GrammaticalClass, Result, WordEntry};
//!
//! struct Furniture;
//!
//! impl LexicalDatabase for Furniture {
//!     fn lookup_noun(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
//!         Ok(match word {
//!             "desk" => vec![DefinitionCandidate {
//!                 synset_id: "desk-n-1".into(),
//!                 definition: "  a piece of furniture  ".into(),
//!             }],
//!             _ => Vec::new(),
//!         })
//!     }
//!     fn lookup_verb(&self, _: &str) -> Result<Vec<DefinitionCandidate>> { Ok(Vec::new()) }
//!     fn lookup_adjective(&self, _: &str) -> Result<Vec<DefinitionCandidate>> { Ok(Vec::new()) }
//!     fn lookup_adverb(&self, _: &str) -> Result<Vec<DefinitionCandidate>> { Ok(Vec::new()) }
//! }
//!
//! let words = vec![WordEntry {
//!     word: "desk".into(),
//!     pos: GrammaticalClass::Noun,
//!     freq: Some(120),
//!     disp: Some(3.2),
//!     ra: Some(45),
//! }];
//! let enriched = tokio_test::block_on(enrich(
//!     words,
//!     Arc::new(Furniture),
//!     &EnrichOptions::default(),
//!     None,
//! ))?;
//! assert_eq!(enriched[0].definition, "a piece of furniture");
//! # Ok::<(), wordfreq_rs::WordFreqError>(())
//! ```

// Declare modules
pub mod config;
pub mod corpus;
pub mod data;
pub mod db;
pub mod enrich;
pub mod error;
pub mod models;
pub mod parse;
pub mod progress;
pub mod tags;
pub mod transform;
pub mod wordnet;
pub mod writer;

#[cfg(test)]
mod test_utils;

// Re-export key types for easier use
pub use config::{EnrichOptions, PipelineOptions};
pub use enrich::{DefinitionCandidate, EnrichedWordEntry, LexicalDatabase};
pub use error::{Result, WordFreqError};
pub use tags::{GrammaticalClass, TagTables};
pub use transform::{NumericPolicy, WordEntry};
pub use wordnet::{LoadOptions, WordNet};

use log::info;
use progress::ProgressReporter;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;

/// Row and word counts from a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    pub records_read: usize,
    pub words_ranked: usize,
    pub words_written: usize,
}

/// Runs the whole pipeline: load, transform, enrich, write.
///
/// Nothing is written unless every stage succeeds.
pub async fn generate_word_list<D: LexicalDatabase>(
    options: &PipelineOptions,
    database: Arc<D>,
    reporter: Option<&ProgressReporter>,
) -> Result<GenerationSummary> {
    options.validate()?;
    let start_time = Instant::now();
    let tables = TagTables::standard()?;

    let records = corpus::load_corpus(&options.input_path).await?;
    let records_read = records.len();

    let ranked = transform::transform(records, &tables, options.numeric_policy)?;
    let words_ranked = ranked.len();

    let enriched = enrich::enrich(ranked, database, &options.enrich, reporter).await?;
    let words_written = enriched.len();

    let output_path = options.output_path.clone();
    task::spawn_blocking(move || writer::write_word_list(&output_path, &enriched)).await??;

    info!(
        "Generated word list with {} words from {} corpus rows. Took {:.2?}",
        words_written,
        records_read,
        start_time.elapsed()
    );
    Ok(GenerationSummary {
        records_read,
        words_ranked,
        words_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_test_lmf;
    use std::path::Path;
    use tempfile::tempdir;

    const TEST_CORPUS: &str = "\
\tdesk\tNoC\t%\t120\t45\t3.2
\tdesks\t@\t@\t@\t@\t@
\tplural@s\tNoC\t%\t1\t1\t0.1
\tseven\tNum\t%\t5\t2\t0.5
\trun\tVerb\t%\t300\t12\t0.95
\trun\tNoC\t%\t80\t800\t0.9
\tred\tAdj\t%\t80\t700\t0.9
\tquickly\tAdv\t%\t40\t1200\t0.85
\tbank\tNoC\t%\t40\t1300\t0.85
\tcaf&eacute;\tNoC\t%\t15\t5000\t0.7
\tcan\tVMod\t%\t2000\t30\t0.97
";

    async fn fixture_wordnet(dir: &Path) -> Arc<WordNet> {
        let options = LoadOptions {
            db_path: Some(dir.join("wordnet.db")),
            force_reload: false,
            xml_path: Some(write_test_lmf(dir)),
        };
        Arc::new(WordNet::load_with_options(options, None).await.unwrap())
    }

    fn pipeline_options(dir: &Path, output: &str) -> PipelineOptions {
        let input_path = dir.join("corpus.tsv");
        std::fs::write(&input_path, TEST_CORPUS).unwrap();
        PipelineOptions {
            input_path,
            output_path: dir.join(output),
            ..PipelineOptions::default()
        }
    }

    #[tokio::test]
    async fn test_generate_word_list_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempdir().unwrap();
        let wordnet = fixture_wordnet(dir.path()).await;
        let options = pipeline_options(dir.path(), "wordFreqList.json");

        let summary = generate_word_list(&options, wordnet, None).await.unwrap();
        assert_eq!(summary.records_read, 11);
        // desk, run/Verb, run/NoC, red, quickly, bank, café, can
        assert_eq!(summary.words_ranked, 8);
        // café and can are unknown to the fixture, bank has a blank definition.
        assert_eq!(summary.words_written, 5);

        let written = std::fs::read_to_string(&options.output_path).unwrap();
        let words: Vec<EnrichedWordEntry> = serde_json::from_str(&written).unwrap();
        assert_eq!(summary.words_written, words.len());

        let listed: Vec<_> = words
            .iter()
            .map(|w| (w.word.as_str(), w.pos.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("quickly", "adverb"),
                ("red", "adjective"),
                ("run", "noun"),
                ("desk", "noun"),
                ("run", "verb"),
            ]
        );

        let desk = &words[3];
        assert_eq!(desk.freq, Some(120));
        assert_eq!(desk.ra, Some(45));
        assert_eq!(desk.disp, Some(3.2));
        assert_eq!(desk.definition, "a piece of furniture with a writing surface");

        for w in &words {
            assert!(!w.definition.is_empty());
            assert_eq!(w.definition.trim(), w.definition);
            assert!(!w.word.contains('@'));
        }
        assert!(words.windows(2).all(|pair| pair[0].freq <= pair[1].freq));
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let dir = tempdir().unwrap();
        let wordnet = fixture_wordnet(dir.path()).await;

        let first = pipeline_options(dir.path(), "first.json");
        let second = PipelineOptions {
            output_path: dir.path().join("second.json"),
            ..first.clone()
        };
        generate_word_list(&first, Arc::clone(&wordnet), None).await.unwrap();
        generate_word_list(&second, wordnet, None).await.unwrap();

        let a = std::fs::read(&first.output_path).unwrap();
        let b = std::fs::read(&second.output_path).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_failed_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let wordnet = fixture_wordnet(dir.path()).await;
        let mut options = pipeline_options(dir.path(), "out.json");
        std::fs::write(&options.input_path, "\tdesk\tNoC\t%\tmany\t45\t3.2\n").unwrap();
        options.numeric_policy = NumericPolicy::Strict;

        let result = generate_word_list(&options, wordnet, None).await;
        assert!(matches!(result, Err(WordFreqError::ParseError(_))));
        assert!(!options.output_path.exists());
    }
}
