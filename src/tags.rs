//! Part-of-speech tables for the BNC frequency corpus.
//!
//! Tag meanings (from *Word Frequencies in Written and Spoken English*, p. 13):
//!
//! | Tag    | Meaning                                   |
//! |--------|-------------------------------------------|
//! | Adj    | adjective                                 |
//! | Adv    | adverb                                    |
//! | ClO    | clause opener (*in order that*)           |
//! | Conj   | conjunction                               |
//! | Det    | determiner                                |
//! | DetP   | determiner/pronoun                        |
//! | Ex     | existential particle (*there is*)         |
//! | Fore   | foreign word                              |
//! | Form   | formula                                   |
//! | Gen    | genitive (*'s*)                           |
//! | Inf    | infinitive marker (*to*)                  |
//! | Int    | interjection or discourse marker          |
//! | Lett   | letter of the alphabet                    |
//! | Neg    | negative marker                           |
//! | NoC    | common noun                               |
//! | NoP    | proper noun                               |
//! | NoP-   | word normally part of a proper noun       |
//! | Num    | cardinal number                           |
//! | Ord    | ordinal                                   |
//! | Prep   | preposition                               |
//! | Pron   | pronoun                                   |
//! | Verb   | verb, excluding modal auxiliaries         |
//! | VMod   | modal auxiliary verb                      |
//! | Uncl   | unclassified                              |

use crate::error::{Result, WordFreqError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Every tag that occurs in the corpus. `Err` rows exist too but are corpus errors.
pub const ALL_CORPUS_TAGS: &[&str] = &[
    "Uncl", "DetP", "Fore", "NoP", "Adj", "Det", "Inf", "Lett", "NoC", "Prep", "Pron", "Int",
    "Verb", "Adv", "Conj", "Form", "Num", "VMod", "Ex", "ClO", "Neg", "Gen",
];

/// Tags whose words never make it into the word list.
pub const DISALLOWED_CORPUS_TAGS: &[&str] = &[
    "Num", "Ord", "NoP-", "Neg", "Lett", "Int", "Inf", "Form", "Fore", "Ex", "Det", "DetP",
    "Conj", "ClO", "Uncl", "Prep", "Gen", "NoP", "Pron",
];

/// Corpus tag to grammatical class.
pub const CLASS_MAPPING: &[(&str, GrammaticalClass)] = &[
    ("NoC", GrammaticalClass::Noun),
    ("NoP", GrammaticalClass::Noun),
    ("Pron", GrammaticalClass::Noun),
    ("Verb", GrammaticalClass::Verb),
    ("Adj", GrammaticalClass::Adjective),
    ("Adv", GrammaticalClass::Adverb),
    ("VMod", GrammaticalClass::Adverb),
];

/// The four classes the lexical database understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammaticalClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl GrammaticalClass {
    pub const ALL: [GrammaticalClass; 4] = [
        GrammaticalClass::Noun,
        GrammaticalClass::Verb,
        GrammaticalClass::Adjective,
        GrammaticalClass::Adverb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GrammaticalClass::Noun => "noun",
            GrammaticalClass::Verb => "verb",
            GrammaticalClass::Adjective => "adjective",
            GrammaticalClass::Adverb => "adverb",
        }
    }
}

impl std::fmt::Display for GrammaticalClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// For CLI parsing
impl std::str::FromStr for GrammaticalClass {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "n" | "noun" => Ok(GrammaticalClass::Noun),
            "v" | "verb" => Ok(GrammaticalClass::Verb),
            "a" | "adj" | "adjective" => Ok(GrammaticalClass::Adjective),
            "r" | "adv" | "adverb" => Ok(GrammaticalClass::Adverb),
            _ => Err(format!("Invalid grammatical class: {}", s)),
        }
    }
}

/// Immutable tag configuration, built once per run.
#[derive(Debug, Clone)]
pub struct TagTables {
    all: BTreeSet<&'static str>,
    allowed: BTreeSet<&'static str>,
    mapping: HashMap<&'static str, GrammaticalClass>,
}

impl TagTables {
    /// The tables used for the BNC corpus.
    pub fn standard() -> Result<Self> {
        Self::new(ALL_CORPUS_TAGS, DISALLOWED_CORPUS_TAGS, CLASS_MAPPING)
    }

    /// Builds the tables, computing `allowed = all - disallowed`.
    ///
    /// Fails if an allowed tag has no class mapping, since such words could never be looked up.
    pub fn new(
        all: &[&'static str],
        disallowed: &[&'static str],
        mapping: &[(&'static str, GrammaticalClass)],
    ) -> Result<Self> {
        let all: BTreeSet<_> = all.iter().copied().collect();
        let disallowed: BTreeSet<_> = disallowed.iter().copied().collect();
        let allowed: BTreeSet<_> = all.difference(&disallowed).copied().collect();
        let mapping: HashMap<_, _> = mapping.iter().copied().collect();

        let unmapped: Vec<_> = allowed
            .iter()
            .filter(|tag| !mapping.contains_key(*tag))
            .copied()
            .collect();
        if !unmapped.is_empty() {
            return Err(WordFreqError::Internal(format!(
                "Allowed corpus tags without a grammatical class: {}",
                unmapped.join(", ")
            )));
        }

        Ok(TagTables {
            all,
            allowed,
            mapping,
        })
    }

    pub fn is_known(&self, tag: &str) -> bool {
        self.all.contains(tag)
    }

    pub fn is_allowed(&self, tag: &str) -> bool {
        self.allowed.contains(tag)
    }

    pub fn class_for(&self, tag: &str) -> Option<GrammaticalClass> {
        self.mapping.get(tag).copied()
    }

    /// Allowed tags in sorted order.
    pub fn allowed_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.allowed.iter().copied()
    }
}
