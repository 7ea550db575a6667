use crate::enrich::DefinitionCandidate;
use crate::error::{Result, WordFreqError};
use crate::models::{LexicalResource, PartOfSpeech};
use crate::progress::{ProgressReporter, ProgressUpdate, report_progress};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::time::Instant;

// --- Schema Definition ---

const SCHEMA_VERSION: u32 = 2;

const CREATE_METADATA_TABLE: &str = "
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

const CREATE_LEXICONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS lexicons (
    id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    language TEXT NOT NULL,
    version TEXT NOT NULL,
    license TEXT
);";

const CREATE_LEXICAL_ENTRIES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS lexical_entries (
    id TEXT PRIMARY KEY,
    lexicon_id TEXT NOT NULL,
    lemma_written_form TEXT NOT NULL,
    lemma_written_form_lower TEXT NOT NULL, -- For case-insensitive search
    part_of_speech TEXT NOT NULL, -- Stored as TEXT (e.g., 'n', 'v')
    FOREIGN KEY (lexicon_id) REFERENCES lexicons(id)
);";

const CREATE_SYNSETS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS synsets (
    id TEXT PRIMARY KEY,
    lexicon_id TEXT NOT NULL,
    ili TEXT,
    part_of_speech TEXT NOT NULL,
    FOREIGN KEY (lexicon_id) REFERENCES lexicons(id)
);";

// rowid order of senses and definitions is document order, which is sense frequency order.
const CREATE_SENSES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS senses (
    id TEXT PRIMARY KEY,
    entry_id TEXT NOT NULL,
    synset_id TEXT NOT NULL,
    FOREIGN KEY (entry_id) REFERENCES lexical_entries(id),
    FOREIGN KEY (synset_id) REFERENCES synsets(id)
);";

const CREATE_DEFINITIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS definitions (
    synset_id TEXT NOT NULL,
    text TEXT NOT NULL,
    FOREIGN KEY (synset_id) REFERENCES synsets(id)
);";

// --- Indices ---

const CREATE_ENTRY_LEMMA_POS_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_entry_lemma_pos ON lexical_entries (lemma_written_form_lower, part_of_speech);";
const CREATE_SENSE_ENTRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sense_entry ON senses (entry_id);";
const CREATE_SENSE_SYNSET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sense_synset ON senses (synset_id);";
const CREATE_DEFINITION_SYNSET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_definition_synset ON definitions (synset_id);";

const SELECT_DEFINITIONS: &str = "
    SELECT s.synset_id, COALESCE(d.text, '')
    FROM lexical_entries e
    JOIN senses s ON s.entry_id = e.id
    LEFT JOIN definitions d ON d.synset_id = s.synset_id
    WHERE e.lemma_written_form_lower = ?1 AND e.part_of_speech IN (?2, ?3)
    ORDER BY e.rowid, s.rowid, d.rowid
";

// --- Initialization Function ---

/// Creates all necessary tables and indices in the database if they don't exist.
/// Also checks and sets the schema version.
pub fn initialize_database(conn: &mut Connection) -> Result<()> {
    info!(
        "Initializing database schema (version {})...",
        SCHEMA_VERSION
    );
    let tx = conn.transaction()?;

    tx.execute(CREATE_METADATA_TABLE, [])?;
    tx.execute(CREATE_LEXICONS_TABLE, [])?;
    tx.execute(CREATE_LEXICAL_ENTRIES_TABLE, [])?;
    tx.execute(CREATE_SYNSETS_TABLE, [])?;
    tx.execute(CREATE_SENSES_TABLE, [])?;
    tx.execute(CREATE_DEFINITIONS_TABLE, [])?;

    tx.execute(CREATE_ENTRY_LEMMA_POS_INDEX, [])?;
    tx.execute(CREATE_SENSE_ENTRY_INDEX, [])?;
    tx.execute(CREATE_SENSE_SYNSET_INDEX, [])?;
    tx.execute(CREATE_DEFINITION_SYNSET_INDEX, [])?;

    let existing_version_str: Option<String> = tx
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match existing_version_str {
        Some(v_str) => {
            let existing_version: u32 = v_str.parse().map_err(|e| {
                WordFreqError::Internal(format!(
                    "Failed to parse existing schema version '{}': {}",
                    v_str, e
                ))
            })?;
            if existing_version != SCHEMA_VERSION {
                warn!(
                    "Database schema version ({}) differs from expected ({}). Use --force-reload if lookups fail.",
                    existing_version, SCHEMA_VERSION
                );
            } else {
                debug!(
                    "Database schema version ({}) matches expected version.",
                    existing_version
                );
            }
        }
        None => {
            tx.execute(
                "INSERT INTO metadata (key, value) VALUES ('schema_version', ?1)",
                params![SCHEMA_VERSION.to_string()],
            )?;
            info!("Set initial schema version in metadata table.");
        }
    }

    tx.commit()?;
    info!("Database schema initialization complete.");
    Ok(())
}

// --- Data Population Function ---

/// Populates the database tables from a parsed LexicalResource.
/// Assumes the database is empty or has just been cleared.
pub fn populate_database(
    conn: &mut Connection,
    resource: &LexicalResource,
    reporter: Option<&ProgressReporter>,
) -> Result<()> {
    info!("Populating database from parsed LexicalResource using prepared statements...");
    let start_time = Instant::now();

    let total_entries = resource.lexicons.iter().map(|l| l.lexical_entries.len()).sum::<usize>() as u64;
    let total_synsets = resource.lexicons.iter().map(|l| l.synsets.len()).sum::<usize>() as u64;
    let pass1_total = resource.lexicons.len() as u64 + total_entries + total_synsets;
    let pass2_total = total_entries + total_synsets;

    let tx = conn.transaction()?;
    {
        let mut lexicon_stmt = tx.prepare(
            "INSERT INTO lexicons (id, label, language, version, license) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut entry_stmt = tx.prepare(
            "INSERT INTO lexical_entries (id, lexicon_id, lemma_written_form, lemma_written_form_lower, part_of_speech)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut synset_stmt = tx.prepare(
            "INSERT INTO synsets (id, lexicon_id, ili, part_of_speech) VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut sense_stmt =
            tx.prepare("INSERT INTO senses (id, entry_id, synset_id) VALUES (?1, ?2, ?3)")?;
        let mut def_stmt =
            tx.prepare("INSERT INTO definitions (synset_id, text) VALUES (?1, ?2)")?;

        // --- Pass 1: Lexicons, Entries, Synsets ---
        let stage = "Pass 1/2: Inserting Core Entities".to_string();
        info!("Population {}", stage);
        report_progress(reporter, ProgressUpdate::new_stage(stage.clone(), Some(pass1_total)));
        let mut current = 0;

        for lexicon in &resource.lexicons {
            debug!("Pass 1: Inserting lexicon: {}", lexicon.id);
            lexicon_stmt.execute(params![
                lexicon.id,
                lexicon.label,
                lexicon.language,
                lexicon.version,
                lexicon.license,
            ])?;
            current += 1;

            for entry in &lexicon.lexical_entries {
                entry_stmt.execute(params![
                    entry.id,
                    lexicon.id,
                    entry.lemma.written_form,
                    entry.lemma.written_form.to_lowercase(),
                    part_of_speech_to_string(entry.lemma.part_of_speech),
                ])?;
                current += 1;
            }
            for synset in &lexicon.synsets {
                synset_stmt.execute(params![
                    synset.id,
                    lexicon.id,
                    synset.ili,
                    part_of_speech_to_string(synset.part_of_speech),
                ])?;
                current += 1;
            }
            report_progress(
                reporter,
                ProgressUpdate::new(
                    stage.clone(),
                    current,
                    Some(pass1_total),
                    Some(format!("Lexicon: {}", lexicon.id)),
                ),
            );
        }

        // --- Pass 2: Senses and Definitions ---
        let stage = "Pass 2/2: Inserting Senses".to_string();
        info!("Population {}", stage);
        report_progress(reporter, ProgressUpdate::new_stage(stage.clone(), Some(pass2_total)));
        let mut current = 0;

        for lexicon in &resource.lexicons {
            for entry in &lexicon.lexical_entries {
                for sense in &entry.senses {
                    sense_stmt.execute(params![sense.id, entry.id, sense.synset])?;
                }
                current += 1;
                if current % 10_000 == 0 {
                    report_progress(
                        reporter,
                        ProgressUpdate::new(stage.clone(), current, Some(pass2_total), None),
                    );
                }
            }
            for synset in &lexicon.synsets {
                for definition in &synset.definitions {
                    def_stmt.execute(params![synset.id, definition.text])?;
                }
                current += 1;
                if current % 10_000 == 0 {
                    report_progress(
                        reporter,
                        ProgressUpdate::new(stage.clone(), current, Some(pass2_total), None),
                    );
                }
            }
        }
        report_progress(
            reporter,
            ProgressUpdate::new(stage, pass2_total, Some(pass2_total), None),
        );
    }
    tx.commit()?;

    info!(
        "Database population complete. Took {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}

/// Helper to clear all data from WordNet tables before repopulating.
pub fn clear_database_data(tx: &Transaction) -> Result<()> {
    info!("Clearing existing data from database tables...");
    // Referencing tables first
    tx.execute("DELETE FROM definitions", [])?;
    tx.execute("DELETE FROM senses", [])?;
    tx.execute("DELETE FROM synsets", [])?;
    tx.execute("DELETE FROM lexical_entries", [])?;
    tx.execute("DELETE FROM lexicons", [])?;
    info!("Finished clearing data.");
    Ok(())
}

pub fn count_lexicons(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM lexicons", [], |row| row.get(0))?)
}

/// Definitions of `lemma` (case-insensitive) in up to two parts of speech.
///
/// Every sense yields at least one candidate; a synset without a definition gives an empty one.
pub fn query_definitions(
    conn: &Connection,
    lemma: &str,
    parts_of_speech: &[PartOfSpeech],
) -> Result<Vec<DefinitionCandidate>> {
    let (first, second) = match parts_of_speech {
        [only] => (*only, None),
        [first, second] => (*first, Some(*second)),
        _ => {
            return Err(WordFreqError::Internal(format!(
                "Definition query needs one or two parts of speech, got {}",
                parts_of_speech.len()
            )));
        }
    };

    let mut stmt = conn.prepare_cached(SELECT_DEFINITIONS)?;
    let rows = stmt.query_map(
        params![
            lemma.to_lowercase(),
            part_of_speech_to_string(first),
            second.map(part_of_speech_to_string),
        ],
        |row| {
            Ok(DefinitionCandidate {
                synset_id: row.get(0)?,
                definition: row.get(1)?,
            })
        },
    )?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(WordFreqError::from)
}

// --- Enum to String Conversion Helpers ---

pub(crate) fn part_of_speech_to_string(pos: PartOfSpeech) -> &'static str {
    match pos {
        PartOfSpeech::N => "n",
        PartOfSpeech::V => "v",
        PartOfSpeech::A => "a",
        PartOfSpeech::R => "r",
        PartOfSpeech::S => "s",
        PartOfSpeech::C => "c",
        PartOfSpeech::P => "p",
        PartOfSpeech::X => "x",
        PartOfSpeech::U => "u",
    }
}
