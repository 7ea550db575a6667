//! Open English WordNet as the lexical database for enrichment.

use crate::data;
use crate::db;
use crate::enrich::{DefinitionCandidate, LexicalDatabase};
use crate::error::{Result, WordFreqError};
use crate::models::PartOfSpeech;
use crate::parse::{parse_lmf, read_lmf_file};
use crate::progress::ProgressReporter;
use crate::tags::GrammaticalClass;
use directories_next::ProjectDirs;
use log::{debug, error, info};
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task;

/// Options for loading WordNet data.
#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    /// Optional path to a specific database file to use or create.
    /// If None, the default location based on ProjectDirs will be used.
    pub db_path: Option<PathBuf>,
    /// Force reloading data from XML and repopulating the database,
    /// ignoring any existing database content.
    pub force_reload: bool,
    /// Local WN-LMF file (`.xml` or `.xml.gz`) to populate from instead of the OEWN download.
    pub xml_path: Option<PathBuf>,
}

/// The WordNet lookup handle.
#[derive(Clone)] // Clone is cheap due to Arc<Mutex<...>>
pub struct WordNet {
    // rusqlite connections are not Sync; lookups from the blocking pool take turns.
    conn: Arc<Mutex<Connection>>,
    db_file_path: Arc<PathBuf>,
}

// Helper function to open/create the database connection
fn open_db_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "cache_size", "-64000")?; // 64MB
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    Ok(conn)
}

/// WordNet parts of speech searched for a grammatical class. Adjectives include satellites.
pub fn parts_of_speech_for(class: GrammaticalClass) -> &'static [PartOfSpeech] {
    match class {
        GrammaticalClass::Noun => &[PartOfSpeech::N],
        GrammaticalClass::Verb => &[PartOfSpeech::V],
        GrammaticalClass::Adjective => &[PartOfSpeech::A, PartOfSpeech::S],
        GrammaticalClass::Adverb => &[PartOfSpeech::R],
    }
}

impl WordNet {
    /// Loads the WordNet data with specific options.
    ///
    /// Opens/creates the database, initializes the schema, and populates it from XML when the
    /// database is new, empty, or a reload was forced.
    pub async fn load_with_options(
        options: LoadOptions,
        reporter: Option<ProgressReporter>,
    ) -> Result<Self> {
        let db_path = match options.db_path {
            Some(path) => {
                info!("Using provided database path: {:?}", path);
                path
            }
            None => Self::get_default_db_path()?,
        };

        let db_exists = db_path.exists();
        let mut needs_population = !db_exists || options.force_reload;

        let mut conn = open_db_connection(&db_path)?;
        db::initialize_database(&mut conn)?;

        if !needs_population {
            if db::count_lexicons(&conn)? == 0 {
                info!("Database exists but appears empty. Triggering population.");
                needs_population = true;
            } else {
                info!("Database exists and contains data. Skipping population.");
            }
        }

        if needs_population {
            if options.force_reload && db_exists {
                info!("Force reload requested. Clearing existing database data before population...");
                let tx = conn.transaction()?;
                db::clear_database_data(&tx)?;
                tx.commit()?;
            } else {
                info!("Database needs population (first run or empty).");
            }

            let xml_path = match options.xml_path {
                Some(path) => path,
                None => data::ensure_data(reporter.as_ref()).await?,
            };
            let xml_content = read_lmf_file(&xml_path).await?;
            let resource = parse_lmf(xml_content).await?;

            conn = task::spawn_blocking(move || -> Result<Connection> {
                db::populate_database(&mut conn, &resource, reporter.as_ref())?;
                Ok(conn)
            })
            .await??;
        } else {
            info!("Using existing populated database: {:?}", db_path);
        }

        Ok(WordNet {
            conn: Arc::new(Mutex::new(conn)),
            db_file_path: Arc::new(db_path),
        })
    }

    /// Gets the default path for the SQLite database file.
    pub fn get_default_db_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("org", "WordFreqRs", data::DATA_SUBDIR)
            .ok_or(WordFreqError::DataDirNotFound)?;
        let data_dir = project_dirs.data_dir();
        fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(format!("oewn-{}.db", data::OEWN_VERSION)))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_file_path
    }

    /// Clears the WordNet database file(s).
    ///
    /// If `db_path_override` is `None`, the default database path is used.
    pub fn clear_database(db_path_override: Option<PathBuf>) -> Result<()> {
        let path_to_clear = match db_path_override {
            Some(path) => path,
            None => Self::get_default_db_path()?,
        };
        info!("Attempting to clear database file: {:?}", path_to_clear);

        if !path_to_clear.exists() {
            info!(
                "Database file not found, nothing to clear: {:?}",
                path_to_clear
            );
            return Ok(());
        }

        match fs::remove_file(&path_to_clear) {
            Ok(_) => {
                info!("Successfully deleted database file: {:?}", path_to_clear);
                // SQLite names its side files <db>-wal and <db>-shm.
                for suffix in ["-wal", "-shm"] {
                    let mut side_file = path_to_clear.clone().into_os_string();
                    side_file.push(suffix);
                    let _ = fs::remove_file(PathBuf::from(side_file));
                }
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete database file {:?}: {}", path_to_clear, e);
                Err(WordFreqError::Io(e))
            }
        }
    }

    /// Looks up definitions for `lemma` in the given parts of speech, most common sense first.
    pub fn lookup_definitions(
        &self,
        lemma: &str,
        parts_of_speech: &[PartOfSpeech],
    ) -> Result<Vec<DefinitionCandidate>> {
        let conn_guard = self
            .conn
            .lock()
            .map_err(|_| WordFreqError::Internal("Mutex poisoned".to_string()))?;
        let candidates = db::query_definitions(&conn_guard, lemma, parts_of_speech)?;
        debug!(
            "lookup_definitions: lemma='{}', pos={:?}: {} candidates",
            lemma,
            parts_of_speech,
            candidates.len()
        );
        Ok(candidates)
    }

    pub fn lookup_class(
        &self,
        lemma: &str,
        class: GrammaticalClass,
    ) -> Result<Vec<DefinitionCandidate>> {
        self.lookup_definitions(lemma, parts_of_speech_for(class))
    }
}

impl LexicalDatabase for WordNet {
    fn lookup_noun(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
        self.lookup_class(word, GrammaticalClass::Noun)
    }

    fn lookup_verb(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
        self.lookup_class(word, GrammaticalClass::Verb)
    }

    fn lookup_adjective(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
        self.lookup_class(word, GrammaticalClass::Adjective)
    }

    fn lookup_adverb(&self, word: &str) -> Result<Vec<DefinitionCandidate>> {
        self.lookup_class(word, GrammaticalClass::Adverb)
    }
}
