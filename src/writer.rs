//! Writing the finished word list.

use crate::enrich::EnrichedWordEntry;
use crate::error::{Result, WordFreqError};
use log::info;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `entries` as an indented JSON array to `path`.
///
/// The data goes to a temporary file next to `path` first and is renamed into place once
/// complete, so `path` never holds a partial list.
pub fn write_word_list(path: &Path, entries: &[EnrichedWordEntry]) -> Result<()> {
    let write_error = |source: io::Error| WordFreqError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    info!("Writing {} words to {:?}...", entries.len(), path);
    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_error)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, entries)
            .map_err(|e| write_error(io::Error::from(e)))?;
        writer.flush().map_err(write_error)?;
    }
    temp_file.as_file().sync_all().map_err(write_error)?;
    temp_file.persist(path).map_err(|e| write_error(e.error))?;

    info!("Word list written to {:?}", path);
    Ok(())
}
