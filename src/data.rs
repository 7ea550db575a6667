//! Data download and management for the OEWN release.
//!
//! This module handles downloading the OEWN XML data from GitHub releases,
//! caching it locally, and decompressing it as needed.

use crate::error::{Result, WordFreqError};
use crate::progress::{ProgressReporter, ProgressUpdate, report_progress};
use directories_next::ProjectDirs;
use flate2::read::GzDecoder;
use futures::StreamExt;
use log::info;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// OEWN version being targeted
pub const OEWN_VERSION: &str = "2024";
/// Subdirectory name within user's data directory
pub const DATA_SUBDIR: &str = "wordfreq-rs";
const OEWN_FILENAME_GZ: &str = "english-wordnet-2024.xml.gz";
const OEWN_FILENAME_XML: &str = "english-wordnet-2024.xml";
const OEWN_DOWNLOAD_URL: &str = "https://github.com/globalwordnet/english-wordnet/releases/download/2024-edition/english-wordnet-2024.xml.gz";

/// Gets the project's data directory path.
/// Creates the directory if it doesn't exist.
pub fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("org", "WordFreqRs", DATA_SUBDIR).ok_or(WordFreqError::DataDirNotFound)?;
    let data_dir = proj_dirs.data_dir().to_path_buf();
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Downloads a file from a URL to a specified path using streaming with progress reporting.
///
/// The body is streamed into a temporary file that is only moved to `dest_path` once complete.
async fn download_file(
    url: &str,
    dest_path: &Path,
    reporter: Option<&ProgressReporter>,
) -> Result<()> {
    let stage_desc = "Downloading OEWN data".to_string();

    info!(
        "Downloading data from {} to {:?} (streaming)...",
        url, dest_path
    );
    let response = reqwest::get(url).await?.error_for_status()?;
    let total_size = response.content_length();
    report_progress(
        reporter,
        ProgressUpdate::new(stage_desc.clone(), 0, total_size, None),
    );

    let dest_dir = dest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp_file = tempfile::NamedTempFile::new_in(dest_dir)?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            writer.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            report_progress(
                reporter,
                ProgressUpdate::new(stage_desc.clone(), downloaded, total_size, None),
            );
        }
        writer.flush()?;
    }
    temp_file.persist(dest_path).map_err(|e| e.error)?;

    report_progress(
        reporter,
        ProgressUpdate::new(
            stage_desc,
            total_size.unwrap_or(downloaded),
            total_size.or(Some(downloaded)),
            Some("Download complete.".to_string()),
        ),
    );
    info!("Download complete ({} bytes).", downloaded);
    Ok(())
}

/// Decompresses a GZipped file on the blocking pool.
async fn decompress_gz(
    gz_path: &Path,
    dest_path: &Path,
    reporter: Option<&ProgressReporter>,
) -> Result<()> {
    let stage_desc = "Decompressing OEWN data".to_string();

    info!("Decompressing {:?} to {:?}...", gz_path, dest_path);
    report_progress(reporter, ProgressUpdate::new_stage(stage_desc.clone(), None));

    let gz_path = gz_path.to_path_buf();
    let dest_path = dest_path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let gz_file = File::open(&gz_path)?;
        let mut decoder = GzDecoder::new(BufReader::new(gz_file));
        let mut dest_file = BufWriter::new(File::create(&dest_path)?);
        io::copy(&mut decoder, &mut dest_file)?;
        dest_file.flush()?;
        Ok::<(), std::io::Error>(())
    })
    .await??;

    report_progress(
        reporter,
        ProgressUpdate::new(
            stage_desc,
            1,
            Some(1),
            Some("Decompression complete.".to_string()),
        ),
    );
    info!("Decompression complete.");
    Ok(())
}

/// Ensures the OEWN XML data file is present in the data directory.
/// This function downloads and/or decompresses the data if necessary.
pub async fn ensure_data(reporter: Option<&ProgressReporter>) -> Result<PathBuf> {
    ensure_data_in(&get_data_dir()?, reporter).await
}

async fn ensure_data_in(data_dir: &Path, reporter: Option<&ProgressReporter>) -> Result<PathBuf> {
    let xml_path = data_dir.join(OEWN_FILENAME_XML);
    let gz_path = data_dir.join(OEWN_FILENAME_GZ);

    if xml_path.exists() {
        info!("Found existing OEWN XML data file: {:?}", xml_path);
        return Ok(xml_path);
    }
    info!("OEWN XML data file not found at {:?}.", xml_path);

    if !gz_path.exists() {
        info!("OEWN GZ archive not found at {:?}. Downloading...", gz_path);
        download_file(OEWN_DOWNLOAD_URL, &gz_path, reporter).await?;
    } else {
        info!("Found existing OEWN GZ archive: {:?}", gz_path);
    }

    decompress_gz(&gz_path, &xml_path, reporter).await?;
    Ok(xml_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Helper to create a dummy gz file for testing decompression
    fn create_dummy_gz(path: &Path, content: &str) -> io::Result<()> {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(content.as_bytes())?;
        encoder.finish()?;
        Ok(())
    }

    #[tokio::test]
    async fn test_decompress_gz_basic() {
        let _ = env_logger::builder().is_test(true).try_init();
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let gz_path = temp_dir.path().join("test.xml.gz");
        let xml_path = temp_dir.path().join("test.xml");
        let content = "This is the test content.";

        create_dummy_gz(&gz_path, content).expect("Failed to create dummy GZ");

        let result = decompress_gz(&gz_path, &xml_path, None).await;
        assert!(result.is_ok(), "Decompression failed: {:?}", result.err());
        let decompressed_content =
            fs::read_to_string(&xml_path).expect("Failed to read decompressed file");
        assert_eq!(decompressed_content, content);
    }

    #[tokio::test]
    async fn test_ensure_data_prefers_existing_files() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let data_dir = scopeguard::guard(temp_dir, |d| {
            let _ = d.close();
        });

        // Only the archive is present: it is decompressed, nothing is downloaded.
        let dummy_xml = "<LexicalResource><Lexicon id='test'/></LexicalResource>";
        create_dummy_gz(&data_dir.path().join(OEWN_FILENAME_GZ), dummy_xml).unwrap();
        let xml_path = ensure_data_in(data_dir.path(), None).await.unwrap();
        assert_eq!(xml_path, data_dir.path().join(OEWN_FILENAME_XML));
        assert_eq!(fs::read_to_string(&xml_path).unwrap(), dummy_xml);

        // Now the XML exists and is returned as is.
        fs::write(&xml_path, "<xml>cached</xml>").unwrap();
        let again = ensure_data_in(data_dir.path(), None).await.unwrap();
        assert_eq!(fs::read_to_string(again).unwrap(), "<xml>cached</xml>");
    }
}
