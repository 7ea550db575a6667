use crate::error::{Result, WordFreqError};
use crate::models::LexicalResource;
use flate2::read::GzDecoder;
use log::{debug, info};
use quick_xml::de::from_str;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tokio::task;

/// Parses WN-LMF XML content into a LexicalResource struct using spawn_blocking.
pub async fn parse_lmf(xml_content: String) -> Result<LexicalResource> {
    debug!("Starting WN-LMF XML parsing (using spawn_blocking)...");
    let resource = task::spawn_blocking(move || -> Result<LexicalResource> {
        from_str(&xml_content).map_err(WordFreqError::from)
    })
    .await??;
    debug!("Successfully parsed WN-LMF XML into LexicalResource.");
    Ok(resource)
}

/// Reads a WN-LMF file, transparently gunzipping `.gz` files.
pub async fn read_lmf_file(path: &Path) -> Result<String> {
    info!("Reading WN-LMF file: {:?}", path);
    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
    if !is_gzip {
        return Ok(tokio::fs::read_to_string(path).await?);
    }

    let path = path.to_path_buf();
    let content = task::spawn_blocking(move || -> std::io::Result<String> {
        let mut decoder = GzDecoder::new(BufReader::new(File::open(&path)?));
        let mut content = String::new();
        decoder.read_to_string(&mut content)?;
        Ok(content)
    })
    .await??;
    Ok(content)
}
