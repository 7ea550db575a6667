//! Run configuration for the word list pipeline.

use crate::error::{Result, WordFreqError};
use crate::transform::NumericPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Corpus file name of the BNC "all words, alphabetical" list.
pub const DEFAULT_INPUT_FILE: &str = "1_1_all_fullalpha.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "wordFreqList.json";
pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for the enrichment stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Maximum number of lookups in flight at once.
    pub concurrency: usize,
    /// How long a single lookup may take before the run is aborted.
    pub lookup_timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        EnrichOptions {
            concurrency: DEFAULT_CONCURRENCY,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl EnrichOptions {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(WordFreqError::InvalidArgument(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.lookup_timeout.is_zero() {
            return Err(WordFreqError::InvalidArgument(
                "lookup timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options for a full pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub numeric_policy: NumericPolicy,
    pub enrich: EnrichOptions,
}

impl Default for PipelineOptions {
    /// Paths are relative to the working directory.
    fn default() -> Self {
        PipelineOptions {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            numeric_policy: NumericPolicy::default(),
            enrich: EnrichOptions::default(),
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<()> {
        if self.input_path == self.output_path {
            return Err(WordFreqError::InvalidArgument(format!(
                "input and output are the same file: {:?}",
                self.input_path
            )));
        }
        self.enrich.validate()
    }
}
