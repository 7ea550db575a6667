//! Command-line interface for building the definition-annotated word frequency list.
//!
//! This CLI generates the word list, shows which definition a word would receive, and
//! manages the cached WordNet database.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{LevelFilter, error, info};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wordfreq_rs::{
    EnrichOptions, GrammaticalClass, LoadOptions, NumericPolicy, PipelineOptions, WordNet,
    config::{DEFAULT_CONCURRENCY, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE},
    enrich::{lookup_operation, select_definition},
    error::Result,
    generate_word_list,
    progress::{ProgressCallback, ProgressReporter, ProgressUpdate},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "BNC word frequency list builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a custom WordNet database file (optional)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Populate the database from this WN-LMF file (.xml or .xml.gz) instead of downloading OEWN
    #[arg(long, global = true)]
    wordnet_xml: Option<PathBuf>,

    /// Force reload data, ignoring existing database content
    #[arg(long, global = true, default_value_t = false)]
    force_reload: bool,

    /// Set verbosity level (use -v, -vv, or -vvv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the word list from the frequency corpus
    Generate {
        /// Tab-delimited corpus file
        #[arg(long, default_value = DEFAULT_INPUT_FILE)]
        input: PathBuf,
        /// Where to write the JSON word list
        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
        /// Maximum number of definition lookups in flight
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
        /// Seconds a single lookup may take before the run is aborted
        #[arg(long, default_value_t = 30)]
        lookup_timeout: u64,
        /// Fail on numeric fields that do not parse instead of treating them as missing
        #[arg(long, default_value_t = false)]
        strict_numbers: bool,
    },
    /// Show the definitions a word has and the one the word list would use
    Define {
        /// The word to define
        word: String,
        /// Grammatical class (noun, verb, adjective, adverb)
        class: GrammaticalClass,
    },
    /// Clear the WordNet database
    ClearDb,
}

/// Sets up logging based on verbosity level.
fn setup_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter(None, log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// Creates a progress callback for displaying download, population and lookup progress.
fn create_progress_callback(
    multi_progress: MultiProgress,
    progress_bars: Arc<Mutex<HashMap<String, ProgressBar>>>,
) -> ProgressCallback {
    Box::new(move |update: ProgressUpdate| {
        let Ok(mut bars) = progress_bars.lock() else {
            return true;
        };

        if update.current_item == 0 && !bars.contains_key(&update.stage_description) {
            let pb = multi_progress.add(ProgressBar::new(update.total_items.unwrap_or(0)));
            let style_template = if update.total_items.is_some() {
                "{prefix:>12.cyan.bold} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({percent}%) {msg}"
            } else {
                "{prefix:>12.cyan.bold} [{elapsed_precise}] {spinner} {msg}"
            };
            if let Ok(style) = ProgressStyle::default_bar().template(style_template) {
                pb.set_style(style.progress_chars("##-"));
            }
            pb.set_prefix(update.stage_description.clone());
            pb.set_message(update.message.unwrap_or_default());
            pb.enable_steady_tick(Duration::from_millis(100));
            bars.insert(update.stage_description.clone(), pb);
        } else if let Some(pb) = bars.get(&update.stage_description) {
            pb.set_position(update.current_item);
            if let Some(msg) = update.message {
                pb.set_message(msg);
            }
            if let Some(total) = update.total_items {
                if update.current_item >= total {
                    pb.finish_and_clear();
                }
            }
        }
        true
    })
}

fn finish_progress(progress_bars: &Arc<Mutex<HashMap<String, ProgressBar>>>) {
    if let Ok(bars) = progress_bars.lock() {
        for pb in bars.values() {
            pb.finish_and_clear();
        }
    }
    std::io::stdout().flush().ok();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Commands::ClearDb = cli.command {
        info!("Clearing database...");
        match WordNet::clear_database(cli.db_path) {
            Ok(_) => println!("{}", "Database cleared successfully.".green()),
            Err(e) => fail("Error clearing database", &e),
        }
        return;
    }

    let multi_progress = MultiProgress::new();
    let progress_bars = Arc::new(Mutex::new(HashMap::<String, ProgressBar>::new()));
    let reporter = ProgressReporter::new(create_progress_callback(
        multi_progress.clone(),
        progress_bars.clone(),
    ));

    info!("Loading WordNet data...");
    let load_options = LoadOptions {
        db_path: cli.db_path,
        force_reload: cli.force_reload,
        xml_path: cli.wordnet_xml,
    };
    let wn = match WordNet::load_with_options(load_options, Some(reporter.clone())).await {
        Ok(wn) => {
            info!("WordNet data loaded from {:?}.", wn.db_path());
            wn
        }
        Err(e) => {
            finish_progress(&progress_bars);
            fail("Failed to load WordNet data", &e);
        }
    };

    match cli.command {
        Commands::Generate {
            input,
            output,
            concurrency,
            lookup_timeout,
            strict_numbers,
        } => {
            let options = PipelineOptions {
                input_path: input,
                output_path: output,
                numeric_policy: if strict_numbers {
                    NumericPolicy::Strict
                } else {
                    NumericPolicy::Lenient
                },
                enrich: EnrichOptions {
                    concurrency,
                    lookup_timeout: Duration::from_secs(lookup_timeout),
                },
            };
            let result = generate_word_list(&options, Arc::new(wn), Some(&reporter)).await;
            finish_progress(&progress_bars);
            match result {
                Ok(summary) => println!(
                    "{} {} words ({} ranked from {} corpus rows) to {}",
                    "Wrote".green().bold(),
                    summary.words_written.to_string().bold(),
                    summary.words_ranked,
                    summary.records_read,
                    options.output_path.display().to_string().cyan()
                ),
                Err(e) => fail("Error generating word list", &e),
            }
        }
        Commands::Define { word, class } => {
            finish_progress(&progress_bars);
            if let Err(e) = handle_define(&wn, &word, class) {
                fail(&format!("Error defining '{}'", word), &e);
            }
        }
        Commands::ClearDb => unreachable!("handled before loading"),
    }
}

fn fail(context: &str, e: &wordfreq_rs::WordFreqError) -> ! {
    error!("{}: {}", context, e);
    eprintln!("{}", format!("{}: {}", context, e).red());
    std::process::exit(1);
}

/// Prints every candidate definition and marks the one the word list would use.
fn handle_define(wn: &WordNet, word: &str, class: GrammaticalClass) -> Result<()> {
    info!("Defining word: '{}' as {}", word, class);
    let candidates = lookup_operation::<WordNet>(class)(wn, word)?;

    println!("\n{} ~ {}", word.bold().cyan(), class.to_string().italic());
    match select_definition(&candidates) {
        Some(selected) => println!("  {}: {}", "Selected".magenta(), selected.green()),
        None => {
            println!("  No usable definition; '{}' would be left out.", word.yellow());
        }
    }
    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "  {}: {} {}",
            (i + 1).to_string().bold(),
            candidate.definition.trim(),
            format!("[{}]", candidate.synset_id).dimmed()
        );
    }
    Ok(())
}
