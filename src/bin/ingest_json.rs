//! Load a batch results file into the content database.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use music_corpus::config::Config;
use music_corpus::ingest::{load_results, persist_records};
use music_corpus::progress::init_logging;
use music_corpus::store::SqliteContentStore;

#[derive(Parser)]
#[command(name = "ingest-json")]
#[command(about = "Insert classified records from a results file into the database")]
struct Args {
    /// Results file written by music-corpus
    input: PathBuf,

    /// Database path; overrides config and MUSIC_CORPUS_DB
    #[arg(long)]
    db: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store description and tags as well
    #[arg(long)]
    with_details: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(false);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(db) = args.db {
        config.database = db;
    }
    if args.with_details {
        config.persist_details = true;
    }

    let report = load_results(&args.input)?;
    let store = SqliteContentStore::open(&config.database, config.persist_details)?;
    let summary = persist_records(&store, report.records.iter().map(|(_, record)| record));

    println!(
        "Inserted {} records into {} ({} already present, {} failed, {} skipped)",
        summary.inserted,
        config.database.display(),
        summary.already_present,
        summary.failed,
        report.errors.len() + report.malformed.len()
    );
    Ok(())
}
