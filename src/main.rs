use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use music_corpus::config::Config;
use music_corpus::ingest::persist_records;
use music_corpus::pipeline::{read_url_list, run_batch, BatchSummary};
use music_corpus::progress::init_logging;
use music_corpus::safety::validate_output_path;
use music_corpus::store::SqliteContentStore;
use music_corpus::youtube::YouTubeClient;

#[derive(Parser)]
#[command(name = "music-corpus")]
#[command(about = "Resolve media URLs to classified catalog records")]
struct Args {
    /// Text file with one URL per line
    input: PathBuf,

    /// Batch results file (JSON)
    output: PathBuf,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also insert classified records into this database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Worker threads (0 = sequential); overrides the config file
    #[arg(long)]
    workers: Option<usize>,

    /// Hide progress bars, log periodic progress lines instead
    #[arg(long)]
    log_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_only);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let api_key = config.api_key()?;

    let mut sources = vec![args.input.as_path()];
    if let Some(db) = args.db.as_deref() {
        sources.push(db);
    }
    validate_output_path(&args.output, "json", &sources)?;

    let start = Instant::now();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file {:?}", args.input))?;
    let urls = read_url_list(&text);
    info!(count = urls.len(), input = ?args.input, "read URLs");

    let catalog = YouTubeClient::new(api_key, &config.api_base_url, config.timeout());
    let entries = run_batch(&catalog, &urls, &config.pipeline_options())?;

    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("Failed to write output file {:?}", args.output))?;

    let persisted = match args.db.as_deref() {
        Some(db) => {
            let store = SqliteContentStore::open(db, config.persist_details)?;
            Some(persist_records(&store, entries.iter().filter_map(|e| e.classified())))
        }
        None => None,
    };

    let summary = BatchSummary::of(&entries);
    println!("\n{:=<60}", "");
    println!("Metadata has been saved to {}", args.output.display());
    println!("  URLs: {}", entries.len());
    println!("  Classified: {}", summary.classified);
    println!("  Skipped: {}", summary.failed);
    if let Some(p) = persisted {
        println!(
            "  Database: {} inserted, {} already present, {} failed",
            p.inserted, p.already_present, p.failed
        );
    }
    println!("  Elapsed: {:.1}s", start.elapsed().as_secs_f64());
    println!("{:=<60}", "");

    Ok(())
}
