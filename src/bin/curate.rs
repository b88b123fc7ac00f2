//! Manual curation over the content database: add, list, tag, play.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use music_corpus::config::Config;
use music_corpus::pipeline::process_url;
use music_corpus::progress::init_logging;
use music_corpus::store::{ContentStore, ListQuery, SqliteContentStore, StoredContent};
use music_corpus::tags::parse_tag_list;
use music_corpus::youtube::YouTubeClient;

#[derive(Parser)]
#[command(name = "curate")]
#[command(about = "Curate the music content database")]
struct Args {
    /// Database path; overrides config and MUSIC_CORPUS_DB
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a URL and add it, with optional comma-separated tags
    Add { url: String, tags: Option<String> },
    /// List entries
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Newest first
        #[arg(long)]
        recent: bool,
        /// Only entries without tags
        #[arg(long)]
        untagged: bool,
    },
    /// Add comma-separated tags to an entry
    Tag { id: i64, tags: String },
    /// Print the playback URL of an entry
    Play { id: i64 },
}

fn add(store: &SqliteContentStore, config: &Config, url: &str, tags: Option<&str>) -> Result<()> {
    let catalog = YouTubeClient::new(config.api_key()?, &config.api_base_url, config.timeout());
    let content = process_url(&catalog, url, config.member_sample_size)
        .with_context(|| format!("Failed to classify {}", url))?;

    if store.insert_if_absent(&content)? {
        println!("Added {}: {}", content.content_type, content.name);
    } else {
        println!("Already present: {} {}", content.content_type, content.name);
    }

    let user_tags = tags.map(parse_tag_list).unwrap_or_default();
    if !user_tags.is_empty() {
        let Some(row) = store.find(content.content_type, &content.identifier)? else {
            bail!("Entry for {} vanished after insert", content.identifier);
        };
        if let Some(merged) = store.add_tags(row.id, &user_tags)? {
            println!("Tags: {}", merged.join(", "));
        }
    }
    Ok(())
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "N/A",
    }
}

fn print_table(rows: &[StoredContent]) {
    if rows.is_empty() {
        println!("No entries.");
        return;
    }
    println!(
        "{:<6} | {:<8} | {:<40} | {:<24} | {:<30} | Created At",
        "ID", "Type", "Name", "Artist", "Tags"
    );
    println!("{:-<130}", "");
    for row in rows {
        let tags = row.tags.join(",");
        println!(
            "{:<6} | {:<8} | {:<40} | {:<24} | {:<30} | {}",
            row.id,
            row.content_type.as_str(),
            row.name,
            or_na(row.artist_name.as_deref()),
            or_na(Some(tags.as_str())),
            row.created_at
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(false);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(db) = args.db {
        config.database = db;
    }
    // Curation tags are always stored; pipeline details follow the config.
    let store = SqliteContentStore::open(&config.database, config.persist_details)?;

    match args.command {
        Command::Add { url, tags } => add(&store, &config, &url, tags.as_deref())?,
        Command::List {
            limit,
            recent,
            untagged,
        } => {
            let rows = store.list(&ListQuery {
                limit,
                recent,
                untagged,
            })?;
            print_table(&rows);
        }
        Command::Tag { id, tags } => match store.add_tags(id, &parse_tag_list(&tags))? {
            Some(merged) => println!("Tags for {}: {}", id, merged.join(", ")),
            None => eprintln!("No entry with id {}", id),
        },
        Command::Play { id } => match store.get(id)? {
            Some(row) => println!("{}", row.playback_url()),
            None => eprintln!("No entry with id {}", id),
        },
    }
    Ok(())
}
