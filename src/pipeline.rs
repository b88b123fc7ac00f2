//! Batch pipeline: URL → handle → raw metadata → classification → record.
//!
//! Every input line yields exactly one `BatchEntry`, in input order,
//! duplicates and unrecognized URLs included. A failure on one URL is
//! recorded against that URL and never stops the batch.

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::assemble::build_record;
use crate::catalog::CatalogClient;
use crate::classify::classify;
use crate::error::FetchError;
use crate::extract::extract_handle;
use crate::fetch::{fetch_metadata, DEFAULT_MEMBER_SAMPLE_SIZE};
use crate::models::{BatchEntry, ClassifiedContent, Outcome};
use crate::progress::{create_progress_bar, log_progress};

/// Log a progress line every N handles in log-only mode.
const LOG_INTERVAL: u64 = 25;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub member_sample_size: usize,
    /// 0 = sequential
    pub workers: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            member_sample_size: DEFAULT_MEMBER_SAMPLE_SIZE,
            workers: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub classified: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(entries: &[BatchEntry]) -> Self {
        let classified = entries.iter().filter(|e| e.classified().is_some()).count();
        Self {
            classified,
            failed: entries.len() - classified,
        }
    }
}

/// URLs from a text file body: one per line, blank lines ignored.
pub fn read_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run the full pipeline for a single URL.
pub fn process_url<C: CatalogClient + ?Sized>(
    catalog: &C,
    url: &str,
    member_sample_size: usize,
) -> Result<ClassifiedContent, FetchError> {
    let handle = extract_handle(url);
    if handle.is_unknown() {
        return Err(FetchError::InvalidUrl);
    }
    let raw = fetch_metadata(catalog, &handle, member_sample_size)?;
    let classification = classify(handle.kind, &raw)?;
    Ok(build_record(&handle, classification, &raw))
}

fn entry_for<C: CatalogClient + ?Sized>(catalog: &C, url: &str, sample_size: usize) -> BatchEntry {
    let outcome = match process_url(catalog, url, sample_size) {
        Ok(content) => Outcome::Classified(content),
        Err(e) => {
            warn!(url, error = %e, "skipping");
            Outcome::Failed {
                error: e.to_string(),
            }
        }
    };
    BatchEntry {
        url: url.to_string(),
        outcome,
    }
}

/// Process a batch of URLs. Output order matches `urls`.
///
/// With `workers > 0` handles run on a dedicated bounded pool; results are
/// identical to the sequential run.
pub fn run_batch<C: CatalogClient + Sync + ?Sized>(
    catalog: &C,
    urls: &[String],
    options: &PipelineOptions,
) -> Result<Vec<BatchEntry>> {
    let total = urls.len() as u64;
    let pb = create_progress_bar(total, "Resolving URLs");
    let sample_size = options.member_sample_size;

    let step = |url: &String| {
        let entry = entry_for(catalog, url, sample_size);
        pb.inc(1);
        log_progress("RESOLVE", pb.position(), total, LOG_INTERVAL);
        entry
    };

    let entries: Vec<BatchEntry> = if options.workers > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
            .context("Failed to build worker pool")?;
        pool.install(|| urls.par_iter().map(step).collect())
    } else {
        urls.iter().map(step).collect()
    };

    let summary = BatchSummary::of(&entries);
    pb.finish_with_message(format!(
        "Resolved {} URLs ({} classified, {} skipped)",
        entries.len(),
        summary.classified,
        summary.failed
    ));
    info!(
        total = entries.len(),
        classified = summary.classified,
        skipped = summary.failed,
        "batch complete"
    );
    Ok(entries)
}
