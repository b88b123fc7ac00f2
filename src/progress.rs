//! Progress bar and logging utilities.
//!
//! Binaries call `init_logging` once. In log-only mode progress bars are
//! hidden and replaced by periodic `[phase] n/total` log lines, which reads
//! better when output is redirected to a file.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

const BAR_TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (ETA: {eta})";

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

fn log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Install the tracing subscriber and pick the progress mode.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(log_only: bool) {
    LOG_ONLY.store(log_only, Ordering::Relaxed);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, repeated calls) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Bar for one batch phase; drawn nowhere in log-only mode.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len).with_message(msg.to_string());
    if log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }
    pb.set_style(
        ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

/// Emit a `[phase] n/total` line every `interval` items, log-only mode only.
pub fn log_progress(phase: &str, current: u64, total: u64, interval: u64) {
    if total == 0 || !log_only() {
        return;
    }
    if current % interval.max(1) == 0 || current == total {
        let pct = 100.0 * current as f64 / total as f64;
        tracing::info!("[{}] {}/{} ({:.1}%)", phase, current, total, pct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_progress_handles_empty_total() {
        LOG_ONLY.store(true, Ordering::Relaxed);
        log_progress("RESOLVE", 0, 0, 10);
        log_progress("RESOLVE", 5, 5, 0);
        LOG_ONLY.store(false, Ordering::Relaxed);
    }

    #[test]
    fn test_progress_bar_keeps_length_and_message() {
        let pb = create_progress_bar(7, "Resolving URLs");
        assert_eq!(pb.length(), Some(7));
        assert_eq!(pb.message(), "Resolving URLs");
    }
}
