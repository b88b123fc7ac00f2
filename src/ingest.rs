//! Re-ingestion of batch results into the store.
//!
//! Accepts the batch JSON written by `music-corpus` (an array of entries)
//! and the older map form keyed by URL. Entries are decoded one at a
//! time: an error entry or a malformed record is reported and skipped,
//! the rest of the file still goes in.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::assemble::renormalize;
use crate::models::{BatchEntry, ClassifiedContent, Outcome};
use crate::store::ContentStore;

/// Decoded contents of a results file.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// (url, record) in file order
    pub records: Vec<(String, ClassifiedContent)>,
    /// (url, error) for entries the pipeline could not classify
    pub errors: Vec<(String, String)>,
    /// Entries that could not be decoded, with the reason
    pub malformed: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub inserted: usize,
    pub already_present: usize,
    pub failed: usize,
}

fn decode_entry(value: Value, label: &str, report: &mut IngestReport) {
    let entry: BatchEntry = match serde_json::from_value(value) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(entry = label, error = %e, "malformed entry, skipping");
            report.malformed.push(format!("{}: {}", label, e));
            return;
        }
    };
    match entry.outcome {
        Outcome::Failed { error } => {
            warn!(url = %entry.url, %error, "skipping failed entry");
            report.errors.push((entry.url, error));
        }
        Outcome::Classified(content) if content.identifier.trim().is_empty() => {
            warn!(url = %entry.url, "record without identifier, skipping");
            report.malformed.push(format!("{}: empty identifier", label));
        }
        Outcome::Classified(content) => report.records.push((entry.url, renormalize(&content))),
    }
}

/// Decode a results document.
pub fn parse_results(json: &str) -> Result<IngestReport> {
    let doc: Value = serde_json::from_str(json).context("Invalid JSON")?;
    let mut report = IngestReport::default();
    match doc {
        Value::Array(entries) => {
            for (i, value) in entries.into_iter().enumerate() {
                decode_entry(value, &format!("entry {}", i), &mut report);
            }
        }
        Value::Object(map) => {
            for (url, value) in map {
                let value = match value {
                    Value::Object(mut fields) => {
                        fields.insert("url".to_string(), Value::String(url.clone()));
                        Value::Object(fields)
                    }
                    other => other,
                };
                decode_entry(value, &url, &mut report);
            }
        }
        _ => bail!("Expected a JSON array or object of results"),
    }
    Ok(report)
}

pub fn load_results(path: &Path) -> Result<IngestReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file {:?}", path))?;
    parse_results(&text).with_context(|| format!("Failed to parse {:?}", path))
}

/// Insert records into the store. A failing insert is logged and counted,
/// not propagated.
pub fn persist_records<'a, S, I>(store: &S, records: I) -> PersistSummary
where
    S: ContentStore + ?Sized,
    I: IntoIterator<Item = &'a ClassifiedContent>,
{
    let mut summary = PersistSummary::default();
    for content in records {
        match store.insert_if_absent(content) {
            Ok(true) => summary.inserted += 1,
            Ok(false) => summary.already_present += 1,
            Err(e) => {
                warn!(identifier = %content.identifier, error = %e, "insert failed");
                summary.failed += 1;
            }
        }
    }
    info!(
        inserted = summary.inserted,
        already_present = summary.already_present,
        failed = summary.failed,
        "persisted records"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use crate::store::SqliteContentStore;
    use std::cell::RefCell;

    const BATCH: &str = r#"[
        {"url": "https://youtu.be/v1", "type": "SONG", "name": "Never Gonna Give You Up",
         "artist_name": "Rick Astley", "identifier": "v1", "tags": ["pop"]},
        {"url": "https://example.com", "error": "invalid URL"},
        {"url": "https://youtu.be/v2", "type": "SONG", "artist_name": "Nameless", "identifier": "v2"},
        {"url": "https://www.youtube.com/playlist?list=PL1", "type": "ALBUM", "name": "The Wall",
         "artist_name": "Pink Floyd", "identifier": "PL1", "tags": []},
        {"url": "https://youtu.be/v1", "type": "SONG", "name": "Never Gonna Give You Up",
         "artist_name": "Rick Astley", "identifier": "v1", "tags": ["pop"]}
    ]"#;

    #[test]
    fn test_parse_skips_errors_and_malformed() {
        let report = parse_results(BATCH).unwrap();
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.errors, vec![("https://example.com".to_string(), "invalid URL".to_string())]);
        assert_eq!(report.malformed.len(), 1);
        assert!(report.malformed[0].starts_with("entry 2"));
    }

    #[test]
    fn test_legacy_map_form() {
        let legacy = r#"{
            "https://youtu.be/dQw4w9WgXcQ": {
                "type": "Video", "name": "Never Gonna Give You Up", "artist_name": "Rick Astley",
                "youtube_id": "dQw4w9WgXcQ", "description": "Official music video.", "tags": ["pop"]
            },
            "https://youtu.be/gone": {"error": "Video not found"}
        }"#;
        let report = parse_results(legacy).unwrap();
        assert_eq!(report.records.len(), 1);
        let (url, record) = &report.records[0];
        assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(record.content_type, ContentType::Song);
        assert_eq!(record.identifier, "dQw4w9WgXcQ");
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_legacy_map_keeps_file_order() {
        let legacy = r#"{
            "https://youtu.be/zzz": {"type": "Video", "name": "Last", "youtube_id": "zzz"},
            "https://youtu.be/aaa": {"type": "Video", "name": "First", "youtube_id": "aaa"},
            "https://youtu.be/mmm": {"type": "Video", "name": "Middle", "youtube_id": "mmm"}
        }"#;
        let report = parse_results(legacy).unwrap();
        let ids: Vec<&str> = report.records.iter().map(|(_, r)| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn test_not_json() {
        assert!(parse_results("not json").is_err());
        assert!(parse_results("42").is_err());
    }

    #[test]
    fn test_persist_duplicates_skipped() {
        let store = SqliteContentStore::open_in_memory(false).unwrap();
        let report = parse_results(BATCH).unwrap();
        let summary = persist_records(&store, report.records.iter().map(|(_, r)| r));
        assert_eq!(
            summary,
            PersistSummary {
                inserted: 2,
                already_present: 1,
                failed: 0
            }
        );
        assert_eq!(store.count().unwrap(), 2);
    }

    struct FlakyStore {
        calls: RefCell<usize>,
    }

    impl ContentStore for FlakyStore {
        fn insert_if_absent(&self, _content: &ClassifiedContent) -> Result<bool> {
            *self.calls.borrow_mut() += 1;
            if *self.calls.borrow() == 1 {
                bail!("disk I/O error");
            }
            Ok(true)
        }
    }

    #[test]
    fn test_persist_failure_does_not_abort() {
        let store = FlakyStore {
            calls: RefCell::new(0),
        };
        let report = parse_results(BATCH).unwrap();
        let summary = persist_records(&store, report.records.iter().map(|(_, r)| r));
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.inserted, 2);
    }

    #[test]
    fn test_load_results_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, BATCH).unwrap();
        assert_eq!(load_results(&path).unwrap().records.len(), 3);
        assert!(load_results(&dir.path().join("missing.json")).is_err());
    }
}
