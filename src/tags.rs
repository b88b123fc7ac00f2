//! Tag normalization.
//!
//! Catalog tags are noisy: uploaders repeat the title, the artist name and
//! the names of individual tracks, and almost everything carries "Music".
//! `normalize_tags` strips that structural noise and de-duplicates
//! case-insensitively, keeping the first casing seen.

use rustc_hash::FxHashSet;

/// Genre keyword carried by nearly every item; never useful as a tag.
pub const GENERIC_TAG: &str = "music";

/// What a tag set is being cleaned against.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagContext<'a> {
    pub name: &'a str,
    pub artist_name: Option<&'a str>,
    pub member_titles: &'a [String],
    /// Albums and playlists; their artist name is dropped from the tags
    pub is_aggregate: bool,
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

fn is_noise(tag: &str, ctx: &TagContext<'_>) -> bool {
    if tag.trim().is_empty() {
        return true;
    }
    let folded = fold(tag);
    if folded == GENERIC_TAG || folded == fold(ctx.name) {
        return true;
    }
    if ctx.is_aggregate && ctx.artist_name.is_some_and(|a| folded == fold(a)) {
        return true;
    }
    ctx.member_titles.iter().any(|t| folded == fold(t))
}

/// Clean a raw tag set. Order of the result follows first occurrence.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S], ctx: &TagContext<'_>) -> Vec<String> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut cleaned = Vec::new();
    for tag in tags.iter().map(AsRef::as_ref) {
        if is_noise(tag, ctx) {
            continue;
        }
        if seen.insert(fold(tag)) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

/// Merge `extra` into `existing` with the same case-insensitive identity.
/// Used when curating stored entries; values are trimmed, empties dropped.
pub fn merge_tags<S: AsRef<str>>(existing: &[String], extra: &[S]) -> Vec<String> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut merged = Vec::with_capacity(existing.len() + extra.len());
    for tag in existing
        .iter()
        .map(String::as_str)
        .chain(extra.iter().map(AsRef::as_ref))
        .map(str::trim)
    {
        if !tag.is_empty() && seen.insert(fold(tag)) {
            merged.push(tag.to_string());
        }
    }
    merged
}

/// Split a comma-separated tag list as entered on the command line or
/// stored in the database.
pub fn parse_tag_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-joined form used by the store; `None` for an empty set.
pub fn join_tags(tags: &[String]) -> Option<String> {
    let joined = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
