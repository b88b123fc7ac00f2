//! Metadata fetching: `ContentHandle` → `RawMetadata`.
//!
//! One retrieval strategy per handle kind:
//! - Video: one item lookup
//! - Playlist: playlist lookup, then a bounded member listing plus one
//!   batched item lookup for the sampled members
//! - Channel: one channel lookup
//!
//! Topic categories come back from the catalog as URLs such as
//! `https://en.wikipedia.org/wiki/Rock_music`; they are mapped to
//! readable tags ("Rock Music") and merged with the free-form tags.

use tracing::{debug, warn};

use crate::catalog::{CatalogClient, CatalogError, CatalogItem};
use crate::error::FetchError;
use crate::models::{ContentHandle, HandleKind, RawMetadata, RawTrackMetadata};

/// Members sampled from a playlist for album/playlist disambiguation.
pub const DEFAULT_MEMBER_SAMPLE_SIZE: usize = 3;

// ============================================================================
// Topic categories
// ============================================================================

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
/// "rock'n'roll" → "Rock'N'Roll", "HIP hop" → "Hip Hop"
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Map a topic category URL to a readable tag.
/// "https://en.wikipedia.org/wiki/Rhythm_and_blues" → "Rhythm And Blues"
pub fn topic_category_tag(category: &str) -> Option<String> {
    let segment = category.trim().trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let tag = title_case(&decoded.replace('_', " "));
    let tag = tag.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

pub fn topic_category_tags(categories: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in categories.iter().filter_map(|c| topic_category_tag(c)) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn raw_from_item(item: CatalogItem) -> RawMetadata {
    RawMetadata {
        topic_categories: topic_category_tags(&item.topic_categories),
        title: item.title,
        author_display_name: item.channel_title,
        description: item.description,
        free_tags: item.tags,
        member_samples: Vec::new(),
    }
}

// ============================================================================
// Strategies
// ============================================================================

fn fetch_video<C: CatalogClient + ?Sized>(
    catalog: &C,
    id: &str,
) -> Result<RawMetadata, FetchError> {
    let item = catalog
        .item_details(&[id.to_string()])?
        .into_iter()
        .next()
        .ok_or(FetchError::NotFound(HandleKind::Video))?;
    Ok(raw_from_item(item))
}

fn fetch_channel<C: CatalogClient + ?Sized>(
    catalog: &C,
    id: &str,
) -> Result<RawMetadata, FetchError> {
    let item = catalog
        .channel_detail(id)?
        .ok_or(FetchError::NotFound(HandleKind::Channel))?;
    let mut raw = raw_from_item(item);
    if raw.author_display_name.is_none() {
        raw.author_display_name = Some(raw.title.clone());
    }
    Ok(raw)
}

/// Fetch the first `limit` members of a playlist, in playlist order.
pub fn sample_members<C: CatalogClient + ?Sized>(
    catalog: &C,
    playlist_id: &str,
    limit: usize,
) -> Result<Vec<RawTrackMetadata>, CatalogError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let ids = catalog.playlist_member_ids(playlist_id, limit)?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = ids.into_iter().take(limit).collect();
    let mut items = catalog.item_details(&ids)?;
    items.sort_by_key(|item| ids.iter().position(|id| *id == item.id).unwrap_or(usize::MAX));

    Ok(items
        .into_iter()
        .map(|item| {
            let raw = raw_from_item(item);
            RawTrackMetadata {
                tags: raw.merged_tags(),
                title: raw.title,
                author_display_name: raw.author_display_name,
            }
        })
        .collect())
}

fn fetch_playlist<C: CatalogClient + ?Sized>(
    catalog: &C,
    id: &str,
    sample_size: usize,
) -> Result<RawMetadata, FetchError> {
    let item = catalog
        .playlist_detail(id)?
        .ok_or(FetchError::NotFound(HandleKind::Playlist))?;
    let mut raw = raw_from_item(item);

    // Sampling only sharpens classification; losing it is not fatal
    raw.member_samples = match sample_members(catalog, id, sample_size) {
        Ok(samples) => samples,
        Err(e) => {
            warn!(playlist = id, error = %e, "member sampling failed, classifying without samples");
            Vec::new()
        }
    };

    for tag in raw.member_samples.iter().flat_map(|m| m.tags.iter()) {
        if !raw.free_tags.contains(tag) {
            raw.free_tags.push(tag.clone());
        }
    }
    Ok(raw)
}

/// Retrieve raw metadata for one handle.
pub fn fetch_metadata<C: CatalogClient + ?Sized>(
    catalog: &C,
    handle: &ContentHandle,
    sample_size: usize,
) -> Result<RawMetadata, FetchError> {
    debug!(kind = %handle.kind, id = %handle.raw_identifier, "fetching metadata");
    match handle.kind {
        HandleKind::Video => fetch_video(catalog, &handle.raw_identifier),
        HandleKind::Playlist => fetch_playlist(catalog, &handle.raw_identifier, sample_size),
        HandleKind::Channel => fetch_channel(catalog, &handle.raw_identifier),
        HandleKind::Unknown => Err(FetchError::InvalidUrl),
    }
}
