//! Record assembly: classifier output + cleaned tags → `ClassifiedContent`.

use crate::classify::{clean_artist_name, Classification};
use crate::models::{ClassifiedContent, ContentHandle, ContentType, RawMetadata};
use crate::tags::{normalize_tags, TagContext};

/// Maximum stored description length, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 80;

/// Truncate to `DESCRIPTION_MAX_CHARS` characters. No ellipsis.
pub fn cap_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_MAX_CHARS).collect()
}

/// Build the canonical record for one handle.
pub fn assemble(
    handle: &ContentHandle,
    classification: Classification,
    tags: Vec<String>,
    description: Option<&str>,
) -> ClassifiedContent {
    ClassifiedContent {
        content_type: classification.content_type,
        name: classification.name,
        artist_name: classification.artist_name,
        identifier: handle.raw_identifier.clone(),
        description: description.filter(|d| !d.is_empty()).map(cap_description),
        tags,
    }
}

/// Classifier output → tags → record, for a handle whose metadata is in hand.
pub fn build_record(
    handle: &ContentHandle,
    classification: Classification,
    raw: &RawMetadata,
) -> ClassifiedContent {
    let member_titles = raw.member_titles();
    let ctx = TagContext {
        name: &classification.name,
        artist_name: classification.artist_name.as_deref(),
        member_titles: &member_titles,
        is_aggregate: classification.content_type.is_aggregate(),
    };
    let tags = normalize_tags(&raw.merged_tags(), &ctx);
    assemble(handle, classification, tags, raw.description.as_deref())
}

/// Re-derive the normalized fields of an existing record.
///
/// A record produced by `assemble` comes back unchanged; records edited by
/// hand get their artist cleaned and tags re-filtered.
pub fn renormalize(content: &ClassifiedContent) -> ClassifiedContent {
    let artist_name = match content.content_type {
        ContentType::Artist => None,
        _ => content
            .artist_name
            .as_deref()
            .map(clean_artist_name)
            .filter(|a| !a.is_empty()),
    };
    let name = match content.content_type {
        ContentType::Artist => clean_artist_name(&content.name),
        _ => content.name.clone(),
    };
    let ctx = TagContext {
        name: &name,
        artist_name: artist_name.as_deref(),
        member_titles: &[],
        is_aggregate: content.content_type.is_aggregate(),
    };
    ClassifiedContent {
        content_type: content.content_type,
        tags: normalize_tags(&content.tags, &ctx),
        description: content.description.as_deref().map(cap_description),
        identifier: content.identifier.clone(),
        name,
        artist_name,
    }
}
