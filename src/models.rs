//! Core data models for the metadata normalization pipeline.
//!
//! Handles and raw catalog payloads live only for one pipeline run;
//! `ClassifiedContent` is the canonical record handed to the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Handles
// ============================================================================

/// What a URL points at, as far as the URL alone can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Video,
    Playlist,
    Channel,
    Unknown,
}

impl HandleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HandleKind::Video => "video",
            HandleKind::Playlist => "playlist",
            HandleKind::Channel => "channel",
            HandleKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved reference to one catalog item, prior to metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHandle {
    pub raw_identifier: String,
    pub kind: HandleKind,
}

impl ContentHandle {
    pub fn new(raw_identifier: impl Into<String>, kind: HandleKind) -> Self {
        Self {
            raw_identifier: raw_identifier.into(),
            kind,
        }
    }

    pub fn unknown() -> Self {
        Self::new(String::new(), HandleKind::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == HandleKind::Unknown
    }
}

// ============================================================================
// Raw catalog payloads
// ============================================================================

/// One sampled playlist member. Only used for classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTrackMetadata {
    pub title: String,
    pub author_display_name: Option<String>,
    pub tags: Vec<String>,
}

/// Source-of-truth attributes for one handle as returned by the catalog.
///
/// `free_tags` and `topic_categories` are kept apart so callers can tell
/// uploader tags from catalog-derived ones; `merged_tags` is what the tag
/// normalizer consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    pub title: String,
    pub author_display_name: Option<String>,
    pub description: Option<String>,
    pub free_tags: Vec<String>,
    pub topic_categories: Vec<String>, // already mapped to human-readable form
    pub member_samples: Vec<RawTrackMetadata>, // playlists only, bounded
}

impl RawMetadata {
    /// Union of free-form and topic-category tags, exact duplicates removed,
    /// first occurrence order kept.
    pub fn merged_tags(&self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(self.free_tags.len() + self.topic_categories.len());
        for tag in self.free_tags.iter().chain(self.topic_categories.iter()) {
            if !merged.contains(tag) {
                merged.push(tag.clone());
            }
        }
        merged
    }

    pub fn member_titles(&self) -> Vec<String> {
        self.member_samples.iter().map(|m| m.title.clone()).collect()
    }
}

// ============================================================================
// Canonical output
// ============================================================================

/// Taxonomy type of a classified item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    #[serde(alias = "Song", alias = "Video", alias = "VIDEO")]
    Song,
    #[serde(alias = "Album")]
    Album,
    #[serde(alias = "Playlist")]
    Playlist,
    #[serde(alias = "Artist")]
    Artist,
}

impl ContentType {
    /// Column value used by the store.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Song => "SONG",
            ContentType::Album => "ALBUM",
            ContentType::Playlist => "PLAYLIST",
            ContentType::Artist => "ARTIST",
        }
    }

    /// Albums and playlists aggregate other tracks.
    pub fn is_aggregate(self) -> bool {
        matches!(self, ContentType::Album | ContentType::Playlist)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SONG" | "VIDEO" => Ok(ContentType::Song),
            "ALBUM" => Ok(ContentType::Album),
            "PLAYLIST" => Ok(ContentType::Playlist),
            "ARTIST" => Ok(ContentType::Artist),
            other => Err(format!("unknown content type '{}'", other)),
        }
    }
}

/// Canonical record for one handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedContent {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(alias = "youtube_id")]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ============================================================================
// Batch output
// ============================================================================

/// Result for one input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Failed { error: String },
    Classified(ClassifiedContent),
}

/// One entry of a batch run, keyed by the URL exactly as it was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub url: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl BatchEntry {
    pub fn classified(&self) -> Option<&ClassifiedContent> {
        match &self.outcome {
            Outcome::Classified(content) => Some(content),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { error } => Some(error),
            Outcome::Classified(_) => None,
        }
    }
}
