//! Classification and name resolution.
//!
//! Videos are always songs and channels are always artists. Playlists are
//! the interesting case: the catalog does not say whether a playlist is an
//! album, so the title and a small sample of member tracks are run through
//! `PLAYLIST_RULES` in order. The first rule that matches wins; if none
//! does, the playlist stays a playlist.

use crate::error::FetchError;
use crate::models::{ContentType, HandleKind, RawMetadata, RawTrackMetadata};

/// Suffix the catalog appends to auto-generated artist channels.
pub const TOPIC_SUFFIX: &str = " - Topic";

/// Prefix the catalog uses on auto-generated album playlists.
pub const ALBUM_PREFIX: &str = "Album - ";

/// Output of the classifier for one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub content_type: ContentType,
    pub name: String,
    pub artist_name: Option<String>,
}

impl Classification {
    fn new(content_type: ContentType, name: impl Into<String>, artist_name: Option<String>) -> Self {
        Self {
            content_type,
            name: name.into(),
            artist_name,
        }
    }
}

/// Strip trailing " - Topic" suffixes (case-sensitive, repeated) and
/// surrounding whitespace. Idempotent.
/// "Queen - Topic" → "Queen", "Foo - Topic - Topic" → "Foo"
pub fn clean_artist_name(name: &str) -> String {
    let mut current = name.trim_end();
    while let Some(rest) = current.strip_suffix(TOPIC_SUFFIX) {
        current = rest.trim_end();
    }
    current.trim().to_string()
}

fn cleaned_non_empty(name: Option<&str>) -> Option<String> {
    name.map(clean_artist_name).filter(|n| !n.is_empty())
}

/// Distinct non-empty member artists, in first-seen order.
pub fn sample_artists(samples: &[RawTrackMetadata]) -> Vec<String> {
    let mut artists: Vec<String> = Vec::new();
    for artist in samples
        .iter()
        .filter_map(|s| cleaned_non_empty(s.author_display_name.as_deref()))
    {
        if !artists.contains(&artist) {
            artists.push(artist);
        }
    }
    artists
}

/// The single artist shared by every member that names one, if any.
pub fn common_artist(samples: &[RawTrackMetadata]) -> Option<String> {
    let mut artists = sample_artists(samples);
    if artists.len() == 1 {
        artists.pop()
    } else {
        None
    }
}

// ============================================================================
// Playlist rules
// ============================================================================

/// Album/playlist disambiguation rules, evaluated in `PLAYLIST_RULES` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistRule {
    /// Members by more than one artist: a mixed playlist, whatever the title says
    MultiArtist,
    /// "Album - Greatest Hits"
    AlbumPrefix,
    /// "Pink Floyd - The Wall"
    DashSeparated,
    /// "Pink Floyd: The Wall"
    ColonSeparated,
    /// "Pink Floyd 'The Wall'"
    Apostrophe,
}

pub const PLAYLIST_RULES: [PlaylistRule; 5] = [
    PlaylistRule::MultiArtist,
    PlaylistRule::AlbumPrefix,
    PlaylistRule::DashSeparated,
    PlaylistRule::ColonSeparated,
    PlaylistRule::Apostrophe,
];

/// Split on the first `sep` into trimmed (artist, name).
fn split_artist_name(title: &str, sep: &str) -> Option<(String, String)> {
    let (artist, name) = title.split_once(sep)?;
    Some((artist.trim().to_string(), name.trim().to_string()))
}

fn album(name: String, artist: String) -> Classification {
    let artist = if artist.is_empty() { None } else { Some(artist) };
    Classification::new(ContentType::Album, name, artist)
}

impl PlaylistRule {
    /// Classification if this rule matches, `None` to fall through.
    pub fn apply(self, title: &str, samples: &[RawTrackMetadata]) -> Option<Classification> {
        match self {
            PlaylistRule::MultiArtist => (sample_artists(samples).len() > 1)
                .then(|| Classification::new(ContentType::Playlist, title, None)),
            PlaylistRule::AlbumPrefix => title
                .strip_prefix(ALBUM_PREFIX)
                .map(|rest| Classification::new(ContentType::Album, rest, None)),
            PlaylistRule::DashSeparated => {
                split_artist_name(title, " - ").map(|(artist, name)| album(name, artist))
            }
            PlaylistRule::ColonSeparated => {
                split_artist_name(title, ": ").map(|(artist, name)| album(name, artist))
            }
            PlaylistRule::Apostrophe => title.split_once('\'').map(|(artist, name)| {
                let name = name.trim_matches(|c: char| c == '\'' || c.is_whitespace());
                album(name.to_string(), artist.trim().to_string())
            }),
        }
    }
}

/// Classify a playlist from its title and sampled members.
pub fn classify_playlist(title: &str, samples: &[RawTrackMetadata]) -> Classification {
    let mut result = PLAYLIST_RULES
        .iter()
        .find_map(|rule| rule.apply(title, samples))
        .unwrap_or_else(|| Classification::new(ContentType::Playlist, title, None));

    if result.content_type == ContentType::Album && result.artist_name.is_none() {
        result.artist_name = common_artist(samples);
    }
    result.artist_name = cleaned_non_empty(result.artist_name.as_deref());
    result
}

/// Decide taxonomy type, name and artist for one fetched handle.
pub fn classify(kind: HandleKind, raw: &RawMetadata) -> Result<Classification, FetchError> {
    match kind {
        HandleKind::Video => Ok(Classification::new(
            ContentType::Song,
            raw.title.clone(),
            cleaned_non_empty(raw.author_display_name.as_deref()),
        )),
        HandleKind::Channel => {
            let channel = raw.author_display_name.as_deref().unwrap_or(&raw.title);
            Ok(Classification::new(ContentType::Artist, clean_artist_name(channel), None))
        }
        HandleKind::Playlist => Ok(classify_playlist(&raw.title, &raw.member_samples)),
        HandleKind::Unknown => Err(FetchError::InvalidUrl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str, artist: &str) -> RawTrackMetadata {
        RawTrackMetadata {
            title: title.to_string(),
            author_display_name: Some(artist.to_string()),
            tags: Vec::new(),
        }
    }

    fn queen_samples() -> Vec<RawTrackMetadata> {
        vec![
            track("Bohemian Rhapsody", "Queen - Topic"),
            track("Another One Bites the Dust", "Queen"),
            track("Killer Queen", " Queen - Topic "),
        ]
    }

    #[test]
    fn test_clean_artist_name() {
        assert_eq!(clean_artist_name("Queen - Topic"), "Queen");
        assert_eq!(clean_artist_name("  Queen  "), "Queen");
        assert_eq!(clean_artist_name("Queen - topic"), "Queen - topic");
        assert_eq!(clean_artist_name("Topic"), "Topic");
        assert_eq!(clean_artist_name(" - Topic"), "");
        assert_eq!(clean_artist_name("Foo - Topic - Topic"), "Foo");
        assert_eq!(clean_artist_name("Foo - Topic  - Topic "), "Foo");
        let once = clean_artist_name("Foo - Topic - Topic");
        assert_eq!(clean_artist_name(&once), once);
    }

    #[test]
    fn test_dash_pattern() {
        let c = classify_playlist("Pink Floyd - The Wall", &[]);
        assert_eq!(c, Classification::new(ContentType::Album, "The Wall", Some("Pink Floyd".into())));
    }

    #[test]
    fn test_album_prefix_adopts_common_member_artist() {
        let c = classify_playlist("Album - Greatest Hits", &queen_samples());
        assert_eq!(c, Classification::new(ContentType::Album, "Greatest Hits", Some("Queen".into())));
    }

    #[test]
    fn test_album_prefix_without_common_artist() {
        let samples = vec![track("a", ""), track("b", "")];
        let c = classify_playlist("Album - Greatest Hits", &samples);
        assert_eq!(c, Classification::new(ContentType::Album, "Greatest Hits", None));
    }

    #[test]
    fn test_multi_artist_overrides_title_patterns() {
        let samples = vec![track("x", "A"), track("y", "B")];
        for title in ["Deep Cuts", "Pink Floyd - The Wall", "Album - Hits", "Mix: Vol 1"] {
            let c = classify_playlist(title, &samples);
            assert_eq!(c, Classification::new(ContentType::Playlist, title, None), "{}", title);
        }
    }

    #[test]
    fn test_dash_wins_over_colon() {
        let c = classify_playlist("Artist: Live - In Tokyo", &[]);
        assert_eq!(c.artist_name.as_deref(), Some("Artist: Live"));
        assert_eq!(c.name, "In Tokyo");
    }

    #[test]
    fn test_colon_pattern() {
        let c = classify_playlist("Miles Davis: Kind of Blue", &[]);
        assert_eq!(c, Classification::new(ContentType::Album, "Kind of Blue", Some("Miles Davis".into())));
    }

    #[test]
    fn test_apostrophe_pattern() {
        let c = classify_playlist("Radiohead 'OK Computer'", &[]);
        assert_eq!(c, Classification::new(ContentType::Album, "OK Computer", Some("Radiohead".into())));
    }

    #[test]
    fn test_fallback_is_playlist() {
        let c = classify_playlist("Deep Cuts", &queen_samples());
        assert_eq!(c, Classification::new(ContentType::Playlist, "Deep Cuts", None));
    }

    #[test]
    fn test_empty_title_passes_through() {
        let c = classify_playlist("", &[]);
        assert_eq!(c, Classification::new(ContentType::Playlist, "", None));
        let c = classify_playlist("   ", &[]);
        assert_eq!(c.name, "   ");
    }

    #[test]
    fn test_split_with_empty_artist_falls_back_to_members() {
        let c = classify_playlist(" - Greatest Hits", &queen_samples());
        assert_eq!(c, Classification::new(ContentType::Album, "Greatest Hits", Some("Queen".into())));
    }

    #[test]
    fn test_each_rule_in_isolation() {
        assert_eq!(PlaylistRule::MultiArtist.apply("Pink Floyd - The Wall", &[]), None);
        assert_eq!(PlaylistRule::AlbumPrefix.apply("Pink Floyd - The Wall", &[]), None);
        assert!(PlaylistRule::DashSeparated.apply("Pink Floyd - The Wall", &[]).is_some());
        assert_eq!(PlaylistRule::ColonSeparated.apply("Pink Floyd - The Wall", &[]), None);
        assert_eq!(PlaylistRule::Apostrophe.apply("Pink Floyd - The Wall", &[]), None);
        assert!(PlaylistRule::Apostrophe.apply("Don't Stop", &[]).is_some());
    }

    #[test]
    fn test_video_and_channel() {
        let raw = RawMetadata {
            title: "Never Gonna Give You Up".into(),
            author_display_name: Some("Rick Astley - Topic".into()),
            ..Default::default()
        };
        let c = classify(HandleKind::Video, &raw).unwrap();
        assert_eq!(c, Classification::new(ContentType::Song, "Never Gonna Give You Up", Some("Rick Astley".into())));

        let c = classify(HandleKind::Channel, &raw).unwrap();
        assert_eq!(c, Classification::new(ContentType::Artist, "Rick Astley", None));

        assert_eq!(classify(HandleKind::Unknown, &raw), Err(FetchError::InvalidUrl));
    }

    #[test]
    fn test_video_without_author() {
        let raw = RawMetadata {
            title: "Untitled".into(),
            ..Default::default()
        };
        let c = classify(HandleKind::Video, &raw).unwrap();
        assert_eq!(c.artist_name, None);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let samples = queen_samples();
        let first = classify_playlist("Album - Greatest Hits", &samples);
        for _ in 0..5 {
            assert_eq!(classify_playlist("Album - Greatest Hits", &samples), first);
        }
    }
}
