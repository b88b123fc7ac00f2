//! Identifier extraction: URL string → `ContentHandle`.
//!
//! Recognizes the short-link host (`youtu.be`) and the canonical host
//! (`youtube.com`, including the `www`, `m` and `music` subdomains).
//! Anything else yields an `Unknown` handle; existence of the identifier
//! is left to the fetcher.

use url::{ParseError, Url};

use crate::models::{ContentHandle, HandleKind};

const SHORT_LINK_HOST: &str = "youtu.be";
const CANONICAL_HOST: &str = "youtube.com";

/// Parse `raw`, assuming `https://` when the scheme is missing ("youtu.be/abc").
fn parse_lenient(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", raw)).ok(),
        Err(_) => None,
    }
}

fn host_matches(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            host == domain || host.ends_with(&format!(".{}", domain))
        }
        None => false,
    }
}

/// Last non-empty path segment.
fn trailing_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

/// Decoded value of the first `key` query pair.
fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find_map(|(k, v)| (k == key).then(|| v.into_owned()))
}

fn handle_or_unknown(id: Option<String>, kind: HandleKind) -> ContentHandle {
    match id {
        Some(id) if !id.trim().is_empty() => ContentHandle::new(id.trim(), kind),
        _ => ContentHandle::unknown(),
    }
}

/// Parse a URL into a content handle.
///
/// Examples:
///   "https://youtu.be/dQw4w9WgXcQ?t=42" → (dQw4w9WgXcQ, Video)
///   "https://music.youtube.com/playlist?list=OLAK5uy_x" → (OLAK5uy_x, Playlist)
///   "https://example.com/watch?v=x" → Unknown
pub fn extract_handle(raw: &str) -> ContentHandle {
    let raw = raw.trim();
    if raw.is_empty() {
        return ContentHandle::unknown();
    }
    let Some(url) = parse_lenient(raw) else {
        return ContentHandle::unknown();
    };

    if host_matches(&url, SHORT_LINK_HOST) {
        return handle_or_unknown(trailing_segment(&url), HandleKind::Video);
    }

    if host_matches(&url, CANONICAL_HOST) {
        let path = url.path();
        if path.contains("watch") {
            return handle_or_unknown(query_value(&url, "v"), HandleKind::Video);
        }
        if path.contains("playlist") {
            return handle_or_unknown(query_value(&url, "list"), HandleKind::Playlist);
        }
        if path.contains("channel") {
            return handle_or_unknown(trailing_segment(&url), HandleKind::Channel);
        }
    }

    ContentHandle::unknown()
}
