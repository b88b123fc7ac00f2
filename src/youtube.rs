//! YouTube Data API v3 adapter for `CatalogClient`.
//!
//! Blocking, one request per call. The API key is handed in already
//! resolved; quota and retries are not handled here.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::catalog::{CatalogClient, CatalogError, CatalogItem};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

const USER_AGENT: &str = concat!("music-corpus/", env!("CARGO_PKG_VERSION"));
const MAX_BODY_BYTES: u64 = 5_000_000;
const ERROR_SNIPPET_CHARS: usize = 300;

// ============================================================================
// Wire format
// ============================================================================

#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    topic_details: Option<TopicDetails>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    channel_title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    resource_id: Option<ResourceId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicDetails {
    #[serde(default)]
    topic_categories: Vec<String>,
}

impl From<Resource> for CatalogItem {
    fn from(r: Resource) -> Self {
        CatalogItem {
            id: r.id,
            title: r.snippet.title,
            channel_title: r.snippet.channel_title,
            description: r.snippet.description,
            tags: r.snippet.tags,
            topic_categories: r
                .topic_details
                .map(|t| t.topic_categories)
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct YouTubeClient {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl YouTubeClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .user_agent(USER_AGENT)
            .timeout_global(Some(timeout))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// GET `<base>/<resource>` and return its `items`. A 404 is an empty list.
    fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, CatalogError> {
        let url = format!("{}/{}", self.base_url, resource);
        debug!(resource, ?params, "catalog request");

        let mut request = self.agent.get(&url).query("key", &self.api_key);
        for (k, v) in params {
            request = request.query(*k, *v);
        }

        let resp = request
            .config()
            .http_status_as_error(false)
            .build()
            .call()
            .map_err(|e| CatalogError::Transport(format!("{} ({})", e, resource)))?;

        let code = resp.status().as_u16();
        let body = resp
            .into_body()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|e| CatalogError::Transport(format!("reading {} response: {}", resource, e)))?;

        if code == 404 {
            return Ok(Vec::new());
        }
        if code >= 400 {
            let trimmed = body.trim();
            let mut snippet: String = trimmed.chars().take(ERROR_SNIPPET_CHARS).collect();
            if trimmed.chars().count() > ERROR_SNIPPET_CHARS {
                snippet.push_str("...");
            }
            return Err(CatalogError::Status { code, body: snippet });
        }

        let parsed: ListResponse<T> = serde_json::from_str(&body)
            .map_err(|e| CatalogError::Decode(format!("{} response: {}", resource, e)))?;
        Ok(parsed.items)
    }

    fn single(&self, resource: &str, part: &str, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
        let items: Vec<Resource> = self.list(resource, &[("part", part), ("id", id)])?;
        Ok(items.into_iter().next().map(CatalogItem::from))
    }
}

impl CatalogClient for YouTubeClient {
    fn item_details(&self, ids: &[String]) -> Result<Vec<CatalogItem>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let items: Vec<Resource> =
            self.list("videos", &[("part", "snippet,topicDetails"), ("id", &joined)])?;
        Ok(items.into_iter().map(CatalogItem::from).collect())
    }

    fn playlist_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
        self.single("playlists", "snippet", id)
    }

    fn playlist_member_ids(&self, id: &str, limit: usize) -> Result<Vec<String>, CatalogError> {
        let max_results = limit.to_string();
        let items: Vec<Resource> = self.list(
            "playlistItems",
            &[("part", "snippet"), ("playlistId", id), ("maxResults", &max_results)],
        )?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.snippet.resource_id.and_then(|r| r.video_id))
            .collect())
    }

    fn channel_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
        self.single("channels", "snippet,topicDetails", id)
    }
}
