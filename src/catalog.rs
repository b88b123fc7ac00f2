//! Catalog lookup port.
//!
//! The fetcher only talks to the catalog through `CatalogClient`, so the
//! classification logic can be exercised against recorded fixtures.

use thiserror::Error;

/// One item as the catalog describes it (video, playlist or channel).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub channel_title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub topic_categories: Vec<String>, // raw category URLs
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Read-only access to an already-authenticated catalog.
///
/// Lookups return `Ok(None)` / an empty list when the catalog has no such
/// item; `Err` is reserved for transport and API failures.
pub trait CatalogClient {
    /// Batched item ("video") lookup. Missing ids are simply absent from the result.
    fn item_details(&self, ids: &[String]) -> Result<Vec<CatalogItem>, CatalogError>;

    fn playlist_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError>;

    /// First `limit` member item ids of a playlist, in playlist order.
    fn playlist_member_ids(&self, id: &str, limit: usize) -> Result<Vec<String>, CatalogError>;

    fn channel_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for &C {
    fn item_details(&self, ids: &[String]) -> Result<Vec<CatalogItem>, CatalogError> {
        (**self).item_details(ids)
    }

    fn playlist_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
        (**self).playlist_detail(id)
    }

    fn playlist_member_ids(&self, id: &str, limit: usize) -> Result<Vec<String>, CatalogError> {
        (**self).playlist_member_ids(id, limit)
    }

    fn channel_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
        (**self).channel_detail(id)
    }
}

#[cfg(test)]
pub mod fixtures {
    //! In-memory catalog used by the fetcher and pipeline tests.

    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FixtureCatalog {
        pub items: HashMap<String, CatalogItem>,
        pub playlists: HashMap<String, (CatalogItem, Vec<String>)>,
        pub channels: HashMap<String, CatalogItem>,
        /// Ids whose lookups fail with a transport error
        pub failing: HashSet<String>,
        /// Playlists whose member listing fails
        pub failing_members: HashSet<String>,
        pub calls: Mutex<Vec<String>>,
    }

    pub fn item(id: &str, title: &str, channel: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: title.to_string(),
            channel_title: Some(channel.to_string()),
            ..Default::default()
        }
    }

    impl FixtureCatalog {
        pub fn with_item(mut self, item: CatalogItem) -> Self {
            self.items.insert(item.id.clone(), item);
            self
        }

        pub fn with_playlist(mut self, playlist: CatalogItem, members: Vec<CatalogItem>) -> Self {
            let ids = members.iter().map(|m| m.id.clone()).collect();
            for member in members {
                self.items.insert(member.id.clone(), member);
            }
            self.playlists.insert(playlist.id.clone(), (playlist, ids));
            self
        }

        pub fn with_channel(mut self, channel: CatalogItem) -> Self {
            self.channels.insert(channel.id.clone(), channel);
            self
        }

        pub fn failing_on(mut self, id: &str) -> Self {
            self.failing.insert(id.to_string());
            self
        }

        pub fn failing_members_of(mut self, id: &str) -> Self {
            self.failing_members.insert(id.to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn check(&self, id: &str) -> Result<(), CatalogError> {
            if self.failing.contains(id) {
                return Err(CatalogError::Transport(format!("simulated failure for {}", id)));
            }
            Ok(())
        }
    }

    impl CatalogClient for FixtureCatalog {
        fn item_details(&self, ids: &[String]) -> Result<Vec<CatalogItem>, CatalogError> {
            self.record(format!("items:{}", ids.join(",")));
            for id in ids {
                self.check(id)?;
            }
            Ok(ids.iter().filter_map(|id| self.items.get(id).cloned()).collect())
        }

        fn playlist_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
            self.record(format!("playlist:{}", id));
            self.check(id)?;
            Ok(self.playlists.get(id).map(|(p, _)| p.clone()))
        }

        fn playlist_member_ids(&self, id: &str, limit: usize) -> Result<Vec<String>, CatalogError> {
            self.record(format!("members:{}:{}", id, limit));
            if self.failing_members.contains(id) {
                return Err(CatalogError::Status {
                    code: 403,
                    body: "quotaExceeded".to_string(),
                });
            }
            Ok(self
                .playlists
                .get(id)
                .map(|(_, ids)| ids.iter().take(limit).cloned().collect())
                .unwrap_or_default())
        }

        fn channel_detail(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
            self.record(format!("channel:{}", id));
            self.check(id)?;
            Ok(self.channels.get(id).cloned())
        }
    }
}
