//! Persistence of classified content.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE music_content (
//!     id          INTEGER PRIMARY KEY AUTOINCREMENT,
//!     type        TEXT NOT NULL,   -- SONG | ALBUM | PLAYLIST | ARTIST
//!     external_id TEXT NOT NULL,
//!     name        TEXT NOT NULL,
//!     artist_name TEXT,
//!     description TEXT,
//!     tags        TEXT,            -- comma-joined
//!     created_at  TEXT NOT NULL,
//!     updated_at  TEXT NOT NULL,
//!     UNIQUE (type, external_id)
//! );
//! ```
//!
//! Inserts are insert-if-absent: a second record with the same
//! `(type, external_id)` is skipped, never merged.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::models::{ClassifiedContent, ContentType};
use crate::tags::{join_tags, merge_tags, parse_tag_list};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS music_content (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        type        TEXT NOT NULL CHECK (type IN ('SONG', 'ALBUM', 'PLAYLIST', 'ARTIST')),
        external_id TEXT NOT NULL,
        name        TEXT NOT NULL,
        artist_name TEXT,
        description TEXT,
        tags        TEXT,
        created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (type, external_id)
    );
    CREATE INDEX IF NOT EXISTS idx_music_content_created ON music_content(created_at);";

const SELECT_COLUMNS: &str =
    "SELECT id, type, external_id, name, artist_name, description, tags, created_at, updated_at
     FROM music_content";

const PLAYBACK_BASE_URL: &str = "https://music.youtube.com";

/// Write side of the store, as seen by the pipeline and re-ingestion.
pub trait ContentStore {
    /// Insert unless `(type, identifier)` already exists. Returns whether a row was added.
    fn insert_if_absent(&self, content: &ClassifiedContent) -> Result<bool>;
}

/// URL that plays an entry in the music front-end.
pub fn playback_url(content_type: ContentType, external_id: &str) -> String {
    match content_type {
        ContentType::Artist => format!("{}/channel/{}", PLAYBACK_BASE_URL, external_id),
        ContentType::Song => format!("{}/watch?v={}", PLAYBACK_BASE_URL, external_id),
        ContentType::Album | ContentType::Playlist => {
            format!("{}/playlist?list={}", PLAYBACK_BASE_URL, external_id)
        }
    }
}

/// A stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub id: i64,
    pub content_type: ContentType,
    pub external_id: String,
    pub name: String,
    pub artist_name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredContent {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let type_str: String = row.get(1)?;
        let content_type = type_str.parse::<ContentType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
        })?;
        let tags: Option<String> = row.get(6)?;
        Ok(Self {
            id: row.get(0)?,
            content_type,
            external_id: row.get(2)?,
            name: row.get(3)?,
            artist_name: row.get(4)?,
            description: row.get(5)?,
            tags: tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    pub fn playback_url(&self) -> String {
        playback_url(self.content_type, &self.external_id)
    }
}

/// Filters for `list`.
#[derive(Debug, Clone, Copy)]
pub struct ListQuery {
    pub limit: usize,
    /// Newest first instead of insertion order
    pub recent: bool,
    /// Only rows without tags
    pub untagged: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            recent: false,
            untagged: false,
        }
    }
}

pub struct SqliteContentStore {
    conn: Connection,
    persist_details: bool,
}

impl SqliteContentStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path, persist_details: bool) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        Self::with_connection(conn, persist_details)
    }

    pub fn open_in_memory(persist_details: bool) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, persist_details)
    }

    fn with_connection(conn: Connection, persist_details: bool) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize schema")?;
        Ok(Self {
            conn,
            persist_details,
        })
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM music_content", [], |row| row.get(0))?)
    }

    pub fn get(&self, id: i64) -> Result<Option<StoredContent>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [id], StoredContent::from_row)
            .optional()?)
    }

    pub fn find(&self, content_type: ContentType, external_id: &str) -> Result<Option<StoredContent>> {
        let sql = format!("{} WHERE type = ?1 AND external_id = ?2", SELECT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![content_type.as_str(), external_id], StoredContent::from_row)
            .optional()?)
    }

    pub fn list(&self, query: &ListQuery) -> Result<Vec<StoredContent>> {
        let mut sql = SELECT_COLUMNS.to_string();
        if query.untagged {
            sql.push_str(" WHERE (tags IS NULL OR tags = '')");
        }
        if query.recent {
            sql.push_str(" ORDER BY created_at DESC, id DESC");
        } else {
            sql.push_str(" ORDER BY id");
        }
        sql.push_str(" LIMIT ?1");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([query.limit as i64], StoredContent::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Merge `tags` into an entry's tags. `None` if there is no such entry.
    pub fn add_tags<S: AsRef<str>>(&self, id: i64, tags: &[S]) -> Result<Option<Vec<String>>> {
        let Some(current) = self.get(id)? else {
            return Ok(None);
        };
        let merged = merge_tags(&current.tags, tags);
        self.conn.execute(
            "UPDATE music_content SET tags = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![join_tags(&merged), id],
        )?;
        Ok(Some(merged))
    }
}

impl ContentStore for SqliteContentStore {
    fn insert_if_absent(&self, content: &ClassifiedContent) -> Result<bool> {
        let (description, tags) = if self.persist_details {
            (content.description.clone(), join_tags(&content.tags))
        } else {
            (None, None)
        };
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO music_content (type, external_id, name, artist_name, description, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let changed = stmt.execute(params![
            content.content_type.as_str(),
            content.identifier,
            content.name,
            content.artist_name,
            description,
            tags,
        ])?;
        Ok(changed > 0)
    }
}
