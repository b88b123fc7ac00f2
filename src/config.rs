//! Configuration: optional TOML file, then environment overrides.
//!
//! ```toml
//! api_key = "..."            # or YOUTUBE_API_KEY
//! api_base_url = "https://www.googleapis.com/youtube/v3"
//! timeout_secs = 30
//! member_sample_size = 3
//! database = "music.db"      # or MUSIC_CORPUS_DB
//! persist_details = false
//! workers = 0
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::DEFAULT_MEMBER_SAMPLE_SIZE;
use crate::pipeline::PipelineOptions;
use crate::youtube::DEFAULT_BASE_URL;

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const DATABASE_ENV: &str = "MUSIC_CORPUS_DB";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub member_sample_size: usize,
    pub database: PathBuf,
    /// Store description and tags of pipeline records (off: quality too low)
    pub persist_details: bool,
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            member_sample_size: DEFAULT_MEMBER_SAMPLE_SIZE,
            database: PathBuf::from("music.db"),
            persist_details: false,
            workers: 0,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config")
    }

    /// Load from `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(db) = lookup(DATABASE_ENV).filter(|d| !d.trim().is_empty()) {
            self.database = PathBuf::from(db);
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!("{} environment variable not set", API_KEY_ENV),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            member_sample_size: self.member_sample_size,
            workers: self.workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.member_sample_size, 3);
        assert!(!config.persist_details);
        assert!(config.api_key().is_err());
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"from-file\"\nworkers = 4\npersist_details = true").unwrap();
        let mut config = Config::from_toml(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(config.api_key().unwrap(), "from-file");
        assert_eq!(config.pipeline_options().workers, 4);

        config.apply_env(|key| match key {
            API_KEY_ENV => Some("from-env".to_string()),
            DATABASE_ENV => Some("/tmp/corpus.db".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key().unwrap(), "from-env");
        assert_eq!(config.database, PathBuf::from("/tmp/corpus.db"));
    }

    #[test]
    fn test_blank_env_does_not_override() {
        let mut config = Config {
            api_key: Some("kept".into()),
            ..Default::default()
        };
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.api_key().unwrap(), "kept");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/corpus.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
