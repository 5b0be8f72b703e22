//! Runtime settings, read once at startup from `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::rotate::sanitize_playlist_id;

pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";
const DEFAULT_PLAYLIST: &str = "PL2oOQvhc23H6GBf8GTTu2fxldVfdJmQz1";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com.github", "youtube_rotate", "youtube_rotate")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuth client secret downloaded from the Google console.
    pub client_secret_path: PathBuf,
    pub token_cache_path: PathBuf,
    pub scopes: Vec<String>,
    /// May be pasted straight from a browser url; anything after `&` is dropped.
    pub playlist_id: String,
    pub api_base_url: String,
    pub activity_page_size: u32,
    pub playlist_page_size: u32,
    pub run_interval_secs: u64,
    pub retry_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let token_cache_path = project_dirs()
            .map(|dirs| dirs.data_dir().join("token.json"))
            .unwrap_or_else(|| PathBuf::from("token.json"));

        Self {
            client_secret_path: PathBuf::from("client_secrets.json"),
            token_cache_path,
            scopes: vec![YOUTUBE_SCOPE.to_string()],
            playlist_id: DEFAULT_PLAYLIST.to_string(),
            api_base_url: YOUTUBE_API_URL.to_string(),
            activity_page_size: 50,
            playlist_page_size: 50,
            run_interval_secs: 60 * 60,
            retry_interval_secs: 5 * 60,
        }
    }
}

impl Config {
    /// `<config dir>/config.toml`, or `config.toml` in the working directory
    /// when the platform has no home directory.
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Reads the file without validating it; callers apply their overrides
    /// first and then call `validate`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if sanitize_playlist_id(&self.playlist_id).is_empty() {
            return Err(Error::Config("playlist_id must not be empty".into()));
        }
        if self.scopes.is_empty() {
            return Err(Error::Config("at least one scope is required".into()));
        }
        if self.activity_page_size == 0 || self.playlist_page_size == 0 {
            return Err(Error::Config("page sizes must be positive".into()));
        }
        Ok(())
    }

    pub fn run_interval(&self) -> Duration {
        Duration::from_secs(self.run_interval_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}
