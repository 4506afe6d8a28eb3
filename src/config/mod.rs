use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::lyrics::LrclibClient;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub lyrics: LyricsConfig,
    pub paths: PathsConfig,
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// Public client identifier of the registered Spotify app.
    pub client_id: Option<String>,
    /// Must match the redirect URI registered with the provider exactly.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub lrclib_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between now-playing polls
    pub interval_secs: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            redirect_uri: "http://localhost:5173/callback".to_string(),
            scopes: vec![
                "user-read-currently-playing".to_string(),
                "user-read-playback-state".to_string(),
            ],
        }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            lrclib_url: LrclibClient::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "refrain", "refrain");
        let data_dir = proj
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("refrain"));
        Self { data_dir }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

impl Config {
    pub fn store_path(&self) -> PathBuf {
        self.paths.data_dir.join("store.sqlite3")
    }

    fn apply_env(&mut self) {
        if let Ok(id) = std::env::var("SPOTIFY_CLIENT_ID")
            && !id.is_empty()
        {
            self.spotify.client_id = Some(id);
        }
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "refrain", "refrain").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let mut cfg = if path.exists() {
        let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?
    } else {
        let cfg = Config::default();
        save(&cfg, Some(&path))?;
        cfg
    };

    cfg.apply_env();
    Ok(cfg)
}
