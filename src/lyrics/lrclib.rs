//! LRCLIB search client
//!
//! LRCLIB (https://lrclib.net/docs) is a free lyrics service; its search
//! endpoint matches tracks by artist/title substrings and returns both
//! synced (LRC) and plain lyrics per hit.

use super::LyricsError;
use serde::Deserialize;

/// One search hit from the LRCLIB search endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct LyricsResult {
    #[serde(rename = "syncedLyrics")]
    pub synced_lyrics: Option<String>,
    #[serde(rename = "plainLyrics")]
    pub plain_lyrics: Option<String>,
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    const USER_AGENT: &'static str = "refrain/0.1.0 (https://github.com/refrain/refrain)";

    /// Create a client against the public LRCLIB instance
    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Create a client against a different instance (mirrors, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(Self::USER_AGENT)
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to create reqwest client"),
            base_url: base_url.into(),
        }
    }

    /// Search by artist and track name, returning the first hit.
    ///
    /// The search endpoint matches on substrings, so the first hit is the
    /// service's best guess; `None` means the service knows nothing close.
    pub async fn search(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<LyricsResult>, LyricsError> {
        let url = format!(
            "{}/search?artist_name={}&track_name={}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Http(status.as_u16()));
        }

        let body = response.text().await?;
        let results: Vec<LyricsResult> = serde_json::from_str(&body)?;
        Ok(results.into_iter().next())
    }

    /// Search and keep only the first hit's synced lyrics text
    pub async fn search_synced(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<String>, LyricsError> {
        Ok(self.search(artist, title).await?.and_then(|r| r.synced_lyrics))
    }
}

impl Default for LrclibClient {
    fn default() -> Self {
        Self::new()
    }
}
