//! Now-playing polling client

use super::{ACCESS_TOKEN_KEY, Navigator, SpotifyError};
use crate::spotify::models::NowPlaying;
use crate::storage::KvStore;
use std::sync::Arc;

pub struct SpotifyClient {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn KvStore>,
    navigator: Arc<dyn Navigator>,
}

impl SpotifyClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.spotify.com/v1";

    pub fn new(store: Arc<dyn KvStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL, store, navigator)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        store: Arc<dyn KvStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to create reqwest client"),
            base_url: base_url.into(),
            store,
            navigator,
        }
    }

    /// Ask the provider what the account is playing right now.
    ///
    /// `Ok(None)` is the provider's "nothing playing" answer (204), not a
    /// failure. A 401 means the token is done: it is removed from storage
    /// and the navigator is sent home before the error is returned.
    pub async fn currently_playing(&self) -> Result<Option<NowPlaying>, SpotifyError> {
        let token = self
            .store
            .get(ACCESS_TOKEN_KEY)?
            .ok_or(SpotifyError::MissingToken)?;

        let url = format!("{}/me/player/currently-playing", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.store.remove(ACCESS_TOKEN_KEY)?;
            self.navigator.home();
            return Err(SpotifyError::TokenExpired);
        }
        if !status.is_success() {
            return Err(SpotifyError::Http(status.as_u16()));
        }

        let body = response.text().await?;
        let mut playing: NowPlaying = serde_json::from_str(&body)?;
        playing.fetched_at = unix_millis();
        Ok(Some(playing))
    }
}

fn unix_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
