//! Spotify integration: implicit-grant login and now-playing polling
//!
//! The provider never talks to us directly. Login opens the consent page in
//! a browser and the user hands the redirect URL back; polling is a plain
//! bearer-authenticated GET. Everything persistent goes through the storage
//! port, everything user-facing through the navigation port.

pub mod api;
pub mod auth;
pub mod models;

pub use api::SpotifyClient;
pub use auth::SpotifyAuth;
pub use models::NowPlaying;

use crate::storage::StoreError;
use thiserror::Error;

// Storage keys shared by the login flow and the polling client.
pub(crate) const ACCESS_TOKEN_KEY: &str = "spotify_access_token";
pub(crate) const AUTH_STATE_KEY: &str = "spotify_auth_state";

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("no client id configured; set [spotify] client_id or SPOTIFY_CLIENT_ID")]
    MissingClientId,
    #[error("not authenticated")]
    MissingToken,
    #[error("access token expired")]
    TokenExpired,
    #[error("api returned status {0}")]
    Http(u16),
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("bad callback url: {0}")]
    BadCallback(#[from] url::ParseError),
    #[error("login state mismatch; run login again")]
    StateMismatch,
    #[error("no access token in callback url")]
    NoCallbackToken,
    #[error("storage: {0}")]
    Store(#[from] StoreError),
}

/// Where the app sends the user: the consent page on login, the signed-out
/// home path when a token stops working.
pub trait Navigator: Send + Sync {
    fn open_url(&self, url: &str) -> std::io::Result<()>;
    fn home(&self);
}

/// Opens URLs with the system browser; "home" is a signed-out hint on the log.
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn open_url(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }

    fn home(&self) {
        tracing::info!("Signed out; run `refrain auth login` to sign in again");
    }
}
