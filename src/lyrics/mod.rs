//! Lyrics lookup, parsing, and caching
//!
//! This module provides:
//! - LRCLIB search client for fetching synced lyrics
//! - Parser for LRC-style timestamped transcripts
//! - A local cache so repeat lookups never leave the machine

pub mod cache;
pub mod lrclib;
pub mod parser;

pub use cache::LyricsCache;
pub use lrclib::LrclibClient;
pub use parser::{Lyric, parse_synced_lyrics};

use crate::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),
    #[error("lookup returned status {0}")]
    Http(u16),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("storage: {0}")]
    Store(#[from] StoreError),
}

/// Get the synced lyrics for a track, consulting the cache first and
/// caching whatever the lookup returns.
///
/// Failures degrade to `None` after logging; callers that need the
/// distinguished error use [`LrclibClient`] directly.
pub async fn load(
    client: &LrclibClient,
    cache: &LyricsCache,
    artist: &str,
    title: &str,
) -> Option<String> {
    match cache.get(artist, title) {
        Ok(Some(text)) => return Some(text),
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to read lyrics cache: {}", e),
    }

    match client.search_synced(artist, title).await {
        Ok(Some(text)) => {
            if let Err(e) = cache.save(artist, title, &text) {
                tracing::warn!("Failed to write lyrics cache: {}", e);
            }
            Some(text)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to look up lyrics for {} - {}: {}", artist, title, e);
            None
        }
    }
}
