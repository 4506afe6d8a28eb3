//! Spotify response models, reduced to the fields the companion reads

use serde::{Deserialize, Serialize};

/// The provider's currently-playing object plus a client-side capture time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlaying {
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub item: Option<Track>,
    /// When this answer was received, unix milliseconds. Stamped by the
    /// client after a successful poll; not part of the wire format.
    #[serde(skip_deserializing, default)]
    pub fetched_at: i64,
}

impl NowPlaying {
    /// Playhead position in seconds at the time of the poll
    pub fn position_secs(&self) -> f64 {
        self.progress_ms.unwrap_or(0) as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
}

impl Track {
    /// The artist used for lyrics lookups
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
}
