/// The watch loop gluing polling to the lyrics session
pub mod app;

/// File-backed configuration
pub mod config;

/// Lyrics lookup, parsing, and caching
pub mod lyrics;

/// Playback-synced lyrics state for display layers
pub mod session;

/// Spotify login and now-playing polling
pub mod spotify;

/// Key-value storage behind everything persistent
pub mod storage;

pub use lyrics::Lyric;
pub use session::LyricsSession;
