//! The watch loop: poll playback, keep lyrics loaded, print lines on time

use crate::config::Config;
use crate::lyrics::{self, LrclibClient, LyricsCache};
use crate::session::LyricsSession;
use crate::spotify::{NowPlaying, SpotifyClient, SpotifyError, SystemNavigator};
use crate::storage::{KvStore, SqliteStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Position advances between polls on a short timer while playing.
const STEP_INTERVAL: Duration = Duration::from_millis(250);

pub struct App {
    client: SpotifyClient,
    lrclib: LrclibClient,
    cache: LyricsCache,
    session: LyricsSession,
    poll_interval: Duration,
    playback: Option<Playback>,
}

/// What the last poll told us, anchored so the playhead can be interpolated
struct Playback {
    track_key: String,
    is_playing: bool,
    position: f64,
    anchor: Instant,
}

impl App {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open(&cfg.store_path())?);
        let navigator = Arc::new(SystemNavigator);
        Ok(Self {
            client: SpotifyClient::new(store.clone(), navigator),
            lrclib: LrclibClient::with_base_url(cfg.lyrics.lrclib_url.clone()),
            cache: LyricsCache::new(store),
            session: LyricsSession::new(),
            // interval(0) panics; clamp to one second
            poll_interval: Duration::from_secs(cfg.poll.interval_secs.max(1)),
            playback: None,
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        tokio::select! {
            res = self.watch_loop() => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Exiting");
                Ok(())
            }
        }
    }

    async fn watch_loop(&mut self) -> anyhow::Result<()> {
        let mut poll = tokio::time::interval(self.poll_interval);
        let mut step = tokio::time::interval(STEP_INTERVAL);
        let mut lines = self.session.subscribe();

        loop {
            tokio::select! {
                _ = poll.tick() => self.poll_now_playing().await?,
                _ = step.tick() => self.step(),
                changed = lines.changed() => {
                    if changed.is_err() {
                        // The sender lives in self; the loop ends first.
                        return Ok(());
                    }
                    let line = lines.borrow_and_update().clone();
                    if !line.text.is_empty() {
                        println!("{}", line.text);
                    }
                }
            }
        }
    }

    async fn poll_now_playing(&mut self) -> anyhow::Result<()> {
        match self.client.currently_playing().await {
            Ok(Some(playing)) => self.apply_playing(playing).await,
            Ok(None) => {
                if self.playback.take().is_some() {
                    tracing::info!("Nothing playing");
                    self.session.clear();
                }
            }
            Err(err @ (SpotifyError::MissingToken | SpotifyError::TokenExpired)) => {
                return Err(
                    anyhow::Error::new(err).context("run `refrain auth login` to sign in")
                );
            }
            Err(e) => tracing::warn!("Failed to poll now playing: {}", e),
        }
        Ok(())
    }

    async fn apply_playing(&mut self, playing: NowPlaying) {
        let Some(ref track) = playing.item else {
            // Ads and private sessions report playback without a track.
            if self.playback.take().is_some() {
                self.session.clear();
            }
            return;
        };

        let track_key = track.id.clone().unwrap_or_else(|| track.name.clone());
        let changed_track = self
            .playback
            .as_ref()
            .map(|p| p.track_key != track_key)
            .unwrap_or(true);

        if changed_track {
            tracing::info!("Now playing: {} - {}", track.artist_names(), track.name);
            let artist = track.primary_artist().unwrap_or_default().to_string();
            self.refresh_lyrics(&artist, &track.name).await;
        }

        let position = playing.position_secs();
        self.playback = Some(Playback {
            track_key,
            is_playing: playing.is_playing,
            position,
            anchor: Instant::now(),
        });
        self.session.update_position(position);
    }

    async fn refresh_lyrics(&mut self, artist: &str, title: &str) {
        match self.cache.get(artist, title) {
            Ok(Some(text)) => {
                self.session.set_lyrics(Some(lyrics::parse_synced_lyrics(&text)));
                self.session.set_plain_lyrics(None);
                return;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read lyrics cache: {}", e),
        }

        match self.lrclib.search(artist, title).await {
            Ok(Some(hit)) => {
                if let Some(text) = &hit.synced_lyrics {
                    if let Err(e) = self.cache.save(artist, title, text) {
                        tracing::warn!("Failed to write lyrics cache: {}", e);
                    }
                    self.session.set_lyrics(Some(lyrics::parse_synced_lyrics(text)));
                } else {
                    tracing::info!("No synced lyrics for this track");
                    self.session.set_lyrics(None);
                }
                self.session.set_plain_lyrics(hit.plain_lyrics);
            }
            Ok(None) => {
                tracing::info!("No lyrics found for {} - {}", artist, title);
                self.session.set_lyrics(None);
                self.session.set_plain_lyrics(None);
            }
            Err(e) => {
                tracing::warn!("Failed to look up lyrics for {} - {}: {}", artist, title, e);
                self.session.set_lyrics(None);
                self.session.set_plain_lyrics(None);
            }
        }
    }

    fn step(&mut self) {
        if let Some(p) = &self.playback
            && p.is_playing
        {
            self.session
                .update_position(p.position + p.anchor.elapsed().as_secs_f64());
        }
    }
}
