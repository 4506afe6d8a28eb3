//! Playback-synced lyrics state
//!
//! `LyricsSession` owns what the display layer reads: the parsed lyrics for
//! the current track and the line under the playhead. Consumers subscribe
//! to a watch channel and are woken only when the selected line changes.

use crate::lyrics::Lyric;
use tokio::sync::watch;

pub struct LyricsSession {
    synced_lyrics: Option<Vec<Lyric>>,
    plain_lyrics: Option<String>,
    current: watch::Sender<Lyric>,
}

impl LyricsSession {
    pub fn new() -> Self {
        let (current, _) = watch::channel(Lyric::new(0.0, ""));
        Self { synced_lyrics: None, plain_lyrics: None, current }
    }

    /// Watch the current line. The value at subscription time counts as seen.
    pub fn subscribe(&self) -> watch::Receiver<Lyric> {
        self.current.subscribe()
    }

    /// Replace the track's lyrics and reset the selection
    pub fn set_lyrics(&mut self, lines: Option<Vec<Lyric>>) {
        self.synced_lyrics = lines;
        self.publish(Lyric::new(0.0, ""));
    }

    pub fn set_plain_lyrics(&mut self, text: Option<String>) {
        self.plain_lyrics = text;
    }

    pub fn clear(&mut self) {
        self.synced_lyrics = None;
        self.plain_lyrics = None;
        self.publish(Lyric::new(0.0, ""));
    }

    /// Move the playhead and reselect the current line: the last line in
    /// source order whose time is at or before `position` seconds.
    pub fn update_position(&mut self, position: f64) {
        let line = self
            .synced_lyrics
            .as_ref()
            .and_then(|lines| lines.iter().rev().find(|l| l.time <= position))
            .cloned()
            .unwrap_or_else(|| Lyric::new(0.0, ""));
        self.publish(line);
    }

    pub fn current_line(&self) -> Lyric {
        self.current.borrow().clone()
    }

    pub fn synced_lyrics(&self) -> Option<&[Lyric]> {
        self.synced_lyrics.as_deref()
    }

    pub fn plain_lyrics(&self) -> Option<&str> {
        self.plain_lyrics.as_deref()
    }

    fn publish(&self, line: Lyric) {
        self.current.send_if_modified(|cur| {
            if *cur == line {
                false
            } else {
                *cur = line;
                true
            }
        });
    }
}

impl Default for LyricsSession {
    fn default() -> Self {
        Self::new()
    }
}
