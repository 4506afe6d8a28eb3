//! Local lyrics cache
//!
//! Raw synced-lyrics text keyed by `lyrics_<artist>_<title>`. The key is a
//! literal concatenation with no escaping, so pairs that differ only in
//! where a delimiter falls share an entry. Entries never expire.

use crate::storage::{KvStore, StoreError};
use std::sync::Arc;

#[derive(Clone)]
pub struct LyricsCache {
    store: Arc<dyn KvStore>,
}

impl LyricsCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn key(artist: &str, title: &str) -> String {
        format!("lyrics_{artist}_{title}")
    }

    pub fn get(&self, artist: &str, title: &str) -> Result<Option<String>, StoreError> {
        self.store.get(&Self::key(artist, title))
    }

    pub fn save(&self, artist: &str, title: &str, lyrics: &str) -> Result<(), StoreError> {
        self.store.set(&Self::key(artist, title), lyrics)
    }
}
