//! Synced-lyrics parser
//!
//! Turns an LRC-style transcript into timed lines:
//! [01:30]Hello world
//! [01:33.5]Another line
//!
//! Lines without a usable leading timestamp are kept as plain lines at
//! time zero, so unsynced transcripts pass through unchanged.

use serde::Serialize;

/// A single line of lyrics with its timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lyric {
    /// Offset from the start of the track, in seconds
    pub time: f64,
    /// The lyrics text
    pub text: String,
}

impl Lyric {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self { time, text: text.into() }
    }
}

/// Parse a lyrics transcript into its lines, in source order.
///
/// Source order is the playback timeline and is never re-sorted. Every
/// input line yields exactly one record; empty input yields one empty
/// record.
pub fn parse_synced_lyrics(text: &str) -> Vec<Lyric> {
    text.split('\n').map(parse_line).collect()
}

fn parse_line(line: &str) -> Lyric {
    if let Some(rest) = line.strip_prefix('[')
        && let Some(end) = rest.find(']')
        && let Some(time) = parse_timestamp(&rest[..end])
    {
        return Lyric::new(time, rest[end + 1..].trim());
    }
    Lyric::new(0.0, line.trim())
}

/// Parse a bracket interior like "01:30" or "01:30.5" to seconds.
///
/// The first two colon-separated fields are minutes and seconds; extra
/// fields are ignored. Rejects anything that would not land on a finite
/// non-negative timeline position.
fn parse_timestamp(s: &str) -> Option<f64> {
    let mut parts = s.split(':');
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if !minutes.is_finite() || !seconds.is_finite() || minutes < 0.0 || seconds < 0.0 {
        return None;
    }
    Some(minutes * 60.0 + seconds)
}
