use anyhow::Context;
use clap::{Parser, Subcommand};
use refrain::app::App;
use refrain::config;
use refrain::lyrics::{self, LrclibClient, LyricsCache};
use refrain::spotify::{NowPlaying, SpotifyAuth, SpotifyClient, SystemNavigator};
use refrain::storage::{KvStore, SqliteStore};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "refrain", version, about = "Synced lyrics for whatever Spotify is playing")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow playback and print lyric lines as they come up (default).
    Watch,
    /// Look up a track's synced lyrics and print them.
    Lyrics {
        artist: String,
        title: String,
        /// Print parsed lines as JSON with timestamps.
        #[arg(long)]
        timed: bool,
    },
    /// Print the currently playing track.
    Now,
    /// Print the now-playing state as JSON.
    NowJson,
    /// Sign in and out of Spotify.
    Auth {
        #[command(subcommand)]
        method: AuthCommand,
    },
}

#[derive(Debug, Subcommand)]
enum AuthCommand {
    /// Open the Spotify consent page and finish login with the redirect URL.
    Login,
    /// Finish a pending login with the URL the browser was redirected to.
    Callback { url: String },
    /// Show whether a token is stored.
    Status,
    /// Forget the stored token.
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            let mut app = App::new(&cfg)?;
            app.run().await?;
        }
        Command::Lyrics { artist, title, timed } => {
            let cache = LyricsCache::new(open_store(&cfg)?);
            let client = LrclibClient::with_base_url(cfg.lyrics.lrclib_url.clone());
            match lyrics::load(&client, &cache, &artist, &title).await {
                Some(text) if timed => {
                    let lines = lyrics::parse_synced_lyrics(&text);
                    println!("{}", serde_json::to_string_pretty(&lines)?);
                }
                Some(text) => println!("{}", text),
                None => println!("No synced lyrics found."),
            }
        }
        Command::Now => match fetch_now_playing(&cfg).await? {
            Some(playing) => print_now_playing(&playing),
            None => println!("Nothing playing."),
        },
        Command::NowJson => match fetch_now_playing(&cfg).await? {
            Some(playing) => println!("{}", serde_json::to_string_pretty(&playing)?),
            None => println!("null"),
        },
        Command::Auth { method } => {
            let auth = SpotifyAuth::new(open_store(&cfg)?, cfg.spotify.clone());
            match method {
                AuthCommand::Login => {
                    let url = auth.begin_login(&SystemNavigator)?;
                    println!("Opening the Spotify consent page:");
                    println!("  {url}");
                    println!();
                    println!("After approving, paste the URL you were redirected to");
                    println!("(or run `refrain auth callback <url>` later):");
                    let mut line = String::new();
                    std::io::stdin()
                        .read_line(&mut line)
                        .context("read redirect url")?;
                    let line = line.trim();
                    if line.is_empty() {
                        println!("No URL pasted; login left pending.");
                    } else {
                        auth.handle_callback(line)?;
                        println!("Signed in.");
                    }
                }
                AuthCommand::Callback { url } => {
                    auth.handle_callback(&url)?;
                    println!("Signed in.");
                }
                AuthCommand::Status => {
                    if auth.is_authenticated()? {
                        println!("Signed in (token stored).");
                    } else {
                        println!("Not signed in.");
                    }
                }
                AuthCommand::Logout => {
                    auth.logout()?;
                    println!("Signed out.");
                }
            }
        }
    }

    Ok(())
}

fn open_store(cfg: &config::Config) -> anyhow::Result<Arc<dyn KvStore>> {
    Ok(Arc::new(SqliteStore::open(&cfg.store_path())?))
}

async fn fetch_now_playing(cfg: &config::Config) -> anyhow::Result<Option<NowPlaying>> {
    let client = SpotifyClient::new(open_store(cfg)?, Arc::new(SystemNavigator));
    Ok(client.currently_playing().await?)
}

fn print_now_playing(playing: &NowPlaying) {
    match &playing.item {
        Some(track) => {
            let state = if playing.is_playing { "Playing" } else { "Paused" };
            println!("{}: {} - {}", state, track.artist_names(), track.name);
            if let (Some(progress), Some(duration)) = (playing.progress_ms, track.duration_ms) {
                println!("  {} / {}", fmt_ms(progress), fmt_ms(duration));
            }
        }
        None => println!("Playing, but the track has no metadata."),
    }
}

fn fmt_ms(ms: u64) -> String {
    let total = ms / 1000;
    format!("{}:{:02}", total / 60, total % 60)
}
