// Common helpers for integration tests

use refrain::config::SpotifyConfig;
use refrain::spotify::{Navigator, SpotifyAuth};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

// One canned answer: any request whose path starts with `prefix` gets it.
pub struct StubRoute {
    pub prefix: &'static str,
    pub status: &'static str,
    pub body: String,
}

pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    // How many requests the stub has answered so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

// Serve canned HTTP responses on a local port so client code runs offline.
// The accept loop lives on the test runtime and dies with it.
pub async fn spawn_stub(routes: Vec<StubRoute>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub listener");
    let addr = listener.local_addr().expect("stub listener has no address");
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            // One read is enough for a header-only GET on loopback.
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            // Request-Line: "GET /search?artist_name=x HTTP/1.1"
            let path = request
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("/");

            let (status, body) = routes
                .iter()
                .find(|route| path.starts_with(route.prefix))
                .map(|route| (route.status, route.body.as_str()))
                .unwrap_or(("404 Not Found", ""));
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });

    StubServer {
        base_url: format!("http://{}", addr),
        hits,
    }
}

// Navigator that records calls instead of touching the desktop.
#[derive(Default)]
pub struct RecordingNavigator {
    pub opened: Mutex<Vec<String>>,
    pub homes: AtomicUsize,
}

impl Navigator for RecordingNavigator {
    fn open_url(&self, url: &str) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn home(&self) {
        self.homes.fetch_add(1, Ordering::SeqCst);
    }
}

// Config with a client id filled in; there is no real app registration behind it.
pub fn test_spotify_config() -> SpotifyConfig {
    SpotifyConfig {
        client_id: Some("client123".into()),
        ..SpotifyConfig::default()
    }
}

// Run the whole login flow so later calls find a stored token.
pub fn sign_in(auth: &SpotifyAuth, token: &str) {
    let url = auth
        .begin_login(&RecordingNavigator::default())
        .expect("begin_login failed");
    let state = Url::parse(&url)
        .expect("authorize url did not parse")
        .query_pairs()
        .find_map(|(k, v)| (k == "state").then(|| v.into_owned()))
        .expect("authorize url has no state");
    let callback = format!(
        "http://localhost:5173/callback#access_token={}&token_type=Bearer&state={}",
        token, state
    );
    auth.handle_callback(&callback).expect("handle_callback failed");
}
