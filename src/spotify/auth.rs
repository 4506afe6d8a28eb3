//! Implicit-grant login
//!
//! Spotify's implicit grant hands the access token straight back in the
//! fragment of the redirect URL, no exchange step. Login builds the consent
//! URL and opens it; the user pastes the URL the provider redirected to and
//! the token comes out of its fragment. A random `state` ties each callback
//! to the login that started it.

use super::{ACCESS_TOKEN_KEY, AUTH_STATE_KEY, Navigator, SpotifyError};
use crate::config::SpotifyConfig;
use crate::storage::KvStore;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::sync::Arc;
use url::Url;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
const STATE_LEN: usize = 16;

pub struct SpotifyAuth {
    store: Arc<dyn KvStore>,
    config: SpotifyConfig,
}

impl SpotifyAuth {
    pub fn new(store: Arc<dyn KvStore>, config: SpotifyConfig) -> Self {
        Self { store, config }
    }

    /// Build the consent URL, remember its `state`, and send the user there.
    ///
    /// Returns the URL so callers can show it when the browser will not
    /// open.
    pub fn begin_login(&self, navigator: &dyn Navigator) -> Result<String, SpotifyError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(SpotifyError::MissingClientId)?;

        let state = generate_state();
        self.store.set(AUTH_STATE_KEY, &state)?;

        let mut url = Url::parse(AUTHORIZE_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("response_type", "token")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", &state);
        let url = url.to_string();

        if let Err(e) = navigator.open_url(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
        Ok(url)
    }

    /// Read the token out of the redirect URL's fragment and persist it.
    ///
    /// The pending state is consumed whether or not it matches, so a
    /// rejected callback cannot be replayed against the same login.
    pub fn handle_callback(&self, redirect_url: &str) -> Result<String, SpotifyError> {
        let url = Url::parse(redirect_url)?;
        let fragment = url.fragment().unwrap_or("");

        let mut token = None;
        let mut state = None;
        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "access_token" => token = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }

        let pending = self.store.get(AUTH_STATE_KEY)?;
        self.store.remove(AUTH_STATE_KEY)?;
        if pending.is_none() || state != pending {
            return Err(SpotifyError::StateMismatch);
        }

        let token = token.ok_or(SpotifyError::NoCallbackToken)?;
        self.store.set(ACCESS_TOKEN_KEY, &token)?;
        Ok(token)
    }

    /// Presence check only; expiry shows up as a 401 on the next poll.
    pub fn is_authenticated(&self) -> Result<bool, SpotifyError> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.is_some())
    }

    pub fn logout(&self) -> Result<(), SpotifyError> {
        self.store.remove(AUTH_STATE_KEY)?;
        self.store.remove(ACCESS_TOKEN_KEY)?;
        Ok(())
    }
}

fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingNavigator {
        opened: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn new() -> Self {
            Self { opened: Mutex::new(Vec::new()) }
        }
    }

    impl Navigator for RecordingNavigator {
        fn open_url(&self, url: &str) -> std::io::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn home(&self) {}
    }

    fn auth_with_store() -> (SpotifyAuth, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let config = SpotifyConfig {
            client_id: Some("client123".into()),
            ..SpotifyConfig::default()
        };
        (SpotifyAuth::new(store.clone(), config), store)
    }

    #[test]
    fn test_begin_login_builds_authorize_url() {
        let (auth, store) = auth_with_store();
        let nav = RecordingNavigator::new();
        let url = auth.begin_login(&nav).unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("accounts.spotify.com"));
        assert_eq!(parsed.path(), "/authorize");

        let params: HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client123");
        assert_eq!(params["response_type"], "token");
        assert_eq!(params["redirect_uri"], "http://localhost:5173/callback");
        assert_eq!(
            params["scope"],
            "user-read-currently-playing user-read-playback-state"
        );

        let pending = store.get(AUTH_STATE_KEY).unwrap().unwrap();
        assert_eq!(params["state"], pending);
        assert_eq!(pending.len(), STATE_LEN);
        assert!(pending.chars().all(|c| c.is_ascii_alphanumeric()));

        assert_eq!(*nav.opened.lock().unwrap(), vec![url]);
    }

    #[test]
    fn test_begin_login_without_client_id_fails() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let auth = SpotifyAuth::new(store, SpotifyConfig::default());
        let err = auth.begin_login(&RecordingNavigator::new()).unwrap_err();
        assert!(matches!(err, SpotifyError::MissingClientId));
    }

    #[test]
    fn test_callback_stores_token_and_consumes_state() {
        let (auth, store) = auth_with_store();
        auth.begin_login(&RecordingNavigator::new()).unwrap();
        let state = store.get(AUTH_STATE_KEY).unwrap().unwrap();

        let url = format!(
            "http://localhost:5173/callback#access_token=tok123&token_type=Bearer&state={state}"
        );
        assert_eq!(auth.handle_callback(&url).unwrap(), "tok123");
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok123"));
        assert!(auth.is_authenticated().unwrap());
        assert_eq!(store.get(AUTH_STATE_KEY).unwrap(), None);
    }

    #[test]
    fn test_callback_rejects_wrong_state() {
        let (auth, store) = auth_with_store();
        auth.begin_login(&RecordingNavigator::new()).unwrap();

        let url = "http://localhost:5173/callback#access_token=tok123&state=forged";
        let err = auth.handle_callback(url).unwrap_err();
        assert!(matches!(err, SpotifyError::StateMismatch));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_callback_without_pending_login_rejected() {
        let (auth, _) = auth_with_store();
        let err = auth
            .handle_callback("http://localhost:5173/callback#access_token=tok&state=x")
            .unwrap_err();
        assert!(matches!(err, SpotifyError::StateMismatch));
    }

    #[test]
    fn test_callback_without_token_rejected() {
        let (auth, store) = auth_with_store();
        auth.begin_login(&RecordingNavigator::new()).unwrap();
        let state = store.get(AUTH_STATE_KEY).unwrap().unwrap();

        let url = format!("http://localhost:5173/callback#error=access_denied&state={state}");
        let err = auth.handle_callback(&url).unwrap_err();
        assert!(matches!(err, SpotifyError::NoCallbackToken));
        assert!(!auth.is_authenticated().unwrap());
    }

    #[test]
    fn test_token_in_query_not_fragment_rejected() {
        let (auth, store) = auth_with_store();
        auth.begin_login(&RecordingNavigator::new()).unwrap();
        let state = store.get(AUTH_STATE_KEY).unwrap().unwrap();

        // The implicit grant delivers the token in the fragment; a query
        // string carrying one is not a valid callback.
        let url = format!("http://localhost:5173/callback?access_token=tok&state={state}");
        assert!(auth.handle_callback(&url).is_err());
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_second_login_overwrites_pending_state() {
        let (auth, store) = auth_with_store();
        let nav = RecordingNavigator::new();
        auth.begin_login(&nav).unwrap();
        let first = store.get(AUTH_STATE_KEY).unwrap().unwrap();
        auth.begin_login(&nav).unwrap();
        let second = store.get(AUTH_STATE_KEY).unwrap().unwrap();
        assert_ne!(first, second);

        // The superseded state no longer matches.
        let url = format!("http://localhost:5173/callback#access_token=tok&state={first}");
        assert!(matches!(
            auth.handle_callback(&url).unwrap_err(),
            SpotifyError::StateMismatch
        ));
    }

    #[test]
    fn test_logout_clears_token() {
        let (auth, store) = auth_with_store();
        store.set(ACCESS_TOKEN_KEY, "tok").unwrap();
        auth.logout().unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert!(!auth.is_authenticated().unwrap());
    }
}
