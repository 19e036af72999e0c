//! Persisted user preferences: server URL, credentials, and behavior flags.
//!
//! # Design
//! Preferences live in a string-keyed store, one entry per field, with
//! absent keys reading as `None`. `load` and `save` issue their key
//! operations concurrently and join them. There is no transaction: if a
//! `save` fails halfway, some keys may hold new values and others old ones.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, RwLock};

use crate::error::PreferencesError;

pub const SERVER_URL_KEY: &str = "serverUrl";
pub const API_TOKEN_KEY: &str = "apiToken";
pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const AUTH_METHOD_KEY: &str = "authMethod";
pub const WAIT_FOR_SCRAPE_KEY: &str = "waitForScrape";

const CONFIG_DIR_NAME: &str = "readeck-sharer";
const CONFIG_FILE_NAME: &str = "preferences.json";

/// String-keyed persistent storage.
pub trait KeyValueStore {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, PreferencesError>> + Send;
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), PreferencesError>> + Send;
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), PreferencesError>> + Send;
}

/// How the user authenticates against the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// A pasted API token.
    #[default]
    Token,
    /// Username and password, exchanged for a token through login.
    Credentials,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Token => "token",
            AuthMethod::Credentials => "credentials",
        }
    }

    /// Anything other than `"credentials"` falls back to token auth.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("credentials") => AuthMethod::Credentials,
            _ => AuthMethod::Token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPreferences {
    pub server_url: String,
    pub api_token: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_method: AuthMethod,
    pub wait_for_scrape: bool,
}

impl StoredPreferences {
    pub fn new(server_url: &str, api_token: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            api_token: api_token.to_string(),
            username: None,
            password: None,
            auth_method: AuthMethod::Token,
            wait_for_scrape: true,
        }
    }

    /// True when `save` will keep the username and password.
    fn keeps_credentials(&self) -> bool {
        let non_empty = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        self.auth_method == AuthMethod::Credentials
            && non_empty(&self.username)
            && non_empty(&self.password)
    }
}

pub struct PreferencesStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferencesStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Read all preferences. Fails with `ConfigurationMissing` when the
    /// server URL or API token is unset.
    pub async fn load(&self) -> Result<StoredPreferences, PreferencesError> {
        let (server_url, api_token, username, password, auth_method, wait_for_scrape) =
            tokio::try_join!(
                self.store.get(SERVER_URL_KEY),
                self.store.get(API_TOKEN_KEY),
                self.store.get(USERNAME_KEY),
                self.store.get(PASSWORD_KEY),
                self.store.get(AUTH_METHOD_KEY),
                self.store.get(WAIT_FOR_SCRAPE_KEY),
            )?;

        let server_url = required(server_url, SERVER_URL_KEY)?;
        let api_token = required(api_token, API_TOKEN_KEY)?;

        Ok(StoredPreferences {
            server_url,
            api_token,
            username,
            password,
            auth_method: AuthMethod::from_stored(auth_method.as_deref()),
            // Unset means "wait"; once written only the literal "true" does.
            wait_for_scrape: wait_for_scrape.map_or(true, |v| v == "true"),
        })
    }

    /// Write all preferences. Username and password are stored only for
    /// credential auth with both values non-empty, and removed otherwise.
    pub async fn save(&self, preferences: &StoredPreferences) -> Result<(), PreferencesError> {
        let wait_for_scrape = if preferences.wait_for_scrape { "true" } else { "false" };
        tokio::try_join!(
            self.store.set(SERVER_URL_KEY, &preferences.server_url),
            self.store.set(API_TOKEN_KEY, &preferences.api_token),
            self.store.set(AUTH_METHOD_KEY, preferences.auth_method.as_str()),
            self.store.set(WAIT_FOR_SCRAPE_KEY, wait_for_scrape),
        )?;

        match (&preferences.username, &preferences.password) {
            (Some(username), Some(password)) if preferences.keeps_credentials() => {
                tokio::try_join!(
                    self.store.set(USERNAME_KEY, username),
                    self.store.set(PASSWORD_KEY, password),
                )?;
            }
            _ => {
                tokio::try_join!(self.store.remove(USERNAME_KEY), self.store.remove(PASSWORD_KEY))?;
            }
        }
        Ok(())
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, PreferencesError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(PreferencesError::ConfigurationMissing(key))
}

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file of string values.
///
/// Writes are read-modify-write under a lock, so concurrent `set` calls from
/// one `save` do not clobber each other.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<config dir>/readeck-sharer/preferences.json`, when the platform has
    /// a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Store at `default_path`. Fails when the platform has no config
    /// directory.
    pub fn at_default_location() -> Result<Self, PreferencesError> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| PreferencesError::Storage("no config directory on this platform".into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, PreferencesError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        serde_json::from_str(&content).map_err(|e| storage_error(&self.path, e))
    }

    /// Sibling file the next contents are written to before being renamed
    /// over `path`, so a crash mid-write leaves the old file intact.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        let content =
            serde_json::to_string_pretty(entries).map_err(|e| storage_error(&self.path, e))?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, content)
            .await
            .map_err(|e| storage_error(&staging, e))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))
    }
}

impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> PreferencesError {
    PreferencesError::Storage(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(entries: &[(&str, &str)]) -> PreferencesStore<MemoryStore> {
        let store = MemoryStore::new();
        for (k, v) in entries {
            store.set(k, v).await.unwrap();
        }
        PreferencesStore::new(store)
    }

    #[tokio::test]
    async fn load_defaults_optional_fields() {
        let prefs = store_with(&[("serverUrl", "https://r.example"), ("apiToken", "t")])
            .await
            .load()
            .await
            .unwrap();
        assert_eq!(prefs, StoredPreferences::new("https://r.example", "t"));
    }

    #[tokio::test]
    async fn load_requires_server_url() {
        let err = store_with(&[("apiToken", "t")]).await.load().await.unwrap_err();
        assert!(matches!(err, PreferencesError::ConfigurationMissing("serverUrl")));
    }

    #[tokio::test]
    async fn load_treats_empty_token_as_missing() {
        let err = store_with(&[("serverUrl", "https://r.example"), ("apiToken", "")])
            .await
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, PreferencesError::ConfigurationMissing("apiToken")));
    }

    #[tokio::test]
    async fn unknown_auth_method_falls_back_to_token() {
        let prefs = store_with(&[
            ("serverUrl", "https://r.example"),
            ("apiToken", "t"),
            ("authMethod", "oauth"),
        ])
        .await
        .load()
        .await
        .unwrap();
        assert_eq!(prefs.auth_method, AuthMethod::Token);
    }

    #[tokio::test]
    async fn save_writes_flags_as_strings() {
        let store = store_with(&[]).await;
        let mut prefs = StoredPreferences::new("https://r.example", "t");
        prefs.wait_for_scrape = false;
        store.save(&prefs).await.unwrap();

        let kv = store.inner();
        assert_eq!(kv.get("waitForScrape").await.unwrap().as_deref(), Some("false"));
        assert_eq!(kv.get("authMethod").await.unwrap().as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn save_drops_credentials_when_one_is_empty() {
        let store = store_with(&[("username", "old"), ("password", "old")]).await;
        let mut prefs = StoredPreferences::new("https://r.example", "t");
        prefs.auth_method = AuthMethod::Credentials;
        prefs.username = Some("alice".to_string());
        prefs.password = Some(String::new());
        store.save(&prefs).await.unwrap();

        assert!(store.inner().get("username").await.unwrap().is_none());
        assert!(store.inner().get("password").await.unwrap().is_none());
    }
}
