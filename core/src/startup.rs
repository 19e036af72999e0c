//! App startup: load preferences and tell the host whether setup is needed.

use std::time::Duration;

use crate::client::ReadeckClient;
use crate::error::PreferencesError;
use crate::preferences::{JsonFileStore, KeyValueStore, PreferencesStore, StoredPreferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupState {
    Configured(StoredPreferences),
    /// Preferences are missing or unreadable; route the user to setup.
    NotConfigured,
}

impl StartupState {
    pub fn preferences(&self) -> Option<&StoredPreferences> {
        match self {
            StartupState::Configured(preferences) => Some(preferences),
            StartupState::NotConfigured => None,
        }
    }

    /// A client for the stored server and token, if configured.
    pub fn client(&self, timeout: Duration) -> Option<ReadeckClient> {
        self.preferences().map(|p| {
            ReadeckClient::new(&p.server_url)
                .with_credential(&p.api_token)
                .with_timeout(timeout)
        })
    }
}

/// Preferences backed by the JSON file in the platform config directory.
pub fn default_preferences() -> Result<PreferencesStore<JsonFileStore>, PreferencesError> {
    JsonFileStore::at_default_location().map(PreferencesStore::new)
}

/// Load preferences for the host. Errors are logged, never propagated.
pub async fn load_startup_state<S: KeyValueStore>(store: &PreferencesStore<S>) -> StartupState {
    match store.load().await {
        Ok(preferences) => StartupState::Configured(preferences),
        Err(e) => {
            log::warn!("Error loading preferences: {e}");
            StartupState::NotConfigured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_TIMEOUT;
    use crate::preferences::MemoryStore;

    #[test]
    fn default_preferences_live_under_config_dir() {
        match JsonFileStore::default_path() {
            Some(expected) => {
                let store = default_preferences().unwrap();
                assert_eq!(store.inner().path(), expected.as_path());
                assert!(expected.ends_with("readeck-sharer/preferences.json"));
            }
            None => assert!(matches!(default_preferences(), Err(PreferencesError::Storage(_)))),
        }
    }

    #[tokio::test]
    async fn empty_store_is_not_configured() {
        let store = PreferencesStore::new(MemoryStore::new());
        let state = load_startup_state(&store).await;
        assert_eq!(state, StartupState::NotConfigured);
        assert!(state.client(DEFAULT_TIMEOUT).is_none());
    }

    #[tokio::test]
    async fn configured_state_builds_client() {
        let store = PreferencesStore::new(MemoryStore::new());
        store
            .save(&StoredPreferences::new("https://read.example/", "tok"))
            .await
            .unwrap();

        let state = load_startup_state(&store).await;
        let client = state.client(Duration::from_secs(2)).unwrap();
        assert_eq!(client.base_url(), "https://read.example");
        assert_eq!(client.credential(), Some("tok"));
        assert_eq!(client.timeout(), Duration::from_secs(2));
    }
}
