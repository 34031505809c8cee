use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use backscroll_sync::SyncConfig;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:4000/ws";
pub const SETTINGS_DIRECTORY_NAME: &str = "backscroll";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "BACKSCROLL_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Name the server knows us by; used only to style our own messages.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            username: String::new(),
            sync: SyncConfig::default(),
        }
    }
}

impl ClientSettings {
    pub fn normalized(mut self) -> Self {
        self.server_url = self.server_url.trim().to_string();
        if self.server_url.is_empty() {
            self.server_url = default_server_url();
        }
        self.username = self.username.trim().to_string();
        self.sync = self.sync.normalized();
        self
    }

    /// Without a username every message, including our own, is styled as foreign.
    pub fn has_identity(&self) -> bool {
        !self.username.trim().is_empty()
    }

    fn validated(self) -> Result<Self, SettingsError> {
        ensure!(
            self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://"),
            InvalidServerUrlSnafu {
                stage: "validate-settings",
                url: self.server_url.clone(),
            }
        );
        Ok(self)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to extract settings from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        source: figment::Error,
    },
    #[snafu(display("server url '{url}' is not a ws:// or wss:// url on `{stage}`"))]
    InvalidServerUrl { stage: &'static str, url: String },
}

/// Layered settings: defaults, then the JSON file, then `BACKSCROLL_*` variables.
pub struct SettingsStore {
    settings: Arc<ArcSwap<ClientSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".backscroll"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<ClientSettings> {
        self.settings.load_full()
    }

    /// Re-reads every layer and swaps the result in.
    pub fn reload(&self) {
        let settings = Self::load_from_disk(&self.config_path);
        self.settings.store(Arc::new(settings));
    }

    fn load_from_disk(path: &Path) -> ClientSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }

        let settings = match Self::extract(path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!("{}. using defaults", error);
                ClientSettings::default()
            }
        };
        if !settings.has_identity() {
            tracing::warn!(path = ?path, "no username configured, own messages stay unhighlighted");
        }
        settings
    }

    fn extract(path: &Path) -> Result<ClientSettings, SettingsError> {
        let figment = Figment::from(Serialized::defaults(ClientSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let settings = figment
            .extract::<ClientSettings>()
            .context(ExtractSnafu {
                stage: "extract-settings",
                path: path.to_path_buf(),
            })?;

        settings.normalized().validated()
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

#[cfg(test)]
mod tests {
    use backscroll_sync::Clock;
    use figment::Jail;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let store = SettingsStore::new(PathBuf::from("absent.json"));
            assert_eq!(*store.settings(), ClientSettings::default());
            Ok(())
        });
    }

    #[test]
    fn file_and_environment_layers_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.json",
                r#"{
                    "server_url": " wss://chat.example.org/ws ",
                    "username": " ann ",
                    "sync": { "clock": "utc", "time_format": "%H:%M:%S" }
                }"#,
            )?;
            jail.set_env("BACKSCROLL_SYNC__SCROLL_THRESHOLD", "250.5");

            let settings = SettingsStore::new(PathBuf::from("settings.json")).settings();
            assert_eq!(settings.server_url, "wss://chat.example.org/ws");
            assert_eq!(settings.username, "ann");
            assert_eq!(settings.sync.clock, Clock::Utc);
            assert_eq!(settings.sync.time_format, "%H:%M:%S");
            assert_eq!(settings.sync.scroll_threshold, 250.5);
            assert_eq!(settings.sync.max_message_bytes, 2048);
            Ok(())
        });
    }

    #[test]
    fn unusable_settings_fall_back_to_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("broken.json", "{ not json")?;
            let broken = SettingsStore::new(PathBuf::from("broken.json"));
            assert_eq!(*broken.settings(), ClientSettings::default());

            jail.create_file("http.json", r#"{ "server_url": "http://example.org" }"#)?;
            let http = SettingsStore::new(PathBuf::from("http.json"));
            assert_eq!(http.settings().server_url, DEFAULT_SERVER_URL);
            Ok(())
        });
    }

    #[test]
    fn blank_username_leaves_session_without_identity() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{ "username": "   " }"#)?;
            let blank = SettingsStore::new(PathBuf::from("settings.json")).settings();
            assert_eq!(blank.username, "");
            assert!(!blank.has_identity());

            jail.set_env("BACKSCROLL_USERNAME", "ann");
            let named = SettingsStore::new(PathBuf::from("settings.json")).settings();
            assert!(named.has_identity());
            Ok(())
        });
    }

    #[test]
    fn reload_picks_up_file_changes() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{ "username": "ann" }"#)?;
            let store = SettingsStore::new(PathBuf::from("settings.json"));
            assert_eq!(store.settings().username, "ann");

            jail.create_file("settings.json", r#"{ "username": "bob" }"#)?;
            store.reload();
            assert_eq!(store.settings().username, "bob");
            Ok(())
        });
    }
}
